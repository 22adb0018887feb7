pub mod environment;
pub mod paths;
pub mod terminal;
pub mod timestamps;

pub use environment::{Config, default_state_dir};
pub use paths::{
    UploadKind, encode_path_segment, format_path_with_tilde, upload_mime_type, validate_file_size,
};
pub use terminal::strip_ansi_codes;
pub use timestamps::{format_optional_timestamp, format_timestamp};
