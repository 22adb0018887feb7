pub mod commands;
pub mod format;

pub use commands::run;
