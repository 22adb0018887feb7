fn main() {
    if let Err(error) = question_studio::cli::run() {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}
