//! relkit CLI binary
//!
//! All logic is in the library; main.rs only maps the exit code.

fn main() {
    let code = relkit::cli::run();
    std::process::exit(code.as_i32());
}
