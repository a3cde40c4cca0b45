// Thu Oct 15 2026 - Alex

use colored::Colorize;
use findso::ui::cli::{self, EXIT_ERROR};

fn main() {
    let code = match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "[!]".red(), e);
            EXIT_ERROR
        }
    };
    std::process::exit(code);
}
