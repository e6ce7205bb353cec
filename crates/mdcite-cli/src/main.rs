//! Primary entrypoint for the `mdcite` CLI binary.

fn main() {
    if let Err(error) = mdcite_cli::run() {
        eprintln!("mdcite: {error:#}");
        // System-level failures (bad args, unreadable source, parse failure)
        std::process::exit(2);
    }
}
