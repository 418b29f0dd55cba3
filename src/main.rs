use clap::Parser;
use rules_bundle::cli::{run, Cli};

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr so the composed text on stdout stays clean.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // For CLI/test parity: explicit process exit only in main(), not in run()
    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
