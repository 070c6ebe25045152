use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match bank2receipt_cli::run(std::env::args()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}
