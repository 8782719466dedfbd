use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    realitycheck_cli::main_entry().await
}
