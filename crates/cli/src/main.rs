use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    artifact_cli::main_entry().await
}
