use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    deploy_contracts::start(std::env::args()).await
}
