pub mod arguments;
pub mod artifact;
pub mod deployer;
pub mod task;

use {
    arguments::Arguments,
    artifact::ArtifactDirectory,
    clap::Parser,
    deployer::AlloyDeployer,
    std::process::ExitCode,
    task::{DeploymentTask, Outcome},
};

pub async fn start(args: impl Iterator<Item = String>) -> ExitCode {
    let args = Arguments::parse_from(args);
    let obs_config = observe::Config::new(
        &args.logging.log_filter,
        args.logging.log_stderr_threshold.into_level(),
        args.logging.use_json_logs,
    );
    observe::tracing::initialize(&obs_config);
    tracing::info!("running deploy with validated arguments:\n{}", args);

    let exit_on_failure = args.exit_on_failure;
    let outcome = run(args).await;
    if exits_with_failure(&outcome, exit_on_failure) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Assumes tracing has already been set up.
pub async fn run(args: Arguments) -> Outcome {
    let artifacts = ArtifactDirectory::new(&args.artifacts_dir);
    let deployer = AlloyDeployer::new(&args.node_url, args.private_key)
        .with_confirmations(args.confirmations)
        .with_gas_limit(args.gas_limit);
    tracing::info!(sender = ?deployer.sender(), "deploying from account");

    DeploymentTask::new(artifacts, deployer).run().await
}

/// A failed deployment is only reported in the logs unless the caller opted in
/// to a non-zero exit status.
fn exits_with_failure(outcome: &Outcome, exit_on_failure: bool) -> bool {
    exit_on_failure && !outcome.is_success()
}
