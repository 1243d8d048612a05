use {
    crate::artifact::DEFAULT_ARTIFACTS_DIR,
    alloy::signers::local::PrivateKeySigner,
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
    },
    tracing::level_filters::LevelFilter,
    url::Url,
};

#[derive(clap::Parser)]
pub struct LoggingArguments {
    #[clap(long, env, default_value = "warn,deploy_contracts=info")]
    pub log_filter: String,

    /// Events at this level or more severe go to stderr, everything else to
    /// stdout. `off` keeps all output on stdout.
    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: LevelFilter,

    /// Emit log events as JSON objects instead of plain text.
    #[clap(long, env)]
    pub use_json_logs: bool,
}

impl Display for LoggingArguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            log_filter,
            log_stderr_threshold,
            use_json_logs,
        } = self;

        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
        writeln!(f, "use_json_logs: {use_json_logs}")?;
        Ok(())
    }
}

#[derive(clap::Parser)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// The Ethereum node URL to connect to.
    #[clap(long, env, default_value = "http://localhost:8545")]
    pub node_url: Url,

    /// Hex encoded private key of the account paying for the deployment.
    #[clap(long, env, hide_env_values = true)]
    pub private_key: PrivateKeySigner,

    /// Directory containing the compiled `<Contract>.json` artifacts.
    #[clap(long, env, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// How many blocks to wait for before considering the deployment done.
    #[clap(long, env, default_value = "1")]
    pub confirmations: u64,

    /// Fixed gas limit for the deployment transaction. Estimated by the node
    /// when unset.
    #[clap(long, env)]
    pub gas_limit: Option<u64>,

    /// Exit with a non-zero status when the deployment fails. By default a
    /// failed deployment is only reported in the logs.
    #[clap(long, env)]
    pub exit_on_failure: bool,
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            logging,
            node_url,
            private_key: _,
            artifacts_dir,
            confirmations,
            gas_limit,
            exit_on_failure,
        } = self;

        write!(f, "{logging}")?;
        writeln!(f, "node_url: {node_url}")?;
        writeln!(f, "private_key: SECRET")?;
        writeln!(f, "artifacts_dir: {}", artifacts_dir.display())?;
        writeln!(f, "confirmations: {confirmations}")?;
        writeln!(f, "gas_limit: {gas_limit:?}")?;
        writeln!(f, "exit_on_failure: {exit_on_failure}")?;
        Ok(())
    }
}
