//! The deployment task run by the `deploy` binary: resolve the `TodoList`
//! artifact, deploy it once and log how it went.

use {
    crate::{
        artifact::ArtifactLookup,
        deployer::{Deployer, Deployment},
    },
    anyhow::Context,
};

/// Name of the contract artifact this task deploys.
pub const CONTRACT_NAME: &str = "TodoList";

/// What a single run of [`DeploymentTask`] produced.
#[derive(Debug)]
pub enum Outcome {
    Deployed(Deployment),
    Failed(anyhow::Error),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Deployed(_))
    }
}

pub struct DeploymentTask<A, D> {
    artifacts: A,
    deployer: D,
}

impl<A, D> DeploymentTask<A, D>
where
    A: ArtifactLookup,
    D: Deployer,
{
    pub fn new(artifacts: A, deployer: D) -> Self {
        Self {
            artifacts,
            deployer,
        }
    }

    /// Runs the deployment exactly once. Failures are logged and returned,
    /// never retried.
    pub async fn run(&self) -> Outcome {
        match self.deploy().await {
            Ok(deployment) => {
                tracing::info!(
                    address = ?deployment.address,
                    tx_hash = ?deployment.transaction_hash,
                    block = ?deployment.block_number,
                    gas_used = deployment.gas_used,
                    "{CONTRACT_NAME} contract deployed successfully!"
                );
                Outcome::Deployed(deployment)
            }
            Err(err) => {
                tracing::error!("Deployment failed: {err:?}");
                Outcome::Failed(err)
            }
        }
    }

    async fn deploy(&self) -> anyhow::Result<Deployment> {
        let artifact = self
            .artifacts
            .resolve(CONTRACT_NAME)
            .with_context(|| format!("could not resolve {CONTRACT_NAME} artifact"))?;
        self.deployer.deploy(&artifact).await
    }
}
