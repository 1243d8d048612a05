use {
    crate::artifact::Artifact,
    alloy::{
        network::{EthereumWallet, ReceiptResponse, TransactionBuilder},
        primitives::{Address, B256},
        providers::{DynProvider, Provider, ProviderBuilder},
        rpc::{
            client::ClientBuilder,
            types::{TransactionReceipt, TransactionRequest},
        },
        signers::local::PrivateKeySigner,
    },
    anyhow::{Context, Result, ensure},
    url::Url,
};

/// Summary of a mined contract-creation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Submits compiled contracts to a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Deployer: Send + Sync {
    /// Deploys the artifact's creation bytecode and waits until the
    /// transaction is mined.
    async fn deploy(&self, artifact: &Artifact) -> Result<Deployment>;
}

/// Deploys contracts through a JSON-RPC node, signing with a local key.
pub struct AlloyDeployer {
    provider: DynProvider,
    sender: Address,
    confirmations: u64,
    gas_limit: Option<u64>,
}

impl AlloyDeployer {
    pub fn new(node_url: &Url, signer: PrivateKeySigner) -> Self {
        let sender = signer.address();
        let rpc = ClientBuilder::default().http(node_url.clone());
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::new(signer))
            .connect_client(rpc)
            .erased();
        Self::with_provider(provider, sender)
    }

    /// Deploys through an already configured provider which must be able to
    /// send transactions from `sender`.
    pub fn with_provider(provider: DynProvider, sender: Address) -> Self {
        Self {
            provider,
            sender,
            confirmations: 1,
            gas_limit: None,
        }
    }

    /// Number of confirmations to wait for, counting the block that includes
    /// the deployment as the first one. Values below 1 are treated as 1.
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    /// Skips gas estimation and uses a fixed gas limit instead.
    pub fn with_gas_limit(mut self, gas_limit: Option<u64>) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn sender(&self) -> Address {
        self.sender
    }
}

#[async_trait::async_trait]
impl Deployer for AlloyDeployer {
    async fn deploy(&self, artifact: &Artifact) -> Result<Deployment> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .context("could not fetch current chain id")?;
        tracing::debug!(
            contract = %artifact.name,
            chain_id,
            sender = ?self.sender,
            bytecode_len = artifact.bytecode.len(),
            "deploying contract"
        );

        let mut tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_deploy_code(artifact.bytecode.clone());
        if let Some(gas_limit) = self.gas_limit {
            tx = tx.with_gas_limit(gas_limit);
        }

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .context("failed to submit deployment transaction")?;
        tracing::debug!(tx_hash = ?pending.tx_hash(), "deployment transaction submitted");

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .context("failed to fetch deployment receipt")?;
        deployment_from_receipt(&receipt)
    }
}

/// Checks that a mined contract-creation transaction actually created a
/// contract.
fn deployment_from_receipt(receipt: &TransactionReceipt) -> Result<Deployment> {
    ensure!(
        receipt.status(),
        "deployment transaction {:?} reverted",
        receipt.transaction_hash
    );
    let address = receipt.contract_address.with_context(|| {
        format!(
            "receipt of deployment transaction {:?} has no contract address",
            receipt.transaction_hash
        )
    })?;

    Ok(Deployment {
        address,
        transaction_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
    })
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            json_abi::JsonAbi,
            primitives::{Bytes, U64, address},
            providers::mock::Asserter,
        },
        serde_json::json,
    };

    // Anvil's first prefunded development account.
    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn confirmations_never_drop_below_one() {
        let url = Url::parse("http://localhost:8545").unwrap();
        let deployer =
            AlloyDeployer::new(&url, ANVIL_KEY.parse().unwrap()).with_confirmations(0);
        assert_eq!(deployer.confirmations, 1);

        let deployer = deployer.with_confirmations(3).with_gas_limit(Some(100_000));
        assert_eq!(deployer.confirmations, 3);
        assert_eq!(deployer.gas_limit, Some(100_000));
    }

    #[test]
    fn sender_is_signer_address() {
        let url = Url::parse("http://localhost:8545").unwrap();
        let signer: PrivateKeySigner = ANVIL_KEY.parse().unwrap();
        let expected = signer.address();

        assert_eq!(AlloyDeployer::new(&url, signer).sender(), expected);
    }

    const TX_HASH: &str = "0x2a3e6b8f1c1d2c8c9f58b63df39d4a0e6b7e4b7fb0c63d7e8a0f44f5b5cfd9a1";

    fn todo_list() -> Artifact {
        Artifact {
            name: "TodoList".to_owned(),
            abi: JsonAbi::new(),
            bytecode: "0x6001600c60003960016000f300".parse::<Bytes>().unwrap(),
        }
    }

    /// Deployer talking to a scripted node. No fillers are installed so the
    /// requests hit the node in the order `deploy` issues them.
    fn mocked_deployer(asserter: &Asserter) -> AlloyDeployer {
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter.clone())
            .erased();
        AlloyDeployer::with_provider(
            provider,
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
        )
    }

    fn receipt(status: &str, contract_address: serde_json::Value) -> TransactionReceipt {
        serde_json::from_value(json!({
            "type": "0x2",
            "status": status,
            "cumulativeGasUsed": "0x5208",
            "logs": [],
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "transactionHash": TX_HASH,
            "transactionIndex": "0x0",
            "blockHash": "0x7d1c8a8e2c2c5b9f0f3d0b7c1f6e4a1b2c3d4e5f60718293a4b5c6d7e8f90a1b",
            "blockNumber": "0x1",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x3b9aca00",
            "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "to": null,
            "contractAddress": contract_address,
        }))
        .unwrap()
    }

    #[test]
    fn successful_receipt() {
        let deployment = deployment_from_receipt(&receipt(
            "0x1",
            json!("0x5fbdb2315678afecb367f032d93f642f64180aa3"),
        ))
        .unwrap();

        assert_eq!(
            deployment.address,
            address!("0x5FbDB2315678afecb367f032d93F642f64180aa3")
        );
        assert_eq!(deployment.transaction_hash, TX_HASH.parse::<B256>().unwrap());
        assert_eq!(deployment.block_number, Some(1));
        assert_eq!(deployment.gas_used, 21_000);
    }

    #[test]
    fn reverted_receipt() {
        let err = deployment_from_receipt(&receipt(
            "0x0",
            json!("0x5fbdb2315678afecb367f032d93f642f64180aa3"),
        ))
        .unwrap_err();

        assert!(err.to_string().contains("reverted"));
        assert!(err.to_string().contains(TX_HASH));
    }

    #[test]
    fn receipt_without_contract_address() {
        let err = deployment_from_receipt(&receipt("0x1", serde_json::Value::Null)).unwrap_err();

        assert!(err.to_string().contains("has no contract address"));
    }

    #[tokio::test]
    async fn chain_id_failure() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("connection refused");

        let err = mocked_deployer(&asserter)
            .deploy(&todo_list())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "could not fetch current chain id");
        assert!(format!("{err:?}").contains("connection refused"));
    }

    #[tokio::test]
    async fn submission_failure() {
        let asserter = Asserter::new();
        asserter.push_success(&U64::from(31337));
        asserter.push_failure_msg("insufficient funds for gas * price + value");

        let err = mocked_deployer(&asserter)
            .deploy(&todo_list())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "failed to submit deployment transaction");
        assert!(format!("{err:?}").contains("insufficient funds"));
    }

    #[tokio::test]
    #[ignore]
    async fn local_node_deploy() {
        let url = Url::parse("http://localhost:8545").unwrap();
        let deployer = AlloyDeployer::new(&url, ANVIL_KEY.parse().unwrap());

        // The init code deploys a contract consisting of a single `STOP`.
        let deployment = deployer.deploy(&todo_list()).await.unwrap();
        assert_ne!(deployment.address, Address::ZERO);
        assert!(deployment.gas_used > 0);

        let code = deployer
            .provider
            .get_code_at(deployment.address)
            .await
            .unwrap();
        assert_eq!(code.as_ref(), &[0x00]);
    }
}
