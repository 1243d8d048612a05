//! Compiled contract artifacts and the lookup used to find them by name.

use {
    alloy::{json_abi::JsonAbi, primitives::Bytes},
    serde::Deserialize,
    std::{
        fs,
        io,
        path::{Path, PathBuf},
    },
    thiserror::Error,
};

/// Directory Truffle writes its build outputs to.
pub const DEFAULT_ARTIFACTS_DIR: &str = "build/contracts";

/// A compiled contract ready to be deployed.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub name: String,
    pub abi: JsonAbi,
    /// Creation bytecode, i.e. the init code of the contract.
    pub bytecode: Bytes,
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("no artifact for contract {name} at {}", path.display())]
    NotFound { name: String, path: PathBuf },
    #[error("failed to read artifact {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("artifact {} is not valid JSON", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("artifact for {requested} is named {found}")]
    NameMismatch { requested: String, found: String },
    #[error("artifact for {0} has no bytecode; abstract contracts and interfaces can't be deployed")]
    MissingBytecode(String),
    #[error("artifact for {0} references libraries that were never linked")]
    UnlinkedLibraries(String),
    #[error("artifact for {name} has invalid bytecode: {reason}")]
    InvalidBytecode { name: String, reason: String },
}

/// Resolves contract names to their compiled artifacts.
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactLookup: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Artifact, ArtifactError>;
}

/// Reads `<root>/<name>.json` build outputs. This is the flat layout Truffle
/// writes to `build/contracts`; for Hardhat's nested
/// `artifacts/contracts/<File>.sol/<Name>.json` layout the root must be the
/// folder holding the artifact.
#[derive(Debug, Clone)]
pub struct ArtifactDirectory {
    root: PathBuf,
}

impl ArtifactDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

impl Default for ArtifactDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACTS_DIR)
    }
}

impl ArtifactLookup for ArtifactDirectory {
    fn resolve(&self, name: &str) -> Result<Artifact, ArtifactError> {
        let path = self.path_of(name);
        tracing::debug!(path = %path.display(), "reading contract artifact");
        let json = fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ArtifactError::NotFound {
                name: name.to_owned(),
                path: path.clone(),
            },
            _ => ArtifactError::Io {
                path: path.clone(),
                source,
            },
        })?;
        let raw: RawArtifact = serde_json::from_str(&json)
            .map_err(|source| ArtifactError::Malformed { path, source })?;
        raw.into_artifact(name)
    }
}

/// The subset of a build output this crate cares about. Other properties
/// (`deployedBytecode`, `networks`, `devdoc`, ...) are ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: Option<String>,
    abi: JsonAbi,
    #[serde(default)]
    bytecode: Option<String>,
}

impl RawArtifact {
    fn into_artifact(self, name: &str) -> Result<Artifact, ArtifactError> {
        if let Some(found) = self.contract_name.filter(|found| found != name) {
            return Err(ArtifactError::NameMismatch {
                requested: name.to_owned(),
                found,
            });
        }

        let code = self.bytecode.unwrap_or_default();
        let hex = code.trim().trim_start_matches("0x");
        if hex.is_empty() {
            return Err(ArtifactError::MissingBytecode(name.to_owned()));
        }
        // Truffle leaves `__LibraryName___...` placeholders where library
        // addresses still have to be spliced in.
        if hex.contains("__") {
            return Err(ArtifactError::UnlinkedLibraries(name.to_owned()));
        }
        let bytecode = hex
            .parse::<Bytes>()
            .map_err(|err| ArtifactError::InvalidBytecode {
                name: name.to_owned(),
                reason: err.to_string(),
            })?;

        Ok(Artifact {
            name: name.to_owned(),
            abi: self.abi,
            bytecode,
        })
    }
}
