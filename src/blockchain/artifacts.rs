//! Compiled contract artifacts for the CCIP sender and receiver.
//!
//! Accepts the JSON layouts produced by Foundry (`bytecode.object`) and
//! Hardhat (`bytecode` as a hex string).

use ethers::abi::Abi;
use ethers::types::Bytes;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("artifact {path} has no usable ABI: {reason}")]
    Abi { path: String, reason: String },
    #[error("artifact {path} has no creation bytecode")]
    MissingBytecode { path: String },
    #[error("artifact {path} has malformed bytecode: {source}")]
    Bytecode {
        path: String,
        #[source]
        source: hex::FromHexError,
    },
}

#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let origin = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: origin.clone(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(|source| ArtifactError::Json {
            path: origin.clone(),
            source,
        })?;
        Self::from_json(&value, &origin)
    }

    pub fn from_json(value: &Value, origin: &str) -> Result<Self, ArtifactError> {
        let abi_value = value.get("abi").cloned().ok_or_else(|| ArtifactError::Abi {
            path: origin.to_string(),
            reason: "missing 'abi' field".to_string(),
        })?;
        let abi: Abi = serde_json::from_value(abi_value).map_err(|e| ArtifactError::Abi {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;

        let code = match value.get("bytecode") {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(Value::Object(obj)) => obj.get("object").and_then(|v| v.as_str()),
            _ => None,
        };
        let code = code
            .map(|s| s.trim_start_matches("0x"))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ArtifactError::MissingBytecode {
                path: origin.to_string(),
            })?;
        let bytes = hex::decode(code).map_err(|source| ArtifactError::Bytecode {
            path: origin.to_string(),
            source,
        })?;

        Ok(Self {
            abi,
            bytecode: Bytes::from(bytes),
        })
    }
}

/// The contract pair every transfer deploys.
#[derive(Debug, Clone)]
pub struct CcipArtifacts {
    pub sender: ContractArtifact,
    pub receiver: ContractArtifact,
}
