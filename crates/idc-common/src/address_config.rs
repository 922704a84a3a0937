//! Reader for the small textual `config/node-address.config` file the
//! publisher consults for its own public address.

use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;
use std::str::FromStr;

/// Parsed contents of `config/node-address.config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAddressConfig {
    pub public_ip: Ipv4Addr,
}

impl NodeAddressConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommonError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self, CommonError> {
        #[derive(Deserialize)]
        struct Raw {
            public_ip: String,
        }

        let raw: Raw = toml::from_str(contents)
            .map_err(|e| CommonError::Config(format!("invalid node-address.config: {e}")))?;
        let public_ip = Ipv4Addr::from_str(&raw.public_ip)
            .map_err(|e| CommonError::Config(format!("invalid public_ip {:?}: {e}", raw.public_ip)))?;
        Ok(Self { public_ip })
    }
}
