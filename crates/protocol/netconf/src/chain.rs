//! Chain configuration and its JSON encoding.

use crate::NetconfError;
use alloy_primitives::{Address, ChainId};
use core::{str::FromStr, time::Duration};
use serde::{Deserialize, Serialize};

/// The finalization strategy of a chain.
///
/// Most chains expose a finalized head, but some (e.g. zkEVM rollups) only expose a safe or
/// latest head. The strategy names the strongest head the chain can be followed at.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FinalizationStrat {
    /// Only the latest head is available.
    Latest,
    /// A safe head is available.
    Safe,
    /// A finalized head is available.
    #[default]
    Finalized,
}

/// A chain that supports the Omni cross chain protocol.
///
/// This is most rollup EVMs, but also the Omni EVM and the Omni consensus chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChainJson", into = "ChainJson")]
pub struct Chain {
    /// Chain id as per <https://chainlist.org>.
    pub id: ChainId,
    /// Chain name.
    pub name: String,
    /// Address of the portal contract, [`Address::ZERO`] if not deployed yet.
    pub portal_address: Address,
    /// Height at which the portal contract was deployed.
    pub deploy_height: u64,
    /// Block period of the chain.
    pub block_period: Duration,
    /// Finalization strategy of the chain.
    pub finalization_strat: FinalizationStrat,
}

impl Chain {
    /// Returns true if the portal contract address is known.
    pub fn has_portal(&self) -> bool {
        !self.portal_address.is_zero()
    }
}

/// On-disk encoding of a [Chain].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChainJson {
    id: ChainId,
    name: String,
    #[serde(default)]
    portal_address: String,
    #[serde(default)]
    deploy_height: u64,
    block_period: String,
    #[serde(rename = "finalization_start")]
    finalization_strat: FinalizationStrat,
}

impl TryFrom<ChainJson> for Chain {
    type Error = NetconfError;

    fn try_from(json: ChainJson) -> Result<Self, Self::Error> {
        let block_period = humantime::parse_duration(&json.block_period)
            .map_err(|err| NetconfError::invalid_chain(json.id, "block_period", err))?;

        // An empty portal address means "not deployed yet", never the zero address.
        let portal_address = if json.portal_address.is_empty() {
            Address::ZERO
        } else {
            Address::from_str(&json.portal_address)
                .map_err(|err| NetconfError::invalid_chain(json.id, "portal_address", err))?
        };

        Ok(Self {
            id: json.id,
            name: json.name,
            portal_address,
            deploy_height: json.deploy_height,
            block_period,
            finalization_strat: json.finalization_strat,
        })
    }
}

impl From<Chain> for ChainJson {
    fn from(chain: Chain) -> Self {
        let portal_address = if chain.has_portal() {
            chain.portal_address.to_checksum(None)
        } else {
            String::new()
        };

        Self {
            id: chain.id,
            name: chain.name,
            portal_address,
            deploy_height: chain.deploy_height,
            block_period: humantime::format_duration(chain.block_period).to_string(),
            finalization_strat: chain.finalization_strat,
        }
    }
}
