//! Confirmation levels and how they resolve against a chain's finalization strategy.

use crate::{ConfLevelError, ShardId};
use alloy_primitives::ChainId;
use omni_netconf::{FinalizationStrat, Network};
use serde::{Deserialize, Serialize};

/// The guarantee a message requires on its source chain before it may be relayed.
#[derive(
    Debug,
    Clone,
    Copy,
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
pub enum ConfLevel {
    /// The head block, reorgs possible.
    Latest,
    /// The safe head.
    Safe,
    /// Final according to the chain's own consensus.
    Finalized,
}

impl ConfLevel {
    /// Returns the one letter label used in stream names.
    pub const fn short(self) -> &'static str {
        match self {
            Self::Latest => "L",
            Self::Safe => "S",
            Self::Finalized => "F",
        }
    }

    /// Returns the shard that messages of this level are emitted on.
    pub const fn shard(self) -> ShardId {
        match self {
            Self::Latest => ShardId::LATEST,
            Self::Safe => ShardId::SAFE,
            Self::Finalized => ShardId::FINALIZED,
        }
    }
}

/// The concrete head a provider follows to honour a [ConfLevel].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum HeadTag {
    /// `latest` block tag.
    Latest,
    /// `safe` block tag.
    Safe,
    /// `finalized` block tag.
    Finalized,
}

/// Resolves a requested [ConfLevel] to the head a chain with `strat` must be followed at.
///
/// `Finalized` means final per the chain itself, so a chain that only exposes a safe head is
/// followed at its safe head. A chain that only exposes its latest head cannot satisfy `Safe` or
/// `Finalized`.
pub fn resolve(strat: FinalizationStrat, level: ConfLevel) -> Result<HeadTag, ConfLevelError> {
    match (level, strat) {
        (ConfLevel::Latest, _) => Ok(HeadTag::Latest),
        (ConfLevel::Safe, FinalizationStrat::Safe | FinalizationStrat::Finalized) => {
            Ok(HeadTag::Safe)
        }
        (ConfLevel::Finalized, FinalizationStrat::Finalized) => Ok(HeadTag::Finalized),
        (ConfLevel::Finalized, FinalizationStrat::Safe) => Ok(HeadTag::Safe),
        (ConfLevel::Safe | ConfLevel::Finalized, FinalizationStrat::Latest) => {
            Err(ConfLevelError::Unsupported { strat, level })
        }
    }
}

/// Heads of a chain as last reported by its provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainHeads {
    /// Latest block height.
    pub latest: u64,
    /// Safe block height, if known.
    pub safe: Option<u64>,
    /// Finalized block height, if known.
    pub finalized: Option<u64>,
}

impl ChainHeads {
    /// Returns the height of the given head.
    pub const fn get(&self, tag: HeadTag) -> Option<u64> {
        match tag {
            HeadTag::Latest => Some(self.latest),
            HeadTag::Safe => self.safe,
            HeadTag::Finalized => self.finalized,
        }
    }
}

/// When blocks of one chain become ready at one confirmation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationRule {
    /// The chain.
    pub chain_id: ChainId,
    /// Requested level.
    pub level: ConfLevel,
    /// Head followed to honour `level`.
    pub head: HeadTag,
}

impl ConfirmationRule {
    /// Returns the highest ready height, or `None` if the followed head is not known yet.
    pub const fn ready_height(&self, heads: &ChainHeads) -> Option<u64> {
        heads.get(self.head)
    }

    /// Returns true if the block at `height` is ready to be relayed.
    pub fn is_ready(&self, height: u64, heads: &ChainHeads) -> bool {
        self.ready_height(heads).is_some_and(|ready| height <= ready)
    }
}

/// Returns the [ConfirmationRule] of `chain_id` in `network` at `level`.
pub fn rule_for(
    network: &Network,
    chain_id: ChainId,
    level: ConfLevel,
) -> Result<ConfirmationRule, ConfLevelError> {
    let chain = network.chain(chain_id).ok_or(ConfLevelError::UnknownChain(chain_id))?;
    let head = resolve(chain.finalization_strat, level).map_err(|_| {
        tracing::warn!(
            target: "xchain",
            chain_id,
            name = %chain.name,
            strat = %chain.finalization_strat,
            %level,
            "Confirmation level not supported by chain"
        );
        ConfLevelError::UnsupportedChain {
            chain_id,
            name: chain.name.clone(),
            strat: chain.finalization_strat,
            level,
        }
    })?;

    Ok(ConfirmationRule { chain_id, level, head })
}

/// Checks that every chain in `chain_ids` can be followed at `level`.
///
/// Meant to run at startup so that an unsupported level never surfaces at relay time.
pub fn verify_conf_levels(
    network: &Network,
    chain_ids: impl IntoIterator<Item = ChainId>,
    level: ConfLevel,
) -> Result<Vec<ConfirmationRule>, ConfLevelError> {
    chain_ids.into_iter().map(|chain_id| rule_for(network, chain_id, level)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use core::time::Duration;
    use omni_netconf::{Chain, NetworkId};
    use rstest::rstest;

    #[rstest]
    #[case(FinalizationStrat::Finalized, ConfLevel::Latest, Some(HeadTag::Latest))]
    #[case(FinalizationStrat::Finalized, ConfLevel::Safe, Some(HeadTag::Safe))]
    #[case(FinalizationStrat::Finalized, ConfLevel::Finalized, Some(HeadTag::Finalized))]
    #[case(FinalizationStrat::Safe, ConfLevel::Latest, Some(HeadTag::Latest))]
    #[case(FinalizationStrat::Safe, ConfLevel::Safe, Some(HeadTag::Safe))]
    #[case(FinalizationStrat::Safe, ConfLevel::Finalized, Some(HeadTag::Safe))]
    #[case(FinalizationStrat::Latest, ConfLevel::Latest, Some(HeadTag::Latest))]
    #[case(FinalizationStrat::Latest, ConfLevel::Safe, None)]
    #[case(FinalizationStrat::Latest, ConfLevel::Finalized, None)]
    fn test_resolve(
        #[case] strat: FinalizationStrat,
        #[case] level: ConfLevel,
        #[case] expected: Option<HeadTag>,
    ) {
        match expected {
            Some(head) => assert_eq!(resolve(strat, level), Ok(head)),
            None => {
                assert_eq!(resolve(strat, level), Err(ConfLevelError::Unsupported { strat, level }))
            }
        }
    }

    #[test]
    fn test_rule_readiness() {
        let rule =
            ConfirmationRule { chain_id: 2, level: ConfLevel::Finalized, head: HeadTag::Finalized };

        let heads = ChainHeads { latest: 100, safe: Some(90), finalized: None };
        assert_eq!(rule.ready_height(&heads), None);
        assert!(!rule.is_ready(1, &heads));

        let heads = ChainHeads { finalized: Some(80), ..heads };
        assert!(rule.is_ready(80, &heads));
        assert!(!rule.is_ready(81, &heads));

        let latest = ConfirmationRule { head: HeadTag::Latest, ..rule };
        assert!(latest.is_ready(100, &heads));
        assert!(!latest.is_ready(101, &heads));
    }

    fn network() -> Network {
        let chain = |id, name: &str, finalization_strat| Chain {
            id,
            name: name.to_string(),
            portal_address: Address::repeat_byte(0x01),
            deploy_height: 0,
            block_period: Duration::from_secs(1),
            finalization_strat,
        };

        Network::new(
            NetworkId::Simnet,
            vec![
                chain(2, "rollupA", FinalizationStrat::Finalized),
                chain(3, "rollupB", FinalizationStrat::Latest),
            ],
        )
    }

    #[test]
    fn test_verify_conf_levels() {
        let network = network();

        let rules = verify_conf_levels(&network, [2, 3], ConfLevel::Latest).unwrap();
        assert!(rules.iter().all(|rule| rule.head == HeadTag::Latest));

        let err = verify_conf_levels(&network, [2, 3], ConfLevel::Finalized).unwrap_err();
        assert_eq!(
            err,
            ConfLevelError::UnsupportedChain {
                chain_id: 3,
                name: "rollupB".to_string(),
                strat: FinalizationStrat::Latest,
                level: ConfLevel::Finalized,
            }
        );

        let err = rule_for(&network, 4, ConfLevel::Latest).unwrap_err();
        assert_eq!(err, ConfLevelError::UnknownChain(4));
    }

    #[test]
    fn test_short_labels() {
        assert_eq!(ConfLevel::Latest.short(), "L");
        assert_eq!(ConfLevel::Safe.short(), "S");
        assert_eq!(ConfLevel::Finalized.short(), "F");
        assert_eq!(ConfLevel::Finalized.to_string(), "finalized");
    }

    #[test]
    fn test_conf_level_serde() {
        assert_eq!(serde_json::to_string(&ConfLevel::Safe).unwrap(), "\"safe\"");
        let level: ConfLevel = serde_json::from_str("\"finalized\"").unwrap();
        assert_eq!(level, ConfLevel::Finalized);
        assert!(serde_json::from_str::<ConfLevel>("\"Finalized\"").is_err());
        assert_eq!("latest".parse::<ConfLevel>(), Ok(ConfLevel::Latest));
    }
}
