#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod chain;
pub use chain::{Chain, FinalizationStrat};

mod ids;
pub use ids::{
    CONSENSUS_ID_OFFSET, ETHEREUM_CHAIN_ID, HOLESKY_CHAIN_ID, is_omni_consensus, is_omni_execution,
    layer1_chain_id, omni_consensus_chain_id, omni_execution_chain_id,
};

mod network;
pub use network::{ChainRole, Network, NetworkId};

mod errors;
pub use errors::{NetconfError, NetconfResult};

mod io;
pub use io::{load, save};
