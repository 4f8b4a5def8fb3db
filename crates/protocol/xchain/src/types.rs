//! Cross chain messages, receipts and the streams they travel on.

use crate::ConfLevel;
use alloy_primitives::{Address, B256, Bytes, ChainId, keccak256};
use alloy_sol_types::SolValue;
use derive_more::{Display, From, Into};
use omni_netconf::Network;
use serde::{Deserialize, Serialize};

/// Identifies a sub stream between two chains.
///
/// Messages are emitted on the shard of their confirmation level, so each level of a chain pair
/// is ordered independently.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
pub struct ShardId(pub u64);

impl ShardId {
    /// Shard of [`ConfLevel::Latest`] messages.
    pub const LATEST: Self = Self(1);
    /// Shard of [`ConfLevel::Safe`] messages.
    pub const SAFE: Self = Self(2);
    /// Shard of [`ConfLevel::Finalized`] messages.
    pub const FINALIZED: Self = Self(4);

    /// Returns the confirmation level of the shard, if it is a known one.
    pub const fn conf_level(self) -> Option<ConfLevel> {
        match self {
            Self::LATEST => Some(ConfLevel::Latest),
            Self::SAFE => Some(ConfLevel::Safe),
            Self::FINALIZED => Some(ConfLevel::Finalized),
            _ => None,
        }
    }
}

/// An ordered channel of messages from one chain to another.
///
/// Messages on one stream carry strictly increasing offsets and are delivered in that order.
/// Different streams are unordered with respect to each other.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[display("{source_chain_id}-{dest_chain_id}-{shard_id}")]
pub struct StreamId {
    /// Chain the messages are emitted on.
    pub source_chain_id: ChainId,
    /// Chain the messages are executed on.
    pub dest_chain_id: ChainId,
    /// Shard within the chain pair.
    pub shard_id: ShardId,
}

impl StreamId {
    /// Creates a new [StreamId].
    pub const fn new(source_chain_id: ChainId, dest_chain_id: ChainId, shard_id: ShardId) -> Self {
        Self { source_chain_id, dest_chain_id, shard_id }
    }
}

/// Identifies a message by its position on its stream.
///
/// Source, relayer and destination derive the same id from chain data alone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[display("{stream_id}/{stream_offset}")]
pub struct MsgId {
    /// Stream of the message.
    pub stream_id: StreamId,
    /// Position of the message on its stream.
    pub stream_offset: u64,
}

impl MsgId {
    /// Creates a new [MsgId].
    pub const fn new(stream_id: StreamId, stream_offset: u64) -> Self {
        Self { stream_id, stream_offset }
    }

    /// Returns the canonical hash of the id.
    ///
    /// `keccak256(abi.encode(uint64 source, uint64 dest, uint64 shard, uint64 offset))`.
    pub fn hash(&self) -> B256 {
        let encoded = (
            self.stream_id.source_chain_id,
            self.stream_id.dest_chain_id,
            self.stream_id.shard_id.0,
            self.stream_offset,
        )
            .abi_encode();
        keccak256(encoded)
    }
}

/// A call emitted on a source chain for execution on a destination chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XMsg {
    /// Id of the message.
    pub id: MsgId,
    /// Caller on the source chain.
    pub sender: Address,
    /// Target on the destination chain.
    pub to: Address,
    /// Calldata.
    pub data: Bytes,
    /// Gas limit of the call on the destination chain.
    pub gas_limit: u64,
    /// Confirmation level required before relaying.
    pub conf_level: ConfLevel,
}

impl XMsg {
    /// Creates a message on the stream implied by the chain pair and `conf_level`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_chain_id: ChainId,
        dest_chain_id: ChainId,
        stream_offset: u64,
        sender: Address,
        to: Address,
        data: Bytes,
        gas_limit: u64,
        conf_level: ConfLevel,
    ) -> Self {
        let stream_id = StreamId::new(source_chain_id, dest_chain_id, conf_level.shard());
        Self {
            id: MsgId::new(stream_id, stream_offset),
            sender,
            to,
            data,
            gas_limit,
            conf_level,
        }
    }

    /// Returns the source chain id.
    pub const fn source_chain_id(&self) -> ChainId {
        self.id.stream_id.source_chain_id
    }

    /// Returns the destination chain id.
    pub const fn dest_chain_id(&self) -> ChainId {
        self.id.stream_id.dest_chain_id
    }

    /// Returns the stream of the message.
    pub const fn stream_id(&self) -> StreamId {
        self.id.stream_id
    }

    /// Returns the offset of the message on its stream.
    pub const fn stream_offset(&self) -> u64 {
        self.id.stream_offset
    }
}

/// The result of executing an [XMsg] on its destination chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XReceipt {
    /// Id of the executed message.
    pub msg_id: MsgId,
    /// Whether the call succeeded.
    pub success: bool,
    /// Gas used by the call.
    pub gas_used: u64,
    /// Address that submitted the call.
    pub relayer: Address,
}

impl XReceipt {
    /// Returns the source chain id of the executed message.
    pub const fn source_chain_id(&self) -> ChainId {
        self.msg_id.stream_id.source_chain_id
    }

    /// Returns the destination chain id, i.e. the chain the receipt was emitted on.
    pub const fn dest_chain_id(&self) -> ChainId {
        self.msg_id.stream_id.dest_chain_id
    }

    /// Returns the stream of the executed message.
    pub const fn stream_id(&self) -> StreamId {
        self.msg_id.stream_id
    }
}

/// The cross chain contents of one block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XBlock {
    /// Chain of the block.
    pub chain_id: ChainId,
    /// Block height.
    pub height: u64,
    /// Block hash.
    pub hash: B256,
    /// Block timestamp in unix seconds.
    pub timestamp: u64,
    /// Messages emitted in the block, in stream offset order per stream.
    pub msgs: Vec<XMsg>,
    /// Receipts emitted in the block.
    pub receipts: Vec<XReceipt>,
}

/// Returns a human readable name of the stream, `<source>|<dest>|<level>`.
///
/// Chains missing from `network` are named by id, unknown shards by number.
pub fn stream_name(network: &Network, stream_id: StreamId) -> String {
    let chain = |id: ChainId| match network.chain_name(id) {
        "" => id.to_string(),
        name => name.to_string(),
    };
    let shard = stream_id
        .shard_id
        .conf_level()
        .map_or_else(|| stream_id.shard_id.to_string(), |level| level.short().to_string());

    format!("{}|{}|{}", chain(stream_id.source_chain_id), chain(stream_id.dest_chain_id), shard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use omni_netconf::{Chain, FinalizationStrat, NetworkId};

    fn msg(offset: u64, level: ConfLevel) -> XMsg {
        XMsg::new(2, 3, offset, Address::ZERO, Address::repeat_byte(1), Bytes::new(), 100, level)
    }

    #[test]
    fn test_stream_derived_from_conf_level() {
        let latest = msg(0, ConfLevel::Latest);
        let finalized = msg(0, ConfLevel::Finalized);

        assert_eq!(latest.stream_id(), StreamId::new(2, 3, ShardId::LATEST));
        assert_eq!(finalized.stream_id(), StreamId::new(2, 3, ShardId::FINALIZED));
        assert_ne!(latest.id, finalized.id);
        assert_eq!(latest.source_chain_id(), 2);
        assert_eq!(latest.dest_chain_id(), 3);
    }

    #[test]
    fn test_msg_id_hash_is_pure() {
        let a = msg(7, ConfLevel::Finalized);
        let b = XMsg { data: Bytes::from_static(b"other"), gas_limit: 1, ..a.clone() };

        assert_eq!(a.id.hash(), b.id.hash());
        assert_eq!(a.id.hash(), MsgId::new(StreamId::new(2, 3, ShardId(4)), 7).hash());
        assert_ne!(a.id.hash(), msg(8, ConfLevel::Finalized).id.hash());
        assert_ne!(a.id.hash(), msg(7, ConfLevel::Latest).id.hash());
    }

    #[test]
    fn test_msg_id_hash_encoding() {
        let zero = MsgId::new(StreamId::new(0, 0, ShardId(0)), 0);
        assert_eq!(zero.hash(), keccak256([0u8; 128]));

        // Each field is a big endian, left padded 32 byte word.
        let mut words = [0u8; 128];
        words[31] = 2;
        words[63] = 3;
        words[95] = 4;
        words[127] = 7;
        let id = MsgId::new(StreamId::new(2, 3, ShardId::FINALIZED), 7);
        assert_eq!(id.hash(), keccak256(words));
    }

    #[test]
    fn test_stream_order_is_deterministic() {
        let mut streams = vec![
            StreamId::new(3, 2, ShardId::LATEST),
            StreamId::new(2, 3, ShardId::FINALIZED),
            StreamId::new(2, 3, ShardId::LATEST),
        ];
        streams.sort();
        assert_eq!(
            streams,
            vec![
                StreamId::new(2, 3, ShardId::LATEST),
                StreamId::new(2, 3, ShardId::FINALIZED),
                StreamId::new(3, 2, ShardId::LATEST),
            ]
        );
    }

    #[test]
    fn test_stream_name() {
        let chain = |id, name: &str| Chain {
            id,
            name: name.to_string(),
            portal_address: Address::ZERO,
            deploy_height: 0,
            block_period: Duration::from_secs(1),
            finalization_strat: FinalizationStrat::Finalized,
        };
        let network =
            Network::new(NetworkId::Simnet, vec![chain(2, "rollupA"), chain(3, "rollupB")]);

        assert_eq!(
            stream_name(&network, StreamId::new(2, 3, ShardId::FINALIZED)),
            "rollupA|rollupB|F"
        );
        assert_eq!(stream_name(&network, StreamId::new(3, 9, ShardId::LATEST)), "rollupB|9|L");
        assert_eq!(stream_name(&network, StreamId::new(2, 3, ShardId(8))), "rollupA|rollupB|8");
    }

    #[test]
    fn test_receipt_accessors() {
        let msg = msg(1, ConfLevel::Latest);
        let receipt =
            XReceipt { msg_id: msg.id, success: true, gas_used: 21_000, relayer: Address::ZERO };

        assert_eq!(receipt.source_chain_id(), 2);
        assert_eq!(receipt.dest_chain_id(), 3);
        assert_eq!(receipt.stream_id(), msg.stream_id());
        assert_eq!(msg.id.to_string(), "2-3-1/1");
    }
}
