//! The block stream boundary.

use crate::{ConfLevel, XBlock, XProviderError};
use alloy_primitives::ChainId;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// A stream of cross chain blocks, in height order.
pub type XBlockStream = BoxStream<'static, Result<XBlock, XProviderError>>;

/// Parameters of a block stream subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderRequest {
    /// Chain to stream.
    pub chain_id: ChainId,
    /// First height to stream.
    pub height: u64,
    /// Blocks are only delivered once they satisfy this level.
    pub conf_level: ConfLevel,
}

/// Delivers the cross chain blocks of many chains, multiplexed by chain id.
#[async_trait]
pub trait XProvider: Send + Sync {
    /// Opens a stream of [XBlock]s as described by `req`.
    ///
    /// An error here means the subscription never started. Errors after that are yielded by
    /// the stream, which ends after yielding one.
    async fn stream(&self, req: ProviderRequest) -> Result<XBlockStream, XProviderError>;
}
