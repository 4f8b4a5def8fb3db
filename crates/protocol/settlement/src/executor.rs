//! Value transfer boundary.

use crate::TransferError;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;

/// Moves native value to a recipient on the destination chain.
#[async_trait]
pub trait TransferExecutor: Send + Sync {
    /// Transfers `amount` to `recipient`.
    ///
    /// On error no value was moved.
    async fn transfer(&self, recipient: Address, amount: U256) -> Result<(), TransferError>;
}

#[async_trait]
impl<T: TransferExecutor + ?Sized> TransferExecutor for Arc<T> {
    async fn transfer(&self, recipient: Address, amount: U256) -> Result<(), TransferError> {
        (**self).transfer(recipient, amount).await
    }
}
