//! Test utilities for `omni-xchain`.

#![allow(missing_docs, unreachable_pub, unused)]

use crate::{
    ConfLevel, MsgId, ProviderRequest, XBlock, XBlockStream, XMsg, XProvider, XProviderError,
    XReceipt,
};
use alloy_primitives::{Address, B256, Bytes, ChainId, keccak256};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

/// An [XProvider] serving preloaded blocks.
///
/// Streams stay open after the last preloaded block, like a live chain without new blocks.
#[derive(Debug, Default)]
pub struct MockXProvider {
    blocks: Mutex<HashMap<ChainId, Vec<XBlock>>>,
    unreachable: Mutex<HashSet<ChainId>>,
    fail_after: Mutex<HashMap<ChainId, usize>>,
    subscriptions: Mutex<HashMap<ChainId, usize>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockXProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocks(self, chain_id: ChainId, blocks: Vec<XBlock>) -> Self {
        self.blocks.lock().unwrap().entry(chain_id).or_default().extend(blocks);
        self
    }

    pub fn with_unreachable(self, chain_id: ChainId) -> Self {
        self.unreachable.lock().unwrap().insert(chain_id);
        self
    }

    /// The next subscription to `chain_id` yields `blocks` blocks, then an error.
    pub fn with_failure_after(self, chain_id: ChainId, blocks: usize) -> Self {
        self.fail_after.lock().unwrap().insert(chain_id, blocks);
        self
    }

    /// Number of subscriptions opened for `chain_id`, failed ones included.
    pub fn subscriptions(&self, chain_id: ChainId) -> usize {
        self.subscriptions.lock().unwrap().get(&chain_id).copied().unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl XProvider for MockXProvider {
    async fn stream(&self, req: ProviderRequest) -> Result<XBlockStream, XProviderError> {
        *self.subscriptions.lock().unwrap().entry(req.chain_id).or_default() += 1;
        self.requests.lock().unwrap().push(req);

        if self.unreachable.lock().unwrap().contains(&req.chain_id) {
            return Err(XProviderError::Unreachable {
                chain_id: req.chain_id,
                reason: "mock unreachable".to_string(),
            });
        }

        let blocks: Vec<_> = self
            .blocks
            .lock()
            .unwrap()
            .get(&req.chain_id)
            .map(|blocks| blocks.iter().filter(|b| b.height >= req.height).cloned().collect())
            .unwrap_or_default();

        match self.fail_after.lock().unwrap().remove(&req.chain_id) {
            Some(n) => {
                let height = blocks.get(n).map_or(req.height, |b| b.height);
                let err = XProviderError::Stream {
                    chain_id: req.chain_id,
                    height,
                    reason: "mock stream failure".to_string(),
                };
                let items: Vec<_> = blocks.into_iter().take(n).map(Ok).chain([Err(err)]).collect();
                Ok(stream::iter(items).boxed())
            }
            None => {
                let items = blocks.into_iter().map(Ok::<_, XProviderError>);
                Ok(stream::iter(items).chain(stream::pending()).boxed())
            }
        }
    }
}

/// Builds [XBlock]s for tests.
#[derive(Debug, Clone)]
pub struct XBlockBuilder {
    block: XBlock,
}

impl XBlockBuilder {
    pub fn new(chain_id: ChainId, height: u64) -> Self {
        let mut seed = [0u8; 16];
        seed[..8].copy_from_slice(&chain_id.to_be_bytes());
        seed[8..].copy_from_slice(&height.to_be_bytes());

        Self {
            block: XBlock {
                chain_id,
                height,
                hash: keccak256(seed),
                timestamp: height,
                msgs: vec![],
                receipts: vec![],
            },
        }
    }

    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.block.timestamp = timestamp;
        self
    }

    /// Adds a message from this chain to `dest_chain_id`.
    pub fn msg(mut self, dest_chain_id: ChainId, offset: u64, conf_level: ConfLevel) -> Self {
        self.block.msgs.push(XMsg::new(
            self.block.chain_id,
            dest_chain_id,
            offset,
            Address::repeat_byte(0xaa),
            Address::repeat_byte(0xbb),
            Bytes::new(),
            100_000,
            conf_level,
        ));
        self
    }

    /// Adds a successful receipt of `msg_id`.
    pub fn receipt(mut self, msg_id: MsgId) -> Self {
        self.block.receipts.push(XReceipt {
            msg_id,
            success: true,
            gas_used: 50_000,
            relayer: Address::repeat_byte(0xcc),
        });
        self
    }

    pub fn build(self) -> XBlock {
        self.block
    }
}
