#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod confirm;
pub use confirm::{
    ChainHeads, ConfLevel, ConfirmationRule, HeadTag, resolve, rule_for, verify_conf_levels,
};

mod types;
pub use types::{MsgId, ShardId, StreamId, XBlock, XMsg, XReceipt, stream_name};

mod stream;
pub use stream::{Observation, OrderedBuffer, StreamCursor};

mod provider;
pub use provider::{ProviderRequest, XBlockStream, XProvider};

mod errors;
pub use errors::{ConfLevelError, StreamError, XProviderError};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_util;
