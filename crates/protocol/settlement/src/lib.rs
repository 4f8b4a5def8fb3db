#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod abi;
pub use abi::{decode_settle_up, encode_settle_up, settleUpCall};

mod request;
pub use request::SettleRequest;

mod executor;
pub use executor::TransferExecutor;

mod station;
pub use station::{GasStation, Settlement};

mod errors;
pub use errors::{SettleError, TransferError};

mod metrics;
