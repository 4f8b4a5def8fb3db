#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod constants;
pub use constants::{CONVERSION_RATE_DENOM, DATA_GAS_BUFFER, PCT_CUT_DENOM, SETTLE_GAS};

mod oracle;
pub use oracle::{ChainFeeParams, FeeOracle, FeeOracleV1, data_gas};

mod quote;
pub use quote::{max_settle_call, settle_fee};

mod pump;
pub use pump::{GasPump, PumpConfig, SimSwap, SwapReceipt, XCall};

mod errors;
pub use errors::{OracleError, PumpError};
