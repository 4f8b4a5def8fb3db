#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod store;
pub use store::{ObservationStore, Recorded, Timed};

mod stats;
pub use stats::{LatencyStats, StatsSnapshot, aggregate, latency};

mod config;
pub use config::MonitorConfig;

mod monitor;
pub use monitor::{LatencyMonitor, MonitorHandle};

mod relay;
pub use relay::{INITIAL_STREAM_OFFSET, OrderedRelayer, RelayReport, XSubmitter};

mod errors;
pub use errors::{MonitorError, RelayError};

mod metrics;
