#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod styles;
pub use styles::cli_styles;

mod log;
pub use log::{FileLogConfig, LogArgs, LogConfig, LogRotation, StdoutLogConfig};

mod tracing;
pub use self::tracing::{LogFormat, init_test_tracing};

mod metrics;
pub use self::metrics::{MetricsArgs, MetricsError};
