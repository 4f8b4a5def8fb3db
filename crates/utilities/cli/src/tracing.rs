//! [tracing_subscriber] utilities.

use crate::{LogConfig, LogRotation};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    prelude::__tracing_subscriber_SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Prefix of the log file names.
const LOG_FILE_PREFIX: &str = "omni.log";

/// The format of the logs.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum LogFormat {
    /// Full format (default).
    #[default]
    Full,
    /// JSON format.
    Json,
    /// Pretty format.
    Pretty,
    /// Compact format.
    Compact,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

impl LogFormat {
    fn stdout_layer(self) -> BoxedLayer {
        match self {
            Self::Full => tracing_subscriber::fmt::layer().boxed(),
            Self::Json => tracing_subscriber::fmt::layer().json().boxed(),
            Self::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
            Self::Compact => tracing_subscriber::fmt::layer().compact().boxed(),
        }
    }

    fn file_layer(self, appender: RollingFileAppender) -> BoxedLayer {
        let layer = tracing_subscriber::fmt::layer().with_ansi(false).with_writer(appender);
        match self {
            Self::Full => layer.boxed(),
            Self::Json => layer.json().boxed(),
            Self::Pretty => layer.pretty().boxed(),
            Self::Compact => layer.compact().boxed(),
        }
    }
}

impl LogRotation {
    fn appender(self, directory: &Path) -> RollingFileAppender {
        match self {
            Self::Minutely => tracing_appender::rolling::minutely(directory, LOG_FILE_PREFIX),
            Self::Hourly => tracing_appender::rolling::hourly(directory, LOG_FILE_PREFIX),
            Self::Daily => tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX),
            Self::Never => tracing_appender::rolling::never(directory, LOG_FILE_PREFIX),
        }
    }
}

impl LogConfig {
    /// Initializes the global tracing subscriber.
    ///
    /// The global level is added as a directive on top of `env_filter`, which defaults to the
    /// `RUST_LOG` environment filter.
    pub fn init_tracing_subscriber(
        &self,
        env_filter: Option<EnvFilter>,
    ) -> Result<(), TryInitError> {
        let layers: Vec<BoxedLayer> = self
            .file_logs
            .iter()
            .map(|file_logs| {
                file_logs.format.file_layer(file_logs.rotation.appender(&file_logs.directory_path))
            })
            .chain(self.stdout_logs.iter().map(|stdout_logs| stdout_logs.format.stdout_layer()))
            .collect();

        let env_filter = env_filter
            .unwrap_or_else(EnvFilter::from_default_env)
            .add_directive(self.global_level.into());

        // Output layers are boxed against the bare registry, the filter goes on top of them.
        tracing_subscriber::registry().with(layers).with(env_filter).try_init()?;

        Ok(())
    }
}

/// Initializes tracing for tests. Repeated calls are no-ops.
pub fn init_test_tracing() {
    let _ = LogConfig::default().init_tracing_subscriber(None::<EnvFilter>);
}
