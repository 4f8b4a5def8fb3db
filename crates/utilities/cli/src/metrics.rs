//! Prometheus metrics flags.

use clap::Args;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Error installing the Prometheus exporter.
#[derive(Debug, thiserror::Error)]
#[error("failed to install the prometheus exporter on {addr}: {source}")]
pub struct MetricsError {
    /// Listen address of the exporter.
    pub addr: SocketAddr,
    /// The underlying error.
    #[source]
    pub source: BuildError,
}

/// Flags of the Prometheus exporter.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct MetricsArgs {
    /// Serves Prometheus metrics.
    #[arg(long = "metrics.enabled", global = true, env = "OMNI_METRICS_ENABLED")]
    pub enabled: bool,
    /// Listen address of the metrics server.
    #[arg(
        long = "metrics.addr",
        default_value = "0.0.0.0",
        global = true,
        env = "OMNI_METRICS_ADDR"
    )]
    pub addr: IpAddr,
    /// Listen port of the metrics server.
    #[arg(
        long = "metrics.port",
        default_value_t = 9090,
        global = true,
        env = "OMNI_METRICS_PORT"
    )]
    pub port: u16,
}

impl Default for MetricsArgs {
    fn default() -> Self {
        Self { enabled: false, addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 9090 }
    }
}

impl MetricsArgs {
    /// Returns the listen address of the metrics server.
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.addr, self.port)
    }

    /// Installs the Prometheus recorder and its HTTP listener, if enabled.
    pub fn init_metrics(&self) -> Result<(), MetricsError> {
        if !self.enabled {
            return Ok(());
        }

        let addr = self.socket_addr();
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .map_err(|source| MetricsError { addr, source })?;
        tracing::info!(target: "cli", %addr, "Serving prometheus metrics");

        Ok(())
    }
}
