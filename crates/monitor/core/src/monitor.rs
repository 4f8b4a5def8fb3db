//! The latency monitor: one block subscription per chain and a periodic aggregation task.

use crate::{MonitorConfig, MonitorError, ObservationStore, StatsSnapshot, metrics::Metrics};
use alloy_primitives::ChainId;
use futures::StreamExt;
use omni_netconf::{Network, omni_consensus_chain_id};
use omni_xchain::{
    ProviderRequest, XBlockStream, XProvider, XProviderError, stream_name, verify_conf_levels,
};
use std::{sync::Arc, time::Duration};
use tokio::{
    select,
    sync::watch,
    task::JoinSet,
    time::{MissedTickBehavior, sleep},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Measures the latency of cross chain messages by correlating them with their receipts.
#[derive(Debug)]
pub struct LatencyMonitor<P> {
    network: Arc<Network>,
    provider: Arc<P>,
    config: MonitorConfig,
    store: Arc<ObservationStore>,
}

impl<P> LatencyMonitor<P>
where
    P: XProvider + 'static,
{
    /// Creates a monitor of `network` streaming blocks from `provider`.
    pub fn new(network: Network, provider: Arc<P>, config: MonitorConfig) -> Self {
        Metrics::init();
        Self {
            network: Arc::new(network),
            provider,
            config,
            store: Arc::new(ObservationStore::new()),
        }
    }

    /// Returns the store the subscriptions write to.
    pub fn store(&self) -> Arc<ObservationStore> {
        Arc::clone(&self.store)
    }

    /// Starts the subscriptions and the aggregation task.
    ///
    /// Every monitored chain must support the configured level, otherwise nothing starts. If
    /// the first subscription cannot be opened the monitor fails to start. A later chain that
    /// cannot be subscribed to is reported through [MonitorHandle::startup_errors] and retried
    /// in the background, the other subscriptions stay live.
    ///
    /// All tasks stop once `cancel` or [MonitorHandle::shutdown] fires.
    pub async fn start(self, cancel: CancellationToken) -> Result<MonitorHandle, MonitorError> {
        if self.config.interval.is_zero() {
            return Err(MonitorError::ZeroInterval);
        }

        let chain_ids = self.config.chains(&self.network);
        if chain_ids.is_empty() {
            return Err(MonitorError::NoChains);
        }
        let rules = verify_conf_levels(&self.network, chain_ids, self.config.conf_level)?;
        let consensus_chain_id = omni_consensus_chain_id(self.network.id);

        let cancel = cancel.child_token();
        let mut tasks = JoinSet::new();
        let mut startup_errors = vec![];

        for rule in rules {
            let chain_id = rule.chain_id;
            let height = self.network.chain(chain_id).map_or(0, |chain| chain.deploy_height);
            let req = ProviderRequest { chain_id, height, conf_level: rule.level };
            let subscription = Subscription {
                provider: Arc::clone(&self.provider),
                store: Arc::clone(&self.store),
                req,
                consensus_chain_id,
                max_retries: self.config.max_retries,
                cancel: cancel.clone(),
            };

            match self.provider.stream(req).await {
                Ok(stream) => {
                    info!(
                        target: "monitor::subscription",
                        chain_id,
                        chain = self.network.chain_name(chain_id),
                        head = ?rule.head,
                        "Subscribed to chain"
                    );
                    tasks.spawn(subscription.run(Some(stream)));
                }
                Err(source) if tasks.is_empty() => {
                    error!(
                        target: "monitor::subscription",
                        chain_id,
                        err = %source,
                        "Failed to subscribe to first chain"
                    );
                    Metrics::record_subscription_error(chain_id);
                    return Err(MonitorError::Subscribe { chain_id, source });
                }
                Err(err) => {
                    error!(
                        target: "monitor::subscription",
                        chain_id,
                        %err,
                        "Failed to subscribe, retrying in background"
                    );
                    Metrics::record_subscription_error(chain_id);
                    startup_errors.push((chain_id, err));
                    tasks.spawn(subscription.run(None));
                }
            }
        }

        let (stats_tx, stats_rx) = watch::channel(StatsSnapshot::default());
        let aggregator = Aggregator {
            network: Arc::clone(&self.network),
            store: Arc::clone(&self.store),
            interval: self.config.interval,
            retention: self.config.retention,
            stats: stats_tx,
            cancel: cancel.clone(),
        };
        tasks.spawn(aggregator.run());

        Ok(MonitorHandle { cancel, tasks, stats: stats_rx, store: self.store, startup_errors })
    }
}

/// Handle to a running [LatencyMonitor].
#[derive(Debug)]
pub struct MonitorHandle {
    cancel: CancellationToken,
    tasks: JoinSet<()>,
    stats: watch::Receiver<StatsSnapshot>,
    store: Arc<ObservationStore>,
    startup_errors: Vec<(ChainId, XProviderError)>,
}

impl MonitorHandle {
    /// Returns the latest published stats.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.borrow().clone()
    }

    /// Returns a receiver of the stats published on every aggregation tick.
    pub fn subscribe(&self) -> watch::Receiver<StatsSnapshot> {
        self.stats.clone()
    }

    /// Returns the observation store.
    pub const fn store(&self) -> &Arc<ObservationStore> {
        &self.store
    }

    /// Returns the chains that could not be subscribed to at startup, with their errors.
    pub fn startup_errors(&self) -> &[(ChainId, XProviderError)] {
        &self.startup_errors
    }

    /// Stops every task and waits for them to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.join().await;
    }

    /// Waits for every task to exit, which happens once the monitor is cancelled or every
    /// subscription gave up.
    pub async fn join(mut self) {
        while let Some(res) = self.tasks.join_next().await {
            if let Err(err) = res {
                error!(target: "monitor", %err, "Monitor task failed");
            }
        }
        info!(target: "monitor", "Monitor stopped");
    }
}

/// Streams the blocks of one chain into the store, resubscribing on errors.
struct Subscription<P> {
    provider: Arc<P>,
    store: Arc<ObservationStore>,
    req: ProviderRequest,
    consensus_chain_id: ChainId,
    max_retries: usize,
    cancel: CancellationToken,
}

impl<P: XProvider> Subscription<P> {
    async fn run(self, mut stream: Option<XBlockStream>) {
        let chain_id = self.req.chain_id;
        let mut height = self.req.height;
        let mut attempt = usize::from(stream.is_none());

        loop {
            if attempt > 0 {
                if attempt > self.max_retries {
                    error!(
                        target: "monitor::subscription",
                        chain_id,
                        "Retry limit ({}) exceeded",
                        self.max_retries
                    );
                    return;
                }

                let delay = backoff_delay(attempt);
                debug!(
                    target: "monitor::subscription",
                    chain_id,
                    ?delay,
                    attempt,
                    "Resubscribing after delay"
                );
                select! {
                    _ = sleep(delay) => {}
                    _ = self.cancel.cancelled() => return,
                }
            }

            let mut blocks = match stream.take() {
                Some(blocks) => blocks,
                None => {
                    let req = ProviderRequest { height, ..self.req };
                    let res = select! {
                        biased;
                        _ = self.cancel.cancelled() => return,
                        res = self.provider.stream(req) => res,
                    };
                    match res {
                        Ok(blocks) => blocks,
                        Err(err) => {
                            warn!(
                                target: "monitor::subscription",
                                chain_id,
                                %err,
                                "Failed to resubscribe"
                            );
                            Metrics::record_subscription_error(chain_id);
                            attempt += 1;
                            continue;
                        }
                    }
                }
            };

            loop {
                let next = select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        debug!(
                            target: "monitor::subscription",
                            chain_id,
                            "Subscription cancelled"
                        );
                        return;
                    }
                    next = blocks.next() => next,
                };

                match next {
                    Some(Ok(block)) => {
                        attempt = 0;
                        height = block.height.saturating_add(1);
                        self.store.record_block(&block, self.consensus_chain_id);
                    }
                    Some(Err(err)) => {
                        warn!(
                            target: "monitor::subscription",
                            chain_id,
                            %err,
                            "Block stream failed"
                        );
                        Metrics::record_subscription_error(chain_id);
                        break;
                    }
                    None => {
                        warn!(
                            target: "monitor::subscription",
                            chain_id,
                            height,
                            "Block stream ended"
                        );
                        break;
                    }
                }
            }

            attempt += 1;
        }
    }
}

/// Calculates exponential backoff delay with a max cap (30s).
fn backoff_delay(attempt: usize) -> Duration {
    let secs = 2u64.saturating_pow(attempt.min(5) as u32);
    Duration::from_secs(secs.min(30))
}

/// Periodically aggregates the store and publishes the stats.
struct Aggregator {
    network: Arc<Network>,
    store: Arc<ObservationStore>,
    interval: Duration,
    retention: Option<Duration>,
    stats: watch::Sender<StatsSnapshot>,
    cancel: CancellationToken,
}

impl Aggregator {
    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!(target: "monitor::aggregator", "Aggregator cancelled");
                    return;
                }
                _ = ticker.tick() => self.tick(),
            }
        }
    }

    fn tick(&self) {
        if let Some(retention) = self.retention {
            let cutoff = self.store.latest_timestamp().saturating_sub(retention.as_secs());
            self.store.prune(cutoff);
        }

        let snapshot = StatsSnapshot::collect(&self.store);
        for (stream, stats) in &snapshot.streams {
            debug!(
                target: "monitor::aggregator",
                stream = stream_name(&self.network, *stream),
                sent = stats.total_sent,
                received = stats.total_received,
                avg = stats.avg,
                "Stream latency"
            );
        }

        Metrics::record_snapshot(&self.network, &snapshot);
        self.stats.send_replace(snapshot);
    }
}
