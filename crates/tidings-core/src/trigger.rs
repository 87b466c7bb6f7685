//! Trigger layer: drives [`Scheduled`] jobs from a wall-clock timer and
//! [`EventConsumer`]s from new blobs in a watched container.
//!
//! Every firing and every arrival runs in its own task. Runs may overlap and
//! arrivals are handled with unbounded concurrency. Cancellation only stops
//! new firings; work already started runs to completion and can be awaited
//! through the trigger's [`TaskTracker`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::error::AppError;
use crate::traits::{BlobStore, EventConsumer, Scheduled};

/// A firing that starts this long after its scheduled instant is past due.
pub const PAST_DUE_GRACE: Duration = Duration::from_secs(30);

/// Events emitted by triggers for monitoring/logging.
#[derive(Debug, Clone)]
pub enum TriggerEvent<'a> {
    Started {
        trigger: &'a str,
    },
    Fired {
        trigger: &'a str,
        past_due: bool,
    },
    Arrived {
        trigger: &'a str,
        name: &'a str,
    },
    Completed {
        trigger: &'a str,
        subject: Option<&'a str>,
        elapsed: Duration,
    },
    Failed {
        trigger: &'a str,
        subject: Option<&'a str>,
        error: &'a AppError,
    },
    PollFailed {
        trigger: &'a str,
        error: &'a AppError,
    },
    Stopped {
        trigger: &'a str,
    },
}

/// Trait for receiving trigger events (decoupled logging).
pub trait TriggerReporter: Send + Sync {
    fn report(&self, event: TriggerEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTriggerReporter;

impl TriggerReporter for TracingTriggerReporter {
    fn report(&self, event: TriggerEvent<'_>) {
        match event {
            TriggerEvent::Started { trigger } => {
                tracing::info!(%trigger, "Trigger started");
            }
            TriggerEvent::Fired { trigger, past_due } => {
                if past_due {
                    tracing::info!(%trigger, "Timer is past due");
                }
                tracing::info!(%trigger, started_at = %Utc::now(), "Trigger fired");
            }
            TriggerEvent::Arrived { trigger, name } => {
                tracing::info!(%trigger, blob = %name, "New blob detected");
            }
            TriggerEvent::Completed {
                trigger,
                subject,
                elapsed,
            } => {
                tracing::info!(
                    %trigger,
                    subject = subject.unwrap_or("-"),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Trigger completed"
                );
            }
            TriggerEvent::Failed {
                trigger,
                subject,
                error,
            } => {
                let subject = subject.unwrap_or("-");
                if error.is_warning() {
                    tracing::warn!(%trigger, %subject, %error, "Trigger skipped item");
                } else {
                    tracing::error!(%trigger, %subject, %error, "Trigger failed");
                }
            }
            TriggerEvent::PollFailed { trigger, error } => {
                tracing::error!(%trigger, %error, "Failed to list watched container");
            }
            TriggerEvent::Stopped { trigger } => {
                tracing::info!(%trigger, "Trigger stopped");
            }
        }
    }
}

/// Next wall-clock instant strictly after `now` that is a whole multiple of
/// `period` since the Unix epoch. An hourly period fires on the hour.
///
/// Periods too large to align saturate at `DateTime::<Utc>::MAX_UTC`.
pub fn next_fire(now: DateTime<Utc>, period: Duration) -> DateTime<Utc> {
    let period_ms = i64::try_from(period.as_millis()).unwrap_or(i64::MAX).max(1);
    let now_ms = now.timestamp_millis();
    now_ms
        .div_euclid(period_ms)
        .checked_add(1)
        .and_then(|n| n.checked_mul(period_ms))
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(|| {
            TimeDelta::try_milliseconds(period_ms)
                .and_then(|delta| now.checked_add_signed(delta))
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        })
}

/// Whether a firing scheduled for `scheduled` that starts at `started` is
/// late enough to be reported as past due.
pub fn is_past_due(scheduled: DateTime<Utc>, started: DateTime<Utc>) -> bool {
    (started - scheduled)
        .to_std()
        .is_ok_and(|lateness| lateness > PAST_DUE_GRACE)
}

/// Fires a [`Scheduled`] job on a fixed wall-clock period.
pub struct IntervalTrigger {
    name: String,
    period: Duration,
    run_on_startup: bool,
    tracker: TaskTracker,
}

impl IntervalTrigger {
    pub fn new(name: impl Into<String>, period: Duration) -> Self {
        Self {
            name: name.into(),
            period,
            run_on_startup: true,
            tracker: TaskTracker::new(),
        }
    }

    /// Whether to fire once immediately when [`run`](Self::run) starts.
    pub fn run_on_startup(mut self, enabled: bool) -> Self {
        self.run_on_startup = enabled;
        self
    }

    /// Tracks the spawned runs, so a host can wait for them on shutdown.
    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    /// Fire `job` until `cancel_token` is cancelled.
    pub async fn run<S, R>(&self, job: Arc<S>, reporter: Arc<R>, cancel_token: CancellationToken)
    where
        S: Scheduled + 'static,
        R: TriggerReporter + 'static,
    {
        reporter.report(TriggerEvent::Started {
            trigger: &self.name,
        });

        if self.run_on_startup && !cancel_token.is_cancelled() {
            self.fire(&job, &reporter, false);
        }

        loop {
            let scheduled = next_fire(Utc::now(), self.period);
            let wait = (scheduled - Utc::now()).to_std().unwrap_or(Duration::ZERO);

            tokio::select! {
                () = tokio::time::sleep(wait) => {}
                () = cancel_token.cancelled() => break,
            }

            self.fire(&job, &reporter, is_past_due(scheduled, Utc::now()));
        }

        self.tracker.close();
        reporter.report(TriggerEvent::Stopped {
            trigger: &self.name,
        });
    }

    fn fire<S, R>(&self, job: &Arc<S>, reporter: &Arc<R>, past_due: bool)
    where
        S: Scheduled + 'static,
        R: TriggerReporter + 'static,
    {
        let job = Arc::clone(job);
        let reporter = Arc::clone(reporter);
        let name = self.name.clone();

        self.tracker.spawn(async move {
            reporter.report(TriggerEvent::Fired {
                trigger: &name,
                past_due,
            });
            let started = Instant::now();
            match job.run().await {
                Ok(()) => reporter.report(TriggerEvent::Completed {
                    trigger: &name,
                    subject: None,
                    elapsed: started.elapsed(),
                }),
                Err(error) => reporter.report(TriggerEvent::Failed {
                    trigger: &name,
                    subject: None,
                    error: &error,
                }),
            }
        });
    }
}

/// Watches a container and hands every newly observed blob to an
/// [`EventConsumer`].
///
/// New blobs are detected by listing the container on each poll. A name is
/// marked as observed before it is dispatched, so every blob is delivered at
/// most once per watcher even if its handler fails.
pub struct ArrivalWatcher<B: BlobStore> {
    name: String,
    store: B,
    container: String,
    poll_interval: Duration,
    seen: HashSet<String>,
    tracker: TaskTracker,
}

impl<B: BlobStore + 'static> ArrivalWatcher<B> {
    pub fn new(
        name: impl Into<String>,
        store: B,
        container: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            store,
            container: container.into(),
            poll_interval,
            seen: HashSet::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// Treat `names` as already observed.
    pub fn with_baseline(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.seen.extend(names);
        self
    }

    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    /// List the container once and return names not observed before,
    /// marking them observed. A container that does not exist yet is empty.
    ///
    /// Observed names are kept for the life of the watcher, so memory grows
    /// with the number of distinct blob names ever seen.
    pub async fn poll(&mut self) -> Result<Vec<String>, AppError> {
        if !self.store.container_exists(&self.container).await? {
            return Ok(Vec::new());
        }
        let fresh: Vec<String> = self
            .store
            .list(&self.container)
            .await?
            .into_iter()
            .filter(|name| !self.seen.contains(name))
            .collect();
        self.seen.extend(fresh.iter().cloned());
        Ok(fresh)
    }

    /// Poll and dispatch until `cancel_token` is cancelled.
    pub async fn run<C, R>(
        &mut self,
        consumer: Arc<C>,
        reporter: Arc<R>,
        cancel_token: CancellationToken,
    ) where
        C: EventConsumer + 'static,
        R: TriggerReporter + 'static,
    {
        reporter.report(TriggerEvent::Started {
            trigger: &self.name,
        });

        loop {
            if cancel_token.is_cancelled() {
                break;
            }

            let delay = match self.poll().await {
                Ok(fresh) => {
                    for blob in fresh {
                        self.dispatch(blob, &consumer, &reporter);
                    }
                    self.poll_interval
                }
                Err(error) => {
                    reporter.report(TriggerEvent::PollFailed {
                        trigger: &self.name,
                        error: &error,
                    });
                    self.poll_interval * 2
                }
            };

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = cancel_token.cancelled() => break,
            }
        }

        self.tracker.close();
        reporter.report(TriggerEvent::Stopped {
            trigger: &self.name,
        });
    }

    fn dispatch<C, R>(&self, blob: String, consumer: &Arc<C>, reporter: &Arc<R>)
    where
        C: EventConsumer + 'static,
        R: TriggerReporter + 'static,
    {
        let consumer = Arc::clone(consumer);
        let reporter = Arc::clone(reporter);
        let store = self.store.clone();
        let container = self.container.clone();
        let name = self.name.clone();

        self.tracker.spawn(async move {
            reporter.report(TriggerEvent::Arrived {
                trigger: &name,
                name: &blob,
            });
            let started = Instant::now();
            let result = match store.get(&container, &blob).await {
                Ok(content) => consumer.on_arrival(content, &blob).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => reporter.report(TriggerEvent::Completed {
                    trigger: &name,
                    subject: Some(&blob),
                    elapsed: started.elapsed(),
                }),
                Err(error) => reporter.report(TriggerEvent::Failed {
                    trigger: &name,
                    subject: Some(&blob),
                    error: &error,
                }),
            }
        });
    }
}
