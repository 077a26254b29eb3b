//! The polling loop
//!
//! The [`Poller`] owns the active source and runs strictly sequential cycles:
//! sleep until the next tick, fetch, parse, filter, aggregate, publish. A
//! failed fetch publishes an [`Event::FetchFailed`] instead of a snapshot and
//! the loop carries on. A stop request is honored while sleeping or while a
//! fetch is in flight, and no snapshot is published once it has been seen.

use std::time::{Duration, SystemTime};

use metrics::{counter, gauge};
use tokio::{
    sync::{mpsc, watch},
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, trace, warn};

use crate::{
    aggregate::{Aggregated, IgnoreSet, aggregate},
    filter::Filter,
    model::{MetricFamily, Snapshot},
    parser::{self, Parsed, Warning},
    signal::Watcher,
    source::{self, Fetch},
};

#[derive(thiserror::Error, Debug, Clone, Copy)]
/// Errors produced by [`Poller`]
pub enum Error {
    /// The receiving half of the event channel was dropped
    #[error("event consumer hung up")]
    ConsumerGone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Where the [`Poller`] is in its cycle
pub enum State {
    /// Constructed, not yet running
    Idle,
    /// Waiting for the next tick
    Sleeping,
    /// Waiting on the source
    Fetching,
    /// Parsing fetched text
    Parsing,
    /// Filtering and aggregating parsed families
    Aggregating,
    /// The cycle's snapshot was handed off
    Published,
    /// The loop has exited
    Stopped,
}

#[derive(Debug)]
/// Everything a [`Poller`] reports to its consumer
pub enum Event {
    /// A cycle completed
    Snapshot(Snapshot),
    /// A cycle's fetch failed, no snapshot follows for it
    FetchFailed {
        /// The failed cycle
        cycle: u64,
        /// Why the source was unavailable
        error: source::Error,
    },
    /// Lines skipped while parsing, sent before the cycle's snapshot
    ParseWarnings {
        /// The cycle the warnings belong to
        cycle: u64,
        /// The skipped lines
        warnings: Vec<Warning>,
    },
}

/// The CPU bound half of a cycle: parse, filter, aggregate
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    /// Families whose name does not match are dropped before aggregation
    pub filter: Filter,
    /// Labels removed from the aggregation key
    pub ignore: IgnoreSet,
}

impl Pipeline {
    /// Create a new [`Pipeline`]
    #[must_use]
    pub fn new(filter: Filter, ignore: IgnoreSet) -> Self {
        Self { filter, ignore }
    }

    /// Filter then aggregate parsed families
    #[must_use]
    pub fn reduce(&self, mut families: Vec<MetricFamily>) -> Aggregated {
        self.filter.retain(&mut families);
        aggregate(families, &self.ignore)
    }

    /// Run the whole pipeline over `text`, producing the snapshot of `cycle`
    #[must_use]
    pub fn process(&self, cycle: u64, timestamp: SystemTime, text: &str) -> (Snapshot, Vec<Warning>) {
        let Parsed { families, warnings } = parser::parse(text);
        let Aggregated { families, ignored } = self.reduce(families);
        let snapshot = Snapshot {
            cycle,
            timestamp,
            families,
            ignored_labels: ignored,
        };
        (snapshot, warnings)
    }
}

/// Drives one source on a fixed interval
#[derive(Debug)]
pub struct Poller<F> {
    fetcher: F,
    interval: Duration,
    pipeline: Pipeline,
    shutdown: Watcher,
    events: mpsc::Sender<Event>,
    state: watch::Sender<State>,
    cycle: u64,
}

impl<F> Poller<F>
where
    F: Fetch,
{
    /// Create a new [`Poller`] instance
    ///
    /// Every cycle's outcome is sent on `events`. Each fetch is given at most
    /// `interval` to complete.
    #[must_use]
    pub fn new(
        fetcher: F,
        interval: Duration,
        pipeline: Pipeline,
        shutdown: Watcher,
        events: mpsc::Sender<Event>,
    ) -> Self {
        let (state, _) = watch::channel(State::Idle);
        Self {
            fetcher,
            interval,
            pipeline,
            shutdown,
            events,
            state,
            cycle: 0,
        }
    }

    /// Observe the state of this poller, including after it is consumed by
    /// [`Poller::run`]
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<State> {
        self.state.subscribe()
    }

    /// Run this [`Poller`] until stopped
    ///
    /// The first cycle starts immediately. When a cycle overruns the interval
    /// the next one starts as soon as it finishes, ticks are never queued.
    ///
    /// # Errors
    ///
    /// Function will return an error if the event consumer goes away.
    pub async fn run(mut self) -> Result<(), Error> {
        info!(interval = ?self.interval, "poller starting");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shutdown = self.shutdown.clone();

        let res = loop {
            self.transition(State::Sleeping);
            tokio::select! {
                biased;
                () = shutdown.recv() => break Ok(()),
                _ = ticker.tick() => {}
            }
            match self.run_cycle(&mut shutdown).await {
                Ok(true) => {}
                Ok(false) => break Ok(()),
                Err(err) => break Err(err),
            }
        };

        self.transition(State::Stopped);
        info!(cycles = self.cycle, "poller stopped");
        res
    }

    /// Run one cycle. Returns `false` when a stop was requested mid-cycle.
    async fn run_cycle(&mut self, shutdown: &mut Watcher) -> Result<bool, Error> {
        self.cycle += 1;
        let cycle = self.cycle;
        let interval = self.interval;
        counter!("metrics_viewer.cycles").increment(1);

        self.transition(State::Fetching);
        let fetched = tokio::select! {
            biased;
            () = shutdown.recv() => return Ok(false),
            res = time::timeout(interval, self.fetcher.fetch()) => {
                res.unwrap_or(Err(source::Error::Timeout(interval)))
            }
        };
        let text = match fetched {
            Ok(text) => text,
            Err(error) => {
                counter!("metrics_viewer.fetch_failures").increment(1);
                warn!(cycle, %error, "fetch failed");
                emit(&self.events, Event::FetchFailed { cycle, error }).await?;
                return Ok(true);
            }
        };
        let timestamp = SystemTime::now();

        self.transition(State::Parsing);
        let Parsed { families, warnings } = parser::parse(&text);

        self.transition(State::Aggregating);
        let Aggregated { families, ignored } = self.pipeline.reduce(families);

        if shutdown.is_signaled() {
            debug!(cycle, "stop requested, dropping snapshot");
            return Ok(false);
        }

        if !warnings.is_empty() {
            counter!("metrics_viewer.parse_warnings").increment(warnings.len() as u64);
            for warning in &warnings {
                debug!(cycle, line = warning.line, error = %warning.error, "skipped line");
            }
            emit(&self.events, Event::ParseWarnings { cycle, warnings }).await?;
            // The send above may have waited on a full channel.
            if shutdown.is_signaled() {
                debug!(cycle, "stop requested, dropping snapshot");
                return Ok(false);
            }
        }

        gauge!("metrics_viewer.families").set(families.len() as f64);
        let snapshot = Snapshot {
            cycle,
            timestamp,
            families,
            ignored_labels: ignored,
        };
        emit(&self.events, Event::Snapshot(snapshot)).await?;
        self.transition(State::Published);
        Ok(true)
    }

    fn transition(&self, next: State) {
        let prev = self.state.send_replace(next);
        trace!(cycle = self.cycle, ?prev, ?next, "poller state");
    }
}

async fn emit(events: &mpsc::Sender<Event>, event: Event) -> Result<(), Error> {
    events.send(event).await.map_err(|_| Error::ConsumerGone)
}
