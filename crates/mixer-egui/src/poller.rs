//! Status Poller.
//!
//! Once per interval the poller reserves a [`PollTicket`] from the panel and
//! spawns a status fetch on the runtime. Results come back over an mpsc
//! channel tagged with their generation and are applied on the UI thread by
//! [`StatusPoller::drain`]. Fetches may overlap; the panel discards any result
//! older than the last one it applied.

use mixer_client::TelemetryClient;
use mixer_core::{ApplyResult, ControlPanel, PollOutcome, PollTicket};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

const RESULT_CHANNEL_CAPACITY: usize = 16;

/// Outcome of one fetch, tagged with the generation it was issued under.
#[derive(Debug)]
pub struct PollResult {
    /// Generation from the poll's ticket.
    pub generation: u64,
    /// Fetched snapshot or failure.
    pub outcome: PollOutcome,
}

/// Drives periodic status fetches for one panel.
pub struct StatusPoller {
    interval: Duration,
    last_started: Option<Instant>,
    last_applied: Option<Instant>,
    in_flight: usize,
    tx: mpsc::Sender<PollResult>,
    rx: mpsc::Receiver<PollResult>,
}

impl StatusPoller {
    /// Create a poller that fires every `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);
        Self {
            interval,
            last_started: None,
            last_applied: None,
            in_flight: 0,
            tx,
            rx,
        }
    }

    /// Poll cadence.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a new poll should start at `now`.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_started {
            Some(started) => now.duration_since(started) >= self.interval,
            None => true,
        }
    }

    /// Time left until the next poll is due.
    #[must_use]
    pub fn until_next(&self, now: Instant) -> Duration {
        match self.last_started {
            Some(started) => self.interval.saturating_sub(now.duration_since(started)),
            None => Duration::ZERO,
        }
    }

    /// Fetches spawned but not yet drained.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// When a non-stale result was last applied.
    #[must_use]
    pub fn last_applied(&self) -> Option<Instant> {
        self.last_applied
    }

    /// Spawn a status fetch if the interval elapsed.
    pub fn poll_if_due(
        &mut self,
        panel: &mut ControlPanel,
        client: &TelemetryClient,
        handle: &Handle,
    ) -> Option<PollTicket> {
        if !self.is_due(Instant::now()) {
            return None;
        }
        let client = client.clone();
        Some(self.spawn(panel, handle, async move {
            match client.fetch_status().await {
                Ok(snapshot) => PollOutcome::Snapshot(snapshot),
                Err(e) => PollOutcome::Failed(e.to_string()),
            }
        }))
    }

    /// Reserve a generation and run `fetch` on the runtime.
    pub fn spawn<F>(&mut self, panel: &mut ControlPanel, handle: &Handle, fetch: F) -> PollTicket
    where
        F: Future<Output = PollOutcome> + Send + 'static,
    {
        let ticket = panel.begin_poll();
        self.last_started = Some(Instant::now());
        self.in_flight += 1;

        let tx = self.tx.clone();
        let generation = ticket.generation;
        handle.spawn(async move {
            let outcome = fetch.await;
            let _ = tx.send(PollResult { generation, outcome }).await;
        });
        ticket
    }

    /// Apply every result that arrived since the last frame.
    pub fn drain(&mut self, panel: &mut ControlPanel) -> Vec<ApplyResult> {
        let mut applied = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            let outcome = panel.apply_poll(result.generation, result.outcome);
            if outcome != ApplyResult::Stale {
                self.last_applied = Some(Instant::now());
            }
            applied.push(outcome);
        }
        applied
    }
}
