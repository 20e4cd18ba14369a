//! Waits for the backend to come back after a configuration write.
//!
//! The backend restarts itself to reload settings, so the connection that
//! submitted the change does not survive. This module probes a liveness
//! endpoint on a staged backoff schedule until it answers or the attempt
//! budget runs out.
//!
//! The loop is an explicit state machine ([`ReloadState`]) driven by
//! [`ReloadPoller::wait`]; the probe, the sleep and the notification sink
//! are injected so the schedule can be tested without real timers.

use std::future::Future;
use std::time::Duration;

use hostagent_api::{Client, RequestContext};

use crate::error::HostAgentError;
use crate::notify::{Notification, Notifier};

/// Delay before the first probe, giving the backend time to start restarting.
pub const INITIAL_DELAY: Duration = Duration::from_millis(800);

/// Total probes before giving up.
pub const MAX_ATTEMPTS: u32 = 50;

pub const RELOAD_TIMED_OUT_MESSAGE: &str = "reload check timed out";
pub const RELOADED_MESSAGE: &str = "backend reloaded";

/// Exclusive upper attempt index of each stage, with its delay in ms.
const BACKOFF_STAGES: &[(u32, u64)] = &[(5, 250), (12, 400), (18, 500), (25, 600)];
const BACKOFF_CEILING_MS: u64 = 1000;

/// Delay after failed probe number `attempt` (zero-based).
///
/// Attempts 0-4 wait 250 ms, 5-11 wait 400 ms, 12-17 wait 500 ms,
/// 18-24 wait 600 ms, and everything after waits one second.
pub fn backoff_delay(attempt: u32) -> Duration {
    let ms = BACKOFF_STAGES
        .iter()
        .find(|(upper, _)| attempt < *upper)
        .map(|(_, ms)| *ms)
        .unwrap_or(BACKOFF_CEILING_MS);
    Duration::from_millis(ms)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSchedule {
    pub initial_delay: Duration,
    /// Always at least one.
    pub max_attempts: u32,
}

impl Default for ReloadSchedule {
    fn default() -> Self {
        Self {
            initial_delay: INITIAL_DELAY,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

impl ReloadSchedule {
    pub fn new(initial_delay: Duration, max_attempts: u32) -> Self {
        Self {
            initial_delay,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Total sleep time when every probe fails.
    pub fn worst_case(&self) -> Duration {
        (0..self.max_attempts.saturating_sub(1))
            .map(backoff_delay)
            .fold(self.initial_delay, |acc, d| acc + d)
    }
}

/// Where the poll loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadState {
    /// Sleeping for `delay` before probe number `attempt`.
    Waiting { attempt: u32, delay: Duration },
    /// Probe number `attempt` is in flight.
    Probing { attempt: u32 },
    Succeeded { attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Inputs to [`ReloadState::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadEvent {
    /// The pending delay has passed.
    Elapsed,
    /// A probe finished.
    Probed { healthy: bool },
}

impl ReloadState {
    pub fn start(schedule: &ReloadSchedule) -> Self {
        Self::Waiting {
            attempt: 0,
            delay: schedule.initial_delay,
        }
    }

    /// Next state after `event`. Events that do not apply to the current
    /// state, and any event in a terminal state, leave it unchanged.
    pub fn transition(self, event: ReloadEvent, schedule: &ReloadSchedule) -> Self {
        match (self, event) {
            (Self::Waiting { attempt, .. }, ReloadEvent::Elapsed) => Self::Probing { attempt },
            (Self::Probing { attempt }, ReloadEvent::Probed { healthy: true }) => {
                Self::Succeeded {
                    attempts: attempt + 1,
                }
            }
            (Self::Probing { attempt }, ReloadEvent::Probed { healthy: false }) => {
                if attempt + 1 >= schedule.max_attempts.max(1) {
                    Self::Exhausted {
                        attempts: attempt + 1,
                    }
                } else {
                    Self::Waiting {
                        attempt: attempt + 1,
                        delay: backoff_delay(attempt),
                    }
                }
            }
            (state, _) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Exhausted { .. })
    }
}

/// A liveness check.
pub trait Probe {
    /// Returns `true` once the backend is serving again.
    fn probe(&self) -> impl Future<Output = bool> + Send;
}

/// Suspends the poll loop between probes.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

/// Probes `GET <base>/ui/ping` through the request wrapper in text mode.
pub struct PingProbe<'a> {
    client: &'a Client,
    ctx: &'a RequestContext,
}

impl<'a> PingProbe<'a> {
    pub fn new(client: &'a Client, ctx: &'a RequestContext) -> Self {
        Self { client, ctx }
    }
}

impl Probe for PingProbe<'_> {
    async fn probe(&self) -> bool {
        self.client.ping(self.ctx).await.is_ok()
    }
}

/// Result of a successful reload wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadReport {
    /// Probes sent, including the healthy one.
    pub attempts: u32,
    /// Time spent sleeping between probes.
    pub waited: Duration,
}

/// Drives [`ReloadState`] with a real probe, sleeper and notifier.
///
/// Probes are strictly sequential. Once started the loop always runs to
/// success or exhaustion; there is no cancellation hook.
pub struct ReloadPoller<P, S = TokioSleeper> {
    probe: P,
    sleeper: S,
    schedule: ReloadSchedule,
}

impl<P: Probe> ReloadPoller<P, TokioSleeper> {
    pub fn new(probe: P) -> Self {
        Self::with_sleeper(probe, TokioSleeper)
    }
}

impl<P: Probe, S: Sleeper> ReloadPoller<P, S> {
    pub fn with_sleeper(probe: P, sleeper: S) -> Self {
        Self {
            probe,
            sleeper,
            schedule: ReloadSchedule::default(),
        }
    }

    pub fn with_schedule(mut self, schedule: ReloadSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn schedule(&self) -> &ReloadSchedule {
        &self.schedule
    }

    /// Polls until the probe reports healthy or attempts run out.
    ///
    /// Sends exactly one notification: success on completion, error on
    /// exhaustion. Intermediate failed probes are only logged.
    pub async fn wait<N: Notifier>(&self, notifier: &N) -> Result<ReloadReport, HostAgentError> {
        let mut state = ReloadState::start(&self.schedule);
        let mut waited = Duration::ZERO;

        loop {
            state = match state {
                ReloadState::Waiting { delay, .. } => {
                    self.sleeper.sleep(delay).await;
                    waited += delay;
                    state.transition(ReloadEvent::Elapsed, &self.schedule)
                }
                ReloadState::Probing { attempt } => {
                    let healthy = self.probe.probe().await;
                    tracing::debug!(attempt, healthy, "reload probe");
                    state.transition(ReloadEvent::Probed { healthy }, &self.schedule)
                }
                ReloadState::Succeeded { attempts } => {
                    tracing::info!(attempts, ?waited, "backend is back after reload");
                    notifier.notify(Notification::success(RELOADED_MESSAGE));
                    return Ok(ReloadReport { attempts, waited });
                }
                ReloadState::Exhausted { attempts } => {
                    tracing::warn!(attempts, ?waited, "backend did not come back after reload");
                    notifier.notify(Notification::error(RELOAD_TIMED_OUT_MESSAGE));
                    return Err(HostAgentError::ReloadTimedOut);
                }
            };
        }
    }
}
