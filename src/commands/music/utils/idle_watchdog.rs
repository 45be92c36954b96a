//! Idle-disconnect watchdog for voice connections.
//!
//! One watchdog task runs per live connection. Every tick it asks its target
//! whether audio is playing; after `limit` consecutive idle ticks it asks the
//! target to disconnect and exits. Each task is tagged with a generation so the
//! target can tell a superseded watchdog apart from the current one.

use serenity::async_trait;
use std::sync::Weak;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// Seconds of silence tolerated before an idle connection is dropped
pub const DEFAULT_IDLE_LIMIT: u32 = 60;

/// Interval between two watchdog ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    Active,
    Idle(u32),
}

/// Counts consecutive idle ticks
#[derive(Debug)]
pub struct IdleCounter {
    state: IdleState,
    limit: u32,
}

impl IdleCounter {
    pub fn new(limit: u32) -> Self {
        Self {
            state: IdleState::Active,
            limit,
        }
    }

    pub fn state(&self) -> IdleState {
        self.state
    }

    /// Feed one tick. Returns `true` once the idle limit has been reached.
    pub fn tick(&mut self, active: bool) -> bool {
        self.state = match (active, self.state) {
            (true, _) => IdleState::Active,
            (false, IdleState::Active) => IdleState::Idle(1),
            (false, IdleState::Idle(ticks)) => IdleState::Idle(ticks.saturating_add(1)),
        };

        matches!(self.state, IdleState::Idle(ticks) if ticks >= self.limit)
    }
}

/// What a watchdog observed on one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Audio is playing and not paused
    Active,
    /// Connected but silent
    Idle,
    /// The connection went away; the target already cleaned up
    Dropped,
    /// This watchdog generation has been superseded
    Stale,
}

/// The thing a watchdog keeps an eye on
#[async_trait]
pub trait IdleTarget: Send + Sync + 'static {
    async fn probe(&self, generation: u64) -> Probe;

    /// Called once when `generation` has been idle for the whole limit
    async fn expire(&self, generation: u64);
}

/// Watchdog loop; spawn it with `tokio::spawn`.
pub async fn run<T: IdleTarget>(target: Weak<T>, generation: u64, period: Duration, limit: u32) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut counter = IdleCounter::new(limit);

    loop {
        interval.tick().await;

        let Some(target) = target.upgrade() else {
            debug!("Watchdog {} target is gone", generation);
            break;
        };

        match target.probe(generation).await {
            Probe::Active => {
                counter.tick(true);
            }
            Probe::Idle => {
                if counter.tick(false) {
                    debug!("Watchdog {} reached idle limit of {} ticks", generation, limit);
                    target.expire(generation).await;
                    break;
                }
            }
            Probe::Dropped => {
                debug!("Watchdog {} saw its connection drop", generation);
                break;
            }
            Probe::Stale => {
                debug!("Watchdog {} superseded", generation);
                break;
            }
        }
    }
}
