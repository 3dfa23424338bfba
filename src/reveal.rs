//! Animated reveal of a round's outcome.
//!
//! The animator counts a display value up from zero to the authority's
//! outcome in fixed increments, one per tick, and settles exactly on the
//! outcome. The periodic tick source lives inside the animator and is dropped
//! on [`RevealAnimator::cancel`], so a cancelled reveal can never tick again.

use std::{
    future,
    time::Duration,
};
use tokio::time::{
    self,
    Instant,
    Interval,
    MissedTickBehavior,
};
use tracing::{
    debug,
    trace,
};

pub const DEFAULT_TICK: Duration = Duration::from_millis(10);
pub const MIN_TICK: Duration = Duration::from_millis(1);
pub const MAX_TICK: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RevealPhase {
    #[default]
    Idle,
    Revealing,
    Settled,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RevealState {
    pub phase: RevealPhase,
    pub display_value: f64,
    pub started_at: Option<Instant>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RevealTick {
    /// Intermediate value to render.
    Progress(f64),
    /// Final value; emitted once per reveal.
    Settled(f64),
}

#[derive(Debug)]
pub struct RevealAnimator {
    state: RevealState,
    tick: Duration,
    target: f64,
    step: f64,
    ticks_elapsed: u32,
    total_ticks: u32,
    ticker: Option<Interval>,
}

impl Default for RevealAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

impl RevealAnimator {
    /// `tick` is clamped to `[MIN_TICK, MAX_TICK]`.
    pub fn new(tick: Duration) -> Self {
        Self {
            state: RevealState::default(),
            tick: tick.clamp(MIN_TICK, MAX_TICK),
            target: 0.0,
            step: 0.0,
            ticks_elapsed: 0,
            total_ticks: 0,
            ticker: None,
        }
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn phase(&self) -> RevealPhase {
        self.state.phase
    }

    pub fn display_value(&self) -> f64 {
        self.state.display_value
    }

    pub fn is_revealing(&self) -> bool {
        self.state.phase == RevealPhase::Revealing
    }

    /// Number of ticks a reveal of `duration` takes, at least one.
    pub fn ticks_for(&self, duration: Duration) -> u32 {
        let ticks = duration.as_nanos().div_ceil(self.tick.as_nanos());
        u32::try_from(ticks).unwrap_or(u32::MAX).max(1)
    }

    /// Begin revealing `target` over `duration`.
    ///
    /// `target` must already be validated as finite and non-negative. Any
    /// reveal in progress is cancelled first.
    pub fn start(&mut self, target: f64, duration: Duration) {
        debug_assert!(target.is_finite() && target >= 0.0);
        self.cancel();
        self.total_ticks = self.ticks_for(duration);
        self.target = target;
        self.step = target / f64::from(self.total_ticks);
        self.ticks_elapsed = 0;
        self.state = RevealState {
            phase: RevealPhase::Revealing,
            display_value: 0.0,
            started_at: Some(Instant::now()),
        };
        debug!(value = target, ticks = self.total_ticks, step = self.step, "reveal started");
    }

    /// Stop the tick source and return to idle without settling.
    ///
    /// A settled reveal keeps its final value on display.
    pub fn cancel(&mut self) {
        self.ticker = None;
        if self.state.phase == RevealPhase::Revealing {
            debug!(
                display_value = self.state.display_value,
                ticks = self.ticks_elapsed,
                "reveal cancelled"
            );
            self.state = RevealState::default();
        }
    }

    /// Advance one tick. Returns `None` unless a reveal is in progress.
    pub fn tick(&mut self) -> Option<RevealTick> {
        if self.state.phase != RevealPhase::Revealing {
            return None;
        }
        self.ticks_elapsed += 1;
        let next = self.step * f64::from(self.ticks_elapsed);
        if next >= self.target || self.ticks_elapsed >= self.total_ticks {
            self.state.display_value = self.target;
            self.state.phase = RevealPhase::Settled;
            self.ticker = None;
            debug!(value = self.target, ticks = self.ticks_elapsed, "reveal settled");
            return Some(RevealTick::Settled(self.target));
        }
        self.state.display_value = next.max(self.state.display_value);
        trace!(value = self.state.display_value, "reveal tick");
        Some(RevealTick::Progress(self.state.display_value))
    }

    /// Wait for the next tick of the running reveal and apply it.
    ///
    /// Pends forever while idle or settled, which makes it usable as a
    /// `select!` branch. Cancel safe: dropping the future loses no tick.
    pub async fn next_tick(&mut self) -> RevealTick {
        if self.state.phase != RevealPhase::Revealing {
            return future::pending().await;
        }
        let period = self.tick;
        let ticker = self.ticker.get_or_insert_with(|| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        ticker.tick().await;
        match self.tick() {
            Some(tick) => tick,
            None => future::pending().await,
        }
    }
}
