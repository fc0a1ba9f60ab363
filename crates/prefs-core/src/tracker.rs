//! Session engagement tracking
//!
//! Measures how long a form session has been open and how much of that time
//! the host surface held foreground focus:
//! - [`EngagementClock`] is the pure counter, advanced one tick at a time
//! - [`EngagementTracker`] owns the ticking task and focus listener for one
//!   session and releases both when stopped or dropped

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Whether the host surface currently has foreground focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusState {
    Focused,
    Unfocused,
}

/// Focus change reported by the host surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusEvent {
    Gained,
    Lost,
}

/// Reading of the session and engaged counters
///
/// Invariant: `engagement_time <= session_time`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngagementSample {
    /// Ticks since the session began
    pub session_time: u64,
    /// Ticks spent focused
    pub engagement_time: u64,
}

impl EngagementSample {
    /// Engaged share of the session as a rounded percentage
    ///
    /// Zero when no time has elapsed.
    #[must_use]
    pub fn ratio(&self) -> u8 {
        if self.session_time == 0 {
            return 0;
        }
        let session = u128::from(self.session_time);
        let engaged = u128::from(self.engagement_time.min(self.session_time));
        // round half up: (200e + s) / 2s
        let pct = (engaged * 200 + session) / (session * 2);
        u8::try_from(pct).unwrap_or(100)
    }
}

/// Pure session/engagement counter
#[derive(Debug, Clone)]
pub struct EngagementClock {
    state: FocusState,
    sample: EngagementSample,
}

impl EngagementClock {
    /// Create a clock in the given focus state
    #[inline]
    #[must_use]
    pub fn new(initially_focused: bool) -> Self {
        let state = if initially_focused {
            FocusState::Focused
        } else {
            FocusState::Unfocused
        };
        Self {
            state,
            sample: EngagementSample::default(),
        }
    }

    /// Advance one tick
    pub fn tick(&mut self) {
        self.sample.session_time += 1;
        if self.state == FocusState::Focused {
            self.sample.engagement_time += 1;
        }
    }

    /// Apply a focus change
    pub fn apply(&mut self, event: FocusEvent) {
        self.state = match event {
            FocusEvent::Gained => FocusState::Focused,
            FocusEvent::Lost => FocusState::Unfocused,
        };
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> FocusState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn sample(&self) -> EngagementSample {
        self.sample
    }
}

impl Default for EngagementClock {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Tracker configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Tick interval in milliseconds
    pub tick_millis: u64,
    /// Whether the session starts focused
    pub initially_focused: bool,
}

impl TrackerConfig {
    /// Tick interval as a duration
    #[inline]
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_millis: 1000,
            initially_focused: true,
        }
    }
}

/// Engagement tracker for one session
///
/// Must be started inside a tokio runtime. The tick task and any focus
/// listener are aborted by [`EngagementTracker::stop`] or on drop; the last
/// sample stays readable afterwards.
#[derive(Debug)]
pub struct EngagementTracker {
    clock: Arc<Mutex<EngagementClock>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl EngagementTracker {
    /// Start ticking
    #[must_use]
    pub fn start(config: TrackerConfig) -> Self {
        let clock = Arc::new(Mutex::new(EngagementClock::new(config.initially_focused)));
        let period = config.tick().max(Duration::from_millis(1));

        let ticking = Arc::clone(&clock);
        let handle = tokio::spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick completes immediately
            timer.tick().await;
            loop {
                timer.tick().await;
                ticking.lock().tick();
            }
        });

        tracing::debug!(
            tick_millis = config.tick_millis,
            focused = config.initially_focused,
            "engagement tracker started"
        );

        Self {
            clock,
            tasks: Mutex::new(vec![handle]),
        }
    }

    /// Current reading, valid at any instant
    #[inline]
    #[must_use]
    pub fn sample(&self) -> EngagementSample {
        self.clock.lock().sample()
    }

    #[inline]
    #[must_use]
    pub fn focus_state(&self) -> FocusState {
        self.clock.lock().state()
    }

    /// Apply a focus change
    pub fn apply(&self, event: FocusEvent) {
        tracing::debug!(?event, "focus changed");
        self.clock.lock().apply(event);
    }

    #[inline]
    pub fn focus_gained(&self) {
        self.apply(FocusEvent::Gained);
    }

    #[inline]
    pub fn focus_lost(&self) {
        self.apply(FocusEvent::Lost);
    }

    /// Feed focus changes from a channel until it closes or the tracker stops
    pub fn watch_focus(&self, mut events: mpsc::Receiver<FocusEvent>) {
        let clock = Arc::clone(&self.clock);
        let handle = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                tracing::debug!(?event, "focus changed");
                clock.lock().apply(event);
            }
        });
        self.tasks.lock().push(handle);
    }

    /// Check if the tick task is still alive
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.tasks
            .lock()
            .first()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop ticking and release the focus listener
    pub fn stop(&self) {
        let mut tasks = self.tasks.lock();
        if tasks.is_empty() {
            return;
        }
        for handle in tasks.drain(..) {
            handle.abort();
        }
        tracing::debug!(sample = ?self.clock.lock().sample(), "engagement tracker stopped");
    }
}

impl Drop for EngagementTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
