use std::time::Duration;

/// Seconds an administrator has to complete the scans.
pub const DEFAULT_BUDGET_SECS: u32 = 90;

/// Interval between `check_status` polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Interval between countdown ticks. Each tick removes exactly this many
/// seconds from the budget.
pub const DEFAULT_COUNTDOWN_TICK_SECS: u32 = 1;

/// Timing parameters for a binding session.
#[derive(Debug, Clone)]
pub struct BindingConfig {
    /// Total budget in seconds (default: 90).
    pub budget_secs: u32,
    /// Poll cadence (default: 2 s).
    pub poll_interval: Duration,
    /// Countdown cadence in whole seconds (default: 1).
    pub countdown_tick_secs: u32,
}

impl BindingConfig {
    pub fn countdown_tick(&self) -> Duration {
        Duration::from_secs(u64::from(self.countdown_tick_secs.max(1)))
    }

    /// Seconds removed from the budget per countdown tick.
    pub fn countdown_step(&self) -> u32 {
        self.countdown_tick_secs.max(1)
    }
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            budget_secs: DEFAULT_BUDGET_SECS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            countdown_tick_secs: DEFAULT_COUNTDOWN_TICK_SECS,
        }
    }
}
