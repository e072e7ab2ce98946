// Idle tracking for deep sleep.
//
// Any observed contact counts as activity. Once nothing has touched
// the panel for IDLE_TIMEOUT_MS the loop hands control back so the
// firmware can arm the wake pin and power down.

use log::info;

pub const IDLE_TIMEOUT_MS: u64 = 5 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Awake,
    /// Idle threshold crossed; carries how long the pad sat untouched.
    SleepDue { idle_ms: u64 },
}

pub struct IdleTimer {
    last_activity_ms: u64,
    timeout_ms: u64,
}

impl IdleTimer {
    pub const fn new(now_ms: u64) -> Self {
        Self::with_timeout(now_ms, IDLE_TIMEOUT_MS)
    }

    pub const fn with_timeout(now_ms: u64, timeout_ms: u64) -> Self {
        Self {
            last_activity_ms: now_ms,
            timeout_ms,
        }
    }

    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms
    }

    pub fn observe(&mut self, now_ms: u64, active: bool) -> PowerState {
        if active {
            self.last_activity_ms = now_ms;
            return PowerState::Awake;
        }
        let idle_ms = now_ms.saturating_sub(self.last_activity_ms);
        if idle_ms > self.timeout_ms {
            info!("power: idle {}s, sleeping", idle_ms / 1000);
            return PowerState::SleepDue { idle_ms };
        }
        PowerState::Awake
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: u64 = 42_000;

    #[test]
    fn sleeps_only_after_threshold_is_exceeded() {
        let mut idle = IdleTimer::new(T);
        assert_eq!(idle.observe(T + 1_000, false), PowerState::Awake);
        assert_eq!(idle.observe(T + IDLE_TIMEOUT_MS, false), PowerState::Awake);
        assert_eq!(
            idle.observe(T + IDLE_TIMEOUT_MS + 1, false),
            PowerState::SleepDue {
                idle_ms: IDLE_TIMEOUT_MS + 1
            }
        );
    }

    #[test]
    fn contact_restarts_the_window() {
        let mut idle = IdleTimer::new(T);
        assert_eq!(idle.observe(T + 200_000, true), PowerState::Awake);
        assert_eq!(idle.last_activity_ms(), T + 200_000);
        assert_eq!(idle.observe(T + 400_000, false), PowerState::Awake);
        assert!(matches!(
            idle.observe(T + 200_001 + IDLE_TIMEOUT_MS, false),
            PowerState::SleepDue { .. }
        ));
    }

    #[test]
    fn activity_never_sleeps() {
        let mut idle = IdleTimer::new(0);
        assert_eq!(idle.observe(10 * IDLE_TIMEOUT_MS, true), PowerState::Awake);
    }
}
