use crate::error::{AppError, Result};

/// Limits applied to failed logins for a single username
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failures allowed inside one window before locking; 0 disables locking
    pub max_failures: u32,
    /// Length of the failure-counting window in seconds
    pub window_secs: i64,
    /// How long a lockout lasts in seconds
    pub lockout_secs: i64,
}

impl LockoutPolicy {
    pub fn is_enabled(&self) -> bool {
        self.max_failures > 0
    }
}

/// Failed-login bookkeeping for one submitted username
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LoginAttemptRecord {
    /// Failures counted in the current window
    pub failures: i64,
    /// Unix timestamp when the failure counter resets
    pub window_reset_at: i64,
    /// Unix timestamp until which logins are refused
    pub locked_until: Option<i64>,
}

impl LoginAttemptRecord {
    /// Create a new record with an empty window starting at `now`
    pub fn new(now: i64, policy: &LockoutPolicy) -> Self {
        Self {
            failures: 0,
            window_reset_at: now + policy.window_secs,
            locked_until: None,
        }
    }

    /// Refuse the attempt while a lockout is active
    pub fn check(&self, now: i64) -> Result<()> {
        match self.locked_until {
            Some(until) if now < until => Err(AppError::LoginLocked {
                retry_after_secs: until - now,
            }),
            _ => Ok(()),
        }
    }

    /// Count an attempt. Returns true if this attempt started a lockout.
    pub fn register_failure(&mut self, now: i64, policy: &LockoutPolicy) -> bool {
        // Reset the window (and any finished lockout) once it has expired
        if now >= self.window_reset_at {
            self.failures = 0;
            self.window_reset_at = now + policy.window_secs;
        }
        if matches!(self.locked_until, Some(until) if now >= until) {
            self.locked_until = None;
        }

        self.failures += 1;

        if policy.is_enabled() && self.failures >= i64::from(policy.max_failures) {
            tracing::warn!(
                "Login failure limit reached: {}/{}",
                self.failures,
                policy.max_failures
            );
            self.failures = 0;
            self.locked_until = Some(now + policy.lockout_secs);
            return true;
        }

        false
    }
}
