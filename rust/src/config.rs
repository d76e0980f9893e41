//! Configuration for the critical path engine.

use crate::critical_path::CriticalPathError;

/// Default tolerance when deciding whether a slack value is zero.
pub const DEFAULT_SLACK_EPSILON: f64 = 1e-9;

/// Engine configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct CpmConfig {
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    pub verbosity: u8,
    /// Slack values within this distance of zero count as zero.
    /// Slack below `-slack_epsilon` is reported as a defect.
    /// Must be finite and non-negative.
    pub slack_epsilon: f64,
}

impl Default for CpmConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            slack_epsilon: DEFAULT_SLACK_EPSILON,
        }
    }
}

impl CpmConfig {
    /// Default configuration with the given verbosity.
    pub fn with_verbosity(verbosity: u8) -> Self {
        Self {
            verbosity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), CriticalPathError> {
        if !self.slack_epsilon.is_finite() || self.slack_epsilon < 0.0 {
            return Err(CriticalPathError::InvalidConfig(format!(
                "slack_epsilon must be finite and non-negative, got {}",
                self.slack_epsilon
            )));
        }
        Ok(())
    }
}
