//! Call-session configuration

use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Settings for one softphone line
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Delay between `Ended` and `Idle`
    pub grace_delay: Duration,
    /// Shorter delay used when the user cancels an outgoing call
    pub cancel_grace_delay: Duration,
    /// Period of the duration ticker while `Active`
    pub tick_interval: Duration,
    /// Capacity of the observer broadcast channel
    pub event_capacity: usize,
    /// When set, lookups rewrite local numbers (`0…`) to `+{cc}…` first
    pub country_code: Option<String>,
    /// Operator identity, supplied by the already-authenticated host app
    pub agent_id: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grace_delay: Duration::from_secs(2),
            cancel_grace_delay: Duration::from_secs(1),
            tick_interval: Duration::from_secs(1),
            event_capacity: 256,
            country_code: None,
            agent_id: None,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = Some(country_code.into());
        self
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_grace_delays(mut self, standard: Duration, after_cancel: Duration) -> Self {
        self.grace_delay = standard;
        self.cancel_grace_delay = after_cancel;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Check the settings a running session depends on
    pub fn validate(&self) -> ClientResult<()> {
        if self.tick_interval.is_zero() {
            return Err(ClientError::InvalidConfiguration {
                field: "tick_interval".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.event_capacity == 0 {
            return Err(ClientError::InvalidConfiguration {
                field: "event_capacity".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(cc) = &self.country_code {
            let digits = cc.trim_start_matches('+');
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(ClientError::InvalidConfiguration {
                    field: "country_code".to_string(),
                    reason: format!("expected digits, got {:?}", cc),
                });
            }
        }
        Ok(())
    }
}
