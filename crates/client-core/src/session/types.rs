use std::fmt;

use omnicall_directory_core::DirectoryEntry;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of the softphone line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallPhase {
    /// No call; the line is free
    #[default]
    Idle,
    /// An inbound call is ringing
    Incoming,
    /// We dialed and are waiting for the remote party
    Outgoing,
    /// Media is up and the duration clock runs
    Active,
    /// The call finished; returns to `Idle` after a grace delay
    Ended,
}

impl CallPhase {
    /// Phases that carry a live call whose caller display may still change
    pub fn is_live(self) -> bool {
        matches!(self, Self::Incoming | Self::Outgoing | Self::Active)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for CallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the UI shows about the other party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub name: String,
    /// Raw number as received or dialed; never rewritten by enrichment
    pub number: String,
    pub aux_line_1: Option<String>,
    pub aux_line_2: Option<String>,
}

impl CallerIdentity {
    /// Display built from the raw number alone
    pub fn from_number(number: &str) -> Self {
        let name = if number.trim().is_empty() {
            "Unknown".to_string()
        } else {
            number.to_string()
        };
        Self {
            name,
            number: number.to_string(),
            aux_line_1: None,
            aux_line_2: None,
        }
    }

    /// Replace name and aux lines from a directory match
    pub fn enrich(&mut self, entry: &DirectoryEntry) {
        let name = entry.display_name();
        if !name.is_empty() {
            self.name = name;
        }
        self.aux_line_1 = entry.affiliation.clone();
        self.aux_line_2 = entry.plan.clone();
    }
}

/// Everything an observer can render about the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Bumped for every new call on the line
    pub generation: u64,
    pub phase: CallPhase,
    /// Set only while a call is live
    pub caller: Option<CallerIdentity>,
    /// The party of the call that just finished, kept while `Ended`
    pub last_caller: Option<CallerIdentity>,
    /// Whole seconds spent in `Active`
    pub duration_secs: u64,
    /// Call-failure notice, set when a transport error ended the call
    pub failure: Option<String>,
}

impl SessionSnapshot {
    pub fn idle(generation: u64) -> Self {
        Self {
            generation,
            phase: CallPhase::Idle,
            caller: None,
            last_caller: None,
            duration_secs: 0,
            failure: None,
        }
    }

    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_secs)
    }
}

/// Render seconds as `MM:SS`; minutes are not capped (`100:05`)
pub fn format_duration(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
