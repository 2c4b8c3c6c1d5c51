//! Pure call-session state machine
//!
//! [`CallStateMachine`] applies the transition table to the session data
//! and returns the [`Effect`]s the caller must carry out. It never spawns,
//! sleeps or talks to the network, so it can be driven step by step with
//! synthetic triggers and a synthetic clock.

use std::time::Duration;

use omnicall_directory_core::phone::{is_dialable, normalize, to_international};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::table::{transition, ActionTemplate, ResetDelay, Trigger, TriggerKind};
use super::types::{CallPhase, CallerIdentity, SessionSnapshot};
use crate::config::SessionConfig;
use crate::error::{ClientError, ClientResult};
use crate::events::SessionEventKind;
use crate::transport::TransportAction;

const DTMF_DIGITS: &str = "0123456789*#ABCD";

/// Work requested by the machine
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Resolve `number` in the background and report back under `generation`
    StartLookup { generation: u64, number: String },
    /// Start the duration ticker
    StartTicker { generation: u64 },
    /// Cancel the duration ticker
    StopTicker,
    /// Return to idle after `delay`
    ScheduleReset { generation: u64, delay: Duration },
    /// Ask the transport to act
    Transport { generation: u64, action: TransportAction },
    /// Notify observers once the step is complete
    Publish(SessionEventKind),
}

/// Session data plus the rules for changing it
#[derive(Debug, Clone)]
pub struct CallStateMachine {
    phase: CallPhase,
    generation: u64,
    caller: Option<CallerIdentity>,
    last_caller: Option<CallerIdentity>,
    started_at: Option<Instant>,
    duration_secs: u64,
    failure: Option<String>,
    grace_delay: Duration,
    cancel_grace_delay: Duration,
    country_code: Option<String>,
}

impl CallStateMachine {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            phase: CallPhase::Idle,
            generation: 0,
            caller: None,
            last_caller: None,
            started_at: None,
            duration_secs: 0,
            failure: None,
            grace_delay: config.grace_delay,
            cancel_grace_delay: config.cancel_grace_delay,
            country_code: config.country_code.clone(),
        }
    }

    pub fn phase(&self) -> CallPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            generation: self.generation,
            phase: self.phase,
            caller: self.caller.clone(),
            last_caller: self.last_caller.clone(),
            duration_secs: self.duration_secs,
            failure: self.failure.clone(),
        }
    }

    /// Apply one trigger at time `now`
    ///
    /// User actions that do not fit the current phase are refused without
    /// touching any state. Transport events and internal completions that
    /// do not fit, or that carry an old generation, are dropped.
    pub fn handle(&mut self, trigger: Trigger, now: Instant) -> ClientResult<Vec<Effect>> {
        let kind = trigger.kind();
        self.check_input(&trigger)?;

        if let Some(generation) = trigger.generation() {
            if generation != self.generation {
                debug!(
                    "Dropping stale {} (generation {}, current {})",
                    kind.name(),
                    generation,
                    self.generation
                );
                return Ok(Vec::new());
            }
        }

        if let Trigger::LookupCompleted { entry: None, .. } = &trigger {
            return Ok(Vec::new());
        }

        let Some(step) = transition(self.phase, kind) else {
            return self.unmatched(kind);
        };

        let mut effects = Vec::new();

        if let Some(next) = step.next {
            if next != self.phase {
                let previous = self.phase;
                self.phase = next;
                debug!("Call phase {} -> {} on {}", previous, next, kind.name());
                effects.push(Effect::Publish(SessionEventKind::PhaseChanged { previous }));
            }
        }

        for action in step.actions {
            self.apply(*action, &trigger, now, &mut effects);
        }

        Ok(effects)
    }

    fn check_input(&self, trigger: &Trigger) -> ClientResult<()> {
        match trigger {
            Trigger::Dial { number } => {
                if !is_dialable(number) {
                    return Err(ClientError::invalid_input(format!(
                        "{:?} is not a dialable number",
                        number
                    )));
                }
                if self.phase != CallPhase::Idle {
                    return Err(ClientError::CallInProgress { phase: self.phase });
                }
            }
            Trigger::SendDigit { digit } => {
                if !DTMF_DIGITS.contains(digit.to_ascii_uppercase()) {
                    return Err(ClientError::invalid_input(format!(
                        "{:?} is not a DTMF digit",
                        digit
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn unmatched(&self, kind: TriggerKind) -> ClientResult<Vec<Effect>> {
        if kind.is_user_action() {
            return Err(ClientError::invalid_state(kind.name(), self.phase));
        }
        if kind == TriggerKind::InboundRing {
            warn!("Ignoring inbound ring while {}", self.phase);
        } else {
            debug!("Ignoring {} while {}", kind.name(), self.phase);
        }
        Ok(Vec::new())
    }

    fn apply(&mut self, action: ActionTemplate, trigger: &Trigger, now: Instant, effects: &mut Vec<Effect>) {
        match action {
            ActionTemplate::InitCaller => {
                self.generation += 1;
                self.caller = call_number(trigger).map(CallerIdentity::from_number);
                self.last_caller = None;
                self.started_at = None;
                self.duration_secs = 0;
                self.failure = None;
            }
            ActionTemplate::StartLookup => {
                if let Some(raw) = call_number(trigger).filter(|n| !n.trim().is_empty()) {
                    let number = match &self.country_code {
                        Some(cc) => to_international(raw, cc),
                        None => raw.to_string(),
                    };
                    effects.push(Effect::StartLookup {
                        generation: self.generation,
                        number,
                    });
                }
            }
            ActionTemplate::TransportDial => {
                if let Some(raw) = call_number(trigger) {
                    self.transport(effects, TransportAction::Dial { number: normalize(raw) });
                }
            }
            ActionTemplate::TransportAccept => self.transport(effects, TransportAction::Accept),
            ActionTemplate::TransportReject => self.transport(effects, TransportAction::Reject),
            ActionTemplate::TransportDisconnect => self.transport(effects, TransportAction::Disconnect),
            ActionTemplate::TransportSendDigit => {
                if let Trigger::SendDigit { digit } = trigger {
                    let digit = digit.to_ascii_uppercase();
                    self.transport(effects, TransportAction::SendDigit { digit });
                }
            }
            ActionTemplate::StartClock => {
                self.started_at = Some(now);
                self.duration_secs = 0;
                effects.push(Effect::StartTicker {
                    generation: self.generation,
                });
            }
            ActionTemplate::StopTicker => {
                self.refresh_duration(now);
                effects.push(Effect::StopTicker);
            }
            ActionTemplate::ReleaseCaller => {
                self.last_caller = self.caller.take();
            }
            ActionTemplate::UpdateDuration => {
                self.refresh_duration(now);
                effects.push(Effect::Publish(SessionEventKind::DurationTick));
            }
            ActionTemplate::ApplyIdentity => {
                if let (Trigger::LookupCompleted { entry: Some(entry), .. }, Some(caller)) =
                    (trigger, self.caller.as_mut())
                {
                    caller.enrich(entry);
                    debug!("Caller resolved to {}", caller.name);
                    effects.push(Effect::Publish(SessionEventKind::CallerResolved));
                }
            }
            ActionTemplate::RecordFailure => {
                let reason = match trigger {
                    Trigger::TransportError { reason } => reason.clone(),
                    _ => "call failed".to_string(),
                };
                warn!("Call failed: {}", reason);
                self.failure = Some(reason.clone());
                effects.push(Effect::Publish(SessionEventKind::CallFailed { reason }));
            }
            ActionTemplate::ScheduleReset(delay) => {
                let delay = match delay {
                    ResetDelay::Standard => self.grace_delay,
                    ResetDelay::AfterCancel => self.cancel_grace_delay,
                };
                effects.push(Effect::ScheduleReset {
                    generation: self.generation,
                    delay,
                });
            }
            ActionTemplate::ClearSession => {
                self.caller = None;
                self.last_caller = None;
                self.started_at = None;
                self.duration_secs = 0;
                self.failure = None;
            }
        }
    }

    fn transport(&self, effects: &mut Vec<Effect>, action: TransportAction) {
        effects.push(Effect::Transport {
            generation: self.generation,
            action,
        });
    }

    fn refresh_duration(&mut self, now: Instant) {
        if let Some(started_at) = self.started_at {
            self.duration_secs = now.saturating_duration_since(started_at).as_secs();
        }
    }
}

fn call_number(trigger: &Trigger) -> Option<&str> {
    match trigger {
        Trigger::InboundRing { number } | Trigger::Dial { number } => Some(number),
        _ => None,
    }
}
