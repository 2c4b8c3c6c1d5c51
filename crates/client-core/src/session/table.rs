//! Transition table for the call session
//!
//! Every legal `(phase, trigger)` pair is listed here together with the
//! phase it leads to and the actions the machine performs on the way.
//! Pairs that are not listed do not apply: user actions get an
//! `InvalidState` error, asynchronous triggers are dropped.

use omnicall_directory_core::DirectoryEntry;

use super::types::CallPhase;
use crate::transport::TransportEvent;

/// Input to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    // Transport events
    InboundRing { number: String },
    RemoteAnswered,
    RemoteRejected { reason: Option<String> },
    RemoteCancelled,
    RemoteDisconnected,
    TransportError { reason: String },

    // User actions
    Dial { number: String },
    Accept,
    Decline,
    Cancel,
    Hangup,
    SendDigit { digit: char },

    // Internal completions, tagged with the generation that issued them
    LookupCompleted { generation: u64, entry: Option<DirectoryEntry> },
    GraceElapsed { generation: u64 },
    Tick { generation: u64 },
}

impl Trigger {
    pub fn kind(&self) -> TriggerKind {
        match self {
            Self::InboundRing { .. } => TriggerKind::InboundRing,
            Self::RemoteAnswered => TriggerKind::RemoteAnswered,
            Self::RemoteRejected { .. } => TriggerKind::RemoteRejected,
            Self::RemoteCancelled => TriggerKind::RemoteCancelled,
            Self::RemoteDisconnected => TriggerKind::RemoteDisconnected,
            Self::TransportError { .. } => TriggerKind::TransportError,
            Self::Dial { .. } => TriggerKind::Dial,
            Self::Accept => TriggerKind::Accept,
            Self::Decline => TriggerKind::Decline,
            Self::Cancel => TriggerKind::Cancel,
            Self::Hangup => TriggerKind::Hangup,
            Self::SendDigit { .. } => TriggerKind::SendDigit,
            Self::LookupCompleted { .. } => TriggerKind::LookupCompleted,
            Self::GraceElapsed { .. } => TriggerKind::GraceElapsed,
            Self::Tick { .. } => TriggerKind::Tick,
        }
    }

    /// Generation carried by internal completions
    pub fn generation(&self) -> Option<u64> {
        match self {
            Self::LookupCompleted { generation, .. }
            | Self::GraceElapsed { generation }
            | Self::Tick { generation } => Some(*generation),
            _ => None,
        }
    }
}

impl From<TransportEvent> for Trigger {
    fn from(event: TransportEvent) -> Self {
        match event {
            TransportEvent::InboundRing { number } => Self::InboundRing { number },
            TransportEvent::Accepted => Self::RemoteAnswered,
            TransportEvent::Rejected { reason } => Self::RemoteRejected { reason },
            TransportEvent::Cancelled => Self::RemoteCancelled,
            TransportEvent::Disconnected => Self::RemoteDisconnected,
            TransportEvent::Error { reason } => Self::TransportError { reason },
        }
    }
}

/// Payload-free key used for table lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    InboundRing,
    RemoteAnswered,
    RemoteRejected,
    RemoteCancelled,
    RemoteDisconnected,
    TransportError,
    Dial,
    Accept,
    Decline,
    Cancel,
    Hangup,
    SendDigit,
    LookupCompleted,
    GraceElapsed,
    Tick,
}

impl TriggerKind {
    /// Triggers that come from the user and expect an answer
    pub fn is_user_action(self) -> bool {
        matches!(
            self,
            Self::Dial | Self::Accept | Self::Decline | Self::Cancel | Self::Hangup | Self::SendDigit
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::InboundRing => "inbound_ring",
            Self::RemoteAnswered => "remote_answered",
            Self::RemoteRejected => "remote_rejected",
            Self::RemoteCancelled => "remote_cancelled",
            Self::RemoteDisconnected => "remote_disconnected",
            Self::TransportError => "transport_error",
            Self::Dial => "dial",
            Self::Accept => "accept",
            Self::Decline => "decline",
            Self::Cancel => "cancel",
            Self::Hangup => "hang up",
            Self::SendDigit => "send digit",
            Self::LookupCompleted => "lookup_completed",
            Self::GraceElapsed => "grace_elapsed",
            Self::Tick => "tick",
        }
    }
}

/// Which grace delay leads back to idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetDelay {
    Standard,
    AfterCancel,
}

/// Actions the machine performs during a transition, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTemplate {
    /// New call: bump the generation, show the raw number
    InitCaller,
    /// Background directory enrichment
    StartLookup,
    TransportDial,
    TransportAccept,
    TransportReject,
    TransportDisconnect,
    TransportSendDigit,
    /// Record the start time and start the ticker
    StartClock,
    StopTicker,
    /// The call is over: move the caller to `last_caller`
    ReleaseCaller,
    UpdateDuration,
    ApplyIdentity,
    RecordFailure,
    ScheduleReset(ResetDelay),
    /// Back to a blank line
    ClearSession,
}

/// Outcome of a table lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// `None` stays in the current phase
    pub next: Option<CallPhase>,
    pub actions: &'static [ActionTemplate],
}

use ActionTemplate::*;
use CallPhase::*;

const fn to(next: CallPhase, actions: &'static [ActionTemplate]) -> Option<Transition> {
    Some(Transition { next: Some(next), actions })
}

const fn stay(actions: &'static [ActionTemplate]) -> Option<Transition> {
    Some(Transition { next: None, actions })
}

const END: &[ActionTemplate] = &[ReleaseCaller, ScheduleReset(ResetDelay::Standard)];
const END_FAILED: &[ActionTemplate] = &[ReleaseCaller, RecordFailure, ScheduleReset(ResetDelay::Standard)];

/// Look up the transition for `trigger` in `phase`
pub fn transition(phase: CallPhase, trigger: TriggerKind) -> Option<Transition> {
    use TriggerKind as T;

    match (phase, trigger) {
        (Idle, T::InboundRing) => to(Incoming, &[InitCaller, StartLookup]),
        (Idle, T::Dial) => to(Outgoing, &[InitCaller, StartLookup, TransportDial]),

        (Incoming, T::Accept) => to(Active, &[TransportAccept, StartClock]),
        (Incoming, T::Decline | T::Hangup) => {
            to(Ended, &[ReleaseCaller, TransportReject, ScheduleReset(ResetDelay::Standard)])
        }
        (Incoming, T::RemoteCancelled | T::RemoteDisconnected) => to(Ended, END),
        (Incoming, T::TransportError) => to(Ended, END_FAILED),

        (Outgoing, T::RemoteAnswered) => to(Active, &[StartClock]),
        (Outgoing, T::Cancel | T::Hangup) => {
            to(
                Ended,
                &[ReleaseCaller, TransportDisconnect, ScheduleReset(ResetDelay::AfterCancel)],
            )
        }
        (Outgoing, T::RemoteRejected | T::RemoteDisconnected) => to(Ended, END),
        (Outgoing, T::TransportError) => to(Ended, END_FAILED),

        (Active, T::Hangup) => to(
            Ended,
            &[StopTicker, ReleaseCaller, TransportDisconnect, ScheduleReset(ResetDelay::Standard)],
        ),
        (Active, T::RemoteDisconnected) => to(
            Ended,
            &[StopTicker, ReleaseCaller, ScheduleReset(ResetDelay::Standard)],
        ),
        (Active, T::TransportError) => to(
            Ended,
            &[StopTicker, ReleaseCaller, RecordFailure, ScheduleReset(ResetDelay::Standard)],
        ),
        (Active, T::SendDigit) => stay(&[TransportSendDigit]),
        (Active, T::Tick) => stay(&[UpdateDuration]),

        (Incoming | Outgoing | Active, T::LookupCompleted) => stay(&[ApplyIdentity]),

        (Ended, T::GraceElapsed) => to(Idle, &[ClearSession]),

        _ => None,
    }
}
