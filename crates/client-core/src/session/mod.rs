//! Call session: phases, transition table, pure machine and the task
//! that drives it

pub mod actor;
pub mod machine;
pub mod table;
pub mod types;

pub use actor::{CallSession, CallSessionHandle};
pub use machine::{CallStateMachine, Effect};
pub use table::{transition, ActionTemplate, ResetDelay, Transition, Trigger, TriggerKind};
pub use types::{format_duration, CallPhase, CallerIdentity, SessionSnapshot};
