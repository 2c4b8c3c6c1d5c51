//! Call-session task
//!
//! One tokio task owns the [`CallStateMachine`]. User commands, transport
//! events and internal completions (lookups, ticks, grace timers, failed
//! transport actions) all land on that task's queue, so the session data
//! is only ever touched from one place and staleness checks cannot race
//! with the transitions they guard against.

use std::sync::Arc;

use omnicall_infra_common::LogContext;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Duration, Instant};
use tracing::{debug, info, warn, Instrument, Level};

use super::machine::{CallStateMachine, Effect};
use super::table::Trigger;
use super::types::SessionSnapshot;
use crate::config::SessionConfig;
use crate::directory::{lookup_quietly, DirectoryLookup};
use crate::error::{ClientError, ClientResult};
use crate::events::{EventEmitter, SessionEvent};
use crate::transport::{TelephonyTransport, TransportAction, TransportEvent};

const COMMAND_CAPACITY: usize = 32;

enum Command {
    Trigger {
        trigger: Trigger,
        reply: oneshot::Sender<ClientResult<()>>,
    },
    Shutdown,
}

enum Internal {
    Trigger(Trigger),
    ActionFailed {
        generation: u64,
        action: &'static str,
        reason: String,
    },
}

/// Entry point for running a call session
pub struct CallSession;

impl CallSession {
    /// Spawn the session task on the current tokio runtime
    ///
    /// `transport_events` carries the transport's events; the session keeps
    /// serving user commands after that channel closes.
    pub fn spawn(
        config: SessionConfig,
        transport: Arc<dyn TelephonyTransport>,
        directory: Arc<dyn DirectoryLookup>,
        transport_events: mpsc::UnboundedReceiver<TransportEvent>,
    ) -> ClientResult<CallSessionHandle> {
        config.validate()?;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let machine = CallStateMachine::new(&config);
        let (state_tx, state_rx) = watch::channel(machine.snapshot());
        let events = EventEmitter::new(config.event_capacity);

        let mut context = LogContext::new("call_session");
        if let Some(agent_id) = &config.agent_id {
            context = context.with_field("agent", agent_id.clone());
        }

        let actor = SessionActor {
            machine,
            transport,
            directory,
            internal_tx,
            state_tx,
            events: events.clone(),
            tick_interval: config.tick_interval,
            ticker: None,
            reset_timer: None,
        };
        tokio::spawn(
            actor
                .run(command_rx, internal_rx, transport_events)
                .instrument(context.span(Level::INFO)),
        );

        Ok(CallSessionHandle {
            commands: command_tx,
            state: state_rx,
            events,
        })
    }
}

/// Cloneable handle to a running call session
#[derive(Clone)]
pub struct CallSessionHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<SessionSnapshot>,
    events: EventEmitter,
}

impl CallSessionHandle {
    /// Place an outgoing call
    pub async fn dial(&self, number: impl Into<String>) -> ClientResult<()> {
        self.request(Trigger::Dial { number: number.into() }).await
    }

    /// Answer the ringing inbound call
    pub async fn accept(&self) -> ClientResult<()> {
        self.request(Trigger::Accept).await
    }

    /// Refuse the ringing inbound call
    pub async fn decline(&self) -> ClientResult<()> {
        self.request(Trigger::Decline).await
    }

    /// Abandon an outgoing call before it is answered
    pub async fn cancel(&self) -> ClientResult<()> {
        self.request(Trigger::Cancel).await
    }

    /// End whatever call is on the line
    pub async fn hangup(&self) -> ClientResult<()> {
        self.request(Trigger::Hangup).await
    }

    /// Send a DTMF digit on the active call
    pub async fn send_digit(&self, digit: char) -> ClientResult<()> {
        self.request(Trigger::SendDigit { digit }).await
    }

    /// Latest session state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Watch channel that always holds the latest state
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.clone()
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Stop the session task; later requests fail with `SessionClosed`
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn request(&self, trigger: Trigger) -> ClientResult<()> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Trigger { trigger, reply })
            .await
            .map_err(|_| ClientError::SessionClosed)?;
        response.await.map_err(|_| ClientError::SessionClosed)?
    }
}

struct SessionActor {
    machine: CallStateMachine,
    transport: Arc<dyn TelephonyTransport>,
    directory: Arc<dyn DirectoryLookup>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    state_tx: watch::Sender<SessionSnapshot>,
    events: EventEmitter,
    tick_interval: Duration,
    ticker: Option<JoinHandle<()>>,
    reset_timer: Option<JoinHandle<()>>,
}

impl SessionActor {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut internal: mpsc::UnboundedReceiver<Internal>,
        mut transport_events: mpsc::UnboundedReceiver<TransportEvent>,
    ) {
        info!("Call session started");
        let mut transport_open = true;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Trigger { trigger, reply }) => {
                        let result = self.dispatch(trigger);
                        let _ = reply.send(result);
                    }
                    Some(Command::Shutdown) | None => break,
                },
                Some(message) = internal.recv() => self.handle_internal(message),
                event = transport_events.recv(), if transport_open => match event {
                    Some(event) => {
                        debug!("Transport event: {:?}", event);
                        if let Err(e) = self.dispatch(event.into()) {
                            debug!("Transport event not applied: {}", e);
                        }
                    }
                    None => {
                        warn!("Transport event channel closed");
                        transport_open = false;
                    }
                },
            }
        }

        self.stop_ticker();
        if let Some(timer) = self.reset_timer.take() {
            timer.abort();
        }
        info!("Call session stopped");
    }

    fn handle_internal(&mut self, message: Internal) {
        match message {
            Internal::Trigger(trigger) => {
                if let Err(e) = self.dispatch(trigger) {
                    debug!("Internal trigger not applied: {}", e);
                }
            }
            Internal::ActionFailed { generation, action, reason } => {
                if generation != self.machine.generation() {
                    debug!("Ignoring failed {} from an earlier call: {}", action, reason);
                    return;
                }
                if action == "send_digit" {
                    warn!("Failed to send digit: {}", reason);
                    return;
                }
                warn!("Transport {} failed: {}", action, reason);
                let trigger = Trigger::TransportError {
                    reason: format!("{} failed: {}", action, reason),
                };
                if let Err(e) = self.dispatch(trigger) {
                    debug!("Transport failure not applied: {}", e);
                }
            }
        }
    }

    fn dispatch(&mut self, trigger: Trigger) -> ClientResult<()> {
        let effects = self.machine.handle(trigger, Instant::now())?;
        if effects.is_empty() {
            return Ok(());
        }

        let mut published = Vec::new();
        for effect in effects {
            match effect {
                Effect::Publish(kind) => published.push(kind),
                other => self.execute(other),
            }
        }

        let snapshot = self.machine.snapshot();
        self.state_tx.send_replace(snapshot.clone());
        for kind in published {
            self.events.emit(SessionEvent {
                kind,
                snapshot: snapshot.clone(),
            });
        }
        Ok(())
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::StartLookup { generation, number } => {
                let directory = self.directory.clone();
                let tx = self.internal_tx.clone();
                tokio::spawn(async move {
                    let entry = lookup_quietly(directory.as_ref(), &number).await;
                    let _ = tx.send(Internal::Trigger(Trigger::LookupCompleted { generation, entry }));
                });
            }
            Effect::StartTicker { generation } => {
                self.stop_ticker();
                let tx = self.internal_tx.clone();
                let period = self.tick_interval;
                self.ticker = Some(tokio::spawn(async move {
                    let mut interval = interval_at(Instant::now() + period, period);
                    loop {
                        interval.tick().await;
                        if tx.send(Internal::Trigger(Trigger::Tick { generation })).is_err() {
                            break;
                        }
                    }
                }));
            }
            Effect::StopTicker => self.stop_ticker(),
            Effect::ScheduleReset { generation, delay } => {
                if let Some(timer) = self.reset_timer.take() {
                    timer.abort();
                }
                let tx = self.internal_tx.clone();
                self.reset_timer = Some(tokio::spawn(async move {
                    sleep(delay).await;
                    let _ = tx.send(Internal::Trigger(Trigger::GraceElapsed { generation }));
                }));
            }
            Effect::Transport { generation, action } => self.perform(generation, action),
            Effect::Publish(_) => {}
        }
    }

    fn perform(&self, generation: u64, action: TransportAction) {
        let transport = self.transport.clone();
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let name = action.name();
            if let Err(e) = transport.execute(action).await {
                let _ = tx.send(Internal::ActionFailed {
                    generation,
                    action: name,
                    reason: e.reason,
                });
            }
        });
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
            debug!("Duration ticker stopped");
        }
    }
}
