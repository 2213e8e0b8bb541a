use crate::events::bus::{EventBus, EventHandler, RideEventName, RideEventPayload, ALL_RIDE_EVENTS};
use crate::events::status::{status_accepts_event, RideStatus};
use crate::flow::state::FlowState;
use crate::flow::step::{
    final_step, next_step, previous_step, step_position, FlowStep, Role, ServiceType,
};
use crate::flow::store::FlowStore;
use crate::shared::logging::append_json_line;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

pub const EVENT_TRANSITIONS: [RideEventName; 6] = ALL_RIDE_EVENTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationDirection {
    Forward,
    Backward,
    Reset,
}

impl NavigationDirection {
    pub fn for_event(name: RideEventName) -> Self {
        match name {
            RideEventName::Accepted
            | RideEventName::Arrived
            | RideEventName::Started
            | RideEventName::Completed => NavigationDirection::Forward,
            RideEventName::Rejected => NavigationDirection::Backward,
            RideEventName::Cancelled => NavigationDirection::Reset,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NavigationDirection::Forward => "forward",
            NavigationDirection::Backward => "backward",
            NavigationDirection::Reset => "reset",
        }
    }
}

impl std::fmt::Display for NavigationDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait NavigationActions {
    fn forward(&mut self);
    fn backward(&mut self);
    fn reset(&mut self);

    fn apply(&mut self, direction: NavigationDirection) {
        match direction {
            NavigationDirection::Forward => self.forward(),
            NavigationDirection::Backward => self.backward(),
            NavigationDirection::Reset => self.reset(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlowStateActions {
    flow: FlowStore,
}

impl FlowStateActions {
    pub fn new(flow: FlowStore) -> Self {
        Self { flow }
    }

    fn sequence_context(&self) -> Option<(Role, ServiceType, FlowStep)> {
        self.flow.with_state(|state| {
            state
                .service()
                .map(|service| (state.role(), service, state.step()))
        })
    }
}

impl NavigationActions for FlowStateActions {
    fn forward(&mut self) {
        let Some((role, service, step)) = self.sequence_context() else {
            tracing::debug!("forward navigation without a selected service");
            return;
        };
        let Some(next) = next_step(role, service, step) else {
            return;
        };
        self.flow.set_step(next);
        if next == final_step(role, service) {
            self.flow.complete_service();
        }
    }

    fn backward(&mut self) {
        let Some((role, service, step)) = self.sequence_context() else {
            tracing::debug!("backward navigation without a selected service");
            return;
        };
        match previous_step(role, service, step) {
            Some(previous) => self.flow.set_step(previous),
            None if step_position(role, service, step).is_some() => self.flow.reset(),
            None => {}
        }
    }

    fn reset(&mut self) {
        self.flow.reset();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationAudit {
    pub at: DateTime<Utc>,
    pub direction: NavigationDirection,
    pub reason: String,
    pub from_step: FlowStep,
    pub to_step: FlowStep,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    #[serde(default = "default_true")]
    pub enforce_monotonic_status: bool,
    #[serde(default)]
    pub audit_log_path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            enforce_monotonic_status: true,
            audit_log_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSnapshot {
    pub step: FlowStep,
    pub role: Role,
    pub service: Option<ServiceType>,
    pub correlation_id: Option<String>,
    pub ride_status: RideStatus,
    pub is_active: bool,
    pub listening: bool,
    pub last_event: Option<RideEventName>,
    pub processed_events: u64,
    pub discarded_events: u64,
}

pub fn event_matches_active(state: &FlowState, payload: &RideEventPayload) -> bool {
    match state.active_identifier() {
        Some((kind, active)) => payload.identifier(kind) == Some(active),
        None => false,
    }
}

enum EngineCommand {
    Event {
        name: RideEventName,
        payload: RideEventPayload,
    },
    Force {
        direction: NavigationDirection,
        reason: String,
    },
}

#[derive(Debug)]
struct EngineLedger {
    tracked_id: Option<String>,
    status: RideStatus,
    last_event: Option<RideEventName>,
    processed: u64,
    discarded: u64,
    audit: Vec<NavigationAudit>,
}

impl Default for EngineLedger {
    fn default() -> Self {
        Self {
            tracked_id: None,
            status: RideStatus::Pending,
            last_event: None,
            processed: 0,
            discarded: 0,
            audit: Vec::new(),
        }
    }
}

impl EngineLedger {
    fn track(&mut self, id: &str) {
        if self.tracked_id.as_deref() != Some(id) {
            self.tracked_id = Some(id.to_string());
            self.status = RideStatus::Pending;
        }
    }

    // Forced moves advance the tracked status as well.
    fn follow_forced(&mut self, id: &str, direction: NavigationDirection) {
        self.track(id);
        self.status = match direction {
            NavigationDirection::Forward => self.status.forward_target().unwrap_or(self.status),
            NavigationDirection::Backward => RideStatus::Pending,
            NavigationDirection::Reset => RideStatus::Cancelled,
        };
    }
}

struct EngineShared {
    flow: FlowStore,
    actions: RefCell<Box<dyn NavigationActions>>,
    options: RefCell<EngineOptions>,
    ledger: RefCell<EngineLedger>,
    queue: RefCell<VecDeque<EngineCommand>>,
    draining: Cell<bool>,
}

impl EngineShared {
    fn submit(&self, command: EngineCommand) {
        self.queue.borrow_mut().push_back(command);
        if self.draining.get() {
            return;
        }
        self.draining.set(true);
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(command) = next else {
                break;
            };
            match command {
                EngineCommand::Event { name, payload } => self.process_event(name, &payload),
                EngineCommand::Force { direction, reason } => self.force(direction, &reason),
            }
        }
        self.draining.set(false);
    }

    fn process_event(&self, name: RideEventName, payload: &RideEventPayload) {
        let active = self.flow.with_state(|state| {
            if event_matches_active(state, payload) {
                state.active_identifier().map(|(_, id)| id.to_string())
            } else {
                None
            }
        });
        let Some(active) = active else {
            self.ledger.borrow_mut().discarded += 1;
            tracing::trace!(event = %name, "discarding event for another session");
            return;
        };

        let enforce = self.options.borrow().enforce_monotonic_status;
        {
            let mut ledger = self.ledger.borrow_mut();
            ledger.track(&active);
            if enforce && !status_accepts_event(ledger.status, name) {
                ledger.discarded += 1;
                tracing::debug!(
                    event = %name,
                    correlation_id = %active,
                    status = %ledger.status,
                    "dropping out-of-order event"
                );
                return;
            }
            ledger.status = name.target_status();
            ledger.last_event = Some(name);
            ledger.processed += 1;
        }

        let direction = NavigationDirection::for_event(name);
        tracing::debug!(event = %name, direction = %direction, correlation_id = %active, "auto navigation");
        self.actions.borrow_mut().apply(direction);
    }

    fn force(&self, direction: NavigationDirection, reason: &str) {
        let (from_step, correlation_id) = self.flow.with_state(|state| {
            (
                state.step(),
                state.active_identifier().map(|(_, id)| id.to_string()),
            )
        });
        self.actions.borrow_mut().apply(direction);
        if let Some(id) = correlation_id.as_deref() {
            self.ledger.borrow_mut().follow_forced(id, direction);
        }
        let record = NavigationAudit {
            at: Utc::now(),
            direction,
            reason: reason.to_string(),
            from_step,
            to_step: self.flow.step(),
            correlation_id,
        };
        tracing::info!(
            direction = %direction,
            reason,
            from = %record.from_step,
            to = %record.to_step,
            "forced navigation"
        );

        let audit_log_path = self.options.borrow().audit_log_path.clone();
        if let Some(path) = audit_log_path {
            if let Err(err) = append_json_line(&path, &record) {
                tracing::warn!(path = %path.display(), error = %err, "failed to append navigation audit");
            }
        }
        self.ledger.borrow_mut().audit.push(record);
    }
}

pub struct AutoNavigator {
    shared: Rc<EngineShared>,
    handlers: Vec<(RideEventName, EventHandler)>,
}

impl std::fmt::Debug for AutoNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoNavigator")
            .field("ledger", &*self.shared.ledger.borrow())
            .field("listening", &self.is_listening())
            .finish()
    }
}

impl AutoNavigator {
    pub fn new(flow: FlowStore) -> Self {
        let actions = FlowStateActions::new(flow.clone());
        Self::with_actions(flow, actions)
    }

    pub fn with_actions(flow: FlowStore, actions: impl NavigationActions + 'static) -> Self {
        Self {
            shared: Rc::new(EngineShared {
                flow,
                actions: RefCell::new(Box::new(actions)),
                options: RefCell::new(EngineOptions::default()),
                ledger: RefCell::new(EngineLedger::default()),
                queue: RefCell::new(VecDeque::new()),
                draining: Cell::new(false),
            }),
            handlers: Vec::new(),
        }
    }

    pub fn with_options(self, options: EngineOptions) -> Self {
        *self.shared.options.borrow_mut() = options;
        self
    }

    pub fn activate<B: EventBus + ?Sized>(&mut self, bus: &mut B) {
        if !self.handlers.is_empty() {
            return;
        }
        for name in EVENT_TRANSITIONS {
            let shared = Rc::downgrade(&self.shared);
            let handler: EventHandler = Rc::new(move |payload: &RideEventPayload| {
                if let Some(shared) = shared.upgrade() {
                    shared.submit(EngineCommand::Event {
                        name,
                        payload: payload.clone(),
                    });
                }
            });
            bus.subscribe(name, Rc::clone(&handler));
            self.handlers.push((name, handler));
        }
        tracing::info!(events = EVENT_TRANSITIONS.len(), "auto navigation listening");
    }

    pub fn teardown<B: EventBus + ?Sized>(&mut self, bus: &mut B) {
        if self.handlers.is_empty() {
            return;
        }
        for (name, handler) in self.handlers.drain(..) {
            bus.unsubscribe(name, &handler);
        }
        tracing::info!("auto navigation stopped");
    }

    pub fn is_listening(&self) -> bool {
        !self.handlers.is_empty()
    }

    pub fn event_transitions(&self) -> &'static [RideEventName] {
        &EVENT_TRANSITIONS
    }

    pub fn handle_event(&self, name: RideEventName, payload: &RideEventPayload) {
        self.shared.submit(EngineCommand::Event {
            name,
            payload: payload.clone(),
        });
    }

    pub fn validate_event_for_ride(&self, payload: &RideEventPayload) -> bool {
        self.shared
            .flow
            .with_state(|state| event_matches_active(state, payload))
    }

    pub fn validate_state_transition(&self, from: RideStatus, to: RideStatus) -> bool {
        from.can_transition_to(to)
    }

    pub fn force_navigate(&self, direction: NavigationDirection, reason: &str) {
        self.shared.submit(EngineCommand::Force {
            direction,
            reason: reason.to_string(),
        });
    }

    pub fn ride_status(&self) -> RideStatus {
        self.shared.ledger.borrow().status
    }

    pub fn audit_trail(&self) -> Vec<NavigationAudit> {
        self.shared.ledger.borrow().audit.clone()
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        let ledger = self.shared.ledger.borrow();
        self.shared.flow.with_state(|state| NavigationSnapshot {
            step: state.step(),
            role: state.role(),
            service: state.service(),
            correlation_id: state.active_identifier().map(|(_, id)| id.to_string()),
            ride_status: ledger.status,
            is_active: state.is_active(),
            listening: self.is_listening(),
            last_event: ledger.last_event,
            processed_events: ledger.processed,
            discarded_events: ledger.discarded,
        })
    }
}

impl Drop for AutoNavigator {
    fn drop(&mut self) {
        if self.is_listening() {
            tracing::warn!(
                handlers = self.handlers.len(),
                "auto navigator dropped without teardown; bus handlers are now inert"
            );
        }
    }
}
