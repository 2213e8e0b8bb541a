use crate::flow::state::{FlowState, IdentifierKind};
use crate::flow::step::{entry_step, pre_service_step, FlowStep, Role, ServiceType};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub type FlowObserver = Rc<dyn Fn(&FlowState)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

struct FlowStoreInner {
    state: RefCell<FlowState>,
    observers: RefCell<Vec<(ObserverId, FlowObserver)>>,
    next_observer_id: Cell<u64>,
    notifying: Cell<bool>,
    pending: Cell<bool>,
}

/// Owner of the session `FlowState`.
///
/// Handles are cheap clones of one shared container. Observers run
/// synchronously after each mutation that changed the state.
#[derive(Clone)]
pub struct FlowStore {
    inner: Rc<FlowStoreInner>,
}

impl std::fmt::Debug for FlowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowStore")
            .field("state", &*self.inner.state.borrow())
            .field("observers", &self.inner.observers.borrow().len())
            .finish()
    }
}

impl FlowStore {
    pub fn new(role: Role) -> Self {
        Self::from_state(FlowState::initial(role))
    }

    pub fn from_state(mut state: FlowState) -> Self {
        if state.retain_single_identifier() {
            tracing::warn!(
                kept = ?state.active_identifier().map(|(kind, _)| kind),
                "dropping extra identifiers from restored flow state"
            );
        }
        Self {
            inner: Rc::new(FlowStoreInner {
                state: RefCell::new(state),
                observers: RefCell::new(Vec::new()),
                next_observer_id: Cell::new(1),
                notifying: Cell::new(false),
                pending: Cell::new(false),
            }),
        }
    }

    pub fn snapshot(&self) -> FlowState {
        self.inner.state.borrow().clone()
    }

    pub fn with_state<T>(&self, read: impl FnOnce(&FlowState) -> T) -> T {
        read(&self.inner.state.borrow())
    }

    pub fn step(&self) -> FlowStep {
        self.inner.state.borrow().step
    }

    pub fn role(&self) -> Role {
        self.inner.state.borrow().role
    }

    pub fn set_step(&self, step: FlowStep) {
        self.mutate(|state| state.step = step);
    }

    pub fn start_for_role(&self, role: Role, initial_step: FlowStep) {
        self.mutate(|state| {
            state.role = role;
            state.step = initial_step;
            state.service = None;
            state.clear_identifiers();
            state.is_active = false;
        });
    }

    pub fn select_service(&self, service: ServiceType) {
        self.mutate(|state| {
            state.service = Some(service);
            state.step = entry_step(state.role, service);
            state.is_active = true;
        });
    }

    pub fn attach_identifier(&self, kind: IdentifierKind, id: &str) {
        let id = id.trim();
        if id.is_empty() {
            tracing::debug!(kind = %kind, "ignoring blank identifier");
            return;
        }
        self.mutate(|state| {
            state.clear_identifiers();
            *state.identifier_slot_mut(kind) = Some(id.to_string());
        });
    }

    pub fn complete_service(&self) {
        self.mutate(|state| state.is_active = false);
    }

    pub fn reset(&self) {
        self.mutate(|state| {
            state.step = pre_service_step(state.role);
            state.service = None;
            state.clear_identifiers();
            state.is_active = false;
        });
    }

    pub fn subscribe(&self, observer: impl Fn(&FlowState) + 'static) -> ObserverId {
        let id = ObserverId(self.inner.next_observer_id.get());
        self.inner.next_observer_id.set(id.0 + 1);
        self.inner
            .observers
            .borrow_mut()
            .push((id, Rc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.inner.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    fn mutate(&self, apply: impl FnOnce(&mut FlowState)) {
        {
            let mut state = self.inner.state.borrow_mut();
            let before = state.clone();
            apply(&mut state);
            if state.same_content(&before) {
                return;
            }
            state.revision = before.revision + 1;
        }

        // A mutation made by an observer is delivered by the outer loop,
        // so every observer's last view is the latest state.
        self.inner.pending.set(true);
        if self.inner.notifying.get() {
            return;
        }
        self.inner.notifying.set(true);
        while self.inner.pending.replace(false) {
            let current = self.snapshot();
            let observers: Vec<FlowObserver> = self
                .inner
                .observers
                .borrow()
                .iter()
                .map(|(_, observer)| Rc::clone(observer))
                .collect();
            for observer in observers {
                observer(&current);
            }
        }
        self.inner.notifying.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_state_keeps_the_identifier_matching_the_service() {
        let mut state = FlowState::at(Role::Customer, FlowStep::TransportRoute);
        state.service = Some(ServiceType::Transport);
        state.order_id = Some("o1".to_string());
        state.ride_id = Some("r1".to_string());

        let flow = FlowStore::from_state(state);
        let restored = flow.snapshot();
        assert_eq!(restored.ride_id(), Some("r1"));
        assert_eq!(restored.order_id(), None);
    }

    #[test]
    fn from_state_without_service_keeps_the_first_identifier() {
        let mut state = FlowState::at(Role::Driver, FlowStep::DriverDashboard);
        state.errand_id = Some("e1".to_string());
        state.parcel_id = Some("p1".to_string());

        let restored = FlowStore::from_state(state).snapshot();
        assert_eq!(restored.errand_id(), Some("e1"));
        assert_eq!(restored.parcel_id(), None);
    }
}
