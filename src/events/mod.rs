pub mod bus;
pub mod engine;
pub mod status;

pub use bus::{EventBus, EventHandler, LocalEventBus, RideEventName, RideEventPayload};
pub use engine::{
    AutoNavigator, EngineOptions, FlowStateActions, NavigationActions, NavigationAudit,
    NavigationDirection, NavigationSnapshot, EVENT_TRANSITIONS,
};
pub use status::{validate_state_transition, validate_state_transition_tokens, RideStatus};
