pub mod state;
pub mod step;
pub mod store;

pub use state::{FlowState, IdentifierKind, ALL_IDENTIFIER_KINDS};
pub use step::{FlowStep, Role, ServiceType, StepOwner, ALL_FLOW_STEPS};
pub use store::{FlowObserver, FlowStore, ObserverId};
