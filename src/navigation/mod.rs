pub mod feedback;
pub mod guard;
pub mod route;

pub use feedback::{Feedback, FeedbackChannel, RecordingFeedback};
pub use guard::{
    active_service_facts, denial_message, ActiveServiceFacts, NavigationGuard, NavigationOutcome,
    RestrictedDestinations, DENIAL_TITLE,
};
pub use route::{MemoryRouter, Router};
