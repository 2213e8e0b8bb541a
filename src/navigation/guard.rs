use crate::flow::state::FlowState;
use crate::flow::step::{Role, ServiceType};
use crate::flow::store::FlowStore;
use crate::navigation::feedback::FeedbackChannel;
use crate::navigation::route::Router;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DENIAL_TITLE: &str = "Action Not Available";

const DRIVER_RESTRICTED: [&str; 5] = [
    "/driver/profile",
    "/driver/vehicles",
    "/driver/documents",
    "/driver/settings",
    "/driver/bank-account",
];

const CUSTOMER_RESTRICTED: [&str; 4] = [
    "/customer/profile",
    "/customer/payment-methods",
    "/customer/addresses",
    "/customer/settings",
];

pub fn denial_message(service: ServiceType) -> String {
    format!(
        "You cannot access management sections while on an active {service} service. Please complete your current service first."
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveServiceFacts {
    pub has_active_service: bool,
    pub current_service_type: Option<ServiceType>,
}

pub fn active_service_facts(state: &FlowState) -> ActiveServiceFacts {
    let has_active_service =
        state.is_active() && state.service().is_some() && state.has_any_identifier();
    ActiveServiceFacts {
        has_active_service,
        current_service_type: if has_active_service {
            state.service()
        } else {
            None
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictedDestinations {
    #[serde(default)]
    pub customer: BTreeSet<String>,
    #[serde(default)]
    pub driver: BTreeSet<String>,
}

impl Default for RestrictedDestinations {
    fn default() -> Self {
        Self {
            customer: CUSTOMER_RESTRICTED.iter().map(|p| p.to_string()).collect(),
            driver: DRIVER_RESTRICTED.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl RestrictedDestinations {
    pub fn for_role(&self, role: Role) -> &BTreeSet<String> {
        match role {
            Role::Customer => &self.customer,
            Role::Driver => &self.driver,
        }
    }

    pub fn contains(&self, role: Role, path: &str) -> bool {
        self.for_role(role).contains(normalize_destination(path))
    }
}

pub fn normalize_destination(path: &str) -> &str {
    let path = path.trim();
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Navigated,
    Denied { service: ServiceType },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteChange {
    Push,
    Replace,
}

#[derive(Debug)]
pub struct NavigationGuard<R, F> {
    flow: FlowStore,
    router: R,
    feedback: F,
    restricted: RestrictedDestinations,
    denial_title: String,
}

impl<R: Router, F: FeedbackChannel> NavigationGuard<R, F> {
    pub fn new(flow: FlowStore, router: R, feedback: F) -> Self {
        Self {
            flow,
            router,
            feedback,
            restricted: RestrictedDestinations::default(),
            denial_title: DENIAL_TITLE.to_string(),
        }
    }

    pub fn with_restricted_destinations(mut self, restricted: RestrictedDestinations) -> Self {
        self.restricted = restricted;
        self
    }

    pub fn with_denial_title(mut self, title: &str) -> Self {
        self.denial_title = title.to_string();
        self
    }

    pub fn facts(&self) -> ActiveServiceFacts {
        self.flow.with_state(active_service_facts)
    }

    pub fn has_active_service(&self) -> bool {
        self.facts().has_active_service
    }

    pub fn current_service_type(&self) -> Option<ServiceType> {
        self.facts().current_service_type
    }

    pub fn is_destination_restricted(&self, path: &str) -> bool {
        self.has_active_service() && self.restricted.contains(self.flow.role(), path)
    }

    pub fn is_current_route_restricted(&self) -> bool {
        self.is_destination_restricted(self.router.current_path())
    }

    pub fn navigate_to(&mut self, destination: &str) -> NavigationOutcome {
        self.guarded(destination, RouteChange::Push)
    }

    pub fn replace_to(&mut self, destination: &str) -> NavigationOutcome {
        self.guarded(destination, RouteChange::Replace)
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn into_parts(self) -> (R, F) {
        (self.router, self.feedback)
    }

    fn guarded(&mut self, destination: &str, change: RouteChange) -> NavigationOutcome {
        let facts = self.facts();
        if let Some(service) = facts.current_service_type {
            if self.restricted.contains(self.flow.role(), destination) {
                tracing::info!(
                    destination,
                    service = %service,
                    "navigation denied during active service"
                );
                self.feedback
                    .show_error(&self.denial_title, &denial_message(service));
                return NavigationOutcome::Denied { service };
            }
        }

        match change {
            RouteChange::Push => self.router.push(destination),
            RouteChange::Replace => self.router.replace(destination),
        }
        NavigationOutcome::Navigated
    }
}
