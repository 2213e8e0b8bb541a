use tripflow::flow::{FlowStep, FlowStore, IdentifierKind, Role, ServiceType};
use tripflow::navigation::{
    active_service_facts, denial_message, MemoryRouter, NavigationGuard, NavigationOutcome,
    RecordingFeedback, RestrictedDestinations, Router, DENIAL_TITLE,
};

fn driver_on_transport() -> FlowStore {
    let flow = FlowStore::new(Role::Driver);
    flow.select_service(ServiceType::Transport);
    flow.attach_identifier(IdentifierKind::Ride, "ride-77");
    flow.set_step(FlowStep::DriverTransportEnRoute);
    flow
}

#[test]
fn navigation_guard_module_denies_management_route_during_active_service() {
    let flow = driver_on_transport();
    let mut guard = NavigationGuard::new(
        flow,
        MemoryRouter::starting_at("/driver/home"),
        RecordingFeedback::default(),
    );

    let outcome = guard.navigate_to("/driver/vehicles");
    assert_eq!(
        outcome,
        NavigationOutcome::Denied {
            service: ServiceType::Transport
        }
    );

    let (router, feedback) = guard.into_parts();
    assert_eq!(router.current_path(), "/driver/home");
    assert_eq!(router.history().len(), 1);
    assert_eq!(
        feedback.errors(),
        vec![(
            "Action Not Available",
            "You cannot access management sections while on an active transport service. Please complete your current service first."
        )]
    );
}

#[test]
fn navigation_guard_module_allows_unrestricted_destination() {
    let flow = driver_on_transport();
    let mut guard = NavigationGuard::new(flow, MemoryRouter::default(), RecordingFeedback::default());

    assert_eq!(guard.navigate_to("/driver/earnings"), NavigationOutcome::Navigated);
    assert_eq!(guard.router().current_path(), "/driver/earnings");
    assert!(guard.feedback().entries().is_empty());
}

#[test]
fn navigation_guard_module_allows_restricted_destination_without_active_service() {
    let flow = FlowStore::new(Role::Driver);
    let mut guard = NavigationGuard::new(flow, MemoryRouter::default(), RecordingFeedback::default());

    assert!(!guard.has_active_service());
    assert_eq!(guard.navigate_to("/driver/vehicles"), NavigationOutcome::Navigated);
    assert_eq!(guard.router().current_path(), "/driver/vehicles");
}

#[test]
fn navigation_guard_module_requires_an_identifier_for_active_service() {
    let flow = FlowStore::new(Role::Customer);
    flow.select_service(ServiceType::Delivery);

    let facts = flow.with_state(active_service_facts);
    assert!(!facts.has_active_service);
    assert_eq!(facts.current_service_type, None);

    flow.attach_identifier(IdentifierKind::Order, "order-5");
    let facts = flow.with_state(active_service_facts);
    assert!(facts.has_active_service);
    assert_eq!(facts.current_service_type, Some(ServiceType::Delivery));

    flow.complete_service();
    assert!(!flow.with_state(active_service_facts).has_active_service);
}

#[test]
fn navigation_guard_module_replace_respects_denial_and_query_strings() {
    let flow = FlowStore::new(Role::Customer);
    flow.select_service(ServiceType::Errand);
    flow.attach_identifier(IdentifierKind::Errand, "errand-2");

    let mut router = MemoryRouter::starting_at("/customer/home");
    let mut feedback = RecordingFeedback::default();
    {
        let mut guard = NavigationGuard::new(flow, &mut router, &mut feedback);
        assert!(matches!(
            guard.replace_to("/customer/payment-methods?tab=cards"),
            NavigationOutcome::Denied { .. }
        ));
        assert_eq!(
            guard.replace_to("/customer/support"),
            NavigationOutcome::Navigated
        );
    }

    assert_eq!(router.history(), ["/customer/support".to_string()]);
    assert_eq!(feedback.errors().len(), 1);
    assert_eq!(feedback.errors()[0].0, DENIAL_TITLE);
    assert_eq!(feedback.errors()[0].1, denial_message(ServiceType::Errand));
}

#[test]
fn navigation_guard_module_reports_current_route_restriction() {
    let flow = driver_on_transport();
    let guard = NavigationGuard::new(
        flow.clone(),
        MemoryRouter::starting_at("/driver/settings/"),
        RecordingFeedback::default(),
    );
    assert!(guard.is_current_route_restricted());
    assert_eq!(guard.current_service_type(), Some(ServiceType::Transport));

    flow.reset();
    assert!(!guard.is_current_route_restricted());
    assert!(!guard.is_destination_restricted("/driver/settings"));
}

#[test]
fn navigation_guard_module_uses_custom_destinations_and_title() {
    let flow = driver_on_transport();
    let restricted = RestrictedDestinations {
        customer: Default::default(),
        driver: ["/driver/earnings".to_string()].into_iter().collect(),
    };
    let mut guard = NavigationGuard::new(flow, MemoryRouter::default(), RecordingFeedback::default())
        .with_restricted_destinations(restricted)
        .with_denial_title("Finish your trip");

    assert_eq!(guard.navigate_to("/driver/vehicles"), NavigationOutcome::Navigated);
    assert!(matches!(
        guard.navigate_to("/driver/earnings"),
        NavigationOutcome::Denied { .. }
    ));
    assert_eq!(guard.feedback().errors()[0].0, "Finish your trip");
}
