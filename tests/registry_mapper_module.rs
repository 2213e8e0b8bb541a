use tripflow::flow::{FlowState, FlowStep, Role};
use tripflow::registry::{
    create_mapper, render_factory, resolve_step, MapperOptions, StepMetadata, StepRegistry,
};

fn populated_registry() -> StepRegistry<&'static str> {
    let mut registry = StepRegistry::new();
    registry.register(
        FlowStep::TransportRoute,
        Role::Customer,
        render_factory(|_: &FlowState| "route-form"),
        StepMetadata::titled("Route"),
    );
    registry.register(
        FlowStep::DriverTransportOffer,
        Role::Driver,
        render_factory(|_: &FlowState| "offer-card"),
        StepMetadata::titled("Offer"),
    );
    registry.set_default(
        render_factory(|_: &FlowState| "placeholder"),
        StepMetadata::titled("Placeholder"),
    );
    registry
}

#[test]
fn registry_mapper_module_prefers_exact_registration() {
    let registry = populated_registry();
    let mapper = create_mapper(&registry, MapperOptions::for_role(Role::Customer));
    let state = FlowState::at(Role::Customer, FlowStep::TransportRoute);

    let factory = mapper(FlowStep::TransportRoute).expect("route factory");
    assert_eq!(factory(&state), "route-form");
}

#[test]
fn registry_mapper_module_falls_back_to_default_when_enabled() {
    let registry = populated_registry();
    let state = FlowState::at(Role::Customer, FlowStep::TransportVehicle);

    let factory = resolve_step(
        &registry,
        MapperOptions::for_role(Role::Customer),
        FlowStep::TransportVehicle,
    )
    .expect("default factory");
    assert_eq!(factory(&state), "placeholder");
}

#[test]
fn registry_mapper_module_returns_none_when_fallback_disabled() {
    let registry = populated_registry();
    let options = MapperOptions::for_role(Role::Customer).without_fallback();

    assert!(resolve_step(&registry, options, FlowStep::TransportVehicle).is_none());
    assert!(resolve_step(&registry, options, FlowStep::TransportRoute).is_some());
}

#[test]
fn registry_mapper_module_scopes_lookup_to_the_configured_role() {
    let registry = populated_registry();
    let options = MapperOptions::for_role(Role::Customer)
        .without_fallback()
        .with_debug_info(true);

    assert!(resolve_step(&registry, options, FlowStep::DriverTransportOffer).is_none());
}

#[test]
fn registry_mapper_module_returns_none_for_empty_registry() {
    let registry: StepRegistry<&'static str> = StepRegistry::new();
    let mapper = create_mapper(&registry, MapperOptions::for_role(Role::Driver));
    assert!(mapper(FlowStep::DriverDashboard).is_none());
}

#[test]
fn registry_mapper_module_options_default_to_fallback_in_yaml() {
    let options: MapperOptions =
        serde_yaml::from_str("role: driver\n").expect("parse mapper options");
    assert_eq!(options, MapperOptions::for_role(Role::Driver));
}
