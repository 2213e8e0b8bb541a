use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use tripflow::events::{EventBus, EventHandler, LocalEventBus, RideEventName, RideEventPayload};
use tripflow::flow::IdentifierKind;

fn recording_handler(log: &Rc<RefCell<Vec<String>>>, label: &'static str) -> EventHandler {
    let log = Rc::clone(log);
    Rc::new(move |payload: &RideEventPayload| {
        let id = payload
            .correlation_id()
            .map(|(_, id)| id.to_string())
            .unwrap_or_default();
        log.borrow_mut().push(format!("{label}:{id}"));
    })
}

#[test]
fn events_bus_module_parses_event_names() {
    assert_eq!(
        RideEventName::parse("ride:accepted"),
        Some(RideEventName::Accepted)
    );
    assert_eq!(
        RideEventName::parse("ride:cancelled"),
        Some(RideEventName::Cancelled)
    );
    assert_eq!(RideEventName::parse("ride:teleported"), None);
    assert_eq!(RideEventName::Started.to_string(), "ride:started");
}

#[test]
fn events_bus_module_delivers_to_subscribers_of_the_name() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut bus = LocalEventBus::default();
    bus.subscribe(RideEventName::Accepted, recording_handler(&log, "accepted"));
    bus.subscribe(RideEventName::Arrived, recording_handler(&log, "arrived"));

    bus.emit(RideEventName::Accepted, &RideEventPayload::for_ride("r-1"));

    assert_eq!(*log.borrow(), vec!["accepted:r-1".to_string()]);
}

#[test]
fn events_bus_module_unsubscribes_by_handler_identity() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut bus = LocalEventBus::default();
    let first = recording_handler(&log, "first");
    let second = recording_handler(&log, "second");
    bus.subscribe(RideEventName::Started, Rc::clone(&first));
    bus.subscribe(RideEventName::Started, Rc::clone(&second));

    bus.unsubscribe(RideEventName::Started, &first);
    assert_eq!(bus.handler_count(RideEventName::Started), 1);

    bus.emit(RideEventName::Started, &RideEventPayload::for_ride("r-2"));
    assert_eq!(*log.borrow(), vec!["second:r-2".to_string()]);

    let lookalike = recording_handler(&log, "second");
    bus.unsubscribe(RideEventName::Started, &lookalike);
    assert_eq!(bus.handler_count(RideEventName::Started), 1);
}

#[test]
fn events_bus_module_emit_raw_decodes_payload_fields() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut bus = LocalEventBus::default();
    bus.subscribe(RideEventName::Completed, recording_handler(&log, "done"));

    let delivered = bus.emit_raw(
        "ride:completed",
        json!({ "orderId": "order-8", "fare": 12.5 }),
    );
    assert!(delivered);
    assert_eq!(*log.borrow(), vec!["done:order-8".to_string()]);
}

#[test]
fn events_bus_module_emit_raw_ignores_unknown_names_and_bad_payloads() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut bus = LocalEventBus::default();
    bus.subscribe(RideEventName::Accepted, recording_handler(&log, "accepted"));

    assert!(!bus.emit_raw("ride:unknown", json!({ "rideId": "r-1" })));
    assert!(!bus.emit_raw("ride:accepted", json!({ "rideId": 42 })));
    assert!(!bus.emit_raw("ride:accepted", json!("not an object")));
    assert!(log.borrow().is_empty());
}

#[test]
fn events_bus_module_payload_keeps_extra_fields() {
    let payload: RideEventPayload = serde_json::from_value(json!({
        "rideId": "ride-5",
        "driverName": "Sam",
    }))
    .expect("decode payload");

    assert_eq!(payload.identifier(IdentifierKind::Ride), Some("ride-5"));
    assert_eq!(payload.fields.get("driverName"), Some(&json!("Sam")));

    let encoded = serde_json::to_value(
        RideEventPayload::for_identifier(IdentifierKind::Parcel, "parcel-1")
            .with_field("eta", json!(4)),
    )
    .expect("encode payload");
    assert_eq!(encoded, json!({ "parcelId": "parcel-1", "eta": 4 }));
}
