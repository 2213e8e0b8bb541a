use crate::flow::state::{IdentifierKind, ALL_IDENTIFIER_KINDS};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RideEventName {
    #[serde(rename = "ride:accepted")]
    Accepted,
    #[serde(rename = "ride:rejected")]
    Rejected,
    #[serde(rename = "ride:arrived")]
    Arrived,
    #[serde(rename = "ride:started")]
    Started,
    #[serde(rename = "ride:completed")]
    Completed,
    #[serde(rename = "ride:cancelled")]
    Cancelled,
}

pub const ALL_RIDE_EVENTS: [RideEventName; 6] = [
    RideEventName::Accepted,
    RideEventName::Rejected,
    RideEventName::Arrived,
    RideEventName::Started,
    RideEventName::Completed,
    RideEventName::Cancelled,
];

impl RideEventName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "ride:accepted",
            Self::Rejected => "ride:rejected",
            Self::Arrived => "ride:arrived",
            Self::Started => "ride:started",
            Self::Completed => "ride:completed",
            Self::Cancelled => "ride:cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        ALL_RIDE_EVENTS
            .into_iter()
            .find(|name| name.as_str() == raw.trim())
    }
}

impl std::fmt::Display for RideEventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideEventPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ride_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errand_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parcel_id: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RideEventPayload {
    pub fn for_identifier(kind: IdentifierKind, id: &str) -> Self {
        let mut payload = Self::default();
        *payload.slot_mut(kind) = Some(id.to_string());
        payload
    }

    pub fn for_ride(id: &str) -> Self {
        Self::for_identifier(IdentifierKind::Ride, id)
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn identifier(&self, kind: IdentifierKind) -> Option<&str> {
        match kind {
            IdentifierKind::Ride => self.ride_id.as_deref(),
            IdentifierKind::Order => self.order_id.as_deref(),
            IdentifierKind::Errand => self.errand_id.as_deref(),
            IdentifierKind::Parcel => self.parcel_id.as_deref(),
        }
    }

    pub fn correlation_id(&self) -> Option<(IdentifierKind, &str)> {
        ALL_IDENTIFIER_KINDS
            .into_iter()
            .find_map(|kind| self.identifier(kind).map(|id| (kind, id)))
    }

    fn slot_mut(&mut self, kind: IdentifierKind) -> &mut Option<String> {
        match kind {
            IdentifierKind::Ride => &mut self.ride_id,
            IdentifierKind::Order => &mut self.order_id,
            IdentifierKind::Errand => &mut self.errand_id,
            IdentifierKind::Parcel => &mut self.parcel_id,
        }
    }
}

pub type EventHandler = Rc<dyn Fn(&RideEventPayload)>;

pub trait EventBus {
    fn subscribe(&mut self, name: RideEventName, handler: EventHandler);
    fn unsubscribe(&mut self, name: RideEventName, handler: &EventHandler);
    fn emit(&mut self, name: RideEventName, payload: &RideEventPayload);
}

#[derive(Default)]
pub struct LocalEventBus {
    handlers: HashMap<RideEventName, Vec<EventHandler>>,
}

impl std::fmt::Debug for LocalEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(name, handlers)| (name.as_str(), handlers.len()))
            .collect();
        f.debug_struct("LocalEventBus")
            .field("handlers", &counts)
            .finish()
    }
}

impl LocalEventBus {
    pub fn handler_count(&self, name: RideEventName) -> usize {
        self.handlers.get(&name).map(Vec::len).unwrap_or(0)
    }

    pub fn emit_raw(&mut self, name: &str, payload: Value) -> bool {
        let Some(name) = RideEventName::parse(name) else {
            tracing::trace!(name, "ignoring unknown event name");
            return false;
        };
        let payload = match serde_json::from_value::<RideEventPayload>(payload) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::debug!(name = %name, error = %err, "ignoring malformed event payload");
                return false;
            }
        };
        self.emit(name, &payload);
        true
    }
}

impl EventBus for LocalEventBus {
    fn subscribe(&mut self, name: RideEventName, handler: EventHandler) {
        self.handlers.entry(name).or_default().push(handler);
    }

    fn unsubscribe(&mut self, name: RideEventName, handler: &EventHandler) {
        if let Some(handlers) = self.handlers.get_mut(&name) {
            if let Some(index) = handlers
                .iter()
                .position(|existing| Rc::ptr_eq(existing, handler))
            {
                handlers.remove(index);
            }
        }
    }

    fn emit(&mut self, name: RideEventName, payload: &RideEventPayload) {
        let handlers = self.handlers.get(&name).cloned().unwrap_or_default();
        for handler in handlers {
            handler(payload);
        }
    }
}
