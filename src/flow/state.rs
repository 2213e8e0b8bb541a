use crate::flow::step::{pre_service_step, FlowStep, Role, ServiceType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    Ride,
    Order,
    Errand,
    Parcel,
}

pub const ALL_IDENTIFIER_KINDS: [IdentifierKind; 4] = [
    IdentifierKind::Ride,
    IdentifierKind::Order,
    IdentifierKind::Errand,
    IdentifierKind::Parcel,
];

impl IdentifierKind {
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Ride => "rideId",
            Self::Order => "orderId",
            Self::Errand => "errandId",
            Self::Parcel => "parcelId",
        }
    }

    pub fn for_service(service: ServiceType) -> Self {
        match service {
            ServiceType::Transport => Self::Ride,
            ServiceType::Delivery => Self::Order,
            ServiceType::Errand => Self::Errand,
            ServiceType::Parcel => Self::Parcel,
        }
    }
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Session state shared by the screen host, the guard, the engine and the pager.
///
/// Fields are only writable inside the crate; `FlowStore` is the single writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "FlowStateRecord")]
pub struct FlowState {
    pub(crate) step: FlowStep,
    pub(crate) role: Role,
    pub(crate) service: Option<ServiceType>,
    pub(crate) ride_id: Option<String>,
    pub(crate) order_id: Option<String>,
    pub(crate) errand_id: Option<String>,
    pub(crate) parcel_id: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) revision: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlowStateRecord {
    step: FlowStep,
    role: Role,
    #[serde(default)]
    service: Option<ServiceType>,
    #[serde(default)]
    ride_id: Option<String>,
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    errand_id: Option<String>,
    #[serde(default)]
    parcel_id: Option<String>,
    is_active: bool,
    #[serde(default)]
    revision: u64,
}

impl TryFrom<FlowStateRecord> for FlowState {
    type Error = String;

    fn try_from(record: FlowStateRecord) -> Result<Self, Self::Error> {
        let state = FlowState {
            step: record.step,
            role: record.role,
            service: record.service,
            ride_id: record.ride_id,
            order_id: record.order_id,
            errand_id: record.errand_id,
            parcel_id: record.parcel_id,
            is_active: record.is_active,
            revision: record.revision,
        };
        let set = state.identifier_kinds_set();
        if set.len() > 1 {
            let names = set
                .iter()
                .map(|kind| kind.field_name())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(format!("at most one identifier may be set, found {names}"));
        }
        Ok(state)
    }
}

impl FlowState {
    pub fn initial(role: Role) -> Self {
        Self::at(role, pre_service_step(role))
    }

    pub fn at(role: Role, step: FlowStep) -> Self {
        Self {
            step,
            role,
            service: None,
            ride_id: None,
            order_id: None,
            errand_id: None,
            parcel_id: None,
            is_active: false,
            revision: 0,
        }
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn service(&self) -> Option<ServiceType> {
        self.service
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn identifier(&self, kind: IdentifierKind) -> Option<&str> {
        self.identifier_slot(kind).as_deref()
    }

    pub fn ride_id(&self) -> Option<&str> {
        self.ride_id.as_deref()
    }

    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    pub fn errand_id(&self) -> Option<&str> {
        self.errand_id.as_deref()
    }

    pub fn parcel_id(&self) -> Option<&str> {
        self.parcel_id.as_deref()
    }

    pub fn active_identifier(&self) -> Option<(IdentifierKind, &str)> {
        ALL_IDENTIFIER_KINDS
            .into_iter()
            .find_map(|kind| self.identifier(kind).map(|id| (kind, id)))
    }

    pub fn has_any_identifier(&self) -> bool {
        self.active_identifier().is_some()
    }

    pub(crate) fn identifier_slot(&self, kind: IdentifierKind) -> &Option<String> {
        match kind {
            IdentifierKind::Ride => &self.ride_id,
            IdentifierKind::Order => &self.order_id,
            IdentifierKind::Errand => &self.errand_id,
            IdentifierKind::Parcel => &self.parcel_id,
        }
    }

    pub(crate) fn identifier_slot_mut(&mut self, kind: IdentifierKind) -> &mut Option<String> {
        match kind {
            IdentifierKind::Ride => &mut self.ride_id,
            IdentifierKind::Order => &mut self.order_id,
            IdentifierKind::Errand => &mut self.errand_id,
            IdentifierKind::Parcel => &mut self.parcel_id,
        }
    }

    pub(crate) fn identifier_kinds_set(&self) -> Vec<IdentifierKind> {
        ALL_IDENTIFIER_KINDS
            .into_iter()
            .filter(|kind| self.identifier(*kind).is_some())
            .collect()
    }

    // Keeps the identifier that matches the service, else the first one set.
    pub(crate) fn retain_single_identifier(&mut self) -> bool {
        let set = self.identifier_kinds_set();
        if set.len() <= 1 {
            return false;
        }
        let keep = self
            .service
            .map(IdentifierKind::for_service)
            .filter(|kind| set.contains(kind))
            .unwrap_or(set[0]);
        for kind in set.into_iter().filter(|kind| *kind != keep) {
            *self.identifier_slot_mut(kind) = None;
        }
        true
    }

    pub(crate) fn clear_identifiers(&mut self) {
        for kind in ALL_IDENTIFIER_KINDS {
            *self.identifier_slot_mut(kind) = None;
        }
    }

    pub(crate) fn same_content(&self, other: &FlowState) -> bool {
        self.step == other.step
            && self.role == other.role
            && self.service == other.service
            && self.ride_id == other.ride_id
            && self.order_id == other.order_id
            && self.errand_id == other.errand_id
            && self.parcel_id == other.parcel_id
            && self.is_active == other.is_active
    }
}
