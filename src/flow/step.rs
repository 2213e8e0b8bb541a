use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Driver,
}

pub const ALL_ROLES: [Role; 2] = [Role::Customer, Role::Driver];

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Driver => "driver",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "driver" => Ok(Self::Driver),
            _ => Err("role must be one of: customer, driver".to_string()),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Transport,
    Delivery,
    Errand,
    Parcel,
}

pub const ALL_SERVICE_TYPES: [ServiceType; 4] = [
    ServiceType::Transport,
    ServiceType::Delivery,
    ServiceType::Errand,
    ServiceType::Parcel,
];

impl ServiceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Delivery => "delivery",
            Self::Errand => "errand",
            Self::Parcel => "parcel",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "transport" => Ok(Self::Transport),
            "delivery" => Ok(Self::Delivery),
            "errand" => Ok(Self::Errand),
            "parcel" => Ok(Self::Parcel),
            _ => Err("service must be one of: transport, delivery, errand, parcel".to_string()),
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

macro_rules! define_flow_steps {
    ($($variant:ident => $token:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum FlowStep {
            $($variant),+
        }

        pub const ALL_FLOW_STEPS: &[FlowStep] = &[$(FlowStep::$variant),+];

        impl FlowStep {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(FlowStep::$variant => $token),+
                }
            }

            pub fn parse(raw: &str) -> Result<Self, String> {
                match raw.trim() {
                    $($token => Ok(FlowStep::$variant),)+
                    other => Err(format!("unknown flow step `{other}`")),
                }
            }
        }
    };
}

define_flow_steps! {
    RoleSelection => "role_selection",
    ServiceSelection => "service_selection",
    DriverDashboard => "driver_dashboard",

    TransportRoute => "transport_route",
    TransportVehicle => "transport_vehicle",
    TransportConfirm => "transport_confirm",
    TransportSearchingDriver => "transport_searching_driver",
    TransportDriverEnRoute => "transport_driver_en_route",
    TransportDriverArrived => "transport_driver_arrived",
    TransportInProgress => "transport_in_progress",
    TransportCompleted => "transport_completed",

    DeliveryPickup => "delivery_pickup",
    DeliveryDropoff => "delivery_dropoff",
    DeliveryPackage => "delivery_package",
    DeliverySearchingCourier => "delivery_searching_courier",
    DeliveryCourierEnRoute => "delivery_courier_en_route",
    DeliveryCourierAtPickup => "delivery_courier_at_pickup",
    DeliveryInTransit => "delivery_in_transit",
    DeliveryCompleted => "delivery_completed",

    ErrandDescription => "errand_description",
    ErrandLocations => "errand_locations",
    ErrandBudget => "errand_budget",
    ErrandSearchingRunner => "errand_searching_runner",
    ErrandRunnerAssigned => "errand_runner_assigned",
    ErrandRunnerAtStore => "errand_runner_at_store",
    ErrandInProgress => "errand_in_progress",
    ErrandCompleted => "errand_completed",

    ParcelSender => "parcel_sender",
    ParcelRecipient => "parcel_recipient",
    ParcelDimensions => "parcel_dimensions",
    ParcelAwaitingCarrier => "parcel_awaiting_carrier",
    ParcelCarrierAssigned => "parcel_carrier_assigned",
    ParcelCarrierAtOrigin => "parcel_carrier_at_origin",
    ParcelInTransit => "parcel_in_transit",
    ParcelDelivered => "parcel_delivered",

    DriverTransportOffer => "driver_transport_offer",
    DriverTransportEnRoute => "driver_transport_en_route",
    DriverTransportAtPickup => "driver_transport_at_pickup",
    DriverTransportInProgress => "driver_transport_in_progress",
    DriverTransportCompleted => "driver_transport_completed",

    DriverDeliveryOffer => "driver_delivery_offer",
    DriverDeliveryEnRoute => "driver_delivery_en_route",
    DriverDeliveryAtPickup => "driver_delivery_at_pickup",
    DriverDeliveryInProgress => "driver_delivery_in_progress",
    DriverDeliveryCompleted => "driver_delivery_completed",

    DriverErrandOffer => "driver_errand_offer",
    DriverErrandEnRoute => "driver_errand_en_route",
    DriverErrandAtPickup => "driver_errand_at_pickup",
    DriverErrandInProgress => "driver_errand_in_progress",
    DriverErrandCompleted => "driver_errand_completed",

    DriverParcelOffer => "driver_parcel_offer",
    DriverParcelEnRoute => "driver_parcel_en_route",
    DriverParcelAtPickup => "driver_parcel_at_pickup",
    DriverParcelInProgress => "driver_parcel_in_progress",
    DriverParcelCompleted => "driver_parcel_completed",
}

impl std::fmt::Display for FlowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FlowStep {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FlowStep {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(|err| D::Error::custom(format!("invalid flow step: {err}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOwner {
    pub role: Option<Role>,
    pub service: Option<ServiceType>,
}

impl StepOwner {
    const fn shared(role: Option<Role>) -> Self {
        Self {
            role,
            service: None,
        }
    }

    const fn service(role: Role, service: ServiceType) -> Self {
        Self {
            role: Some(role),
            service: Some(service),
        }
    }
}

impl FlowStep {
    pub fn owner(self) -> StepOwner {
        use FlowStep::*;
        use ServiceType::*;
        match self {
            RoleSelection => StepOwner::shared(None),
            ServiceSelection => StepOwner::shared(Some(Role::Customer)),
            DriverDashboard => StepOwner::shared(Some(Role::Driver)),
            TransportRoute
            | TransportVehicle
            | TransportConfirm
            | TransportSearchingDriver
            | TransportDriverEnRoute
            | TransportDriverArrived
            | TransportInProgress
            | TransportCompleted => StepOwner::service(Role::Customer, Transport),
            DeliveryPickup
            | DeliveryDropoff
            | DeliveryPackage
            | DeliverySearchingCourier
            | DeliveryCourierEnRoute
            | DeliveryCourierAtPickup
            | DeliveryInTransit
            | DeliveryCompleted => StepOwner::service(Role::Customer, Delivery),
            ErrandDescription
            | ErrandLocations
            | ErrandBudget
            | ErrandSearchingRunner
            | ErrandRunnerAssigned
            | ErrandRunnerAtStore
            | ErrandInProgress
            | ErrandCompleted => StepOwner::service(Role::Customer, Errand),
            ParcelSender
            | ParcelRecipient
            | ParcelDimensions
            | ParcelAwaitingCarrier
            | ParcelCarrierAssigned
            | ParcelCarrierAtOrigin
            | ParcelInTransit
            | ParcelDelivered => StepOwner::service(Role::Customer, Parcel),
            DriverTransportOffer
            | DriverTransportEnRoute
            | DriverTransportAtPickup
            | DriverTransportInProgress
            | DriverTransportCompleted => StepOwner::service(Role::Driver, Transport),
            DriverDeliveryOffer
            | DriverDeliveryEnRoute
            | DriverDeliveryAtPickup
            | DriverDeliveryInProgress
            | DriverDeliveryCompleted => StepOwner::service(Role::Driver, Delivery),
            DriverErrandOffer
            | DriverErrandEnRoute
            | DriverErrandAtPickup
            | DriverErrandInProgress
            | DriverErrandCompleted => StepOwner::service(Role::Driver, Errand),
            DriverParcelOffer
            | DriverParcelEnRoute
            | DriverParcelAtPickup
            | DriverParcelInProgress
            | DriverParcelCompleted => StepOwner::service(Role::Driver, Parcel),
        }
    }

    pub fn is_pre_service(self) -> bool {
        self.owner().service.is_none()
    }

    pub fn belongs_to(self, role: Role) -> bool {
        match self.owner().role {
            Some(owner) => owner == role,
            None => true,
        }
    }
}

const CUSTOMER_TRANSPORT: [FlowStep; 8] = [
    FlowStep::TransportRoute,
    FlowStep::TransportVehicle,
    FlowStep::TransportConfirm,
    FlowStep::TransportSearchingDriver,
    FlowStep::TransportDriverEnRoute,
    FlowStep::TransportDriverArrived,
    FlowStep::TransportInProgress,
    FlowStep::TransportCompleted,
];

const CUSTOMER_DELIVERY: [FlowStep; 8] = [
    FlowStep::DeliveryPickup,
    FlowStep::DeliveryDropoff,
    FlowStep::DeliveryPackage,
    FlowStep::DeliverySearchingCourier,
    FlowStep::DeliveryCourierEnRoute,
    FlowStep::DeliveryCourierAtPickup,
    FlowStep::DeliveryInTransit,
    FlowStep::DeliveryCompleted,
];

const CUSTOMER_ERRAND: [FlowStep; 8] = [
    FlowStep::ErrandDescription,
    FlowStep::ErrandLocations,
    FlowStep::ErrandBudget,
    FlowStep::ErrandSearchingRunner,
    FlowStep::ErrandRunnerAssigned,
    FlowStep::ErrandRunnerAtStore,
    FlowStep::ErrandInProgress,
    FlowStep::ErrandCompleted,
];

const CUSTOMER_PARCEL: [FlowStep; 8] = [
    FlowStep::ParcelSender,
    FlowStep::ParcelRecipient,
    FlowStep::ParcelDimensions,
    FlowStep::ParcelAwaitingCarrier,
    FlowStep::ParcelCarrierAssigned,
    FlowStep::ParcelCarrierAtOrigin,
    FlowStep::ParcelInTransit,
    FlowStep::ParcelDelivered,
];

const DRIVER_TRANSPORT: [FlowStep; 5] = [
    FlowStep::DriverTransportOffer,
    FlowStep::DriverTransportEnRoute,
    FlowStep::DriverTransportAtPickup,
    FlowStep::DriverTransportInProgress,
    FlowStep::DriverTransportCompleted,
];

const DRIVER_DELIVERY: [FlowStep; 5] = [
    FlowStep::DriverDeliveryOffer,
    FlowStep::DriverDeliveryEnRoute,
    FlowStep::DriverDeliveryAtPickup,
    FlowStep::DriverDeliveryInProgress,
    FlowStep::DriverDeliveryCompleted,
];

const DRIVER_ERRAND: [FlowStep; 5] = [
    FlowStep::DriverErrandOffer,
    FlowStep::DriverErrandEnRoute,
    FlowStep::DriverErrandAtPickup,
    FlowStep::DriverErrandInProgress,
    FlowStep::DriverErrandCompleted,
];

const DRIVER_PARCEL: [FlowStep; 5] = [
    FlowStep::DriverParcelOffer,
    FlowStep::DriverParcelEnRoute,
    FlowStep::DriverParcelAtPickup,
    FlowStep::DriverParcelInProgress,
    FlowStep::DriverParcelCompleted,
];

pub fn service_sequence(role: Role, service: ServiceType) -> &'static [FlowStep] {
    match (role, service) {
        (Role::Customer, ServiceType::Transport) => &CUSTOMER_TRANSPORT,
        (Role::Customer, ServiceType::Delivery) => &CUSTOMER_DELIVERY,
        (Role::Customer, ServiceType::Errand) => &CUSTOMER_ERRAND,
        (Role::Customer, ServiceType::Parcel) => &CUSTOMER_PARCEL,
        (Role::Driver, ServiceType::Transport) => &DRIVER_TRANSPORT,
        (Role::Driver, ServiceType::Delivery) => &DRIVER_DELIVERY,
        (Role::Driver, ServiceType::Errand) => &DRIVER_ERRAND,
        (Role::Driver, ServiceType::Parcel) => &DRIVER_PARCEL,
    }
}

pub fn pre_service_step(role: Role) -> FlowStep {
    match role {
        Role::Customer => FlowStep::ServiceSelection,
        Role::Driver => FlowStep::DriverDashboard,
    }
}

pub fn entry_step(role: Role, service: ServiceType) -> FlowStep {
    service_sequence(role, service)[0]
}

pub fn final_step(role: Role, service: ServiceType) -> FlowStep {
    let sequence = service_sequence(role, service);
    sequence[sequence.len() - 1]
}

pub fn step_position(role: Role, service: ServiceType, step: FlowStep) -> Option<usize> {
    service_sequence(role, service)
        .iter()
        .position(|candidate| *candidate == step)
}

pub fn next_step(role: Role, service: ServiceType, current: FlowStep) -> Option<FlowStep> {
    let index = step_position(role, service, current)?;
    service_sequence(role, service).get(index + 1).copied()
}

pub fn previous_step(role: Role, service: ServiceType, current: FlowStep) -> Option<FlowStep> {
    let index = step_position(role, service, current)?;
    index
        .checked_sub(1)
        .map(|prev| service_sequence(role, service)[prev])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_service_step_sits_in_exactly_one_matching_sequence() {
        for step in ALL_FLOW_STEPS {
            let owner = step.owner();
            let hits: Vec<(Role, ServiceType)> = ALL_ROLES
                .into_iter()
                .flat_map(|role| ALL_SERVICE_TYPES.into_iter().map(move |svc| (role, svc)))
                .filter(|(role, svc)| service_sequence(*role, *svc).contains(step))
                .collect();
            match (owner.role, owner.service) {
                (Some(role), Some(service)) => assert_eq!(hits, vec![(role, service)], "{step}"),
                _ => assert!(hits.is_empty(), "shared step {step} is sequenced"),
            }
        }
    }

    #[test]
    fn tokens_are_unique_and_parse_back() {
        let mut seen = std::collections::HashSet::new();
        for step in ALL_FLOW_STEPS {
            assert!(seen.insert(step.as_str()), "duplicate token {}", step.as_str());
            assert_eq!(FlowStep::parse(step.as_str()), Ok(*step));
        }
        assert!(FlowStep::parse("").is_err());
    }

    #[test]
    fn sequence_neighbours_stop_at_the_edges() {
        let role = Role::Driver;
        let service = ServiceType::Errand;
        assert_eq!(
            next_step(role, service, FlowStep::DriverErrandOffer),
            Some(FlowStep::DriverErrandEnRoute)
        );
        assert_eq!(previous_step(role, service, FlowStep::DriverErrandOffer), None);
        assert_eq!(next_step(role, service, FlowStep::DriverErrandCompleted), None);
        assert_eq!(next_step(role, service, FlowStep::TransportRoute), None);
    }
}
