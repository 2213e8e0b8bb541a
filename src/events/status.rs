use crate::events::bus::RideEventName;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Pending,
    Accepted,
    Arrived,
    Started,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (RideStatus::Pending, RideStatus::Accepted)
                | (RideStatus::Pending, RideStatus::Cancelled)
                | (RideStatus::Accepted, RideStatus::Pending)
                | (RideStatus::Accepted, RideStatus::Arrived)
                | (RideStatus::Accepted, RideStatus::Cancelled)
                | (RideStatus::Arrived, RideStatus::Started)
                | (RideStatus::Arrived, RideStatus::Cancelled)
                | (RideStatus::Started, RideStatus::Completed)
                | (RideStatus::Started, RideStatus::Cancelled)
        )
    }

    pub fn forward_target(self) -> Option<Self> {
        match self {
            RideStatus::Pending => Some(RideStatus::Accepted),
            RideStatus::Accepted => Some(RideStatus::Arrived),
            RideStatus::Arrived => Some(RideStatus::Started),
            RideStatus::Started => Some(RideStatus::Completed),
            RideStatus::Completed | RideStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RideStatus::Pending => "pending",
            RideStatus::Accepted => "accepted",
            RideStatus::Arrived => "arrived",
            RideStatus::Started => "started",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(RideStatus::Pending),
            "accepted" => Some(RideStatus::Accepted),
            "arrived" => Some(RideStatus::Arrived),
            "started" => Some(RideStatus::Started),
            "completed" => Some(RideStatus::Completed),
            "cancelled" | "canceled" => Some(RideStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for RideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn validate_state_transition(from: RideStatus, to: RideStatus) -> bool {
    from.can_transition_to(to)
}

pub fn validate_state_transition_tokens(from: &str, to: &str) -> bool {
    match (RideStatus::parse(from), RideStatus::parse(to)) {
        (Some(from), Some(to)) => from.can_transition_to(to),
        _ => false,
    }
}

impl RideEventName {
    pub fn target_status(self) -> RideStatus {
        match self {
            RideEventName::Accepted => RideStatus::Accepted,
            RideEventName::Rejected => RideStatus::Pending,
            RideEventName::Arrived => RideStatus::Arrived,
            RideEventName::Started => RideStatus::Started,
            RideEventName::Completed => RideStatus::Completed,
            RideEventName::Cancelled => RideStatus::Cancelled,
        }
    }
}

// `rejected` lands on pending, including from pending itself.
pub fn status_accepts_event(current: RideStatus, event: RideEventName) -> bool {
    match event {
        RideEventName::Rejected => matches!(current, RideStatus::Pending | RideStatus::Accepted),
        other => current.can_transition_to(other.target_status()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_have_no_exits() {
        let all = [
            RideStatus::Pending,
            RideStatus::Accepted,
            RideStatus::Arrived,
            RideStatus::Started,
            RideStatus::Completed,
            RideStatus::Cancelled,
        ];
        for from in all.into_iter().filter(|status| status.is_terminal()) {
            for to in all {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn rejection_is_accepted_only_before_arrival() {
        assert!(status_accepts_event(RideStatus::Pending, RideEventName::Rejected));
        assert!(status_accepts_event(RideStatus::Accepted, RideEventName::Rejected));
        assert!(!status_accepts_event(RideStatus::Arrived, RideEventName::Rejected));
        assert!(!status_accepts_event(RideStatus::Pending, RideEventName::Completed));
    }

    #[test]
    fn forward_targets_follow_the_legal_table() {
        let mut status = RideStatus::Pending;
        while let Some(next) = status.forward_target() {
            assert!(status.can_transition_to(next), "{status} -> {next}");
            status = next;
        }
        assert_eq!(status, RideStatus::Completed);
    }
}
