//! Random event synthesis for the live feed

use super::events::{EventDraft, EventKind};
use super::notifications::{NotificationDraft, Severity};
use crate::random::RandomSource;

const SALE_MESSAGES: [&str; 5] = [
    "New sale completed",
    "Large order received",
    "Premium subscription purchased",
    "Bulk order placed",
    "VIP customer purchase",
];

const ORDER_MESSAGES: [&str; 5] = [
    "Order shipped to customer",
    "Express delivery dispatched",
    "Order fulfilled successfully",
    "Return processed",
    "Order confirmed",
];

const USER_MESSAGES: [&str; 5] = [
    "New user registered",
    "User upgraded to premium",
    "Customer profile updated",
    "New team member joined",
    "Account verified",
];

const ALERT_MESSAGES: [&str; 5] = [
    "Low stock warning",
    "High traffic detected",
    "New 5-star review received",
    "Payment processed",
    "Goal milestone reached",
];

/// Kinds a tick can synthesise; milestones are only published explicitly
const TICK_KINDS: [EventKind; 4] = [EventKind::Sale, EventKind::Order, EventKind::User, EventKind::Alert];

pub fn random_event(rng: &mut dyn RandomSource) -> EventDraft {
    let kind = TICK_KINDS[rng.index(TICK_KINDS.len())];

    let (title, messages): (&str, &[&str]) = match kind {
        EventKind::Sale => ("New Sale", &SALE_MESSAGES[..]),
        EventKind::Order => ("Order Update", &ORDER_MESSAGES[..]),
        EventKind::User => ("User Activity", &USER_MESSAGES[..]),
        EventKind::Alert | EventKind::Milestone => ("System Alert", &ALERT_MESSAGES[..]),
    };
    let description = messages[rng.index(messages.len())];
    let value = match kind {
        EventKind::Sale => Some(rng.int_inclusive(50, 500) as f64),
        _ => None,
    };

    EventDraft {
        kind,
        title: title.to_string(),
        description: description.to_string(),
        value,
    }
}

pub fn severity_for(kind: EventKind) -> Severity {
    match kind {
        EventKind::Sale | EventKind::Milestone => Severity::Success,
        EventKind::Alert => Severity::Warning,
        EventKind::Order | EventKind::User => Severity::Info,
    }
}

/// Notification sharing the event's title and description
pub fn notification_for(event: &EventDraft) -> NotificationDraft {
    let message = match event.value {
        Some(value) => format!("{} - ${}", event.description, value),
        None => event.description.clone(),
    };

    NotificationDraft {
        severity: severity_for(event.kind),
        title: event.title.clone(),
        message,
    }
}
