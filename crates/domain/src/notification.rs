use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: ID,
    pub kind: NotificationKind,
    /// Id of the record the notification is about, e.g. a booking
    pub related_id: ID,
    pub read: bool,
    pub created: i64,
}

impl Notification {
    pub fn booking_request(booking_id: ID, created: i64) -> Self {
        Self {
            id: Default::default(),
            kind: NotificationKind::BookingRequest,
            related_id: booking_id,
            read: false,
            created,
        }
    }
}

impl Entity for Notification {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BookingRequest,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BookingRequest => "booking_request",
        }
    }
}
