use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery state of a single participant.
///
/// Starts at `Pending`; flips to `Error` at parse time for invalid numbers,
/// and to `Success`/`Error` when a provider call resolves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Success,
    Error,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Success => "success",
            DeliveryStatus::Error => "error",
        }
    }
}

/// One imported person: display name plus normalized phone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub name: String,
    /// Digits only, country-prefixed when the source was a bare mobile number.
    pub phone: String,
    /// Name of the activity batch; blank until the roster stamps it.
    pub activity: String,
    pub status: DeliveryStatus,
}

impl Participant {
    pub fn is_deliverable(&self) -> bool {
        crate::phone::is_valid(&self.phone)
    }
}

/// A named batch of participants, the unit of group creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    pub participants: Vec<Participant>,
    pub imported_at: DateTime<Utc>,
}
