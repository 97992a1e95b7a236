use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gender classification, lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Boy,
    Girl,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Boy => "Boy",
            Gender::Girl => "Girl",
        }
    }
}

/// A stored name as returned by the store. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameRecord {
    pub id: String,
    pub name: String,
    pub meaning: String,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; the store fills in `id` and `created_at`.
#[derive(Debug, Clone, Serialize)]
pub struct NewName {
    pub name: String,
    pub meaning: String,
    pub gender: Gender,
}
