use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AggregateId;

/// A stored aggregate record.
///
/// `data` holds the aggregate's primitive form; the remaining columns are
/// duplicated out of it so the store can filter without parsing JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Aggregate identifier, unique across all kinds.
    pub id: AggregateId,

    /// The aggregate type (e.g., "Plot", "Crop").
    pub kind: String,

    /// Owning aggregate, for kinds that are listed by parent.
    pub parent_id: Option<AggregateId>,

    /// The aggregate's primitive record.
    pub data: serde_json::Value,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Set when the document has been soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Returns true if the document has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
