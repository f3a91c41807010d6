use crate::AggregateId;

/// Builder for constructing document queries.
///
/// A query always targets a single kind. Soft-deleted documents are
/// excluded by every store implementation; there is no switch to include them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    /// The aggregate type to read.
    pub kind: String,

    /// Filter by owning aggregate.
    pub parent_id: Option<AggregateId>,

    /// Filter by identifier (any of these).
    pub ids: Option<Vec<AggregateId>>,

    /// Maximum number of documents to return.
    pub limit: Option<usize>,

    /// Number of documents to skip.
    pub offset: Option<usize>,
}

impl DocumentQuery {
    /// Creates a query for every live document of a kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            parent_id: None,
            ids: None,
            limit: None,
            offset: None,
        }
    }

    /// Filters by owning aggregate.
    pub fn parent_id(mut self, parent_id: AggregateId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Filters by identifier.
    pub fn ids(mut self, ids: Vec<AggregateId>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Sets the maximum number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the number of results to skip.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}
