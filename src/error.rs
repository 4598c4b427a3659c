use thiserror::Error;

// ---------------------------------------------------------------------------
// Aggregation errors – recoverable at the rendering boundary
// ---------------------------------------------------------------------------

/// Failure while deriving a view for one selection.
///
/// None of these are fatal: the session turns them into placeholders and the
/// cached dataset stays untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    /// The selected entity does not exist in the dataset.
    #[error("unknown selection: '{entity}' is not in the dataset")]
    InvalidSelection { entity: String },

    /// The entity exists but has no observation at the requested period.
    #[error("no data for '{entity}' in {period}")]
    MissingData { entity: String, period: i32 },

    /// The loader produced zero records.
    #[error("dataset is empty")]
    EmptyDataset,
}

// ---------------------------------------------------------------------------
// Dataset construction errors
// ---------------------------------------------------------------------------

/// Source data breaks one of the dataset invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("duplicate observation for '{entity}' in {period}")]
    DuplicateObservation { entity: String, period: i32 },

    #[error("'{entity}' is assigned to both '{first}' and '{second}'")]
    GroupConflict {
        entity: String,
        first: String,
        second: String,
    },
}
