use thiserror::Error;

use crate::codebook::{PersonCategory, PersonType, PurposeCategory};

#[derive(Error, Debug)]
pub enum TourError {
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Column '{column}' has unsupported dtype {dtype}")]
    ColumnType { column: String, dtype: String },

    #[error("Null value in column '{column}' at row {row}")]
    NullValue { column: String, row: usize },

    #[error("Unknown code {value} in column '{column}'")]
    UnknownCode { column: String, value: i64 },

    #[error("Invalid trip {trip_id}: {reason}")]
    InvalidTrip { trip_id: i64, reason: String },

    #[error("PurposeCategory {purpose} not mapped for PersonCategory '{category}'")]
    UnmappedPurpose {
        category: PersonCategory,
        purpose: PurposeCategory,
    },

    #[error("PersonType {0} not in person_type_mapping")]
    UnmappedPersonType(PersonType),

    #[error("Person {person_id} referenced by trip {trip_id} is not in the person table")]
    MissingPerson { person_id: i64, trip_id: i64 },

    #[error("Id overflow: {0}")]
    IdOverflow(String),

    #[error("Config: {0}")]
    Config(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "python")]
impl From<TourError> for pyo3::PyErr {
    fn from(err: TourError) -> pyo3::PyErr {
        match err {
            TourError::Config(_)
            | TourError::Json(_)
            | TourError::MissingColumn(_)
            | TourError::ColumnType { .. }
            | TourError::NullValue { .. }
            | TourError::UnknownCode { .. }
            | TourError::InvalidTrip { .. } => {
                pyo3::exceptions::PyValueError::new_err(err.to_string())
            }
            _ => pyo3::exceptions::PyRuntimeError::new_err(err.to_string()),
        }
    }
}
