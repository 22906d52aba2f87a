//! Tour extraction for household travel surveys.
//!
//! Linked trips are grouped per person-day into home-based tours, work and
//! school subtours are split out of them, and every tour is summarized into
//! one record. See [`TourExtractor`] for the entry points.

pub mod aggregation;
pub mod anchor;
pub mod boundary;
pub mod codebook;
pub mod config;
pub mod error;
pub mod extraction;
pub mod frames;
pub mod ids;
pub mod joint;
pub mod location;
pub mod model;
pub mod person_type;
pub mod schema;
pub mod subtour;
pub mod validation;

#[cfg(feature = "python")]
mod python;

pub use config::TourConfig;
pub use error::TourError;
pub use extraction::{ExtractionStats, TourExtraction, TourExtractor};
pub use model::{Household, LatLon, Person, Tour, Trip, TripAnnotation};

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyTourExtractor>()?;
    m.add_function(wrap_pyfunction!(python::extract_tours, m)?)?;
    python::add_schema_exports(m)?;
    Ok(())
}
