use pyo3::prelude::*;
use pyo3::types::{PyDict, PyModule};
use pyo3_polars::PyDataFrame;

use crate::config::TourConfig;
use crate::error::TourError;
use crate::extraction::{ExtractionStats, TourExtractor};
use crate::frames;
use crate::schema;

fn load_config(config_json: Option<&str>) -> PyResult<TourConfig> {
    let config = match config_json {
        Some(json) => TourConfig::from_json(json)?,
        None => TourConfig::default(),
    };
    Ok(config)
}

fn stats_dict<'py>(py: Python<'py>, stats: &ExtractionStats) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("persons", stats.persons)?;
    dict.set_item("person_days", stats.person_days)?;
    dict.set_item("trips", stats.trips)?;
    dict.set_item("tours", stats.tours)?;
    dict.set_item("subtours", stats.subtours)?;
    Ok(dict)
}

#[pyclass(name = "TourExtractor")]
pub struct PyTourExtractor {
    inner: TourExtractor,
}

#[pymethods]
impl PyTourExtractor {
    /// Config is a JSON document; keys left out keep their defaults.
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let inner = TourExtractor::new(load_config(config_json)?)?;
        Ok(Self { inner })
    }

    /// Effective configuration as JSON.
    fn config_json(&self) -> PyResult<String> {
        let json = serde_json::to_string(self.inner.config()).map_err(TourError::from)?;
        Ok(json)
    }

    /// Returns `{"trips": ..., "tours": ..., "stats": {...}}`. The trips frame
    /// is the input with tour annotation columns appended.
    fn extract<'py>(
        &self,
        py: Python<'py>,
        trips: PyDataFrame,
        persons: PyDataFrame,
        households: PyDataFrame,
    ) -> PyResult<Bound<'py, PyDict>> {
        let trip_records = frames::read_trips(&trips.0)?;
        let person_records = frames::read_persons(&persons.0)?;
        let household_records = frames::read_households(&households.0)?;

        let extraction = self
            .inner
            .extract(&trip_records, &person_records, &household_records)?;
        let annotated = frames::annotate_trips(&trips.0, &extraction.annotations)?;
        let tours = frames::tours_to_frame(&extraction.tours)?;

        let out = PyDict::new(py);
        out.set_item("trips", PyDataFrame(annotated))?;
        out.set_item("tours", PyDataFrame(tours))?;
        out.set_item("stats", stats_dict(py, &extraction.stats)?)?;
        Ok(out)
    }
}

/// One-shot extraction with an optional JSON config.
#[pyfunction]
#[pyo3(signature = (trips, persons, households, config_json=None))]
pub fn extract_tours<'py>(
    py: Python<'py>,
    trips: PyDataFrame,
    persons: PyDataFrame,
    households: PyDataFrame,
    config_json: Option<&str>,
) -> PyResult<Bound<'py, PyDict>> {
    let extractor = PyTourExtractor::new(config_json)?;
    extractor.extract(py, trips, persons, households)
}

fn add_constants(m: &Bound<'_, PyModule>, name: &str, consts: &[(&str, &str)]) -> PyResult<()> {
    let sub = PyModule::new(m.py(), name)?;
    for (key, value) in consts {
        sub.add(*key, *value)?;
    }
    m.add_submodule(&sub)
}

/// Export column names as Python submodules
pub fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use schema::{annotation, household, person, tour, trip};

    add_constants(
        m,
        "trip",
        &[
            ("TRIP_ID", trip::TRIP_ID),
            ("HH_ID", trip::HH_ID),
            ("PERSON_ID", trip::PERSON_ID),
            ("DAY_ID", trip::DAY_ID),
            ("DEPART_TIME", trip::DEPART_TIME),
            ("ARRIVE_TIME", trip::ARRIVE_TIME),
            ("O_LAT", trip::O_LAT),
            ("O_LON", trip::O_LON),
            ("D_LAT", trip::D_LAT),
            ("D_LON", trip::D_LON),
            ("O_PURPOSE_CATEGORY", trip::O_PURPOSE_CATEGORY),
            ("D_PURPOSE_CATEGORY", trip::D_PURPOSE_CATEGORY),
            ("MODE_TYPE", trip::MODE_TYPE),
            ("JOINT_TRIP_ID", trip::JOINT_TRIP_ID),
            ("O_TAZ", trip::O_TAZ),
            ("D_TAZ", trip::D_TAZ),
        ],
    )?;

    add_constants(
        m,
        "annotation",
        &[
            ("TOUR_ID", annotation::TOUR_ID),
            ("TOUR_NUM", annotation::TOUR_NUM),
            ("SUBTOUR_NUM", annotation::SUBTOUR_NUM),
            ("PARENT_TOUR_ID", annotation::PARENT_TOUR_ID),
            ("TOUR_DIRECTION", annotation::TOUR_DIRECTION),
            ("O_LOCATION_TYPE", annotation::O_LOCATION_TYPE),
            ("D_LOCATION_TYPE", annotation::D_LOCATION_TYPE),
            ("JOINT_TOUR_ID", annotation::JOINT_TOUR_ID),
        ],
    )?;

    add_constants(
        m,
        "person",
        &[
            ("PERSON_ID", person::PERSON_ID),
            ("HH_ID", person::HH_ID),
            ("PERSON_TYPE", person::PERSON_TYPE),
            ("AGE", person::AGE),
            ("EMPLOYMENT", person::EMPLOYMENT),
            ("STUDENT", person::STUDENT),
            ("SCHOOL_TYPE", person::SCHOOL_TYPE),
            ("WORK_LAT", person::WORK_LAT),
            ("WORK_LON", person::WORK_LON),
            ("SCHOOL_LAT", person::SCHOOL_LAT),
            ("SCHOOL_LON", person::SCHOOL_LON),
        ],
    )?;

    add_constants(
        m,
        "household",
        &[
            ("HH_ID", household::HH_ID),
            ("HOME_LAT", household::HOME_LAT),
            ("HOME_LON", household::HOME_LON),
        ],
    )?;

    // tours: the handful most callers join or filter on
    add_constants(
        m,
        "tour",
        &[
            ("TOUR_ID", tour::TOUR_ID),
            ("PARENT_TOUR_ID", tour::PARENT_TOUR_ID),
            ("TOUR_TYPE", tour::TOUR_TYPE),
            ("TOUR_PURPOSE", tour::TOUR_PURPOSE),
            ("TOUR_MODE", tour::TOUR_MODE),
            ("TOUR_CATEGORY", tour::TOUR_CATEGORY),
            ("TOUR_DATA_QUALITY", tour::TOUR_DATA_QUALITY),
            ("JOINT_TOUR_ID", tour::JOINT_TOUR_ID),
        ],
    )?;

    Ok(())
}
