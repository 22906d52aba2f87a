//! Conversion between survey DataFrames and the typed model.

use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;

use crate::codebook::{
    AgeCategory, Employment, ModeType, PersonType, PurposeCategory, SchoolType, StudentStatus,
};
use crate::error::TourError;
use crate::model::{Household, LatLon, Person, PrimaryDestination, Tour, Trip, TripAnnotation};
use crate::person_type::{derive_person_type, Demographics};
use crate::schema::{annotation, household, person, tour, trip};

pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), TourError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(TourError::MissingColumn(col_name.to_string()));
        }
    }
    Ok(())
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

// ── Column readers ──────────────────────────────────────────────────────────

fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>, TourError> {
    let column = df.column(name)?;
    if !column.dtype().is_integer() {
        return Err(TourError::ColumnType {
            column: name.to_string(),
            dtype: column.dtype().to_string(),
        });
    }
    let column = column.cast(&DataType::Int64)?;
    Ok(column.i64()?.into_iter().collect())
}

fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, TourError> {
    let column = df.column(name)?;
    if !(column.dtype().is_integer() || column.dtype().is_float()) {
        return Err(TourError::ColumnType {
            column: name.to_string(),
            dtype: column.dtype().to_string(),
        });
    }
    let column = column.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

fn optional_i64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>, TourError> {
    if has_column(df, name) {
        i64_values(df, name)
    } else {
        Ok(vec![None; df.height()])
    }
}

fn from_micros(us: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_micros(us).map(|dt| dt.naive_utc())
}

fn from_minutes(minutes: i64) -> Option<NaiveDateTime> {
    let secs = minutes.checked_mul(60)?;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

/// Datetime columns of any unit, or integer minutes since an arbitrary epoch.
fn time_values(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDateTime>>, TourError> {
    let column = df.column(name)?;
    match column.dtype() {
        DataType::Datetime(_, tz) => {
            let micros = column
                .cast(&DataType::Datetime(TimeUnit::Microseconds, tz.clone()))?
                .cast(&DataType::Int64)?;
            Ok(micros
                .i64()?
                .into_iter()
                .map(|v| v.and_then(from_micros))
                .collect())
        }
        dtype if dtype.is_integer() => Ok(i64_values(df, name)?
            .into_iter()
            .map(|v| v.and_then(from_minutes))
            .collect()),
        dtype => Err(TourError::ColumnType {
            column: name.to_string(),
            dtype: dtype.to_string(),
        }),
    }
}

fn required<T>(value: Option<T>, column: &str, row: usize) -> Result<T, TourError> {
    value.ok_or_else(|| TourError::NullValue {
        column: column.to_string(),
        row,
    })
}

fn decode<T>(value: i64, column: &str, from_code: fn(i64) -> Option<T>) -> Result<T, TourError> {
    from_code(value).ok_or_else(|| TourError::UnknownCode {
        column: column.to_string(),
        value,
    })
}

fn optional_codes<T>(
    df: &DataFrame,
    name: &str,
    from_code: fn(i64) -> Option<T>,
) -> Result<Vec<Option<T>>, TourError> {
    if !has_column(df, name) {
        return Ok((0..df.height()).map(|_| None).collect());
    }
    i64_values(df, name)?
        .into_iter()
        .map(|v| v.map(|code| decode(code, name, from_code)).transpose())
        .collect()
}

fn required_codes<T>(
    df: &DataFrame,
    name: &str,
    from_code: fn(i64) -> Option<T>,
) -> Result<Vec<T>, TourError> {
    i64_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| decode(required(v, name, row)?, name, from_code))
        .collect()
}

fn required_ids(df: &DataFrame, name: &str) -> Result<Vec<i64>, TourError> {
    i64_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| required(v, name, row))
        .collect()
}

fn coordinates(df: &DataFrame, lat: &str, lon: &str) -> Result<Vec<Option<LatLon>>, TourError> {
    let lats = f64_values(df, lat)?;
    let lons = f64_values(df, lon)?;
    Ok(lats
        .into_iter()
        .zip(lons)
        .map(|(lat, lon)| LatLon::from_parts(lat, lon))
        .collect())
}

// ── Input tables ────────────────────────────────────────────────────────────

/// Read linked trips. Rows keep their input position in `Trip::row`.
pub fn read_trips(df: &DataFrame) -> Result<Vec<Trip>, TourError> {
    require_columns(df, &trip::REQUIRED)?;

    let trip_ids = required_ids(df, trip::TRIP_ID)?;
    let hh_ids = required_ids(df, trip::HH_ID)?;
    let person_ids = required_ids(df, trip::PERSON_ID)?;
    let day_ids = required_ids(df, trip::DAY_ID)?;
    let departs = time_values(df, trip::DEPART_TIME)?;
    let arrives = time_values(df, trip::ARRIVE_TIME)?;
    let origins = coordinates(df, trip::O_LAT, trip::O_LON)?;
    let dests = coordinates(df, trip::D_LAT, trip::D_LON)?;
    let o_purposes = required_codes(df, trip::O_PURPOSE_CATEGORY, PurposeCategory::from_code)?;
    let d_purposes = required_codes(df, trip::D_PURPOSE_CATEGORY, PurposeCategory::from_code)?;
    let modes = required_codes(df, trip::MODE_TYPE, ModeType::from_code)?;
    let joint_trip_ids = optional_i64_values(df, trip::JOINT_TRIP_ID)?;
    let o_zones = optional_i64_values(df, trip::O_TAZ)?;
    let d_zones = optional_i64_values(df, trip::D_TAZ)?;

    let mut trips = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let trip_id = trip_ids[row];
        let depart_time = required(departs[row], trip::DEPART_TIME, row)?;
        let arrive_time = required(arrives[row], trip::ARRIVE_TIME, row)?;
        if arrive_time < depart_time {
            return Err(TourError::InvalidTrip {
                trip_id,
                reason: format!("arrives at {arrive_time} before departing at {depart_time}"),
            });
        }
        trips.push(Trip {
            row,
            trip_id,
            hh_id: hh_ids[row],
            person_id: person_ids[row],
            day_id: day_ids[row],
            o: origins[row],
            d: dests[row],
            o_zone: o_zones[row],
            d_zone: d_zones[row],
            o_purpose: o_purposes[row],
            d_purpose: d_purposes[row],
            mode: modes[row],
            depart_time,
            arrive_time,
            joint_trip_id: joint_trip_ids[row],
        });
    }

    Ok(trips)
}

/// Read persons. A `person_type` column wins; rows without one are typed
/// from their demographics.
pub fn read_persons(df: &DataFrame) -> Result<Vec<Person>, TourError> {
    require_columns(
        df,
        &[
            person::PERSON_ID,
            person::HH_ID,
            person::WORK_LAT,
            person::WORK_LON,
            person::SCHOOL_LAT,
            person::SCHOOL_LON,
        ],
    )?;
    if !has_column(df, person::PERSON_TYPE) {
        require_columns(
            df,
            &[person::AGE, person::EMPLOYMENT, person::STUDENT, person::SCHOOL_TYPE],
        )?;
    }

    let person_ids = required_ids(df, person::PERSON_ID)?;
    let hh_ids = required_ids(df, person::HH_ID)?;
    let person_types = optional_codes(df, person::PERSON_TYPE, PersonType::from_code)?;
    let ages = optional_codes(df, person::AGE, AgeCategory::from_code)?;
    let employment = optional_codes(df, person::EMPLOYMENT, Employment::from_code)?;
    let student = optional_codes(df, person::STUDENT, StudentStatus::from_code)?;
    let school_type = optional_codes(df, person::SCHOOL_TYPE, SchoolType::from_code)?;
    let work = coordinates(df, person::WORK_LAT, person::WORK_LON)?;
    let school = coordinates(df, person::SCHOOL_LAT, person::SCHOOL_LON)?;

    let mut persons = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let person_type = person_types[row].unwrap_or_else(|| {
            derive_person_type(&Demographics {
                age: ages[row],
                employment: employment[row],
                student: student[row],
                school_type: school_type[row],
            })
        });
        persons.push(Person {
            person_id: person_ids[row],
            hh_id: hh_ids[row],
            person_type,
            work: work[row],
            school: school[row],
        });
    }

    Ok(persons)
}

pub fn read_households(df: &DataFrame) -> Result<Vec<Household>, TourError> {
    require_columns(df, &[household::HH_ID, household::HOME_LAT, household::HOME_LON])?;

    let hh_ids = required_ids(df, household::HH_ID)?;
    let homes = coordinates(df, household::HOME_LAT, household::HOME_LON)?;
    Ok(hh_ids
        .into_iter()
        .zip(homes)
        .map(|(hh_id, home)| Household { hh_id, home })
        .collect())
}

// ── Output tables ───────────────────────────────────────────────────────────

fn micros(t: NaiveDateTime) -> i64 {
    t.and_utc().timestamp_micros()
}

fn datetime_column(name: &str, values: &[Option<i64>]) -> Result<Column, TourError> {
    Ok(Column::new(name.into(), values)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?)
}

/// Append the per-trip annotation columns. `annotations[i]` belongs to row
/// `i`; annotation columns already present are replaced.
pub fn annotate_trips(
    df: &DataFrame,
    annotations: &[TripAnnotation],
) -> Result<DataFrame, TourError> {
    if annotations.len() != df.height() {
        return Err(TourError::Invariant(format!(
            "{} annotations for {} trips",
            annotations.len(),
            df.height()
        )));
    }

    let mut out = df.clone();
    for name in annotation::ALL {
        if has_column(&out, name) {
            out = out.drop(name)?;
        }
    }

    let tour_ids: Vec<i64> = annotations.iter().map(|a| a.tour_id).collect();
    let tour_nums: Vec<i32> = annotations.iter().map(|a| a.tour_num as i32).collect();
    let subtour_nums: Vec<i32> = annotations.iter().map(|a| a.subtour_num as i32).collect();
    let parents: Vec<i64> = annotations.iter().map(|a| a.parent_tour_id).collect();
    let directions: Vec<i32> = annotations.iter().map(|a| a.direction.code()).collect();
    let o_types: Vec<i32> = annotations.iter().map(|a| a.o_location_type.code()).collect();
    let d_types: Vec<i32> = annotations.iter().map(|a| a.d_location_type.code()).collect();
    let joint: Vec<Option<i64>> = annotations.iter().map(|a| a.joint_tour_id).collect();

    let columns = [
        Column::new(annotation::TOUR_ID.into(), &tour_ids),
        Column::new(annotation::TOUR_NUM.into(), &tour_nums),
        Column::new(annotation::SUBTOUR_NUM.into(), &subtour_nums),
        Column::new(annotation::PARENT_TOUR_ID.into(), &parents),
        Column::new(annotation::TOUR_DIRECTION.into(), &directions),
        Column::new(annotation::O_LOCATION_TYPE.into(), &o_types),
        Column::new(annotation::D_LOCATION_TYPE.into(), &d_types),
        Column::new(annotation::JOINT_TOUR_ID.into(), &joint),
    ];

    Ok(out.hstack(&columns)?)
}

/// One row per tour.
pub fn tours_to_frame(tours: &[Tour]) -> Result<DataFrame, TourError> {
    fn ints<F: Fn(&Tour) -> i64>(tours: &[Tour], f: F) -> Vec<i64> {
        tours.iter().map(f).collect()
    }
    fn codes<F: Fn(&Tour) -> i32>(tours: &[Tour], f: F) -> Vec<i32> {
        tours.iter().map(f).collect()
    }
    fn opt_codes<F: Fn(&Tour) -> Option<i32>>(tours: &[Tour], f: F) -> Vec<Option<i32>> {
        tours.iter().map(f).collect()
    }
    fn opt_floats<F: Fn(&Tour) -> Option<f64>>(tours: &[Tour], f: F) -> Vec<Option<f64>> {
        tours.iter().map(f).collect()
    }
    fn opt_ints<F: Fn(&Tour) -> Option<i64>>(tours: &[Tour], f: F) -> Vec<Option<i64>> {
        tours.iter().map(f).collect()
    }
    fn counts<F: Fn(&Tour) -> u32>(tours: &[Tour], f: F) -> Vec<i32> {
        tours.iter().map(|t| f(t) as i32).collect()
    }

    fn primary(t: &Tour) -> Option<&PrimaryDestination> {
        t.primary_dest.as_ref()
    }

    let columns = vec![
        Column::new(tour::TOUR_ID.into(), &ints(tours, |t| t.tour_id)),
        Column::new(tour::HH_ID.into(), &ints(tours, |t| t.hh_id)),
        Column::new(tour::PERSON_ID.into(), &ints(tours, |t| t.person_id)),
        Column::new(tour::DAY_ID.into(), &ints(tours, |t| t.day_id)),
        Column::new(tour::TOUR_NUM.into(), &counts(tours, |t| t.tour_num)),
        Column::new(tour::SUBTOUR_NUM.into(), &counts(tours, |t| t.subtour_num)),
        Column::new(
            tour::PARENT_TOUR_ID.into(),
            &opt_ints(tours, |t| t.parent_tour_id()),
        ),
        Column::new(
            tour::TOUR_TYPE.into(),
            &codes(tours, |t| t.kind.tour_type().code()),
        ),
        Column::new(
            tour::ANCHOR_TYPE.into(),
            &opt_codes(tours, |t| t.kind.anchor().map(|a| a.code())),
        ),
        Column::new(
            tour::TOUR_PURPOSE.into(),
            &opt_codes(tours, |t| t.primary_purpose.map(|p| p.code())),
        ),
        Column::new(
            tour::PRIMARY_D_LAT.into(),
            &opt_floats(tours, |t| primary(t).and_then(|p| p.location).map(|l| l.lat)),
        ),
        Column::new(
            tour::PRIMARY_D_LON.into(),
            &opt_floats(tours, |t| primary(t).and_then(|p| p.location).map(|l| l.lon)),
        ),
        Column::new(
            tour::PRIMARY_D_TYPE.into(),
            &opt_codes(tours, |t| primary(t).map(|p| p.location_type.code())),
        ),
        Column::new(
            tour::PRIMARY_D_TAZ.into(),
            &opt_ints(tours, |t| primary(t).and_then(|p| p.zone)),
        ),
        Column::new(
            tour::DEST_TRIP_ID.into(),
            &opt_ints(tours, |t| primary(t).map(|p| p.trip_id)),
        ),
        Column::new(
            tour::ORIGIN_TRIP_ID.into(),
            &opt_ints(tours, |t| t.trip_ids.first().copied()),
        ),
        datetime_column(
            tour::ORIGIN_DEPART_TIME,
            &opt_ints(tours, |t| Some(micros(t.origin_depart_time))),
        )?,
        datetime_column(
            tour::DEST_ARRIVE_TIME,
            &opt_ints(tours, |t| t.dest_arrive_time.map(micros)),
        )?,
        datetime_column(
            tour::DEST_DEPART_TIME,
            &opt_ints(tours, |t| t.dest_depart_time.map(micros)),
        )?,
        datetime_column(
            tour::ORIGIN_ARRIVE_TIME,
            &opt_ints(tours, |t| Some(micros(t.origin_arrive_time))),
        )?,
        Column::new(tour::O_LAT.into(), &opt_floats(tours, |t| t.o.map(|l| l.lat))),
        Column::new(tour::O_LON.into(), &opt_floats(tours, |t| t.o.map(|l| l.lon))),
        Column::new(tour::D_LAT.into(), &opt_floats(tours, |t| t.d.map(|l| l.lat))),
        Column::new(tour::D_LON.into(), &opt_floats(tours, |t| t.d.map(|l| l.lon))),
        Column::new(
            tour::O_LOCATION_TYPE.into(),
            &codes(tours, |t| t.o_location_type.code()),
        ),
        Column::new(
            tour::D_LOCATION_TYPE.into(),
            &codes(tours, |t| t.d_location_type.code()),
        ),
        Column::new(tour::O_TAZ.into(), &opt_ints(tours, |t| t.o_zone)),
        Column::new(tour::TRIP_COUNT.into(), &counts(tours, |t| t.trip_count)),
        Column::new(tour::STOP_COUNT.into(), &counts(tours, |t| t.stop_count)),
        Column::new(
            tour::OUTBOUND_TRIP_COUNT.into(),
            &counts(tours, |t| t.outbound_trip_count),
        ),
        Column::new(
            tour::INBOUND_TRIP_COUNT.into(),
            &counts(tours, |t| t.inbound_trip_count),
        ),
        Column::new(tour::SUBTOUR_COUNT.into(), &counts(tours, |t| t.subtour_count)),
        Column::new(tour::TOUR_MODE.into(), &codes(tours, |t| t.tour_mode.code())),
        Column::new(
            tour::OUTBOUND_MODE.into(),
            &opt_codes(tours, |t| t.outbound_mode.map(|m| m.code())),
        ),
        Column::new(
            tour::INBOUND_MODE.into(),
            &opt_codes(tours, |t| t.inbound_mode.map(|m| m.code())),
        ),
        Column::new(
            tour::SINGLE_TRIP_TOUR.into(),
            &tours.iter().map(|t| t.single_trip_tour).collect::<Vec<bool>>(),
        ),
        Column::new(
            tour::TOUR_CATEGORY.into(),
            &codes(tours, |t| t.category.code()),
        ),
        Column::new(
            tour::TOUR_DATA_QUALITY.into(),
            &codes(tours, |t| t.data_quality.code()),
        ),
        Column::new(tour::JOINT_TOUR_ID.into(), &opt_ints(tours, |t| t.joint_tour_id)),
        Column::new(tour::WORK_STOPS.into(), &counts(tours, |t| t.stop_purposes.work)),
        Column::new(tour::SCHOOL_STOPS.into(), &counts(tours, |t| t.stop_purposes.school)),
        Column::new(tour::ESCORT_STOPS.into(), &counts(tours, |t| t.stop_purposes.escort)),
        Column::new(tour::SHOP_STOPS.into(), &counts(tours, |t| t.stop_purposes.shop)),
        Column::new(tour::MEAL_STOPS.into(), &counts(tours, |t| t.stop_purposes.meal)),
        Column::new(
            tour::SOCIALREC_STOPS.into(),
            &counts(tours, |t| t.stop_purposes.socialrec),
        ),
        Column::new(tour::ERRAND_STOPS.into(), &counts(tours, |t| t.stop_purposes.errand)),
        Column::new(tour::OTHER_STOPS.into(), &counts(tours, |t| t.stop_purposes.other)),
    ];

    Ok(DataFrame::new(columns)?)
}
