#![allow(dead_code)]

use polars::prelude::*;
use tourkit::schema::{household, person, trip};

pub const HOME: (f64, f64) = (37.7749, -122.4194);
pub const HOME_2: (f64, f64) = (37.7000, -122.4700);
pub const WORK: (f64, f64) = (37.7849, -122.4094);
pub const LUNCH: (f64, f64) = (37.7900, -122.4000);
pub const SHOP: (f64, f64) = (37.7700, -122.4300);
/// A client site several kilometres from `WORK`.
pub const CLIENT: (f64, f64) = (37.8000, -122.4400);

// purpose codes
pub const P_HOME: i32 = 1;
pub const P_WORK: i32 = 2;
pub const P_SHOP: i32 = 7;
pub const P_MEAL: i32 = 8;

// mode codes
pub const M_WALK: i32 = 1;
pub const M_CAR: i32 = 8;
pub const M_TRANSIT: i32 = 13;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, Copy)]
pub struct TripRow {
    pub trip_id: i64,
    pub person_id: i64,
    pub day_id: i64,
    /// Minutes since midnight.
    pub depart: i64,
    pub arrive: i64,
    pub o: (f64, f64),
    pub d: (f64, f64),
    pub o_purpose: i32,
    pub d_purpose: i32,
    pub mode: i32,
    pub joint_trip_id: Option<i64>,
}

/// `person_id / 100` is the household, `person_id * 100 + day` the day id.
pub fn leg(
    trip_id: i64,
    person_id: i64,
    day: i64,
    (o, o_purpose): ((f64, f64), i32),
    (d, d_purpose): ((f64, f64), i32),
    depart: i64,
    arrive: i64,
) -> TripRow {
    TripRow {
        trip_id,
        person_id,
        day_id: person_id * 100 + day,
        depart,
        arrive,
        o,
        d,
        o_purpose,
        d_purpose,
        mode: M_CAR,
        joint_trip_id: None,
    }
}

pub fn trips_frame(rows: &[TripRow]) -> DataFrame {
    fn col<T, F>(rows: &[TripRow], f: F) -> Vec<T>
    where
        F: Fn(&TripRow) -> T,
    {
        rows.iter().map(f).collect()
    }

    DataFrame::new(vec![
        Column::new(trip::TRIP_ID.into(), &col(rows, |r| r.trip_id)),
        Column::new(trip::HH_ID.into(), &col(rows, |r| r.person_id / 100)),
        Column::new(trip::PERSON_ID.into(), &col(rows, |r| r.person_id)),
        Column::new(trip::DAY_ID.into(), &col(rows, |r| r.day_id)),
        Column::new(trip::DEPART_TIME.into(), &col(rows, |r| r.depart)),
        Column::new(trip::ARRIVE_TIME.into(), &col(rows, |r| r.arrive)),
        Column::new(trip::O_LAT.into(), &col(rows, |r| r.o.0)),
        Column::new(trip::O_LON.into(), &col(rows, |r| r.o.1)),
        Column::new(trip::D_LAT.into(), &col(rows, |r| r.d.0)),
        Column::new(trip::D_LON.into(), &col(rows, |r| r.d.1)),
        Column::new(trip::O_PURPOSE_CATEGORY.into(), &col(rows, |r| r.o_purpose)),
        Column::new(trip::D_PURPOSE_CATEGORY.into(), &col(rows, |r| r.d_purpose)),
        Column::new(trip::MODE_TYPE.into(), &col(rows, |r| r.mode)),
        Column::new(trip::JOINT_TRIP_ID.into(), &col(rows, |r| r.joint_trip_id)),
    ])
    .unwrap()
}

/// Full-time workers (person type 1) employed at `WORK`.
pub fn workers_frame(person_ids: &[i64]) -> DataFrame {
    let n = person_ids.len();
    let hh_ids: Vec<i64> = person_ids.iter().map(|p| p / 100).collect();
    df!(
        person::PERSON_ID => person_ids,
        person::HH_ID => hh_ids,
        person::PERSON_TYPE => vec![1i32; n],
        person::WORK_LAT => vec![Some(WORK.0); n],
        person::WORK_LON => vec![Some(WORK.1); n],
        person::SCHOOL_LAT => vec![None::<f64>; n],
        person::SCHOOL_LON => vec![None::<f64>; n],
    )
    .unwrap()
}

/// Household 1 lives at `HOME`, household 2 at `HOME_2`.
pub fn households_frame() -> DataFrame {
    df!(
        household::HH_ID => [1i64, 2],
        household::HOME_LAT => [HOME.0, HOME_2.0],
        household::HOME_LON => [HOME.1, HOME_2.1],
    )
    .unwrap()
}

pub fn i64_col(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect()
}

/// Lunch subtour day for person 101, a mid-tour start the next day, a
/// lone trip for person 102, and a joint shopping outing for household 2.
pub fn survey() -> Vec<TripRow> {
    let mut rows = vec![
        leg(1, 101, 1, (HOME, P_HOME), (WORK, P_WORK), 480, 510),
        leg(2, 101, 1, (WORK, P_WORK), (LUNCH, P_MEAL), 720, 730),
        leg(3, 101, 1, (LUNCH, P_MEAL), (WORK, P_WORK), 770, 780),
        leg(4, 101, 1, (WORK, P_WORK), (HOME, P_HOME), 1020, 1050),
        leg(5, 101, 2, (WORK, P_WORK), (SHOP, P_SHOP), 900, 920),
        leg(6, 101, 2, (SHOP, P_SHOP), (HOME, P_HOME), 940, 960),
        leg(7, 101, 2, (HOME, P_HOME), (SHOP, P_SHOP), 1080, 1090),
        leg(8, 101, 2, (SHOP, P_SHOP), (HOME, P_HOME), 1120, 1130),
        leg(9, 102, 1, (HOME, P_HOME), (SHOP, P_SHOP), 600, 615),
        leg(10, 201, 1, (HOME_2, P_HOME), (SHOP, P_SHOP), 600, 620),
        leg(11, 201, 1, (SHOP, P_SHOP), (HOME_2, P_HOME), 700, 720),
        leg(12, 202, 1, (HOME_2, P_HOME), (SHOP, P_SHOP), 600, 620),
        leg(13, 202, 1, (SHOP, P_SHOP), (HOME_2, P_HOME), 700, 720),
    ];
    rows[1].mode = M_WALK;
    rows[2].mode = M_WALK;
    rows[3].mode = M_TRANSIT;
    for (row, joint) in rows[9..].iter_mut().zip([5001, 5002, 5001, 5002]) {
        row.joint_trip_id = Some(joint);
    }
    rows
}
