/// Column-name constants for the survey tables consumed and produced here.
/// Single source of truth - exported to Python via PyO3.

// ── Trip columns (input) ────────────────────────────────────────────────────
pub mod trip {
    pub const TRIP_ID: &str = "linked_trip_id";
    pub const HH_ID: &str = "hh_id";
    pub const PERSON_ID: &str = "person_id";
    pub const DAY_ID: &str = "day_id";
    pub const DEPART_TIME: &str = "depart_time";
    pub const ARRIVE_TIME: &str = "arrive_time";
    pub const O_LAT: &str = "o_lat";
    pub const O_LON: &str = "o_lon";
    pub const D_LAT: &str = "d_lat";
    pub const D_LON: &str = "d_lon";
    pub const O_PURPOSE_CATEGORY: &str = "o_purpose_category";
    pub const D_PURPOSE_CATEGORY: &str = "d_purpose_category";
    pub const MODE_TYPE: &str = "mode_type";

    // optional
    pub const JOINT_TRIP_ID: &str = "joint_trip_id";
    pub const O_TAZ: &str = "o_taz";
    pub const D_TAZ: &str = "d_taz";

    pub const REQUIRED: [&str; 13] = [
        TRIP_ID,
        HH_ID,
        PERSON_ID,
        DAY_ID,
        DEPART_TIME,
        ARRIVE_TIME,
        O_LAT,
        O_LON,
        D_LAT,
        D_LON,
        O_PURPOSE_CATEGORY,
        D_PURPOSE_CATEGORY,
        MODE_TYPE,
    ];
}

// ── Trip annotation columns (output) ────────────────────────────────────────
pub mod annotation {
    pub const TOUR_ID: &str = "tour_id";
    pub const TOUR_NUM: &str = "tour_num";
    pub const SUBTOUR_NUM: &str = "subtour_num";
    pub const PARENT_TOUR_ID: &str = "parent_tour_id";
    pub const TOUR_DIRECTION: &str = "tour_direction";
    pub const O_LOCATION_TYPE: &str = "o_location_type";
    pub const D_LOCATION_TYPE: &str = "d_location_type";
    pub const JOINT_TOUR_ID: &str = "joint_tour_id";

    pub const ALL: [&str; 8] = [
        TOUR_ID,
        TOUR_NUM,
        SUBTOUR_NUM,
        PARENT_TOUR_ID,
        TOUR_DIRECTION,
        O_LOCATION_TYPE,
        D_LOCATION_TYPE,
        JOINT_TOUR_ID,
    ];
}

// ── Person columns ──────────────────────────────────────────────────────────
pub mod person {
    pub const PERSON_ID: &str = "person_id";
    pub const HH_ID: &str = "hh_id";
    pub const PERSON_TYPE: &str = "person_type";
    pub const AGE: &str = "age";
    pub const EMPLOYMENT: &str = "employment";
    pub const STUDENT: &str = "student";
    pub const SCHOOL_TYPE: &str = "school_type";
    pub const WORK_LAT: &str = "work_lat";
    pub const WORK_LON: &str = "work_lon";
    pub const SCHOOL_LAT: &str = "school_lat";
    pub const SCHOOL_LON: &str = "school_lon";
}

// ── Household columns ───────────────────────────────────────────────────────
pub mod household {
    pub const HH_ID: &str = "hh_id";
    pub const HOME_LAT: &str = "home_lat";
    pub const HOME_LON: &str = "home_lon";
}

// ── Tour columns (output) ───────────────────────────────────────────────────
pub mod tour {
    pub const TOUR_ID: &str = "tour_id";
    pub const HH_ID: &str = "hh_id";
    pub const PERSON_ID: &str = "person_id";
    pub const DAY_ID: &str = "day_id";
    pub const TOUR_NUM: &str = "tour_num";
    pub const SUBTOUR_NUM: &str = "subtour_num";
    pub const PARENT_TOUR_ID: &str = "parent_tour_id";
    pub const TOUR_TYPE: &str = "tour_type";
    pub const ANCHOR_TYPE: &str = "anchor_type";
    pub const TOUR_PURPOSE: &str = "tour_purpose";
    pub const PRIMARY_D_LAT: &str = "primary_d_lat";
    pub const PRIMARY_D_LON: &str = "primary_d_lon";
    pub const PRIMARY_D_TYPE: &str = "primary_d_location_type";
    pub const PRIMARY_D_TAZ: &str = "primary_d_taz";
    pub const DEST_TRIP_ID: &str = "dest_linked_trip_id";
    pub const ORIGIN_TRIP_ID: &str = "origin_linked_trip_id";
    pub const ORIGIN_DEPART_TIME: &str = "origin_depart_time";
    pub const DEST_ARRIVE_TIME: &str = "dest_arrive_time";
    pub const DEST_DEPART_TIME: &str = "dest_depart_time";
    pub const ORIGIN_ARRIVE_TIME: &str = "origin_arrive_time";
    pub const O_LAT: &str = "o_lat";
    pub const O_LON: &str = "o_lon";
    pub const D_LAT: &str = "d_lat";
    pub const D_LON: &str = "d_lon";
    pub const O_LOCATION_TYPE: &str = "o_location_type";
    pub const D_LOCATION_TYPE: &str = "d_location_type";
    pub const O_TAZ: &str = "o_taz";
    pub const TRIP_COUNT: &str = "trip_count";
    pub const STOP_COUNT: &str = "stop_count";
    pub const OUTBOUND_TRIP_COUNT: &str = "outbound_trip_count";
    pub const INBOUND_TRIP_COUNT: &str = "inbound_trip_count";
    pub const SUBTOUR_COUNT: &str = "subtour_count";
    pub const TOUR_MODE: &str = "tour_mode";
    pub const OUTBOUND_MODE: &str = "outbound_mode";
    pub const INBOUND_MODE: &str = "inbound_mode";
    pub const SINGLE_TRIP_TOUR: &str = "single_trip_tour";
    pub const TOUR_CATEGORY: &str = "tour_category";
    pub const TOUR_DATA_QUALITY: &str = "tour_data_quality";
    pub const JOINT_TOUR_ID: &str = "joint_tour_id";

    // Intermediate stops by purpose group
    pub const WORK_STOPS: &str = "work_stops";
    pub const SCHOOL_STOPS: &str = "school_stops";
    pub const ESCORT_STOPS: &str = "escort_stops";
    pub const SHOP_STOPS: &str = "shop_stops";
    pub const MEAL_STOPS: &str = "meal_stops";
    pub const SOCIALREC_STOPS: &str = "socialrec_stops";
    pub const ERRAND_STOPS: &str = "errand_stops";
    pub const OTHER_STOPS: &str = "other_stops";
}
