//! Typed survey records and the tour records derived from them.

use chrono::NaiveDateTime;
use geo::{Distance, Haversine, Point};

use crate::codebook::{
    AnchorKind, LocationType, ModeType, PersonCategory, PersonType, PurposeCategory,
    TourCategory, TourDataQuality, TourDirection, TourType,
};

/// WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from nullable columns; a missing half yields no coordinate.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Self::new(lat, lon))
            }
            _ => None,
        }
    }

    /// Great-circle distance in meters.
    pub fn distance_m(&self, other: &LatLon) -> f64 {
        Haversine.distance(
            Point::new(self.lon, self.lat),
            Point::new(other.lon, other.lat),
        )
    }

    pub fn within(&self, other: &LatLon, threshold_m: f64) -> bool {
        self.distance_m(other) <= threshold_m
    }
}

/// True when both points are known and no further apart than `threshold_m`.
pub fn near(a: Option<LatLon>, b: Option<LatLon>, threshold_m: f64) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.within(&b, threshold_m),
        _ => false,
    }
}

/// A linked trip. Immutable input to tour extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    /// Row of this trip in the input table.
    pub row: usize,
    pub trip_id: i64,
    pub hh_id: i64,
    pub person_id: i64,
    pub day_id: i64,
    pub o: Option<LatLon>,
    pub d: Option<LatLon>,
    pub o_zone: Option<i64>,
    pub d_zone: Option<i64>,
    pub o_purpose: PurposeCategory,
    pub d_purpose: PurposeCategory,
    pub mode: ModeType,
    pub depart_time: NaiveDateTime,
    pub arrive_time: NaiveDateTime,
    pub joint_trip_id: Option<i64>,
}

impl Trip {
    /// Ordering key within a person-day: departure, then arrival, then id.
    pub fn sort_key(&self) -> (NaiveDateTime, NaiveDateTime, i64) {
        (self.depart_time, self.arrive_time, self.trip_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub person_id: i64,
    pub hh_id: i64,
    pub person_type: PersonType,
    pub work: Option<LatLon>,
    pub school: Option<LatLon>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Household {
    pub hh_id: i64,
    pub home: Option<LatLon>,
}

/// Cached per-person anchor coordinates and priority category.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonLocations {
    pub person_id: i64,
    pub hh_id: i64,
    pub person_type: PersonType,
    pub category: PersonCategory,
    pub home: Option<LatLon>,
    pub work: Option<LatLon>,
    pub school: Option<LatLon>,
}

impl PersonLocations {
    pub fn anchor(&self, anchor: AnchorKind) -> Option<LatLon> {
        match anchor {
            AnchorKind::Work => self.work,
            AnchorKind::School => self.school,
        }
    }
}

/// Home-based tour or a subtour nested in one. Subtours always hang off a
/// home-based tour, so the parent link cannot form a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourKind {
    HomeBased,
    AnchorBased {
        parent_tour_id: i64,
        anchor: AnchorKind,
    },
}

impl TourKind {
    pub fn parent_tour_id(&self) -> Option<i64> {
        match self {
            TourKind::HomeBased => None,
            TourKind::AnchorBased { parent_tour_id, .. } => Some(*parent_tour_id),
        }
    }

    pub fn anchor(&self) -> Option<AnchorKind> {
        match self {
            TourKind::HomeBased => None,
            TourKind::AnchorBased { anchor, .. } => Some(*anchor),
        }
    }

    pub fn tour_type(&self) -> TourType {
        match self {
            TourKind::HomeBased => TourType::HomeBased,
            TourKind::AnchorBased { .. } => TourType::AnchorBased,
        }
    }

    pub fn is_subtour(&self) -> bool {
        matches!(self, TourKind::AnchorBased { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryDestination {
    /// Trip whose destination won the purpose-priority comparison.
    pub trip_id: i64,
    pub purpose: PurposeCategory,
    pub location: Option<LatLon>,
    pub location_type: LocationType,
    pub zone: Option<i64>,
}

/// Intermediate stops (non-primary, non-final destinations) by purpose group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopPurposeCounts {
    pub work: u32,
    pub school: u32,
    pub escort: u32,
    pub shop: u32,
    pub meal: u32,
    pub socialrec: u32,
    pub errand: u32,
    pub other: u32,
}

impl StopPurposeCounts {
    pub fn add(&mut self, purpose: PurposeCategory) {
        use PurposeCategory::*;
        match purpose {
            Work | WorkRelated => self.work += 1,
            School | SchoolRelated => self.school += 1,
            Escort => self.escort += 1,
            Shop => self.shop += 1,
            Meal => self.meal += 1,
            Socialrec => self.socialrec += 1,
            Errand => self.errand += 1,
            _ => self.other += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.work
            + self.school
            + self.escort
            + self.shop
            + self.meal
            + self.socialrec
            + self.errand
            + self.other
    }
}

/// Whether any member trip starts or ends at home.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HomeAnchor {
    pub any_origin: bool,
    pub any_destination: bool,
}

/// One tour record. Created once per extraction run; only validation
/// rewrites `category`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    pub tour_id: i64,
    pub hh_id: i64,
    pub person_id: i64,
    pub day_id: i64,
    pub tour_num: u32,
    pub subtour_num: u32,
    pub kind: TourKind,
    /// Member trips in travel order.
    pub trip_ids: Vec<i64>,

    pub primary_purpose: Option<PurposeCategory>,
    pub primary_dest: Option<PrimaryDestination>,

    pub origin_depart_time: NaiveDateTime,
    pub dest_arrive_time: Option<NaiveDateTime>,
    pub dest_depart_time: Option<NaiveDateTime>,
    pub origin_arrive_time: NaiveDateTime,

    pub o: Option<LatLon>,
    pub d: Option<LatLon>,
    pub o_location_type: LocationType,
    pub d_location_type: LocationType,
    pub o_zone: Option<i64>,

    pub trip_count: u32,
    pub stop_count: u32,
    pub outbound_trip_count: u32,
    pub inbound_trip_count: u32,
    pub stop_purposes: StopPurposeCounts,
    pub subtour_count: u32,

    pub tour_mode: ModeType,
    pub outbound_mode: Option<ModeType>,
    pub inbound_mode: Option<ModeType>,

    pub home_anchor: HomeAnchor,
    pub single_trip_tour: bool,
    pub category: TourCategory,
    pub data_quality: TourDataQuality,
    pub joint_tour_id: Option<i64>,
}

impl Tour {
    pub fn parent_tour_id(&self) -> Option<i64> {
        self.kind.parent_tour_id()
    }
}

/// Per-trip output columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TripAnnotation {
    pub trip_id: i64,
    pub tour_id: i64,
    pub tour_num: u32,
    pub subtour_num: u32,
    /// Enclosing home-based tour; equals `tour_id` outside subtours.
    pub parent_tour_id: i64,
    pub direction: TourDirection,
    pub o_location_type: LocationType,
    pub d_location_type: LocationType,
    pub joint_tour_id: Option<i64>,
}
