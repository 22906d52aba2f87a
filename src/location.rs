//! Trip endpoint classification against home, work and school.

use crate::codebook::{LocationType, PurposeCategory};
use crate::config::DistanceThresholds;
use crate::model::{near, LatLon, PersonLocations, Trip};

/// Hybrid flags: reported purpose OR proximity to the stored location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationFlags {
    pub o_home: bool,
    pub d_home: bool,
    pub o_work: bool,
    pub d_work: bool,
    pub o_school: bool,
    pub d_school: bool,
}

/// Distance-only matches against the person's usual workplace and school.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsualAnchorFlags {
    pub o_work: bool,
    pub d_work: bool,
    pub o_school: bool,
    pub d_school: bool,
}

impl UsualAnchorFlags {
    pub fn touches_work(&self) -> bool {
        self.o_work || self.d_work
    }

    pub fn touches_school(&self) -> bool {
        self.o_school || self.d_school
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripLocations {
    pub flags: LocationFlags,
    pub usual: UsualAnchorFlags,
    pub o_type: LocationType,
    pub d_type: LocationType,
}

fn hybrid_match(
    purpose: PurposeCategory,
    purpose_hit: fn(PurposeCategory) -> bool,
    point: Option<LatLon>,
    known: Option<LatLon>,
    threshold_m: f64,
) -> bool {
    purpose_hit(purpose) || near(point, known, threshold_m)
}

fn is_home(p: PurposeCategory) -> bool {
    p == PurposeCategory::Home
}

/// Home takes priority over work, work over school.
pub fn location_type(home: bool, work: bool, school: bool) -> LocationType {
    if home {
        LocationType::Home
    } else if work {
        LocationType::Work
    } else if school {
        LocationType::School
    } else {
        LocationType::Other
    }
}

pub fn classify_trip(
    trip: &Trip,
    person: &PersonLocations,
    thresholds: &DistanceThresholds,
) -> TripLocations {
    let flags = LocationFlags {
        o_home: hybrid_match(trip.o_purpose, is_home, trip.o, person.home, thresholds.home),
        d_home: hybrid_match(trip.d_purpose, is_home, trip.d, person.home, thresholds.home),
        o_work: hybrid_match(
            trip.o_purpose,
            PurposeCategory::is_work,
            trip.o,
            person.work,
            thresholds.work,
        ),
        d_work: hybrid_match(
            trip.d_purpose,
            PurposeCategory::is_work,
            trip.d,
            person.work,
            thresholds.work,
        ),
        o_school: hybrid_match(
            trip.o_purpose,
            PurposeCategory::is_school,
            trip.o,
            person.school,
            thresholds.school,
        ),
        d_school: hybrid_match(
            trip.d_purpose,
            PurposeCategory::is_school,
            trip.d,
            person.school,
            thresholds.school,
        ),
    };

    let usual = UsualAnchorFlags {
        o_work: near(trip.o, person.work, thresholds.work),
        d_work: near(trip.d, person.work, thresholds.work),
        o_school: near(trip.o, person.school, thresholds.school),
        d_school: near(trip.d, person.school, thresholds.school),
    };

    TripLocations {
        flags,
        usual,
        o_type: location_type(flags.o_home, flags.o_work, flags.o_school),
        d_type: location_type(flags.d_home, flags.d_work, flags.d_school),
    }
}
