//! Tour extraction configuration.
//!
//! Every option has a default and can be overridden on its own, either in
//! code or from a JSON document where missing keys keep their defaults:
//!
//! ```json
//! { "distance_thresholds": { "work": 150.0 }, "detect_usual_workplace": true }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::codebook::{LocationType, ModeType, PersonCategory, PersonType, PurposeCategory};
use crate::error::TourError;

/// Priority given to HOME destinations. They never head a tour, so the
/// value only needs to lose against every configured purpose.
pub const HOME_PURPOSE_PRIORITY: i32 = 999;

/// Rank of a mode missing from the hierarchy.
pub const UNRANKED_MODE: i32 = -1;

/// Distance thresholds in meters for matching trip ends to known locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceThresholds {
    pub home: f64,
    pub work: f64,
    pub school: f64,
}

impl Default for DistanceThresholds {
    fn default() -> Self {
        Self {
            home: 100.0,
            work: 100.0,
            school: 100.0,
        }
    }
}

impl DistanceThresholds {
    /// OTHER locations reuse the home threshold.
    pub fn for_location(&self, location: LocationType) -> f64 {
        match location {
            LocationType::Home | LocationType::Other => self.home,
            LocationType::Work => self.work,
            LocationType::School => self.school,
        }
    }
}

/// Ordered list of modes, later = higher priority for tour mode assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeHierarchy(pub Vec<ModeType>);

impl Default for ModeHierarchy {
    fn default() -> Self {
        Self(vec![
            ModeType::Walk,
            ModeType::Bike,
            ModeType::Bikeshare,
            ModeType::Scootershare,
            ModeType::Car,
            ModeType::Carshare,
            ModeType::Taxi,
            ModeType::Tnc,
            ModeType::Shuttle,
            ModeType::SchoolBus,
            ModeType::Ferry,
            ModeType::Transit,
            ModeType::LongDistance,
        ])
    }
}

impl ModeHierarchy {
    pub fn rank(&self, mode: ModeType) -> i32 {
        self.0
            .iter()
            .position(|m| *m == mode)
            .map(|idx| idx as i32)
            .unwrap_or(UNRANKED_MODE)
    }
}

/// Purpose priority by person category: lower number = higher priority.
///
/// Lookups never fall back to a default; a missing (category, purpose) pair
/// is an error because a guessed value would silently reorder purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurposePriorityTable(pub HashMap<PersonCategory, HashMap<PurposeCategory, i32>>);

impl Default for PurposePriorityTable {
    fn default() -> Self {
        use PurposeCategory::*;

        let shared_tail = [
            (Escort, 3),
            (Shop, 4),
            (Meal, 4),
            (Socialrec, 4),
            (Errand, 4),
            (ChangeMode, 5),
            (Overnight, 5),
            (Other, 5),
            (Missing, 5),
            (Pnta, 5),
            (NotImputable, 5),
        ];
        let work_first = [(Work, 1), (WorkRelated, 1), (School, 2), (SchoolRelated, 2)];
        let school_first = [(School, 1), (SchoolRelated, 1), (Work, 2), (WorkRelated, 2)];

        let build = |head: &[(PurposeCategory, i32)]| -> HashMap<PurposeCategory, i32> {
            head.iter().chain(shared_tail.iter()).copied().collect()
        };

        let mut table = HashMap::new();
        table.insert(PersonCategory::Worker, build(&work_first[..]));
        table.insert(PersonCategory::Student, build(&school_first[..]));
        table.insert(PersonCategory::Other, build(&work_first[..]));
        Self(table)
    }
}

impl PurposePriorityTable {
    pub fn priority(
        &self,
        category: PersonCategory,
        purpose: PurposeCategory,
    ) -> Result<i32, TourError> {
        if purpose == PurposeCategory::Home {
            return Ok(HOME_PURPOSE_PRIORITY);
        }
        self.0
            .get(&category)
            .and_then(|purposes| purposes.get(&purpose))
            .copied()
            .ok_or(TourError::UnmappedPurpose { category, purpose })
    }

    pub fn set(&mut self, category: PersonCategory, purpose: PurposeCategory, priority: i32) {
        self.0.entry(category).or_default().insert(purpose, priority);
    }
}

fn default_person_type_mapping() -> HashMap<PersonType, PersonCategory> {
    HashMap::from([
        (PersonType::FullTimeWorker, PersonCategory::Worker),
        (PersonType::PartTimeWorker, PersonCategory::Worker),
        (PersonType::Retired, PersonCategory::Other),
        (PersonType::NonWorker, PersonCategory::Other),
        (PersonType::UniversityStudent, PersonCategory::Student),
        (PersonType::HighSchoolStudent, PersonCategory::Student),
        (PersonType::ChildSchoolAge, PersonCategory::Student),
        (PersonType::ChildUnderFive, PersonCategory::Other),
    ])
}

/// Configuration for tour building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Also used to identify repeated visits to the primary destination.
    pub distance_thresholds: DistanceThresholds,
    pub mode_hierarchy: ModeHierarchy,
    pub purpose_priority: PurposePriorityTable,
    /// Maps detailed person types to the categories keying `purpose_priority`.
    pub person_type_mapping: HashMap<PersonType, PersonCategory>,
    /// Activity duration assumed after the last trip of a day when breaking
    /// purpose-priority ties.
    pub default_activity_duration_minutes: f64,
    /// Start a new tour when a trip follows a gap of more than one day.
    pub check_multiday_gaps: bool,
    /// Only a coordinate match to the usual workplace/school may host
    /// subtours; reported work/school purposes alone do not.
    pub detect_usual_workplace: bool,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            distance_thresholds: DistanceThresholds::default(),
            mode_hierarchy: ModeHierarchy::default(),
            purpose_priority: PurposePriorityTable::default(),
            person_type_mapping: default_person_type_mapping(),
            default_activity_duration_minutes: 240.0,
            check_multiday_gaps: false,
            detect_usual_workplace: false,
        }
    }
}

impl TourConfig {
    pub fn from_json(json: &str) -> Result<Self, TourError> {
        let config: TourConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TourError> {
        let t = &self.distance_thresholds;
        for (name, value) in [("home", t.home), ("work", t.work), ("school", t.school)] {
            if !value.is_finite() || value < 0.0 {
                return Err(TourError::Config(format!(
                    "distance threshold '{name}' must be a non-negative number, got {value}"
                )));
            }
        }

        if !self.default_activity_duration_minutes.is_finite()
            || self.default_activity_duration_minutes <= 0.0
        {
            return Err(TourError::Config(format!(
                "default_activity_duration_minutes must be positive, got {}",
                self.default_activity_duration_minutes
            )));
        }

        for category in PersonCategory::ALL {
            if !self.purpose_priority.0.contains_key(category) {
                return Err(TourError::Config(format!(
                    "purpose_priority has no table for person category '{category}'"
                )));
            }
        }

        Ok(())
    }

    pub fn person_category(&self, person_type: PersonType) -> Result<PersonCategory, TourError> {
        self.person_type_mapping
            .get(&person_type)
            .copied()
            .ok_or(TourError::UnmappedPersonType(person_type))
    }
}
