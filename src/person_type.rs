//! Person categorization: survey demographics → person type → priority category.

use std::collections::HashMap;

use log::{info, warn};

use crate::codebook::{AgeCategory, Employment, PersonType, SchoolType, StudentStatus};
use crate::config::TourConfig;
use crate::error::TourError;
use crate::model::{Household, Person, PersonLocations};

/// Raw demographic answers for one person; any may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Demographics {
    pub age: Option<AgeCategory>,
    pub employment: Option<Employment>,
    pub student: Option<StudentStatus>,
    pub school_type: Option<SchoolType>,
}

/// Derive a person type from age, employment and student status.
///
/// Within each age band workers are checked before students, and students
/// before part-time workers. A missing age falls through to the
/// working-age rules.
pub fn derive_person_type(d: &Demographics) -> PersonType {
    let full_time = matches!(
        d.employment,
        Some(Employment::EmployedFulltime | Employment::EmployedSelf | Employment::EmployedUnpaid)
    );
    let part_time = matches!(
        d.employment,
        Some(Employment::EmployedParttime | Employment::EmployedSelf)
    );
    let student = matches!(
        d.student,
        Some(
            StudentStatus::FulltimeInperson
                | StudentStatus::ParttimeInperson
                | StudentStatus::ParttimeOnline
                | StudentStatus::FulltimeOnline
        )
    );
    let high_school = matches!(
        d.school_type,
        Some(SchoolType::HomeSchool | SchoolType::HighSchool)
    );

    match d.age {
        Some(AgeCategory::Under5) => PersonType::ChildUnderFive,
        Some(AgeCategory::Age5To15) => PersonType::ChildSchoolAge,
        Some(AgeCategory::Age16To17) => {
            if full_time {
                PersonType::FullTimeWorker
            } else if student {
                PersonType::HighSchoolStudent
            } else {
                PersonType::NonWorker
            }
        }
        Some(AgeCategory::Age18To24) => {
            if full_time {
                PersonType::FullTimeWorker
            } else if student && high_school {
                PersonType::HighSchoolStudent
            } else if student {
                PersonType::UniversityStudent
            } else if part_time {
                PersonType::PartTimeWorker
            } else {
                PersonType::NonWorker
            }
        }
        Some(
            AgeCategory::Age25To34
            | AgeCategory::Age35To44
            | AgeCategory::Age45To54
            | AgeCategory::Age55To64,
        )
        | None => {
            if full_time {
                PersonType::FullTimeWorker
            } else if student {
                PersonType::UniversityStudent
            } else if part_time {
                PersonType::PartTimeWorker
            } else {
                PersonType::NonWorker
            }
        }
        Some(AgeCategory::Age65To74 | AgeCategory::Age75To84 | AgeCategory::Age85Plus) => {
            PersonType::Retired
        }
    }
}

/// Join persons with their household home coordinates and resolve the
/// purpose-priority category of each person.
pub fn prepare_person_locations(
    persons: &[Person],
    households: &[Household],
    config: &TourConfig,
) -> Result<HashMap<i64, PersonLocations>, TourError> {
    info!("Preparing person location data...");

    let homes: HashMap<i64, &Household> = households.iter().map(|h| (h.hh_id, h)).collect();

    let mut missing_home = 0usize;
    let mut duplicates = 0usize;
    let mut locations = HashMap::with_capacity(persons.len());
    for person in persons {
        if locations.contains_key(&person.person_id) {
            duplicates += 1;
            continue;
        }
        let home = homes.get(&person.hh_id).and_then(|h| h.home);
        if home.is_none() {
            missing_home += 1;
        }
        let category = config.person_category(person.person_type)?;
        locations.insert(
            person.person_id,
            PersonLocations {
                person_id: person.person_id,
                hh_id: person.hh_id,
                person_type: person.person_type,
                category,
                home,
                work: person.work,
                school: person.school,
            },
        );
    }

    if duplicates > 0 {
        warn!("{duplicates} person rows repeat an earlier person_id; the first row of each is kept");
    }
    if missing_home > 0 {
        warn!(
            "{missing_home} persons have no home coordinates; home matching falls back to purpose codes"
        );
    }

    Ok(locations)
}
