//! Survey codebook: integer-coded categorical values with human labels.
//!
//! Codes match the canonical survey data model so that tables produced by
//! upstream steps can be consumed without re-mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = ($code:expr, $label:expr)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(self) -> i32 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_code(code: i64) -> Option<Self> {
                match code {
                    $(c if c == $code as i64 => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

// ── Locations ───────────────────────────────────────────────────────────────

labeled_enum! {
    LocationType {
        Home = (1, "Home"),
        Work = (2, "Work"),
        School = (3, "School"),
        Other = (4, "Other"),
    }
}

// ── Trips ───────────────────────────────────────────────────────────────────

labeled_enum! {
    /// `o_purpose_category` / `d_purpose_category` values.
    PurposeCategory {
        Home = (1, "Home"),
        Work = (2, "Work"),
        WorkRelated = (3, "Work related"),
        School = (4, "School"),
        SchoolRelated = (5, "School related"),
        Escort = (6, "Escort"),
        Shop = (7, "Shop"),
        Meal = (8, "Meal"),
        Socialrec = (9, "Social or recreational"),
        Errand = (10, "Errand"),
        ChangeMode = (11, "Change mode"),
        Overnight = (12, "Overnight"),
        Other = (13, "Other"),
        Missing = (995, "Missing Response"),
        NotImputable = (996, "Not imputable"),
        Pnta = (999, "Prefer not to answer"),
    }
}

impl PurposeCategory {
    pub fn is_work(self) -> bool {
        matches!(self, PurposeCategory::Work | PurposeCategory::WorkRelated)
    }

    pub fn is_school(self) -> bool {
        matches!(self, PurposeCategory::School | PurposeCategory::SchoolRelated)
    }
}

labeled_enum! {
    ModeType {
        Walk = (1, "Walk"),
        Bike = (2, "Bike"),
        Bikeshare = (3, "Bikeshare"),
        Scootershare = (4, "Scootershare"),
        Taxi = (5, "Taxi"),
        Tnc = (6, "TNC"),
        Other = (7, "Other"),
        Car = (8, "Car"),
        Carshare = (9, "Carshare"),
        SchoolBus = (10, "School bus"),
        Shuttle = (11, "Shuttle/vanpool"),
        Ferry = (12, "Ferry"),
        Transit = (13, "Transit"),
        LongDistance = (14, "Long distance passenger"),
        Missing = (995, "Missing Response"),
    }
}

// ── Persons ─────────────────────────────────────────────────────────────────

labeled_enum! {
    AgeCategory {
        Under5 = (1, "Under 5"),
        Age5To15 = (2, "5 to 15"),
        Age16To17 = (3, "16 to 17"),
        Age18To24 = (4, "18 to 24"),
        Age25To34 = (5, "25 to 34"),
        Age35To44 = (6, "35 to 44"),
        Age45To54 = (7, "45 to 54"),
        Age55To64 = (8, "55 to 64"),
        Age65To74 = (9, "65 to 74"),
        Age75To84 = (10, "75 to 84"),
        Age85Plus = (11, "85 and up"),
    }
}

labeled_enum! {
    Employment {
        EmployedFulltime = (1, "Employed full-time (paid)"),
        EmployedParttime = (2, "Employed part-time (paid)"),
        EmployedSelf = (3, "Self-employed"),
        UnemployedNotLooking = (5, "Not employed and not looking for work"),
        UnemployedLooking = (6, "Unemployed and looking for work"),
        EmployedUnpaid = (7, "Unpaid volunteer or intern"),
        EmployedFurloughed = (8, "Employed, but not currently working"),
        Missing = (995, "Missing Response"),
    }
}

labeled_enum! {
    StudentStatus {
        FulltimeInperson = (0, "Full-time student, attending some or all classes in-person"),
        ParttimeInperson = (1, "Part-time student, attending some or all classes in-person"),
        Nonstudent = (2, "Not a student"),
        ParttimeOnline = (3, "Part-time student, ONLY online classes"),
        FulltimeOnline = (4, "Full-time student, ONLY online classes"),
        Missing = (995, "Missing Response"),
    }
}

labeled_enum! {
    SchoolType {
        Athome = (1, "Cared for at home"),
        Daycare = (2, "Daycare outside home"),
        Preschool = (3, "Preschool"),
        HomeSchool = (4, "Home school"),
        Elementary = (5, "Elementary school"),
        MiddleSchool = (6, "Middle school"),
        HighSchool = (7, "High school"),
        Vocational = (10, "Vocational/technical school"),
        College2year = (11, "2-year college"),
        College4year = (12, "4-year college"),
        GraduateSchool = (13, "Graduate or professional school"),
        Missing = (995, "Missing Response"),
        Other = (997, "Other"),
        Pnta = (999, "Prefer not to answer"),
    }
}

labeled_enum! {
    PersonType {
        FullTimeWorker = (1, "Full-time worker"),
        PartTimeWorker = (2, "Part-time worker"),
        Retired = (3, "Non-working adult 65+"),
        NonWorker = (4, "Non-working adult < 65"),
        UniversityStudent = (5, "University student"),
        HighSchoolStudent = (6, "High school student 16+"),
        ChildSchoolAge = (7, "Child 5-15"),
        ChildUnderFive = (8, "Child 0-4"),
    }
}

labeled_enum! {
    /// Simplified person categories used to pick a purpose priority table.
    PersonCategory {
        Worker = (1, "worker"),
        Student = (2, "student"),
        Other = (3, "other"),
    }
}

// ── Tours ───────────────────────────────────────────────────────────────────

labeled_enum! {
    TourType {
        HomeBased = (1, "Home-based tour"),
        AnchorBased = (2, "Anchor-based subtour"),
    }
}

labeled_enum! {
    /// Boundary type of a tour relative to its anchor (home for home-based
    /// tours, the work/school anchor for subtours).
    TourCategory {
        Complete = (1, "Start at anchor, end at anchor"),
        PartialEnd = (2, "Start at anchor, end not at anchor"),
        PartialStart = (3, "Start not at anchor, end at anchor"),
        PartialBoth = (4, "Start not at anchor, end not at anchor"),
    }
}

impl TourCategory {
    pub fn from_ends(starts_at_anchor: bool, ends_at_anchor: bool) -> Self {
        match (starts_at_anchor, ends_at_anchor) {
            (true, true) => TourCategory::Complete,
            (true, false) => TourCategory::PartialEnd,
            (false, true) => TourCategory::PartialStart,
            (false, false) => TourCategory::PartialBoth,
        }
    }

    pub fn is_partial(self) -> bool {
        self != TourCategory::Complete
    }
}

labeled_enum! {
    TourDirection {
        Outbound = (1, "Outbound half-tour"),
        Inbound = (2, "Inbound half-tour"),
        Subtour = (3, "Subtour"),
    }
}

labeled_enum! {
    TourDataQuality {
        Valid = (0, "Valid tour"),
        SingleTrip = (1, "Single-trip tour"),
        LoopTrip = (2, "Home-based loop trip"),
        MissingHomeAnchor = (3, "No home anchor at either end of tour"),
        Indeterminate = (4, "Invalid tour, cause unknown"),
        ChangeMode = (5, "Change mode as primary purpose (linking failure)"),
    }
}

labeled_enum! {
    /// Usual secondary location that can host subtours.
    AnchorKind {
        Work = (2, "Work"),
        School = (3, "School"),
    }
}

impl AnchorKind {
    pub fn location_type(self) -> LocationType {
        match self {
            AnchorKind::Work => LocationType::Work,
            AnchorKind::School => LocationType::School,
        }
    }
}
