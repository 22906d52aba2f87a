//! Anchor-based subtours: excursions that leave the workplace or school
//! and come back to it within a home-based tour.

use crate::anchor::AnchorPeriod;
use crate::codebook::AnchorKind;
use crate::location::TripLocations;

/// Whether each end of a trip is at the anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnchorEnds {
    pub o_at: bool,
    pub d_at: bool,
}

impl AnchorEnds {
    fn leaving(&self) -> bool {
        self.o_at && !self.d_at
    }

    fn returning(&self) -> bool {
        !self.o_at && self.d_at
    }
}

/// Anchor contact of every trip of a tour. With `usual_only`, only a
/// coordinate match to the usual location counts; otherwise the hybrid
/// purpose-or-distance flags are used.
pub fn anchor_ends(locations: &[TripLocations], anchor: AnchorKind, usual_only: bool) -> Vec<AnchorEnds> {
    locations
        .iter()
        .map(|loc| match (anchor, usual_only) {
            (AnchorKind::Work, false) => AnchorEnds {
                o_at: loc.flags.o_work,
                d_at: loc.flags.d_work,
            },
            (AnchorKind::School, false) => AnchorEnds {
                o_at: loc.flags.o_school,
                d_at: loc.flags.d_school,
            },
            (AnchorKind::Work, true) => AnchorEnds {
                o_at: loc.usual.o_work,
                d_at: loc.usual.d_work,
            },
            (AnchorKind::School, true) => AnchorEnds {
                o_at: loc.usual.o_school,
                d_at: loc.usual.d_school,
            },
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubtourState {
    SeekingLeave,
    InsideSubtour,
}

/// Subtour number per trip (0 = on the parent tour) and the number of
/// subtours that returned to the anchor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubtourScan {
    pub subtour_nums: Vec<u32>,
    pub closed: usize,
}

impl SubtourScan {
    pub fn subtour_count(&self) -> u32 {
        self.subtour_nums.iter().copied().max().unwrap_or(0)
    }
}

/// Scan the trips strictly inside the anchor period. A subtour opens on a
/// trip leaving the anchor and closes on the trip returning to it; a
/// subtour still open at the end of the period keeps its number.
pub fn detect_subtours(ends: &[AnchorEnds], period: Option<AnchorPeriod>) -> SubtourScan {
    let mut scan = SubtourScan {
        subtour_nums: vec![0; ends.len()],
        closed: 0,
    };
    let Some(period) = period.filter(AnchorPeriod::has_interior) else {
        return scan;
    };

    let mut state = SubtourState::SeekingLeave;
    let mut current = 0u32;
    for (idx, e) in ends.iter().enumerate() {
        if !period.contains(idx + 1) {
            continue;
        }
        match state {
            SubtourState::SeekingLeave => {
                if e.leaving() {
                    current += 1;
                    scan.subtour_nums[idx] = current;
                    state = SubtourState::InsideSubtour;
                }
            }
            SubtourState::InsideSubtour => {
                scan.subtour_nums[idx] = current;
                if e.returning() {
                    scan.closed += 1;
                    state = SubtourState::SeekingLeave;
                }
            }
        }
    }

    scan
}
