//! Home-based tour boundaries within one person's ordered trips.

/// Home flags and travel day of one trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripEnds {
    pub day_id: i64,
    pub o_home: bool,
    pub d_home: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Before the first trip, or the last trip arrived home.
    SeekingStart,
    InsideTour,
}

/// Assign 1-based tour numbers to trips sorted in travel order.
///
/// A trip opens a new tour when the person was not yet travelling or just
/// came home, when it leaves home (including home-to-home loops), and,
/// with `check_multiday_gaps`, when it follows a gap of more than one day.
/// A tour closes at a home destination or at the last trip.
pub fn assign_tour_numbers(ends: &[TripEnds], check_multiday_gaps: bool) -> Vec<u32> {
    let mut state = ScanState::SeekingStart;
    let mut tour_num = 0u32;
    let mut prev_day: Option<i64> = None;
    let mut out = Vec::with_capacity(ends.len());

    for e in ends {
        let gap = check_multiday_gaps && prev_day.is_some_and(|d| e.day_id - d > 1);
        let starts = state == ScanState::SeekingStart || e.o_home || gap;
        if starts {
            tour_num += 1;
        }
        out.push(tour_num);

        state = if e.d_home {
            ScanState::SeekingStart
        } else {
            ScanState::InsideTour
        };
        prev_day = Some(e.day_id);
    }

    out
}
