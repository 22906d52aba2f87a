//! Anchor periods: the stretch of a home-based tour spent around the
//! person's usual workplace or school.

use crate::codebook::AnchorKind;
use crate::location::UsualAnchorFlags;

/// First and last 1-based trip positions within a tour that touch the
/// anchor. Subtours are only searched strictly between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPeriod {
    pub anchor: AnchorKind,
    pub start: usize,
    pub end: usize,
}

impl AnchorPeriod {
    /// True when at least one trip lies strictly inside the period.
    pub fn has_interior(&self) -> bool {
        self.end > self.start + 1
    }

    pub fn contains(&self, position: usize) -> bool {
        position > self.start && position < self.end
    }
}

fn span(flags: &[UsualAnchorFlags], touches: fn(&UsualAnchorFlags) -> bool) -> Option<(usize, usize)> {
    let first = flags.iter().position(touches)?;
    let last = flags.iter().rposition(touches)?;
    Some((first + 1, last + 1))
}

/// Find the anchor period of one tour, trips in travel order. Work wins
/// over school when both are visited.
pub fn expand_anchor_period(flags: &[UsualAnchorFlags]) -> Option<AnchorPeriod> {
    if let Some((start, end)) = span(flags, UsualAnchorFlags::touches_work) {
        return Some(AnchorPeriod {
            anchor: AnchorKind::Work,
            start,
            end,
        });
    }
    span(flags, UsualAnchorFlags::touches_school).map(|(start, end)| AnchorPeriod {
        anchor: AnchorKind::School,
        start,
        end,
    })
}
