//! Tour data-quality flags and the category corrections they imply.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use log::{info, warn};

use crate::aggregation::is_change_mode;
use crate::codebook::{TourCategory, TourDataQuality};
use crate::model::Tour;

/// Number of INDETERMINATE tours whose trips are dumped to the log.
const DIAGNOSTIC_SAMPLE: usize = 5;

/// Home flags of one trip, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripTrace {
    pub trip_id: i64,
    pub depart_time: NaiveDateTime,
    pub o_home: bool,
    pub d_home: bool,
}

/// Count of tours per data-quality level, every level present.
pub type QualitySummary = BTreeMap<TourDataQuality, usize>;

/// First matching flag wins.
pub fn classify_quality(tour: &Tour) -> TourDataQuality {
    let home = tour.home_anchor;
    if tour.trip_count == 1 && home.any_origin && home.any_destination {
        TourDataQuality::LoopTrip
    } else if tour.trip_count == 1 {
        TourDataQuality::SingleTrip
    } else if is_change_mode(tour) {
        TourDataQuality::ChangeMode
    } else if !tour.kind.is_subtour() && !home.any_origin && !home.any_destination {
        TourDataQuality::MissingHomeAnchor
    } else if tour.tour_num == 0 {
        TourDataQuality::Indeterminate
    } else {
        TourDataQuality::Valid
    }
}

/// Flag every tour and force PARTIAL_BOTH where the structure is known to
/// be broken.
pub fn validate_tours(tours: &mut [Tour], trips: &HashMap<i64, TripTrace>) -> QualitySummary {
    info!("Validating tour data quality...");

    let mut summary: QualitySummary = TourDataQuality::ALL.iter().map(|q| (*q, 0)).collect();
    for tour in tours.iter_mut() {
        tour.data_quality = classify_quality(tour);
        if matches!(
            tour.data_quality,
            TourDataQuality::SingleTrip | TourDataQuality::MissingHomeAnchor
        ) {
            tour.category = TourCategory::PartialBoth;
        }
        *summary.entry(tour.data_quality).or_default() += 1;
    }

    info!("Tour data quality summary:");
    for (quality, count) in &summary {
        info!("  {}: {}", quality.label(), count);
    }

    let partial = tours.iter().filter(|t| t.category.is_partial()).count();
    info!("{partial} of {} tours are partial", tours.len());

    let invalid = tours
        .iter()
        .filter(|t| t.data_quality != TourDataQuality::Valid)
        .count();
    if invalid > 0 {
        warn!(
            "Found {invalid} tours with data quality issues; downstream consumers should filter them"
        );
    }

    diagnose_indeterminate(tours, trips);
    summary
}

fn diagnose_indeterminate(tours: &[Tour], trips: &HashMap<i64, TripTrace>) {
    let indeterminate: Vec<&Tour> = tours
        .iter()
        .filter(|t| t.data_quality == TourDataQuality::Indeterminate)
        .collect();
    if indeterminate.is_empty() {
        return;
    }
    warn!("Diagnosing {} INDETERMINATE tours...", indeterminate.len());

    let mut patterns: HashMap<(bool, bool), usize> = HashMap::new();
    let mut by_trip_count: BTreeMap<u32, usize> = BTreeMap::new();
    for tour in &indeterminate {
        let home = tour.home_anchor;
        *patterns.entry((home.any_origin, home.any_destination)).or_default() += 1;
        *by_trip_count.entry(tour.trip_count).or_default() += 1;
    }

    let mut patterns: Vec<_> = patterns.into_iter().collect();
    patterns.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let label = |at_home: bool| if at_home { "home" } else { "not_home" };

    warn!("INDETERMINATE tours by home anchor pattern:");
    for ((origin, dest), count) in patterns {
        warn!("  Origin={}, Dest={}: {} tours", label(origin), label(dest), count);
    }

    warn!("INDETERMINATE tours by trip count:");
    for (trip_count, count) in by_trip_count {
        warn!("  {trip_count} trips: {count} tours");
    }

    warn!("Sample INDETERMINATE tour details (first {DIAGNOSTIC_SAMPLE}):");
    for tour in indeterminate.iter().take(DIAGNOSTIC_SAMPLE) {
        warn!(
            "  Tour {}: person={}, day={}, trips={}, category={}, home_origin={}, home_dest={}",
            tour.tour_id,
            tour.person_id,
            tour.day_id,
            tour.trip_count,
            tour.category.label(),
            tour.home_anchor.any_origin,
            tour.home_anchor.any_destination,
        );
        for trace in tour.trip_ids.iter().filter_map(|id| trips.get(id)) {
            let loop_flag = if trace.o_home && trace.d_home { " [LOOP]" } else { "" };
            warn!(
                "      Trip {}: depart={}, o_home={}, d_home={}{}",
                trace.trip_id, trace.depart_time, trace.o_home, trace.d_home, loop_flag
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebook::{AnchorKind, LocationType, ModeType, PurposeCategory};
    use crate::model::{HomeAnchor, PrimaryDestination, StopPurposeCounts, TourKind};
    use chrono::NaiveDate;

    fn tour(trip_count: u32, any_origin: bool, any_destination: bool) -> Tour {
        let t = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Tour {
            tour_id: 10_100,
            hh_id: 1,
            person_id: 1,
            day_id: 1,
            tour_num: 1,
            subtour_num: 0,
            kind: TourKind::HomeBased,
            trip_ids: (1..=trip_count as i64).collect(),
            primary_purpose: Some(PurposeCategory::Work),
            primary_dest: Some(PrimaryDestination {
                trip_id: 1,
                purpose: PurposeCategory::Work,
                location: None,
                location_type: LocationType::Work,
                zone: None,
            }),
            origin_depart_time: t,
            dest_arrive_time: Some(t),
            dest_depart_time: Some(t),
            origin_arrive_time: t,
            o: None,
            d: None,
            o_location_type: LocationType::Home,
            d_location_type: LocationType::Home,
            o_zone: None,
            trip_count,
            stop_count: trip_count.saturating_sub(1),
            outbound_trip_count: 1,
            inbound_trip_count: trip_count.saturating_sub(1),
            stop_purposes: StopPurposeCounts::default(),
            subtour_count: 0,
            tour_mode: ModeType::Car,
            outbound_mode: Some(ModeType::Car),
            inbound_mode: Some(ModeType::Car),
            home_anchor: HomeAnchor {
                any_origin,
                any_destination,
            },
            single_trip_tour: trip_count < 2,
            category: TourCategory::Complete,
            data_quality: TourDataQuality::Valid,
            joint_tour_id: None,
        }
    }

    #[test]
    fn quality_flags_follow_priority_order() {
        assert_eq!(classify_quality(&tour(1, true, true)), TourDataQuality::LoopTrip);
        assert_eq!(classify_quality(&tour(1, true, false)), TourDataQuality::SingleTrip);
        assert_eq!(
            classify_quality(&tour(3, false, false)),
            TourDataQuality::MissingHomeAnchor
        );
        assert_eq!(classify_quality(&tour(2, true, true)), TourDataQuality::Valid);

        let mut t = tour(2, true, true);
        t.primary_purpose = Some(PurposeCategory::ChangeMode);
        assert_eq!(classify_quality(&t), TourDataQuality::ChangeMode);

        let mut t = tour(2, true, true);
        t.tour_num = 0;
        assert_eq!(classify_quality(&t), TourDataQuality::Indeterminate);
    }

    #[test]
    fn subtours_need_no_home_anchor() {
        let mut t = tour(2, false, false);
        t.kind = TourKind::AnchorBased {
            parent_tour_id: 10_100,
            anchor: AnchorKind::Work,
        };
        assert_eq!(classify_quality(&t), TourDataQuality::Valid);
    }

    #[test]
    fn broken_tours_become_partial_both() {
        let mut tours = vec![tour(1, true, false), tour(1, true, true), tour(2, true, true)];
        let summary = validate_tours(&mut tours, &HashMap::new());

        assert_eq!(tours[0].category, TourCategory::PartialBoth);
        // loops keep their structure
        assert_eq!(tours[1].category, TourCategory::Complete);
        assert_eq!(tours[2].category, TourCategory::Complete);

        assert_eq!(summary.len(), TourDataQuality::ALL.len());
        assert_eq!(summary[&TourDataQuality::SingleTrip], 1);
        assert_eq!(summary[&TourDataQuality::LoopTrip], 1);
        assert_eq!(summary[&TourDataQuality::Valid], 1);
        assert_eq!(summary[&TourDataQuality::Indeterminate], 0);
    }
}
