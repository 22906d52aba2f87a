use chrono::NaiveDateTime;

use crate::codebook::{ModeType, PurposeCategory, TourCategory, TourDataQuality, TourDirection};
use crate::config::TourConfig;
use crate::error::TourError;
use crate::location::TripLocations;
use crate::model::{
    near, HomeAnchor, PersonLocations, PrimaryDestination, StopPurposeCounts, Tour, TourKind,
    Trip,
};
use crate::subtour::anchor_ends;

/// A tour needs at least one trip out and one back.
pub const MIN_TRIPS_FOR_VALID_TOUR: u32 = 2;

/// One member trip of the tour being aggregated, in travel order.
#[derive(Debug, Clone, Copy)]
pub struct TourTrip<'a> {
    pub trip: &'a Trip,
    pub locations: TripLocations,
    /// Minutes spent at the destination before the next trip of the day.
    pub activity_minutes: f64,
}

/// Identity of the tour record being built.
#[derive(Debug, Clone, Copy)]
pub struct TourSpec<'a> {
    pub tour_id: i64,
    pub tour_num: u32,
    pub subtour_num: u32,
    pub kind: TourKind,
    pub person: &'a PersonLocations,
}

/// Tour record plus the half-tour direction of each member trip, judged
/// against this tour's own destination times.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedTour {
    pub tour: Tour,
    pub directions: Vec<TourDirection>,
}

/// Minutes from `arrive` until `next_depart`, or the configured default for
/// the last trip of the day.
pub fn activity_minutes(
    arrive: NaiveDateTime,
    next_depart: Option<NaiveDateTime>,
    default_minutes: f64,
) -> f64 {
    match next_depart {
        Some(next) => (next - arrive).num_seconds() as f64 / 60.0,
        None => default_minutes,
    }
}

/// Direction of a trip relative to its tour's primary destination.
///
/// Missing destination times (single-trip tours) leave the trip outbound.
pub fn trip_direction(
    subtour_num: u32,
    depart: NaiveDateTime,
    arrive: NaiveDateTime,
    dest_arrive: Option<NaiveDateTime>,
    dest_depart: Option<NaiveDateTime>,
) -> TourDirection {
    if subtour_num > 0 {
        return TourDirection::Subtour;
    }
    if dest_arrive.is_some_and(|t| arrive <= t) {
        TourDirection::Outbound
    } else if dest_depart.is_some_and(|t| depart >= t) {
        TourDirection::Inbound
    } else {
        TourDirection::Outbound
    }
}

/// Highest-ranked mode; ties go to the later trip.
fn dominant_mode<'t>(
    config: &TourConfig,
    trips: impl Iterator<Item = &'t Trip>,
) -> Option<ModeType> {
    let mut best: Option<(i32, ModeType)> = None;
    for trip in trips {
        let rank = config.mode_hierarchy.rank(trip.mode);
        if best.map_or(true, |(r, _)| rank >= r) {
            best = Some((rank, trip.mode));
        }
    }
    best.map(|(_, mode)| mode)
}

/// Index of the primary destination trip among the non-last trips: lowest
/// purpose priority, then longest activity, then earliest.
fn primary_index(priorities: &[i32], trips: &[TourTrip<'_>]) -> Option<usize> {
    let candidates = trips.len().checked_sub(1)?;
    let mut best: Option<usize> = None;
    for idx in 0..candidates {
        best = match best {
            None => Some(idx),
            Some(b) => {
                let better = priorities[idx] < priorities[b]
                    || (priorities[idx] == priorities[b]
                        && trips[idx].activity_minutes > trips[b].activity_minutes);
                Some(if better { idx } else { b })
            }
        };
    }
    best
}

/// Arrival at and departure from the primary destination.
fn destination_times(
    config: &TourConfig,
    trips: &[TourTrip<'_>],
    primary: &PrimaryDestination,
) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
    let non_last = &trips[..trips.len().saturating_sub(1)];
    let threshold = config.distance_thresholds.for_location(primary.location_type);

    let arrive = non_last
        .iter()
        .filter(|t| near(t.trip.d, primary.location, threshold))
        .map(|t| t.trip.arrive_time)
        .max()
        .or_else(|| non_last.first().map(|t| t.trip.arrive_time));

    let depart = trips
        .iter()
        .filter(|t| near(t.trip.o, primary.location, threshold))
        .map(|t| t.trip.depart_time)
        .max()
        .or_else(|| non_last.last().map(|t| t.trip.depart_time));

    (arrive, depart)
}

fn tour_category(
    config: &TourConfig,
    spec: &TourSpec<'_>,
    first: &TourTrip<'_>,
    last: &TourTrip<'_>,
) -> TourCategory {
    match spec.kind {
        TourKind::HomeBased => {
            TourCategory::from_ends(first.locations.flags.o_home, last.locations.flags.d_home)
        }
        TourKind::AnchorBased { anchor, .. } => {
            let usual_only = config.detect_usual_workplace;
            let start = anchor_ends(&[first.locations], anchor, usual_only);
            let end = anchor_ends(&[last.locations], anchor, usual_only);
            TourCategory::from_ends(start[0].o_at, end[0].d_at)
        }
    }
}

/// Aggregate the member trips of one tour into a tour record.
///
/// `trips` must be non-empty and in travel order. Subtour trips are not
/// members of their parent; each subtour is aggregated on its own.
pub fn aggregate_tour(
    config: &TourConfig,
    spec: &TourSpec<'_>,
    trips: &[TourTrip<'_>],
) -> Result<AggregatedTour, TourError> {
    let (Some(first), Some(last)) = (trips.first(), trips.last()) else {
        return Err(TourError::Invariant(format!(
            "tour {} has no trips",
            spec.tour_id
        )));
    };

    let priorities = trips
        .iter()
        .map(|t| {
            config
                .purpose_priority
                .priority(spec.person.category, t.trip.d_purpose)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let primary_idx = primary_index(&priorities, trips);
    let primary_dest = primary_idx.map(|idx| {
        let t = &trips[idx];
        PrimaryDestination {
            trip_id: t.trip.trip_id,
            purpose: t.trip.d_purpose,
            location: t.trip.d,
            location_type: t.locations.d_type,
            zone: t.trip.d_zone,
        }
    });

    let (dest_arrive_time, dest_depart_time) = match &primary_dest {
        Some(primary) => destination_times(config, trips, primary),
        None => (None, None),
    };

    let directions: Vec<TourDirection> = trips
        .iter()
        .map(|t| {
            trip_direction(
                0,
                t.trip.depart_time,
                t.trip.arrive_time,
                dest_arrive_time,
                dest_depart_time,
            )
        })
        .collect();

    let half = |dir: TourDirection| {
        trips
            .iter()
            .zip(&directions)
            .filter(move |(_, d)| **d == dir)
            .map(|(t, _)| t.trip)
    };

    let mut stop_purposes = StopPurposeCounts::default();
    for (idx, t) in trips[..trips.len() - 1].iter().enumerate() {
        if Some(idx) != primary_idx {
            stop_purposes.add(t.trip.d_purpose);
        }
    }

    let trip_count = trips.len() as u32;
    let tour = Tour {
        tour_id: spec.tour_id,
        hh_id: first.trip.hh_id,
        person_id: first.trip.person_id,
        day_id: first.trip.day_id,
        tour_num: spec.tour_num,
        subtour_num: spec.subtour_num,
        kind: spec.kind,
        trip_ids: trips.iter().map(|t| t.trip.trip_id).collect(),

        primary_purpose: primary_dest.as_ref().map(|p| p.purpose),
        primary_dest,

        origin_depart_time: trips
            .iter()
            .map(|t| t.trip.depart_time)
            .min()
            .unwrap_or(first.trip.depart_time),
        dest_arrive_time,
        dest_depart_time,
        origin_arrive_time: trips
            .iter()
            .map(|t| t.trip.arrive_time)
            .max()
            .unwrap_or(last.trip.arrive_time),

        o: first.trip.o,
        d: last.trip.d,
        o_location_type: first.locations.o_type,
        d_location_type: last.locations.d_type,
        o_zone: first.trip.o_zone,

        trip_count,
        stop_count: trip_count - 1,
        outbound_trip_count: half(TourDirection::Outbound).count() as u32,
        inbound_trip_count: half(TourDirection::Inbound).count() as u32,
        stop_purposes,
        subtour_count: 0,

        tour_mode: dominant_mode(config, trips.iter().map(|t| t.trip))
            .unwrap_or(first.trip.mode),
        outbound_mode: dominant_mode(config, half(TourDirection::Outbound)),
        inbound_mode: dominant_mode(config, half(TourDirection::Inbound)),

        home_anchor: HomeAnchor {
            any_origin: trips.iter().any(|t| t.locations.flags.o_home),
            any_destination: trips.iter().any(|t| t.locations.flags.d_home),
        },
        single_trip_tour: trip_count < MIN_TRIPS_FOR_VALID_TOUR,
        category: tour_category(config, spec, first, last),
        data_quality: TourDataQuality::Valid,
        joint_tour_id: None,
    };

    Ok(AggregatedTour { tour, directions })
}

/// True when the primary purpose signals a trip-linking failure.
pub fn is_change_mode(tour: &Tour) -> bool {
    tour.primary_purpose == Some(PurposeCategory::ChangeMode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebook::{AnchorKind, PersonCategory, PersonType};
    use crate::location::classify_trip;
    use crate::model::LatLon;
    use chrono::{NaiveDate, NaiveDateTime};

    const HOME: LatLon = LatLon { lat: 37.7749, lon: -122.4194 };
    const WORK: LatLon = LatLon { lat: 37.7849, lon: -122.4094 };
    const CAFE: LatLon = LatLon { lat: 37.7800, lon: -122.4000 };
    const SHOP: LatLon = LatLon { lat: 37.7700, lon: -122.4300 };

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn person() -> PersonLocations {
        PersonLocations {
            person_id: 1,
            hh_id: 1,
            person_type: PersonType::FullTimeWorker,
            category: PersonCategory::Worker,
            home: Some(HOME),
            work: Some(WORK),
            school: None,
        }
    }

    struct Leg {
        o: LatLon,
        d: LatLon,
        o_purpose: PurposeCategory,
        d_purpose: PurposeCategory,
        depart: NaiveDateTime,
        arrive: NaiveDateTime,
        mode: ModeType,
    }

    fn leg(
        (o, o_purpose): (LatLon, PurposeCategory),
        (d, d_purpose): (LatLon, PurposeCategory),
        depart: NaiveDateTime,
        arrive: NaiveDateTime,
        mode: ModeType,
    ) -> Leg {
        Leg { o, d, o_purpose, d_purpose, depart, arrive, mode }
    }

    fn trips(legs: &[Leg]) -> Vec<Trip> {
        legs.iter()
            .enumerate()
            .map(|(i, l)| Trip {
                row: i,
                trip_id: i as i64 + 1,
                hh_id: 1,
                person_id: 1,
                day_id: 1,
                o: Some(l.o),
                d: Some(l.d),
                o_zone: None,
                d_zone: None,
                o_purpose: l.o_purpose,
                d_purpose: l.d_purpose,
                mode: l.mode,
                depart_time: l.depart,
                arrive_time: l.arrive,
                joint_trip_id: None,
            })
            .collect()
    }

    fn members<'a>(
        config: &TourConfig,
        person: &PersonLocations,
        trips: &'a [Trip],
    ) -> Vec<TourTrip<'a>> {
        trips
            .iter()
            .enumerate()
            .map(|(i, trip)| TourTrip {
                trip,
                locations: classify_trip(trip, person, &config.distance_thresholds),
                activity_minutes: activity_minutes(
                    trip.arrive_time,
                    trips.get(i + 1).map(|n| n.depart_time),
                    config.default_activity_duration_minutes,
                ),
            })
            .collect()
    }

    fn aggregate(config: &TourConfig, kind: TourKind, trips: &[Trip]) -> AggregatedTour {
        let person = person();
        let m = members(config, &person, trips);
        let spec = TourSpec {
            tour_id: 10_100,
            tour_num: 1,
            subtour_num: 0,
            kind,
            person: &person,
        };
        aggregate_tour(config, &spec, &m).unwrap()
    }

    use PurposeCategory as P;

    #[test]
    fn work_commute_is_a_complete_work_tour() {
        let t = trips(&[
            leg((HOME, P::Home), (WORK, P::Work), at(8, 0), at(8, 30), ModeType::Car),
            leg((WORK, P::Work), (HOME, P::Home), at(17, 0), at(17, 30), ModeType::Car),
        ]);
        let agg = aggregate(&TourConfig::default(), TourKind::HomeBased, &t);
        let tour = &agg.tour;

        assert_eq!(tour.primary_purpose, Some(P::Work));
        assert_eq!(tour.category, TourCategory::Complete);
        assert_eq!(tour.dest_arrive_time, Some(at(8, 30)));
        assert_eq!(tour.dest_depart_time, Some(at(17, 0)));
        assert_eq!(agg.directions, vec![TourDirection::Outbound, TourDirection::Inbound]);
        assert_eq!((tour.outbound_trip_count, tour.inbound_trip_count), (1, 1));
        assert_eq!(tour.tour_mode, ModeType::Car);
        assert_eq!(tour.stop_count, 1);
        assert_eq!(tour.stop_purposes.total(), 0);
        assert!(!tour.single_trip_tour);
    }

    #[test]
    fn priority_beats_duration_and_stops_are_counted() {
        // shop stop on the way to work, cafe on the way home
        let t = trips(&[
            leg((HOME, P::Home), (SHOP, P::Shop), at(7, 0), at(7, 10), ModeType::Walk),
            leg((SHOP, P::Shop), (WORK, P::Work), at(7, 20), at(7, 40), ModeType::Transit),
            leg((WORK, P::Work), (CAFE, P::Meal), at(16, 0), at(16, 10), ModeType::Walk),
            leg((CAFE, P::Meal), (HOME, P::Home), at(19, 0), at(19, 30), ModeType::Transit),
        ]);
        let agg = aggregate(&TourConfig::default(), TourKind::HomeBased, &t);
        let tour = &agg.tour;

        assert_eq!(tour.primary_purpose, Some(P::Work));
        assert_eq!(tour.primary_dest.as_ref().unwrap().trip_id, 2);
        assert_eq!(tour.stop_purposes.shop, 1);
        assert_eq!(tour.stop_purposes.meal, 1);
        assert_eq!(
            agg.directions,
            vec![
                TourDirection::Outbound,
                TourDirection::Outbound,
                TourDirection::Inbound,
                TourDirection::Inbound
            ]
        );
        assert_eq!(tour.tour_mode, ModeType::Transit);
        assert_eq!(tour.outbound_mode, Some(ModeType::Transit));
        assert_eq!(tour.inbound_mode, Some(ModeType::Transit));
    }

    #[test]
    fn equal_priority_goes_to_longest_activity() {
        let t = trips(&[
            leg((HOME, P::Home), (SHOP, P::Shop), at(9, 0), at(9, 10), ModeType::Car),
            leg((SHOP, P::Shop), (CAFE, P::Meal), at(9, 30), at(9, 40), ModeType::Car),
            leg((CAFE, P::Meal), (HOME, P::Home), at(12, 0), at(12, 20), ModeType::Car),
        ]);
        let agg = aggregate(&TourConfig::default(), TourKind::HomeBased, &t);
        assert_eq!(agg.tour.primary_purpose, Some(P::Meal));
    }

    #[test]
    fn adding_a_higher_priority_stop_takes_over() {
        let base = [
            leg((HOME, P::Home), (SHOP, P::Shop), at(9, 0), at(9, 10), ModeType::Car),
            leg((SHOP, P::Shop), (HOME, P::Home), at(11, 0), at(11, 10), ModeType::Car),
        ];
        let config = TourConfig::default();
        let before = aggregate(&config, TourKind::HomeBased, &trips(&base));
        assert_eq!(before.tour.primary_purpose, Some(P::Shop));

        let extended = trips(&[
            leg((HOME, P::Home), (SHOP, P::Shop), at(9, 0), at(9, 10), ModeType::Car),
            leg((SHOP, P::Shop), (WORK, P::Work), at(9, 20), at(9, 40), ModeType::Car),
            leg((WORK, P::Work), (HOME, P::Home), at(11, 0), at(11, 10), ModeType::Car),
        ]);
        let after = aggregate(&config, TourKind::HomeBased, &extended);
        assert_eq!(after.tour.primary_purpose, Some(P::Work));
    }

    #[test]
    fn single_trip_tour_has_no_primary_destination() {
        let t = trips(&[leg(
            (HOME, P::Home),
            (SHOP, P::Shop),
            at(9, 0),
            at(9, 10),
            ModeType::Bike,
        )]);
        let agg = aggregate(&TourConfig::default(), TourKind::HomeBased, &t);
        let tour = &agg.tour;
        assert!(tour.single_trip_tour);
        assert_eq!(tour.primary_purpose, None);
        assert_eq!(tour.dest_arrive_time, None);
        assert_eq!(tour.category, TourCategory::PartialEnd);
        assert_eq!(agg.directions, vec![TourDirection::Outbound]);
        assert_eq!(tour.outbound_mode, Some(ModeType::Bike));
        assert_eq!(tour.inbound_mode, None);
    }

    #[test]
    fn subtour_category_is_judged_against_the_anchor() {
        let t = trips(&[
            leg((WORK, P::Work), (CAFE, P::Meal), at(12, 0), at(12, 10), ModeType::Walk),
            leg((CAFE, P::Meal), (WORK, P::Work), at(12, 50), at(13, 0), ModeType::Walk),
        ]);
        let kind = TourKind::AnchorBased {
            parent_tour_id: 10_100,
            anchor: AnchorKind::Work,
        };
        let agg = aggregate(&TourConfig::default(), kind, &t);
        assert_eq!(agg.tour.category, TourCategory::Complete);
        assert_eq!(agg.tour.primary_purpose, Some(P::Meal));
        assert_eq!(agg.directions, vec![TourDirection::Outbound, TourDirection::Inbound]);
        assert!(!agg.tour.home_anchor.any_origin);
    }

    #[test]
    fn unmapped_purpose_is_fatal() {
        let mut config = TourConfig::default();
        config
            .purpose_priority
            .0
            .get_mut(&PersonCategory::Worker)
            .unwrap()
            .remove(&P::Shop);
        let t = trips(&[
            leg((HOME, P::Home), (SHOP, P::Shop), at(9, 0), at(9, 10), ModeType::Car),
            leg((SHOP, P::Shop), (HOME, P::Home), at(11, 0), at(11, 10), ModeType::Car),
        ]);
        let person = person();
        let m = members(&config, &person, &t);
        let spec = TourSpec {
            tour_id: 1,
            tour_num: 1,
            subtour_num: 0,
            kind: TourKind::HomeBased,
            person: &person,
        };
        let err = aggregate_tour(&config, &spec, &m).unwrap_err();
        assert!(matches!(err, TourError::UnmappedPurpose { purpose: P::Shop, .. }));
    }

    #[test]
    fn direction_rule() {
        assert_eq!(
            trip_direction(2, at(9, 0), at(9, 5), None, None),
            TourDirection::Subtour
        );
        assert_eq!(
            trip_direction(0, at(9, 0), at(9, 5), Some(at(10, 0)), Some(at(12, 0))),
            TourDirection::Outbound
        );
        assert_eq!(
            trip_direction(0, at(12, 0), at(12, 5), Some(at(10, 0)), Some(at(12, 0))),
            TourDirection::Inbound
        );
        // between arrival and departure at the destination
        assert_eq!(
            trip_direction(0, at(10, 30), at(11, 0), Some(at(10, 0)), Some(at(12, 0))),
            TourDirection::Outbound
        );
    }

    #[test]
    fn default_duration_applies_to_last_trip() {
        assert_eq!(activity_minutes(at(9, 0), Some(at(9, 45)), 240.0), 45.0);
        assert_eq!(activity_minutes(at(9, 0), None, 240.0), 240.0);
    }
}
