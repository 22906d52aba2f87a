mod common;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use common::*;
use tourkit::codebook::{PersonCategory, PurposeCategory};
use tourkit::frames::{read_households, read_persons, read_trips};
use tourkit::{TourConfig, TourExtraction, TourExtractor};

fn extract_survey() -> (Vec<tourkit::Trip>, TourExtraction) {
    init();
    let trips = read_trips(&trips_frame(&survey())).unwrap();
    let persons = read_persons(&workers_frame(&[101, 102, 201, 202])).unwrap();
    let households = read_households(&households_frame()).unwrap();
    let extraction = TourExtractor::new(TourConfig::default())
        .unwrap()
        .extract(&trips, &persons, &households)
        .unwrap();
    (trips, extraction)
}

#[test]
fn every_trip_belongs_to_exactly_one_tour() {
    let (trips, extraction) = extract_survey();

    let total: u32 = extraction.tours.iter().map(|t| t.trip_count).sum();
    assert_eq!(total as usize, trips.len());

    let mut seen = BTreeSet::new();
    for tour in &extraction.tours {
        for id in &tour.trip_ids {
            assert!(seen.insert(*id), "trip {id} is in two tours");
        }
    }
    assert_eq!(seen.len(), trips.len());

    assert_eq!(extraction.annotations.len(), trips.len());
    for (annotation, trip) in extraction.annotations.iter().zip(&trips) {
        assert_eq!(annotation.trip_id, trip.trip_id);
    }
}

#[test]
fn tour_numbers_are_consecutive_per_person_day() {
    let (_, extraction) = extract_survey();

    let mut per_day: BTreeMap<(i64, i64), BTreeSet<u32>> = BTreeMap::new();
    for tour in extraction.tours.iter().filter(|t| !t.kind.is_subtour()) {
        per_day
            .entry((tour.person_id, tour.day_id))
            .or_default()
            .insert(tour.tour_num);
    }
    for (key, nums) in per_day {
        let expected: BTreeSet<u32> = (1..=nums.len() as u32).collect();
        assert_eq!(nums, expected, "person-day {key:?}");
    }
}

#[test]
fn subtours_lie_inside_their_parent() {
    let (_, extraction) = extract_survey();
    let by_id: HashMap<i64, &tourkit::Tour> =
        extraction.tours.iter().map(|t| (t.tour_id, t)).collect();

    let subtours: Vec<_> = extraction
        .tours
        .iter()
        .filter(|t| t.kind.is_subtour())
        .collect();
    assert_eq!(subtours.len(), extraction.stats.subtours);
    assert!(!subtours.is_empty());

    for sub in subtours {
        let parent = by_id[&sub.parent_tour_id().unwrap()];
        assert!(!parent.kind.is_subtour());
        assert_eq!(parent.person_id, sub.person_id);
        assert_eq!(sub.tour_id / 100, parent.tour_id / 100);
        assert!(parent.origin_depart_time < sub.origin_depart_time);
        assert!(sub.origin_arrive_time < parent.origin_arrive_time);
        assert!(parent.subtour_count >= sub.subtour_num);
    }
}

#[test]
fn rerunning_on_annotated_output_is_stable() {
    init();
    let extractor = TourExtractor::new(TourConfig::default()).unwrap();
    let persons = workers_frame(&[101, 102, 201, 202]);
    let households = households_frame();

    let (trips_once, tours_once) = extractor
        .extract_frames(&trips_frame(&survey()), &persons, &households)
        .unwrap();
    let (trips_twice, tours_twice) = extractor
        .extract_frames(&trips_once, &persons, &households)
        .unwrap();

    assert!(trips_once.equals_missing(&trips_twice));
    assert!(tours_once.equals_missing(&tours_twice));
}

#[test]
fn input_order_does_not_change_tours() {
    let (_, forward) = extract_survey();

    let mut rows = survey();
    rows.reverse();
    let trips = read_trips(&trips_frame(&rows)).unwrap();
    let persons = read_persons(&workers_frame(&[202, 201, 102, 101])).unwrap();
    let households = read_households(&households_frame()).unwrap();
    let backward = TourExtractor::new(TourConfig::default())
        .unwrap()
        .extract(&trips, &persons, &households)
        .unwrap();

    assert_eq!(forward.tours, backward.tours);
    assert_eq!(forward.stats, backward.stats);
}

#[test]
fn stats_count_the_survey() {
    let (_, extraction) = extract_survey();
    let stats = extraction.stats;
    assert_eq!(stats.persons, 4);
    assert_eq!(stats.trips, 13);
    assert_eq!(stats.person_days, 5);
    assert_eq!(stats.tours, 6);
    assert_eq!(stats.subtours, 1);
    assert_eq!(extraction.quality.values().sum::<usize>(), 7);
}

#[test]
fn primary_destination_follows_the_priority_table() {
    init();
    // shop, work and a meal stop on one home-based tour
    let rows = [
        leg(1, 101, 1, (HOME, P_HOME), (SHOP, P_SHOP), 480, 490),
        leg(2, 101, 1, (SHOP, P_SHOP), (WORK, P_WORK), 500, 520),
        leg(3, 101, 1, (WORK, P_WORK), (LUNCH, P_MEAL), 720, 730),
        leg(4, 101, 1, (LUNCH, P_MEAL), (HOME, P_HOME), 800, 810),
    ];
    let trips = read_trips(&trips_frame(&rows)).unwrap();
    let persons = read_persons(&workers_frame(&[101])).unwrap();
    let households = read_households(&households_frame()).unwrap();

    let primary_with = |config: TourConfig| {
        let extraction = TourExtractor::new(config)
            .unwrap()
            .extract(&trips, &persons, &households)
            .unwrap();
        assert_eq!(extraction.tours.len(), 1);
        let dest = extraction.tours[0].primary_dest.clone().unwrap();
        (dest.purpose, dest.trip_id)
    };

    assert_eq!(primary_with(TourConfig::default()), (PurposeCategory::Work, 2));

    for (purpose, trip_id) in [
        (PurposeCategory::Shop, 1),
        (PurposeCategory::Work, 2),
        (PurposeCategory::Meal, 3),
    ] {
        let mut config = TourConfig::default();
        config
            .purpose_priority
            .set(PersonCategory::Worker, purpose, 0);
        assert_eq!(primary_with(config), (purpose, trip_id), "promoted {purpose:?}");
    }

    // demoting the winner hands the tour to the next best stop
    let mut config = TourConfig::default();
    config
        .purpose_priority
        .set(PersonCategory::Worker, PurposeCategory::Work, 9);
    config
        .purpose_priority
        .set(PersonCategory::Worker, PurposeCategory::Meal, 3);
    assert_eq!(primary_with(config), (PurposeCategory::Meal, 3));

    // a purpose the tour never visits changes nothing
    let mut config = TourConfig::default();
    config
        .purpose_priority
        .set(PersonCategory::Worker, PurposeCategory::Escort, 0);
    assert_eq!(primary_with(config), (PurposeCategory::Work, 2));
}
