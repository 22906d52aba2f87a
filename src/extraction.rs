//! End-to-end tour extraction over a survey's trips, persons and households.

use std::collections::{BTreeMap, HashMap};

use log::info;
use polars::prelude::DataFrame;

use crate::aggregation::{activity_minutes, aggregate_tour, TourSpec, TourTrip};
use crate::anchor::expand_anchor_period;
use crate::boundary::{assign_tour_numbers, TripEnds};
use crate::codebook::TourDirection;
use crate::config::TourConfig;
use crate::error::TourError;
use crate::frames;
use crate::ids;
use crate::joint::identify_joint_tours;
use crate::location::{classify_trip, TripLocations};
use crate::model::{Household, Person, PersonLocations, Tour, TourKind, Trip, TripAnnotation};
use crate::person_type::prepare_person_locations;
use crate::subtour::{anchor_ends, detect_subtours, SubtourScan};
use crate::validation::{validate_tours, QualitySummary, TripTrace};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub persons: usize,
    pub trips: usize,
    pub tours: usize,
    pub subtours: usize,
    pub person_days: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TourExtraction {
    /// Home-based tours and subtours, ordered by tour id.
    pub tours: Vec<Tour>,
    /// One annotation per input trip, in input order.
    pub annotations: Vec<TripAnnotation>,
    pub quality: QualitySummary,
    pub stats: ExtractionStats,
}

/// A trip of one person-day with its input position and classification.
struct DayTrip<'a> {
    input_idx: usize,
    trip: &'a Trip,
    locations: TripLocations,
    activity_minutes: f64,
}

impl<'a> DayTrip<'a> {
    fn member(&self) -> TourTrip<'a> {
        TourTrip {
            trip: self.trip,
            locations: self.locations,
            activity_minutes: self.activity_minutes,
        }
    }
}

/// Tours and per-trip annotations of one person-day.
#[derive(Default)]
struct DayOutput {
    tours: Vec<Tour>,
    annotations: Vec<(usize, TripAnnotation)>,
    subtours: usize,
    closed_subtours: usize,
}

pub struct TourExtractor {
    config: TourConfig,
}

impl TourExtractor {
    pub fn new(config: TourConfig) -> Result<Self, TourError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    pub fn extract(
        &self,
        trips: &[Trip],
        persons: &[Person],
        households: &[Household],
    ) -> Result<TourExtraction, TourError> {
        info!(
            "Extracting tours from {} trips of {} persons",
            trips.len(),
            persons.len()
        );

        let people = prepare_person_locations(persons, households, &self.config)?;

        // tour ids are built from day_id, so a day belongs to one person
        let mut day_owner: HashMap<i64, i64> = HashMap::new();
        let mut days: BTreeMap<(i64, i64), Vec<usize>> = BTreeMap::new();
        for (idx, trip) in trips.iter().enumerate() {
            if !people.contains_key(&trip.person_id) {
                return Err(TourError::MissingPerson {
                    person_id: trip.person_id,
                    trip_id: trip.trip_id,
                });
            }
            let owner = *day_owner.entry(trip.day_id).or_insert(trip.person_id);
            if owner != trip.person_id {
                return Err(TourError::InvalidTrip {
                    trip_id: trip.trip_id,
                    reason: format!(
                        "day_id {} of person {} already belongs to person {owner}",
                        trip.day_id, trip.person_id
                    ),
                });
            }
            days.entry((trip.person_id, trip.day_id)).or_default().push(idx);
        }
        let person_days = days.len();
        info!("Grouped trips into {person_days} person-days");

        let mut tours = Vec::new();
        let mut slots: Vec<Option<TripAnnotation>> = vec![None; trips.len()];
        let mut traces = HashMap::with_capacity(trips.len());
        let mut subtours = 0usize;
        let mut closed_subtours = 0usize;

        for ((person_id, _), mut idxs) in days {
            let person = people.get(&person_id).ok_or_else(|| {
                TourError::Invariant(format!("person {person_id} vanished after grouping"))
            })?;
            idxs.sort_by_key(|&i| trips[i].sort_key());

            let day: Vec<DayTrip<'_>> = idxs
                .iter()
                .enumerate()
                .map(|(pos, &i)| {
                    let trip = &trips[i];
                    let next_depart = idxs.get(pos + 1).map(|&n| trips[n].depart_time);
                    DayTrip {
                        input_idx: i,
                        trip,
                        locations: classify_trip(trip, person, &self.config.distance_thresholds),
                        activity_minutes: activity_minutes(
                            trip.arrive_time,
                            next_depart,
                            self.config.default_activity_duration_minutes,
                        ),
                    }
                })
                .collect();

            for d in &day {
                traces.insert(
                    d.trip.trip_id,
                    TripTrace {
                        trip_id: d.trip.trip_id,
                        depart_time: d.trip.depart_time,
                        o_home: d.locations.flags.o_home,
                        d_home: d.locations.flags.d_home,
                    },
                );
            }

            let out = self.extract_person_day(person, &day)?;
            subtours += out.subtours;
            closed_subtours += out.closed_subtours;
            tours.extend(out.tours);
            for (idx, annotation) in out.annotations {
                slots[idx] = Some(annotation);
            }
        }

        info!(
            "Built {} tours including {subtours} subtours ({closed_subtours} returned to their anchor)",
            tours.len()
        );

        let covered: u64 = tours.iter().map(|t| u64::from(t.trip_count)).sum();
        if covered != trips.len() as u64 {
            return Err(TourError::Invariant(format!(
                "tours cover {covered} trips but {} were given",
                trips.len()
            )));
        }

        let quality = validate_tours(&mut tours, &traces);

        let joint_ids = identify_joint_tours(&tours, trips)?;
        let mut joint_by_tour: HashMap<i64, i64> = HashMap::new();
        for (tour, joint_id) in tours.iter_mut().zip(joint_ids) {
            tour.joint_tour_id = joint_id;
            if let Some(joint_id) = joint_id {
                joint_by_tour.insert(tour.tour_id, joint_id);
            }
        }

        tours.sort_by_key(|t| t.tour_id);

        let annotations = slots
            .into_iter()
            .zip(trips)
            .map(|(slot, trip)| {
                let mut annotation = slot.ok_or_else(|| {
                    TourError::Invariant(format!("trip {} was not assigned a tour", trip.trip_id))
                })?;
                annotation.joint_tour_id = joint_by_tour.get(&annotation.tour_id).copied();
                Ok(annotation)
            })
            .collect::<Result<Vec<_>, TourError>>()?;

        let stats = ExtractionStats {
            persons: persons.len(),
            trips: trips.len(),
            tours: tours.len() - subtours,
            subtours,
            person_days,
        };
        info!(
            "Extraction complete: {} persons, {} person-days, {} trips, {} tours, {} subtours",
            stats.persons, stats.person_days, stats.trips, stats.tours, stats.subtours
        );

        Ok(TourExtraction {
            tours,
            annotations,
            quality,
            stats,
        })
    }

    fn extract_person_day(
        &self,
        person: &PersonLocations,
        day: &[DayTrip<'_>],
    ) -> Result<DayOutput, TourError> {
        let ends: Vec<TripEnds> = day
            .iter()
            .map(|d| TripEnds {
                day_id: d.trip.day_id,
                o_home: d.locations.flags.o_home,
                d_home: d.locations.flags.d_home,
            })
            .collect();
        let tour_nums = assign_tour_numbers(&ends, self.config.check_multiday_gaps);

        let mut out = DayOutput::default();
        let mut start = 0;
        while start < day.len() {
            let tour_num = tour_nums[start];
            let len = tour_nums[start..]
                .iter()
                .take_while(|&&n| n == tour_num)
                .count();
            self.extract_tour(person, tour_num, &day[start..start + len], &mut out)?;
            start += len;
        }
        Ok(out)
    }

    /// One home-based tour and the subtours nested in it.
    fn extract_tour(
        &self,
        person: &PersonLocations,
        tour_num: u32,
        trips: &[DayTrip<'_>],
        out: &mut DayOutput,
    ) -> Result<(), TourError> {
        let first = &trips[0];
        let tour_id = ids::home_tour_id(first.trip.day_id, tour_num)?;

        let usual: Vec<_> = trips.iter().map(|t| t.locations.usual).collect();
        let period = expand_anchor_period(&usual);
        let scan = match period {
            Some(period) => {
                let locations: Vec<_> = trips.iter().map(|t| t.locations).collect();
                let ends = anchor_ends(
                    &locations,
                    period.anchor,
                    self.config.detect_usual_workplace,
                );
                detect_subtours(&ends, Some(period))
            }
            None => SubtourScan {
                subtour_nums: vec![0; trips.len()],
                closed: 0,
            },
        };
        out.closed_subtours += scan.closed;
        let subtour_count = scan.subtour_count();
        let subtour_nums = scan.subtour_nums;

        let parent_trips: Vec<&DayTrip<'_>> = trips
            .iter()
            .zip(&subtour_nums)
            .filter(|(_, &n)| n == 0)
            .map(|(t, _)| t)
            .collect();
        let members: Vec<TourTrip<'_>> = parent_trips.iter().map(|t| t.member()).collect();
        let spec = TourSpec {
            tour_id,
            tour_num,
            subtour_num: 0,
            kind: TourKind::HomeBased,
            person,
        };
        let mut parent = aggregate_tour(&self.config, &spec, &members)?;
        parent.tour.subtour_count = subtour_count;

        for (t, direction) in parent_trips.iter().zip(&parent.directions) {
            out.annotations.push((
                t.input_idx,
                annotate(t, tour_id, tour_num, 0, tour_id, *direction),
            ));
        }
        out.tours.push(parent.tour);

        let Some(period) = period else {
            return Ok(());
        };
        for subtour_num in 1..=subtour_count {
            let sub_trips: Vec<&DayTrip<'_>> = trips
                .iter()
                .zip(&subtour_nums)
                .filter(|(_, &n)| n == subtour_num)
                .map(|(t, _)| t)
                .collect();
            if sub_trips.is_empty() {
                continue;
            }
            let sub_id = ids::subtour_id(tour_id, subtour_num)?;
            let members: Vec<TourTrip<'_>> = sub_trips.iter().map(|t| t.member()).collect();
            let spec = TourSpec {
                tour_id: sub_id,
                tour_num,
                subtour_num,
                kind: TourKind::AnchorBased {
                    parent_tour_id: tour_id,
                    anchor: period.anchor,
                },
                person,
            };
            let sub = aggregate_tour(&self.config, &spec, &members)?;
            for t in &sub_trips {
                out.annotations.push((
                    t.input_idx,
                    annotate(t, sub_id, tour_num, subtour_num, tour_id, TourDirection::Subtour),
                ));
            }
            out.tours.push(sub.tour);
            out.subtours += 1;
        }

        Ok(())
    }

    /// DataFrame entry point: returns the annotated trips and the tour table.
    pub fn extract_frames(
        &self,
        trips: &DataFrame,
        persons: &DataFrame,
        households: &DataFrame,
    ) -> Result<(DataFrame, DataFrame), TourError> {
        let trip_records = frames::read_trips(trips)?;
        let person_records = frames::read_persons(persons)?;
        let household_records = frames::read_households(households)?;

        let extraction = self.extract(&trip_records, &person_records, &household_records)?;

        let annotated = frames::annotate_trips(trips, &extraction.annotations)?;
        let tours = frames::tours_to_frame(&extraction.tours)?;
        Ok((annotated, tours))
    }
}

fn annotate(
    t: &DayTrip<'_>,
    tour_id: i64,
    tour_num: u32,
    subtour_num: u32,
    parent_tour_id: i64,
    direction: TourDirection,
) -> TripAnnotation {
    TripAnnotation {
        trip_id: t.trip.trip_id,
        tour_id,
        tour_num,
        subtour_num,
        parent_tour_id,
        direction,
        o_location_type: t.locations.o_type,
        d_location_type: t.locations.d_type,
        joint_tour_id: None,
    }
}
