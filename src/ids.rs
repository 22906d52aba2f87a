//! Hierarchical tour ids.
//!
//! - home-based tour: `(day_id * 100 + tour_num) * 100`
//! - subtour: parent tour id + `subtour_num`
//! - joint tour: `hh_id * 100 + joint_tour_num`
//!
//! The two low digits of a home-based tour id are therefore always zero,
//! and a tour id alone tells a subtour from its parent.

use crate::error::TourError;

/// Width of one id digit slot.
pub const SLOT: i64 = 100;

fn slot(value: u32, what: &str, min: u32) -> Result<i64, TourError> {
    if value < min || i64::from(value) >= SLOT {
        return Err(TourError::IdOverflow(format!(
            "{what} {value} does not fit in two digits"
        )));
    }
    Ok(i64::from(value))
}

pub fn home_tour_id(day_id: i64, tour_num: u32) -> Result<i64, TourError> {
    let tour_num = slot(tour_num, "tour_num", 1)?;
    day_id
        .checked_mul(SLOT)
        .and_then(|v| v.checked_add(tour_num))
        .and_then(|v| v.checked_mul(SLOT))
        .ok_or_else(|| TourError::IdOverflow(format!("day_id {day_id} is too large for a tour id")))
}

pub fn subtour_id(parent_tour_id: i64, subtour_num: u32) -> Result<i64, TourError> {
    let subtour_num = slot(subtour_num, "subtour_num", 0)?;
    parent_tour_id
        .checked_add(subtour_num)
        .ok_or_else(|| TourError::IdOverflow(format!("subtour of {parent_tour_id}")))
}

pub fn joint_tour_id(hh_id: i64, joint_tour_num: u32) -> Result<i64, TourError> {
    let joint_tour_num = slot(joint_tour_num, "joint_tour_num", 1)?;
    hh_id
        .checked_mul(SLOT)
        .and_then(|v| v.checked_add(joint_tour_num))
        .ok_or_else(|| TourError::IdOverflow(format!("hh_id {hh_id} is too large for a joint tour id")))
}
