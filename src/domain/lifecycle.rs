//! Trip state machine and capacity ledger arithmetic.
//!
//! The ledger functions are pure; `services::trip` applies them through a
//! compare-and-swap on the stored `remaining_capacity_kg` so that two
//! concurrent bookings can never jointly oversell a trip.

use sea_orm::prelude::DateTimeWithTimeZone;

use crate::domain::mapping::trip_status_token;
use crate::entities::trip::TripStatus;
use crate::error::{AppError, AppResult};

/// Allowed status transitions: planned → scheduled → active → completed,
/// with cancelled/delayed branching off scheduled or active. A delayed
/// trip may resume or be cancelled; completed and cancelled are terminal.
pub fn can_transition(from: TripStatus, to: TripStatus) -> bool {
    use TripStatus::*;

    matches!(
        (from, to),
        (Planned, Scheduled)
            | (Scheduled, Active)
            | (Scheduled, Cancelled)
            | (Scheduled, Delayed)
            | (Active, Completed)
            | (Active, Cancelled)
            | (Active, Delayed)
            | (Delayed, Active)
            | (Delayed, Cancelled)
    )
}

pub fn transition_error(from: TripStatus, to: TripStatus) -> AppError {
    AppError::BadRequest(format!(
        "cannot transition trip from {} to {}",
        trip_status_token(from),
        trip_status_token(to)
    ))
}

pub fn is_terminal(status: TripStatus) -> bool {
    matches!(status, TripStatus::Completed | TripStatus::Cancelled)
}

/// Pre-departure states still open for bookings.
pub fn is_bookable(status: TripStatus) -> bool {
    matches!(status, TripStatus::Planned | TripStatus::Scheduled)
}

pub fn validate_new_trip(
    departure_time: DateTimeWithTimeZone,
    arrival_time: DateTimeWithTimeZone,
    total_capacity_kg: f64,
) -> AppResult<()> {
    if arrival_time <= departure_time {
        return Err(AppError::InvalidDates(
            "arrival time must be after departure time".to_string(),
        ));
    }

    if total_capacity_kg < 1.0 {
        return Err(AppError::InvalidCapacity(format!(
            "total capacity must be at least 1 kg, got {total_capacity_kg}"
        )));
    }

    Ok(())
}

/// Check-and-decrement for a booking of `weight_kg`.
pub fn debit(remaining_kg: f64, weight_kg: f64) -> AppResult<f64> {
    if weight_kg > remaining_kg {
        return Err(AppError::CapacityExceeded(format!(
            "requested {weight_kg} kg exceeds remaining capacity of {remaining_kg} kg"
        )));
    }

    Ok(remaining_kg - weight_kg)
}

/// Restore `weight_kg` after a booking cancellation. A release can only
/// overshoot `total_kg` if the ledger was already inconsistent; clamp and
/// log rather than corrupting the invariant.
pub fn credit(remaining_kg: f64, total_kg: f64, weight_kg: f64) -> f64 {
    let restored = remaining_kg + weight_kg;
    if restored > total_kg {
        tracing::warn!(
            remaining_kg,
            total_kg,
            weight_kg,
            "capacity release overshoots total, clamping"
        );
        return total_kg;
    }
    restored
}

/// Booking price: base plus per-kilogram rate, floored at the trip minimum.
pub fn booking_price(base: f64, per_kg: f64, minimum: f64, weight_kg: f64) -> f64 {
    (base + per_kg * weight_kg).max(minimum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn now() -> DateTimeWithTimeZone {
        Utc::now().fixed_offset()
    }

    #[test]
    fn happy_path_transitions() {
        assert!(can_transition(TripStatus::Planned, TripStatus::Scheduled));
        assert!(can_transition(TripStatus::Scheduled, TripStatus::Active));
        assert!(can_transition(TripStatus::Active, TripStatus::Completed));
    }

    #[test]
    fn side_branches_from_scheduled_and_active() {
        for from in [TripStatus::Scheduled, TripStatus::Active] {
            assert!(can_transition(from, TripStatus::Cancelled));
            assert!(can_transition(from, TripStatus::Delayed));
        }
        assert!(can_transition(TripStatus::Delayed, TripStatus::Active));
        assert!(can_transition(TripStatus::Delayed, TripStatus::Cancelled));
    }

    #[test]
    fn no_skipping_and_no_leaving_terminal_states() {
        assert!(!can_transition(TripStatus::Planned, TripStatus::Active));
        assert!(!can_transition(TripStatus::Planned, TripStatus::Completed));
        assert!(!can_transition(TripStatus::Completed, TripStatus::Active));
        assert!(!can_transition(TripStatus::Cancelled, TripStatus::Scheduled));
        assert!(!can_transition(TripStatus::Delayed, TripStatus::Completed));
    }

    #[test]
    fn transition_error_names_both_states() {
        let err = transition_error(TripStatus::Completed, TripStatus::Active);
        assert!(err.to_string().contains("completed"));
        assert!(err.to_string().contains("active"));
    }

    #[test]
    fn equal_or_inverted_times_are_rejected() {
        let departure = now();

        let err = validate_new_trip(departure, departure, 100.0).unwrap_err();
        assert_eq!(err.code(), "INVALID_DATES");

        let err = validate_new_trip(departure, departure - Duration::hours(2), 100.0).unwrap_err();
        assert_eq!(err.code(), "INVALID_DATES");

        assert!(validate_new_trip(departure, departure + Duration::hours(2), 100.0).is_ok());
    }

    #[test]
    fn capacity_below_one_kilogram_is_rejected() {
        let departure = now();
        let arrival = departure + Duration::hours(4);

        let err = validate_new_trip(departure, arrival, 0.0).unwrap_err();
        assert_eq!(err.code(), "INVALID_CAPACITY");

        assert!(validate_new_trip(departure, arrival, 1.0).is_ok());
    }

    #[test]
    fn oversell_is_rejected_on_the_second_booking() {
        // totalCapacity=100, two bookings of 60 kg: only one fits
        let after_first = debit(100.0, 60.0).unwrap();
        assert_eq!(after_first, 40.0);

        let err = debit(after_first, 60.0).unwrap_err();
        assert_eq!(err.code(), "CAPACITY_EXCEEDED");
    }

    #[test]
    fn ledger_stays_within_bounds() {
        let mut remaining = 100.0;
        remaining = debit(remaining, 100.0).unwrap();
        assert_eq!(remaining, 0.0);
        assert_eq!(debit(remaining, 0.1).unwrap_err().code(), "CAPACITY_EXCEEDED");

        remaining = credit(remaining, 100.0, 60.0);
        assert_eq!(remaining, 60.0);
    }

    #[test]
    fn release_clamps_at_total() {
        assert_eq!(credit(90.0, 100.0, 60.0), 100.0);
        assert_eq!(credit(40.0, 100.0, 60.0), 100.0);
    }

    #[test]
    fn price_is_floored_at_the_minimum() {
        assert_eq!(booking_price(10.0, 2.0, 50.0, 5.0), 50.0);
        assert_eq!(booking_price(10.0, 2.0, 50.0, 30.0), 70.0);
    }
}
