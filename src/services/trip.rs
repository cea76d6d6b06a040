//! Trip lifecycle operations: creation, assignment, status transitions and
//! the capacity ledger. All writes to `remaining_capacity_kg` go through a
//! compare-and-swap so concurrent bookings cannot oversell a trip.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::lifecycle;
use crate::domain::mapping::trip_status_to_wire;
use crate::entities::driver::{self, DriverStatus};
use crate::entities::trip::{self, TripStatus};
use crate::entities::trip_stop::{self, StopStatus};
use crate::entities::vehicle::{self, VehicleStatus};
use crate::error::{AppError, AppResult};
use crate::response::ErrorBody;

/// Bounded retries for the capacity compare-and-swap. Contention on a
/// single trip is short-lived; three reloads is plenty.
const CAS_ATTEMPTS: usize = 3;

fn now() -> DateTimeWithTimeZone {
    chrono::Utc::now().fixed_offset()
}

pub struct NewTrip {
    pub departure_address: String,
    pub departure_city: String,
    pub departure_country: String,
    pub destination_address: String,
    pub destination_city: String,
    pub destination_country: String,
    pub departure_time: DateTimeWithTimeZone,
    pub arrival_time: DateTimeWithTimeZone,
    pub base_price: f64,
    pub price_per_kg: f64,
    pub minimum_price: f64,
    pub currency: String,
    pub total_capacity_kg: f64,
}

/// Load a trip and verify it belongs to the caller's organization.
pub async fn load_owned<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    trip_id: Uuid,
) -> AppResult<trip::Model> {
    trip::Entity::find_by_id(trip_id)
        .one(conn)
        .await?
        .filter(|t| t.organization_id == organization_id)
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))
}

pub async fn create_trip(
    db: &DatabaseConnection,
    organization_id: Uuid,
    new: NewTrip,
) -> AppResult<trip::Model> {
    lifecycle::validate_new_trip(new.departure_time, new.arrival_time, new.total_capacity_kg)?;

    let trip = trip::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        driver_id: Set(None),
        vehicle_id: Set(None),
        departure_address: Set(new.departure_address),
        departure_city: Set(new.departure_city),
        departure_country: Set(new.departure_country),
        destination_address: Set(new.destination_address),
        destination_city: Set(new.destination_city),
        destination_country: Set(new.destination_country),
        departure_time: Set(new.departure_time),
        arrival_time: Set(new.arrival_time),
        base_price: Set(new.base_price),
        price_per_kg: Set(new.price_per_kg),
        minimum_price: Set(new.minimum_price),
        currency: Set(new.currency),
        total_capacity_kg: Set(new.total_capacity_kg),
        remaining_capacity_kg: Set(new.total_capacity_kg),
        status: Set(TripStatus::Planned),
        cancellation_reason: Set(None),
        ..Default::default()
    };

    trip.insert(db).await.map_err(|e| {
        tracing::error!(error = %e, "trip insert failed");
        AppError::CreationFailed("failed to create trip".to_string())
    })
}

/// Assign a driver, taking trip and driver into the new state together.
/// A driver with a current trip is unavailable for any other.
pub async fn assign_driver(
    db: &DatabaseConnection,
    organization_id: Uuid,
    trip_id: Uuid,
    driver_id: Uuid,
) -> AppResult<trip::Model> {
    let txn = db.begin().await?;

    let trip = load_owned(&txn, organization_id, trip_id).await?;
    if !lifecycle::is_bookable(trip.status) {
        return Err(AppError::BadRequest(
            "driver can only be assigned before departure".to_string(),
        ));
    }

    let driver = driver::Entity::find_by_id(driver_id)
        .one(&txn)
        .await?
        .filter(|d| d.organization_id == organization_id)
        .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;

    if driver.status == DriverStatus::Inactive {
        return Err(AppError::DriverUnavailable("driver is inactive".to_string()));
    }
    if driver.current_trip_id.is_some() && driver.current_trip_id != Some(trip_id) {
        return Err(AppError::DriverUnavailable(
            "driver is already assigned to another trip".to_string(),
        ));
    }

    let mut driver_active: driver::ActiveModel = driver.into();
    driver_active.current_trip_id = Set(Some(trip_id));
    driver_active.status = Set(DriverStatus::OnTrip);
    driver_active.updated_at = Set(now());
    driver_active.update(&txn).await?;

    let was_planned = trip.status == TripStatus::Planned;
    let mut trip_active: trip::ActiveModel = trip.into();
    trip_active.driver_id = Set(Some(driver_id));
    if was_planned {
        // a trip with a driver is formally scheduled
        trip_active.status = Set(TripStatus::Scheduled);
    }
    trip_active.updated_at = Set(now());
    let updated = trip_active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

pub async fn assign_vehicle(
    db: &DatabaseConnection,
    organization_id: Uuid,
    trip_id: Uuid,
    vehicle_id: Uuid,
) -> AppResult<trip::Model> {
    let txn = db.begin().await?;

    let trip = load_owned(&txn, organization_id, trip_id).await?;
    if !lifecycle::is_bookable(trip.status) {
        return Err(AppError::BadRequest(
            "vehicle can only be assigned before departure".to_string(),
        ));
    }

    let vehicle = vehicle::Entity::find_by_id(vehicle_id)
        .one(&txn)
        .await?
        .filter(|v| v.organization_id == organization_id)
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    if vehicle.status != VehicleStatus::Active {
        return Err(AppError::Conflict("vehicle is not in active service".to_string()));
    }

    let in_use = trip::Entity::find()
        .filter(trip::Column::VehicleId.eq(vehicle_id))
        .filter(trip::Column::Id.ne(trip_id))
        .filter(trip::Column::Status.is_in([
            TripStatus::Planned,
            TripStatus::Scheduled,
            TripStatus::Active,
            TripStatus::Delayed,
        ]))
        .one(&txn)
        .await?;
    if in_use.is_some() {
        return Err(AppError::Conflict(
            "vehicle is already assigned to another open trip".to_string(),
        ));
    }

    let mut trip_active: trip::ActiveModel = trip.into();
    trip_active.vehicle_id = Set(Some(vehicle_id));
    trip_active.updated_at = Set(now());
    let updated = trip_active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

pub struct NewStop {
    pub sequence: i32,
    pub address: String,
    pub city: String,
    pub country: String,
}

/// Append an intermediate stop. Sequences are unique and strictly
/// increasing per trip; the stop's own status starts at `pending`.
pub async fn add_stop(
    db: &DatabaseConnection,
    organization_id: Uuid,
    trip_id: Uuid,
    new: NewStop,
) -> AppResult<trip_stop::Model> {
    let trip = load_owned(db, organization_id, trip_id).await?;
    if lifecycle::is_terminal(trip.status) {
        return Err(AppError::BadRequest(
            "cannot add stops to a finished trip".to_string(),
        ));
    }

    if new.sequence < 1 {
        return Err(AppError::BadRequest("stop sequence must be at least 1".to_string()));
    }

    let last = trip_stop::Entity::find()
        .filter(trip_stop::Column::TripId.eq(trip_id))
        .order_by_desc(trip_stop::Column::Sequence)
        .one(db)
        .await?;

    if let Some(last) = last {
        if new.sequence <= last.sequence {
            return Err(AppError::BadRequest(format!(
                "stop sequence must be greater than {}",
                last.sequence
            )));
        }
    }

    let stop = trip_stop::ActiveModel {
        id: Set(Uuid::new_v4()),
        trip_id: Set(trip_id),
        sequence: Set(new.sequence),
        address: Set(new.address),
        city: Set(new.city),
        country: Set(new.country),
        status: Set(StopStatus::Pending),
        ..Default::default()
    };

    stop.insert(db).await.map_err(|e| {
        tracing::error!(error = %e, "stop insert failed");
        AppError::CreationFailed("failed to add stop".to_string())
    })
}

/// A stop is resolved as completed or skipped exactly once.
pub async fn update_stop_status(
    db: &DatabaseConnection,
    trip_id: Uuid,
    stop_id: Uuid,
    status: StopStatus,
) -> AppResult<trip_stop::Model> {
    if status == StopStatus::Pending {
        return Err(AppError::BadRequest(
            "a stop cannot be reset to pending".to_string(),
        ));
    }

    let stop = trip_stop::Entity::find_by_id(stop_id)
        .one(db)
        .await?
        .filter(|s| s.trip_id == trip_id)
        .ok_or_else(|| AppError::NotFound("Stop not found".to_string()))?;

    if stop.status != StopStatus::Pending {
        return Err(AppError::Conflict("stop is already resolved".to_string()));
    }

    let mut active: trip_stop::ActiveModel = stop.into();
    active.status = Set(status);
    Ok(active.update(db).await?)
}

/// Atomic check-and-decrement of the trip's remaining capacity.
///
/// The ledger arithmetic is computed from a snapshot and written back with
/// a conditional update keyed on the snapshot value; if another booking
/// moved the ledger in between, the snapshot is reloaded and the check
/// re-run, so oversell is impossible regardless of interleaving.
pub async fn book_capacity(
    db: &DatabaseConnection,
    trip_id: Uuid,
    weight_kg: f64,
) -> AppResult<trip::Model> {
    for _ in 0..CAS_ATTEMPTS {
        let current = trip::Entity::find_by_id(trip_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        if current.status == TripStatus::Cancelled {
            return Err(AppError::TripCancelled(
                "trip has been cancelled and no longer accepts bookings".to_string(),
            ));
        }
        if !lifecycle::is_bookable(current.status) {
            return Err(AppError::BadRequest(
                "trip is no longer open for booking".to_string(),
            ));
        }

        let new_remaining = lifecycle::debit(current.remaining_capacity_kg, weight_kg)?;

        if swap_remaining(db, &current, new_remaining).await? {
            return Ok(trip::Model {
                remaining_capacity_kg: new_remaining,
                ..current
            });
        }
    }

    Err(AppError::OperationFailed(
        "capacity update contention, please retry".to_string(),
    ))
}

/// Inverse of [`book_capacity`], applied on booking cancellation.
pub async fn release_capacity(
    db: &DatabaseConnection,
    trip_id: Uuid,
    weight_kg: f64,
) -> AppResult<trip::Model> {
    for _ in 0..CAS_ATTEMPTS {
        let current = trip::Entity::find_by_id(trip_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        let new_remaining = lifecycle::credit(
            current.remaining_capacity_kg,
            current.total_capacity_kg,
            weight_kg,
        );

        if swap_remaining(db, &current, new_remaining).await? {
            return Ok(trip::Model {
                remaining_capacity_kg: new_remaining,
                ..current
            });
        }
    }

    Err(AppError::OperationFailed(
        "capacity update contention, please retry".to_string(),
    ))
}

async fn swap_remaining(
    db: &DatabaseConnection,
    snapshot: &trip::Model,
    new_remaining: f64,
) -> AppResult<bool> {
    let result = trip::Entity::update_many()
        .col_expr(trip::Column::RemainingCapacityKg, Expr::value(new_remaining))
        .col_expr(trip::Column::UpdatedAt, Expr::value(now()))
        .filter(trip::Column::Id.eq(snapshot.id))
        .filter(trip::Column::RemainingCapacityKg.eq(snapshot.remaining_capacity_kg))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Cancel a trip. Outstanding bookings are informed by the booking domain;
/// here the trip only stops accepting new capacity and frees its driver.
pub async fn cancel_trip(
    db: &DatabaseConnection,
    organization_id: Uuid,
    trip_id: Uuid,
    reason: Option<String>,
) -> AppResult<trip::Model> {
    let txn = db.begin().await?;

    let trip = load_owned(&txn, organization_id, trip_id).await?;
    if !lifecycle::can_transition(trip.status, TripStatus::Cancelled) {
        return Err(lifecycle::transition_error(trip.status, TripStatus::Cancelled));
    }

    release_driver(&txn, &trip, false).await?;

    let mut active: trip::ActiveModel = trip.into();
    active.status = Set(TripStatus::Cancelled);
    active.cancellation_reason = Set(reason);
    active.updated_at = Set(now());
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Move a trip to `to` if the lifecycle allows it. Completion settles the
/// driver's assignment and performance counter.
pub async fn transition_trip(
    db: &DatabaseConnection,
    organization_id: Uuid,
    trip_id: Uuid,
    to: TripStatus,
) -> AppResult<trip::Model> {
    if to == TripStatus::Cancelled {
        return cancel_trip(db, organization_id, trip_id, None).await;
    }

    let txn = db.begin().await?;

    let trip = load_owned(&txn, organization_id, trip_id).await?;
    if !lifecycle::can_transition(trip.status, to) {
        return Err(lifecycle::transition_error(trip.status, to));
    }

    if to == TripStatus::Completed {
        release_driver(&txn, &trip, true).await?;
    }

    let mut active: trip::ActiveModel = trip.into();
    active.status = Set(to);
    active.updated_at = Set(now());
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

async fn release_driver<C: ConnectionTrait>(
    conn: &C,
    trip: &trip::Model,
    completed: bool,
) -> AppResult<()> {
    let Some(driver_id) = trip.driver_id else {
        return Ok(());
    };
    let Some(driver) = driver::Entity::find_by_id(driver_id).one(conn).await? else {
        return Ok(());
    };
    if driver.current_trip_id != Some(trip.id) {
        return Ok(());
    }

    let completed_trips = driver.completed_trips;
    let mut active: driver::ActiveModel = driver.into();
    active.current_trip_id = Set(None);
    active.status = Set(DriverStatus::Active);
    if completed {
        active.completed_trips = Set(completed_trips + 1);
    }
    active.updated_at = Set(now());
    active.update(conn).await?;
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TripPatch {
    pub departure_address: Option<String>,
    pub departure_city: Option<String>,
    pub departure_country: Option<String>,
    pub destination_address: Option<String>,
    pub destination_city: Option<String>,
    pub destination_country: Option<String>,
    pub departure_time: Option<DateTimeWithTimeZone>,
    pub arrival_time: Option<DateTimeWithTimeZone>,
    pub base_price: Option<f64>,
    pub price_per_kg: Option<f64>,
    pub minimum_price: Option<f64>,
    pub currency: Option<String>,
    pub total_capacity_kg: Option<f64>,
}

/// Partial update. Dates and capacity are re-validated against the merged
/// record; shrinking the total below the already-booked weight is refused.
pub async fn update_trip(
    db: &DatabaseConnection,
    organization_id: Uuid,
    trip_id: Uuid,
    patch: TripPatch,
) -> AppResult<trip::Model> {
    let trip = load_owned(db, organization_id, trip_id).await?;
    if lifecycle::is_terminal(trip.status) {
        return Err(AppError::BadRequest(
            "cannot modify a finished trip".to_string(),
        ));
    }

    let departure_time = patch.departure_time.unwrap_or(trip.departure_time);
    let arrival_time = patch.arrival_time.unwrap_or(trip.arrival_time);
    let total_capacity_kg = patch.total_capacity_kg.unwrap_or(trip.total_capacity_kg);
    lifecycle::validate_new_trip(departure_time, arrival_time, total_capacity_kg)?;

    let booked_kg = trip.total_capacity_kg - trip.remaining_capacity_kg;
    if total_capacity_kg < booked_kg {
        return Err(AppError::InvalidCapacity(format!(
            "{booked_kg} kg already booked exceeds new total capacity of {total_capacity_kg} kg"
        )));
    }

    let mut active: trip::ActiveModel = trip.clone().into();
    if let Some(v) = patch.departure_address {
        active.departure_address = Set(v);
    }
    if let Some(v) = patch.departure_city {
        active.departure_city = Set(v);
    }
    if let Some(v) = patch.departure_country {
        active.departure_country = Set(v);
    }
    if let Some(v) = patch.destination_address {
        active.destination_address = Set(v);
    }
    if let Some(v) = patch.destination_city {
        active.destination_city = Set(v);
    }
    if let Some(v) = patch.destination_country {
        active.destination_country = Set(v);
    }
    if let Some(v) = patch.base_price {
        active.base_price = Set(v);
    }
    if let Some(v) = patch.price_per_kg {
        active.price_per_kg = Set(v);
    }
    if let Some(v) = patch.minimum_price {
        active.minimum_price = Set(v);
    }
    if let Some(v) = patch.currency {
        active.currency = Set(v);
    }
    active.departure_time = Set(departure_time);
    active.arrival_time = Set(arrival_time);
    if patch.total_capacity_kg.is_some() {
        active.total_capacity_kg = Set(total_capacity_kg);
        active.remaining_capacity_kg = Set(total_capacity_kg - booked_kg);
    }
    active.updated_at = Set(now());

    Ok(active.update(db).await?)
}

#[derive(Debug, Clone, Copy)]
pub enum BulkAction {
    Cancel,
    Complete,
    Delay,
}

impl BulkAction {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "cancel" => Some(BulkAction::Cancel),
            "complete" => Some(BulkAction::Complete),
            "delay" => Some(BulkAction::Delay),
            _ => None,
        }
    }

    fn target(self) -> TripStatus {
        match self {
            BulkAction::Cancel => TripStatus::Cancelled,
            BulkAction::Complete => TripStatus::Completed,
            BulkAction::Delay => TripStatus::Delayed,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub trip_id: Uuid,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Apply one action to many trips, reporting each id's outcome on its own.
/// A failing id never aborts the rest of the batch.
pub async fn bulk_update(
    db: &DatabaseConnection,
    organization_id: Uuid,
    trip_ids: Vec<Uuid>,
    action: BulkAction,
) -> Vec<BulkOutcome> {
    let mut outcomes = Vec::with_capacity(trip_ids.len());

    for trip_id in trip_ids {
        let outcome = match transition_trip(db, organization_id, trip_id, action.target()).await {
            Ok(updated) => BulkOutcome {
                trip_id,
                success: true,
                status: Some(trip_status_to_wire(updated.status)),
                error: None,
            },
            Err(err) => BulkOutcome {
                trip_id,
                success: false,
                status: None,
                error: Some(ErrorBody {
                    code: err.code().to_string(),
                    message: err.to_string(),
                    details: None,
                }),
            },
        };
        outcomes.push(outcome);
    }

    outcomes
}

/// Archival is the only way a trip record leaves the system, and only once
/// it is in a terminal state.
pub async fn archive_trip(
    db: &DatabaseConnection,
    organization_id: Uuid,
    trip_id: Uuid,
) -> AppResult<()> {
    let trip = load_owned(db, organization_id, trip_id).await?;
    if !lifecycle::is_terminal(trip.status) {
        return Err(AppError::Conflict(
            "only completed or cancelled trips can be archived".to_string(),
        ));
    }

    trip::Entity::delete_by_id(trip_id).exec(db).await?;
    Ok(())
}
