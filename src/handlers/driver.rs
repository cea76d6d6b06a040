use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::driver;
use crate::entities::trip;
use crate::entities::trip_stop::{self, StopStatus};
use crate::entities::user;
use crate::error::{AppError, AppResult};
use crate::handlers::customer::TripResponse;
use crate::response::ApiResponse;
use crate::services;
use crate::utils::jwt::Claims;
use crate::AppState;

async fn my_profile(state: &AppState, claims: &Claims) -> AppResult<driver::Model> {
    driver::Entity::find()
        .filter(driver::Column::UserId.eq(claims.sub))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Driver profile not found".to_string()))
}

/// List trips assigned to the logged-in driver
pub async fn my_trips(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ApiResponse<Vec<TripResponse>>>> {
    let profile = my_profile(&state, &claims).await?;

    let trips = trip::Entity::find()
        .filter(trip::Column::DriverId.eq(profile.id))
        .order_by_asc(trip::Column::DepartureTime)
        .all(&state.db)
        .await?;

    Ok(ApiResponse::ok(
        trips.into_iter().map(TripResponse::from).collect(),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentInfo {
    pub booking_id: Uuid,
    pub customer_name: String,
    pub weight_kg: f64,
    pub price: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestStop {
    pub id: Uuid,
    pub sequence: i32,
    pub city: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripManifestResponse {
    pub trip_id: Uuid,
    pub departure_city: String,
    pub destination_city: String,
    pub departure_time: DateTime<Utc>,
    pub total_weight_kg: f64,
    pub shipments: Vec<ShipmentInfo>,
    pub stops: Vec<ManifestStop>,
}

/// Load manifest for a specific trip: confirmed shipments and stops
pub async fn trip_manifest(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TripManifestResponse>>> {
    let profile = my_profile(&state, &claims).await?;

    // Verify the trip is assigned to this driver
    let trip = trip::Entity::find_by_id(trip_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    if trip.driver_id != Some(profile.id) {
        return Err(AppError::Forbidden(
            "You are not assigned to this trip".to_string(),
        ));
    }

    let bookings = booking::Entity::find()
        .filter(booking::Column::TripId.eq(trip_id))
        .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
        .all(&state.db)
        .await?;

    let customer_ids: Vec<Uuid> = bookings.iter().map(|b| b.customer_id).collect();
    let customers = if customer_ids.is_empty() {
        Vec::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(customer_ids))
            .all(&state.db)
            .await?
    };

    let total_weight_kg = bookings.iter().map(|b| b.weight_kg).sum();
    let shipments: Vec<ShipmentInfo> = bookings
        .into_iter()
        .map(|b| {
            let customer = customers.iter().find(|u| u.id == b.customer_id);
            ShipmentInfo {
                booking_id: b.id,
                customer_name: customer.map(|u| u.name.clone()).unwrap_or_default(),
                weight_kg: b.weight_kg,
                price: b.price,
            }
        })
        .collect();

    let stops = trip_stop::Entity::find()
        .filter(trip_stop::Column::TripId.eq(trip_id))
        .order_by_asc(trip_stop::Column::Sequence)
        .all(&state.db)
        .await?;

    let stops = stops
        .into_iter()
        .map(|s| ManifestStop {
            id: s.id,
            sequence: s.sequence,
            city: s.city,
            status: match s.status {
                StopStatus::Pending => "pending",
                StopStatus::Completed => "completed",
                StopStatus::Skipped => "skipped",
            },
        })
        .collect();

    Ok(ApiResponse::ok(TripManifestResponse {
        trip_id: trip.id,
        departure_city: trip.departure_city,
        destination_city: trip.destination_city,
        departure_time: trip.departure_time.with_timezone(&Utc),
        total_weight_kg,
        shipments,
        stops,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStopRequest {
    pub status: String,
}

/// Mark one of the trip's stops as completed or skipped
pub async fn update_stop_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((trip_id, stop_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateStopRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let profile = my_profile(&state, &claims).await?;

    let trip = trip::Entity::find_by_id(trip_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    if trip.driver_id != Some(profile.id) {
        return Err(AppError::Forbidden(
            "You are not assigned to this trip".to_string(),
        ));
    }

    let status = match payload.status.as_str() {
        "completed" => StopStatus::Completed,
        "skipped" => StopStatus::Skipped,
        other => {
            return Err(AppError::BadRequest(format!(
                "unknown stop status '{other}', must be 'completed' or 'skipped'"
            )));
        }
    };

    let stop = services::trip::update_stop_status(&state.db, trip_id, stop_id, status).await?;

    Ok(ApiResponse::ok(serde_json::json!({
        "stopId": stop.id,
        "status": payload.status,
    })))
}
