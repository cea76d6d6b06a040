use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::fleet::sort_trips;
use crate::domain::lifecycle;
use crate::domain::mapping::trip_status_to_wire;
use crate::entities::booking::{self, BookingStatus};
use crate::entities::trip::{self, TripStatus};
use crate::error::{AppError, AppResult};
use crate::query::TripListQuery;
use crate::response::{paginate, ApiResponse, Paginated};
use crate::services;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AddressView {
    pub address: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripResponse {
    pub id: Uuid,
    pub status: &'static str,
    pub departure: AddressView,
    pub destination: AddressView,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub base_price: f64,
    pub price_per_kg: f64,
    pub minimum_price: f64,
    pub currency: String,
    pub total_capacity_kg: f64,
    pub remaining_capacity_kg: f64,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<trip::Model> for TripResponse {
    fn from(t: trip::Model) -> Self {
        Self {
            id: t.id,
            status: trip_status_to_wire(t.status),
            departure: AddressView {
                address: t.departure_address,
                city: t.departure_city,
                country: t.departure_country,
            },
            destination: AddressView {
                address: t.destination_address,
                city: t.destination_city,
                country: t.destination_country,
            },
            departure_time: t.departure_time.with_timezone(&Utc),
            arrival_time: t.arrival_time.with_timezone(&Utc),
            base_price: t.base_price,
            price_per_kg: t.price_per_kg,
            minimum_price: t.minimum_price,
            currency: t.currency,
            total_capacity_kg: t.total_capacity_kg,
            remaining_capacity_kg: t.remaining_capacity_kg,
            driver_id: t.driver_id,
            vehicle_id: t.vehicle_id,
            cancellation_reason: t.cancellation_reason,
            created_at: t.created_at.with_timezone(&Utc),
            updated_at: t.updated_at.with_timezone(&Utc),
        }
    }
}

/// List upcoming trips open for booking
pub async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<TripListQuery>,
) -> AppResult<Json<ApiResponse<Paginated<TripResponse>>>> {
    let filter = query.validate()?;
    let now = Utc::now();

    let mut select = trip::Entity::find().filter(trip::Column::DepartureTime.gt(now));
    select = match filter.status {
        Some(status) => select.filter(trip::Column::Status.eq(status)),
        None => select.filter(
            trip::Column::Status.is_in([TripStatus::Planned, TripStatus::Scheduled]),
        ),
    };
    if let Some(city) = &filter.departure_city {
        select = select.filter(trip::Column::DepartureCity.eq(city));
    }
    if let Some(city) = &filter.destination_city {
        select = select.filter(trip::Column::DestinationCity.eq(city));
    }
    if let Some(driver_id) = filter.driver_id {
        select = select.filter(trip::Column::DriverId.eq(driver_id));
    }
    if let Some(vehicle_id) = filter.vehicle_id {
        select = select.filter(trip::Column::VehicleId.eq(vehicle_id));
    }

    let trips = select.all(&state.db).await?;

    // revenue is an organization-facing figure; the public listing sorts
    // revenue requests by the stable tie-break only
    let mut rows: Vec<(trip::Model, f64)> = trips.into_iter().map(|t| (t, 0.0)).collect();
    sort_trips(&mut rows, filter.sort_by, filter.sort_order);

    let page = paginate(rows, filter.page, filter.limit);
    let items = page
        .items
        .into_iter()
        .map(|(t, _)| TripResponse::from(t))
        .collect();

    Ok(ApiResponse::ok(Paginated {
        items,
        pagination: page.pagination,
    }))
}

/// Get trip details
pub async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TripResponse>>> {
    let trip = trip::Entity::find_by_id(trip_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    Ok(ApiResponse::ok(TripResponse::from(trip)))
}

// ============ Booking Management ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub trip_id: Uuid,
    pub weight_kg: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub departure_city: String,
    pub destination_city: String,
    pub departure_time: DateTime<Utc>,
    pub weight_kg: f64,
    pub price: f64,
    pub currency: String,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
}

fn booking_status_token(status: &BookingStatus) -> &'static str {
    match status {
        BookingStatus::Confirmed => "confirmed",
        BookingStatus::Cancelled => "cancelled",
    }
}

/// Book parcel capacity on a trip. The capacity check-and-decrement is a
/// single atomic operation, so two concurrent bookings can never jointly
/// exceed the remaining capacity.
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<ApiResponse<BookingResponse>>> {
    if payload.weight_kg <= 0.0 {
        return Err(AppError::BadRequest(
            "booking weight must be positive".to_string(),
        ));
    }

    let trip = trip::Entity::find_by_id(payload.trip_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    if trip.departure_time.with_timezone(&Utc) < Utc::now() {
        return Err(AppError::BadRequest(
            "cannot book a trip that has already departed".to_string(),
        ));
    }

    let price = lifecycle::booking_price(
        trip.base_price,
        trip.price_per_kg,
        trip.minimum_price,
        payload.weight_kg,
    );

    // atomic reservation; fails with CAPACITY_EXCEEDED or TRIP_CANCELLED
    let trip = services::trip::book_capacity(&state.db, trip.id, payload.weight_kg).await?;

    let new_booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        trip_id: Set(trip.id),
        customer_id: Set(claims.sub),
        weight_kg: Set(payload.weight_kg),
        price: Set(price),
        currency: Set(trip.currency.clone()),
        status: Set(BookingStatus::Confirmed),
        ..Default::default()
    };

    let booking = match new_booking.insert(&state.db).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "booking insert failed, releasing reserved capacity");
            if let Err(release_err) =
                services::trip::release_capacity(&state.db, trip.id, payload.weight_kg).await
            {
                tracing::error!(error = %release_err, "capacity compensation failed");
            }
            return Err(AppError::CreationFailed(
                "failed to create booking".to_string(),
            ));
        }
    };

    Ok(ApiResponse::ok(BookingResponse {
        id: booking.id,
        trip_id: trip.id,
        departure_city: trip.departure_city,
        destination_city: trip.destination_city,
        departure_time: trip.departure_time.with_timezone(&Utc),
        weight_kg: booking.weight_kg,
        price: booking.price,
        currency: booking.currency,
        status: booking_status_token(&booking.status),
        created_at: booking.created_at.with_timezone(&Utc),
    }))
}

/// List the caller's bookings
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ApiResponse<Vec<BookingResponse>>>> {
    let bookings = booking::Entity::find()
        .filter(booking::Column::CustomerId.eq(claims.sub))
        .all(&state.db)
        .await?;

    let trip_ids: Vec<Uuid> = bookings.iter().map(|b| b.trip_id).collect();
    let trips = if trip_ids.is_empty() {
        Vec::new()
    } else {
        trip::Entity::find()
            .filter(trip::Column::Id.is_in(trip_ids))
            .all(&state.db)
            .await?
    };

    let responses: Vec<BookingResponse> = bookings
        .into_iter()
        .filter_map(|b| {
            let trip = trips.iter().find(|t| t.id == b.trip_id)?;

            Some(BookingResponse {
                id: b.id,
                trip_id: trip.id,
                departure_city: trip.departure_city.clone(),
                destination_city: trip.destination_city.clone(),
                departure_time: trip.departure_time.with_timezone(&Utc),
                weight_kg: b.weight_kg,
                price: b.price,
                currency: b.currency,
                status: booking_status_token(&b.status),
                created_at: b.created_at.with_timezone(&Utc),
            })
        })
        .collect();

    Ok(ApiResponse::ok(responses))
}

/// Cancel a booking. The record is kept (marked cancelled) and its weight
/// is returned to the trip's remaining capacity.
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BookingResponse>>> {
    let booking = booking::Entity::find_by_id(booking_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    // Verify ownership
    if booking.customer_id != claims.sub {
        return Err(AppError::Forbidden(
            "You can only cancel your own bookings".to_string(),
        ));
    }

    if booking.status == BookingStatus::Cancelled {
        return Err(AppError::Conflict("Booking is already cancelled".to_string()));
    }

    let trip = trip::Entity::find_by_id(booking.trip_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    if trip.departure_time.with_timezone(&Utc) < Utc::now() {
        return Err(AppError::BadRequest(
            "cannot cancel bookings for departed trips".to_string(),
        ));
    }

    let weight_kg = booking.weight_kg;
    let mut active: booking::ActiveModel = booking.into();
    active.status = Set(BookingStatus::Cancelled);
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&state.db).await?;

    // a cancelled trip's ledger no longer matters; skip the release there
    if !lifecycle::is_terminal(trip.status) {
        services::trip::release_capacity(&state.db, trip.id, weight_kg).await?;
    }

    Ok(ApiResponse::ok(BookingResponse {
        id: updated.id,
        trip_id: trip.id,
        departure_city: trip.departure_city,
        destination_city: trip.destination_city,
        departure_time: trip.departure_time.with_timezone(&Utc),
        weight_kg: updated.weight_kg,
        price: updated.price,
        currency: updated.currency,
        status: booking_status_token(&updated.status),
        created_at: updated.created_at.with_timezone(&Utc),
    }))
}
