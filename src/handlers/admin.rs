use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::capacity::validate_capacity;
use crate::domain::casing::keys_to_snake;
use crate::domain::fleet::{confirmed_revenue, sort_trips};
use crate::domain::mapping::{
    organization_type_from_wire, organization_type_to_wire, trip_status_from_wire,
    vehicle_type_from_wire,
};
use crate::entities::booking;
use crate::entities::driver::{self, DriverStatus};
use crate::entities::organization::{self, VerificationStatus};
use crate::entities::trip::{self, TripStatus};
use crate::entities::trip_stop::{self, StopStatus};
use crate::entities::user::{self, UserRole};
use crate::entities::vehicle::{self, VehicleStatus};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::hash_password;
use crate::handlers::customer::TripResponse;
use crate::query::TripListQuery;
use crate::response::{paginate, ApiResponse, Paginated};
use crate::services;
use crate::services::fleet::{DriverSummary, VehicleSummary};
use crate::services::trip::{BulkAction, BulkOutcome, NewStop, NewTrip, TripPatch};
use crate::utils::jwt::Claims;
use crate::AppState;

// ============ Trip Management ============

#[derive(Debug, Deserialize)]
pub struct AddressPayload {
    pub address: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripRequest {
    pub departure: AddressPayload,
    pub destination: AddressPayload,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub base_price: f64,
    pub price_per_kg: f64,
    pub minimum_price: f64,
    pub currency: String,
    pub total_capacity_kg: f64,
}

#[derive(Debug, Serialize)]
pub struct TripListItem {
    #[serde(flatten)]
    pub trip: TripResponse,
    pub revenue: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopView {
    pub id: Uuid,
    pub sequence: i32,
    pub address: String,
    pub city: String,
    pub country: String,
    pub status: &'static str,
}

fn stop_status_token(status: &StopStatus) -> &'static str {
    match status {
        StopStatus::Pending => "pending",
        StopStatus::Completed => "completed",
        StopStatus::Skipped => "skipped",
    }
}

impl From<trip_stop::Model> for StopView {
    fn from(s: trip_stop::Model) -> Self {
        Self {
            id: s.id,
            sequence: s.sequence,
            address: s.address,
            city: s.city,
            country: s.country,
            status: stop_status_token(&s.status),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TripDetail {
    #[serde(flatten)]
    pub trip: TripResponse,
    pub revenue: f64,
    pub stops: Vec<StopView>,
}

/// List the organization's trips with per-trip revenue
pub async fn list_trips(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<TripListQuery>,
) -> AppResult<Json<ApiResponse<Paginated<TripListItem>>>> {
    let organization_id = claims.organization()?;
    let filter = query.validate()?;

    let mut select =
        trip::Entity::find().filter(trip::Column::OrganizationId.eq(organization_id));
    if let Some(status) = filter.status {
        select = select.filter(trip::Column::Status.eq(status));
    }
    if let Some(driver_id) = filter.driver_id {
        select = select.filter(trip::Column::DriverId.eq(driver_id));
    }
    if let Some(vehicle_id) = filter.vehicle_id {
        select = select.filter(trip::Column::VehicleId.eq(vehicle_id));
    }
    if let Some(city) = &filter.departure_city {
        select = select.filter(trip::Column::DepartureCity.eq(city));
    }
    if let Some(city) = &filter.destination_city {
        select = select.filter(trip::Column::DestinationCity.eq(city));
    }

    let trips = select.all(&state.db).await?;

    let trip_ids: Vec<Uuid> = trips.iter().map(|t| t.id).collect();
    let bookings = if trip_ids.is_empty() {
        Vec::new()
    } else {
        booking::Entity::find()
            .filter(booking::Column::TripId.is_in(trip_ids))
            .all(&state.db)
            .await?
    };

    let mut rows: Vec<(trip::Model, f64)> = trips
        .into_iter()
        .map(|t| {
            let revenue = confirmed_revenue(t.id, &bookings);
            (t, revenue)
        })
        .collect();
    sort_trips(&mut rows, filter.sort_by, filter.sort_order);

    let page = paginate(rows, filter.page, filter.limit);
    let items = page
        .items
        .into_iter()
        .map(|(t, revenue)| TripListItem {
            trip: TripResponse::from(t),
            revenue,
        })
        .collect();

    Ok(ApiResponse::ok(Paginated {
        items,
        pagination: page.pagination,
    }))
}

/// Get one trip with its stops and revenue
pub async fn get_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TripDetail>>> {
    let organization_id = claims.organization()?;
    let trip = services::trip::load_owned(&state.db, organization_id, trip_id).await?;

    let stops = trip_stop::Entity::find()
        .filter(trip_stop::Column::TripId.eq(trip_id))
        .all(&state.db)
        .await?;
    let mut stops: Vec<StopView> = stops.into_iter().map(StopView::from).collect();
    stops.sort_by_key(|s| s.sequence);

    let bookings = booking::Entity::find()
        .filter(booking::Column::TripId.eq(trip_id))
        .all(&state.db)
        .await?;
    let revenue = confirmed_revenue(trip_id, &bookings);

    Ok(ApiResponse::ok(TripDetail {
        trip: TripResponse::from(trip),
        revenue,
        stops,
    }))
}

/// Create a new trip
pub async fn create_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTripRequest>,
) -> AppResult<Json<ApiResponse<TripResponse>>> {
    let organization_id = claims.organization()?;

    let trip = services::trip::create_trip(
        &state.db,
        organization_id,
        NewTrip {
            departure_address: payload.departure.address,
            departure_city: payload.departure.city,
            departure_country: payload.departure.country,
            destination_address: payload.destination.address,
            destination_city: payload.destination.city,
            destination_country: payload.destination.country,
            departure_time: payload.departure_time.fixed_offset(),
            arrival_time: payload.arrival_time.fixed_offset(),
            base_price: payload.base_price,
            price_per_kg: payload.price_per_kg,
            minimum_price: payload.minimum_price,
            currency: payload.currency,
            total_capacity_kg: payload.total_capacity_kg,
        },
    )
    .await?;

    Ok(ApiResponse::ok(TripResponse::from(trip)))
}

/// Partially update a trip. The patch arrives as free-form camelCase JSON
/// and is re-cased before being interpreted.
pub async fn update_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<Uuid>,
    Json(raw): Json<serde_json::Value>,
) -> AppResult<Json<ApiResponse<TripResponse>>> {
    let organization_id = claims.organization()?;

    let patch: TripPatch = serde_json::from_value(keys_to_snake(raw))
        .map_err(|e| AppError::BadRequest(format!("malformed trip patch: {e}")))?;

    let trip = services::trip::update_trip(&state.db, organization_id, trip_id, patch).await?;
    Ok(ApiResponse::ok(TripResponse::from(trip)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Move a trip along its lifecycle
pub async fn update_trip_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<TripResponse>>> {
    let organization_id = claims.organization()?;

    let target = match payload.status.as_str() {
        "planned" | "scheduled" | "in_progress" | "active" | "completed" | "cancelled"
        | "delayed" => trip_status_from_wire(&payload.status),
        other => {
            return Err(AppError::BadRequest(format!("unknown trip status '{other}'")));
        }
    };

    let trip = services::trip::transition_trip(&state.db, organization_id, trip_id, target).await?;
    Ok(ApiResponse::ok(TripResponse::from(trip)))
}

#[derive(Debug, Deserialize)]
pub struct CancelTripRequest {
    pub reason: Option<String>,
}

/// Cancel a trip with an optional reason
pub async fn cancel_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<CancelTripRequest>,
) -> AppResult<Json<ApiResponse<TripResponse>>> {
    let organization_id = claims.organization()?;

    let trip =
        services::trip::cancel_trip(&state.db, organization_id, trip_id, payload.reason).await?;
    Ok(ApiResponse::ok(TripResponse::from(trip)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateRequest {
    pub trip_ids: Vec<Uuid>,
    pub action: String,
}

/// Apply one action to a batch of trips; outcomes are reported per id
pub async fn bulk_update_trips(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<BulkUpdateRequest>,
) -> AppResult<Json<ApiResponse<Vec<BulkOutcome>>>> {
    let organization_id = claims.organization()?;

    let action = BulkAction::parse(&payload.action).ok_or_else(|| {
        AppError::BadRequest(format!(
            "unknown bulk action '{}', must be one of: cancel, complete, delay",
            payload.action
        ))
    })?;

    let outcomes =
        services::trip::bulk_update(&state.db, organization_id, payload.trip_ids, action).await;
    Ok(ApiResponse::ok(outcomes))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDriverRequest {
    pub driver_id: Uuid,
}

pub async fn assign_driver(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<AssignDriverRequest>,
) -> AppResult<Json<ApiResponse<TripResponse>>> {
    let organization_id = claims.organization()?;

    let trip =
        services::trip::assign_driver(&state.db, organization_id, trip_id, payload.driver_id)
            .await?;
    Ok(ApiResponse::ok(TripResponse::from(trip)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignVehicleRequest {
    pub vehicle_id: Uuid,
}

pub async fn assign_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<AssignVehicleRequest>,
) -> AppResult<Json<ApiResponse<TripResponse>>> {
    let organization_id = claims.organization()?;

    let trip =
        services::trip::assign_vehicle(&state.db, organization_id, trip_id, payload.vehicle_id)
            .await?;
    Ok(ApiResponse::ok(TripResponse::from(trip)))
}

#[derive(Debug, Deserialize)]
pub struct AddStopRequest {
    pub sequence: i32,
    pub address: String,
    pub city: String,
    pub country: String,
}

pub async fn add_stop(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<AddStopRequest>,
) -> AppResult<Json<ApiResponse<StopView>>> {
    let organization_id = claims.organization()?;

    let stop = services::trip::add_stop(
        &state.db,
        organization_id,
        trip_id,
        NewStop {
            sequence: payload.sequence,
            address: payload.address,
            city: payload.city,
            country: payload.country,
        },
    )
    .await?;

    Ok(ApiResponse::ok(StopView::from(stop)))
}

/// Archive a finished trip
pub async fn archive_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let organization_id = claims.organization()?;

    services::trip::archive_trip(&state.db, organization_id, trip_id).await?;
    Ok(ApiResponse::ok(serde_json::json!({ "message": "Trip archived" })))
}

// ============ Vehicle Management ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub brand: String,
    pub model: String,
    pub license_plate: String,
    pub year: i32,
    pub capacity_weight_min: f64,
    pub capacity_weight_max: f64,
    pub capacity_packages_min: i32,
    pub capacity_packages_max: i32,
}

/// List the organization's vehicles
pub async fn list_vehicles(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ApiResponse<Vec<VehicleSummary>>>> {
    let organization_id = claims.organization()?;

    let vehicles = vehicle::Entity::find()
        .filter(vehicle::Column::OrganizationId.eq(organization_id))
        .all(&state.db)
        .await?;

    Ok(ApiResponse::ok(
        vehicles.into_iter().map(VehicleSummary::from).collect(),
    ))
}

/// Register a vehicle. The declared capacity range must sit inside the
/// bounds for the vehicle type; this runs before anything is persisted.
pub async fn create_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateVehicleRequest>,
) -> AppResult<Json<ApiResponse<VehicleSummary>>> {
    let organization_id = claims.organization()?;

    if payload.capacity_weight_min > payload.capacity_weight_max {
        return Err(AppError::BadRequest(
            "minimum weight capacity exceeds maximum".to_string(),
        ));
    }
    if payload.capacity_packages_min > payload.capacity_packages_max {
        return Err(AppError::BadRequest(
            "minimum package capacity exceeds maximum".to_string(),
        ));
    }

    validate_capacity(
        &payload.vehicle_type,
        payload.capacity_weight_min,
        payload.capacity_packages_min,
    )
    .map_err(AppError::BadRequest)?;
    validate_capacity(
        &payload.vehicle_type,
        payload.capacity_weight_max,
        payload.capacity_packages_max,
    )
    .map_err(AppError::BadRequest)?;

    let new_vehicle = vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        vehicle_type: Set(vehicle_type_from_wire(&payload.vehicle_type)),
        brand: Set(payload.brand),
        model: Set(payload.model),
        license_plate: Set(payload.license_plate),
        year: Set(payload.year),
        capacity_weight_min: Set(payload.capacity_weight_min),
        capacity_weight_max: Set(payload.capacity_weight_max),
        capacity_packages_min: Set(payload.capacity_packages_min),
        capacity_packages_max: Set(payload.capacity_packages_max),
        status: Set(VehicleStatus::Active),
        current_driver_id: Set(None),
        ..Default::default()
    };

    let vehicle = new_vehicle.insert(&state.db).await.map_err(|e| {
        tracing::error!(error = %e, "vehicle insert failed");
        AppError::CreationFailed("failed to create vehicle".to_string())
    })?;

    Ok(ApiResponse::ok(VehicleSummary::from(vehicle)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateVehicleStatusRequest {
    pub status: String,
}

/// Update a vehicle's service status (maintenance scheduling)
pub async fn update_vehicle_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(vehicle_id): Path<Uuid>,
    Json(payload): Json<UpdateVehicleStatusRequest>,
) -> AppResult<Json<ApiResponse<VehicleSummary>>> {
    let organization_id = claims.organization()?;

    let status = match payload.status.as_str() {
        "active" => VehicleStatus::Active,
        "maintenance" => VehicleStatus::Maintenance,
        "inactive" => VehicleStatus::Inactive,
        other => {
            return Err(AppError::BadRequest(format!(
                "unknown vehicle status '{other}'"
            )));
        }
    };

    let vehicle = vehicle::Entity::find_by_id(vehicle_id)
        .one(&state.db)
        .await?
        .filter(|v| v.organization_id == organization_id)
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    let mut active: vehicle::ActiveModel = vehicle.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&state.db).await?;

    Ok(ApiResponse::ok(VehicleSummary::from(updated)))
}

/// Remove a vehicle. Refused while an open trip still references it.
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(vehicle_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let organization_id = claims.organization()?;

    let vehicle = vehicle::Entity::find_by_id(vehicle_id)
        .one(&state.db)
        .await?
        .filter(|v| v.organization_id == organization_id)
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    let in_use = trip::Entity::find()
        .filter(trip::Column::VehicleId.eq(vehicle.id))
        .filter(trip::Column::Status.is_in([
            TripStatus::Planned,
            TripStatus::Scheduled,
            TripStatus::Active,
            TripStatus::Delayed,
        ]))
        .one(&state.db)
        .await?;
    if in_use.is_some() {
        return Err(AppError::Conflict(
            "vehicle is assigned to an open trip".to_string(),
        ));
    }

    vehicle::Entity::delete_by_id(vehicle.id).exec(&state.db).await?;
    Ok(ApiResponse::ok(serde_json::json!({ "message": "Vehicle deleted" })))
}

// ============ Driver Management ============

#[derive(Debug, Deserialize)]
pub struct CreateDriverRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

/// List the organization's drivers
pub async fn list_drivers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ApiResponse<Vec<DriverSummary>>>> {
    let organization_id = claims.organization()?;

    let drivers = driver::Entity::find()
        .filter(driver::Column::OrganizationId.eq(organization_id))
        .all(&state.db)
        .await?;

    Ok(ApiResponse::ok(
        drivers.into_iter().map(DriverSummary::from).collect(),
    ))
}

/// Create a driver: a login account plus the fleet profile
pub async fn create_driver(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateDriverRequest>,
) -> AppResult<Json<ApiResponse<DriverSummary>>> {
    let organization_id = claims.organization()?;

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;

    let txn = state.db.begin().await?;

    let account = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email.clone()),
        password_hash: Set(password_hash),
        name: Set(payload.name.clone()),
        role: Set(UserRole::OrganizationDriver),
        organization_id: Set(Some(organization_id)),
        ..Default::default()
    };
    let account = account.insert(&txn).await?;

    let profile = driver::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        user_id: Set(Some(account.id)),
        name: Set(payload.name),
        email: Set(payload.email),
        phone: Set(payload.phone),
        status: Set(DriverStatus::Active),
        current_vehicle_id: Set(None),
        current_trip_id: Set(None),
        completed_trips: Set(0),
        rating: Set(0.0),
        on_time_percentage: Set(0.0),
        ..Default::default()
    };
    let profile = profile.insert(&txn).await?;

    txn.commit().await?;

    Ok(ApiResponse::ok(DriverSummary::from(profile)))
}

// ============ Organization Profile ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationView {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub org_type: &'static str,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub verification_status: &'static str,
    pub created_at: DateTime<Utc>,
}

impl From<organization::Model> for OrganizationView {
    fn from(o: organization::Model) -> Self {
        Self {
            id: o.id,
            name: o.name,
            org_type: organization_type_to_wire(&o.org_type),
            contact_email: o.contact_email,
            contact_phone: o.contact_phone,
            verification_status: match o.verification_status {
                VerificationStatus::Pending => "pending",
                VerificationStatus::Verified => "verified",
                VerificationStatus::Rejected => "rejected",
            },
            created_at: o.created_at.with_timezone(&Utc),
        }
    }
}

pub async fn get_organization(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ApiResponse<OrganizationView>>> {
    let organization_id = claims.organization()?;

    let org = organization::Entity::find_by_id(organization_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    Ok(ApiResponse::ok(OrganizationView::from(org)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub org_type: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

pub async fn update_organization(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateOrganizationRequest>,
) -> AppResult<Json<ApiResponse<OrganizationView>>> {
    let organization_id = claims.organization()?;

    let org = organization::Entity::find_by_id(organization_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    let mut active: organization::ActiveModel = org.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(token) = payload.org_type {
        // unknown partner types land in the `other` bucket
        active.org_type = Set(organization_type_from_wire(&token));
    }
    if let Some(email) = payload.contact_email {
        active.contact_email = Set(email);
    }
    if let Some(phone) = payload.contact_phone {
        active.contact_phone = Set(Some(phone));
    }
    active.updated_at = Set(Utc::now().fixed_offset());

    let updated = active.update(&state.db).await?;
    Ok(ApiResponse::ok(OrganizationView::from(updated)))
}
