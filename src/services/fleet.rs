//! Fleet dashboard assembly. Every figure is recomputed per request from
//! the fetched collections; when a sub-collection fetch fails the section
//! is served empty and the payload is flagged degraded instead of erroring
//! the whole dashboard or inventing placeholder data.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::fleet::{self, FleetAnalytics, FleetOverview};
use crate::domain::mapping::vehicle_type_to_wire;
use crate::entities::alert::{self, AlertSeverity};
use crate::entities::booking;
use crate::entities::driver::{self, DriverStatus};
use crate::entities::trip;
use crate::entities::vehicle::{self, VehicleStatus};
use crate::error::AppResult;
use crate::query::FleetFilter;
use crate::response::{paginate, PageMeta};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataStatus {
    Complete,
    Degraded,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub vehicle_type: &'static str,
    pub brand: String,
    pub model: String,
    pub license_plate: String,
    pub year: i32,
    pub capacity_weight_min: f64,
    pub capacity_weight_max: f64,
    pub capacity_packages_min: i32,
    pub capacity_packages_max: i32,
    pub status: &'static str,
    pub current_driver_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<vehicle::Model> for VehicleSummary {
    fn from(v: vehicle::Model) -> Self {
        Self {
            id: v.id,
            vehicle_type: vehicle_type_to_wire(&v.vehicle_type),
            brand: v.brand,
            model: v.model,
            license_plate: v.license_plate,
            year: v.year,
            capacity_weight_min: v.capacity_weight_min,
            capacity_weight_max: v.capacity_weight_max,
            capacity_packages_min: v.capacity_packages_min,
            capacity_packages_max: v.capacity_packages_max,
            status: match v.status {
                VehicleStatus::Active => "active",
                VehicleStatus::Maintenance => "maintenance",
                VehicleStatus::Inactive => "inactive",
            },
            current_driver_id: v.current_driver_id,
            created_at: v.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: &'static str,
    pub current_vehicle_id: Option<Uuid>,
    pub current_trip_id: Option<Uuid>,
    pub completed_trips: i32,
    pub rating: f64,
    pub on_time_percentage: f64,
}

impl From<driver::Model> for DriverSummary {
    fn from(d: driver::Model) -> Self {
        Self {
            id: d.id,
            name: d.name,
            email: d.email,
            phone: d.phone,
            status: match d.status {
                DriverStatus::Active => "active",
                DriverStatus::Inactive => "inactive",
                DriverStatus::OnTrip => "on_trip",
            },
            current_vehicle_id: d.current_vehicle_id,
            current_trip_id: d.current_trip_id,
            completed_trips: d.completed_trips,
            rating: d.rating,
            on_time_percentage: d.on_time_percentage,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertView {
    pub id: Uuid,
    pub kind: String,
    pub severity: &'static str,
    pub message: String,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<alert::Model> for AlertView {
    fn from(a: alert::Model) -> Self {
        Self {
            id: a.id,
            kind: a.kind,
            severity: match a.severity {
                AlertSeverity::Info => "info",
                AlertSeverity::Warning => "warning",
                AlertSeverity::Critical => "critical",
            },
            message: a.message,
            vehicle_id: a.vehicle_id,
            driver_id: a.driver_id,
            created_at: a.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetDashboard {
    pub overview: FleetOverview,
    pub vehicles: Vec<VehicleSummary>,
    pub drivers: Vec<DriverSummary>,
    pub alerts: Vec<AlertView>,
    pub analytics: FleetAnalytics,
    pub pagination: PageMeta,
    pub data_status: DataStatus,
}

pub async fn fleet_dashboard(
    db: &DatabaseConnection,
    organization_id: Uuid,
    filter: FleetFilter,
) -> AppResult<FleetDashboard> {
    let mut degraded = false;

    let vehicles = fetch_or_degrade(
        "vehicles",
        &mut degraded,
        vehicle::Entity::find()
            .filter(vehicle::Column::OrganizationId.eq(organization_id))
            .all(db)
            .await,
    );
    let drivers = fetch_or_degrade(
        "drivers",
        &mut degraded,
        driver::Entity::find()
            .filter(driver::Column::OrganizationId.eq(organization_id))
            .all(db)
            .await,
    );
    let trips = fetch_or_degrade(
        "trips",
        &mut degraded,
        trip::Entity::find()
            .filter(trip::Column::OrganizationId.eq(organization_id))
            .all(db)
            .await,
    );
    // alert rows come from the monitoring feed; read-only here
    let alerts = fetch_or_degrade(
        "alerts",
        &mut degraded,
        alert::Entity::find()
            .filter(alert::Column::OrganizationId.eq(organization_id))
            .order_by_desc(alert::Column::CreatedAt)
            .all(db)
            .await,
    );

    let trip_ids: Vec<Uuid> = trips.iter().map(|t| t.id).collect();
    let bookings = if trip_ids.is_empty() {
        Vec::new()
    } else {
        fetch_or_degrade(
            "bookings",
            &mut degraded,
            booking::Entity::find()
                .filter(booking::Column::TripId.is_in(trip_ids))
                .all(db)
                .await,
        )
    };

    let overview = fleet::fold_overview(&vehicles, &drivers, &trips, &bookings);
    let analytics = fleet::fold_analytics(&drivers, &trips, &bookings);

    let mut listed: Vec<vehicle::Model> = match filter.status {
        Some(status) => vehicles.into_iter().filter(|v| v.status == status).collect(),
        None => vehicles,
    };
    fleet::sort_vehicles(&mut listed, filter.sort_by, filter.sort_order);
    let page = paginate(listed, filter.page, filter.limit);

    Ok(FleetDashboard {
        overview,
        vehicles: page.items.into_iter().map(VehicleSummary::from).collect(),
        drivers: drivers.into_iter().map(DriverSummary::from).collect(),
        alerts: alerts.into_iter().map(AlertView::from).collect(),
        analytics,
        pagination: page.pagination,
        data_status: if degraded {
            DataStatus::Degraded
        } else {
            DataStatus::Complete
        },
    })
}

fn fetch_or_degrade<T>(
    section: &str,
    degraded: &mut bool,
    result: Result<Vec<T>, sea_orm::DbErr>,
) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::error!(error = %e, section, "fleet section fetch failed, serving degraded dashboard");
            *degraded = true;
            Vec::new()
        }
    }
}
