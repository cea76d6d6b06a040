use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{admin, auth, customer, driver, fleet};
use crate::middleware::auth::{
    auth_middleware, require_customer, require_org_admin, require_org_driver, require_org_member,
};
use crate::middleware::rate_limit::create_public_governor;
use crate::middleware::role_rate_limit::{create_role_governor, RateLimitedRole};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Create role-specific governor layers
    let driver_governor = create_role_governor(RateLimitedRole::Driver);
    let customer_governor = create_role_governor(RateLimitedRole::Customer);
    // IP-based governor for public routes (customer-level limits)
    let public_governor = create_public_governor();

    // Public routes (with customer-level rate limiting per IP)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(public_governor.clone());

    // Public trip search
    let public_routes = Router::new()
        .route("/trips", get(customer::list_trips))
        .route("/trips/{id}", get(customer::get_trip))
        .layer(public_governor);

    // Organization admin routes (requires auth + organization_admin role)
    let admin_routes = Router::new()
        // Trip management
        .route("/trips", get(admin::list_trips))
        .route("/trips", post(admin::create_trip))
        .route("/trips/bulk", post(admin::bulk_update_trips))
        .route("/trips/{id}", get(admin::get_trip))
        .route("/trips/{id}", put(admin::update_trip))
        .route("/trips/{id}", delete(admin::archive_trip))
        .route("/trips/{id}/status", put(admin::update_trip_status))
        .route("/trips/{id}/cancel", post(admin::cancel_trip))
        .route("/trips/{id}/assign-driver", post(admin::assign_driver))
        .route("/trips/{id}/assign-vehicle", post(admin::assign_vehicle))
        .route("/trips/{id}/stops", post(admin::add_stop))
        // Vehicles
        .route("/vehicles", get(admin::list_vehicles))
        .route("/vehicles", post(admin::create_vehicle))
        .route("/vehicles/{id}", delete(admin::delete_vehicle))
        .route("/vehicles/{id}/status", put(admin::update_vehicle_status))
        // Drivers
        .route("/drivers", get(admin::list_drivers))
        .route("/drivers", post(admin::create_driver))
        // Organization profile
        .route("/profile", get(admin::get_organization))
        .route("/profile", put(admin::update_organization))
        .layer(middleware::from_fn(require_org_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Fleet dashboard (readable by any organization member)
    let fleet_routes = Router::new()
        .route("/overview", get(fleet::overview))
        .layer(middleware::from_fn(require_org_member))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Driver routes (requires auth + organization_driver role)
    let driver_routes = Router::new()
        .route("/trips", get(driver::my_trips))
        .route("/trips/{trip_id}/manifest", get(driver::trip_manifest))
        .route("/trips/{trip_id}/stops/{stop_id}", put(driver::update_stop_status))
        .layer(driver_governor)
        .layer(middleware::from_fn(require_org_driver))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Customer booking routes (requires auth + customer role)
    let booking_routes = Router::new()
        .route("/", post(customer::create_booking))
        .route("/", get(customer::my_bookings))
        .route("/{id}", delete(customer::cancel_booking))
        .layer(customer_governor)
        .layer(middleware::from_fn(require_customer))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes)
        .nest("/api/org", admin_routes)
        .nest("/api/org/fleet", fleet_routes)
        .nest("/api/driver", driver_routes)
        .nest("/api/bookings", booking_routes)
        .with_state(state)
}
