use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::error::AppResult;
use crate::query::FleetQuery;
use crate::response::ApiResponse;
use crate::services::fleet::{self, FleetDashboard};
use crate::utils::jwt::Claims;
use crate::AppState;

/// Fleet dashboard: overview counts, vehicle/driver listings, alerts and
/// analytics for the caller's organization. Readable by any organization
/// member, not just admins.
pub async fn overview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<FleetQuery>,
) -> AppResult<Json<ApiResponse<FleetDashboard>>> {
    let organization_id = claims.organization()?;
    let filter = query.validate()?;

    let dashboard = fleet::fleet_dashboard(&state.db, organization_id, filter).await?;
    Ok(ApiResponse::ok(dashboard))
}
