//! Query-parameter contracts for the list endpoints. Raw parameters are
//! deserialized as loose strings and validated into typed filters so that
//! every violation comes back as `INVALID_QUERY` with field-level detail.

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::fleet::{SortOrder, TripSortField, VehicleSortField};
use crate::domain::mapping::trip_status_from_wire;
use crate::entities::trip::TripStatus;
use crate::entities::vehicle::VehicleStatus;
use crate::error::{AppError, AppResult, FieldError};

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

const TRIP_STATUS_FILTERS: &[&str] = &["scheduled", "active", "completed", "cancelled", "delayed"];
const VEHICLE_STATUS_FILTERS: &[&str] = &["active", "maintenance", "inactive"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub driver_id: Option<String>,
    pub vehicle_id: Option<String>,
    pub departure_city: Option<String>,
    pub destination_city: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug)]
pub struct TripFilter {
    pub page: u64,
    pub limit: u64,
    pub status: Option<TripStatus>,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub departure_city: Option<String>,
    pub destination_city: Option<String>,
    pub sort_by: TripSortField,
    pub sort_order: SortOrder,
}

impl TripListQuery {
    pub fn validate(self) -> AppResult<TripFilter> {
        let mut errors = Vec::new();

        let page = validate_page(self.page, &mut errors);
        let limit = validate_limit(self.limit, &mut errors);

        let status = match self.status.as_deref() {
            None => None,
            Some(token) if TRIP_STATUS_FILTERS.contains(&token) => {
                Some(trip_status_from_wire(token))
            }
            Some(token) => {
                errors.push(FieldError::new(
                    "status",
                    format!(
                        "unknown status '{token}', must be one of: {}",
                        TRIP_STATUS_FILTERS.join(", ")
                    ),
                ));
                None
            }
        };

        let driver_id = validate_uuid("driverId", self.driver_id, &mut errors);
        let vehicle_id = validate_uuid("vehicleId", self.vehicle_id, &mut errors);

        let sort_by = match self.sort_by.as_deref() {
            None => TripSortField::DepartureTime,
            Some(token) => TripSortField::parse(token).unwrap_or_else(|| {
                errors.push(FieldError::new(
                    "sortBy",
                    format!(
                        "unknown sort field '{token}', must be one of: departureTime, revenue, status, createdAt"
                    ),
                ));
                TripSortField::DepartureTime
            }),
        };

        let sort_order = validate_sort_order(self.sort_order, &mut errors);

        if !errors.is_empty() {
            return Err(AppError::InvalidQuery(errors));
        }

        Ok(TripFilter {
            page,
            limit,
            status,
            driver_id,
            vehicle_id,
            departure_city: self.departure_city,
            destination_city: self.destination_city,
            sort_by,
            sort_order,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug)]
pub struct FleetFilter {
    pub page: u64,
    pub limit: u64,
    pub status: Option<VehicleStatus>,
    pub sort_by: VehicleSortField,
    pub sort_order: SortOrder,
}

impl FleetQuery {
    pub fn validate(self) -> AppResult<FleetFilter> {
        let mut errors = Vec::new();

        let page = validate_page(self.page, &mut errors);
        let limit = validate_limit(self.limit, &mut errors);

        let status = match self.status.as_deref() {
            None => None,
            Some("active") => Some(VehicleStatus::Active),
            Some("maintenance") => Some(VehicleStatus::Maintenance),
            Some("inactive") => Some(VehicleStatus::Inactive),
            Some(token) => {
                errors.push(FieldError::new(
                    "status",
                    format!(
                        "unknown status '{token}', must be one of: {}",
                        VEHICLE_STATUS_FILTERS.join(", ")
                    ),
                ));
                None
            }
        };

        let sort_by = match self.sort_by.as_deref() {
            None => VehicleSortField::LicensePlate,
            Some(token) => VehicleSortField::parse(token).unwrap_or_else(|| {
                errors.push(FieldError::new(
                    "sortBy",
                    format!(
                        "unknown sort field '{token}', must be one of: licensePlate, year, status, createdAt"
                    ),
                ));
                VehicleSortField::LicensePlate
            }),
        };

        let sort_order = validate_sort_order(self.sort_order, &mut errors);

        if !errors.is_empty() {
            return Err(AppError::InvalidQuery(errors));
        }

        Ok(FleetFilter {
            page,
            limit,
            status,
            sort_by,
            sort_order,
        })
    }
}

fn validate_page(page: Option<String>, errors: &mut Vec<FieldError>) -> u64 {
    match page.as_deref().map(str::parse::<u64>) {
        None => 1,
        Some(Ok(0)) => {
            errors.push(FieldError::new("page", "must be at least 1"));
            1
        }
        Some(Ok(p)) => p,
        Some(Err(_)) => {
            errors.push(FieldError::new("page", "must be a positive integer"));
            1
        }
    }
}

fn validate_limit(limit: Option<String>, errors: &mut Vec<FieldError>) -> u64 {
    match limit.as_deref().map(str::parse::<u64>) {
        None => DEFAULT_LIMIT,
        Some(Ok(0)) => {
            errors.push(FieldError::new("limit", "must be at least 1"));
            DEFAULT_LIMIT
        }
        Some(Ok(l)) if l > MAX_LIMIT => {
            errors.push(FieldError::new(
                "limit",
                format!("must be at most {MAX_LIMIT}"),
            ));
            DEFAULT_LIMIT
        }
        Some(Ok(l)) => l,
        Some(Err(_)) => {
            errors.push(FieldError::new("limit", "must be a positive integer"));
            DEFAULT_LIMIT
        }
    }
}

fn validate_sort_order(order: Option<String>, errors: &mut Vec<FieldError>) -> SortOrder {
    match order.as_deref() {
        None => SortOrder::Asc,
        Some(token) => SortOrder::parse(token).unwrap_or_else(|| {
            errors.push(FieldError::new(
                "sortOrder",
                format!("unknown sort order '{token}', must be 'asc' or 'desc'"),
            ));
            SortOrder::Asc
        }),
    }
}

fn validate_uuid(field: &str, raw: Option<String>, errors: &mut Vec<FieldError>) -> Option<Uuid> {
    let raw = raw?;
    match Uuid::parse_str(&raw) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(FieldError::new(field, "must be a valid UUID"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        let filter = TripListQuery::default().validate().unwrap();

        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, DEFAULT_LIMIT);
        assert_eq!(filter.sort_by, TripSortField::DepartureTime);
        assert_eq!(filter.sort_order, SortOrder::Asc);
        assert!(filter.status.is_none());
    }

    #[test]
    fn active_filter_resolves_to_the_internal_status() {
        let filter = TripListQuery {
            status: Some("active".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();

        assert_eq!(filter.status, Some(TripStatus::Active));
    }

    #[test]
    fn violations_are_collected_per_field() {
        let err = TripListQuery {
            page: Some("0".into()),
            status: Some("teleporting".into()),
            sort_by: Some("price".into()),
            sort_order: Some("sideways".into()),
            driver_id: Some("not-a-uuid".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();

        let AppError::InvalidQuery(fields) = err else {
            panic!("expected INVALID_QUERY");
        };
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["page", "status", "driverId", "sortBy", "sortOrder"]);
    }

    #[test]
    fn limit_is_capped() {
        let err = TripListQuery {
            limit: Some("1000".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_QUERY");
    }

    #[test]
    fn non_numeric_page_is_a_field_error() {
        let err = TripListQuery {
            page: Some("first".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();

        let AppError::InvalidQuery(fields) = err else {
            panic!("expected INVALID_QUERY");
        };
        assert_eq!(fields[0].field, "page");
    }

    #[test]
    fn fleet_query_validates_vehicle_status() {
        let filter = FleetQuery {
            status: Some("maintenance".into()),
            sort_by: Some("year".into()),
            sort_order: Some("desc".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();

        assert_eq!(filter.status, Some(VehicleStatus::Maintenance));
        assert_eq!(filter.sort_by, VehicleSortField::Year);
        assert_eq!(filter.sort_order, SortOrder::Desc);

        assert!(FleetQuery {
            status: Some("scrapped".into()),
            ..Default::default()
        }
        .validate()
        .is_err());
    }
}
