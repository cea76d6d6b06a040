//! Fleet-wide summary folds and the deterministic list comparators.
//!
//! Nothing here is stored: overview, analytics and revenue figures are
//! recomputed per request from the fetched collections.

use std::cmp::Ordering;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::mapping::trip_status_token;
use crate::entities::booking::{self, BookingStatus};
use crate::entities::driver::{self, DriverStatus};
use crate::entities::trip::{self, TripStatus};
use crate::entities::vehicle::{self, VehicleStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripSortField {
    DepartureTime,
    Revenue,
    Status,
    CreatedAt,
}

impl TripSortField {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "departureTime" => Some(TripSortField::DepartureTime),
            "revenue" => Some(TripSortField::Revenue),
            "status" => Some(TripSortField::Status),
            "createdAt" => Some(TripSortField::CreatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleSortField {
    LicensePlate,
    Year,
    Status,
    CreatedAt,
}

impl VehicleSortField {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "licensePlate" => Some(VehicleSortField::LicensePlate),
            "year" => Some(VehicleSortField::Year),
            "status" => Some(VehicleSortField::Status),
            "createdAt" => Some(VehicleSortField::CreatedAt),
            _ => None,
        }
    }
}

/// Revenue a trip has earned: the sum of its confirmed booking prices.
pub fn confirmed_revenue(trip_id: Uuid, bookings: &[booking::Model]) -> f64 {
    bookings
        .iter()
        .filter(|b| b.trip_id == trip_id && b.status == BookingStatus::Confirmed)
        .map(|b| b.price)
        .sum()
}

/// Sort trips (paired with their computed revenue) by the requested field.
/// Descending order flips the field comparison only; the id tie-break stays
/// ascending so pagination is stable either way.
pub fn sort_trips(rows: &mut [(trip::Model, f64)], field: TripSortField, order: SortOrder) {
    rows.sort_by(|a, b| {
        let primary = match field {
            TripSortField::DepartureTime => a.0.departure_time.cmp(&b.0.departure_time),
            TripSortField::Revenue => a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal),
            TripSortField::Status => {
                trip_status_token(a.0.status).cmp(trip_status_token(b.0.status))
            }
            TripSortField::CreatedAt => a.0.created_at.cmp(&b.0.created_at),
        };
        let primary = match order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.0.id.cmp(&b.0.id))
    });
}

/// Same contract as [`sort_trips`] for the fleet vehicle listing; the
/// license plate (then id) breaks ties.
pub fn sort_vehicles(rows: &mut [vehicle::Model], field: VehicleSortField, order: SortOrder) {
    rows.sort_by(|a, b| {
        let primary = match field {
            VehicleSortField::LicensePlate => a.license_plate.cmp(&b.license_plate),
            VehicleSortField::Year => a.year.cmp(&b.year),
            VehicleSortField::Status => {
                vehicle_status_token(&a.status).cmp(vehicle_status_token(&b.status))
            }
            VehicleSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let primary = match order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary
            .then_with(|| a.license_plate.cmp(&b.license_plate))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn vehicle_status_token(status: &VehicleStatus) -> &'static str {
    match status {
        VehicleStatus::Active => "active",
        VehicleStatus::Maintenance => "maintenance",
        VehicleStatus::Inactive => "inactive",
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FleetOverview {
    pub total_vehicles: u64,
    pub active_vehicles: u64,
    pub maintenance_vehicles: u64,
    pub inactive_vehicles: u64,
    pub total_drivers: u64,
    pub available_drivers: u64,
    pub drivers_on_trip: u64,
    pub total_trips: u64,
    pub open_trips: u64,
    pub completed_trips: u64,
    pub cancelled_trips: u64,
    pub utilization_pct: f64,
    pub total_revenue: f64,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FleetAnalytics {
    pub total_revenue: f64,
    pub average_utilization_pct: f64,
    pub average_driver_rating: f64,
    pub average_on_time_percentage: f64,
}

pub fn fold_overview(
    vehicles: &[vehicle::Model],
    drivers: &[driver::Model],
    trips: &[trip::Model],
    bookings: &[booking::Model],
) -> FleetOverview {
    let count_vehicles =
        |status: VehicleStatus| vehicles.iter().filter(|v| v.status == status).count() as u64;
    let count_drivers =
        |status: DriverStatus| drivers.iter().filter(|d| d.status == status).count() as u64;
    let count_trips =
        |status: TripStatus| trips.iter().filter(|t| t.status == status).count() as u64;

    let open_trips = trips
        .iter()
        .filter(|t| !matches!(t.status, TripStatus::Completed | TripStatus::Cancelled))
        .count() as u64;

    let total_revenue: f64 = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .map(|b| b.price)
        .sum();

    FleetOverview {
        total_vehicles: vehicles.len() as u64,
        active_vehicles: count_vehicles(VehicleStatus::Active),
        maintenance_vehicles: count_vehicles(VehicleStatus::Maintenance),
        inactive_vehicles: count_vehicles(VehicleStatus::Inactive),
        total_drivers: drivers.len() as u64,
        available_drivers: count_drivers(DriverStatus::Active),
        drivers_on_trip: count_drivers(DriverStatus::OnTrip),
        total_trips: trips.len() as u64,
        open_trips,
        completed_trips: count_trips(TripStatus::Completed),
        cancelled_trips: count_trips(TripStatus::Cancelled),
        utilization_pct: utilization_pct(trips),
        total_revenue,
    }
}

pub fn fold_analytics(
    drivers: &[driver::Model],
    trips: &[trip::Model],
    bookings: &[booking::Model],
) -> FleetAnalytics {
    let total_revenue: f64 = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .map(|b| b.price)
        .sum();

    FleetAnalytics {
        total_revenue,
        average_utilization_pct: utilization_pct(trips),
        average_driver_rating: average(drivers.iter().map(|d| d.rating)),
        average_on_time_percentage: average(drivers.iter().map(|d| d.on_time_percentage)),
    }
}

/// Booked share of the capacity currently offered on open trips.
fn utilization_pct(trips: &[trip::Model]) -> f64 {
    let open = trips
        .iter()
        .filter(|t| !matches!(t.status, TripStatus::Completed | TripStatus::Cancelled));

    let (booked, total) = open.fold((0.0, 0.0), |(booked, total), t| {
        (
            booked + (t.total_capacity_kg - t.remaining_capacity_kg),
            total + t.total_capacity_kg,
        )
    });

    if total <= 0.0 {
        return 0.0;
    }
    booked / total * 100.0
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::prelude::DateTimeWithTimeZone;

    fn ts(hours: i64) -> DateTimeWithTimeZone {
        (Utc::now() + Duration::hours(hours)).fixed_offset()
    }

    fn test_trip(n: u128, status: TripStatus, total: f64, remaining: f64) -> trip::Model {
        trip::Model {
            id: Uuid::from_u128(n),
            organization_id: Uuid::from_u128(1000),
            driver_id: None,
            vehicle_id: None,
            departure_address: "1 Quai de la Gare".into(),
            departure_city: "Paris".into(),
            departure_country: "France".into(),
            destination_address: "Hauptstr. 7".into(),
            destination_city: "Berlin".into(),
            destination_country: "Germany".into(),
            departure_time: ts(n as i64),
            arrival_time: ts(n as i64 + 8),
            base_price: 20.0,
            price_per_kg: 1.5,
            minimum_price: 25.0,
            currency: "EUR".into(),
            total_capacity_kg: total,
            remaining_capacity_kg: remaining,
            status,
            cancellation_reason: None,
            created_at: ts(-(n as i64)),
            updated_at: ts(0),
        }
    }

    fn test_vehicle(n: u128, plate: &str, year: i32, status: VehicleStatus) -> vehicle::Model {
        vehicle::Model {
            id: Uuid::from_u128(n),
            organization_id: Uuid::from_u128(1000),
            vehicle_type: vehicle::VehicleType::Van,
            brand: "Iveco".into(),
            model: "Daily".into(),
            license_plate: plate.into(),
            year,
            capacity_weight_min: 50.0,
            capacity_weight_max: 3000.0,
            capacity_packages_min: 1,
            capacity_packages_max: 15,
            status,
            current_driver_id: None,
            created_at: ts(0),
            updated_at: ts(0),
        }
    }

    fn test_driver(n: u128, status: DriverStatus, rating: f64, on_time: f64) -> driver::Model {
        driver::Model {
            id: Uuid::from_u128(n),
            organization_id: Uuid::from_u128(1000),
            user_id: None,
            name: "D".into(),
            email: "d@example.com".into(),
            phone: None,
            status,
            current_vehicle_id: None,
            current_trip_id: None,
            completed_trips: 0,
            rating,
            on_time_percentage: on_time,
            created_at: ts(0),
            updated_at: ts(0),
        }
    }

    fn test_booking(trip: u128, price: f64, status: BookingStatus) -> booking::Model {
        booking::Model {
            id: Uuid::new_v4(),
            trip_id: Uuid::from_u128(trip),
            customer_id: Uuid::from_u128(2000),
            weight_kg: 10.0,
            price,
            currency: "EUR".into(),
            status,
            created_at: ts(0),
            updated_at: ts(0),
        }
    }

    #[test]
    fn overview_counts_and_revenue() {
        let vehicles = vec![
            test_vehicle(1, "B-100", 2020, VehicleStatus::Active),
            test_vehicle(2, "B-200", 2021, VehicleStatus::Maintenance),
        ];
        let drivers = vec![
            test_driver(1, DriverStatus::Active, 4.0, 90.0),
            test_driver(2, DriverStatus::OnTrip, 5.0, 100.0),
        ];
        let trips = vec![
            test_trip(1, TripStatus::Scheduled, 100.0, 40.0),
            test_trip(2, TripStatus::Completed, 200.0, 0.0),
            test_trip(3, TripStatus::Cancelled, 50.0, 50.0),
        ];
        let bookings = vec![
            test_booking(1, 90.0, BookingStatus::Confirmed),
            test_booking(2, 300.0, BookingStatus::Confirmed),
            test_booking(1, 45.0, BookingStatus::Cancelled),
        ];

        let overview = fold_overview(&vehicles, &drivers, &trips, &bookings);

        assert_eq!(overview.total_vehicles, 2);
        assert_eq!(overview.active_vehicles, 1);
        assert_eq!(overview.maintenance_vehicles, 1);
        assert_eq!(overview.available_drivers, 1);
        assert_eq!(overview.drivers_on_trip, 1);
        assert_eq!(overview.total_trips, 3);
        assert_eq!(overview.open_trips, 1);
        assert_eq!(overview.completed_trips, 1);
        assert_eq!(overview.cancelled_trips, 1);
        // cancelled booking does not count
        assert_eq!(overview.total_revenue, 390.0);
        // only the scheduled trip is open: 60 of 100 kg booked
        assert_eq!(overview.utilization_pct, 60.0);
    }

    #[test]
    fn analytics_averages() {
        let drivers = vec![
            test_driver(1, DriverStatus::Active, 4.0, 80.0),
            test_driver(2, DriverStatus::Active, 5.0, 100.0),
        ];
        let analytics = fold_analytics(&drivers, &[], &[]);

        assert_eq!(analytics.average_driver_rating, 4.5);
        assert_eq!(analytics.average_on_time_percentage, 90.0);
        assert_eq!(analytics.average_utilization_pct, 0.0);
    }

    #[test]
    fn per_trip_revenue_only_counts_confirmed() {
        let bookings = vec![
            test_booking(1, 90.0, BookingStatus::Confirmed),
            test_booking(1, 45.0, BookingStatus::Cancelled),
            test_booking(2, 10.0, BookingStatus::Confirmed),
        ];
        assert_eq!(confirmed_revenue(Uuid::from_u128(1), &bookings), 90.0);
    }

    #[test]
    fn revenue_sort_orders_rows() {
        let mut rows = vec![
            (test_trip(1, TripStatus::Scheduled, 100.0, 100.0), 50.0),
            (test_trip(2, TripStatus::Scheduled, 100.0, 100.0), 200.0),
            (test_trip(3, TripStatus::Scheduled, 100.0, 100.0), 120.0),
        ];
        sort_trips(&mut rows, TripSortField::Revenue, SortOrder::Desc);

        let revenues: Vec<f64> = rows.iter().map(|(_, r)| *r).collect();
        assert_eq!(revenues, vec![200.0, 120.0, 50.0]);
    }

    #[test]
    fn descending_does_not_flip_the_tie_break() {
        // identical status everywhere: only the id tie-break discriminates
        let mut rows = vec![
            (test_trip(3, TripStatus::Scheduled, 100.0, 100.0), 0.0),
            (test_trip(1, TripStatus::Scheduled, 100.0, 100.0), 0.0),
            (test_trip(2, TripStatus::Scheduled, 100.0, 100.0), 0.0),
        ];

        sort_trips(&mut rows, TripSortField::Status, SortOrder::Desc);
        let ids: Vec<Uuid> = rows.iter().map(|(t, _)| t.id).collect();
        assert_eq!(
            ids,
            vec![Uuid::from_u128(1), Uuid::from_u128(2), Uuid::from_u128(3)]
        );
    }

    #[test]
    fn vehicles_sort_by_year_with_plate_tie_break() {
        let mut rows = vec![
            test_vehicle(1, "C-300", 2021, VehicleStatus::Active),
            test_vehicle(2, "A-100", 2021, VehicleStatus::Active),
            test_vehicle(3, "B-200", 2019, VehicleStatus::Active),
        ];
        sort_vehicles(&mut rows, VehicleSortField::Year, SortOrder::Asc);

        let plates: Vec<&str> = rows.iter().map(|v| v.license_plate.as_str()).collect();
        assert_eq!(plates, vec!["B-200", "A-100", "C-300"]);
    }
}
