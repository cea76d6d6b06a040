pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_organizations;
mod m20260301_000002_create_users;
mod m20260301_000003_create_vehicles;
mod m20260301_000004_create_drivers;
mod m20260301_000005_create_trips;
mod m20260301_000006_create_trip_stops;
mod m20260301_000007_create_bookings;
mod m20260301_000008_create_alerts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_organizations::Migration),
            Box::new(m20260301_000002_create_users::Migration),
            Box::new(m20260301_000003_create_vehicles::Migration),
            Box::new(m20260301_000004_create_drivers::Migration),
            Box::new(m20260301_000005_create_trips::Migration),
            Box::new(m20260301_000006_create_trip_stops::Migration),
            Box::new(m20260301_000007_create_bookings::Migration),
            Box::new(m20260301_000008_create_alerts::Migration),
        ]
    }
}
