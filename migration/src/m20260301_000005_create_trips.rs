use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20260301_000001_create_organizations::Organization;
use super::m20260301_000003_create_vehicles::Vehicle;
use super::m20260301_000004_create_drivers::Driver;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(TripStatus::Enum)
                    .values([
                        TripStatus::Planned,
                        TripStatus::Scheduled,
                        TripStatus::Active,
                        TripStatus::Completed,
                        TripStatus::Cancelled,
                        TripStatus::Delayed,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Trip::Table)
                    .if_not_exists()
                    .col(uuid(Trip::Id).primary_key())
                    .col(uuid(Trip::OrganizationId).not_null())
                    .col(uuid_null(Trip::DriverId))
                    .col(uuid_null(Trip::VehicleId))
                    .col(string_len(Trip::DepartureAddress, 255).not_null())
                    .col(string_len(Trip::DepartureCity, 100).not_null())
                    .col(string_len(Trip::DepartureCountry, 100).not_null())
                    .col(string_len(Trip::DestinationAddress, 255).not_null())
                    .col(string_len(Trip::DestinationCity, 100).not_null())
                    .col(string_len(Trip::DestinationCountry, 100).not_null())
                    .col(timestamp_with_time_zone(Trip::DepartureTime).not_null())
                    .col(timestamp_with_time_zone(Trip::ArrivalTime).not_null())
                    .col(double(Trip::BasePrice).not_null())
                    .col(double(Trip::PricePerKg).not_null())
                    .col(double(Trip::MinimumPrice).not_null())
                    .col(string_len(Trip::Currency, 3).not_null())
                    .col(double(Trip::TotalCapacityKg).not_null())
                    .col(double(Trip::RemainingCapacityKg).not_null())
                    .col(
                        ColumnDef::new(Trip::Status)
                            .custom(TripStatus::Enum)
                            .not_null(),
                    )
                    .col(string_len_null(Trip::CancellationReason, 500))
                    .col(
                        timestamp_with_time_zone(Trip::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Trip::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_organization")
                            .from(Trip::Table, Trip::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_driver")
                            .from(Trip::Table, Trip::DriverId)
                            .to(Driver::Table, Driver::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_vehicle")
                            .from(Trip::Table, Trip::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Trip::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(TripStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Trip {
    Table,
    Id,
    OrganizationId,
    DriverId,
    VehicleId,
    DepartureAddress,
    DepartureCity,
    DepartureCountry,
    DestinationAddress,
    DestinationCity,
    DestinationCountry,
    DepartureTime,
    ArrivalTime,
    BasePrice,
    PricePerKg,
    MinimumPrice,
    Currency,
    TotalCapacityKg,
    RemainingCapacityKg,
    Status,
    CancellationReason,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum TripStatus {
    #[sea_orm(iden = "trip_status")]
    Enum,
    #[sea_orm(iden = "planned")]
    Planned,
    #[sea_orm(iden = "scheduled")]
    Scheduled,
    #[sea_orm(iden = "active")]
    Active,
    #[sea_orm(iden = "completed")]
    Completed,
    #[sea_orm(iden = "cancelled")]
    Cancelled,
    #[sea_orm(iden = "delayed")]
    Delayed,
}
