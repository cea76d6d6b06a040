use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20260301_000001_create_organizations::Organization;
use super::m20260301_000002_create_users::AppUser;
use super::m20260301_000003_create_vehicles::Vehicle;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(DriverStatus::Enum)
                    .values([DriverStatus::Active, DriverStatus::Inactive, DriverStatus::OnTrip])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Driver::Table)
                    .if_not_exists()
                    .col(uuid(Driver::Id).primary_key())
                    .col(uuid(Driver::OrganizationId).not_null())
                    .col(uuid_null(Driver::UserId))
                    .col(string_len(Driver::Name, 100).not_null())
                    .col(string_len(Driver::Email, 255).not_null())
                    .col(string_len_null(Driver::Phone, 50))
                    .col(
                        ColumnDef::new(Driver::Status)
                            .custom(DriverStatus::Enum)
                            .not_null(),
                    )
                    .col(uuid_null(Driver::CurrentVehicleId))
                    // Soft pointer: trips are created after drivers, so no FK here
                    .col(uuid_null(Driver::CurrentTripId))
                    .col(integer(Driver::CompletedTrips).not_null().default(0))
                    .col(double(Driver::Rating).not_null().default(0.0))
                    .col(double(Driver::OnTimePercentage).not_null().default(0.0))
                    .col(
                        timestamp_with_time_zone(Driver::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Driver::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_driver_organization")
                            .from(Driver::Table, Driver::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_driver_user")
                            .from(Driver::Table, Driver::UserId)
                            .to(AppUser::Table, AppUser::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_driver_current_vehicle")
                            .from(Driver::Table, Driver::CurrentVehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Driver::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(DriverStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Driver {
    Table,
    Id,
    OrganizationId,
    UserId,
    Name,
    Email,
    Phone,
    Status,
    CurrentVehicleId,
    CurrentTripId,
    CompletedTrips,
    Rating,
    OnTimePercentage,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum DriverStatus {
    #[sea_orm(iden = "driver_status")]
    Enum,
    #[sea_orm(iden = "active")]
    Active,
    #[sea_orm(iden = "inactive")]
    Inactive,
    #[sea_orm(iden = "on_trip")]
    OnTrip,
}
