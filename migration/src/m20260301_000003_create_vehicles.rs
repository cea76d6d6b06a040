use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20260301_000001_create_organizations::Organization;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(VehicleType::Enum)
                    .values([
                        VehicleType::Truck,
                        VehicleType::Van,
                        VehicleType::Motorcycle,
                        VehicleType::Car,
                        VehicleType::Bus,
                        VehicleType::Other,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(VehicleStatus::Enum)
                    .values([
                        VehicleStatus::Active,
                        VehicleStatus::Maintenance,
                        VehicleStatus::Inactive,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(uuid(Vehicle::Id).primary_key())
                    .col(uuid(Vehicle::OrganizationId).not_null())
                    .col(
                        ColumnDef::new(Vehicle::VehicleType)
                            .custom(VehicleType::Enum)
                            .not_null(),
                    )
                    .col(string_len(Vehicle::Brand, 100).not_null())
                    .col(string_len(Vehicle::Model, 100).not_null())
                    .col(string_len(Vehicle::LicensePlate, 20).not_null().unique_key())
                    .col(integer(Vehicle::Year).not_null())
                    .col(double(Vehicle::CapacityWeightMin).not_null())
                    .col(double(Vehicle::CapacityWeightMax).not_null())
                    .col(integer(Vehicle::CapacityPackagesMin).not_null())
                    .col(integer(Vehicle::CapacityPackagesMax).not_null())
                    .col(
                        ColumnDef::new(Vehicle::Status)
                            .custom(VehicleStatus::Enum)
                            .not_null(),
                    )
                    .col(uuid_null(Vehicle::CurrentDriverId))
                    .col(
                        timestamp_with_time_zone(Vehicle::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Vehicle::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_organization")
                            .from(Vehicle::Table, Vehicle::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicle::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(VehicleStatus::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(VehicleType::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Vehicle {
    Table,
    Id,
    OrganizationId,
    VehicleType,
    Brand,
    Model,
    LicensePlate,
    Year,
    CapacityWeightMin,
    CapacityWeightMax,
    CapacityPackagesMin,
    CapacityPackagesMax,
    Status,
    CurrentDriverId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum VehicleType {
    #[sea_orm(iden = "vehicle_type")]
    Enum,
    #[sea_orm(iden = "truck")]
    Truck,
    #[sea_orm(iden = "van")]
    Van,
    #[sea_orm(iden = "motorcycle")]
    Motorcycle,
    #[sea_orm(iden = "car")]
    Car,
    #[sea_orm(iden = "bus")]
    Bus,
    #[sea_orm(iden = "other")]
    Other,
}

#[derive(DeriveIden)]
pub enum VehicleStatus {
    #[sea_orm(iden = "vehicle_status")]
    Enum,
    #[sea_orm(iden = "active")]
    Active,
    #[sea_orm(iden = "maintenance")]
    Maintenance,
    #[sea_orm(iden = "inactive")]
    Inactive,
}
