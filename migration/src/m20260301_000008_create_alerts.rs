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
                    .as_enum(AlertSeverity::Enum)
                    .values([AlertSeverity::Info, AlertSeverity::Warning, AlertSeverity::Critical])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alert::Table)
                    .if_not_exists()
                    .col(uuid(Alert::Id).primary_key())
                    .col(uuid(Alert::OrganizationId).not_null())
                    .col(string_len(Alert::Kind, 50).not_null())
                    .col(
                        ColumnDef::new(Alert::Severity)
                            .custom(AlertSeverity::Enum)
                            .not_null(),
                    )
                    .col(string_len(Alert::Message, 500).not_null())
                    .col(uuid_null(Alert::VehicleId))
                    .col(uuid_null(Alert::DriverId))
                    .col(
                        timestamp_with_time_zone(Alert::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_organization")
                            .from(Alert::Table, Alert::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_vehicle")
                            .from(Alert::Table, Alert::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_driver")
                            .from(Alert::Table, Alert::DriverId)
                            .to(Driver::Table, Driver::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alert::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(AlertSeverity::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Alert {
    Table,
    Id,
    OrganizationId,
    Kind,
    Severity,
    Message,
    VehicleId,
    DriverId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum AlertSeverity {
    #[sea_orm(iden = "alert_severity")]
    Enum,
    #[sea_orm(iden = "info")]
    Info,
    #[sea_orm(iden = "warning")]
    Warning,
    #[sea_orm(iden = "critical")]
    Critical,
}
