use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20260301_000005_create_trips::Trip;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(StopStatus::Enum)
                    .values([StopStatus::Pending, StopStatus::Completed, StopStatus::Skipped])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TripStop::Table)
                    .if_not_exists()
                    .col(uuid(TripStop::Id).primary_key())
                    .col(uuid(TripStop::TripId).not_null())
                    .col(integer(TripStop::Sequence).not_null())
                    .col(string_len(TripStop::Address, 255).not_null())
                    .col(string_len(TripStop::City, 100).not_null())
                    .col(string_len(TripStop::Country, 100).not_null())
                    .col(
                        ColumnDef::new(TripStop::Status)
                            .custom(StopStatus::Enum)
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(TripStop::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_stop_trip")
                            .from(TripStop::Table, TripStop::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trip_stop_trip_sequence")
                    .table(TripStop::Table)
                    .col(TripStop::TripId)
                    .col(TripStop::Sequence)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TripStop::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(StopStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TripStop {
    Table,
    Id,
    TripId,
    Sequence,
    Address,
    City,
    Country,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum StopStatus {
    #[sea_orm(iden = "stop_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "completed")]
    Completed,
    #[sea_orm(iden = "skipped")]
    Skipped,
}
