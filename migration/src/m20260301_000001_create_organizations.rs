use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(OrganizationType::Enum)
                    .values([
                        OrganizationType::FreightForward,
                        OrganizationType::MovingCompany,
                        OrganizationType::Ecommerce,
                        OrganizationType::Corporate,
                        OrganizationType::LogisticsProvider,
                        OrganizationType::Other,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(VerificationStatus::Enum)
                    .values([
                        VerificationStatus::Pending,
                        VerificationStatus::Verified,
                        VerificationStatus::Rejected,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Organization::Table)
                    .if_not_exists()
                    .col(uuid(Organization::Id).primary_key())
                    .col(string_len(Organization::Name, 200).not_null())
                    .col(
                        ColumnDef::new(Organization::OrgType)
                            .custom(OrganizationType::Enum)
                            .not_null(),
                    )
                    .col(string_len(Organization::ContactEmail, 255).not_null())
                    .col(string_len_null(Organization::ContactPhone, 50))
                    .col(
                        ColumnDef::new(Organization::VerificationStatus)
                            .custom(VerificationStatus::Enum)
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(Organization::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Organization::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Organization::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(VerificationStatus::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(OrganizationType::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Organization {
    Table,
    Id,
    Name,
    OrgType,
    ContactEmail,
    ContactPhone,
    VerificationStatus,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum OrganizationType {
    #[sea_orm(iden = "organization_type")]
    Enum,
    #[sea_orm(iden = "freight_forward")]
    FreightForward,
    #[sea_orm(iden = "moving_company")]
    MovingCompany,
    #[sea_orm(iden = "ecommerce")]
    Ecommerce,
    #[sea_orm(iden = "corporate")]
    Corporate,
    #[sea_orm(iden = "logistics_provider")]
    LogisticsProvider,
    #[sea_orm(iden = "other")]
    Other,
}

#[derive(DeriveIden)]
pub enum VerificationStatus {
    #[sea_orm(iden = "verification_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "verified")]
    Verified,
    #[sea_orm(iden = "rejected")]
    Rejected,
}
