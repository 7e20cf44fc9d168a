use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
pub(super) enum Issues {
    Table,
    Id,
    ReportId,
    Title,
    Description,
    Category,
    Location,
    Urgency,
    Status,
    Photo,
    ReporterName,
    ReporterEmail,
    ReporterPhone,
    State,
    Pincode,
    UrgencyReason,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Issues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Issues::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Issues::ReportId).string_len(20).not_null())
                    .col(ColumnDef::new(Issues::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Issues::Description).text().not_null())
                    .col(ColumnDef::new(Issues::Category).string_len(20).not_null())
                    .col(ColumnDef::new(Issues::Location).text().not_null())
                    .col(
                        ColumnDef::new(Issues::Urgency)
                            .string_len(10)
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(Issues::Status)
                            .string_len(20)
                            .not_null()
                            .default("submitted"),
                    )
                    .col(ColumnDef::new(Issues::Photo).text().null())
                    .col(ColumnDef::new(Issues::ReporterName).string_len(100).null())
                    .col(ColumnDef::new(Issues::ReporterEmail).string_len(255).null())
                    .col(ColumnDef::new(Issues::ReporterPhone).string_len(20).null())
                    .col(ColumnDef::new(Issues::State).string_len(100).null())
                    .col(ColumnDef::new(Issues::Pincode).string_len(10).null())
                    .col(ColumnDef::new(Issues::UrgencyReason).text().null())
                    .col(
                        ColumnDef::new(Issues::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Issues::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Report IDs are random; uniqueness is enforced here, not by the generator.
        manager
            .create_index(
                Index::create()
                    .name("idx_issues_report_id")
                    .table(Issues::Table)
                    .col(Issues::ReportId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_issues_created_at")
                    .table(Issues::Table)
                    .col(Issues::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_issues_status")
                    .table(Issues::Table)
                    .col(Issues::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Issues::Table).to_owned())
            .await
    }
}
