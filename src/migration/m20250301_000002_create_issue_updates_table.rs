use super::m20250301_000001_create_issues_table::Issues;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum IssueUpdates {
    Table,
    Id,
    IssueId,
    Message,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IssueUpdates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IssueUpdates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IssueUpdates::IssueId).integer().not_null())
                    .col(ColumnDef::new(IssueUpdates::Message).text().not_null())
                    .col(
                        ColumnDef::new(IssueUpdates::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_updates_issue_id")
                            .from(IssueUpdates::Table, IssueUpdates::IssueId)
                            .to(Issues::Table, Issues::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_issue_updates_issue_id")
                    .table(IssueUpdates::Table)
                    .col(IssueUpdates::IssueId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IssueUpdates::Table).to_owned())
            .await
    }
}
