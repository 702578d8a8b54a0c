use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SearchCounters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchCounters::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SearchCounters::SearchKey)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SearchCounters::Count)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(SearchCounters::MovieId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SearchCounters::PosterUrl).string().not_null())
                    .col(ColumnDef::new(SearchCounters::Title).string().not_null())
                    .col(ColumnDef::new(SearchCounters::CreatedAt).string().not_null())
                    .col(ColumnDef::new(SearchCounters::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_search_counters_count")
                    .table(SearchCounters::Table)
                    .col(SearchCounters::Count)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchCounters::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SearchCounters {
    Table,
    Id,
    SearchKey,
    Count,
    MovieId,
    PosterUrl,
    Title,
    CreatedAt,
    UpdatedAt,
}
