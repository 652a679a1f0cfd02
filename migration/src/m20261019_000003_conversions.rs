//! conversions 表迁移

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Conversions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Conversions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Conversions::ContactId)
                            .string_len(255)
                            .not_null(),
                    )
                    // 未归因的转化为 NULL
                    .col(ColumnDef::new(Conversions::TrackingId).string_len(32).null())
                    .col(
                        ColumnDef::new(Conversions::ConversionType)
                            .string_len(64)
                            .not_null()
                            .default("appointment_booked"),
                    )
                    .col(
                        ColumnDef::new(Conversions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Conversions::Metadata).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_conversions_contact_id")
                    .table(Conversions::Table)
                    .col(Conversions::ContactId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_conversions_tracking_id")
                    .table(Conversions::Table)
                    .col(Conversions::TrackingId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_conversions_tracking_id")
                    .table(Conversions::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_conversions_contact_id")
                    .table(Conversions::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Conversions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Conversions {
    #[sea_orm(iden = "conversions")]
    Table,
    Id,
    ContactId,
    TrackingId,
    ConversionType,
    CreatedAt,
    Metadata,
}
