//! tracked_links 表迁移
//!
//! 每个追踪码一行，记录目标 URL、联系人与 agent 类型，
//! 以及首次点击和转化的标记。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrackedLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TrackedLinks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::TrackingId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::ContactId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TrackedLinks::ContactEmail).string_len(255).null())
                    .col(
                        ColumnDef::new(TrackedLinks::AgentType)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TrackedLinks::OriginalUrl).text().not_null())
                    .col(
                        ColumnDef::new(TrackedLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::Clicked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::ClickedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::Converted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::ConvertedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 追踪码唯一，冲突时插入直接失败
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracked_links_tracking_id")
                    .table(TrackedLinks::Table)
                    .col(TrackedLinks::TrackingId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 归因查询：按联系人找最近点击的链接
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracked_links_contact_id")
                    .table(TrackedLinks::Table)
                    .col(TrackedLinks::ContactId)
                    .col(TrackedLinks::ClickedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracked_links_created_at")
                    .table(TrackedLinks::Table)
                    .col(TrackedLinks::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracked_links_agent_type")
                    .table(TrackedLinks::Table)
                    .col(TrackedLinks::AgentType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_tracked_links_agent_type",
            "idx_tracked_links_created_at",
            "idx_tracked_links_contact_id",
            "idx_tracked_links_tracking_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).table(TrackedLinks::Table).to_owned())
                .await?;
        }

        manager
            .drop_table(Table::drop().table(TrackedLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TrackedLinks {
    #[sea_orm(iden = "tracked_links")]
    Table,
    Id,
    TrackingId,
    ContactId,
    ContactEmail,
    AgentType,
    OriginalUrl,
    CreatedAt,
    Clicked,
    ClickedAt,
    Converted,
    ConvertedAt,
}
