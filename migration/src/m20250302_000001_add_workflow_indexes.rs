use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Submissions {
    Table,
    AssignmentId,
    WorkerId,
    Status,
}

#[derive(DeriveIden)]
enum Withdrawals {
    Table,
    WorkerId,
    Status,
}

#[derive(DeriveIden)]
enum Assignments {
    Table,
    Status,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Worker views and the "current status" lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_worker_assignment")
                    .table(Submissions::Table)
                    .col(Submissions::WorkerId)
                    .col(Submissions::AssignmentId)
                    .to_owned(),
            )
            .await?;

        // Admin review queue
        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_status")
                    .table(Submissions::Table)
                    .col(Submissions::Status)
                    .to_owned(),
            )
            .await?;

        // Balance computation sums a worker's open withdrawals
        manager
            .create_index(
                Index::create()
                    .name("idx_withdrawals_worker_status")
                    .table(Withdrawals::Table)
                    .col(Withdrawals::WorkerId)
                    .col(Withdrawals::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assignments_status")
                    .table(Assignments::Table)
                    .col(Assignments::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_submissions_worker_assignment")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("idx_submissions_status").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_withdrawals_worker_status").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_assignments_status").to_owned())
            .await?;

        Ok(())
    }
}
