use anyhow::Result;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::prelude::*;
use std::time::Duration;
use tracing::{error, info};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_model_predictions_table::Migration),
            Box::new(m20240101_000003_create_batch_jobs_table::Migration),
            Box::new(m20240101_000004_create_model_status_table::Migration),
        ]
    }
}

mod m20240101_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Schema only; no endpoint reads or writes users
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Password).string().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Username,
        Password,
    }
}

mod m20240101_000002_create_model_predictions_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_model_predictions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ModelPredictions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ModelPredictions::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ModelPredictions::ModelType).string().not_null())
                        .col(ColumnDef::new(ModelPredictions::InputData).json().not_null())
                        .col(ColumnDef::new(ModelPredictions::Prediction).json().not_null())
                        .col(ColumnDef::new(ModelPredictions::Confidence).double().null())
                        .col(
                            ColumnDef::new(ModelPredictions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_model_predictions_model_type")
                        .table(ModelPredictions::Table)
                        .col(ModelPredictions::ModelType)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ModelPredictions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ModelPredictions {
        Table,
        Id,
        ModelType,
        InputData,
        Prediction,
        Confidence,
        CreatedAt,
    }
}

mod m20240101_000003_create_batch_jobs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_batch_jobs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BatchJobs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BatchJobs::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(BatchJobs::Filename).string().not_null())
                        .col(ColumnDef::new(BatchJobs::ModelType).string().not_null())
                        .col(
                            ColumnDef::new(BatchJobs::Status)
                                .string()
                                .not_null()
                                .default("queued"),
                        )
                        .col(ColumnDef::new(BatchJobs::TotalRows).integer().not_null())
                        .col(
                            ColumnDef::new(BatchJobs::ProcessedRows)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(BatchJobs::Results).json().null())
                        .col(ColumnDef::new(BatchJobs::ErrorMessage).text().null())
                        .col(
                            ColumnDef::new(BatchJobs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BatchJobs::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_batch_jobs_status")
                        .table(BatchJobs::Table)
                        .col(BatchJobs::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BatchJobs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum BatchJobs {
        Table,
        Id,
        Filename,
        ModelType,
        Status,
        TotalRows,
        ProcessedRows,
        Results,
        ErrorMessage,
        CreatedAt,
        CompletedAt,
    }
}

mod m20240101_000004_create_model_status_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_model_status_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ModelStatus::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ModelStatus::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ModelStatus::ModelType)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(ModelStatus::Status)
                                .string()
                                .not_null()
                                .default("not_trained"),
                        )
                        .col(ColumnDef::new(ModelStatus::Accuracy).double().null())
                        .col(
                            ColumnDef::new(ModelStatus::LastTrained)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ModelStatus::Version)
                                .string()
                                .not_null()
                                .default("1.0"),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ModelStatus::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ModelStatus {
        Table,
        Id,
        ModelType,
        Status,
        Accuracy,
        LastTrained,
        Version,
    }
}

// Database migration CLI runner
pub async fn run_migration(db_url: &str) -> Result<()> {
    info!("Setting up database connection for migrations");

    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(5)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;

    info!("Running database migrations");

    match Migrator::up(&db, None).await {
        Ok(_) => {
            info!("Migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Migration failed: {}", e);
            Err(e.into())
        }
    }
}
