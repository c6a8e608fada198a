use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240401_000001_create_memos_table::Migration),
            Box::new(m20240401_000002_create_lorry_receipts_table::Migration),
            Box::new(m20240401_000003_create_cash_memos_table::Migration),
            Box::new(m20240401_000004_create_fiscal_year_tables::Migration),
            Box::new(m20240401_000005_create_delivery_persons_table::Migration),
            Box::new(m20240401_000006_create_suggestions_table::Migration),
            Box::new(m20240401_000007_create_audit_logs_table::Migration),
            Box::new(m20240401_000008_create_users_table::Migration),
            Box::new(m20240401_000009_create_app_keys_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240401_000001_create_memos_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000001_create_memos_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Memos::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Memos::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Memos::FiscalYear).integer().not_null())
                        .col(ColumnDef::new(Memos::MemoNo).string().not_null())
                        .col(ColumnDef::new(Memos::MemoDate).date().not_null())
                        .col(ColumnDef::new(Memos::ArrivalDate).date().not_null())
                        .col(ColumnDef::new(Memos::ArrivalTime).time().null())
                        .col(ColumnDef::new(Memos::TruckNo).string().not_null())
                        .col(ColumnDef::new(Memos::DriverOwner).string().null())
                        .col(
                            ColumnDef::new(Memos::TotalLorryHire)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Memos::AdvanceLorryHire)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Memos::CreatedBy).string().null())
                        .col(ColumnDef::new(Memos::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Memos::UpdatedBy).string().null())
                        .col(ColumnDef::new(Memos::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // Business number is unique within one fiscal year
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_memos_year_memo_no")
                        .table(Memos::Table)
                        .col(Memos::FiscalYear)
                        .col(Memos::MemoNo)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_memos_arrival_date")
                        .table(Memos::Table)
                        .col(Memos::ArrivalDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_memos_truck_no")
                        .table(Memos::Table)
                        .col(Memos::TruckNo)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Memos::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Memos {
        Table,
        Id,
        FiscalYear,
        MemoNo,
        MemoDate,
        ArrivalDate,
        ArrivalTime,
        TruckNo,
        DriverOwner,
        TotalLorryHire,
        AdvanceLorryHire,
        CreatedBy,
        CreatedAt,
        UpdatedBy,
        UpdatedAt,
    }
}

mod m20240401_000002_create_lorry_receipts_table {

    use sea_orm_migration::prelude::*;

    use super::m20240401_000001_create_memos_table::Memos;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000002_create_lorry_receipts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(LorryReceipts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(LorryReceipts::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LorryReceipts::FiscalYear)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(LorryReceipts::MemoId).integer().not_null())
                        .col(ColumnDef::new(LorryReceipts::LrNo).string().not_null())
                        .col(ColumnDef::new(LorryReceipts::LrDate).date().not_null())
                        .col(ColumnDef::new(LorryReceipts::FromCity).string().not_null())
                        .col(ColumnDef::new(LorryReceipts::ToCity).string().not_null())
                        .col(ColumnDef::new(LorryReceipts::Consignor).string().null())
                        .col(ColumnDef::new(LorryReceipts::Consignee).string().null())
                        .col(ColumnDef::new(LorryReceipts::Pkgs).integer().null())
                        .col(ColumnDef::new(LorryReceipts::Content).string().null())
                        .col(
                            ColumnDef::new(LorryReceipts::FreightType)
                                .string()
                                .not_null()
                                .default("Topay"),
                        )
                        .col(
                            ColumnDef::new(LorryReceipts::Freight)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(LorryReceipts::Weight).decimal().null())
                        .col(ColumnDef::new(LorryReceipts::DdRate).decimal().null())
                        .col(ColumnDef::new(LorryReceipts::DdTotal).decimal().null())
                        .col(ColumnDef::new(LorryReceipts::PmNo).string().null())
                        .col(
                            ColumnDef::new(LorryReceipts::Refund)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(LorryReceipts::Remarks).string().null())
                        .col(
                            ColumnDef::new(LorryReceipts::Status)
                                .string()
                                .not_null()
                                .default("Pending"),
                        )
                        .col(
                            ColumnDef::new(LorryReceipts::HasCashMemo)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(LorryReceipts::DeliveredBy).string().null())
                        .col(
                            ColumnDef::new(LorryReceipts::DeliveredAt)
                                .timestamp()
                                .null(),
                        )
                        .col(ColumnDef::new(LorryReceipts::CreatedBy).string().null())
                        .col(
                            ColumnDef::new(LorryReceipts::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(LorryReceipts::UpdatedBy).string().null())
                        .col(ColumnDef::new(LorryReceipts::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_lorry_receipts_memo_id")
                                .from(LorryReceipts::Table, LorryReceipts::MemoId)
                                .to(Memos::Table, Memos::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_lorry_receipts_year_lr_no")
                        .table(LorryReceipts::Table)
                        .col(LorryReceipts::FiscalYear)
                        .col(LorryReceipts::LrNo)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_lorry_receipts_memo_id")
                        .table(LorryReceipts::Table)
                        .col(LorryReceipts::MemoId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_lorry_receipts_status")
                        .table(LorryReceipts::Table)
                        .col(LorryReceipts::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(LorryReceipts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum LorryReceipts {
        Table,
        Id,
        FiscalYear,
        MemoId,
        LrNo,
        LrDate,
        FromCity,
        ToCity,
        Consignor,
        Consignee,
        Pkgs,
        Content,
        FreightType,
        Freight,
        Weight,
        DdRate,
        DdTotal,
        PmNo,
        Refund,
        Remarks,
        Status,
        HasCashMemo,
        DeliveredBy,
        DeliveredAt,
        CreatedBy,
        CreatedAt,
        UpdatedBy,
        UpdatedAt,
    }
}

mod m20240401_000003_create_cash_memos_table {

    use sea_orm_migration::prelude::*;

    use super::m20240401_000002_create_lorry_receipts_table::LorryReceipts;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000003_create_cash_memos_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CashMemos::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CashMemos::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CashMemos::FiscalYear).integer().not_null())
                        .col(
                            ColumnDef::new(CashMemos::CashMemoNo)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CashMemos::LrId).integer().not_null())
                        .col(
                            ColumnDef::new(CashMemos::Hamali)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CashMemos::Bc)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CashMemos::Landing)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CashMemos::Lc)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CashMemos::CashMemoTotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(CashMemos::CreatedBy).string().null())
                        .col(ColumnDef::new(CashMemos::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(CashMemos::UpdatedBy).string().null())
                        .col(ColumnDef::new(CashMemos::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cash_memos_lr_id")
                                .from(CashMemos::Table, CashMemos::LrId)
                                .to(LorryReceipts::Table, LorryReceipts::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cash_memos_year_no")
                        .table(CashMemos::Table)
                        .col(CashMemos::FiscalYear)
                        .col(CashMemos::CashMemoNo)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // One cash memo per lorry receipt
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cash_memos_lr_id")
                        .table(CashMemos::Table)
                        .col(CashMemos::LrId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CashMemos::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum CashMemos {
        Table,
        Id,
        FiscalYear,
        CashMemoNo,
        LrId,
        Hamali,
        Bc,
        Landing,
        Lc,
        CashMemoTotal,
        CreatedBy,
        CreatedAt,
        UpdatedBy,
        UpdatedAt,
    }
}

mod m20240401_000004_create_fiscal_year_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000004_create_fiscal_year_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(FiscalYears::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FiscalYears::Year)
                                .integer()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FiscalYears::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CashMemoSequences::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CashMemoSequences::FiscalYear)
                                .integer()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CashMemoSequences::LastNo)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CashMemoSequences::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(FiscalYears::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum FiscalYears {
        Table,
        Year,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum CashMemoSequences {
        Table,
        FiscalYear,
        LastNo,
    }
}

mod m20240401_000005_create_delivery_persons_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000005_create_delivery_persons_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DeliveryPersons::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DeliveryPersons::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryPersons::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(DeliveryPersons::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(DeliveryPersons::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DeliveryPersons::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum DeliveryPersons {
        Table,
        Id,
        Name,
        IsActive,
        CreatedAt,
    }
}

mod m20240401_000006_create_suggestions_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000006_create_suggestions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suggestions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suggestions::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Suggestions::Kind).string().not_null())
                        .col(ColumnDef::new(Suggestions::Name).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_suggestions_kind_name")
                        .table(Suggestions::Table)
                        .col(Suggestions::Kind)
                        .col(Suggestions::Name)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Suggestions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Suggestions {
        Table,
        Id,
        Kind,
        Name,
    }
}

mod m20240401_000007_create_audit_logs_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000007_create_audit_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AuditLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AuditLogs::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AuditLogs::User).string().not_null())
                        .col(ColumnDef::new(AuditLogs::Action).string().not_null())
                        .col(ColumnDef::new(AuditLogs::Entity).string().not_null())
                        .col(ColumnDef::new(AuditLogs::EntityNo).string().null())
                        .col(ColumnDef::new(AuditLogs::Year).integer().null())
                        .col(ColumnDef::new(AuditLogs::OldData).json().null())
                        .col(ColumnDef::new(AuditLogs::NewData).json().null())
                        .col(ColumnDef::new(AuditLogs::Details).string().null())
                        .col(ColumnDef::new(AuditLogs::Timestamp).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_audit_logs_year_timestamp")
                        .table(AuditLogs::Table)
                        .col(AuditLogs::Year)
                        .col(AuditLogs::Timestamp)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum AuditLogs {
        Table,
        Id,
        User,
        Action,
        Entity,
        EntityNo,
        Year,
        OldData,
        NewData,
        Details,
        Timestamp,
    }
}

mod m20240401_000008_create_users_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000008_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Users::Role)
                                .string()
                                .not_null()
                                .default("low"),
                        )
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
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
    pub(super) enum Users {
        Table,
        Id,
        Username,
        PasswordHash,
        Role,
        CreatedAt,
    }
}

mod m20240401_000009_create_app_keys_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000009_create_app_keys_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AppKeys::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AppKeys::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AppKeys::KeyType)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(AppKeys::KeyHash).string().not_null())
                        .col(ColumnDef::new(AppKeys::UsageLimit).integer().null())
                        .col(
                            ColumnDef::new(AppKeys::UsageCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(AppKeys::UpdatedBy).string().null())
                        .col(ColumnDef::new(AppKeys::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AppKeys::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum AppKeys {
        Table,
        Id,
        KeyType,
        KeyHash,
        UsageLimit,
        UsageCount,
        UpdatedBy,
        UpdatedAt,
    }
}
