use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_and_stores::Migration),
            Box::new(m20240101_000002_create_vendor_tables::Migration),
            Box::new(m20240101_000003_create_rfq_tables::Migration),
            Box::new(m20240101_000004_create_bid_tables::Migration),
            Box::new(m20240101_000005_create_inventory_tables::Migration),
            Box::new(m20240101_000006_create_stock_request_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_users_and_stores {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_and_stores"
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
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::PhoneNumber).string().null())
                        .col(ColumnDef::new(Users::Role).string_len(20).not_null())
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Stores::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Stores::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Stores::StoreName)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Stores::Location).string().not_null())
                        .col(
                            ColumnDef::new(Stores::ManagerUserId)
                                .integer()
                                .null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Stores::PharmacistUserId)
                                .integer()
                                .null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Stores::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Stores::UpdatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stores_manager_user_id")
                                .from(Stores::Table, Stores::ManagerUserId)
                                .to(Users::Table, Users::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stores_pharmacist_user_id")
                                .from(Stores::Table, Stores::PharmacistUserId)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Stores::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        PhoneNumber,
        Role,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Stores {
        Table,
        Id,
        StoreName,
        Location,
        ManagerUserId,
        PharmacistUserId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_vendor_tables {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_users_and_stores::Users;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_vendor_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vendors::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Vendors::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Vendors::BusinessName).string().not_null())
                        .col(
                            ColumnDef::new(Vendors::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Vendors::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Vendors::GstNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Vendors::LicenseNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Vendors::Address).string().not_null())
                        .col(ColumnDef::new(Vendors::Status).string_len(20).not_null())
                        .col(ColumnDef::new(Vendors::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Vendors::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_vendors_status")
                        .table(Vendors::Table)
                        .col(Vendors::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(VendorDocuments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VendorDocuments::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(VendorDocuments::VendorId).integer().not_null())
                        .col(ColumnDef::new(VendorDocuments::DocType).string().not_null())
                        .col(ColumnDef::new(VendorDocuments::FileUrl).string().not_null())
                        .col(
                            ColumnDef::new(VendorDocuments::Status)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(VendorDocuments::VerifiedBy).integer().null())
                        .col(
                            ColumnDef::new(VendorDocuments::VerifiedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(ColumnDef::new(VendorDocuments::Remarks).string().null())
                        .col(
                            ColumnDef::new(VendorDocuments::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VendorDocuments::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_vendor_documents_vendor_id")
                                .from(VendorDocuments::Table, VendorDocuments::VendorId)
                                .to(Vendors::Table, Vendors::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_vendor_documents_verified_by")
                                .from(VendorDocuments::Table, VendorDocuments::VerifiedBy)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_vendor_documents_vendor_id")
                        .table(VendorDocuments::Table)
                        .col(VendorDocuments::VendorId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(VendorDocuments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Vendors::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Vendors {
        Table,
        Id,
        BusinessName,
        Email,
        PasswordHash,
        GstNumber,
        LicenseNumber,
        Address,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum VendorDocuments {
        Table,
        Id,
        VendorId,
        DocType,
        FileUrl,
        Status,
        VerifiedBy,
        VerifiedAt,
        Remarks,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_rfq_tables {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_users_and_stores::{Stores, Users};
    use super::m20240101_000002_create_vendor_tables::Vendors;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_rfq_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Rfqs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Rfqs::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Rfqs::StoreId).integer().not_null())
                        .col(ColumnDef::new(Rfqs::CreatedBy).integer().not_null())
                        .col(ColumnDef::new(Rfqs::Status).string_len(20).not_null())
                        .col(ColumnDef::new(Rfqs::SubmissionDeadline).timestamp().null())
                        .col(
                            ColumnDef::new(Rfqs::ExpectedDeliveryDate)
                                .timestamp()
                                .null(),
                        )
                        .col(ColumnDef::new(Rfqs::SpecialInstructions).text().null())
                        .col(ColumnDef::new(Rfqs::AwardedVendorId).integer().null())
                        .col(ColumnDef::new(Rfqs::AwardedBidId).integer().null())
                        .col(ColumnDef::new(Rfqs::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Rfqs::UpdatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_rfqs_store_id")
                                .from(Rfqs::Table, Rfqs::StoreId)
                                .to(Stores::Table, Stores::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_rfqs_created_by")
                                .from(Rfqs::Table, Rfqs::CreatedBy)
                                .to(Users::Table, Users::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_rfqs_awarded_vendor_id")
                                .from(Rfqs::Table, Rfqs::AwardedVendorId)
                                .to(Vendors::Table, Vendors::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_rfqs_store_id")
                        .table(Rfqs::Table)
                        .col(Rfqs::StoreId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_rfqs_status")
                        .table(Rfqs::Table)
                        .col(Rfqs::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RfqItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RfqItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(RfqItems::RfqId).integer().not_null())
                        .col(ColumnDef::new(RfqItems::MedicineName).string().not_null())
                        .col(ColumnDef::new(RfqItems::QuantityNeeded).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_rfq_items_rfq_id")
                                .from(RfqItems::Table, RfqItems::RfqId)
                                .to(Rfqs::Table, Rfqs::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_rfq_items_rfq_id")
                        .table(RfqItems::Table)
                        .col(RfqItems::RfqId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RfqItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Rfqs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Rfqs {
        Table,
        Id,
        StoreId,
        CreatedBy,
        Status,
        SubmissionDeadline,
        ExpectedDeliveryDate,
        SpecialInstructions,
        AwardedVendorId,
        AwardedBidId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum RfqItems {
        Table,
        Id,
        RfqId,
        MedicineName,
        QuantityNeeded,
    }
}

mod m20240101_000004_create_bid_tables {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000002_create_vendor_tables::Vendors;
    use super::m20240101_000003_create_rfq_tables::Rfqs;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_bid_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Bids::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Bids::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Bids::RfqId).integer().not_null())
                        .col(ColumnDef::new(Bids::VendorId).integer().not_null())
                        .col(ColumnDef::new(Bids::Status).string_len(20).not_null())
                        .col(ColumnDef::new(Bids::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Bids::UpdatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bids_rfq_id")
                                .from(Bids::Table, Bids::RfqId)
                                .to(Rfqs::Table, Rfqs::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bids_vendor_id")
                                .from(Bids::Table, Bids::VendorId)
                                .to(Vendors::Table, Vendors::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bids_rfq_id")
                        .table(Bids::Table)
                        .col(Bids::RfqId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bids_vendor_id")
                        .table(Bids::Table)
                        .col(Bids::VendorId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BidItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BidItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(BidItems::BidId).integer().not_null())
                        .col(ColumnDef::new(BidItems::MedicineName).string().not_null())
                        .col(ColumnDef::new(BidItems::ItemQuantity).integer().not_null())
                        .col(
                            ColumnDef::new(BidItems::ItemPrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(BidItems::DeliveryDate).date().null())
                        .col(ColumnDef::new(BidItems::ExpiryDate).date().null())
                        .col(ColumnDef::new(BidItems::Notes).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bid_items_bid_id")
                                .from(BidItems::Table, BidItems::BidId)
                                .to(Bids::Table, Bids::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bid_items_bid_id")
                        .table(BidItems::Table)
                        .col(BidItems::BidId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BidItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Bids::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Bids {
        Table,
        Id,
        RfqId,
        VendorId,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum BidItems {
        Table,
        Id,
        BidId,
        MedicineName,
        ItemQuantity,
        ItemPrice,
        DeliveryDate,
        ExpiryDate,
        Notes,
    }
}

mod m20240101_000005_create_inventory_tables {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_users_and_stores::Stores;
    use super::m20240101_000002_create_vendor_tables::Vendors;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_inventory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Inventories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Inventories::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Inventories::StoreId)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Inventories::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Inventories::UpdatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventories_store_id")
                                .from(Inventories::Table, Inventories::StoreId)
                                .to(Stores::Table, Stores::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Batches::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Batches::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Batches::InventoryId).integer().not_null())
                        .col(ColumnDef::new(Batches::VendorId).integer().not_null())
                        .col(ColumnDef::new(Batches::BatchCode).string().null())
                        .col(ColumnDef::new(Batches::DeliveryDate).date().null())
                        .col(ColumnDef::new(Batches::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Batches::UpdatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_batches_inventory_id")
                                .from(Batches::Table, Batches::InventoryId)
                                .to(Inventories::Table, Inventories::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_batches_vendor_id")
                                .from(Batches::Table, Batches::VendorId)
                                .to(Vendors::Table, Vendors::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_batches_inventory_id")
                        .table(Batches::Table)
                        .col(Batches::InventoryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_batches_vendor_id")
                        .table(Batches::Table)
                        .col(Batches::VendorId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::BatchId).integer().not_null())
                        .col(ColumnDef::new(Products::ProductName).string().not_null())
                        .col(ColumnDef::new(Products::Category).string().not_null())
                        .col(ColumnDef::new(Products::QuantityTotal).integer().not_null())
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::ExpiryDate).date().null())
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_batch_id")
                                .from(Products::Table, Products::BatchId)
                                .to(Batches::Table, Batches::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_batch_id")
                        .table(Products::Table)
                        .col(Products::BatchId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_product_name")
                        .table(Products::Table)
                        .col(Products::ProductName)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Batches::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Inventories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Inventories {
        Table,
        Id,
        StoreId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Batches {
        Table,
        Id,
        InventoryId,
        VendorId,
        BatchCode,
        DeliveryDate,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        BatchId,
        ProductName,
        Category,
        QuantityTotal,
        Price,
        ExpiryDate,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000006_create_stock_request_tables {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_users_and_stores::{Stores, Users};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_stock_request_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockRequests::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(StockRequests::StoreId).integer().not_null())
                        .col(
                            ColumnDef::new(StockRequests::RequestedBy)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockRequests::ApprovedBy).integer().null())
                        .col(
                            ColumnDef::new(StockRequests::Status)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockRequests::Remarks).string().null())
                        .col(
                            ColumnDef::new(StockRequests::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockRequests::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_requests_store_id")
                                .from(StockRequests::Table, StockRequests::StoreId)
                                .to(Stores::Table, Stores::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_requests_requested_by")
                                .from(StockRequests::Table, StockRequests::RequestedBy)
                                .to(Users::Table, Users::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_requests_approved_by")
                                .from(StockRequests::Table, StockRequests::ApprovedBy)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_requests_store_id")
                        .table(StockRequests::Table)
                        .col(StockRequests::StoreId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_requests_status")
                        .table(StockRequests::Table)
                        .col(StockRequests::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StockRequestItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockRequestItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(StockRequestItems::StockRequestId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockRequestItems::MedicineName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockRequestItems::RequiredQuantity)
                                .integer()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_request_items_stock_request_id")
                                .from(
                                    StockRequestItems::Table,
                                    StockRequestItems::StockRequestId,
                                )
                                .to(StockRequests::Table, StockRequests::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_request_items_stock_request_id")
                        .table(StockRequestItems::Table)
                        .col(StockRequestItems::StockRequestId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockRequestItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockRequests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum StockRequests {
        Table,
        Id,
        StoreId,
        RequestedBy,
        ApprovedBy,
        Status,
        Remarks,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum StockRequestItems {
        Table,
        Id,
        StockRequestId,
        MedicineName,
        RequiredQuantity,
    }
}
