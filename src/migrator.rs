use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_categories_table::Migration),
            Box::new(m20250101_000002_create_products_table::Migration),
            Box::new(m20250101_000003_create_clients_table::Migration),
            Box::new(m20250101_000004_create_client_phones_table::Migration),
            Box::new(m20250101_000005_create_loads_table::Migration),
            Box::new(m20250101_000006_create_sheet_loads_table::Migration),
            Box::new(m20250101_000007_create_transactions_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250101_000001_create_categories_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_categories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Categories::Name)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Categories::Description).text().null())
                        .col(ColumnDef::new(Categories::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Categories {
        Table,
        Id,
        Name,
        Description,
        CreatedAt,
    }
}

mod m20250101_000002_create_products_table {

    use sea_orm_migration::prelude::*;

    use super::m20250101_000001_create_categories_table::Categories;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Products::Model)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(ColumnDef::new(Products::CategoryId).uuid().not_null())
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::PriceDistribution)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::MinStock)
                                .integer()
                                .not_null()
                                .default(10),
                        )
                        .col(ColumnDef::new(Products::ImageUrl).string().null())
                        .col(
                            ColumnDef::new(Products::LastUpdated)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_category_id")
                                .from(Products::Table, Products::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_model")
                        .table(Products::Table)
                        .col(Products::Model)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_category_id")
                        .table(Products::Table)
                        .col(Products::CategoryId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Products {
        Table,
        Id,
        Model,
        Description,
        CategoryId,
        Price,
        PriceDistribution,
        Stock,
        MinStock,
        ImageUrl,
        LastUpdated,
    }
}

mod m20250101_000003_create_clients_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_clients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Clients::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Clients::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Clients::BusinessName)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Clients::TaxId)
                                .string_len(20)
                                .null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Clients::Email).string_len(100).null())
                        .col(ColumnDef::new(Clients::LegalAddress).text().null())
                        .col(
                            ColumnDef::new(Clients::RegistrationDate)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_clients_business_name")
                        .table(Clients::Table)
                        .col(Clients::BusinessName)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Clients::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Clients {
        Table,
        Id,
        BusinessName,
        TaxId,
        Email,
        LegalAddress,
        RegistrationDate,
    }
}

mod m20250101_000004_create_client_phones_table {

    use sea_orm_migration::prelude::*;

    use super::m20250101_000003_create_clients_table::Clients;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_client_phones_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ClientPhones::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ClientPhones::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ClientPhones::ClientId).uuid().not_null())
                        .col(
                            ColumnDef::new(ClientPhones::Number)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ClientPhones::Label).string_len(50).null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_client_phones_client_id")
                                .from(ClientPhones::Table, ClientPhones::ClientId)
                                .to(Clients::Table, Clients::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_client_phones_client_id")
                        .table(ClientPhones::Table)
                        .col(ClientPhones::ClientId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ClientPhones::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum ClientPhones {
        Table,
        Id,
        ClientId,
        Number,
        Label,
    }
}

mod m20250101_000005_create_loads_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_loads_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Loads::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Loads::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Loads::FileName)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Loads::LoadType).string_len(10).not_null())
                        .col(ColumnDef::new(Loads::LoadDate).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Loads::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Loads {
        Table,
        Id,
        FileName,
        LoadType,
        LoadDate,
    }
}

mod m20250101_000006_create_sheet_loads_table {

    use sea_orm_migration::prelude::*;

    use super::m20250101_000003_create_clients_table::Clients;
    use super::m20250101_000005_create_loads_table::Loads;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_sheet_loads_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SheetLoads::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SheetLoads::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SheetLoads::LoadId).uuid().not_null())
                        .col(
                            ColumnDef::new(SheetLoads::SheetName)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(ColumnDef::new(SheetLoads::ClientId).uuid().null())
                        .col(
                            ColumnDef::new(SheetLoads::ProcessedDate)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sheet_loads_load_id")
                                .from(SheetLoads::Table, SheetLoads::LoadId)
                                .to(Loads::Table, Loads::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sheet_loads_client_id")
                                .from(SheetLoads::Table, SheetLoads::ClientId)
                                .to(Clients::Table, Clients::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sheet_loads_load_id")
                        .table(SheetLoads::Table)
                        .col(SheetLoads::LoadId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SheetLoads::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum SheetLoads {
        Table,
        Id,
        LoadId,
        SheetName,
        ClientId,
        ProcessedDate,
    }
}

mod m20250101_000007_create_transactions_table {

    use sea_orm_migration::prelude::*;

    use super::m20250101_000002_create_products_table::Products;
    use super::m20250101_000006_create_sheet_loads_table::SheetLoads;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000007_create_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Transactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Transactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transactions::ProductId).uuid().not_null())
                        .col(ColumnDef::new(Transactions::Type).string_len(10).not_null())
                        .col(ColumnDef::new(Transactions::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(Transactions::UnitPrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transactions::TransactionDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transactions::SheetLoadId).uuid().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_product_id")
                                .from(Transactions::Table, Transactions::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_sheet_load_id")
                                .from(Transactions::Table, Transactions::SheetLoadId)
                                .to(SheetLoads::Table, SheetLoads::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transactions_product_id")
                        .table(Transactions::Table)
                        .col(Transactions::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transactions_date")
                        .table(Transactions::Table)
                        .col(Transactions::TransactionDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transactions_sheet_load_id")
                        .table(Transactions::Table)
                        .col(Transactions::SheetLoadId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Transactions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Transactions {
        Table,
        Id,
        ProductId,
        Type,
        Quantity,
        UnitPrice,
        TransactionDate,
        SheetLoadId,
    }
}
