//! Initial database migration.
//!
//! Creates the bookkeeping tables. The schema is built with the sea-query
//! builder so the same migration runs on `PostgreSQL` and on `SQLite`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: COMPANIES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(pk(Companies::Id))
                    .col(ColumnDef::new(Companies::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Companies::TaxId)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Companies::Address).string_len(150).null())
                    .col(ColumnDef::new(Companies::Phone).string_len(30).null())
                    .col(ColumnDef::new(Companies::PeriodId).integer().not_null())
                    .col(
                        ColumnDef::new(Companies::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(pk(Accounts::Id))
                    .col(ColumnDef::new(Accounts::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Accounts::AltName).string_len(50).null())
                    .col(
                        ColumnDef::new(Accounts::Code)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Accounts::Postable).boolean().not_null())
                    .col(ColumnDef::new(Accounts::Currency).string_len(20).null())
                    .col(ColumnDef::new(Accounts::Category).string_len(50).null())
                    .col(ColumnDef::new(Accounts::Description).string_len(100).null())
                    .col(ColumnDef::new(Accounts::ParentId).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accounts_parent")
                            .from(Accounts::Table, Accounts::ParentId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_parent")
                    .table(Accounts::Table)
                    .col(Accounts::ParentId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 3: JOURNAL HEADERS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(JournalHeaders::Table)
                    .if_not_exists()
                    .col(pk(JournalHeaders::Id))
                    .col(ColumnDef::new(JournalHeaders::CompanyId).integer().not_null())
                    .col(ColumnDef::new(JournalHeaders::BranchId).integer().not_null())
                    .col(
                        ColumnDef::new(JournalHeaders::EntryType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JournalHeaders::EntryNumber)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(JournalHeaders::Date).date().not_null())
                    .col(ColumnDef::new(JournalHeaders::Document).string_len(50).null())
                    .col(amount(JournalHeaders::TotalDebit))
                    .col(amount(JournalHeaders::TotalCredit))
                    .col(
                        ColumnDef::new(JournalHeaders::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(timestamp(JournalHeaders::CreatedAt))
                    .col(timestamp(JournalHeaders::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_journal_headers_company")
                            .from(JournalHeaders::Table, JournalHeaders::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_journal_company_number")
                    .table(JournalHeaders::Table)
                    .col(JournalHeaders::CompanyId)
                    .col(JournalHeaders::EntryNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journal_headers_company_date")
                    .table(JournalHeaders::Table)
                    .col(JournalHeaders::CompanyId)
                    .col(JournalHeaders::Date)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 4: JOURNAL LINES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(JournalLines::Table)
                    .if_not_exists()
                    .col(pk(JournalLines::Id))
                    .col(ColumnDef::new(JournalLines::HeaderId).integer().not_null())
                    .col(ColumnDef::new(JournalLines::AccountId).integer().not_null())
                    .col(
                        amount(JournalLines::Debit)
                            .check(Expr::col(JournalLines::Debit).gte(0)),
                    )
                    .col(
                        amount(JournalLines::Credit)
                            .check(Expr::col(JournalLines::Credit).gte(0)),
                    )
                    .col(ColumnDef::new(JournalLines::Memo).string_len(100).null())
                    .col(timestamp(JournalLines::CreatedAt))
                    .col(timestamp(JournalLines::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_journal_lines_header")
                            .from(JournalLines::Table, JournalLines::HeaderId)
                            .to(JournalHeaders::Table, JournalHeaders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_journal_lines_account")
                            .from(JournalLines::Table, JournalLines::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journal_lines_header")
                    .table(JournalLines::Table)
                    .col(JournalLines::HeaderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journal_lines_account")
                    .table(JournalLines::Table)
                    .col(JournalLines::AccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JournalLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JournalHeaders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn amount<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .decimal_len(15, 2)
        .not_null()
        .default(0)
        .to_owned()
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    Name,
    TaxId,
    Address,
    Phone,
    PeriodId,
    Active,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Name,
    AltName,
    Code,
    Postable,
    Currency,
    Category,
    Description,
    ParentId,
}

#[derive(DeriveIden)]
enum JournalHeaders {
    Table,
    Id,
    CompanyId,
    BranchId,
    EntryType,
    EntryNumber,
    Date,
    Document,
    TotalDebit,
    TotalCredit,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum JournalLines {
    Table,
    Id,
    HeaderId,
    AccountId,
    Debit,
    Credit,
    Memo,
    CreatedAt,
    UpdatedAt,
}
