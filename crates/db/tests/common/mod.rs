//! Shared fixtures for repository integration tests.
//!
//! Each test gets its own in-memory SQLite database with the migrations
//! applied. The pool holds a single connection so the database lives as long
//! as the pool.

#![allow(dead_code)]

use chrono::NaiveDate;
use partida_core::ledger::{EntryType, LineInput};
use partida_db::migration::{Migrator, MigratorTrait};
use partida_db::repositories::{
    AccountRepository, CompanyRepository, CreateAccountInput, CreateCompanyInput,
    CreateEntryInput, JournalRepository,
};
use partida_shared::types::{AccountId, BranchId, CompanyId, PeriodId};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    db
}

pub struct Fixture {
    pub db: DatabaseConnection,
    pub accounts: AccountRepository,
    pub companies: CompanyRepository,
    pub journal: JournalRepository,
}

impl Fixture {
    pub async fn new() -> Self {
        let db = setup().await;
        Self {
            accounts: AccountRepository::new(db.clone()),
            companies: CompanyRepository::new(db.clone()),
            journal: JournalRepository::new(db.clone()),
            db,
        }
    }

    pub async fn company(&self, tax_id: &str) -> CompanyId {
        let company = self
            .companies
            .create(CreateCompanyInput {
                name: format!("Company {tax_id}"),
                tax_id: tax_id.to_string(),
                address: None,
                phone: None,
                period_id: PeriodId(1),
                active: true,
            })
            .await
            .expect("Failed to create company");
        CompanyId(company.id)
    }

    pub async fn account(&self, code: i32, postable: bool, parent: Option<AccountId>) -> AccountId {
        let account = self
            .accounts
            .create(account_input(code, postable, parent))
            .await
            .expect("Failed to create account");
        AccountId(account.id)
    }
}

pub fn account_input(code: i32, postable: bool, parent: Option<AccountId>) -> CreateAccountInput {
    CreateAccountInput {
        name: format!("Account {code}"),
        alt_name: None,
        code,
        postable,
        currency: Some("USD".to_string()),
        category: None,
        description: None,
        parent_id: parent,
    }
}

pub fn line(account: AccountId, debit: Decimal, credit: Decimal) -> LineInput {
    LineInput::new(account, debit, credit)
}

pub fn entry(company: CompanyId, number: &str, lines: Vec<LineInput>) -> CreateEntryInput {
    CreateEntryInput {
        company_id: company,
        branch_id: BranchId(1),
        entry_type: EntryType::Manual,
        entry_number: number.to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date"),
        document: None,
        lines,
    }
}
