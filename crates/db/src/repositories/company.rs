//! Company repository.

use partida_core::ledger::LedgerError;
use partida_shared::types::{CompanyId, PageRequest, PageResponse, PeriodId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};

use super::{finish, optional_text, required_text};
use crate::entities::{companies, journal_headers};
use crate::error::{RepositoryResult, on_foreign_key, on_unique};

const NAME_MAX: usize = 100;
const TAX_ID_MAX: usize = 20;
const ADDRESS_MAX: usize = 150;
const PHONE_MAX: usize = 30;

/// Input for creating a company.
#[derive(Debug, Clone)]
pub struct CreateCompanyInput {
    /// Company name.
    pub name: String,
    /// Tax ID (globally unique).
    pub tax_id: String,
    /// Address.
    pub address: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Current fiscal period.
    pub period_id: PeriodId,
    /// Whether the company is active.
    pub active: bool,
}

/// Input for updating a company.
#[derive(Debug, Clone, Default)]
pub struct UpdateCompanyInput {
    /// Company name.
    pub name: Option<String>,
    /// Tax ID.
    pub tax_id: Option<String>,
    /// Address.
    pub address: Option<Option<String>>,
    /// Phone number.
    pub phone: Option<Option<String>>,
    /// Current fiscal period.
    pub period_id: Option<PeriodId>,
    /// Whether the company is active.
    pub active: Option<bool>,
}

/// Company repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a company.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateTaxId` if the tax ID is registered, or
    /// `ValidationFailed` for malformed fields.
    pub async fn create(&self, input: CreateCompanyInput) -> RepositoryResult<companies::Model> {
        let txn = self.db.begin().await?;
        let result = Self::insert_company(&txn, input).await;
        let company = finish(txn, result).await?;

        info!(company_id = company.id, "Company created");
        Ok(company)
    }

    async fn insert_company(
        txn: &DatabaseTransaction,
        input: CreateCompanyInput,
    ) -> RepositoryResult<companies::Model> {
        let name = required_text("name", &input.name, NAME_MAX)?;
        let tax_id = required_text("tax_id", &input.tax_id, TAX_ID_MAX)?;
        let address = optional_text("address", input.address, ADDRESS_MAX)?;
        let phone = optional_text("phone", input.phone, PHONE_MAX)?;

        if Self::tax_id_taken(txn, &tax_id, None).await? {
            warn!(tax_id = %tax_id, "Rejected duplicate tax ID");
            return Err(LedgerError::DuplicateTaxId(tax_id).into());
        }

        let company = companies::ActiveModel {
            name: Set(name),
            tax_id: Set(tax_id.clone()),
            address: Set(address),
            phone: Set(phone),
            period_id: Set(input.period_id.0),
            active: Set(input.active),
            ..Default::default()
        };

        company
            .insert(txn)
            .await
            .map_err(|e| on_unique(e, || LedgerError::DuplicateTaxId(tax_id)))
    }

    /// Finds a company by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the company does not exist.
    pub async fn get(&self, id: CompanyId) -> RepositoryResult<companies::Model> {
        let company = companies::Entity::find_by_id(id.0)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::company_not_found(id))?;
        Ok(company)
    }

    /// Lists a page of companies ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, page: PageRequest) -> RepositoryResult<PageResponse<companies::Model>> {
        let total = companies::Entity::find().count(&self.db).await?;
        let items = companies::Entity::find()
            .order_by_asc(companies::Column::Name)
            .order_by_asc(companies::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(total, items))
    }

    /// Updates a company.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `DuplicateTaxId` or `ValidationFailed`.
    pub async fn update(
        &self,
        id: CompanyId,
        input: UpdateCompanyInput,
    ) -> RepositoryResult<companies::Model> {
        let txn = self.db.begin().await?;
        let result = Self::update_company(&txn, id, input).await;
        let company = finish(txn, result).await?;

        info!(company_id = company.id, "Company updated");
        Ok(company)
    }

    async fn update_company(
        txn: &DatabaseTransaction,
        id: CompanyId,
        input: UpdateCompanyInput,
    ) -> RepositoryResult<companies::Model> {
        let company = companies::Entity::find_by_id(id.0)
            .one(txn)
            .await?
            .ok_or(LedgerError::company_not_found(id))?;

        let tax_id = match input.tax_id {
            Some(tax_id) => {
                let tax_id = required_text("tax_id", &tax_id, TAX_ID_MAX)?;
                if tax_id != company.tax_id && Self::tax_id_taken(txn, &tax_id, Some(id)).await? {
                    warn!(company_id = id.0, tax_id = %tax_id, "Rejected duplicate tax ID");
                    return Err(LedgerError::DuplicateTaxId(tax_id).into());
                }
                Some(tax_id)
            }
            None => None,
        };
        let conflict = tax_id.clone().unwrap_or_else(|| company.tax_id.clone());

        let mut active: companies::ActiveModel = company.into();
        if let Some(name) = input.name {
            active.name = Set(required_text("name", &name, NAME_MAX)?);
        }
        if let Some(tax_id) = tax_id {
            active.tax_id = Set(tax_id);
        }
        if let Some(address) = input.address {
            active.address = Set(optional_text("address", address, ADDRESS_MAX)?);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(optional_text("phone", phone, PHONE_MAX)?);
        }
        if let Some(period_id) = input.period_id {
            active.period_id = Set(period_id.0);
        }
        if let Some(is_active) = input.active {
            active.active = Set(is_active);
        }

        active
            .update(txn)
            .await
            .map_err(|e| on_unique(e, || LedgerError::DuplicateTaxId(conflict)))
    }

    /// Deletes a company.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `InUse` while journal entries reference it.
    pub async fn delete(&self, id: CompanyId) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;
        let result = Self::delete_company(&txn, id).await;
        finish(txn, result).await?;

        info!(company_id = id.0, "Company deleted");
        Ok(())
    }

    async fn delete_company(txn: &DatabaseTransaction, id: CompanyId) -> RepositoryResult<()> {
        companies::Entity::find_by_id(id.0)
            .one(txn)
            .await?
            .ok_or(LedgerError::company_not_found(id))?;

        let in_use = LedgerError::InUse {
            entity: "Company",
            id: id.0,
        };
        let entries = journal_headers::Entity::find()
            .filter(journal_headers::Column::CompanyId.eq(id.0))
            .count(txn)
            .await?;
        if entries > 0 {
            warn!(company_id = id.0, entries, "Rejected company delete");
            return Err(in_use.into());
        }

        companies::Entity::delete_by_id(id.0)
            .exec(txn)
            .await
            .map_err(|e| on_foreign_key(e, || in_use))?;
        Ok(())
    }

    async fn tax_id_taken(
        txn: &DatabaseTransaction,
        tax_id: &str,
        exclude: Option<CompanyId>,
    ) -> RepositoryResult<bool> {
        let mut query = companies::Entity::find().filter(companies::Column::TaxId.eq(tax_id));
        if let Some(exclude) = exclude {
            query = query.filter(companies::Column::Id.ne(exclude.0));
        }
        Ok(query.count(txn).await? > 0)
    }
}
