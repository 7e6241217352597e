//! `SeaORM` Entity for companies table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub tax_id: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub period_id: i32,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_headers::Entity")]
    JournalHeaders,
}

impl Related<super::journal_headers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalHeaders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
