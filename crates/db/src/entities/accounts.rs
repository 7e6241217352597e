//! `SeaORM` Entity for accounts table.

use partida_core::chart::ChartItem;
use partida_shared::types::AccountId;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub alt_name: Option<String>,
    #[sea_orm(unique)]
    pub code: i32,
    pub postable: bool,
    pub currency: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_delete = "Restrict"
    )]
    Parent,
    #[sea_orm(has_many = "super::journal_lines::Entity")]
    JournalLines,
}

impl Related<super::journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ChartItem for Model {
    fn id(&self) -> AccountId {
        AccountId(self.id)
    }

    fn parent_id(&self) -> Option<AccountId> {
        self.parent_id.map(AccountId)
    }
}
