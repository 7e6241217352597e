//! `SeaORM` entity definitions.

pub mod prelude;

pub mod accounts;
pub mod companies;
pub mod journal_headers;
pub mod journal_lines;
pub mod sea_orm_active_enums;
