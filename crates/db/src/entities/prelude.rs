//! Entity re-exports.

pub use super::accounts::Entity as Accounts;
pub use super::companies::Entity as Companies;
pub use super::journal_headers::Entity as JournalHeaders;
pub use super::journal_lines::Entity as JournalLines;
