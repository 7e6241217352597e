//! Typed IDs for type-safe entity references.
//!
//! Every table uses an auto-increment integer key; wrapping it prevents passing
//! an `AccountId` where a `CompanyId` is expected.

use serde::{Deserialize, Serialize};

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            /// Returns the inner integer key.
            #[must_use]
            pub const fn into_inner(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

typed_id!(AccountId, "Identifier of a chart of accounts entry.");
typed_id!(CompanyId, "Identifier of a company.");
typed_id!(BranchId, "Identifier of a company branch.");
typed_id!(EntryId, "Identifier of a journal entry header.");
typed_id!(LineId, "Identifier of a journal entry line.");
typed_id!(PeriodId, "Identifier of a fiscal period.");
