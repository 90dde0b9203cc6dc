//! Typed IDs for type-safe entity references.
//!
//! Every entity is identified client-side with a UUID v7, which embeds the
//! creation timestamp, so ids sort in creation order. Typed wrappers keep a
//! `VendorId` from being passed where a `ProjectId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(ProjectId, "Unique identifier for a project site or godown.");
typed_id!(VendorId, "Unique identifier for a supplier.");
typed_id!(MaterialId, "Unique identifier for a material type.");
typed_id!(
    StockEntryId,
    "Unique identifier for a stock history line. Inward lines double as batch ids."
);
typed_id!(ExpenseId, "Unique identifier for an expense.");
typed_id!(PaymentId, "Unique identifier for a vendor payment.");
typed_id!(InvoiceId, "Unique identifier for a client invoice.");
typed_id!(IncomeId, "Unique identifier for a collection against an invoice.");

/// Batches are identified by the inward stock entry that opened them.
pub type BatchId = StockEntryId;
