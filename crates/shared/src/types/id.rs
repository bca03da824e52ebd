//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `VendorId` where an `InvoiceId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
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

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(VendorId, "Unique identifier for a vendor.");
typed_id!(CategoryId, "Unique identifier for an expense category.");
typed_id!(EntityId, "Unique identifier for a billing entity.");
typed_id!(CurrencyId, "Unique identifier for a currency record.");
typed_id!(PaymentTypeId, "Unique identifier for a payment type.");
typed_id!(InvoiceId, "Unique identifier for an invoice.");
typed_id!(InvoiceProfileId, "Unique identifier for a recurring invoice profile.");
typed_id!(PaymentId, "Unique identifier for a payment.");
typed_id!(CreditNoteId, "Unique identifier for a credit note.");
typed_id!(AttachmentId, "Unique identifier for a file attachment.");
typed_id!(AuditEntryId, "Unique identifier for an audit log entry.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_id_roundtrip() {
        let id = InvoiceId::new();
        let parsed = InvoiceId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_ids_are_distinct_types() {
        let uuid = Uuid::now_v7();
        let invoice = InvoiceId::from_uuid(uuid);
        let vendor = VendorId::from_uuid(uuid);
        assert_eq!(invoice.into_inner(), vendor.into_inner());
    }

    #[test]
    fn test_invalid_parse() {
        assert!(InvoiceId::from_str("not-a-uuid").is_err());
    }
}
