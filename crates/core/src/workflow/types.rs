//! Actor roles and workflow action variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use remit_shared::types::UserId;

use crate::invoice::{Hold, InvoiceStatus, Rejection, Tombstone};

/// Role of the actor performing a lifecycle action.
///
/// Roles are ordered from lowest to highest privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Can create and edit their own invoices; creations need approval.
    StandardUser = 0,
    /// Can approve, reject, hold, and skip the approval queue.
    Admin = 1,
    /// Full access; every admin power applies.
    SuperAdmin = 2,
}

impl ActorRole {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard_user" => Some(Self::StandardUser),
            "admin" => Some(Self::Admin),
            "super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StandardUser => "standard_user",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Returns true for roles with administrator powers.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated state transition with its audit payload.
///
/// Each variant captures the resulting status and the metadata the
/// repository persists alongside it.
#[derive(Debug, Clone)]
pub enum WorkflowAction {
    /// Approve a pending invoice.
    Approve {
        /// The new status after approval.
        new_status: InvoiceStatus,
        /// The administrator who approved.
        approved_by: UserId,
        /// When the invoice was approved.
        approved_at: DateTime<Utc>,
    },
    /// Reject a pending invoice.
    Reject {
        /// The new status after rejection.
        new_status: InvoiceStatus,
        /// Rejection metadata stored on the invoice.
        rejection: Rejection,
    },
    /// Suspend payments on an invoice.
    Hold {
        /// The new status after the hold.
        new_status: InvoiceStatus,
        /// Hold metadata stored on the invoice.
        hold: Hold,
    },
    /// Lift a hold, returning to the balance-derived status.
    Release {
        /// The status derived from the current remaining balance.
        new_status: InvoiceStatus,
        /// The administrator who released the hold.
        released_by: UserId,
        /// When the hold was lifted.
        released_at: DateTime<Utc>,
    },
    /// Soft-delete an invoice, starting the recovery window.
    SoftDelete {
        /// The tombstone to store; status is left untouched.
        tombstone: Tombstone,
    },
    /// Bring a soft-deleted invoice back before its deadline.
    Restore {
        /// Who restored the invoice.
        restored_by: UserId,
        /// When.
        restored_at: DateTime<Utc>,
    },
}

impl WorkflowAction {
    /// Returns the new status resulting from this action, when it changes one.
    #[must_use]
    pub fn new_status(&self) -> Option<InvoiceStatus> {
        match self {
            Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Hold { new_status, .. }
            | Self::Release { new_status, .. } => Some(*new_status),
            Self::SoftDelete { .. } | Self::Restore { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [
            ActorRole::StandardUser,
            ActorRole::Admin,
            ActorRole::SuperAdmin,
        ] {
            assert_eq!(ActorRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(ActorRole::parse("owner"), None);
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!(ActorRole::parse("ADMIN"), Some(ActorRole::Admin));
        assert_eq!(
            ActorRole::parse("Super_Admin"),
            Some(ActorRole::SuperAdmin)
        );
    }

    #[test]
    fn test_admin_powers() {
        assert!(!ActorRole::StandardUser.is_admin());
        assert!(ActorRole::Admin.is_admin());
        assert!(ActorRole::SuperAdmin.is_admin());
    }

    #[test]
    fn test_role_ordering() {
        assert!(ActorRole::StandardUser < ActorRole::Admin);
        assert!(ActorRole::Admin < ActorRole::SuperAdmin);
    }
}
