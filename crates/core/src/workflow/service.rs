//! State transition logic for the invoice lifecycle.

use chrono::{Duration, Utc};

use remit_shared::types::UserId;

use crate::invoice::{Hold, InvoiceFigures, InvoiceStatus, Rejection, Tombstone};
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ActorRole, WorkflowAction};

/// Minimum trimmed length for a rejection reason.
pub const MIN_REJECTION_REASON_LEN: usize = 10;

/// Stateless service for invoice lifecycle transitions.
///
/// Every transition is a pure function of
/// `(current status, actor role, ownership, input)`; call sites invoke
/// these instead of re-deriving the rules.
pub struct WorkflowService;

impl WorkflowService {
    /// The status a freshly created invoice starts in.
    ///
    /// Standard users enter the approval queue; administrators skip it.
    /// An invoice created as already paid goes straight to `Paid`
    /// regardless of role.
    #[must_use]
    pub fn initial_status(role: ActorRole, is_paid: bool) -> InvoiceStatus {
        if is_paid {
            InvoiceStatus::Paid
        } else if role.is_admin() {
            InvoiceStatus::Unpaid
        } else {
            InvoiceStatus::PendingApproval
        }
    }

    /// Approve a pending invoice.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::Forbidden` for non-administrators
    /// * `WorkflowError::InvalidState` unless currently pending approval
    pub fn approve(
        current: InvoiceStatus,
        role: ActorRole,
        approved_by: UserId,
    ) -> Result<WorkflowAction, WorkflowError> {
        if !role.is_admin() {
            return Err(WorkflowError::Forbidden {
                action: "approve",
                role,
            });
        }

        match current {
            InvoiceStatus::PendingApproval => Ok(WorkflowAction::Approve {
                new_status: InvoiceStatus::Unpaid,
                approved_by,
                approved_at: Utc::now(),
            }),
            _ => Err(WorkflowError::InvalidState {
                action: "approve",
                current,
            }),
        }
    }

    /// Reject a pending invoice.
    ///
    /// The reason is trimmed and stored verbatim; fewer than
    /// [`MIN_REJECTION_REASON_LEN`] characters after trimming is a
    /// validation failure.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::Forbidden` for non-administrators
    /// * `WorkflowError::ReasonTooShort` for a short reason
    /// * `WorkflowError::InvalidState` unless currently pending approval
    pub fn reject(
        current: InvoiceStatus,
        role: ActorRole,
        reason: &str,
        rejected_by: UserId,
    ) -> Result<WorkflowAction, WorkflowError> {
        if !role.is_admin() {
            return Err(WorkflowError::Forbidden {
                action: "reject",
                role,
            });
        }

        let reason = reason.trim();
        if reason.chars().count() < MIN_REJECTION_REASON_LEN {
            return Err(WorkflowError::ReasonTooShort {
                minimum: MIN_REJECTION_REASON_LEN,
            });
        }

        match current {
            InvoiceStatus::PendingApproval => Ok(WorkflowAction::Reject {
                new_status: InvoiceStatus::Rejected,
                rejection: Rejection {
                    reason: reason.to_string(),
                    rejected_by,
                    rejected_at: Utc::now(),
                },
            }),
            _ => Err(WorkflowError::InvalidState {
                action: "reject",
                current,
            }),
        }
    }

    /// Suspend payments on an invoice.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::Forbidden` for non-administrators
    /// * `WorkflowError::HoldReasonRequired` for a blank reason
    /// * `WorkflowError::AlreadyOnHold` when already on hold
    /// * `WorkflowError::InvalidState` from any other non-holdable status
    pub fn hold(
        current: InvoiceStatus,
        role: ActorRole,
        reason: &str,
        held_by: UserId,
    ) -> Result<WorkflowAction, WorkflowError> {
        if !role.is_admin() {
            return Err(WorkflowError::Forbidden {
                action: "hold",
                role,
            });
        }

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::HoldReasonRequired);
        }

        match current {
            InvoiceStatus::OnHold => Err(WorkflowError::AlreadyOnHold),
            InvoiceStatus::Unpaid | InvoiceStatus::PartiallyPaid | InvoiceStatus::Paid => {
                Ok(WorkflowAction::Hold {
                    new_status: InvoiceStatus::OnHold,
                    hold: Hold {
                        reason: reason.to_string(),
                        held_by,
                        held_at: Utc::now(),
                    },
                })
            }
            _ => Err(WorkflowError::InvalidState {
                action: "hold",
                current,
            }),
        }
    }

    /// Lift a hold, returning to the status the balance implies.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::Forbidden` for non-administrators
    /// * `WorkflowError::InvalidState` unless currently on hold
    pub fn release(
        current: InvoiceStatus,
        role: ActorRole,
        figures: &InvoiceFigures,
        released_by: UserId,
    ) -> Result<WorkflowAction, WorkflowError> {
        if !role.is_admin() {
            return Err(WorkflowError::Forbidden {
                action: "release",
                role,
            });
        }

        match current {
            InvoiceStatus::OnHold => Ok(WorkflowAction::Release {
                new_status: figures.settlement_status(),
                released_by,
                released_at: Utc::now(),
            }),
            _ => Err(WorkflowError::InvalidState {
                action: "release",
                current,
            }),
        }
    }

    /// The status outcome of an edit.
    ///
    /// Administrator edits never change status (`None`). A standard user
    /// may only edit their own unpaid or partially paid invoices, and the
    /// edit sends the invoice back through approval; edits are blocked
    /// entirely while approval is already pending.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::Forbidden` for a standard user editing someone
    ///   else's invoice
    /// * `WorkflowError::InvalidState` for non-editable statuses
    pub fn edit_outcome(
        current: InvoiceStatus,
        role: ActorRole,
        is_owner: bool,
    ) -> Result<Option<InvoiceStatus>, WorkflowError> {
        if role.is_admin() {
            return Ok(None);
        }

        if !is_owner {
            return Err(WorkflowError::Forbidden {
                action: "edit",
                role,
            });
        }

        match current {
            InvoiceStatus::Unpaid | InvoiceStatus::PartiallyPaid => {
                Ok(Some(InvoiceStatus::PendingApproval))
            }
            _ => Err(WorkflowError::InvalidState {
                action: "edit",
                current,
            }),
        }
    }

    /// Soft-delete a visible invoice, starting the recovery window.
    ///
    /// Status is left untouched; only the tombstone changes.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::Forbidden` unless the actor owns the invoice or
    ///   is an administrator
    /// * `WorkflowError::AlreadyHidden` when already soft-deleted
    pub fn soft_delete(
        tombstone: &Tombstone,
        role: ActorRole,
        is_owner: bool,
        hidden_by: UserId,
        reason: Option<String>,
        retention_days: i64,
    ) -> Result<WorkflowAction, WorkflowError> {
        if !role.is_admin() && !is_owner {
            return Err(WorkflowError::Forbidden {
                action: "delete",
                role,
            });
        }

        if tombstone.is_hidden() {
            return Err(WorkflowError::AlreadyHidden);
        }

        let now = Utc::now();
        Ok(WorkflowAction::SoftDelete {
            tombstone: Tombstone::Hidden {
                hidden_by,
                hidden_at: now,
                reason,
                deleted_at: now,
                recovery_deadline: now + Duration::days(retention_days),
            },
        })
    }

    /// Bring a hidden invoice back before the purge sweep removes it.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::Forbidden` unless the actor owns the invoice or
    ///   is an administrator
    /// * `WorkflowError::NotHidden` when the invoice is visible
    pub fn restore(
        tombstone: &Tombstone,
        role: ActorRole,
        is_owner: bool,
        restored_by: UserId,
    ) -> Result<WorkflowAction, WorkflowError> {
        if !role.is_admin() && !is_owner {
            return Err(WorkflowError::Forbidden {
                action: "restore",
                role,
            });
        }

        if !tombstone.is_hidden() {
            return Err(WorkflowError::NotHidden);
        }

        Ok(WorkflowAction::Restore {
            restored_by,
            restored_at: Utc::now(),
        })
    }

    /// Global guard: a hidden invoice rejects every mutating action.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Hidden` when the tombstone is set.
    pub fn guard_visible(tombstone: &Tombstone) -> Result<(), WorkflowError> {
        if tombstone.is_hidden() {
            return Err(WorkflowError::Hidden);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn figures(net: rust_decimal::Decimal, remaining: rust_decimal::Decimal) -> InvoiceFigures {
        InvoiceFigures {
            net_payable: net,
            total_paid: net - remaining,
            total_credited: rust_decimal::Decimal::ZERO,
            remaining_balance: remaining,
        }
    }

    #[test]
    fn test_initial_status_standard_user_needs_approval() {
        assert_eq!(
            WorkflowService::initial_status(ActorRole::StandardUser, false),
            InvoiceStatus::PendingApproval
        );
    }

    #[test]
    fn test_initial_status_admin_skips_approval() {
        assert_eq!(
            WorkflowService::initial_status(ActorRole::Admin, false),
            InvoiceStatus::Unpaid
        );
        assert_eq!(
            WorkflowService::initial_status(ActorRole::SuperAdmin, false),
            InvoiceStatus::Unpaid
        );
    }

    #[test]
    fn test_initial_status_paid_at_creation_wins_for_any_role() {
        for role in [
            ActorRole::StandardUser,
            ActorRole::Admin,
            ActorRole::SuperAdmin,
        ] {
            assert_eq!(
                WorkflowService::initial_status(role, true),
                InvoiceStatus::Paid
            );
        }
    }

    #[test]
    fn test_approve_from_pending_as_admin() {
        let action =
            WorkflowService::approve(InvoiceStatus::PendingApproval, ActorRole::Admin, UserId::new())
                .unwrap();
        assert_eq!(action.new_status(), Some(InvoiceStatus::Unpaid));
    }

    #[test]
    fn test_approve_forbidden_for_standard_user() {
        let result = WorkflowService::approve(
            InvoiceStatus::PendingApproval,
            ActorRole::StandardUser,
            UserId::new(),
        );
        assert!(matches!(result, Err(WorkflowError::Forbidden { .. })));
    }

    #[test]
    fn test_approve_invalid_outside_pending() {
        let result =
            WorkflowService::approve(InvoiceStatus::Unpaid, ActorRole::Admin, UserId::new());
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidState {
                current: InvoiceStatus::Unpaid,
                ..
            })
        ));
    }

    #[test]
    fn test_reject_with_adequate_reason() {
        let action = WorkflowService::reject(
            InvoiceStatus::PendingApproval,
            ActorRole::Admin,
            "  wrong vendor bank details  ",
            UserId::new(),
        )
        .unwrap();

        match action {
            WorkflowAction::Reject {
                new_status,
                rejection,
            } => {
                assert_eq!(new_status, InvoiceStatus::Rejected);
                assert_eq!(rejection.reason, "wrong vendor bank details");
            }
            other => panic!("expected Reject, got {other:?}"),
        }
    }

    #[test]
    fn test_reject_short_reason_fails_validation() {
        // 5 characters after trimming
        let result = WorkflowService::reject(
            InvoiceStatus::PendingApproval,
            ActorRole::Admin,
            " nope!    ",
            UserId::new(),
        );
        assert!(matches!(
            result,
            Err(WorkflowError::ReasonTooShort { minimum: 10 })
        ));
    }

    #[test]
    fn test_reject_twelve_char_reason_passes() {
        let result = WorkflowService::reject(
            InvoiceStatus::PendingApproval,
            ActorRole::Admin,
            "12 chars long",
            UserId::new(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_reject_forbidden_for_standard_user() {
        let result = WorkflowService::reject(
            InvoiceStatus::PendingApproval,
            ActorRole::StandardUser,
            "a perfectly valid reason",
            UserId::new(),
        );
        assert!(matches!(result, Err(WorkflowError::Forbidden { .. })));
    }

    #[test]
    fn test_hold_from_payable_statuses() {
        for status in [
            InvoiceStatus::Unpaid,
            InvoiceStatus::PartiallyPaid,
            InvoiceStatus::Paid,
        ] {
            let action =
                WorkflowService::hold(status, ActorRole::Admin, "vendor dispute", UserId::new())
                    .unwrap();
            assert_eq!(action.new_status(), Some(InvoiceStatus::OnHold));
        }
    }

    #[test]
    fn test_hold_already_on_hold() {
        let result = WorkflowService::hold(
            InvoiceStatus::OnHold,
            ActorRole::Admin,
            "vendor dispute",
            UserId::new(),
        );
        assert!(matches!(result, Err(WorkflowError::AlreadyOnHold)));
    }

    #[test]
    fn test_hold_requires_reason() {
        let result =
            WorkflowService::hold(InvoiceStatus::Unpaid, ActorRole::Admin, "  ", UserId::new());
        assert!(matches!(result, Err(WorkflowError::HoldReasonRequired)));
    }

    #[test]
    fn test_hold_invalid_from_pending() {
        let result = WorkflowService::hold(
            InvoiceStatus::PendingApproval,
            ActorRole::Admin,
            "vendor dispute",
            UserId::new(),
        );
        assert!(matches!(result, Err(WorkflowError::InvalidState { .. })));
    }

    #[test]
    fn test_release_returns_to_balance_derived_status() {
        let cases = [
            (figures(dec!(900), dec!(900)), InvoiceStatus::Unpaid),
            (figures(dec!(900), dec!(300)), InvoiceStatus::PartiallyPaid),
            (figures(dec!(900), dec!(0)), InvoiceStatus::Paid),
        ];

        for (fig, expected) in cases {
            let action =
                WorkflowService::release(InvoiceStatus::OnHold, ActorRole::Admin, &fig, UserId::new())
                    .unwrap();
            assert_eq!(action.new_status(), Some(expected));
        }
    }

    #[test]
    fn test_release_invalid_when_not_on_hold() {
        let result = WorkflowService::release(
            InvoiceStatus::Unpaid,
            ActorRole::Admin,
            &figures(dec!(900), dec!(900)),
            UserId::new(),
        );
        assert!(matches!(result, Err(WorkflowError::InvalidState { .. })));
    }

    #[test]
    fn test_admin_edit_keeps_status() {
        for status in [
            InvoiceStatus::PendingApproval,
            InvoiceStatus::Unpaid,
            InvoiceStatus::Paid,
        ] {
            assert_eq!(
                WorkflowService::edit_outcome(status, ActorRole::Admin, false).unwrap(),
                None
            );
        }
    }

    #[test]
    fn test_owner_edit_resets_approval() {
        for status in [InvoiceStatus::Unpaid, InvoiceStatus::PartiallyPaid] {
            assert_eq!(
                WorkflowService::edit_outcome(status, ActorRole::StandardUser, true).unwrap(),
                Some(InvoiceStatus::PendingApproval)
            );
        }
    }

    #[test]
    fn test_owner_edit_blocked_while_pending() {
        let result =
            WorkflowService::edit_outcome(InvoiceStatus::PendingApproval, ActorRole::StandardUser, true);
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidState {
                current: InvoiceStatus::PendingApproval,
                ..
            })
        ));
    }

    #[test]
    fn test_non_owner_standard_edit_forbidden() {
        let result =
            WorkflowService::edit_outcome(InvoiceStatus::Unpaid, ActorRole::StandardUser, false);
        assert!(matches!(result, Err(WorkflowError::Forbidden { .. })));
    }

    #[test]
    fn test_soft_delete_sets_deadline_from_retention() {
        let action = WorkflowService::soft_delete(
            &Tombstone::Active,
            ActorRole::StandardUser,
            true,
            UserId::new(),
            Some("entered twice".to_string()),
            30,
        )
        .unwrap();

        match action {
            WorkflowAction::SoftDelete {
                tombstone:
                    Tombstone::Hidden {
                        deleted_at,
                        recovery_deadline,
                        ..
                    },
            } => {
                assert_eq!(recovery_deadline - deleted_at, Duration::days(30));
            }
            other => panic!("expected SoftDelete, got {other:?}"),
        }
    }

    #[test]
    fn test_soft_delete_already_hidden() {
        let hidden = Tombstone::Hidden {
            hidden_by: UserId::new(),
            hidden_at: Utc::now(),
            reason: None,
            deleted_at: Utc::now(),
            recovery_deadline: Utc::now() + Duration::days(30),
        };
        let result = WorkflowService::soft_delete(
            &hidden,
            ActorRole::Admin,
            false,
            UserId::new(),
            None,
            30,
        );
        assert!(matches!(result, Err(WorkflowError::AlreadyHidden)));
    }

    #[test]
    fn test_soft_delete_requires_owner_or_admin() {
        let result = WorkflowService::soft_delete(
            &Tombstone::Active,
            ActorRole::StandardUser,
            false,
            UserId::new(),
            None,
            30,
        );
        assert!(matches!(result, Err(WorkflowError::Forbidden { .. })));

        let result = WorkflowService::soft_delete(
            &Tombstone::Active,
            ActorRole::Admin,
            false,
            UserId::new(),
            None,
            30,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_restore_only_from_hidden() {
        let result =
            WorkflowService::restore(&Tombstone::Active, ActorRole::Admin, false, UserId::new());
        assert!(matches!(result, Err(WorkflowError::NotHidden)));

        let hidden = Tombstone::Hidden {
            hidden_by: UserId::new(),
            hidden_at: Utc::now(),
            reason: None,
            deleted_at: Utc::now(),
            recovery_deadline: Utc::now() + Duration::days(30),
        };
        assert!(
            WorkflowService::restore(&hidden, ActorRole::StandardUser, true, UserId::new()).is_ok()
        );
    }

    #[test]
    fn test_guard_rejects_hidden_invoice() {
        let hidden = Tombstone::Hidden {
            hidden_by: UserId::new(),
            hidden_at: Utc::now(),
            reason: None,
            deleted_at: Utc::now(),
            recovery_deadline: Utc::now() + Duration::days(30),
        };
        assert!(matches!(
            WorkflowService::guard_visible(&hidden),
            Err(WorkflowError::Hidden)
        ));
        assert!(WorkflowService::guard_visible(&Tombstone::Active).is_ok());
    }
}
