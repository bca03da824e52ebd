//! Property-based tests for the lifecycle state machine.

use proptest::prelude::*;

use remit_shared::types::UserId;

use crate::invoice::InvoiceStatus;
use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::ActorRole;

fn arb_status() -> impl Strategy<Value = InvoiceStatus> {
    prop_oneof![
        Just(InvoiceStatus::Draft),
        Just(InvoiceStatus::PendingApproval),
        Just(InvoiceStatus::Unpaid),
        Just(InvoiceStatus::PartiallyPaid),
        Just(InvoiceStatus::Paid),
        Just(InvoiceStatus::OnHold),
        Just(InvoiceStatus::Rejected),
    ]
}

fn arb_role() -> impl Strategy<Value = ActorRole> {
    prop_oneof![
        Just(ActorRole::StandardUser),
        Just(ActorRole::Admin),
        Just(ActorRole::SuperAdmin),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Approval succeeds exactly for administrators on pending invoices.
    #[test]
    fn prop_approve_gate(status in arb_status(), role in arb_role()) {
        let result = WorkflowService::approve(status, role, UserId::new());

        match (role.is_admin(), status) {
            (false, _) => {
                prop_assert!(matches!(result, Err(WorkflowError::Forbidden { .. })), "expected Forbidden");
            }
            (true, InvoiceStatus::PendingApproval) => {
                prop_assert!(result.is_ok());
            }
            (true, _) => {
                prop_assert!(matches!(result, Err(WorkflowError::InvalidState { .. })), "expected InvalidState");
            }
        }
    }

    /// A rejection reason passes validation iff it has at least 10
    /// trimmed characters; whitespace padding never changes the outcome.
    #[test]
    fn prop_reject_reason_length(
        core in "[a-z ]{0,20}",
        pad_left in " {0,5}",
        pad_right in " {0,5}"
    ) {
        let reason = format!("{pad_left}{core}{pad_right}");
        let result = WorkflowService::reject(
            InvoiceStatus::PendingApproval,
            ActorRole::Admin,
            &reason,
            UserId::new(),
        );

        if core.trim().chars().count() >= 10 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(result, Err(WorkflowError::ReasonTooShort { .. })), "expected ReasonTooShort");
        }
    }

    /// Only administrators ever receive a non-Forbidden answer from the
    /// admin-gated transitions.
    #[test]
    fn prop_admin_gated_actions(status in arb_status(), role in arb_role()) {
        if !role.is_admin() {
            let approve = WorkflowService::approve(status, role, UserId::new());
            let reject = WorkflowService::reject(status, role, "long enough reason", UserId::new());
            let hold = WorkflowService::hold(status, role, "reason", UserId::new());

            prop_assert!(matches!(approve, Err(WorkflowError::Forbidden { .. })), "expected Forbidden for approve");
            prop_assert!(matches!(reject, Err(WorkflowError::Forbidden { .. })), "expected Forbidden for reject");
            prop_assert!(matches!(hold, Err(WorkflowError::Forbidden { .. })), "expected Forbidden for hold");
        }
    }

    /// Terminal states never transition through approve or reject.
    #[test]
    fn prop_terminal_states_stay_terminal(role in arb_role()) {
        for status in [InvoiceStatus::Paid, InvoiceStatus::Rejected] {
            let approve = WorkflowService::approve(status, role, UserId::new());
            prop_assert!(approve.is_err());

            let reject = WorkflowService::reject(status, role, "long enough reason", UserId::new());
            prop_assert!(reject.is_err());
        }
    }

    /// The initial status matrix: paid-at-creation beats everything,
    /// otherwise the role decides.
    #[test]
    fn prop_initial_status(role in arb_role(), is_paid in prop::bool::ANY) {
        let status = WorkflowService::initial_status(role, is_paid);

        if is_paid {
            prop_assert_eq!(status, InvoiceStatus::Paid);
        } else if role.is_admin() {
            prop_assert_eq!(status, InvoiceStatus::Unpaid);
        } else {
            prop_assert_eq!(status, InvoiceStatus::PendingApproval);
        }
    }
}
