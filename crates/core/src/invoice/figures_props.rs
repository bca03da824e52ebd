//! Property-based tests for derived invoice figures.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use remit_shared::types::{
    CategoryId, CreditNoteId, CurrencyId, EntityId, InvoiceId, PaymentId, PaymentTypeId, UserId,
    VendorId,
};

use crate::credit::types::CreditNote;
use crate::invoice::figures::InvoiceFigures;
use crate::invoice::types::{Invoice, InvoiceKind, InvoiceStatus, Tombstone, WithholdingConfig};
use crate::payment::types::Payment;

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn test_invoice(amount: Decimal) -> Invoice {
    Invoice {
        id: InvoiceId::new(),
        invoice_number: "INV-P".to_string(),
        vendor_id: VendorId::new(),
        kind: InvoiceKind::Standard {
            entity_id: EntityId::new(),
            category_id: CategoryId::new(),
            currency_id: CurrencyId::new(),
            description: "prop".to_string(),
        },
        invoice_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        due_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        amount,
        withholding: WithholdingConfig::none(),
        status: InvoiceStatus::Unpaid,
        rejection: None,
        hold: None,
        tombstone: Tombstone::Active,
        attachment_id: None,
        created_by: UserId::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn mk_payment(invoice_id: InvoiceId, amount: Decimal) -> Payment {
    Payment {
        id: PaymentId::new(),
        invoice_id,
        amount_paid: amount,
        payment_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        payment_type_id: PaymentTypeId::new(),
        payment_reference: None,
        tds_amount_applied: Decimal::ZERO,
        tds_rounded: false,
        created_by: UserId::new(),
        created_at: Utc::now(),
    }
}

fn mk_credit(invoice_id: InvoiceId, amount: Decimal) -> CreditNote {
    CreditNote {
        id: CreditNoteId::new(),
        invoice_id,
        amount,
        reason: "prop".to_string(),
        tds_applicable: false,
        tds_amount: Decimal::ZERO,
        credit_note_date: NaiveDate::from_ymd_opt(2026, 1, 16).unwrap(),
        attachment_id: None,
        created_by: UserId::new(),
        created_at: Utc::now(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The remaining balance is monotonically non-increasing as payments
    /// and credit notes accumulate, and never negative.
    #[test]
    fn prop_balance_monotone_and_non_negative(
        gross in arb_amount(),
        entries in prop::collection::vec((arb_amount(), prop::bool::ANY), 0..12)
    ) {
        let invoice = test_invoice(gross);
        let mut payments: Vec<Payment> = Vec::new();
        let mut credits: Vec<CreditNote> = Vec::new();

        let mut previous = InvoiceFigures::derive(&invoice, &payments, &credits).remaining_balance;
        prop_assert!(previous >= Decimal::ZERO);

        for (amount, is_credit) in entries {
            if is_credit {
                credits.push(mk_credit(invoice.id, amount));
            } else {
                payments.push(mk_payment(invoice.id, amount));
            }

            let current = InvoiceFigures::derive(&invoice, &payments, &credits).remaining_balance;
            prop_assert!(current <= previous);
            prop_assert!(current >= Decimal::ZERO);
            previous = current;
        }
    }

    /// With no clamping in play, the figures reconcile exactly.
    #[test]
    fn prop_figures_reconcile(
        gross in arb_amount(),
        paid in arb_amount()
    ) {
        let invoice = test_invoice(gross);
        let payments = [mk_payment(invoice.id, paid)];
        let figures = InvoiceFigures::derive(&invoice, &payments, &[]);

        if paid <= gross {
            prop_assert_eq!(
                figures.remaining_balance,
                figures.net_payable - figures.total_paid
            );
        } else {
            prop_assert_eq!(figures.remaining_balance, Decimal::ZERO);
        }
    }
}
