//! Concurrent payment stress tests.
//!
//! Two payments racing for the same remaining balance must serialize on
//! the invoice row lock: exactly one may succeed when their sum exceeds
//! the balance. Both succeeding would silently overpay the invoice.

#![allow(clippy::uninlined_format_args)]

use chrono::Utc;
use futures::future::join_all;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::Barrier;

use remit_core::invoice::InvoiceStatus;
use remit_core::payment::PaymentCandidate;
use remit_db::repositories::error::RepositoryError;
use remit_db::repositories::{InvoiceRepository, PaymentRepository};
use remit_shared::types::PaymentTypeId;

mod common;

fn candidate(data: &common::TestData, amount: rust_decimal::Decimal) -> PaymentCandidate {
    PaymentCandidate {
        amount_paid: amount,
        payment_date: Utc::now().date_naive(),
        payment_type_id: PaymentTypeId::from_uuid(data.payment_type_id),
        payment_reference: None,
        tds_rounded: None,
    }
}

// ============================================================================
// Test: two racing payments of 600 against a balance of 1000 - exactly one
// must succeed, the other must fail with AmountExceedsBalance.
// ============================================================================
#[tokio::test]
async fn test_concurrent_payments_cannot_overpay() {
    let Some(db) = common::connect_or_skip().await else {
        return;
    };

    let data = match common::seed_master_data(&db).await {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {}", e);
            return;
        }
    };

    let invoice_repo = InvoiceRepository::new(db.clone(), None);
    let created = invoice_repo
        .create(
            common::standard_invoice_input(&data, "CONC-1000", dec!(1000)),
            data.admin,
        )
        .await
        .expect("Failed to create invoice");

    assert_eq!(created.figures.remaining_balance, dec!(1000));

    let invoice_id = created.invoice.id.into_inner();
    let db = Arc::new(db);
    let data = Arc::new(data);

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::with_capacity(2);

    for _ in 0..2 {
        let db_clone = Arc::clone(&db);
        let data_clone = Arc::clone(&data);
        let barrier_clone = Arc::clone(&barrier);

        handles.push(tokio::spawn(async move {
            barrier_clone.wait().await;
            PaymentRepository::new((*db_clone).clone())
                .record(invoice_id, candidate(&data_clone, dec!(600)), data_clone.admin)
                .await
        }));
    }

    let results = join_all(handles).await;

    let mut successes = 0;
    let mut balance_rejections = 0;

    for result in results {
        match result.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(RepositoryError::Payment(
                remit_core::payment::PaymentError::AmountExceedsBalance { remaining },
            )) => {
                // the loser observed the winner's commit
                assert_eq!(remaining, dec!(400));
                balance_rejections += 1;
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(successes, 1, "exactly one racing payment may succeed");
    assert_eq!(balance_rejections, 1);

    let loaded = invoice_repo.get(invoice_id).await.expect("reload failed");
    assert_eq!(loaded.figures.total_paid, dec!(600));
    assert_eq!(loaded.figures.remaining_balance, dec!(400));
    assert_eq!(loaded.invoice.status, InvoiceStatus::PartiallyPaid);

    common::cleanup(&db, &data).await.expect("Cleanup failed");
}

// ============================================================================
// Test: many concurrent small payments never drive the balance negative and
// the stored total matches the number of successes.
// ============================================================================
#[tokio::test]
async fn test_concurrent_payments_balance_integrity() {
    let Some(db) = common::connect_or_skip().await else {
        return;
    };

    let data = match common::seed_master_data(&db).await {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {}", e);
            return;
        }
    };

    let invoice_repo = InvoiceRepository::new(db.clone(), None);
    let created = invoice_repo
        .create(
            common::standard_invoice_input(&data, "CONC-SMALL", dec!(100)),
            data.admin,
        )
        .await
        .expect("Failed to create invoice");

    let invoice_id = created.invoice.id.into_inner();
    let db = Arc::new(db);
    let data = Arc::new(data);

    // 20 payments of 10 against a balance of 100: at most 10 can land.
    const ATTEMPTS: usize = 20;
    let barrier = Arc::new(Barrier::new(ATTEMPTS));
    let mut handles = Vec::with_capacity(ATTEMPTS);

    for _ in 0..ATTEMPTS {
        let db_clone = Arc::clone(&db);
        let data_clone = Arc::clone(&data);
        let barrier_clone = Arc::clone(&barrier);

        handles.push(tokio::spawn(async move {
            barrier_clone.wait().await;
            PaymentRepository::new((*db_clone).clone())
                .record(invoice_id, candidate(&data_clone, dec!(10)), data_clone.admin)
                .await
        }));
    }

    let results = join_all(handles).await;
    let successes = results
        .into_iter()
        .filter(|r| matches!(r, Ok(Ok(_))))
        .count();

    assert!(successes <= 10, "more payments landed than the balance allows");

    let loaded = invoice_repo.get(invoice_id).await.expect("reload failed");
    let expected_paid = dec!(10) * rust_decimal::Decimal::from(successes as u64);
    assert_eq!(loaded.figures.total_paid, expected_paid);
    assert!(loaded.figures.remaining_balance >= rust_decimal::Decimal::ZERO);

    if successes == 10 {
        assert_eq!(loaded.invoice.status, InvoiceStatus::Paid);
        assert_eq!(loaded.figures.remaining_balance, rust_decimal::Decimal::ZERO);
    }

    common::cleanup(&db, &data).await.expect("Cleanup failed");
}
