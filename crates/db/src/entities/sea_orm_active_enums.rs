//! `SeaORM` active enums mapped to Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice lifecycle status (`invoice_status` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being drafted.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Waiting for approval.
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    /// Approved, nothing paid.
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    /// Partially settled.
    #[sea_orm(string_value = "partially_paid")]
    PartiallyPaid,
    /// Fully settled.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Payments suspended.
    #[sea_orm(string_value = "on_hold")]
    OnHold,
    /// Rejected during approval.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl From<remit_core::invoice::InvoiceStatus> for InvoiceStatus {
    fn from(status: remit_core::invoice::InvoiceStatus) -> Self {
        use remit_core::invoice::InvoiceStatus as Core;
        match status {
            Core::Draft => Self::Draft,
            Core::PendingApproval => Self::PendingApproval,
            Core::Unpaid => Self::Unpaid,
            Core::PartiallyPaid => Self::PartiallyPaid,
            Core::Paid => Self::Paid,
            Core::OnHold => Self::OnHold,
            Core::Rejected => Self::Rejected,
        }
    }
}

impl From<InvoiceStatus> for remit_core::invoice::InvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        use InvoiceStatus as Db;
        match status {
            Db::Draft => Self::Draft,
            Db::PendingApproval => Self::PendingApproval,
            Db::Unpaid => Self::Unpaid,
            Db::PartiallyPaid => Self::PartiallyPaid,
            Db::Paid => Self::Paid,
            Db::OnHold => Self::OnHold,
            Db::Rejected => Self::Rejected,
        }
    }
}
