//! `SeaORM` Entity for the invoices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::InvoiceStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub invoice_number: String,
    pub is_recurring: bool,
    pub vendor_id: Uuid,
    pub profile_id: Option<Uuid>,
    pub entity_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub currency_id: Option<Uuid>,
    pub description: Option<String>,
    pub period_start: Option<Date>,
    pub period_end: Option<Date>,
    pub invoice_date: Date,
    pub due_date: Date,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub invoice_amount: Decimal,
    pub tds_applicable: bool,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub tds_percentage: Option<Decimal>,
    pub tds_rounded: bool,
    pub status: InvoiceStatus,
    pub rejection_reason: Option<String>,
    pub rejected_by: Option<Uuid>,
    pub rejected_at: Option<DateTimeWithTimeZone>,
    pub hold_reason: Option<String>,
    pub hold_by: Option<Uuid>,
    pub hold_at: Option<DateTimeWithTimeZone>,
    pub is_hidden: bool,
    pub hidden_by: Option<Uuid>,
    pub hidden_at: Option<DateTimeWithTimeZone>,
    pub hidden_reason: Option<String>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub recovery_deadline: Option<DateTimeWithTimeZone>,
    pub attachment_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vendors::Entity",
        from = "Column::VendorId",
        to = "super::vendors::Column::Id"
    )]
    Vendors,
    #[sea_orm(
        belongs_to = "super::invoice_profiles::Entity",
        from = "Column::ProfileId",
        to = "super::invoice_profiles::Column::Id"
    )]
    InvoiceProfiles,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
    #[sea_orm(has_many = "super::credit_notes::Entity")]
    CreditNotes,
    #[sea_orm(has_many = "super::attachments::Entity")]
    Attachments,
    #[sea_orm(has_many = "super::audit_log::Entity")]
    AuditLog,
}

impl Related<super::vendors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendors.def()
    }
}

impl Related<super::invoice_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceProfiles.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::credit_notes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditNotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
