//! `SeaORM` Entity for the payments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub invoice_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub amount_paid: Decimal,
    pub payment_date: Date,
    pub payment_type_id: Uuid,
    pub payment_reference: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub tds_amount_applied: Decimal,
    pub tds_rounded: bool,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id"
    )]
    Invoices,
    #[sea_orm(
        belongs_to = "super::payment_types::Entity",
        from = "Column::PaymentTypeId",
        to = "super::payment_types::Column::Id"
    )]
    PaymentTypes,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::payment_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
