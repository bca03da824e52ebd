//! `SeaORM` entity definitions.

pub mod attachments;
pub mod audit_log;
pub mod business_entities;
pub mod categories;
pub mod credit_notes;
pub mod currencies;
pub mod invoice_profiles;
pub mod invoices;
pub mod payment_types;
pub mod payments;
pub mod sea_orm_active_enums;
pub mod vendors;
