//! Master-data lookups (vendors, categories, entities, currencies,
//! payment types, invoice profiles).
//!
//! CRUD for these records is outside this system's core; invoices only
//! need existence and activity checks before committing a write.

use sea_orm::{ConnectionTrait, EntityTrait};
use uuid::Uuid;

use remit_core::payment::PaymentTypeInfo;
use remit_shared::types::PaymentTypeId;

use crate::entities::{
    business_entities, categories, currencies, invoice_profiles, payment_types, vendors,
};
use crate::repositories::error::RepositoryError;

/// Read-only repository over the master-data tables.
#[derive(Debug, Clone, Copy)]
pub struct MasterDataRepository;

impl MasterDataRepository {
    /// Ensures a vendor exists and is active.
    pub async fn ensure_vendor_active<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<vendors::Model, RepositoryError> {
        let vendor = vendors::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(RepositoryError::MasterDataMissing { kind: "vendor", id })?;

        if !vendor.is_active {
            return Err(RepositoryError::MasterDataInactive { kind: "vendor", id });
        }
        Ok(vendor)
    }

    /// Ensures a category exists and is active.
    pub async fn ensure_category_active<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<categories::Model, RepositoryError> {
        let category = categories::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(RepositoryError::MasterDataMissing {
                kind: "category",
                id,
            })?;

        if !category.is_active {
            return Err(RepositoryError::MasterDataInactive {
                kind: "category",
                id,
            });
        }
        Ok(category)
    }

    /// Ensures a billing entity exists and is active.
    pub async fn ensure_entity_active<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<business_entities::Model, RepositoryError> {
        let entity = business_entities::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(RepositoryError::MasterDataMissing { kind: "entity", id })?;

        if !entity.is_active {
            return Err(RepositoryError::MasterDataInactive { kind: "entity", id });
        }
        Ok(entity)
    }

    /// Ensures a currency exists and is active.
    pub async fn ensure_currency_active<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<currencies::Model, RepositoryError> {
        let currency = currencies::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(RepositoryError::MasterDataMissing {
                kind: "currency",
                id,
            })?;

        if !currency.is_active {
            return Err(RepositoryError::MasterDataInactive {
                kind: "currency",
                id,
            });
        }
        Ok(currency)
    }

    /// Ensures an invoice profile exists and is active.
    pub async fn ensure_profile_active<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<invoice_profiles::Model, RepositoryError> {
        let profile = invoice_profiles::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(RepositoryError::MasterDataMissing {
                kind: "invoice profile",
                id,
            })?;

        if !profile.is_active {
            return Err(RepositoryError::MasterDataInactive {
                kind: "invoice profile",
                id,
            });
        }
        Ok(profile)
    }

    /// Fetches the validation slice of a payment type.
    ///
    /// Existence is checked here; activity is part of the payment
    /// pipeline's fixed validation order, so the flag is passed through.
    pub async fn payment_type_info<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<PaymentTypeInfo, RepositoryError> {
        let payment_type = payment_types::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(RepositoryError::MasterDataMissing {
                kind: "payment type",
                id,
            })?;

        Ok(PaymentTypeInfo {
            id: PaymentTypeId::from_uuid(payment_type.id),
            is_active: payment_type.is_active,
            requires_reference: payment_type.requires_reference,
        })
    }
}
