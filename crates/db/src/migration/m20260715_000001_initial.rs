//! Initial database migration.
//!
//! Creates the enum types, master-data tables, the invoices table with its
//! scoped uniqueness indexes, and the child ledgers.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: MASTER DATA
        // ============================================================
        db.execute_unprepared(VENDORS_SQL).await?;
        db.execute_unprepared(CATEGORIES_SQL).await?;
        db.execute_unprepared(BUSINESS_ENTITIES_SQL).await?;
        db.execute_unprepared(CURRENCIES_SQL).await?;
        db.execute_unprepared(PAYMENT_TYPES_SQL).await?;
        db.execute_unprepared(INVOICE_PROFILES_SQL).await?;

        // ============================================================
        // PART 3: INVOICES
        // ============================================================
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_INDEXES_SQL).await?;

        // ============================================================
        // PART 4: CHILD LEDGERS
        // ============================================================
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(CREDIT_NOTES_SQL).await?;

        // ============================================================
        // PART 5: ATTACHMENTS & AUDIT
        // ============================================================
        db.execute_unprepared(ATTACHMENTS_SQL).await?;
        db.execute_unprepared(AUDIT_LOG_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Invoice lifecycle status
CREATE TYPE invoice_status AS ENUM (
    'draft',
    'pending_approval',
    'unpaid',
    'partially_paid',
    'paid',
    'on_hold',
    'rejected'
);
";

const VENDORS_SQL: &str = r"
CREATE TABLE vendors (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const CATEGORIES_SQL: &str = r"
CREATE TABLE categories (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const BUSINESS_ENTITIES_SQL: &str = r"
CREATE TABLE business_entities (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const CURRENCIES_SQL: &str = r"
CREATE TABLE currencies (
    id UUID PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const PAYMENT_TYPES_SQL: &str = r"
CREATE TABLE payment_types (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    requires_reference BOOLEAN NOT NULL DEFAULT FALSE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const INVOICE_PROFILES_SQL: &str = r"
CREATE TABLE invoice_profiles (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    vendor_id UUID NOT NULL REFERENCES vendors(id),
    entity_id UUID NOT NULL REFERENCES business_entities(id),
    category_id UUID NOT NULL REFERENCES categories(id),
    currency_id UUID NOT NULL REFERENCES currencies(id),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    invoice_number TEXT NOT NULL,
    is_recurring BOOLEAN NOT NULL,
    vendor_id UUID NOT NULL REFERENCES vendors(id),
    profile_id UUID REFERENCES invoice_profiles(id),
    entity_id UUID REFERENCES business_entities(id),
    category_id UUID REFERENCES categories(id),
    currency_id UUID REFERENCES currencies(id),
    description TEXT,
    period_start DATE,
    period_end DATE,
    invoice_date DATE NOT NULL,
    due_date DATE NOT NULL,
    invoice_amount NUMERIC(18,2) NOT NULL,
    tds_applicable BOOLEAN NOT NULL DEFAULT FALSE,
    tds_percentage NUMERIC(5,2),
    tds_rounded BOOLEAN NOT NULL DEFAULT FALSE,
    status invoice_status NOT NULL,
    rejection_reason TEXT,
    rejected_by UUID,
    rejected_at TIMESTAMPTZ,
    hold_reason TEXT,
    hold_by UUID,
    hold_at TIMESTAMPTZ,
    is_hidden BOOLEAN NOT NULL DEFAULT FALSE,
    hidden_by UUID,
    hidden_at TIMESTAMPTZ,
    hidden_reason TEXT,
    deleted_at TIMESTAMPTZ,
    recovery_deadline TIMESTAMPTZ,
    attachment_id UUID,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT ck_invoices_positive_amount CHECK (invoice_amount > 0),
    CONSTRAINT ck_invoices_date_order CHECK (due_date >= invoice_date),
    CONSTRAINT ck_invoices_percentage_range CHECK (
        tds_percentage IS NULL OR (tds_percentage >= 0 AND tds_percentage <= 100)
    ),
    CONSTRAINT ck_invoices_percentage_required CHECK (
        (tds_applicable AND tds_percentage IS NOT NULL)
        OR (NOT tds_applicable AND tds_percentage IS NULL)
    ),
    -- exactly one of profile-bound recurring / standalone non-recurring
    CONSTRAINT ck_invoices_kind CHECK (
        (is_recurring
            AND profile_id IS NOT NULL
            AND period_start IS NOT NULL
            AND period_end IS NOT NULL
            AND period_end >= period_start
            AND entity_id IS NULL
            AND category_id IS NULL
            AND currency_id IS NULL
            AND description IS NULL)
        OR
        (NOT is_recurring
            AND profile_id IS NULL
            AND period_start IS NULL
            AND period_end IS NULL
            AND entity_id IS NOT NULL
            AND category_id IS NOT NULL
            AND currency_id IS NOT NULL
            AND description IS NOT NULL)
    )
);
";

const INVOICE_INDEXES_SQL: &str = r"
-- Duplicate scopes are enforced at the storage layer, not just by the
-- orchestrator's pre-check, so racing creates cannot both slip through.
CREATE UNIQUE INDEX uq_invoices_recurring_scope
    ON invoices (invoice_number, vendor_id, profile_id)
    WHERE is_recurring;

CREATE UNIQUE INDEX uq_invoices_standard_scope
    ON invoices (invoice_number, vendor_id, description)
    WHERE NOT is_recurring;

CREATE INDEX idx_invoices_status ON invoices (status);
CREATE INDEX idx_invoices_vendor ON invoices (vendor_id);
CREATE INDEX idx_invoices_purge_candidates
    ON invoices (recovery_deadline, deleted_at)
    WHERE is_hidden;
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id),
    amount_paid NUMERIC(18,2) NOT NULL,
    payment_date DATE NOT NULL,
    payment_type_id UUID NOT NULL REFERENCES payment_types(id),
    payment_reference TEXT,
    tds_amount_applied NUMERIC(18,2) NOT NULL DEFAULT 0,
    tds_rounded BOOLEAN NOT NULL DEFAULT FALSE,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT ck_payments_positive_amount CHECK (amount_paid > 0)
);

CREATE INDEX idx_payments_invoice ON payments (invoice_id);
";

const CREDIT_NOTES_SQL: &str = r"
CREATE TABLE credit_notes (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id),
    amount NUMERIC(18,2) NOT NULL,
    reason TEXT NOT NULL,
    tds_applicable BOOLEAN NOT NULL DEFAULT FALSE,
    tds_amount NUMERIC(18,2) NOT NULL DEFAULT 0,
    credit_note_date DATE NOT NULL,
    attachment_id UUID,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT ck_credit_notes_positive_amount CHECK (amount > 0)
);

CREATE INDEX idx_credit_notes_invoice ON credit_notes (invoice_id);
";

const ATTACHMENTS_SQL: &str = r"
CREATE TABLE attachments (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id),
    filename TEXT NOT NULL,
    mime_type TEXT NOT NULL,
    file_size BIGINT NOT NULL,
    storage_provider TEXT NOT NULL,
    storage_key TEXT NOT NULL,
    uploaded_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_attachments_invoice ON attachments (invoice_id);
";

const AUDIT_LOG_SQL: &str = r"
CREATE TABLE audit_log (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL,
    actor_id UUID NOT NULL,
    action TEXT NOT NULL,
    before_snapshot JSONB,
    after_snapshot JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_audit_log_invoice ON audit_log (invoice_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS audit_log;
DROP TABLE IF EXISTS attachments;
DROP TABLE IF EXISTS credit_notes;
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS invoices;
DROP TABLE IF EXISTS invoice_profiles;
DROP TABLE IF EXISTS payment_types;
DROP TABLE IF EXISTS currencies;
DROP TABLE IF EXISTS business_entities;
DROP TABLE IF EXISTS categories;
DROP TABLE IF EXISTS vendors;
DROP TYPE IF EXISTS invoice_status;
";
