//! Database seeder for Remit development and testing.
//!
//! Seeds the master data an invoice needs: vendors, categories, billing
//! entities, currencies, and payment types.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use remit_db::entities::{
    business_entities, categories, currencies, invoice_profiles, payment_types, vendors,
};

/// Test vendor ID (consistent for all seeds)
const TEST_VENDOR_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Test entity ID
const TEST_ENTITY_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Test category ID
const TEST_CATEGORY_ID: &str = "00000000-0000-0000-0000-000000000003";
/// Test currency ID
const TEST_CURRENCY_ID: &str = "00000000-0000-0000-0000-000000000004";
/// Test payment type ID (bank transfer, reference required)
const TEST_PAYMENT_TYPE_ID: &str = "00000000-0000-0000-0000-000000000005";
/// Test recurring profile ID
const TEST_PROFILE_ID: &str = "00000000-0000-0000-0000-000000000006";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = remit_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding vendor...");
    seed_vendor(&db).await;

    println!("Seeding billing entity...");
    seed_entity(&db).await;

    println!("Seeding category...");
    seed_category(&db).await;

    println!("Seeding currency...");
    seed_currency(&db).await;

    println!("Seeding payment types...");
    seed_payment_types(&db).await;

    println!("Seeding recurring profile...");
    seed_profile(&db).await;

    println!("Seeding complete!");
}

fn fixed_id(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap()
}

async fn seed_vendor(db: &DatabaseConnection) {
    let id = fixed_id(TEST_VENDOR_ID);
    if vendors::Entity::find_by_id(id).one(db).await.unwrap().is_some() {
        return;
    }

    vendors::ActiveModel {
        id: Set(id),
        name: Set("Acme Office Supplies".to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed vendor");
}

async fn seed_entity(db: &DatabaseConnection) {
    let id = fixed_id(TEST_ENTITY_ID);
    if business_entities::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .is_some()
    {
        return;
    }

    business_entities::ActiveModel {
        id: Set(id),
        name: Set("Headquarters".to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed entity");
}

async fn seed_category(db: &DatabaseConnection) {
    let id = fixed_id(TEST_CATEGORY_ID);
    if categories::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .is_some()
    {
        return;
    }

    categories::ActiveModel {
        id: Set(id),
        name: Set("Office Expenses".to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed category");
}

async fn seed_currency(db: &DatabaseConnection) {
    let id = fixed_id(TEST_CURRENCY_ID);
    if currencies::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .is_some()
    {
        return;
    }

    currencies::ActiveModel {
        id: Set(id),
        code: Set("USD".to_string()),
        name: Set("US Dollar".to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed currency");
}

async fn seed_payment_types(db: &DatabaseConnection) {
    let id = fixed_id(TEST_PAYMENT_TYPE_ID);
    if payment_types::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .is_some()
    {
        return;
    }

    payment_types::ActiveModel {
        id: Set(id),
        name: Set("Bank Transfer".to_string()),
        requires_reference: Set(true),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed payment type");

    payment_types::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Cash".to_string()),
        requires_reference: Set(false),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed payment type");
}

async fn seed_profile(db: &DatabaseConnection) {
    let id = fixed_id(TEST_PROFILE_ID);
    if invoice_profiles::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .is_some()
    {
        return;
    }

    invoice_profiles::ActiveModel {
        id: Set(id),
        name: Set("Monthly Internet".to_string()),
        vendor_id: Set(fixed_id(TEST_VENDOR_ID)),
        entity_id: Set(fixed_id(TEST_ENTITY_ID)),
        category_id: Set(fixed_id(TEST_CATEGORY_ID)),
        currency_id: Set(fixed_id(TEST_CURRENCY_ID)),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed profile");
}
