//! Shared fixtures for the engine test modules.

use chrono::Utc;
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use uuid::Uuid;

use freight_core_api::{ActorRole, ConsolidationStatus};
use freight_core_db::models::customer::{CustomerModel, CustomerStatus};
use freight_core_db::models::package::PackageModel;
use freight_core_db::models::person::PersonModel;

pub fn new_test_customer(name: &str) -> CustomerModel {
    CustomerModel {
        id: Uuid::new_v4(),
        display_name: HeaplessString::try_from(name).unwrap(),
        status: CustomerStatus::Active,
    }
}

/// A pending, unconsolidated package: weight 5.0, freight 25.00, no other
/// fees. Three of these give the round totals the engine tests assert on.
pub fn new_test_package(customer_id: Uuid, tracking: &str, description: &str) -> PackageModel {
    PackageModel {
        id: Uuid::new_v4(),
        tracking_number: HeaplessString::try_from(tracking).unwrap(),
        description: HeaplessString::try_from(description).unwrap(),
        customer_id,
        status: ConsolidationStatus::Pending,
        weight: Decimal::new(50, 1),
        quantity: 1,
        freight_price: Decimal::new(2500, 2),
        clearance_fee: Decimal::ZERO,
        storage_fee: Decimal::ZERO,
        delivery_fee: Decimal::ZERO,
        consolidated_package_id: None,
        is_consolidated: false,
        consolidated_at: None,
        created_at: Utc::now(),
    }
}

pub fn admin_actor() -> PersonModel {
    PersonModel {
        id: Uuid::new_v4(),
        display_name: HeaplessString::try_from("Ops Admin").unwrap(),
        role: ActorRole::Admin,
        customer_id: None,
    }
}

pub fn customer_actor(customer_id: Uuid) -> PersonModel {
    PersonModel {
        id: Uuid::new_v4(),
        display_name: HeaplessString::try_from("Account Holder").unwrap(),
        role: ActorRole::Customer,
        customer_id: Some(customer_id),
    }
}
