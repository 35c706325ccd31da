use super::*;
use crate::db;
use shared::models::{AddressCreate, Extra, Product, SizeVariant};
use shared::order::{CustomerInput, ExtraSelection, LifecycleAction, PaymentMethod};
use std::collections::HashMap;

mod test_broadcast;

const MARGHERITA: i64 = 1;
const CALABRESA: i64 = 2;
const X_BURGER: i64 = 3;
const SODA: i64 = 4;

/// 2026-03-14 15:00 UTC
const NOW: i64 = 1_773_500_400_000;

fn pizza(id: i64, name: &str, size_base: i64, prices: [f64; 3]) -> Product {
    Product {
        id,
        name: name.to_string(),
        price: None,
        discount_percent: 0.0,
        allows_half_half: true,
        category_id: 1,
        sizes: ["P", "M", "G"]
            .into_iter()
            .zip(prices)
            .enumerate()
            .map(|(i, (size, price))| SizeVariant {
                id: size_base + i as i64,
                name: size.to_string(),
                price,
            })
            .collect(),
        extras: vec![Extra {
            id: id * 100 + 1,
            name: "Borda recheada".into(),
            price: 8.0,
        }],
        is_active: true,
    }
}

fn test_catalog() -> HashMap<i64, Product> {
    let mut products = HashMap::new();
    products.insert(MARGHERITA, pizza(MARGHERITA, "Margherita", 10, [33.0, 43.0, 53.0]));
    products.insert(CALABRESA, pizza(CALABRESA, "Calabresa", 20, [35.0, 45.0, 55.0]));
    products.insert(
        X_BURGER,
        Product {
            id: X_BURGER,
            name: "X-Burger".into(),
            price: Some(18.0),
            discount_percent: 0.0,
            allows_half_half: false,
            category_id: 2,
            sizes: vec![],
            extras: vec![Extra {
                id: 31,
                name: "Bacon".into(),
                price: 6.0,
            }],
            is_active: true,
        },
    );
    products.insert(
        SODA,
        Product {
            id: SODA,
            name: "Soda".into(),
            price: Some(8.0),
            discount_percent: 25.0,
            allows_half_half: false,
            category_id: 3,
            sizes: vec![],
            extras: vec![Extra {
                id: 41,
                name: "Lemon".into(),
                price: 1.0,
            }],
            is_active: true,
        },
    );
    products
}

fn create_test_manager() -> OrdersManager {
    let storage = OrderStorage::new(db::open_in_memory().unwrap());
    OrdersManager::new(
        storage,
        Arc::new(test_catalog()),
        OrderNumberAllocator::new(chrono_tz::UTC),
        EventBroadcaster::default(),
    )
}

fn new_address() -> AddressInput {
    AddressInput::New(AddressCreate {
        street: "Rua Augusta".into(),
        number: "1200".into(),
        complement: None,
        neighborhood: "Consolação".into(),
        city: "São Paulo".into(),
        reference: Some("portão azul".into()),
        zip_code: None,
    })
}

fn guest() -> CustomerInput {
    CustomerInput {
        user_id: None,
        guest_name: Some("Ana".into()),
        guest_phone: Some("11999990000".into()),
    }
}

fn line(product_id: i64, quantity: i32) -> CartLineInput {
    CartLineInput {
        product_id,
        size_id: None,
        second_flavor_product_id: None,
        extras: vec![],
        quantity,
        note: None,
        expected_unit_price: None,
    }
}

fn burger_with_bacon() -> CartLineInput {
    CartLineInput {
        extras: vec![ExtraSelection {
            extra_id: 31,
            quantity: 1,
        }],
        ..line(X_BURGER, 2)
    }
}

fn half_half_m() -> CartLineInput {
    CartLineInput {
        size_id: Some(11),
        second_flavor_product_id: Some(CALABRESA),
        ..line(MARGHERITA, 1)
    }
}

fn request(items: Vec<CartLineInput>) -> SubmitOrderRequest {
    SubmitOrderRequest {
        customer: guest(),
        delivery_address: Some(new_address()),
        payment_method: PaymentMethod::Pix,
        cash_change_requested: None,
        cash_change_for: None,
        items,
        delivery_fee: 7.0,
    }
}

fn submit(manager: &OrdersManager) -> OrderSnapshot {
    manager
        .submit_order_at(request(vec![burger_with_bacon()]), NOW)
        .unwrap()
}

fn act(action: LifecycleAction) -> TransitionRequest {
    TransitionRequest {
        action,
        expected_status: None,
    }
}
