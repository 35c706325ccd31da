//! Concurrent submissions on one business day must receive distinct,
//! gapless order numbers.
//!
//! Runs against a file-backed database through `ServerState::initialize`,
//! the same path the binary takes.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};

use delivery_server::{Config, ServerState};
use rand::Rng;
use shared::models::{AddressCreate, Extra, Product, SizeVariant};
use shared::order::{
    AddressInput, CartLineInput, CustomerInput, ExtraSelection, OrderStatus, PaymentMethod,
    SubmitOrderRequest,
};

const SUBMISSIONS: usize = 25;

/// 2026-03-14 15:00 UTC, 12:00 in Sao Paulo
const NOW: i64 = 1_773_500_400_000;

fn catalog() -> Vec<Product> {
    vec![
        Product {
            id: 1,
            name: "Margherita".into(),
            price: None,
            discount_percent: 0.0,
            allows_half_half: true,
            category_id: 1,
            sizes: vec![
                SizeVariant { id: 11, name: "P".into(), price: 33.0 },
                SizeVariant { id: 12, name: "M".into(), price: 43.0 },
                SizeVariant { id: 13, name: "G".into(), price: 53.0 },
            ],
            extras: vec![],
            is_active: true,
        },
        Product {
            id: 2,
            name: "X-Burger".into(),
            price: Some(18.0),
            discount_percent: 0.0,
            allows_half_half: false,
            category_id: 2,
            sizes: vec![],
            extras: vec![Extra { id: 21, name: "Bacon".into(), price: 6.0 }],
            is_active: true,
        },
    ]
}

fn random_request(rng: &mut impl Rng, idx: usize) -> SubmitOrderRequest {
    let item = if rng.gen_bool(0.5) {
        CartLineInput {
            product_id: 1,
            size_id: Some(rng.gen_range(11..=13)),
            second_flavor_product_id: None,
            extras: vec![],
            quantity: rng.gen_range(1..=3),
            note: None,
            expected_unit_price: None,
        }
    } else {
        CartLineInput {
            product_id: 2,
            size_id: None,
            second_flavor_product_id: None,
            extras: vec![ExtraSelection { extra_id: 21, quantity: rng.gen_range(0..=2) }],
            quantity: rng.gen_range(1..=3),
            note: None,
            expected_unit_price: None,
        }
    };

    SubmitOrderRequest {
        customer: CustomerInput {
            user_id: None,
            guest_name: Some(format!("Guest {idx}")),
            guest_phone: Some(format!("1199999{idx:04}")),
        },
        delivery_address: Some(AddressInput::New(AddressCreate {
            street: "Rua Augusta".into(),
            number: idx.to_string(),
            complement: None,
            neighborhood: "Consolação".into(),
            city: "São Paulo".into(),
            reference: None,
            zip_code: None,
        })),
        payment_method: PaymentMethod::Pix,
        cash_change_requested: None,
        cash_change_for: None,
        items: vec![item],
        delivery_fee: 5.0,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_submissions_get_distinct_numbers() {
    let work_dir = tempfile::tempdir().unwrap();
    let config = Config::with_work_dir(work_dir.path().to_string_lossy());
    let state = ServerState::initialize(&config).unwrap();
    for product in catalog() {
        state.catalog.upsert_product(product).unwrap();
    }

    let mut rx = state.orders.subscribe();
    let barrier = Arc::new(Barrier::new(SUBMISSIONS));
    let mut handles = Vec::with_capacity(SUBMISSIONS);
    for idx in 0..SUBMISSIONS {
        let orders = state.orders.clone();
        let barrier = barrier.clone();
        let req = random_request(&mut rand::thread_rng(), idx);
        handles.push(tokio::task::spawn_blocking(move || {
            barrier.wait();
            orders.submit_order_at(req, NOW)
        }));
    }

    let mut numbers = Vec::with_capacity(SUBMISSIONS);
    for handle in handles {
        let order = handle.await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        numbers.push(order.order_number);
    }

    let distinct: HashSet<_> = numbers.iter().cloned().collect();
    assert_eq!(distinct.len(), SUBMISSIONS, "duplicate order numbers: {numbers:?}");

    let mut sequences: Vec<u64> = numbers
        .iter()
        .map(|n| {
            let (date, seq) = n.rsplit_once('-').unwrap();
            assert_eq!(date, "2026-03-14");
            seq.parse().unwrap()
        })
        .collect();
    sequences.sort_unstable();
    assert_eq!(sequences, (1..=SUBMISSIONS as u64).collect::<Vec<_>>());

    let stored = state.orders.list_orders(None, None).unwrap();
    assert_eq!(stored.len(), SUBMISSIONS);

    // one created event per submission, sequences strictly increasing
    let mut last = 0;
    for _ in 0..SUBMISSIONS {
        let event = rx.try_recv().unwrap();
        assert!(event.sequence > last);
        last = event.sequence;
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_numbers_survive_restart() {
    let work_dir = tempfile::tempdir().unwrap();
    let config = Config::with_work_dir(work_dir.path().to_string_lossy());

    {
        let state = ServerState::initialize(&config).unwrap();
        for product in catalog() {
            state.catalog.upsert_product(product).unwrap();
        }
        for idx in 0..2 {
            let req = random_request(&mut rand::thread_rng(), idx);
            state.orders.submit_order_at(req, NOW).unwrap();
        }
    }

    let state = ServerState::initialize(&config).unwrap();
    assert_eq!(state.catalog.list_products().len(), 2);
    let req = random_request(&mut rand::thread_rng(), 3);
    let third = state.orders.submit_order_at(req, NOW).unwrap();
    assert_eq!(third.order_number, "2026-03-14-003");
}
