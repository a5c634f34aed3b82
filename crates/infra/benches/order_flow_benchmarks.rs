use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use stockline_catalog::{Product, ProductId};
use stockline_core::{CustomerId, EntityId, UserId};
use stockline_events::InMemoryNotificationBus;
use stockline_infra::{
    CheckoutItem, CheckoutRequest, InMemoryStore, OrderLifecycle, Store, TransitionRequest,
};
use stockline_orders::{OrderId, OrderStatus};
use stockline_pricing::PricingConfig;

type BenchLifecycle = OrderLifecycle<Arc<InMemoryStore>, Arc<InMemoryNotificationBus>>;

fn setup(products: usize) -> (BenchLifecycle, Vec<ProductId>) {
    let store = Arc::new(InMemoryStore::new());
    let bus = Arc::new(InMemoryNotificationBus::new());

    let product_ids: Vec<ProductId> = (0..products)
        .map(|i| {
            let id = ProductId::new(EntityId::new());
            let product = Product::new(
                id,
                format!("SKU-{i:04}"),
                "Bench Product",
                dec!(25.00),
                1 << 40,
                10,
                1 << 41,
                chrono::Utc::now(),
            )
            .unwrap();
            store.insert_product(product).unwrap();
            id
        })
        .collect();

    let lifecycle = OrderLifecycle::new(store, bus, PricingConfig::default());
    (lifecycle, product_ids)
}

fn checkout_request(product_ids: &[ProductId], customer_id: CustomerId, actor: UserId) -> CheckoutRequest {
    CheckoutRequest {
        order_id: OrderId::new(EntityId::new()),
        customer_id,
        items: product_ids
            .iter()
            .map(|&product_id| CheckoutItem {
                product_id,
                quantity: 1,
            })
            .collect(),
        shipping_address: "12 Wharf Road".to_string(),
        actor,
    }
}

fn bench_checkout(c: &mut Criterion) {
    let mut group = c.benchmark_group("checkout");
    group.throughput(Throughput::Elements(1));

    for lines in [1usize, 4, 8] {
        group.bench_with_input(BenchmarkId::new("lines", lines), &lines, |b, &lines| {
            let (lifecycle, product_ids) = setup(lines);
            let customer_id = CustomerId::new();
            let actor = UserId::new();

            b.iter(|| {
                let receipt = lifecycle
                    .checkout(checkout_request(&product_ids, customer_id, actor))
                    .unwrap();
                black_box(receipt);
            });
        });
    }

    group.finish();
}

fn bench_checkout_then_cancel(c: &mut Criterion) {
    let mut group = c.benchmark_group("checkout_then_cancel");
    group.throughput(Throughput::Elements(1));

    group.bench_function("single_line", |b| {
        let (lifecycle, product_ids) = setup(1);
        let customer_id = CustomerId::new();
        let actor = UserId::new();

        b.iter(|| {
            let receipt = lifecycle
                .checkout(checkout_request(&product_ids, customer_id, actor))
                .unwrap();
            let receipt = lifecycle
                .transition(TransitionRequest {
                    order_id: receipt.order_id,
                    target_status: OrderStatus::Cancelled,
                    actor,
                    notes: None,
                })
                .unwrap();
            black_box(receipt);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_checkout, bench_checkout_then_cancel);
criterion_main!(benches);
