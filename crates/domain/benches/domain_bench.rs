use common::{Money, UserId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::checkout::{self, CheckoutLine};
use domain::{DeliveryAddress, NewOrder, Order, OrderNumber, OrderStatus, PaymentMethod, Product};

fn address() -> DeliveryAddress {
    DeliveryAddress {
        street: "1 Main St".to_string(),
        city: "Pune".to_string(),
        state: "MH".to_string(),
        zip_code: "411001".to_string(),
        country: "India".to_string(),
    }
}

fn bench_snapshot_items(c: &mut Criterion) {
    let lines: Vec<_> = (0..20)
        .map(|i| {
            let product = Product::new(
                UserId::new(),
                format!("Product {i}"),
                "",
                Money::from_cents(500),
                100,
            );
            (
                CheckoutLine {
                    product: product.id,
                    quantity: 2,
                },
                Some(product),
            )
        })
        .collect();

    c.bench_function("domain/snapshot_items_20_lines", |b| {
        b.iter(|| checkout::snapshot_items(&lines).unwrap());
    });
}

fn bench_create_order(c: &mut Criterion) {
    let seller = UserId::new();
    let lines: Vec<_> = (0..5)
        .map(|i| {
            let product = Product::new(seller, format!("P{i}"), "", Money::from_cents(750), 10);
            (
                CheckoutLine {
                    product: product.id,
                    quantity: 1,
                },
                Some(product),
            )
        })
        .collect();
    let items = checkout::snapshot_items(&lines).unwrap();

    c.bench_function("domain/create_order", |b| {
        b.iter(|| {
            Order::create(NewOrder {
                number: OrderNumber::new(1),
                buyer: UserId::new(),
                buyer_name: "Asha".to_string(),
                buyer_phone: "N/A".to_string(),
                items: items.clone(),
                delivery_address: address(),
                payment_method: PaymentMethod::Cod,
            })
        });
    });
}

fn bench_transition_table(c: &mut Criterion) {
    let states = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    c.bench_function("domain/transition_table_full_scan", |b| {
        b.iter(|| {
            let mut edges = 0u32;
            for from in states {
                for to in states {
                    if from.can_transition(to) {
                        edges += 1;
                    }
                }
            }
            edges
        });
    });
}

criterion_group!(
    benches,
    bench_snapshot_items,
    bench_create_order,
    bench_transition_table
);
criterion_main!(benches);
