use criterion::{Criterion, criterion_group, criterion_main};
use domain::{OrderRequest, OrderService};
use rust_decimal::Decimal;
use store::{InMemoryStore, NewProduct};

fn bench_place_single_item(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryStore::new();
    let (user, product) = rt.block_on(async {
        let user = store.insert_user("bench", "bench@example.com").await;
        let product = store
            .insert_product(NewProduct::new("Widget", Decimal::new(999, 2), i32::MAX))
            .await;
        (user, product)
    });
    let service = OrderService::new(store);

    c.bench_function("domain/place_order_single_item", |b| {
        b.iter(|| {
            rt.block_on(async {
                service
                    .place_order(OrderRequest::new(user, [(product, 1)]))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_place_five_items(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryStore::new();
    let (user, products) = rt.block_on(async {
        let user = store.insert_user("bench", "bench@example.com").await;
        let mut products = Vec::new();
        for i in 0..5 {
            let id = store
                .insert_product(NewProduct::new(
                    format!("Item {i}"),
                    Decimal::new(150 + i, 2),
                    i32::MAX,
                ))
                .await;
            products.push(id);
        }
        (user, products)
    });
    let service = OrderService::new(store);

    c.bench_function("domain/place_order_five_items", |b| {
        b.iter(|| {
            rt.block_on(async {
                let items = products.iter().map(|p| (*p, 2));
                service
                    .place_order(OrderRequest::new(user, items))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_rejected_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryStore::new();
    let (user, product) = rt.block_on(async {
        let user = store.insert_user("bench", "bench@example.com").await;
        let product = store
            .insert_product(NewProduct::new("Empty", Decimal::new(100, 2), 0))
            .await;
        (user, product)
    });
    let service = OrderService::new(store);

    c.bench_function("domain/place_order_insufficient_stock", |b| {
        b.iter(|| {
            rt.block_on(async {
                let _ = service
                    .place_order(OrderRequest::new(user, [(product, 1)]))
                    .await;
            });
        });
    });
}

criterion_group!(
    benches,
    bench_place_single_item,
    bench_place_five_items,
    bench_rejected_order
);
criterion_main!(benches);
