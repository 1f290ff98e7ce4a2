//! Demo entry point: wires the services over the in-memory bus and walks
//! one order through its life.

mod config;

use std::sync::Arc;
use std::time::Duration;

use common::{Money, ProductId};
use inventory::{InMemoryStockStore, InventoryReservationService};
use messaging::{InMemoryBus, MessageBus};
use orders::{
    Caller, CreateOrderRequest, InMemoryOrderRepository, LineItem, OrderOrchestrator,
    OrderRepository, OrderStatus, OrderStatusProjector, ReservationGateway,
};
use payment::{AlwaysApprove, InMemoryPaymentRepository, PaymentRequestHandler};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire the world over one in-memory bus
    let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::new());

    let stock = InMemoryStockStore::new();
    stock.add_product(ProductId::new("SKU-001"), Money::from_cents(1000), 10);
    stock.add_product(ProductId::new("SKU-002"), Money::from_cents(2500), 2);
    let inventory_service = Arc::new(InventoryReservationService::new(stock.clone()));
    inventory::spawn_listeners(Arc::clone(&bus), inventory_service);

    let payments = InMemoryPaymentRepository::new();
    let payment_handler = Arc::new(PaymentRequestHandler::new(
        payments.clone(),
        AlwaysApprove,
        Arc::clone(&bus),
    ));
    let _ = payment::spawn_listener(Arc::clone(&bus), payment_handler);

    let order_repository = InMemoryOrderRepository::new();
    let gateway = Arc::new(ReservationGateway::with_timeout(
        Arc::clone(&bus),
        config.reservation_timeout(),
    ));
    let _ = orders::spawn_response_listener(Arc::clone(&bus), Arc::clone(&gateway));

    let projector = Arc::new(OrderStatusProjector::new(
        order_repository.clone(),
        Arc::clone(&bus),
    ));
    orders::spawn_payment_listeners(Arc::clone(&bus), Arc::clone(&projector));

    let orchestrator = OrderOrchestrator::new(
        Arc::clone(&gateway),
        order_repository.clone(),
        Arc::clone(&bus),
    );

    let caller = Caller::user("demo@example.com");

    // 4. A successful order: both items reserve, the payment pays it
    let order = orchestrator
        .create_order(
            CreateOrderRequest {
                items: vec![
                    LineItem::new("SKU-001", 2),
                    LineItem::new("SKU-002", 1),
                ],
            },
            &caller,
        )
        .await
        .expect("order creation failed");
    tracing::info!(order_id = %order.id, total_price = %order.total_price(), "order placed");

    wait_for_status(&order_repository, order.id, OrderStatus::Paid).await;
    tracing::info!(order_id = %order.id, "order paid");

    // 5. An order that exceeds the remaining stock fails as a whole
    let rejected = orchestrator
        .create_order(
            CreateOrderRequest {
                items: vec![LineItem::new("SKU-002", 5)],
            },
            &caller,
        )
        .await;
    tracing::info!(result = %rejected.unwrap_err(), "oversized order rejected");

    // 6. Cancelling the paid order releases its stock
    let cancelled = projector
        .cancel_order(order.id, &caller)
        .await
        .expect("cancellation failed");
    tracing::info!(order_id = %cancelled.id, status = %cancelled.status, "order cancelled");

    // give the release messages a moment to land
    tokio::time::sleep(Duration::from_millis(100)).await;
    tracing::info!(
        sku_001 = stock.quantity_of(&ProductId::new("SKU-001")).unwrap_or(0),
        sku_002 = stock.quantity_of(&ProductId::new("SKU-002")).unwrap_or(0),
        "stock after compensation"
    );

    println!("{}", metrics_handle.render());
}

/// Polls the repository until the order reaches `expected`.
async fn wait_for_status(
    repository: &InMemoryOrderRepository,
    order_id: common::OrderId,
    expected: OrderStatus,
) {
    for _ in 0..100 {
        if let Ok(Some(order)) = repository.find_by_id(order_id).await
            && order.status == expected
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("order {order_id} never reached {expected}");
}
