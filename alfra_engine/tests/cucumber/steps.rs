use alfra_common::Pesos;
use alfra_engine::{
    db_types::{NewOrder, OrderStatus, SaleState, SaleType, StatusSource},
    StatusUpdateRequest,
};
use cucumber::{given, then, when};

use crate::cucumber::AlfraWorld;

#[given(expr = "the POS reports sale {word} for {int} pesos in state {word}")]
#[when(expr = "the POS reports sale {word} for {int} pesos in state {word}")]
async fn pos_reports_sale(world: &mut AlfraWorld, sale_id: String, total: i64, state: String) {
    let order = NewOrder::new(sale_id.clone(), Pesos::from_pesos(total))
        .with_sale_state(SaleState::from_pos_value(Some(&state)));
    world.pos_sales.insert(sale_id, order);
}

#[given("the mirror runs")]
#[when("the mirror runs")]
async fn mirror_runs(world: &mut AlfraWorld) {
    let batch = world.pos_sales.values().cloned().collect::<Vec<_>>();
    let count = world.system().sync_api.mirror_orders(&batch).await.expect("Error mirroring orders");
    assert_eq!(count, batch.len());
}

async fn set_status(world: &mut AlfraWorld, caller: Option<&str>, sale_id: &str, status: &str) {
    let order = world.order_for_sale(sale_id).await;
    let status = status.parse::<OrderStatus>().expect("Not a valid order status");
    let request = StatusUpdateRequest::new(order.id, status).with_source(StatusSource::Delivery);
    if let Err(e) = world.system().status_api.apply_status_change(caller, request).await {
        world.status_errors.push(e);
    }
}

#[when(expr = "{string} sets sale {word} to {string}")]
async fn caller_sets_status(world: &mut AlfraWorld, caller: String, sale_id: String, status: String) {
    set_status(world, Some(&caller), &sale_id, &status).await;
}

#[when(expr = "an anonymous caller sets sale {word} to {string}")]
async fn anonymous_sets_status(world: &mut AlfraWorld, sale_id: String, status: String) {
    set_status(world, None, &sale_id, &status).await;
}

#[then(expr = "there is/are {int} mirrored order(s)")]
async fn mirrored_order_count(world: &mut AlfraWorld, count: usize) {
    let mut found = 0;
    for sale_id in world.pos_sales.keys() {
        if world.system().sync_api.order_by_external_id(sale_id).await.expect("Error fetching order").is_some() {
            found += 1;
        }
    }
    assert_eq!(found, count);
    let row_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(world.system().db.pool())
        .await
        .expect("Error counting orders");
    assert_eq!(row_count, i64::try_from(count).expect("count fits in i64"));
}

#[then(expr = "sale {word} has sale state {word} and sale type {word}")]
async fn sale_state_and_type(world: &mut AlfraWorld, sale_id: String, state: String, sale_type: String) {
    let order = world.order_for_sale(&sale_id).await;
    assert_eq!(order.sale_state, state.parse::<SaleState>().expect("Not a sale state"));
    assert_eq!(order.sale_type, sale_type.parse::<SaleType>().expect("Not a sale type"));
}

#[then(expr = "sale {word} has a total of {int} pesos")]
async fn sale_total(world: &mut AlfraWorld, sale_id: String, total: i64) {
    let order = world.order_for_sale(&sale_id).await;
    assert_eq!(order.total, Pesos::from_pesos(total));
}

#[then(expr = "sale {word} is at version {int}")]
async fn sale_version(world: &mut AlfraWorld, sale_id: String, version: i64) {
    let order = world.order_for_sale(&sale_id).await;
    assert_eq!(order.version, version);
}

#[then(expr = "sale {word} has status {string}")]
async fn sale_status(world: &mut AlfraWorld, sale_id: String, status: String) {
    let order = world.order_for_sale(&sale_id).await;
    assert_eq!(order.status.to_string(), status);
}

#[then(expr = "sale {word} has {int} status change(s) recorded")]
async fn status_changes_recorded(world: &mut AlfraWorld, sale_id: String, count: usize) {
    let order = world.order_for_sale(&sale_id).await;
    let history = world.system().status_api.status_history(order.id).await.expect("Error fetching history");
    assert_eq!(history.len(), count);
}

#[then("the status update succeeds")]
async fn status_update_succeeds(world: &mut AlfraWorld) {
    assert!(world.status_errors.is_empty(), "Status update failed: {:?}", world.status_errors);
}

#[then(expr = "the status update fails with {word}")]
async fn status_update_fails(world: &mut AlfraWorld, kind: String) {
    let err = world.status_errors.last().expect("The status update did not fail");
    assert!(format!("{err:?}").starts_with(&kind), "Expected {kind}, got {err:?}");
}

#[then(expr = "{int} status update(s) failed with {word}")]
async fn status_updates_failed(world: &mut AlfraWorld, count: usize, kind: String) {
    assert_eq!(world.status_errors.len(), count, "{:?}", world.status_errors);
    for err in &world.status_errors {
        assert!(format!("{err:?}").starts_with(&kind), "Expected {kind}, got {err:?}");
    }
}
