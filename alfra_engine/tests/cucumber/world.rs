use std::collections::BTreeMap;

use alfra_engine::{
    db_types::{NewOrder, Order},
    OrderSyncApi,
    ProfileApi,
    SqliteDatabase,
    StatusApi,
    StatusUpdateError,
};
use cucumber::World;

use crate::support::prepare_test_db;

#[derive(Default, Debug, World)]
pub struct AlfraWorld {
    pub system: Option<MirrorSystem>,
    /// What the POS would currently report, keyed by sale id
    pub pos_sales: BTreeMap<String, NewOrder>,
    /// Every status update that failed in this scenario, oldest first
    pub status_errors: Vec<StatusUpdateError>,
}

#[derive(Debug)]
pub struct MirrorSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub sync_api: OrderSyncApi<SqliteDatabase>,
    pub status_api: StatusApi<SqliteDatabase>,
    pub profile_api: ProfileApi<SqliteDatabase>,
}

impl MirrorSystem {
    pub async fn new() -> Self {
        let (db_path, db) = prepare_test_db().await;
        let sync_api = OrderSyncApi::new(db.clone());
        let status_api = StatusApi::new(db.clone());
        let profile_api = ProfileApi::new(db.clone());
        Self { db_path, db, sync_api, status_api, profile_api }
    }
}

impl AlfraWorld {
    pub fn system(&self) -> &MirrorSystem {
        self.system.as_ref().expect("System not initialised")
    }

    pub async fn order_for_sale(&self, sale_id: &str) -> Order {
        self.system()
            .sync_api
            .order_by_external_id(sale_id)
            .await
            .expect("Error fetching order")
            .unwrap_or_else(|| panic!("Sale {sale_id} has not been mirrored"))
    }
}
