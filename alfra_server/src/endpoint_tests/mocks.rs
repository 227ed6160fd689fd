use alfra_engine::{
    db_types::{NewOrder, NewProfile, NewStatusChange, Order, Profile, StatusChange},
    traits::{OrderStore, OrderStoreError, ProfileApiError, ProfileManagement},
};
use chrono::{DateTime, Utc};
use fudo_tools::{FudoApiError, FudoSale};
use mockall::mock;

use crate::integrations::fudo::SalesFetcher;

mock! {
    pub Store {}
    impl OrderStore for Store {
        async fn upsert_orders(&self, orders: &[NewOrder]) -> Result<usize, OrderStoreError>;
        async fn fetch_order(&self, id: i64) -> Result<Option<Order>, OrderStoreError>;
        async fn fetch_order_by_external_id(&self, external_id: &str) -> Result<Option<Order>, OrderStoreError>;
        async fn fetch_orders_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Order>, OrderStoreError>;
        async fn update_order_status(&self, change: &NewStatusChange) -> Result<Order, OrderStoreError>;
        async fn fetch_status_history(&self, order_id: i64) -> Result<Vec<StatusChange>, OrderStoreError>;
    }
    impl ProfileManagement for Store {
        async fn fetch_profile(&self, id: &str) -> Result<Option<Profile>, ProfileApiError>;
        async fn upsert_profile(&self, profile: NewProfile) -> Result<Profile, ProfileApiError>;
    }
}

mock! {
    pub Fetcher {}
    impl SalesFetcher for Fetcher {
        async fn fetch_recent_sales(&self, limit: usize) -> Result<Vec<FudoSale>, FudoApiError>;
        async fn fetch_sale(&self, sale_id: &str) -> Result<Option<FudoSale>, FudoApiError>;
    }
}
