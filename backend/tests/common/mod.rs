//! In-memory stand-in for the remote inventory API

#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use coldstore_backend::config::{ApiConfig, Config, IntakeConfig, ServerConfig};
use coldstore_backend::external::{
    ApiError, ApiResult, BatchItemResult, InventoryApi, PalletOrderLink, PalletQuery,
};
use coldstore_backend::middleware::RequestContext;
use coldstore_backend::AppState;
use rust_decimal::Decimal;
use shared::{
    OrderId, Pallet, PalletBox, PalletId, PalletState, PalletSummary, PositionId, Product,
    ProductId, Reception, ReceptionId, ReceptionSubmission, StoreLocation, Store, StoreId,
};

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn ctx() -> RequestContext {
    RequestContext::new("test-token", Some("cold-1".to_string()))
}

pub fn product(id: i64, name: &str) -> Product {
    Product::new(ProductId::new(id), name)
}

pub fn stored_pallet(id: i64, store: i64, weights: &[&str]) -> Pallet {
    let boxes = weights
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let mut b = PalletBox::new(Some(product(1, "Hake")), "L-1", dec(w));
            b.id = Some(shared::BoxId::new(id * 100 + i as i64));
            b.is_new = false;
            b
        })
        .collect();
    let mut pallet = Pallet::with_boxes(boxes);
    pallet.id = Some(PalletId::new(id));
    pallet.state = PalletState::Stored;
    pallet.location = Some(StoreLocation {
        store_id: StoreId::new(store),
        position_id: None,
    });
    pallet
}

pub fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        api: ApiConfig {
            base_url: "http://inventory.test/api".to_string(),
            timeout_secs: 5,
        },
        intake: IntakeConfig::default(),
    }
}

/// Fake remote API with recorded calls and scripted failures
#[derive(Default)]
pub struct FakeInventoryApi {
    pub pallets: Mutex<HashMap<PalletId, Pallet>>,
    pub stores: Mutex<HashMap<StoreId, Store>>,
    pub calls: Mutex<Vec<String>>,
    pub receptions: Mutex<Vec<ReceptionSubmission>>,
    /// Error returned by the next mutating call
    pub fail_next: Mutex<Option<ApiError>>,
    /// Pallets a batch call reports as failed, with their message
    pub batch_failures: Mutex<HashMap<PalletId, Option<String>>>,
    pub delay: Option<Duration>,
}

impl FakeInventoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn insert_pallet(&self, pallet: Pallet) {
        let id = pallet.id.unwrap();
        self.pallets.lock().unwrap().insert(id, pallet);
    }

    pub fn insert_store(&self, store: Store) {
        self.stores.lock().unwrap().insert(store.id, store);
    }

    pub fn pallet(&self, id: i64) -> Pallet {
        self.pallets.lock().unwrap()[&PalletId::new(id)].clone()
    }

    pub fn fail_next(&self, error: ApiError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    pub fn fail_in_batch(&self, id: i64, message: Option<&str>) {
        self.batch_failures
            .lock()
            .unwrap()
            .insert(PalletId::new(id), message.map(str::to_string));
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn record(&self, name: &str) -> ApiResult<()> {
        self.calls.lock().unwrap().push(name.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    fn take_failure(&self) -> ApiResult<()> {
        match self.fail_next.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn missing(what: &str) -> ApiError {
        ApiError::Status {
            status: 404,
            message: format!("{} not found", what),
        }
    }

    fn batch_results(&self, ids: &[PalletId]) -> Vec<BatchItemResult> {
        let failures = self.batch_failures.lock().unwrap();
        ids.iter()
            .map(|id| match failures.get(id) {
                Some(message) => BatchItemResult {
                    pallet_id: *id,
                    success: false,
                    message: message.clone(),
                },
                None => BatchItemResult {
                    pallet_id: *id,
                    success: true,
                    message: None,
                },
            })
            .collect()
    }

    fn set_order(&self, id: PalletId, order: Option<OrderId>) {
        if let Some(pallet) = self.pallets.lock().unwrap().get_mut(&id) {
            pallet.order_id = order;
        }
    }
}

pub fn state_with(api: Arc<FakeInventoryApi>) -> AppState {
    AppState::new(test_config(), api)
}

#[axum::async_trait]
impl InventoryApi for FakeInventoryApi {
    async fn create_reception(
        &self,
        _ctx: &RequestContext,
        payload: &ReceptionSubmission,
    ) -> ApiResult<Reception> {
        self.record("create_reception").await?;
        self.take_failure()?;
        let mut receptions = self.receptions.lock().unwrap();
        receptions.push(payload.clone());
        Ok(Reception {
            id: ReceptionId::new(receptions.len() as i64),
            supplier: None,
            date: None,
            notes: None,
            pallets: Vec::new(),
        })
    }

    async fn get_pallet(&self, _ctx: &RequestContext, id: PalletId) -> ApiResult<Pallet> {
        self.record("get_pallet").await?;
        self.pallets
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::missing("Pallet"))
    }

    async fn update_pallet(
        &self,
        _ctx: &RequestContext,
        id: PalletId,
        pallet: &Pallet,
    ) -> ApiResult<Pallet> {
        self.record("update_pallet").await?;
        self.take_failure()?;
        self.pallets.lock().unwrap().insert(id, pallet.clone());
        Ok(pallet.clone())
    }

    async fn assign_pallets_to_position(
        &self,
        _ctx: &RequestContext,
        position: PositionId,
        pallets: &[PalletId],
    ) -> ApiResult<()> {
        self.record("assign_pallets_to_position").await?;
        self.take_failure()?;
        let mut stored = self.pallets.lock().unwrap();
        for id in pallets {
            if let Some(location) = stored.get_mut(id).and_then(|p| p.location.as_mut()) {
                location.position_id = Some(position);
            }
        }
        Ok(())
    }

    async fn unassign_pallet_position(&self, _ctx: &RequestContext, id: PalletId) -> ApiResult<()> {
        self.record("unassign_pallet_position").await?;
        self.take_failure()?;
        if let Some(location) = self
            .pallets
            .lock()
            .unwrap()
            .get_mut(&id)
            .and_then(|p| p.location.as_mut())
        {
            location.position_id = None;
        }
        Ok(())
    }

    async fn link_pallet_to_order(
        &self,
        _ctx: &RequestContext,
        pallet: PalletId,
        order: OrderId,
    ) -> ApiResult<()> {
        self.record("link_pallet_to_order").await?;
        self.take_failure()?;
        self.set_order(pallet, Some(order));
        Ok(())
    }

    async fn unlink_pallet_from_order(
        &self,
        _ctx: &RequestContext,
        pallet: PalletId,
    ) -> ApiResult<()> {
        self.record("unlink_pallet_from_order").await?;
        self.take_failure()?;
        self.set_order(pallet, None);
        Ok(())
    }

    async fn link_pallets_to_orders(
        &self,
        _ctx: &RequestContext,
        links: &[PalletOrderLink],
    ) -> ApiResult<Vec<BatchItemResult>> {
        self.record("link_pallets_to_orders").await?;
        self.take_failure()?;
        let ids: Vec<PalletId> = links.iter().map(|l| l.pallet_id).collect();
        let results = self.batch_results(&ids);
        for (link, result) in links.iter().zip(&results) {
            if result.success {
                self.set_order(link.pallet_id, Some(link.order_id));
            }
        }
        Ok(results)
    }

    async fn unlink_pallets_from_orders(
        &self,
        _ctx: &RequestContext,
        pallets: &[PalletId],
    ) -> ApiResult<Vec<BatchItemResult>> {
        self.record("unlink_pallets_from_orders").await?;
        self.take_failure()?;
        let results = self.batch_results(pallets);
        for result in results.iter().filter(|r| r.success) {
            self.set_order(result.pallet_id, None);
        }
        Ok(results)
    }

    async fn search_pallets(
        &self,
        _ctx: &RequestContext,
        query: &PalletQuery,
    ) -> ApiResult<Vec<PalletSummary>> {
        self.record("search_pallets").await?;
        let mut found: Vec<PalletSummary> = self
            .pallets
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, p)| query.state.map_or(true, |s| p.state == s))
            .map(|(id, p)| PalletSummary::from_pallet(*id, p))
            .collect();
        found.sort_by_key(|s| s.id);
        Ok(found)
    }

    async fn get_store(&self, _ctx: &RequestContext, id: StoreId) -> ApiResult<Store> {
        self.record("get_store").await?;
        let mut store = self
            .stores
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::missing("Store"))?;
        store.pallets = self
            .pallets
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.location.map(|l| l.store_id) == Some(id))
            .cloned()
            .collect();
        store.pallets.sort_by_key(|p| p.id);
        Ok(store)
    }
}
