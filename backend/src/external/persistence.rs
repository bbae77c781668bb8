//! Client for the remote inventory persistence API
//!
//! Every call takes the caller's [`RequestContext`]; the client itself holds
//! no identity. Errors carry the server's human message when it sends one.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared::{
    OrderId, Pallet, PalletId, PalletState, PalletSummary, PositionId, ProductId, Reception,
    ReceptionSubmission, Store, StoreId,
};
use thiserror::Error;

use crate::error::GENERIC_REMOTE_MESSAGE_EN;
use crate::middleware::{RequestContext, TENANT_HEADER};

/// Failures talking to the inventory service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("The inventory service rejected the credentials")]
    Unauthorized,

    #[error("Inventory service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Inventory service unreachable: {0}")]
    Transport(String),

    #[error("Unexpected response from inventory service: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Error body sent by the inventory service
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope {
    #[serde(default)]
    user_message: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Human message of an error body: `userMessage`, else `message`, else generic
pub fn error_message(body: &str) -> String {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    envelope
        .user_message
        .filter(|m| !m.trim().is_empty())
        .or(envelope.message.filter(|m| !m.trim().is_empty()))
        .unwrap_or_else(|| GENERIC_REMOTE_MESSAGE_EN.to_string())
}

/// One pallet/order pair of a batch link
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PalletOrderLink {
    pub pallet_id: PalletId,
    pub order_id: OrderId,
}

/// Per-pallet result of a batch call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    pub pallet_id: PalletId,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    results: Vec<BatchItemResult>,
}

/// Query of the pallet search endpoint
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PalletQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PalletState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<StoreId>,
}

/// Operations of the persistence API used by the consolidation server
#[axum::async_trait]
pub trait InventoryApi: Send + Sync {
    async fn create_reception(
        &self,
        ctx: &RequestContext,
        payload: &ReceptionSubmission,
    ) -> ApiResult<Reception>;

    async fn get_pallet(&self, ctx: &RequestContext, id: PalletId) -> ApiResult<Pallet>;

    async fn update_pallet(
        &self,
        ctx: &RequestContext,
        id: PalletId,
        pallet: &Pallet,
    ) -> ApiResult<Pallet>;

    async fn assign_pallets_to_position(
        &self,
        ctx: &RequestContext,
        position: PositionId,
        pallets: &[PalletId],
    ) -> ApiResult<()>;

    async fn unassign_pallet_position(&self, ctx: &RequestContext, id: PalletId) -> ApiResult<()>;

    async fn link_pallet_to_order(
        &self,
        ctx: &RequestContext,
        pallet: PalletId,
        order: OrderId,
    ) -> ApiResult<()>;

    async fn unlink_pallet_from_order(&self, ctx: &RequestContext, pallet: PalletId)
        -> ApiResult<()>;

    async fn link_pallets_to_orders(
        &self,
        ctx: &RequestContext,
        links: &[PalletOrderLink],
    ) -> ApiResult<Vec<BatchItemResult>>;

    async fn unlink_pallets_from_orders(
        &self,
        ctx: &RequestContext,
        pallets: &[PalletId],
    ) -> ApiResult<Vec<BatchItemResult>>;

    async fn search_pallets(
        &self,
        ctx: &RequestContext,
        query: &PalletQuery,
    ) -> ApiResult<Vec<PalletSummary>>;

    async fn get_store(&self, ctx: &RequestContext, id: StoreId) -> ApiResult<Store>;
}

/// `reqwest` implementation of [`InventoryApi`]
#[derive(Clone)]
pub struct RestInventoryApi {
    client: Client,
    base_url: String,
}

impl RestInventoryApi {
    /// Create a client with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client around an existing `reqwest::Client` (for testing)
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: Method, path: &str, ctx: &RequestContext) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&ctx.token);
        match &ctx.tenant {
            Some(tenant) => builder.header(TENANT_HEADER, tenant),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        self.send(builder)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> ApiResult<()> {
        self.send(builder).await.map(|_| ())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignBody<'a> {
    position_id: PositionId,
    pallet_ids: &'a [PalletId],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LinkBody {
    order_id: OrderId,
}

#[derive(Serialize)]
struct LinkBatchBody<'a> {
    links: &'a [PalletOrderLink],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnlinkBatchBody<'a> {
    pallet_ids: &'a [PalletId],
}

#[axum::async_trait]
impl InventoryApi for RestInventoryApi {
    async fn create_reception(
        &self,
        ctx: &RequestContext,
        payload: &ReceptionSubmission,
    ) -> ApiResult<Reception> {
        let builder = self
            .request(Method::POST, "/raw-material-receptions", ctx)
            .json(payload);
        self.send_json(builder).await
    }

    async fn get_pallet(&self, ctx: &RequestContext, id: PalletId) -> ApiResult<Pallet> {
        let builder = self.request(Method::GET, &format!("/pallets/{}", id), ctx);
        self.send_json(builder).await
    }

    async fn update_pallet(
        &self,
        ctx: &RequestContext,
        id: PalletId,
        pallet: &Pallet,
    ) -> ApiResult<Pallet> {
        let builder = self
            .request(Method::PUT, &format!("/pallets/{}", id), ctx)
            .json(pallet);
        self.send_json(builder).await
    }

    async fn assign_pallets_to_position(
        &self,
        ctx: &RequestContext,
        position: PositionId,
        pallets: &[PalletId],
    ) -> ApiResult<()> {
        let builder = self
            .request(Method::POST, "/pallets/assign-to-position", ctx)
            .json(&AssignBody {
                position_id: position,
                pallet_ids: pallets,
            });
        self.send_empty(builder).await
    }

    async fn unassign_pallet_position(&self, ctx: &RequestContext, id: PalletId) -> ApiResult<()> {
        let builder = self.request(
            Method::POST,
            &format!("/pallets/{}/unassign-position", id),
            ctx,
        );
        self.send_empty(builder).await
    }

    async fn link_pallet_to_order(
        &self,
        ctx: &RequestContext,
        pallet: PalletId,
        order: OrderId,
    ) -> ApiResult<()> {
        let builder = self
            .request(Method::POST, &format!("/pallets/{}/link-order", pallet), ctx)
            .json(&LinkBody { order_id: order });
        self.send_empty(builder).await
    }

    async fn unlink_pallet_from_order(
        &self,
        ctx: &RequestContext,
        pallet: PalletId,
    ) -> ApiResult<()> {
        let builder = self.request(Method::POST, &format!("/pallets/{}/unlink-order", pallet), ctx);
        self.send_empty(builder).await
    }

    async fn link_pallets_to_orders(
        &self,
        ctx: &RequestContext,
        links: &[PalletOrderLink],
    ) -> ApiResult<Vec<BatchItemResult>> {
        // 207 Multi-Status is a success status, so partial results land here too
        let builder = self
            .request(Method::POST, "/pallets/link-orders", ctx)
            .json(&LinkBatchBody { links });
        let response: BatchResponse = self.send_json(builder).await?;
        Ok(response.results)
    }

    async fn unlink_pallets_from_orders(
        &self,
        ctx: &RequestContext,
        pallets: &[PalletId],
    ) -> ApiResult<Vec<BatchItemResult>> {
        let builder = self
            .request(Method::POST, "/pallets/unlink-orders", ctx)
            .json(&UnlinkBatchBody {
                pallet_ids: pallets,
            });
        let response: BatchResponse = self.send_json(builder).await?;
        Ok(response.results)
    }

    async fn search_pallets(
        &self,
        ctx: &RequestContext,
        query: &PalletQuery,
    ) -> ApiResult<Vec<PalletSummary>> {
        let builder = self.request(Method::GET, "/pallets", ctx).query(query);
        self.send_json(builder).await
    }

    async fn get_store(&self, ctx: &RequestContext, id: StoreId) -> ApiResult<Store> {
        let builder = self.request(Method::GET, &format!("/stores/{}", id), ctx);
        self.send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_wins() {
        let body = r#"{"userMessage":"El palet ya está expedido","message":"PalletShipped"}"#;
        assert_eq!(error_message(body), "El palet ya está expedido");
    }

    #[test]
    fn test_falls_back_to_message() {
        assert_eq!(error_message(r#"{"message":"Order closed"}"#), "Order closed");
        assert_eq!(
            error_message(r#"{"userMessage":"  ","message":"Order closed"}"#),
            "Order closed"
        );
    }

    #[test]
    fn test_generic_message_without_body() {
        assert_eq!(error_message(""), GENERIC_REMOTE_MESSAGE_EN);
        assert_eq!(error_message("<html>502</html>"), GENERIC_REMOTE_MESSAGE_EN);
        assert_eq!(error_message("{}"), GENERIC_REMOTE_MESSAGE_EN);
    }

    #[test]
    fn test_batch_response_shape() {
        let body = r#"{"results":[
            {"palletId":1,"success":true},
            {"palletId":2,"success":false,"message":"Pallet is shipped"}
        ]}"#;
        let response: BatchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.results.len(), 2);
        assert!(!response.results[1].success);
        assert_eq!(response.results[1].message.as_deref(), Some("Pallet is shipped"));
    }

    #[test]
    fn test_query_skips_empty_fields() {
        let query = PalletQuery {
            lot: Some("L-1".to_string()),
            ..PalletQuery::default()
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, serde_json::json!({ "lot": "L-1" }));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = RestInventoryApi::with_client(Client::new(), "http://inventory.local/api/");
        assert_eq!(api.base_url, "http://inventory.local/api");
    }
}
