//! External API integrations

pub mod persistence;

pub use persistence::{
    error_message, ApiError, ApiResult, BatchItemResult, InventoryApi, PalletOrderLink,
    PalletQuery, RestInventoryApi,
};
