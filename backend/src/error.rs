//! Error handling for the cold-storage consolidation server
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::CoreError;
use thiserror::Error;

use crate::external::ApiError;

/// Shown when the inventory service gives no usable message
pub const GENERIC_REMOTE_MESSAGE_EN: &str = "The inventory service could not complete the request";
pub const GENERIC_REMOTE_MESSAGE_ES: &str =
    "El servicio de inventario no pudo completar la solicitud";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String, message_es: String },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: Option<String>,
        message: String,
        message_es: String,
    },

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_es: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {message}")]
    InvalidStateTransition { message: String, message_es: String },

    #[error("Action already in progress: {0}")]
    ActionInProgress(String),

    // Remote persistence errors
    #[error("Inventory service error ({status}): {message}")]
    Remote { status: StatusCode, message: String },

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn unauthorized(message: &str) -> Self {
        AppError::Unauthorized {
            message: message.to_string(),
            message_es: "No autorizado".to_string(),
        }
    }

    pub fn invalid_input(field: &str, message: &str) -> Self {
        AppError::Validation {
            field: Some(field.to_string()),
            message: message.to_string(),
            message_es: format!("Dato no válido: {}", field),
        }
    }

    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } | AppError::ActionInProgress(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidStateTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Remote { status, .. } => *status,
            AppError::Internal(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Spanish rendering of a core rejection
fn core_message_es(error: &CoreError) -> String {
    match error {
        CoreError::UnknownTareCode(code) => format!("Código de tara desconocido: {}", code),
        CoreError::InvalidWeight(_) => "El peso no es válido".to_string(),
        CoreError::InvalidPrice { key, price } => {
            format!("Precio no válido para producto {} lote '{}': {}", key.product_id, key.lot, price)
        }
        CoreError::InvalidLinePrice { line, price } => {
            format!("La línea {} tiene un precio negativo: {}", line, price)
        }
        CoreError::MissingSupplier => "Debe seleccionar un proveedor".to_string(),
        CoreError::MissingDate => "Debe indicar la fecha de recepción".to_string(),
        CoreError::InvalidDate(value) => format!("Fecha de recepción no válida: {}", value),
        CoreError::NoValidEntries => {
            "Al menos una línea o palet necesita producto y peso neto positivo".to_string()
        }
        CoreError::BoxWithoutProduct {
            pallet_index,
            box_index,
        } => format!("La caja {} del palet {} no tiene producto", box_index, pallet_index),
        CoreError::ReadOnlyPallet(_) => "El palet no se puede modificar".to_string(),
        CoreError::NotFound(what) => format!("No se encontró {}", what),
        CoreError::PriceConflict { key, .. } => format!(
            "El precio del producto {} lote '{}' cambió mientras se editaba",
            key.product_id, key.lot
        ),
        CoreError::AlreadyLinked { pallet, order } => {
            format!("El palet {} ya está vinculado al pedido {}", pallet, order)
        }
        CoreError::UnknownPosition { store, position } => {
            format!("La posición {} no pertenece a la cámara {}", position, store)
        }
        CoreError::PalletNotInStore { store, pallet } => {
            format!("El palet {} no está en la cámara {}", pallet, store)
        }
        CoreError::ModeSwitchPending(mode) => {
            format!("Hay un cambio a modo {} pendiente de confirmar", mode)
        }
        CoreError::NoPendingModeSwitch => "No hay ningún cambio de modo pendiente".to_string(),
        CoreError::WrongMode { expected } => format!("La operación requiere el modo {}", expected),
    }
}

impl From<CoreError> for AppError {
    fn from(error: CoreError) -> Self {
        let message_es = core_message_es(&error);
        if error.is_validation() {
            return AppError::Validation {
                field: error.field().map(str::to_string),
                message: error.to_string(),
                message_es,
            };
        }
        match error {
            CoreError::NotFound(what) => AppError::NotFound(what),
            CoreError::PriceConflict { ref key, .. } => AppError::Conflict {
                resource: key.to_string(),
                message: error.to_string(),
                message_es,
            },
            CoreError::AlreadyLinked { pallet, .. } => AppError::Conflict {
                resource: format!("pallet {}", pallet),
                message: error.to_string(),
                message_es,
            },
            other => AppError::InvalidStateTransition {
                message: other.to_string(),
                message_es,
            },
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors.field_errors().keys().next().map(|f| f.to_string());
        AppError::Validation {
            message_es: match &field {
                Some(f) => format!("Dato no válido: {}", f),
                None => "Datos no válidos".to_string(),
            },
            field,
            message: errors.to_string(),
        }
    }
}

impl From<ApiError> for AppError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Unauthorized => {
                AppError::unauthorized("The inventory service rejected the credentials")
            }
            ApiError::Status { status, message } => AppError::Remote {
                status: StatusCode::from_u16(status)
                    .ok()
                    .filter(StatusCode::is_client_error)
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            },
            ApiError::Transport(_) | ApiError::Decode(_) => AppError::Remote {
                status: StatusCode::BAD_GATEWAY,
                message: GENERIC_REMOTE_MESSAGE_EN.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_detail = match &self {
            AppError::Unauthorized {
                message,
                message_es,
            } => ErrorDetail {
                code: "UNAUTHORIZED".to_string(),
                message_en: message.clone(),
                message_es: message_es.clone(),
                field: None,
            },
            AppError::Validation {
                field,
                message,
                message_es,
            } => ErrorDetail {
                code: "VALIDATION_ERROR".to_string(),
                message_en: message.clone(),
                message_es: message_es.clone(),
                field: field.clone(),
            },
            AppError::Conflict {
                resource,
                message,
                message_es,
            } => ErrorDetail {
                code: "CONFLICT".to_string(),
                message_en: message.clone(),
                message_es: message_es.clone(),
                field: Some(resource.clone()),
            },
            AppError::NotFound(resource) => ErrorDetail {
                code: "NOT_FOUND".to_string(),
                message_en: format!("{} not found", resource),
                message_es: format!("No se encontró {}", resource),
                field: None,
            },
            AppError::InvalidStateTransition {
                message,
                message_es,
            } => ErrorDetail {
                code: "INVALID_STATE_TRANSITION".to_string(),
                message_en: message.clone(),
                message_es: message_es.clone(),
                field: None,
            },
            AppError::ActionInProgress(action) => ErrorDetail {
                code: "ACTION_IN_PROGRESS".to_string(),
                message_en: format!("{} is already in progress", action),
                message_es: format!("{} ya está en curso", action),
                field: None,
            },
            AppError::Remote { message, .. } => ErrorDetail {
                code: "REMOTE_ERROR".to_string(),
                message_en: message.clone(),
                message_es: if message == GENERIC_REMOTE_MESSAGE_EN {
                    GENERIC_REMOTE_MESSAGE_ES.to_string()
                } else {
                    message.clone()
                },
                field: None,
            },
            AppError::Internal(msg) => ErrorDetail {
                code: "INTERNAL_ERROR".to_string(),
                message_en: msg.clone(),
                message_es: "Error interno del servidor".to_string(),
                field: None,
            },
            AppError::InternalError(_) => ErrorDetail {
                code: "INTERNAL_ERROR".to_string(),
                message_en: "An internal server error occurred".to_string(),
                message_es: "Error interno del servidor".to_string(),
                field: None,
            },
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
