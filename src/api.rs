use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::model::{ActionKind, CartActionRequest, CartActionResult, CartSnapshot};

/// Request body for the add, remove and update endpoints.
#[derive(Debug, Serialize, PartialEq)]
pub struct CartPayload<'a> {
    pub product_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl<'a> From<&'a CartActionRequest> for CartPayload<'a> {
    fn from(request: &'a CartActionRequest) -> Self {
        CartPayload {
            product_id: &request.product_id,
            quantity: match request.kind {
                ActionKind::Remove | ActionKind::Count => None,
                ActionKind::Add | ActionKind::Update => request.quantity,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CartResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub cart_count: Option<u32>,
    #[serde(default)]
    pub cart_total: Option<f64>,
    #[serde(default)]
    pub item_total: Option<f64>,
}

fn check_amount(field: &str, amount: f64) -> Result<(), SyncError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(SyncError::MalformedResponse(format!("invalid {} {}", field, amount)));
    }
    Ok(())
}

impl CartResponse {
    fn into_snapshot(self, kind: ActionKind) -> Result<(CartSnapshot, Option<String>), SyncError> {
        let item_count = self
            .cart_count
            .ok_or_else(|| SyncError::MalformedResponse("missing cart_count".to_string()))?;
        let cart_total = self
            .cart_total
            .ok_or_else(|| SyncError::MalformedResponse("missing cart_total".to_string()))?;
        check_amount("cart_total", cart_total)?;

        let item_total = match (kind, self.item_total) {
            (ActionKind::Update, None) => {
                return Err(SyncError::MalformedResponse("missing item_total".to_string()));
            }
            (ActionKind::Update, Some(total)) => {
                check_amount("item_total", total)?;
                Some(total)
            }
            _ => None,
        };

        let snapshot = CartSnapshot {
            item_count,
            cart_total,
            item_total,
        };
        Ok((snapshot, self.message))
    }
}

/// Turns a raw service reply into an outcome. Anything that does not have
/// the expected shape fails closed as a network failure.
pub fn parse_result(kind: ActionKind, payload: serde_json::Value) -> CartActionResult {
    let response: CartResponse = match serde_json::from_value(payload.clone()) {
        Ok(response) => response,
        Err(e) => return CartActionResult::Failure(SyncError::from(e)),
    };

    if !response.success {
        return CartActionResult::Failure(SyncError::Rejected(response.error));
    }

    match response.into_snapshot(kind) {
        Ok((snapshot, message)) => CartActionResult::Success {
            snapshot,
            message,
            payload,
        },
        Err(e) => CartActionResult::Failure(e),
    }
}
