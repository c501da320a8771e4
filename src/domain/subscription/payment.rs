//! Payment confirmation as returned by checkout.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, PaymentId};

/// A completed charge claimed by the client after checkout.
///
/// Nothing about it is trusted until the signature verifies; the amount
/// and currency recorded against it come from the plan being purchased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub signature: String,
}

impl Payment {
    pub fn new(id: PaymentId, order_id: OrderId, signature: impl Into<String>) -> Self {
        Self {
            id,
            order_id,
            signature: signature.into(),
        }
    }
}
