use anyhow::Result;
use async_trait::async_trait;
use galleria_core::{ServiceCapabilities, ServiceMethodKind, TenantContext, TenantService};
use serde_json::{json, Value};

use crate::services::GalleryParams;
use crate::utils::validation::validate;

use super::payments_schema::PaymentEvent;

/// Accepts payment notifications.
///
/// `create` only parses and acknowledges the event; provisioning of paid
/// events happens in an after hook so it can go through the artists
/// service and its hooks.
pub struct PaymentsService;

#[async_trait]
impl TenantService<Value, GalleryParams> for PaymentsService {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Create])
    }

    async fn create(&self, _ctx: &TenantContext, data: Value, _params: GalleryParams) -> Result<Value> {
        let event: PaymentEvent = validate(&data, "Invalid payment event")?;
        let paid = event.is_paid();

        tracing::info!(
            transaction_id = %event.transaction_id,
            status = %event.status,
            paid,
            "payment event received"
        );

        Ok(json!({
            "received": true,
            "status": event.status,
            "paid": paid,
            "transactionId": event.transaction_id,
            "customer": {
                "name": event.customer.name,
                "email": event.customer.email,
                "phone": event.customer.phone,
            },
            "amount": event.amount,
        }))
    }
}
