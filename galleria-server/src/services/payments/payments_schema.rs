use serde::Deserialize;
use validator::Validate;

const PAID_STATUSES: [&str; 3] = ["DONE", "PAID", "COMPLETED"];

pub fn is_paid_status(status: &str) -> bool {
    let status = status.trim();
    PAID_STATUSES.iter().any(|s| status.eq_ignore_ascii_case(s))
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct Customer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Payment provider notification.
#[derive(Debug, Deserialize, Validate)]
pub struct PaymentEvent {
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,

    #[validate(length(min = 1, max = 128, message = "transaction_id is required"))]
    pub transaction_id: String,

    #[serde(default)]
    pub customer: Customer,

    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
}

impl PaymentEvent {
    pub fn is_paid(&self) -> bool {
        is_paid_status(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paid_statuses_ignore_case_and_padding() {
        assert!(is_paid_status("DONE"));
        assert!(is_paid_status(" paid "));
        assert!(is_paid_status("Completed"));
        assert!(!is_paid_status("PENDING"));
        assert!(!is_paid_status(""));
    }

    #[test]
    fn customer_is_optional() {
        let event: PaymentEvent =
            serde_json::from_value(json!({"status": "CANCELED", "transaction_id": "tx-1"})).unwrap();
        assert!(!event.is_paid());
        assert!(event.customer.phone.is_none());
        assert!(event.validate().is_ok());
    }
}
