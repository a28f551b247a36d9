use serde::Deserialize;
use validator::Validate;

/// Provisioning request, from the operator or a paid webhook.
#[derive(Debug, Deserialize, Validate)]
pub struct NewArtist {
    #[validate(length(min = 1, max = 80, message = "name must be 1-80 characters"))]
    pub name: String,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 8, max = 20, message = "phone must be 8-20 characters"))]
    pub phone: Option<String>,

    /// Explicit tenant id; the next `gallery-vip-NN` otherwise.
    #[validate(length(min = 1, max = 64))]
    pub artist_id: Option<String>,

    #[validate(range(min = 0.0))]
    pub price: Option<f64>,

    pub transaction_id: Option<String>,

    #[serde(default = "subscribed")]
    pub is_subscribed: bool,

    /// Initial admin password; generated when absent.
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
}

fn subscribed() -> bool {
    true
}
