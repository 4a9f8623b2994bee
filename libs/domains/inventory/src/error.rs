use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Inventory service returned status {status}")]
    Server { status: u16 },

    #[error("Failed to restore product '{sku}': service returned status {status}")]
    RestoreFailed { sku: String, status: u16 },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("No deleted product with SKU '{0}'")]
    NotFound(String),
}

pub type InventoryResult<T> = Result<T, InventoryError>;

impl From<reqwest::Error> for InventoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            InventoryError::Parse(err.to_string())
        } else {
            InventoryError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for InventoryError {
    fn from(err: serde_json::Error) -> Self {
        InventoryError::Parse(err.to_string())
    }
}
