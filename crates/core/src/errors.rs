use thiserror::Error;

/// Coarse failure class, used by the HTTP layer to pick a status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Internal,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("{name} query parameter is required")]
    MissingParameter { name: &'static str },
    #[error("Customer with ID {id} not found")]
    CustomerNotFound { id: String },
    #[error("No orders found for user_id {user_id}")]
    OrdersNotFound { user_id: String },
    #[error("Order with ID {id} not found")]
    OrderNotFound { id: String },
    #[error("{0}")]
    Store(String),
}

impl LookupError {
    pub fn store(error: impl std::fmt::Display) -> Self {
        Self::Store(error.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameter { .. } => ErrorKind::BadRequest,
            Self::CustomerNotFound { .. }
            | Self::OrdersNotFound { .. }
            | Self::OrderNotFound { .. } => ErrorKind::NotFound,
            Self::Store(_) => ErrorKind::Internal,
        }
    }

    /// Short category reported in the `error` field of a failure envelope.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } => "Bad request",
            Self::CustomerNotFound { .. } => "Customer not found",
            Self::OrdersNotFound { .. } => "Orders not found",
            Self::OrderNotFound { .. } => "Order not found",
            Self::Store(_) => "Internal server error",
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}
