#[derive(Debug, thiserror::Error)]
pub enum CafeError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("the menu has no item named '{0}'")]
    UnknownItem(String),
    #[error("no order with id {0}")]
    UnknownOrder(i32),
    #[error("'{0}' is not a valid price")]
    InvalidPrice(String),
}
