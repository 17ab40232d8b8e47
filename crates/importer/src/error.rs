use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Fetching orders from the remote API failed: {0}")]
    Api(#[from] api_client::error::ApiError),

    #[error("Persisting an imported order failed: {0}")]
    Db(#[from] database::DbError),
}
