use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("dynamodb error: {0}")]
    Dynamo(#[from] Box<aws_sdk_dynamodb::Error>),

    #[error("malformed record: {0}")]
    Malformed(#[from] serde_dynamo::Error),
}

impl StoreError {
    pub(crate) fn dynamo<E>(err: E) -> Self
    where
        E: Into<aws_sdk_dynamodb::Error>,
    {
        Self::Dynamo(Box::new(err.into()))
    }
}
