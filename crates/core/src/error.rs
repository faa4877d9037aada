use thiserror::Error;

use crate::model::{IdError, RecordKeyError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    RecordKey(#[from] RecordKeyError),
    #[error("record {key} is missing field {field}")]
    MissingField { key: String, field: &'static str },
}
