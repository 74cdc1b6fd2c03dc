use thiserror::Error;

use crate::rfc::ical::parse::ParseError;

/// RFC parsing errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error(transparent)]
    CoreError(#[from] calstream_core::error::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
