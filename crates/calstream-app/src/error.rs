use thiserror::Error;

/// Errors surfaced by the command-line tool.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{input}: {source}")]
    Calendar {
        input: String,
        #[source]
        source: calstream_rfc::error::RfcError,
    },

    #[error("cannot open {path}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output")]
    Output(#[from] std::io::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
