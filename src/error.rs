use std::path::PathBuf;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::chart::ChartKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller supplied something we cannot interpret (bad age, unknown chart, bad size).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A dataset file could not be opened or parsed.
    #[error("failed to load dataset '{}': {source}", .path.display())]
    Startup {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("no rows match the filter, nothing to draw for {0}")]
    NoData(ChartKind),

    #[error("render failed: {0}")]
    Render(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the whole context chain on one line
        Error::Render(format!("{:#}", err))
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NoData(_) => StatusCode::NOT_FOUND,
            Error::Startup { .. } | Error::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}
