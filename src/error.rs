use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Stripe API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error")]
    Http(#[from] reqwest::Error),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Payment intent {0} has more than one checkout session")]
    AmbiguousSession(String),

    #[error("Checkout session {0} has more line items than were fetched")]
    IncompleteLineItems(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
