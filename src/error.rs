use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::error::Error as StdError;
use std::fmt;

/// Failure of a single read/write against the attendance/leave store.
#[derive(Debug)]
pub struct StoreError(pub anyhow::Error);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store operation failed: {}", self.0)
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.0.as_ref())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError(e.into())
    }
}

/// Failure to fetch the holiday catalog. Deliberately distinct from an empty
/// holiday list: the backfill reconciler must not guess holiday status when
/// the catalog is unreachable.
#[derive(Debug)]
pub struct CatalogError(pub anyhow::Error);

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "holiday catalog fetch failed: {}", self.0)
    }
}

impl StdError for CatalogError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.0.as_ref())
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError(e.into())
    }
}

/// Error taxonomy of the user-facing engine operations.
#[derive(Debug, derive_more::Display)]
pub enum EngineError {
    #[display(fmt = "no authenticated user session")]
    NotAuthenticated,
    #[display(fmt = "leave range end date precedes start date")]
    InvalidRange,
    #[display(fmt = "attendance store unavailable: {}", _0)]
    StoreUnavailable(StoreError),
    #[display(fmt = "holiday catalog unavailable: {}", _0)]
    CatalogUnavailable(CatalogError),
}

impl StdError for EngineError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EngineError::StoreUnavailable(e) => Some(e),
            EngineError::CatalogUnavailable(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::StoreUnavailable(e)
    }
}

impl From<CatalogError> for EngineError {
    fn from(e: CatalogError) -> Self {
        EngineError::CatalogUnavailable(e)
    }
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            EngineError::InvalidRange => StatusCode::BAD_REQUEST,
            EngineError::StoreUnavailable(_) | EngineError::CatalogUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}
