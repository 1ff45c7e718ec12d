//! `/api/workdays` routes.
//!
//! Work days are served by the admin API directly; the portal only answers
//! 501 here, after bearer authentication.

use crate::errors::HrmError;
use tracing::instrument;

const NOT_IMPLEMENTED_MESSAGE: &str = "API endpoint not implemented. Use external API directly.";

/// Handler for every method on /api/workdays and /api/workdays/:id
#[instrument(skip_all, name = "hrm.api.workdays")]
pub async fn workdays_not_implemented() -> HrmError {
    HrmError::NotImplemented(NOT_IMPLEMENTED_MESSAGE.to_string())
}
