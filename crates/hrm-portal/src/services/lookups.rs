//! Combobox lookup lists, served through the request cache.
//!
//! Lookup lists are reference data, so one cache is shared by every session.
//! A caller still needs a usable session before the cache is consulted, and
//! a 401 only ends the sessions whose token the failed fetch actually used.

use super::admin_client::{AdminClient, AdminResponse};
use crate::cache::RequestCache;
use crate::errors::HrmError;
use crate::models::LookupItem;
use crate::session::SessionGuard;
use common::secret::{ExposeSecret, SecretString};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub const LOOKUP_ENDPOINT: &str = "/admin/CustomerSanPhamDauTu/DanhMucForCombobox";
const NO_DATA_MESSAGE: &str = "Không có dữ liệu";

/// Body of the admin API combobox query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LookupQuery {
    pub param_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_code: Option<String>,
    pub user_id: String,
}

impl LookupQuery {
    /// `"{param_type}-{param_code}-{user_id}"`, with an empty code when
    /// there is none.
    pub fn cache_key(&self) -> String {
        format!(
            "{}-{}-{}",
            self.param_type,
            self.param_code.as_deref().unwrap_or_default(),
            self.user_id
        )
    }
}

#[derive(Debug, Clone)]
pub struct LookupService {
    admin: AdminClient,
    cache: RequestCache<Vec<LookupItem>>,
    default_user_id: String,
}

impl LookupService {
    pub fn new(
        admin: AdminClient,
        ttl: Duration,
        fetch_timeout: Duration,
        default_user_id: String,
    ) -> Self {
        Self {
            admin,
            cache: RequestCache::new("lookups", ttl).with_fetch_timeout(fetch_timeout),
            default_user_id,
        }
    }

    pub fn cache(&self) -> &RequestCache<Vec<LookupItem>> {
        &self.cache
    }

    /// Build the query for a lookup list; `user_id` falls back to the
    /// configured default.
    pub fn query(&self, param_type: &str, param_code: Option<&str>, user_id: Option<&str>) -> LookupQuery {
        LookupQuery {
            param_type: param_type.to_string(),
            param_code: param_code.filter(|c| !c.is_empty()).map(str::to_string),
            user_id: user_id
                .filter(|u| !u.is_empty())
                .unwrap_or(&self.default_user_id)
                .to_string(),
        }
    }

    /// Items of one lookup list.
    ///
    /// # Errors
    ///
    /// - `SessionExpired` without a usable session (no request is made)
    /// - `Unauthorized` on 401 for this session's own token, which also logs
    ///   the session out. A 401 from a fetch that ran with another session's
    ///   token is retried once with this session's token.
    /// - `Upstream` when the admin API reports no data
    /// - `UpstreamTimeout` when the fetch outlives the fetch timeout
    #[instrument(skip_all, name = "hrm.services.lookups.items", fields(param_type = %query.param_type))]
    pub async fn items(
        &self,
        session: &SessionGuard,
        query: LookupQuery,
    ) -> Result<Arc<Vec<LookupItem>>, HrmError> {
        let authorization = SecretString::from(session.require_authorization_header()?);
        let key = query.cache_key();

        let mut retried = false;
        loop {
            let admin = self.admin.clone();
            let owner = authorization.clone();
            let attempt = query.clone();
            let failure = match self
                .cache
                .get_or_fetch_as(&key, &authorization, move || fetch(admin, owner, attempt))
                .await
            {
                Ok(items) => return Ok(items),
                Err(failure) => failure,
            };

            if failure.same_owner {
                return Err(session.observe(failure.error));
            }
            if retried || !matches!(failure.error, HrmError::Unauthorized(_)) {
                return Err(failure.error);
            }
            debug!(target: "hrm.cache.lookups", key = %key, "Joined fetch was rejected for another session, retrying");
            retried = true;
        }
    }
}

async fn fetch(
    admin: AdminClient,
    authorization: SecretString,
    query: LookupQuery,
) -> Result<Vec<LookupItem>, HrmError> {
    let body = serde_json::to_value(&query)
        .map_err(|e| HrmError::Internal(format!("Failed to encode lookup query: {e}")))?;
    let response = admin
        .send("lookups", Method::POST, LOOKUP_ENDPOINT, Some(authorization.expose_secret()), Some(&body))
        .await?;

    let items = lookup_items(response)?;
    debug!(target: "hrm.cache.lookups", param_type = %query.param_type, count = items.len(), "Lookup list fetched");
    Ok(items)
}

/// Items of a combobox response; requires `success` and an `entity`.
fn lookup_items(response: AdminResponse) -> Result<Vec<LookupItem>, HrmError> {
    let status = response.status.as_u16();
    let body = response.into_result()?;

    let success = body.get("success").and_then(Value::as_bool) == Some(true);
    match body.get("entity") {
        Some(entity) if success && !entity.is_null() => serde_json::from_value(entity.clone())
            .map_err(|e| HrmError::Internal(format!("Invalid lookup list: {e}"))),
        _ => Err(HrmError::Upstream {
            status,
            message: body
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(NO_DATA_MESSAGE)
                .to_string(),
        }),
    }
}
