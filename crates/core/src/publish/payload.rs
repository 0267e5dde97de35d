//! Request payloads and field transforms for the create pipeline

use adpublish_domain::constants::{
    CREATE_STATUS, DAILY_BUDGET_CONFIG_KEY, DAILY_BUDGET_PLATFORM_KEY, MINOR_UNITS_PER_MAJOR,
};
use adpublish_domain::{JsonObject, PlatformError, PublishError, RemoteStatus, Result};
use serde_json::Value;

/// Normalize an ad account id to carry `prefix` exactly once.
///
/// # Errors
/// Returns [`PublishError::Connection`] when nothing is left after stripping
/// the prefix.
pub fn normalize_account_id(raw: &str, prefix: &str) -> Result<String> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix(prefix).unwrap_or(trimmed);
    if bare.is_empty() {
        return Err(PublishError::Connection("ad account id is empty".into()));
    }
    Ok(format!("{prefix}{bare}"))
}

pub fn campaigns_path(account: &str) -> String {
    format!("{account}/campaigns")
}

pub fn adsets_path(account: &str) -> String {
    format!("{account}/adsets")
}

pub fn ads_path(account: &str) -> String {
    format!("{account}/ads")
}

/// Campaign config with the create status forced.
pub fn campaign_payload(config: &JsonObject) -> JsonObject {
    let mut payload = config.clone();
    force_create_status(&mut payload);
    payload
}

/// Ad set config with the create status forced and the budget converted to
/// integer minor units.
///
/// # Errors
/// Returns [`PublishError::Configuration`] when `dailyBudget` is present but
/// not a number.
pub fn adset_payload(config: &JsonObject) -> Result<JsonObject> {
    let mut payload = config.clone();
    if let Some(budget) = payload.remove(DAILY_BUDGET_CONFIG_KEY) {
        payload.insert(DAILY_BUDGET_PLATFORM_KEY.to_string(), to_minor_units(&budget)?);
    }
    force_create_status(&mut payload);
    Ok(payload)
}

pub fn ad_payload(config: &JsonObject) -> JsonObject {
    let mut payload = config.clone();
    force_create_status(&mut payload);
    payload
}

/// Attach the id of the parent object (`campaign_id` on ad sets,
/// `adset_id` on ads).
pub fn with_parent(payload: &JsonObject, key: &str, parent_id: &str) -> JsonObject {
    let mut payload = payload.clone();
    payload.insert(key.to_string(), Value::String(parent_id.to_string()));
    payload
}

/// Body for a status update on an existing object.
pub fn status_payload(target: RemoteStatus) -> JsonObject {
    let mut payload = JsonObject::new();
    payload.insert("status".to_string(), Value::String(target.as_str().to_string()));
    payload
}

/// Pull the created object's id out of a platform response.
///
/// # Errors
/// Returns [`PublishError::ExternalApi`] when the response has no usable id.
pub fn extract_id(body: &JsonObject, object: &str) -> Result<String> {
    match body.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(PlatformError::malformed(format!("{object} response has no id")).into()),
    }
}

fn force_create_status(payload: &mut JsonObject) {
    payload.insert("status".to_string(), Value::String(CREATE_STATUS.to_string()));
}

fn to_minor_units(budget: &Value) -> Result<Value> {
    let major = budget.as_f64().ok_or_else(|| {
        PublishError::Configuration(format!("{DAILY_BUDGET_CONFIG_KEY} must be a number"))
    })?;
    #[allow(clippy::cast_possible_truncation)]
    let minor = (major * MINOR_UNITS_PER_MAJOR).round() as i64;
    Ok(Value::from(minor))
}
