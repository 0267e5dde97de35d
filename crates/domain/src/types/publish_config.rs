//! Publish configuration snapshot consumed by the create pipeline

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{PublishError, Result};

/// JSON object as stored in the publish config blob.
pub type JsonObject = Map<String, Value>;

/// Immutable snapshot `{campaign, adset, ads[]}` taken before each attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishConfig {
    pub campaign: JsonObject,
    pub adset: JsonObject,
    /// Non-empty; remote ads are created in this order.
    pub ads: Vec<JsonObject>,
}

impl PublishConfig {
    /// Validate a stored blob.
    ///
    /// # Errors
    /// Returns [`PublishError::Configuration`] when the campaign or adset
    /// object is missing, or when `ads` is absent, empty, or holds a
    /// non-object entry.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut root) = value else {
            return Err(PublishError::Configuration("publish config must be a JSON object".into()));
        };

        let campaign = take_object(&mut root, "campaign")?;
        let adset = take_object(&mut root, "adset")?;

        let ads = match root.remove("ads") {
            Some(Value::Array(items)) if !items.is_empty() => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(ad) => Ok(ad),
                    _ => Err(PublishError::Configuration(format!(
                        "ads[{index}] must be an object"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(Value::Array(_)) => {
                return Err(PublishError::Configuration("ads array must not be empty".into()))
            }
            _ => return Err(PublishError::Configuration("missing ads array".into())),
        };

        Ok(Self { campaign, adset, ads })
    }
}

fn take_object(root: &mut JsonObject, key: &str) -> Result<JsonObject> {
    match root.remove(key) {
        Some(Value::Object(object)) => Ok(object),
        Some(_) => Err(PublishError::Configuration(format!("{key} must be an object"))),
        None => Err(PublishError::Configuration(format!("missing {key} object"))),
    }
}
