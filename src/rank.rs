//! HTTP client for the ranking endpoint.
//!
//! Builds one canned request, POSTs it to `{base_url}/api/v1/rank`, and
//! prints the exchange. The request body is JSON with a twist: the
//! `features` field is itself a JSON document, serialized to a string and
//! embedded in the outer object.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::config::RANK_ENDPOINT_PATH;

/// Numeric type codes for feature vectors inside the features blob.
///
/// The service's feature toolkit distinguishes six kinds; the canned
/// request uses only the two list kinds it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureCode {
    /// 64-bit integer scalar.
    Int64 = 0,
    /// 32-bit float scalar.
    Float32 = 1,
    /// UTF-8 string scalar.
    Str = 2,
    /// List of 64-bit integers.
    Int64List = 3,
    /// List of 32-bit floats.
    Float32List = 4,
    /// List of UTF-8 strings.
    StrList = 5,
}

impl Serialize for FeatureCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Values a feature column can carry in the blob.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FeatureValues {
    /// 32-bit float vector.
    Floats(Vec<f32>),
    /// String vector.
    Strings(Vec<String>),
}

/// A named feature vector in the blob, tagged with its type code.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureColumn {
    /// Type code, serialized under the `type` key.
    #[serde(rename = "type")]
    pub code: FeatureCode,
    /// The vector itself.
    pub value: FeatureValues,
}

impl FeatureColumn {
    /// Float-list column (type code 4).
    pub fn floats(values: Vec<f32>) -> Self {
        Self {
            code: FeatureCode::Float32List,
            value: FeatureValues::Floats(values),
        }
    }

    /// String-list column (type code 5).
    pub fn strings(values: Vec<String>) -> Self {
        Self {
            code: FeatureCode::StrList,
            value: FeatureValues::Strings(values),
        }
    }
}

/// One candidate item submitted for ranking. The service imposes no
/// uniqueness on identifiers; duplicates are legal.
#[derive(Debug, Clone, Serialize)]
pub struct RankEntry {
    /// Item identifier.
    pub id: String,
}

/// The ranking request body.
#[derive(Debug, Clone, Serialize)]
pub struct RankRequest {
    /// User identifier.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// User feature columns as an embedded JSON string.
    pub features: String,
    /// Candidate items to rank.
    pub entries: Vec<RankEntry>,
}

fn serialize_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

/// Builds the canned smoke-test request: a fixed user, a blob with one
/// hundred click tokens and a five-float embedding, and four duplicate
/// candidate entries.
pub fn sample_request() -> RankRequest {
    let clicks: Vec<String> = (0..100).map(|i| format!("click-{i}")).collect();
    let mut columns = BTreeMap::new();
    columns.insert("u_r_click", FeatureColumn::strings(clicks));
    columns.insert("embedding", FeatureColumn::floats(vec![0.1, 0.2, 0.3, 0.4, 0.5]));

    RankRequest {
        user_id: "user_12345".to_string(),
        features: serialize_json(&columns),
        entries: vec![
            RankEntry {
                id: "item1".to_string(),
            };
            4
        ],
    }
}

/// Posts `request` to `{base_url}/api/v1/rank` and reports the exchange.
///
/// The request body, the response status and the parsed response body are
/// printed to stdout. Network-layer failures (connect, timeout, reading
/// the body) are logged and yield `Ok(None)`.
///
/// # Errors
///
/// Returns an error only when a response arrives whose body is not valid
/// JSON; that failure is not absorbed into the absent result.
pub async fn post_rank(
    client: &reqwest::Client,
    base_url: &str,
    request: &RankRequest,
) -> Result<Option<Value>> {
    let endpoint = format!("{base_url}{RANK_ENDPOINT_PATH}");

    let request_json =
        serde_json::to_string_pretty(request).context("Failed to serialize rank request")?;
    println!("request:");
    println!("{request_json}");

    debug!("POST {endpoint}");
    let response = match client.post(&endpoint).json(request).send().await {
        Ok(response) => response,
        Err(e) => {
            error!("Rank request to {endpoint} failed: {e}");
            return Ok(None);
        }
    };

    let status = response.status();
    println!("status: {status}");

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to read rank response body: {e}");
            return Ok(None);
        }
    };
    let value: Value = serde_json::from_str(&body)
        .with_context(|| format!("Rank response was not valid JSON: {body:.200}"))?;

    println!("response:");
    println!("{value:#}");

    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_codes_match_the_wire_contract() {
        assert_eq!(FeatureCode::Int64 as u8, 0);
        assert_eq!(FeatureCode::Float32 as u8, 1);
        assert_eq!(FeatureCode::Str as u8, 2);
        assert_eq!(FeatureCode::Int64List as u8, 3);
        assert_eq!(FeatureCode::Float32List as u8, 4);
        assert_eq!(FeatureCode::StrList as u8, 5);
    }

    #[test]
    fn test_columns_serialize_with_numeric_type_tags() {
        let column = FeatureColumn::floats(vec![0.5]);
        assert_eq!(
            serde_json::to_value(&column).unwrap(),
            json!({"type": 4, "value": [0.5]})
        );

        let column = FeatureColumn::strings(vec!["a".to_string()]);
        assert_eq!(
            serde_json::to_value(&column).unwrap(),
            json!({"type": 5, "value": ["a"]})
        );
    }

    #[test]
    fn test_sample_request_user_and_entries() {
        let request = sample_request();
        assert_eq!(request.user_id, "user_12345");
        assert_eq!(request.entries.len(), 4);
        assert!(request.entries.iter().all(|entry| entry.id == "item1"));
    }

    #[test]
    fn test_sample_request_features_blob_is_embedded_json() {
        let request = sample_request();
        let blob: Value = serde_json::from_str(&request.features).unwrap();
        assert_eq!(blob["u_r_click"]["type"], 5);
        assert_eq!(blob["u_r_click"]["value"].as_array().unwrap().len(), 100);
        assert_eq!(blob["u_r_click"]["value"][0], "click-0");
        assert_eq!(blob["embedding"]["type"], 4);
        assert_eq!(blob["embedding"]["value"].as_array().unwrap().len(), 5);
    }
}
