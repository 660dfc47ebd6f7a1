use crate::action::{CnftPreview, ParentNftPatch};
use crate::state::NftForm;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 生成するメタデータ JSON（アップロード用）
#[derive(Debug, Serialize, Deserialize)]
pub struct NftMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
    pub external_url: String,
    pub seller_fee_basis_points: u16,
    pub attributes: Vec<Attribute>,
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub address: String,
    #[serde(default)]
    pub share: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Properties {
    pub files: Vec<MetadataFile>,
    pub creators: Vec<Creator>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetadataFile {
    pub uri: String,
    #[serde(rename = "type")]
    pub file_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub family: String,
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("HTTP error! status: {status}. Details: {body}")]
    Http { status: u16, body: String },
    #[error("Invalid URL: The URL points to an image, not a JSON metadata file.")]
    PointsToImage,
    #[error("Invalid response: The server did not return a JSON file.")]
    NotJson,
    #[error("metadata JSON could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Metadata is missing required fields (image, name, symbol).")]
    MissingFields,
}

/// ロイヤリティ (%) をベーシスポイントに変換
pub fn basis_points(percent: f64) -> u16 {
    (percent.clamp(0.0, 100.0) * 100.0).round() as u16
}

impl NftMetadata {
    /// フォームの内容からメタデータを構築
    pub fn from_form(form: &NftForm) -> Self {
        let collection = form.is_collection.then(|| CollectionInfo {
            name: form.name.clone(),
            family: form.symbol.clone(),
        });

        NftMetadata {
            name: form.name.clone(),
            symbol: form.symbol.clone(),
            description: form.description.clone(),
            image: form.image_url.clone(),
            external_url: form.external_url.clone(),
            seller_fee_basis_points: basis_points(form.seller_fee),
            attributes: form.attributes.clone(),
            properties: Properties {
                files: vec![MetadataFile {
                    uri: form.image_url.clone(),
                    file_type: "image/png".to_string(),
                }],
                creators: form.creators.clone(),
            },
            collection,
        }
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// 既存メタデータを取得したときの緩いスキーマ。型の合わない項目は未指定扱い
#[derive(Debug, Default, Deserialize)]
pub struct FetchedMetadata {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub external_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub seller_fee_basis_points: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_mutable: Option<bool>,
    #[serde(default, deserialize_with = "lenient_attributes")]
    pub attributes: Option<Vec<Attribute>>,
    #[serde(default, deserialize_with = "lenient")]
    pub properties: Option<FetchedProperties>,
    #[serde(default)]
    pub collection: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FetchedProperties {
    #[serde(default, deserialize_with = "lenient_creators")]
    pub creators: Option<Vec<Creator>>,
}

/// Content-Type を確認して本文をメタデータとして読む
pub fn parse_response(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> Result<FetchedMetadata, MetadataError> {
    if !(200..300).contains(&status) {
        return Err(MetadataError::Http {
            status,
            body: body.to_string(),
        });
    }
    match content_type {
        Some(ct) if ct.contains("application/json") => {}
        Some(ct) if ct.starts_with("image/") => return Err(MetadataError::PointsToImage),
        _ => return Err(MetadataError::NotJson),
    }
    Ok(serde_json::from_str(body)?)
}

impl FetchedMetadata {
    pub fn is_collection(&self) -> bool {
        !matches!(
            self.collection,
            None | Some(Value::Null) | Some(Value::Bool(false))
        )
    }

    /// 親 NFT フォームへ一括反映する差分
    pub fn to_form_patch(&self) -> ParentNftPatch {
        ParentNftPatch {
            name: Some(self.name.clone().unwrap_or_default()),
            symbol: Some(self.symbol.clone().unwrap_or_default()),
            description: Some(self.description.clone().unwrap_or_default()),
            image_url: Some(self.image.clone().unwrap_or_default()),
            external_url: Some(self.external_url.clone().unwrap_or_default()),
            seller_fee: Some(self.seller_fee_basis_points.unwrap_or(0.0) / 100.0),
            is_mutable: Some(self.is_mutable.unwrap_or(true)),
            attributes: Some(self.attributes.clone().unwrap_or_default()),
            creators: Some(
                self.properties
                    .as_ref()
                    .and_then(|p| p.creators.clone())
                    .unwrap_or_default(),
            ),
            is_collection: Some(self.is_collection()),
            ..ParentNftPatch::default()
        }
    }

    /// cNFT プレビューには image / name / symbol が必須
    pub fn preview(&self) -> Result<CnftPreview, MetadataError> {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        match (
            non_empty(&self.image),
            non_empty(&self.name),
            non_empty(&self.symbol),
        ) {
            (Some(image_url), Some(name), Some(symbol)) => Ok(CnftPreview {
                image_url,
                name,
                symbol,
            }),
            _ => Err(MetadataError::MissingFields),
        }
    }
}

fn scalar_to_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(String::new()),
        other => scalar_text(&other).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "attribute value must be a scalar, got {}",
                other
            ))
        }),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 期待した型でなければ None
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// 数値か数値として読める文字列
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// trait_type や value が欠けていても空文字で埋める
fn lenient_attributes<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<Attribute>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(None);
    };
    let field = |item: &Value, key: &str| item.get(key).and_then(scalar_text).unwrap_or_default();
    Ok(Some(
        items
            .iter()
            .filter(|item| item.is_object())
            .map(|item| Attribute {
                trait_type: field(item, "trait_type"),
                value: field(item, "value"),
            })
            .collect(),
    ))
}

/// address が文字列でない creator は捨てる。share は 0..=100 に丸める
fn lenient_creators<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<Creator>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(None);
    };
    Ok(Some(
        items
            .iter()
            .filter_map(|item| {
                let address = item.get("address")?.as_str()?.to_string();
                let share = match item.get("share") {
                    Some(Value::Number(n)) => n.as_f64(),
                    Some(Value::String(s)) => s.trim().parse().ok(),
                    _ => None,
                }
                .unwrap_or(0.0)
                .clamp(0.0, 100.0)
                .round() as u8;
                Some(Creator { address, share })
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection_form() -> NftForm {
        NftForm {
            name: "Sand Dunes".to_string(),
            symbol: "DUNE".to_string(),
            image_url: "https://arweave.net/img".to_string(),
            seller_fee: 5.5,
            creators: vec![Creator {
                address: "11111111111111111111111111111111".to_string(),
                share: 100,
            }],
            ..NftForm::default()
        }
    }

    #[test]
    fn generated_metadata_has_collection_block() {
        let meta = NftMetadata::from_form(&collection_form());
        assert_eq!(meta.seller_fee_basis_points, 550);
        let json: serde_json::Value =
            serde_json::from_str(&meta.to_pretty_json().unwrap()).unwrap();
        assert_eq!(json["collection"]["name"], "Sand Dunes");
        assert_eq!(json["collection"]["family"], "DUNE");
        assert_eq!(json["properties"]["files"][0]["uri"], "https://arweave.net/img");
        assert_eq!(json["properties"]["files"][0]["type"], "image/png");
        assert_eq!(json["properties"]["creators"][0]["share"], 100);
    }

    #[test]
    fn generated_metadata_omits_collection_for_plain_nft() {
        let form = NftForm {
            is_collection: false,
            attributes: vec![Attribute {
                trait_type: "type".to_string(),
                value: "rare".to_string(),
            }],
            ..collection_form()
        };
        let json: serde_json::Value =
            serde_json::from_str(&NftMetadata::from_form(&form).to_pretty_json().unwrap())
                .unwrap();
        assert!(json.get("collection").is_none());
        assert_eq!(json["attributes"][0]["value"], "rare");
    }

    #[test]
    fn rejects_non_json_responses() {
        assert!(matches!(
            parse_response(200, Some("image/png"), ""),
            Err(MetadataError::PointsToImage)
        ));
        assert!(matches!(
            parse_response(200, Some("text/html"), "<html>"),
            Err(MetadataError::NotJson)
        ));
        assert!(matches!(
            parse_response(200, None, "{}"),
            Err(MetadataError::NotJson)
        ));
        assert!(matches!(
            parse_response(404, Some("application/json"), "missing"),
            Err(MetadataError::Http { status: 404, .. })
        ));
        assert!(matches!(
            parse_response(200, Some("application/json; charset=utf-8"), "not json"),
            Err(MetadataError::Parse(_))
        ));
    }

    #[test]
    fn maps_fetched_metadata_onto_form_patch() {
        let body = r#"{
            "name": "Dune #1",
            "symbol": "DUNE",
            "description": "first",
            "image": "https://arweave.net/1.png",
            "seller_fee_basis_points": 250,
            "attributes": [{"trait_type": "level", "value": 3}],
            "properties": {"creators": [{"address": "abc", "share": 100}]}
        }"#;
        let meta = parse_response(200, Some("application/json"), body).unwrap();
        let patch = meta.to_form_patch();
        assert_eq!(patch.name.as_deref(), Some("Dune #1"));
        assert_eq!(patch.image_url.as_deref(), Some("https://arweave.net/1.png"));
        assert_eq!(patch.external_url.as_deref(), Some(""));
        assert_eq!(patch.seller_fee, Some(2.5));
        assert_eq!(patch.is_mutable, Some(true));
        assert_eq!(patch.is_collection, Some(false));
        assert_eq!(patch.attributes.as_ref().unwrap()[0].value, "3");
        assert_eq!(patch.creators.as_ref().unwrap()[0].address, "abc");
        assert!(patch.address.is_none());
    }

    #[test]
    fn preview_requires_image_name_and_symbol() {
        let meta: FetchedMetadata =
            serde_json::from_str(r#"{"name": "a", "symbol": "b", "image": "c"}"#).unwrap();
        let preview = meta.preview().unwrap();
        assert_eq!(preview.image_url, "c");

        let meta: FetchedMetadata =
            serde_json::from_str(r#"{"name": "a", "image": "c"}"#).unwrap();
        assert!(matches!(meta.preview(), Err(MetadataError::MissingFields)));

        let meta: FetchedMetadata =
            serde_json::from_str(r#"{"name": "a", "symbol": "", "image": "c"}"#).unwrap();
        assert!(matches!(meta.preview(), Err(MetadataError::MissingFields)));
    }

    #[test]
    fn collection_presence_marks_collection() {
        let meta: FetchedMetadata =
            serde_json::from_str(r#"{"collection": {"name": "x", "family": "y"}}"#).unwrap();
        assert!(meta.is_collection());
        let meta: FetchedMetadata = serde_json::from_str(r#"{"collection": null}"#).unwrap();
        assert!(!meta.is_collection());
    }

    #[test]
    fn tolerates_malformed_optional_fields() {
        let body = r#"{
            "name": "Leaf",
            "symbol": "LF",
            "image": "https://arweave.net/l.png",
            "seller_fee_basis_points": "500",
            "is_mutable": "yes",
            "attributes": [{"value": "gold"}, "junk", {"trait_type": "tier", "value": null}],
            "properties": {"creators": [{"address": "abc", "share": "40"}, {"share": 60}, {"address": "def", "share": 250.7}]}
        }"#;
        let meta = parse_response(200, Some("application/json"), body).unwrap();
        assert_eq!(meta.preview().unwrap().name, "Leaf");

        let patch = meta.to_form_patch();
        assert_eq!(patch.seller_fee, Some(5.0));
        assert_eq!(patch.is_mutable, Some(true));
        assert_eq!(
            patch.attributes.unwrap(),
            vec![
                Attribute {
                    trait_type: String::new(),
                    value: "gold".to_string(),
                },
                Attribute {
                    trait_type: "tier".to_string(),
                    value: String::new(),
                },
            ]
        );
        assert_eq!(
            patch.creators.unwrap(),
            vec![
                Creator {
                    address: "abc".to_string(),
                    share: 40,
                },
                Creator {
                    address: "def".to_string(),
                    share: 100,
                },
            ]
        );
    }

    #[test]
    fn wrong_typed_containers_fall_back_to_defaults() {
        let meta: FetchedMetadata = serde_json::from_str(
            r#"{"name": 7, "symbol": "S", "image": "i", "attributes": {"a": 1}, "properties": [], "seller_fee_basis_points": true}"#,
        )
        .unwrap();
        assert!(matches!(meta.preview(), Err(MetadataError::MissingFields)));
        let patch = meta.to_form_patch();
        assert_eq!(patch.name.as_deref(), Some(""));
        assert_eq!(patch.seller_fee, Some(0.0));
        assert_eq!(patch.attributes, Some(Vec::new()));
        assert_eq!(patch.creators, Some(Vec::new()));
    }
}
