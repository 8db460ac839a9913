use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::styling::rater::Rating;

/// Garment category. Unknown labels are kept verbatim so they round-trip
/// through the store and still render in outfit descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemCategory {
    Top,
    Bottom,
    Dress,
    Shoes,
    Accessories,
    Outerwear,
    Other(String),
}

impl ItemCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ItemCategory::Top => "top",
            ItemCategory::Bottom => "bottom",
            ItemCategory::Dress => "dress",
            ItemCategory::Shoes => "shoes",
            ItemCategory::Accessories => "accessories",
            ItemCategory::Outerwear => "outerwear",
            ItemCategory::Other(label) => label,
        }
    }
}

impl From<String> for ItemCategory {
    fn from(label: String) -> Self {
        match label.as_str() {
            "top" => ItemCategory::Top,
            "bottom" => ItemCategory::Bottom,
            "dress" => ItemCategory::Dress,
            "shoes" => ItemCategory::Shoes,
            "accessories" => ItemCategory::Accessories,
            "outerwear" => ItemCategory::Outerwear,
            _ => ItemCategory::Other(label),
        }
    }
}

impl From<&str> for ItemCategory {
    fn from(label: &str) -> Self {
        ItemCategory::from(label.to_string())
    }
}

impl From<ItemCategory> for String {
    fn from(category: ItemCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalogued garment. `id` is `count(existing) + 1` at append time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardrobeItem {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    pub item_type: ItemCategory,
    pub color: String,
    pub style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(alias = "added_at", deserialize_with = "deserialize_timestamp")]
    pub uploaded_at: DateTime<Utc>,
}

/// Fields supplied by the caller when adding an item; the store assigns the
/// id and timestamp.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub filename: Option<String>,
    pub filepath: Option<String>,
    pub item_type: ItemCategory,
    pub color: String,
    pub style: String,
    pub description: Option<String>,
}

impl NewItem {
    pub fn new(item_type: impl Into<ItemCategory>, color: &str, style: &str) -> Self {
        Self {
            filename: None,
            filepath: None,
            item_type: item_type.into(),
            color: color.to_string(),
            style: style.to_string(),
            description: None,
        }
    }
}

/// A rated outfit photo, kept as history. Append-only, no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitRating {
    pub filename: String,
    pub theme: String,
    pub occasion: String,
    #[serde(default)]
    pub description: String,
    pub rating: Rating,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub rated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRating {
    pub filename: String,
    pub theme: String,
    pub occasion: String,
    pub description: String,
    pub rating: Rating,
}

/// Accepts RFC 3339, or a timestamp without offset (read as local time) as
/// found in older wardrobe files.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(at.with_timezone(&Utc));
    }
    let naive = raw
        .parse::<NaiveDateTime>()
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{raw}': {e}")))?;
    Ok(naive
        .and_local_timezone(Local)
        .earliest()
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrips_unknown_labels() {
        let cat: ItemCategory = serde_json::from_str("\"scarf\"").unwrap();
        assert_eq!(cat, ItemCategory::Other("scarf".to_string()));
        assert_eq!(serde_json::to_string(&cat).unwrap(), "\"scarf\"");
    }

    #[test]
    fn test_category_known_labels() {
        assert_eq!(ItemCategory::from("dress"), ItemCategory::Dress);
        assert_eq!(ItemCategory::from("Top"), ItemCategory::Other("Top".to_string()));
        assert_eq!(ItemCategory::Accessories.to_string(), "accessories");
    }

    #[test]
    fn test_item_without_image_omits_file_fields() {
        let item = WardrobeItem {
            id: 1,
            filename: None,
            filepath: None,
            item_type: ItemCategory::Shoes,
            color: "white".to_string(),
            style: "casual".to_string(),
            description: None,
            uploaded_at: Utc::now(),
        };
        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("filename").is_none());
        assert!(value.get("description").is_none());
        assert_eq!(value["item_type"], "shoes");
    }

    #[test]
    fn test_item_accepts_added_at() {
        let json = r#"{"id": 4, "item_type": "top", "color": "red", "style": "edgy",
                       "added_at": "2024-05-01T10:00:00Z"}"#;
        let item: WardrobeItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 4);
        assert_eq!(item.item_type, ItemCategory::Top);
    }

    #[test]
    fn test_item_accepts_timestamp_without_offset() {
        let json = r#"{"id": 1, "item_type": "top", "color": "red", "style": "edgy",
                       "description": "", "added_at": "2024-05-01T10:00:00.123456"}"#;
        let item: WardrobeItem = serde_json::from_str(json).unwrap();

        let expected: NaiveDateTime = "2024-05-01T10:00:00.123456".parse().unwrap();
        assert_eq!(item.uploaded_at.with_timezone(&Local).naive_local(), expected);
        assert_eq!(item.description.as_deref(), Some(""));
    }

    #[test]
    fn test_rating_accepts_timestamp_without_offset() {
        let rating = crate::styling::rater::rate("casual", "daily", "");
        let json = serde_json::json!({
            "filename": "outfit_20240501_100000_look.jpg",
            "theme": "casual",
            "occasion": "daily",
            "description": "",
            "rating": rating.clone(),
            "rated_at": "2024-05-01T10:00:00.5",
        });
        let stored: OutfitRating = serde_json::from_value(json).unwrap();
        assert_eq!(stored.rating, rating);
    }

    #[test]
    fn test_garbage_timestamp_is_rejected() {
        let json = r#"{"id": 1, "item_type": "top", "color": "red", "style": "edgy",
                       "added_at": "yesterday"}"#;
        assert!(serde_json::from_str::<WardrobeItem>(json).is_err());
    }
}
