use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const PRODUCT_NAME_FALLBACK: &str = "Product Name";
pub const PRICE_FALLBACK: &str = "N/A";
pub const DESCRIPTION_FALLBACK: &str = "No description available";

/// Number of features shown on a collapsed card
pub const COMPACT_FEATURE_LIMIT: usize = 4;

/// One catalog item as surfaced by the agent.
///
/// Nothing about a product is guaranteed: every field may be missing or carry
/// the wrong type. Wrong-typed fields are read as absent, and the `display_*`
/// accessors substitute the documented fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
}

impl Product {
    /// Read a product out of an arbitrary JSON value.
    ///
    /// Never fails: a non-object value yields a product with every field absent.
    pub fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return Self::default();
        };

        Self {
            product_name: text_field(fields, "productName"),
            price: text_field(fields, "price"),
            description: text_field(fields, "description"),
            features: list_field(fields, "features"),
            image_url: text_field(fields, "imageUrl"),
            category: text_field(fields, "category"),
            pros: list_field(fields, "pros"),
            cons: list_field(fields, "cons"),
        }
    }

    pub fn display_name(&self) -> &str {
        non_empty(self.product_name.as_deref()).unwrap_or(PRODUCT_NAME_FALLBACK)
    }

    pub fn display_price(&self) -> &str {
        non_empty(self.price.as_deref()).unwrap_or(PRICE_FALLBACK)
    }

    pub fn display_description(&self) -> &str {
        non_empty(self.description.as_deref()).unwrap_or(DESCRIPTION_FALLBACK)
    }

    /// Category badge text, `None` when no badge should be shown
    pub fn category_badge(&self) -> Option<&str> {
        non_empty(self.category.as_deref())
    }

    /// Image URL supplied by the agent, if it supplied a usable one
    pub fn image_url(&self) -> Option<&str> {
        non_empty(self.image_url.as_deref())
    }

    /// Name used to key the placeholder image, if the product has one
    pub fn name(&self) -> Option<&str> {
        non_empty(self.product_name.as_deref())
    }

    /// Features for the collapsed card. The full list stays in `features`.
    pub fn compact_features(&self) -> &[String] {
        let end = self.features.len().min(COMPACT_FEATURE_LIMIT);
        &self.features[..end]
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Strings pass through, numbers and booleans are rendered as text,
/// anything else counts as absent.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(scalar_text)
}

fn list_field(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(scalar_text).collect())
        .unwrap_or_default()
}
