use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

use super::agent_response::AgentResponse;
use super::product::Product;

const PLACEHOLDER_BASE: &str = "https://placehold.co/400x225/10b981/ffffff?text=";
const PLACEHOLDER_LABEL_FALLBACK: &str = "Product";

/// Characters left unescaped by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Generated placeholder image keyed by product name
pub fn placeholder_image_url(product_name: Option<&str>) -> String {
    let label = product_name
        .filter(|name| !name.is_empty())
        .unwrap_or(PLACEHOLDER_LABEL_FALLBACK);
    format!(
        "{}{}",
        PLACEHOLDER_BASE,
        utf8_percent_encode(label, URI_COMPONENT)
    )
}

/// Image source for a product card.
///
/// Pure: the same inputs always give the same URL, so it is safe to call on
/// every render.
pub fn resolve_image_url(
    image_url: Option<&str>,
    product_name: Option<&str>,
    load_failed: bool,
) -> String {
    match image_url.filter(|url| !url.is_empty()) {
        Some(url) if !load_failed => url.to_string(),
        _ => placeholder_image_url(product_name),
    }
}

/// Per-card view state. Cards never affect each other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCard {
    product: Product,
    expanded: bool,
    image_failed: bool,
}

impl ProductCard {
    pub fn new(product: Product) -> Self {
        Self {
            product,
            expanded: false,
            image_failed: false,
        }
    }

    /// One collapsed card per recommendation, in reply order
    pub fn for_response(response: &AgentResponse) -> Vec<Self> {
        response
            .recommendations
            .iter()
            .cloned()
            .map(Self::new)
            .collect()
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }

    /// Record that the image at the product's URL failed to load
    pub fn mark_image_failed(&mut self) {
        self.image_failed = true;
    }

    pub fn image_src(&self) -> String {
        resolve_image_url(
            self.product.image_url(),
            self.product.name(),
            self.image_failed,
        )
    }

    pub fn alt_text(&self) -> &str {
        self.product.name().unwrap_or(PLACEHOLDER_LABEL_FALLBACK)
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.expanded {
            "Hide Details"
        } else {
            "View Details"
        }
    }

    /// Pros are part of the details section, hidden while collapsed
    pub fn visible_pros(&self) -> &[String] {
        if self.expanded { &self.product.pros[..] } else { &[] }
    }

    pub fn visible_cons(&self) -> &[String] {
        if self.expanded { &self.product.cons[..] } else { &[] }
    }
}
