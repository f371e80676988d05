//! Inbound webhook payload types.
//!
//! These are deliberately lenient: source platforms send external ids as
//! numbers or strings, money as decimal strings, and omit most fields at
//! will. Absent scalars default rather than failing the event; only a body
//! that is not the expected JSON shape at all is rejected.

pub mod money;
pub mod tags;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use tags::Tags;

/// The webhook types accepted by the ingestion routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    CustomerCreate,
    CustomerUpdate,
    OrderCreate,
    ProductCreate,
    CartCreate,
    CheckoutCreate,
    Test,
}

impl EventKind {
    /// Stable identifier stored in `webhook_logs.webhook_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerCreate => "customer_create",
            Self::CustomerUpdate => "customer_update",
            Self::OrderCreate => "order_create",
            Self::ProductCreate => "product_create",
            Self::CartCreate => "cart_create",
            Self::CheckoutCreate => "checkout_create",
            Self::Test => "test",
        }
    }
}

/// Deserializes an external id that may arrive as a JSON number or string.
fn external_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected id as number or string, got {other}"
        ))),
    }
}

fn optional_external_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected id as number or string, got {other}"
        ))),
    }
}

fn count_from_json(value: &Value) -> i32 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0) as i32,
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Deserializes a count field that may arrive as a number or a numeric
/// string. Absent or unparseable input yields 0.
fn lenient_count<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(count_from_json).unwrap_or(0))
}

/// Like [`lenient_count`] but keeps absence observable.
fn optional_lenient_count<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(v) => Ok(Some(count_from_json(&v))),
    }
}

/// Parses a source-platform timestamp, tolerating absence and garbage.
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}

/// Embedded customer reference carried on order, cart and checkout payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRef {
    #[serde(deserialize_with = "external_id")]
    pub id: String,
}

/// Customer payload. Mutable fields are optional so the dedicated update
/// event can distinguish "absent" (leave unchanged) from "present".
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerPayload {
    #[serde(deserialize_with = "external_id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "money::deserialize_optional_cents")]
    pub total_spent: Option<i64>,
    #[serde(default, deserialize_with = "optional_lenient_count")]
    pub orders_count: Option<i32>,
    #[serde(default)]
    pub accepts_marketing: Option<bool>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub tags: Option<Tags>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineItemPayload {
    #[serde(default, deserialize_with = "optional_external_id")]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "optional_external_id")]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub quantity: i32,
    #[serde(default, deserialize_with = "money::deserialize_cents")]
    pub price: i64,
    #[serde(default, deserialize_with = "money::deserialize_cents")]
    pub total_discount: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderPayload {
    #[serde(deserialize_with = "external_id")]
    pub id: String,
    #[serde(default, deserialize_with = "optional_external_id")]
    pub order_number: Option<String>,
    /// Display name like "#1001", used when order_number is absent.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "money::deserialize_cents")]
    pub total_price: i64,
    #[serde(default, deserialize_with = "money::deserialize_cents")]
    pub subtotal_price: i64,
    #[serde(default, deserialize_with = "money::deserialize_cents")]
    pub total_tax: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub financial_status: Option<String>,
    #[serde(default)]
    pub fulfillment_status: Option<String>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub line_items: Vec<LineItemPayload>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl OrderPayload {
    /// Order number falls back to the display name when absent.
    pub fn order_number_or_name(&self) -> Option<String> {
        self.order_number.clone().or_else(|| self.name.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantPayload {
    #[serde(default, deserialize_with = "money::deserialize_cents")]
    pub price: i64,
    #[serde(default, deserialize_with = "money::deserialize_cents")]
    pub compare_at_price: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub inventory_quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductPayload {
    #[serde(deserialize_with = "external_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Tags,
    /// Price and inventory fields come from the first variant.
    #[serde(default)]
    pub variants: Vec<VariantPayload>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartPayload {
    #[serde(deserialize_with = "external_id")]
    pub id: String,
    #[serde(default, deserialize_with = "money::deserialize_cents")]
    pub total_price: i64,
    #[serde(default)]
    pub line_items: Vec<Value>,
    #[serde(default)]
    pub abandoned_checkout_url: Option<String>,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutPayload {
    #[serde(deserialize_with = "external_id")]
    pub id: String,
    #[serde(default, deserialize_with = "money::deserialize_cents")]
    pub total_price: i64,
    #[serde(default)]
    pub line_items: Vec<Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Structured `event_data` stored for abandoned carts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartEventData {
    pub cart_id: String,
    pub total_price_cents: i64,
    pub line_items_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abandoned_checkout_url: Option<String>,
}

impl From<&CartPayload> for CartEventData {
    fn from(cart: &CartPayload) -> Self {
        Self {
            cart_id: cart.id.clone(),
            total_price_cents: cart.total_price,
            line_items_count: cart.line_items.len(),
            abandoned_checkout_url: cart.abandoned_checkout_url.clone(),
        }
    }
}

/// Structured `event_data` stored for started checkouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutEventData {
    pub checkout_id: String,
    pub total_price_cents: i64,
    pub line_items_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&CheckoutPayload> for CheckoutEventData {
    fn from(checkout: &CheckoutPayload) -> Self {
        Self {
            checkout_id: checkout.id.clone(),
            total_price_cents: checkout.total_price,
            line_items_count: checkout.line_items.len(),
            email: checkout.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_customer_payload_numeric_id() {
        let payload: CustomerPayload = serde_json::from_value(json!({
            "id": 12345,
            "email": "ada@example.com",
            "total_spent": "150.75",
            "orders_count": 3
        }))
        .unwrap();
        assert_eq!(payload.id, "12345");
        assert_eq!(payload.total_spent, Some(15075));
        assert_eq!(payload.orders_count, Some(3));
        assert!(payload.first_name.is_none());
    }

    #[test]
    fn test_order_payload_defaults() {
        let payload: OrderPayload = serde_json::from_value(json!({
            "id": "900",
            "name": "#1001",
            "total_price": ""
        }))
        .unwrap();
        assert_eq!(payload.total_price, 0);
        assert_eq!(payload.order_number_or_name().as_deref(), Some("#1001"));
        assert!(payload.line_items.is_empty());
        assert!(payload.customer.is_none());
    }

    #[test]
    fn test_line_item_numeric_references() {
        let item: LineItemPayload = serde_json::from_value(json!({
            "product_id": 42,
            "variant_id": "v-1",
            "quantity": 2,
            "price": "9.99"
        }))
        .unwrap();
        assert_eq!(item.product_id.as_deref(), Some("42"));
        assert_eq!(item.variant_id.as_deref(), Some("v-1"));
        assert_eq!(item.price, 999);
    }

    #[test]
    fn test_string_typed_counts_accepted() {
        let item: LineItemPayload = serde_json::from_value(json!({
            "quantity": "2",
            "price": "9.99"
        }))
        .unwrap();
        assert_eq!(item.quantity, 2);

        let customer: CustomerPayload = serde_json::from_value(json!({
            "id": 1,
            "orders_count": "3"
        }))
        .unwrap();
        assert_eq!(customer.orders_count, Some(3));

        let variant: VariantPayload = serde_json::from_value(json!({
            "inventory_quantity": "12"
        }))
        .unwrap();
        assert_eq!(variant.inventory_quantity, 12);

        let garbage: LineItemPayload =
            serde_json::from_value(json!({ "quantity": "lots" })).unwrap();
        assert_eq!(garbage.quantity, 0);
    }

    #[test]
    fn test_parse_timestamp_lenient() {
        assert!(parse_timestamp(Some("2025-06-01T12:00:00Z")).is_some());
        assert!(parse_timestamp(Some("not a date")).is_none());
        assert!(parse_timestamp(None).is_none());
    }

    #[test]
    fn test_cart_event_data() {
        let cart: CartPayload = serde_json::from_value(json!({
            "id": 7,
            "total_price": "25.00",
            "line_items": [{}, {}],
            "abandoned_checkout_url": "https://shop.example/recover/7"
        }))
        .unwrap();
        let data = CartEventData::from(&cart);
        assert_eq!(data.cart_id, "7");
        assert_eq!(data.total_price_cents, 2500);
        assert_eq!(data.line_items_count, 2);
    }
}
