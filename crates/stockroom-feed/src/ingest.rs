//! # Ingestion Boundary
//!
//! Turns raw collection documents (`serde_json::Value`) into the typed
//! records of stockroom-core.
//!
//! ## Coercion Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Document Field Coercion                              │
//! │                                                                         │
//! │  NUMBERS (stock, usage, quantity, ...)                                 │
//! │  ─────────────────────────────────────                                 │
//! │  • JSON number          → as is, decimals truncated for counts          │
//! │  • numeric string " 12" → 12                                            │
//! │  • true / false         → 1 / 0                                         │
//! │  • anything else, NaN   → 0                                             │
//! │                                                                         │
//! │  CURRENCY (price, cost, total, ...)                                    │
//! │  ──────────────────────────────────                                    │
//! │  • coerced as above, then rounded ONCE to centavos                     │
//! │                                                                         │
//! │  TIMESTAMPS (createdAt, lastUpdated)                                   │
//! │  ───────────────────────────────────                                   │
//! │  • {seconds, nanoseconds} or {_seconds, _nanoseconds}                  │
//! │  • RFC 3339 string                                                     │
//! │  • epoch milliseconds                                                  │
//! │  • anything else → None                                                │
//! │                                                                         │
//! │  TEXT FALLBACK CHAINS                                                  │
//! │  ────────────────────                                                  │
//! │  • empty strings count as absent and fall through to the next key      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A document that is not a JSON object, or has no id, cannot become a
//! record and yields [`FeedError::MalformedDocument`]. The `*_collection`
//! functions skip such documents with a warning so one bad document never
//! blanks the dashboard.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use stockroom_core::{
    ActivityEvent, InventoryItem, Money, MovementKind, Order, OrderLine, OrderStatus,
    StockMovement,
};

use crate::error::{FeedError, FeedResult};

/// Customer shown for orders without a name.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

/// Payment method assumed when none is stored.
pub const DEFAULT_PAYMENT_METHOD: &str = "Cash";

/// Line name shown when neither `name` nor `productName` is stored.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

const ACTOR_KEYS: [&str; 5] = [
    "processedByName",
    "processedBy",
    "userName",
    "createdByName",
    "createdBy",
];

// =============================================================================
// Field Coercion
// =============================================================================

/// Coerces a field to a finite number, zero when absent or non-numeric.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use stockroom_feed::ingest::coerce_number;
///
/// assert_eq!(coerce_number(Some(&json!(" 12.5 "))), 12.5);
/// assert_eq!(coerce_number(Some(&json!(true))), 1.0);
/// assert_eq!(coerce_number(Some(&json!("twelve"))), 0.0);
/// assert_eq!(coerce_number(None), 0.0);
/// ```
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Coerces a field to an integer count, truncating decimals.
pub fn coerce_int(value: Option<&Value>) -> i64 {
    // `as` truncates toward zero and saturates
    coerce_number(value) as i64
}

/// Coerces a field to money, rounding to the nearest centavo.
pub fn coerce_money(value: Option<&Value>) -> Money {
    Money::from_decimal(coerce_number(value))
}

/// Parses a stored timestamp, `None` when absent or unrecognised.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use stockroom_feed::ingest::parse_timestamp;
///
/// let firestore = json!({"seconds": 1_700_000_000, "nanoseconds": 0});
/// let iso = json!("2023-11-14T22:13:20Z");
/// let millis = json!(1_700_000_000_000_i64);
///
/// assert_eq!(parse_timestamp(Some(&firestore)), parse_timestamp(Some(&iso)));
/// assert_eq!(parse_timestamp(Some(&iso)), parse_timestamp(Some(&millis)));
/// assert_eq!(parse_timestamp(Some(&json!("yesterday"))), None);
/// ```
pub fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::Object(map) => {
            let seconds = map.get("seconds").or_else(|| map.get("_seconds"))?.as_i64()?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, nanos).single()
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_millis_opt(millis).single()
        }
        _ => None,
    }
}

/// Text of a field. Numbers are rendered; other types count as absent.
fn text(doc: &Map<String, Value>, key: &str) -> Option<String> {
    match doc.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First non-empty text among `keys`.
fn first_text(doc: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| text(doc, key))
        .find(|s| !s.is_empty())
}

/// A numeric field that is `None` when absent or null.
fn optional_int(doc: &Map<String, Value>, key: &str) -> Option<i64> {
    match doc.get(key) {
        None | Some(Value::Null) => None,
        value => Some(coerce_int(value)),
    }
}

fn optional_money(doc: &Map<String, Value>, key: &str) -> Option<Money> {
    match doc.get(key) {
        None | Some(Value::Null) => None,
        value => Some(coerce_money(value)),
    }
}

fn object<'a>(doc: &'a Value, collection: &str) -> FeedResult<&'a Map<String, Value>> {
    doc.as_object().ok_or_else(|| {
        FeedError::malformed(collection, format!("expected an object, got {}", kind_of(doc)))
    })
}

fn document_id(doc: &Map<String, Value>, collection: &str) -> FeedResult<String> {
    text(doc, "id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FeedError::malformed(collection, "missing document id"))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Record Ingestion
// =============================================================================

/// Builds an [`InventoryItem`] from an inventory document.
///
/// Negative stock levels and prices are clamped to zero.
pub fn ingest_item(doc: &Value) -> FeedResult<InventoryItem> {
    let doc = object(doc, "inventory")?;
    Ok(InventoryItem {
        id: document_id(doc, "inventory")?,
        name: text(doc, "name").unwrap_or_default(),
        product_code: text(doc, "productCode").unwrap_or_default(),
        category: text(doc, "category").filter(|c| !c.is_empty()),
        current_stock: coerce_int(doc.get("currentStock")).max(0),
        minimum_stock: coerce_int(doc.get("minimumStock")).max(0),
        reorder_point: optional_int(doc, "reorderPoint"),
        maximum_stock: optional_int(doc, "maximumStock"),
        price: coerce_money(doc.get("price")).max(Money::zero()),
        cost: optional_money(doc, "cost"),
        selling_price: optional_money(doc, "sellingPrice"),
        unit: text(doc, "unit").unwrap_or_default(),
        usage: optional_int(doc, "usage"),
        inventory_variance: optional_int(doc, "inventoryVariance"),
        last_updated: parse_timestamp(doc.get("lastUpdated")),
    })
}

/// Builds an [`Order`] from an order document, applying the display
/// fallbacks for customer, payment method and status.
pub fn ingest_order(doc: &Value) -> FeedResult<Order> {
    let doc = object(doc, "orders")?;

    let items = match doc.get("items") {
        Some(Value::Array(lines)) => lines.iter().filter_map(ingest_order_line).collect(),
        _ => Vec::new(),
    };

    let status = first_text(doc, &["status", "orderStatus", "state"])
        .map(|label| OrderStatus::parse(&label))
        .unwrap_or_default();

    Ok(Order {
        id: document_id(doc, "orders")?,
        total: coerce_money(doc.get("total")),
        items,
        customer_name: first_text(doc, &["customerName"])
            .unwrap_or_else(|| WALK_IN_CUSTOMER.to_string()),
        payment_method: first_text(doc, &["paymentMethod"])
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
        status,
        created_at: parse_timestamp(doc.get("createdAt")),
    })
}

/// Non-object lines carry nothing to report and are dropped.
///
/// A line always sells at least one unit: a missing, zero or non-numeric
/// quantity counts as 1.
fn ingest_order_line(line: &Value) -> Option<OrderLine> {
    let line = line.as_object()?;
    let quantity = match coerce_int(line.get("quantity")) {
        0 => 1,
        quantity => quantity,
    };
    Some(OrderLine {
        name: first_text(line, &["name", "productName"])
            .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
        quantity,
        price: coerce_money(line.get("price")),
    })
}

/// Builds an [`ActivityEvent`], resolving the actor through the known
/// actor fields.
pub fn ingest_activity(doc: &Value) -> FeedResult<ActivityEvent> {
    let doc = object(doc, "activity")?;
    Ok(ActivityEvent {
        id: document_id(doc, "activity")?,
        message: text(doc, "message").unwrap_or_default(),
        entity_type: text(doc, "entityType").unwrap_or_default(),
        actor: first_text(doc, &ACTOR_KEYS).unwrap_or_default(),
        created_at: parse_timestamp(doc.get("createdAt")),
    })
}

/// Builds a [`StockMovement`]. Only `type: "out"` (any case) issues stock;
/// every other type receives it. Movements need no id of their own.
pub fn ingest_movement(doc: &Value) -> FeedResult<StockMovement> {
    let doc = object(doc, "stockMovements")?;
    let kind = match text(doc, "type") {
        Some(t) if t.trim().eq_ignore_ascii_case("out") => MovementKind::Out,
        _ => MovementKind::In,
    };
    Ok(StockMovement {
        item_id: text(doc, "itemId").filter(|id| !id.is_empty()),
        product_code: text(doc, "productCode").filter(|c| !c.is_empty()),
        kind,
        quantity: coerce_int(doc.get("quantity")),
    })
}

// =============================================================================
// Collection Ingestion
// =============================================================================

/// Ingests a whole snapshot, skipping documents that cannot become records.
pub fn ingest_collection<T>(
    collection: &str,
    docs: &[Value],
    ingest: impl Fn(&Value) -> FeedResult<T>,
) -> Vec<T> {
    let records: Vec<T> = docs
        .iter()
        .enumerate()
        .filter_map(|(index, doc)| match ingest(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(collection, index, error = %e, "Skipping document");
                None
            }
        })
        .collect();

    debug!(
        collection,
        received = docs.len(),
        ingested = records.len(),
        "Ingested snapshot"
    );
    records
}

pub fn ingest_item_collection(docs: &[Value]) -> Vec<InventoryItem> {
    ingest_collection("inventory", docs, ingest_item)
}

pub fn ingest_order_collection(docs: &[Value]) -> Vec<Order> {
    ingest_collection("orders", docs, ingest_order)
}

pub fn ingest_activity_collection(docs: &[Value]) -> Vec<ActivityEvent> {
    ingest_collection("activity", docs, ingest_activity)
}

pub fn ingest_movement_collection(docs: &[Value]) -> Vec<StockMovement> {
    ingest_collection("stockMovements", docs, ingest_movement)
}

// =============================================================================
// Unit Tests
// =============================================================================
