//! Invoice OCR domain — line items extracted from a receipt photo.
//!
//! Stricter than the device-reading normalizer: an item without a usable
//! description is dropped from the list entirely, since a quantity or price
//! with no description is noise the caller can't render.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::datetime::{normalize_date, normalize_time};
use super::extract::extract_json;
use crate::model::{GenerateRequest, GenerativeClient, ModelError};

/// Descriptions at or past this length are table headers or merged rows the
/// model failed to split, not product names.
const MAX_DESCRIPTION_CHARS: usize = 100;

const INVOICE_OCR_PROMPT: &str = r#"Analyze this invoice image carefully and extract the following:

1. The invoice date and time (usually near the top).
2. Every product line item: description, quantity, unit price, total price.

Instructions:
1. Read each character carefully and use surrounding context to confirm product names look plausible.
2. Basic invoice fields:
   - date: in YYYY-MM-DD form, e.g. 2017-07-04
   - time: in HH:MM:SS or HH:MM form, e.g. 18:06:16
3. For each product:
   - description: full product name including any variant in parentheses
   - quantity: digits only (a marking like "20*2" means quantity 2)
   - unitPrice: digits only
   - price: digits only, dropping TX, $, and currency words
4. Extract product rows only. Skip:
   - headers and column titles
   - store name, tax id, phone number
   - subtotal and total rows

Return format (pure JSON, no markdown wrapper):
{
  "date": "2017-07-04",
  "time": "18:06:16",
  "items": [
    {"description": "Scented candle (ocean)", "quantity": "2", "unitPrice": "20", "price": "40"}
  ]
}

If a field cannot be read, set it to null. Return only the JSON, no other text or explanation."#;

/// One extracted line item. Quantity and prices stay as numeric-like strings
/// exactly as printed; interpretation is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: Option<String>,
    pub unit_price: Option<String>,
    pub price: Option<String>,
}

/// Result returned to the caller for one invoice photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceOcrResult {
    pub success: bool,
    pub date: Option<String>,
    pub time: Option<String>,
    pub items: Vec<InvoiceItem>,
    #[serde(rename = "rawText")]
    pub raw_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InvoiceOcrResult {
    /// Defaulted record used for request-validation and internal failures.
    pub fn failed(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            date: None,
            time: None,
            items: Vec::new(),
            raw_text: String::new(),
            error: Some(error.into()),
            message: Some(message.into()),
        }
    }
}

/// Run invoice OCR for one base64 image.
///
/// Errors only when the model call itself fails; an unparsable reply
/// degrades to an empty item list.
pub async fn process_invoice_ocr(
    client: &dyn GenerativeClient,
    image_base64: &str,
) -> Result<InvoiceOcrResult, ModelError> {
    let text = client
        .generate(GenerateRequest {
            prompt: INVOICE_OCR_PROMPT.to_string(),
            image: Some(image_base64.to_string()),
            temperature: 0.1,
        })
        .await?;

    Ok(parse_invoice_response(&text))
}

/// Normalize a raw model reply into an `InvoiceOcrResult`.
pub fn parse_invoice_response(text: &str) -> InvoiceOcrResult {
    let (items, date, time) = match extract_json(text) {
        Ok(payload) => {
            let items = payload
                .get("items")
                .and_then(Value::as_array)
                .map(|arr| arr.iter().filter_map(normalize_item).collect())
                .unwrap_or_default();
            let date = payload
                .get("date")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(|raw| normalize_date(raw).date().unwrap_or_else(|| raw.to_string()));
            let time = payload
                .get("time")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(|raw| normalize_time(raw).unwrap_or_else(|| raw.to_string()));
            (items, date, time)
        }
        Err(_) => {
            tracing::warn!(raw_len = text.len(), "invoice OCR reply had no parsable JSON");
            (Vec::new(), None, None)
        }
    };

    InvoiceOcrResult {
        success: true,
        date,
        time,
        items,
        raw_text: text.to_string(),
        error: None,
        message: None,
    }
}

/// Normalize one raw item, or drop it when the description is empty or
/// implausibly long.
fn normalize_item(raw: &Value) -> Option<InvoiceItem> {
    let description = raw.get("description").and_then(Value::as_str)?.trim();
    if description.is_empty() || description.chars().count() >= MAX_DESCRIPTION_CHARS {
        return None;
    }

    Some(InvoiceItem {
        description: description.to_string(),
        quantity: stringy(raw.get("quantity")),
        unit_price: stringy(raw.get("unitPrice")),
        price: stringy(raw.get("price")),
    })
}

/// Numeric-like string: accepts both `"40"` and `40` from the model.
fn stringy(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
