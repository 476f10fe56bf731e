//! Raw tabular rows and their normalisation into [`SalesRecord`]s.
//!
//! Source values are all strings. Numbers that fail to parse become `0`,
//! tags are lowercased, and dates accept both `DD-MM-YYYY` and
//! `YYYY-MM-DD`. Only a missing id or an unreadable date rejects a row.

use chrono::NaiveDate;
use serde::Deserialize;
use tally_core::SalesRecord;

use crate::{Error, Result};

// ─── RawSalesRow ─────────────────────────────────────────────────────────────

/// One row of the source dataset, column names as they appear in its header.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSalesRow {
  #[serde(rename = "Transaction ID")]
  pub transaction_id:      String,
  #[serde(rename = "Date")]
  pub date:                String,
  #[serde(rename = "Customer ID")]
  pub customer_id:         String,
  #[serde(rename = "Customer Name")]
  pub customer_name:       String,
  #[serde(rename = "Phone Number")]
  pub phone_number:        String,
  #[serde(rename = "Gender")]
  pub gender:              String,
  #[serde(rename = "Age")]
  pub age:                 String,
  #[serde(rename = "Customer Region")]
  pub customer_region:     String,
  #[serde(rename = "Customer Type")]
  pub customer_type:       String,
  #[serde(rename = "Product ID")]
  pub product_id:          String,
  #[serde(rename = "Product Name")]
  pub product_name:        String,
  #[serde(rename = "Brand")]
  pub brand:               String,
  #[serde(rename = "Product Category")]
  pub product_category:    String,
  #[serde(rename = "Tags")]
  pub tags:                String,
  #[serde(rename = "Quantity")]
  pub quantity:            String,
  #[serde(rename = "Price per Unit")]
  pub price_per_unit:      String,
  #[serde(rename = "Discount Percentage")]
  pub discount_percentage: String,
  #[serde(rename = "Total Amount")]
  pub total_amount:        String,
  #[serde(rename = "Final Amount")]
  pub final_amount:        String,
  #[serde(rename = "Payment Method")]
  pub payment_method:      String,
  #[serde(rename = "Order Status")]
  pub order_status:        String,
  #[serde(rename = "Delivery Type")]
  pub delivery_type:       String,
  #[serde(rename = "Store ID")]
  pub store_id:            String,
  #[serde(rename = "Store Location")]
  pub store_location:      String,
  #[serde(rename = "Salesperson ID")]
  pub salesperson_id:      String,
  #[serde(rename = "Employee Name")]
  pub employee_name:       String,
}

// ─── Normalisation ───────────────────────────────────────────────────────────

/// Convert a raw row into a typed record.
pub fn normalize(row: RawSalesRow) -> Result<SalesRecord> {
  let transaction_id = row.transaction_id.trim().to_owned();
  if transaction_id.is_empty() {
    return Err(Error::MissingTransactionId);
  }

  let date = parse_source_date(&row.date).ok_or_else(|| Error::InvalidDate {
    transaction_id: transaction_id.clone(),
    value:          row.date.clone(),
  })?;

  Ok(SalesRecord {
    transaction_id,
    date,
    customer_id: row.customer_id,
    customer_name: row.customer_name,
    phone_number: row.phone_number,
    gender: row.gender,
    age: parse_count(&row.age),
    customer_region: row.customer_region,
    customer_type: row.customer_type,
    product_id: row.product_id,
    product_name: row.product_name,
    brand: row.brand,
    product_category: row.product_category,
    tags: parse_tags(&row.tags),
    quantity: parse_count(&row.quantity),
    price_per_unit: parse_amount(&row.price_per_unit),
    discount_percentage: parse_amount(&row.discount_percentage),
    total_amount: parse_amount(&row.total_amount),
    final_amount: parse_amount(&row.final_amount),
    payment_method: row.payment_method,
    order_status: row.order_status,
    delivery_type: row.delivery_type,
    store_id: row.store_id,
    store_location: row.store_location,
    salesperson_id: row.salesperson_id,
    employee_name: row.employee_name,
  })
}

/// `DD-MM-YYYY` (the dataset's native form) or `YYYY-MM-DD`.
pub fn parse_source_date(s: &str) -> Option<NaiveDate> {
  let s = s.trim();
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .or_else(|_| NaiveDate::parse_from_str(s, "%d-%m-%Y"))
    .ok()
}

/// Non-negative integer; anything else, including negatives, becomes `0`.
/// Integral floats such as `"3.0"` are accepted.
pub fn parse_count(s: &str) -> u32 {
  let s = s.trim();
  s.parse::<u32>().unwrap_or_else(|_| {
    s.parse::<f64>()
      .ok()
      .filter(|v| v.is_finite() && *v >= 0.0 && *v <= f64::from(u32::MAX))
      .map_or(0, |v| v.trunc() as u32)
  })
}

/// Finite decimal; anything else becomes `0.0`.
pub fn parse_amount(s: &str) -> f64 {
  s.trim()
    .parse::<f64>()
    .ok()
    .filter(|v| v.is_finite())
    .unwrap_or(0.0)
}

/// Comma-separated tags, trimmed and lowercased; blanks dropped.
pub fn parse_tags(s: &str) -> Vec<String> {
  s.split(',')
    .map(|t| t.trim().to_lowercase())
    .filter(|t| !t.is_empty())
    .collect()
}
