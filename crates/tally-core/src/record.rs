//! Sales records, the unit of data served by every repository.
//!
//! A record is a single cleaned sales transaction. Records are produced once
//! by ingestion and never mutated afterwards; the query engine only reads
//! them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── SalesRecord ─────────────────────────────────────────────────────────────

/// One cleaned sales transaction.
///
/// Serialises with camelCase field names; this is the shape returned in the
/// `data` array of a [`ResultEnvelope`](crate::envelope::ResultEnvelope).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
  pub transaction_id:      String,
  /// Calendar date of the sale. Filtering and sorting use day granularity.
  pub date:                NaiveDate,

  // ── Customer ────────────────────────────────────────────────────────────
  pub customer_id:         String,
  pub customer_name:       String,
  /// Free-form; may carry a country-code prefix or be purely numeric.
  pub phone_number:        String,
  pub gender:              String,
  /// Unparseable source ages are normalised to `0`.
  pub age:                 u32,
  pub customer_region:     String,
  pub customer_type:       String,

  // ── Product ─────────────────────────────────────────────────────────────
  pub product_id:          String,
  pub product_name:        String,
  pub brand:               String,
  pub product_category:    String,
  /// Always lowercase.
  pub tags:                Vec<String>,

  // ── Transaction ─────────────────────────────────────────────────────────
  pub quantity:            u32,
  pub price_per_unit:      f64,
  pub discount_percentage: f64,
  /// Pre-discount amount.
  pub total_amount:        f64,
  /// Post-discount amount. Expected to be `<= total_amount` but not
  /// enforced.
  pub final_amount:        f64,
  pub payment_method:      String,
  pub order_status:        String,
  pub delivery_type:       String,

  // ── Store ───────────────────────────────────────────────────────────────
  pub store_id:            String,
  pub store_location:      String,
  pub salesperson_id:      String,
  pub employee_name:       String,
}

impl SalesRecord {
  /// The discount granted on this sale: `total_amount - final_amount`.
  pub fn discount(&self) -> f64 { self.total_amount - self.final_amount }

  /// Convenience constructor for a record with the given identity and date
  /// and every other field empty or zero.
  pub fn new(transaction_id: impl Into<String>, date: NaiveDate) -> Self {
    Self {
      transaction_id: transaction_id.into(),
      date,
      customer_id: String::new(),
      customer_name: String::new(),
      phone_number: String::new(),
      gender: String::new(),
      age: 0,
      customer_region: String::new(),
      customer_type: String::new(),
      product_id: String::new(),
      product_name: String::new(),
      brand: String::new(),
      product_category: String::new(),
      tags: Vec::new(),
      quantity: 0,
      price_per_unit: 0.0,
      discount_percentage: 0.0,
      total_amount: 0.0,
      final_amount: 0.0,
      payment_method: String::new(),
      order_status: String::new(),
      delivery_type: String::new(),
      store_id: String::new(),
      store_location: String::new(),
      salesperson_id: String::new(),
      employee_name: String::new(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn serialises_with_camel_case_names_and_iso_date() {
    let mut record =
      SalesRecord::new("T-1", NaiveDate::from_ymd_opt(2023, 3, 9).unwrap());
    record.customer_name = "Neha Yadav".into();
    record.tags = vec!["organic".into()];

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["transactionId"], "T-1");
    assert_eq!(json["date"], "2023-03-09");
    assert_eq!(json["customerName"], "Neha Yadav");
    assert_eq!(json["tags"][0], "organic");
    assert!(json.get("customer_name").is_none());
  }

  #[test]
  fn discount_is_total_minus_final() {
    let mut record =
      SalesRecord::new("T-2", NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    record.total_amount = 120.0;
    record.final_amount = 100.0;
    assert_eq!(record.discount(), 20.0);
  }
}
