//! Encoding and decoding helpers between [`SalesRecord`] and the plain
//! representations stored in SQLite columns.
//!
//! Dates are stored as day numbers counted from 0001-01-01 (day 1), so
//! integer order is calendar order for every year chrono can represent.
//! Tags are stored as a compact JSON array.

use chrono::{Datelike, NaiveDate};
use tally_core::SalesRecord;

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> i32 { d.num_days_from_ce() }

pub fn decode_date(days: i32) -> Result<NaiveDate> {
  NaiveDate::from_num_days_from_ce_opt(days)
    .ok_or_else(|| Error::DateParse(format!("day number {days} out of range")))
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Columns selected for a record, in [`RawSale`] field order.
pub const SALE_COLUMNS: &str = "transaction_id, sale_date, customer_id, customer_name, \
   phone_number, gender, age, customer_region, customer_type, product_id, product_name, \
   brand, product_category, tags, quantity, price_per_unit, discount_percentage, \
   total_amount, final_amount, payment_method, order_status, delivery_type, store_id, \
   store_location, salesperson_id, employee_name";

/// Values read directly from a `sales` row; dates and tags still encoded.
pub struct RawSale {
  pub transaction_id:      String,
  pub sale_date:           i32,
  pub customer_id:         String,
  pub customer_name:       String,
  pub phone_number:        String,
  pub gender:              String,
  pub age:                 u32,
  pub customer_region:     String,
  pub customer_type:       String,
  pub product_id:          String,
  pub product_name:        String,
  pub brand:               String,
  pub product_category:    String,
  pub tags:                String,
  pub quantity:            u32,
  pub price_per_unit:      f64,
  pub discount_percentage: f64,
  pub total_amount:        f64,
  pub final_amount:        f64,
  pub payment_method:      String,
  pub order_status:        String,
  pub delivery_type:       String,
  pub store_id:            String,
  pub store_location:      String,
  pub salesperson_id:      String,
  pub employee_name:       String,
}

impl RawSale {
  /// Read a row selected with [`SALE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      transaction_id:      row.get(0)?,
      sale_date:           row.get(1)?,
      customer_id:         row.get(2)?,
      customer_name:       row.get(3)?,
      phone_number:        row.get(4)?,
      gender:              row.get(5)?,
      age:                 row.get(6)?,
      customer_region:     row.get(7)?,
      customer_type:       row.get(8)?,
      product_id:          row.get(9)?,
      product_name:        row.get(10)?,
      brand:               row.get(11)?,
      product_category:    row.get(12)?,
      tags:                row.get(13)?,
      quantity:            row.get(14)?,
      price_per_unit:      row.get(15)?,
      discount_percentage: row.get(16)?,
      total_amount:        row.get(17)?,
      final_amount:        row.get(18)?,
      payment_method:      row.get(19)?,
      order_status:        row.get(20)?,
      delivery_type:       row.get(21)?,
      store_id:            row.get(22)?,
      store_location:      row.get(23)?,
      salesperson_id:      row.get(24)?,
      employee_name:       row.get(25)?,
    })
  }

  pub fn into_record(self) -> Result<SalesRecord> {
    Ok(SalesRecord {
      transaction_id:      self.transaction_id,
      date:                decode_date(self.sale_date)?,
      customer_id:         self.customer_id,
      customer_name:       self.customer_name,
      phone_number:        self.phone_number,
      gender:              self.gender,
      age:                 self.age,
      customer_region:     self.customer_region,
      customer_type:       self.customer_type,
      product_id:          self.product_id,
      product_name:        self.product_name,
      brand:               self.brand,
      product_category:    self.product_category,
      tags:                decode_tags(&self.tags)?,
      quantity:            self.quantity,
      price_per_unit:      self.price_per_unit,
      discount_percentage: self.discount_percentage,
      total_amount:        self.total_amount,
      final_amount:        self.final_amount,
      payment_method:      self.payment_method,
      order_status:        self.order_status,
      delivery_type:       self.delivery_type,
      store_id:            self.store_id,
      store_location:      self.store_location,
      salesperson_id:      self.salesperson_id,
      employee_name:       self.employee_name,
    })
  }
}
