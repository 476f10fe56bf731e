//! [`SqliteStore`]: the SQLite implementation of [`SalesRepository`].

use std::{collections::HashSet, path::Path};

use tally_core::{
  SalesRecord,
  envelope::{MetricsSummary, ResultEnvelope},
  filter::CompiledFilter,
  page::PageRequest,
  query::{DEFAULT_PAGE_SIZE, QueryDescriptor},
  repository::SalesRepository,
  sort::SortSpec,
};
use tracing::debug;

use crate::{
  Error, Result,
  encode::{RawSale, SALE_COLUMNS, encode_date, encode_tags},
  schema::{SCHEMA, SCHEMA_VERSION},
  sql::{SqlFilter, limit_offset, order_by},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A sales repository backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:              tokio_rusqlite::Connection,
  default_page_size: u64,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, default_page_size: DEFAULT_PAGE_SIZE };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, default_page_size: DEFAULT_PAGE_SIZE };
    store.init_schema().await?;
    Ok(store)
  }

  /// Override the page size used when a query carries none.
  pub fn with_default_page_size(mut self, size: u64) -> Self {
    self.default_page_size = size.max(1);
    self
  }

  async fn init_schema(&self) -> Result<()> {
    let found: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
      .await?;
    // 0 is a fresh file; anything else must already be the current layout.
    if found != 0 && found != SCHEMA_VERSION {
      return Err(Error::SchemaVersion { found, expected: SCHEMA_VERSION });
    }

    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of records currently stored.
  pub async fn record_count(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM sales", [], |r| r.get(0))?))
      .await?;
    Ok(u64::try_from(n).unwrap_or(0))
  }

  /// Bulk-load `records` in one transaction, preserving their order as the
  /// load sequence. Returns the number of records inserted.
  ///
  /// This is the ingestion path only; the repository methods never write.
  pub async fn import(&self, records: Vec<SalesRecord>) -> Result<usize> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
      if !seen.insert(record.transaction_id.clone()) {
        return Err(Error::DuplicateTransaction(record.transaction_id));
      }
      let tags = encode_tags(&record.tags)?;
      let date = encode_date(record.date);
      rows.push((record, date, tags));
    }

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut insert = tx.prepare(
            "INSERT INTO sales (
               transaction_id, sale_date, customer_id, customer_name, customer_name_lc,
               phone_number, gender, gender_lc, age, customer_region, customer_region_lc,
               customer_type, product_id, product_name, brand, product_category,
               product_category_lc, tags, quantity, price_per_unit, discount_percentage,
               total_amount, final_amount, payment_method, payment_method_lc,
               order_status, delivery_type, store_id, store_location, salesperson_id,
               employee_name
             ) VALUES (
               ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
               ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31
             )",
          )?;
          let mut insert_tag =
            tx.prepare("INSERT OR IGNORE INTO sale_tags (seq, tag) VALUES (?1, ?2)")?;

          for (r, date, tags) in &rows {
            insert.execute(rusqlite::params![
              r.transaction_id,
              date,
              r.customer_id,
              r.customer_name,
              r.customer_name.to_lowercase(),
              r.phone_number,
              r.gender,
              r.gender.to_lowercase(),
              r.age,
              r.customer_region,
              r.customer_region.to_lowercase(),
              r.customer_type,
              r.product_id,
              r.product_name,
              r.brand,
              r.product_category,
              r.product_category.to_lowercase(),
              tags,
              r.quantity,
              r.price_per_unit,
              r.discount_percentage,
              r.total_amount,
              r.final_amount,
              r.payment_method,
              r.payment_method.to_lowercase(),
              r.order_status,
              r.delivery_type,
              r.store_id,
              r.store_location,
              r.salesperson_id,
              r.employee_name,
            ])?;
            let seq = tx.last_insert_rowid();
            for tag in &r.tags {
              insert_tag.execute(rusqlite::params![seq, tag.to_lowercase()])?;
            }
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;

    debug!(inserted, "imported sales records");
    Ok(inserted)
  }

  async fn fetch_page(
    &self,
    mut filter: SqlFilter,
    spec: SortSpec,
    page: PageRequest,
  ) -> Result<Vec<SalesRecord>> {
    let where_clause = filter.where_clause();
    let order = order_by(spec);
    let limit = limit_offset(&mut filter, page);
    let sql = format!("SELECT {SALE_COLUMNS} FROM sales {where_clause} {order} {limit}");

    let raws: Vec<RawSale> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(filter.params()), RawSale::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSale::into_record).collect()
  }

  async fn count(&self, filter: SqlFilter) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM sales {}", filter.where_clause());
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(filter.params()), |r| r.get(0))?)
      })
      .await?;
    Ok(u64::try_from(n).unwrap_or(0))
  }
}

// ─── SalesRepository impl ────────────────────────────────────────────────────

impl SalesRepository for SqliteStore {
  type Error = Error;

  async fn query<'a>(&'a self, query: &'a QueryDescriptor) -> Result<ResultEnvelope> {
    let filter = SqlFilter::compile(&CompiledFilter::compile(query));
    let spec = SortSpec::resolve(query.sort_by, query.sort_order);
    let page = PageRequest::normalize(query.page, query.page_size, self.default_page_size);

    // Page and total are independent reads over the same filter.
    let (data, total) =
      tokio::try_join!(self.fetch_page(filter.clone(), spec, page), self.count(filter))?;

    debug!(matched = total, returned = data.len(), page = page.page, "sqlite query");
    Ok(ResultEnvelope::assemble(data, total, page))
  }

  async fn aggregate<'a>(&'a self, query: &'a QueryDescriptor) -> Result<MetricsSummary> {
    let filter = SqlFilter::compile(&CompiledFilter::compile(query));
    // SQLite's TOTAL is compensated like `MetricsSummary`'s in-memory fold;
    // feeding rows in load order keeps the two sums bit-identical.
    let sql = format!(
      "SELECT COUNT(*), COALESCE(SUM(quantity), 0), TOTAL(final_amount),
              TOTAL(total_amount - final_amount)
       FROM (SELECT quantity, total_amount, final_amount
             FROM sales {} ORDER BY seq)",
      filter.where_clause()
    );

    let (records, units, amount, discount): (i64, i64, f64, f64) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(filter.params()), |r| {
          Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
        })?)
      })
      .await?;

    Ok(MetricsSummary {
      total_units_sold: u64::try_from(units).unwrap_or(0),
      total_amount:     amount,
      total_discount:   discount,
      total_records:    u64::try_from(records).unwrap_or(0),
    })
  }
}
