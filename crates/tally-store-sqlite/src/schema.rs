//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Value of `PRAGMA user_version` written by [`SCHEMA`].
pub const SCHEMA_VERSION: i64 = 2;

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per sales record. `seq` is the load order and breaks sort ties.
-- The `*_lc` columns hold lowercased copies used for case-insensitive
-- filtering and collation.
CREATE TABLE IF NOT EXISTS sales (
    seq                 INTEGER PRIMARY KEY,
    transaction_id      TEXT    NOT NULL UNIQUE,
    sale_date           INTEGER NOT NULL,   -- days from CE, 0001-01-01 = 1
    customer_id         TEXT    NOT NULL,
    customer_name       TEXT    NOT NULL,
    customer_name_lc    TEXT    NOT NULL,
    phone_number        TEXT    NOT NULL,
    gender              TEXT    NOT NULL,
    gender_lc           TEXT    NOT NULL,
    age                 INTEGER NOT NULL,
    customer_region     TEXT    NOT NULL,
    customer_region_lc  TEXT    NOT NULL,
    customer_type       TEXT    NOT NULL,
    product_id          TEXT    NOT NULL,
    product_name        TEXT    NOT NULL,
    brand               TEXT    NOT NULL,
    product_category    TEXT    NOT NULL,
    product_category_lc TEXT    NOT NULL,
    tags                TEXT    NOT NULL DEFAULT '[]',   -- JSON array
    quantity            INTEGER NOT NULL,
    price_per_unit      REAL    NOT NULL,
    discount_percentage REAL    NOT NULL,
    total_amount        REAL    NOT NULL,
    final_amount        REAL    NOT NULL,
    payment_method      TEXT    NOT NULL,
    payment_method_lc   TEXT    NOT NULL,
    order_status        TEXT    NOT NULL,
    delivery_type       TEXT    NOT NULL,
    store_id            TEXT    NOT NULL,
    store_location      TEXT    NOT NULL,
    salesperson_id      TEXT    NOT NULL,
    employee_name       TEXT    NOT NULL
);

-- Lowercased tags, one row per (record, tag), for intersection filters.
CREATE TABLE IF NOT EXISTS sale_tags (
    seq INTEGER NOT NULL REFERENCES sales(seq),
    tag TEXT    NOT NULL,
    PRIMARY KEY (seq, tag)
);

CREATE INDEX IF NOT EXISTS sales_date_idx     ON sales(sale_date);
CREATE INDEX IF NOT EXISTS sales_quantity_idx ON sales(quantity);
CREATE INDEX IF NOT EXISTS sales_name_idx     ON sales(customer_name_lc, customer_name);
CREATE INDEX IF NOT EXISTS sales_region_idx   ON sales(customer_region_lc);
CREATE INDEX IF NOT EXISTS sales_gender_idx   ON sales(gender_lc);
CREATE INDEX IF NOT EXISTS sales_category_idx ON sales(product_category_lc);
CREATE INDEX IF NOT EXISTS sales_payment_idx  ON sales(payment_method_lc);
CREATE INDEX IF NOT EXISTS sales_age_idx      ON sales(age);
CREATE INDEX IF NOT EXISTS sale_tags_tag_idx  ON sale_tags(tag, seq);

PRAGMA user_version = 2;
";
