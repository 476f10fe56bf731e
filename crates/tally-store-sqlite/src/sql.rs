//! Translation of core query structures into SQL.
//!
//! [`SqlFilter`] mirrors [`CompiledFilter::matches`] clause for clause; the
//! fail-open decisions were already made when the filter was compiled, so
//! an inactive dimension simply contributes no clause.

use rusqlite::types::Value;
use tally_core::{
  filter::CompiledFilter,
  page::PageRequest,
  query::{SortBy, SortOrder},
  sort::SortSpec,
};

/// A `WHERE` clause with its positional parameters.
#[derive(Debug, Clone, Default)]
pub struct SqlFilter {
  conds:  Vec<String>,
  params: Vec<Value>,
}

impl SqlFilter {
  pub fn compile(filter: &CompiledFilter) -> Self {
    let mut sql = Self::default();

    if let Some(search) = &filter.search {
      let name = sql.bind(search.name_fragment.clone());
      let name = format!("instr(customer_name_lc, {name}) > 0");
      match &search.phone_fragment {
        Some(digits) => {
          let phone = sql.bind(digits.clone());
          sql.conds.push(format!("({name} OR instr(phone_number, {phone}) > 0)"));
        }
        None => sql.conds.push(name),
      }
    }

    sql.push_in("customer_region_lc", &filter.regions);
    sql.push_in("gender_lc", &filter.genders);
    sql.push_in("product_category_lc", &filter.categories);
    sql.push_in("payment_method_lc", &filter.payment_methods);

    if !filter.tags.is_empty() {
      let list = sql.bind_list(&filter.tags);
      sql.conds.push(format!(
        "EXISTS (SELECT 1 FROM sale_tags t WHERE t.seq = sales.seq AND t.tag IN ({list}))"
      ));
    }

    if let Some(age) = filter.age {
      let (min, max) = (sql.bind(age.min), sql.bind(age.max));
      sql.conds.push(format!("age BETWEEN {min} AND {max}"));
    }

    if let Some(dates) = filter.dates {
      let start = sql.bind(crate::encode::encode_date(dates.start));
      let end = sql.bind(crate::encode::encode_date(dates.end));
      sql.conds.push(format!("sale_date BETWEEN {start} AND {end}"));
    }

    sql
  }

  /// Append a parameter and return its placeholder.
  pub fn bind(&mut self, value: impl Into<Value>) -> String {
    self.params.push(value.into());
    format!("?{}", self.params.len())
  }

  fn bind_list(&mut self, values: &[String]) -> String {
    values
      .iter()
      .map(|v| self.bind(v.clone()))
      .collect::<Vec<_>>()
      .join(", ")
  }

  fn push_in(&mut self, column: &str, values: &[String]) {
    if values.is_empty() {
      return;
    }
    let list = self.bind_list(values);
    self.conds.push(format!("{column} IN ({list})"));
  }

  /// `WHERE ...`, or an empty string when nothing is constrained.
  pub fn where_clause(&self) -> String {
    if self.conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", self.conds.join(" AND "))
    }
  }

  pub fn params(&self) -> &[Value] { &self.params }
}

/// `ORDER BY` for `spec`, ending in the load sequence so ties resolve the
/// same way as a stable in-memory sort.
pub fn order_by(spec: SortSpec) -> String {
  let dir = match spec.direction {
    SortOrder::Asc => "ASC",
    SortOrder::Desc => "DESC",
  };
  match spec.key {
    SortBy::Date => format!("ORDER BY sale_date {dir}, seq ASC"),
    SortBy::Quantity => format!("ORDER BY quantity {dir}, seq ASC"),
    SortBy::CustomerName => {
      format!("ORDER BY customer_name_lc {dir}, customer_name {dir}, seq ASC")
    }
  }
}

/// `LIMIT`/`OFFSET` bound onto `filter`'s parameter list.
pub fn limit_offset(filter: &mut SqlFilter, page: PageRequest) -> String {
  let limit = filter.bind(i64::try_from(page.size).unwrap_or(i64::MAX));
  let offset = filter.bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
  format!("LIMIT {limit} OFFSET {offset}")
}

#[cfg(test)]
mod tests {
  use tally_core::query::QueryDescriptor;

  use super::*;

  fn compile(q: QueryDescriptor) -> SqlFilter { SqlFilter::compile(&CompiledFilter::compile(&q)) }

  #[test]
  fn unconstrained_filter_has_no_where_clause() {
    let f = compile(QueryDescriptor::default());
    assert_eq!(f.where_clause(), "");
    assert!(f.params().is_empty());
  }

  #[test]
  fn dimensions_are_anded_with_numbered_params() {
    let f = compile(QueryDescriptor {
      search: Some("987".into()),
      regions: vec!["North".into(), "South".into()],
      age_range: Some((20, 30)),
      ..Default::default()
    });
    assert_eq!(
      f.where_clause(),
      "WHERE (instr(customer_name_lc, ?1) > 0 OR instr(phone_number, ?2) > 0) \
       AND customer_region_lc IN (?3, ?4) AND age BETWEEN ?5 AND ?6"
    );
    assert_eq!(f.params()[2], Value::Text("north".into()));
    assert_eq!(f.params()[5], Value::Integer(30));
  }

  #[test]
  fn invalid_ranges_contribute_nothing() {
    let f = compile(QueryDescriptor {
      age_range: Some((30, 20)),
      date_range: Some(("yesterday".into(), "2023-01-01".into())),
      ..Default::default()
    });
    assert_eq!(f.where_clause(), "");
  }

  #[test]
  fn order_by_appends_load_sequence() {
    let spec = SortSpec::resolve(SortBy::Date, SortOrder::Asc);
    assert_eq!(order_by(spec), "ORDER BY sale_date DESC, seq ASC");

    let spec = SortSpec::resolve(SortBy::CustomerName, SortOrder::Asc);
    assert_eq!(
      order_by(spec),
      "ORDER BY customer_name_lc ASC, customer_name ASC, seq ASC"
    );
  }

  #[test]
  fn limit_offset_continues_numbering() {
    let mut f = compile(QueryDescriptor { genders: vec!["Male".into()], ..Default::default() });
    let clause = limit_offset(&mut f, PageRequest { page: 3, size: 10 });
    assert_eq!(clause, "LIMIT ?2 OFFSET ?3");
    assert_eq!(f.params()[2], Value::Integer(20));
  }
}
