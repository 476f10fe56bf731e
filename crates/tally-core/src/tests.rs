//! End-to-end query tests against `InMemoryRepository`.

use chrono::NaiveDate;

use crate::{
  envelope::MetricsSummary,
  memory::InMemoryRepository,
  query::{QueryDescriptor, RawSalesParams, SortBy, SortOrder},
  record::SalesRecord,
  repository::SalesRepository,
};

fn sale(id: &str, day: u32, name: &str, quantity: u32) -> SalesRecord {
  let mut r = SalesRecord::new(id, NaiveDate::from_ymd_opt(2023, 5, day).unwrap());
  r.customer_name = name.into();
  r.quantity = quantity;
  r.total_amount = f64::from(quantity) * 10.0;
  r.final_amount = f64::from(quantity) * 9.0;
  r
}

/// Twelve records with shuffled dates and a few attributes to filter on.
fn dataset() -> Vec<SalesRecord> {
  let days = [4, 11, 2, 9, 7, 1, 12, 3, 10, 5, 8, 6];
  let names = [
    "Asha", "bhavin", "Chitra", "Dev", "esha", "Farhan", "Gita", "Hari", "Isha",
    "Jai", "Kiran", "Lata",
  ];
  days
    .iter()
    .zip(names)
    .enumerate()
    .map(|(i, (&day, name))| {
      let mut r = sale(&format!("T-{i:02}"), day, name, (i as u32 % 4) + 1);
      r.age = 18 + i as u32 * 3;
      r.customer_region = ["North", "South", "East"][i % 3].into();
      r.phone_number = format!("+91 98{i:02}0{i:02}111");
      r.tags = match i % 3 {
        0 => vec!["organic".into(), "wireless".into()],
        1 => vec!["gadgets".into()],
        _ => vec![],
      };
      r
    })
    .collect()
}

fn repo() -> InMemoryRepository { InMemoryRepository::new(dataset()) }

fn ids(records: &[SalesRecord]) -> Vec<&str> {
  records.iter().map(|r| r.transaction_id.as_str()).collect()
}

#[test]
fn unfiltered_query_returns_everything_newest_first() {
  let repo = repo().with_default_page_size(100);
  let env = repo.run_query(&QueryDescriptor::default());

  assert_eq!(env.total_records, 12);
  assert_eq!(env.data.len(), 12);
  assert!(env.data.windows(2).all(|w| w[0].date >= w[1].date));
}

#[test]
fn default_page_size_applies_when_absent() {
  let env = repo().run_query(&QueryDescriptor::default());
  assert_eq!(env.page_size, 10);
  assert_eq!(env.data.len(), 10);
  assert_eq!(env.total_pages, 2);
  assert_eq!(env.current_page, 1);
}

#[test]
fn repeated_queries_are_identical() {
  let repo = repo();
  let q = QueryDescriptor {
    sort_by: SortBy::Quantity,
    sort_order: SortOrder::Asc,
    page_size: Some(4),
    page: Some(2),
    ..Default::default()
  };
  assert_eq!(repo.run_query(&q), repo.run_query(&q));
}

#[test]
fn pages_cover_the_filtered_set_exactly() {
  let repo = repo();
  for (sort_by, sort_order) in [
    (SortBy::Date, SortOrder::Desc),
    (SortBy::Quantity, SortOrder::Asc),
    (SortBy::Quantity, SortOrder::Desc),
    (SortBy::CustomerName, SortOrder::Asc),
  ] {
    let base = QueryDescriptor {
      sort_by,
      sort_order,
      regions: vec!["north".into(), "south".into()],
      ..Default::default()
    };
    let full = repo.run_query(&QueryDescriptor { page_size: Some(1000), ..base.clone() });

    let first = repo.run_query(&QueryDescriptor { page_size: Some(3), ..base.clone() });
    let mut stitched = Vec::new();
    for page in 1..=first.total_pages {
      let env = repo.run_query(&QueryDescriptor {
        page: Some(page as i64),
        page_size: Some(3),
        ..base.clone()
      });
      stitched.extend(env.data);
    }
    assert_eq!(ids(&stitched), ids(&full.data), "{sort_by:?} {sort_order:?}");
    assert_eq!(stitched.len() as u64, full.total_records);
  }
}

#[test]
fn page_past_the_end_is_empty_not_an_error() {
  let env = repo().run_query(&QueryDescriptor { page: Some(99), ..Default::default() });
  assert!(env.data.is_empty());
  assert_eq!(env.total_records, 12);
  assert_eq!(env.current_page, 99);
}

#[test]
fn empty_result_is_a_valid_envelope() {
  let env = repo().run_query(&QueryDescriptor {
    search: Some("nobody-by-this-name".into()),
    ..Default::default()
  });
  assert!(env.data.is_empty());
  assert_eq!(env.total_records, 0);
  assert_eq!(env.total_pages, 1);
}

#[test]
fn total_pages_formula_holds() {
  let repo = repo();
  for size in 1..=13 {
    let env = repo.run_query(&QueryDescriptor { page_size: Some(size), ..Default::default() });
    let expected = env.total_records.div_ceil(size as u64).max(1);
    assert_eq!(env.total_pages, expected, "pageSize={size}");
  }
}

#[test]
fn date_sort_ascending_request_still_returns_newest_first() {
  let env = repo().run_query(&QueryDescriptor {
    sort_by: SortBy::Date,
    sort_order: SortOrder::Asc,
    page_size: Some(3),
    ..Default::default()
  });
  let days: Vec<_> = env.data.iter().map(|r| r.date.format("%d").to_string()).collect();
  assert_eq!(days, ["12", "11", "10"]);
}

#[test]
fn customer_name_sort_is_case_insensitive() {
  let env = repo().run_query(&QueryDescriptor {
    sort_by: SortBy::CustomerName,
    sort_order: SortOrder::Asc,
    page_size: Some(3),
    ..Default::default()
  });
  let names: Vec<_> = env.data.iter().map(|r| r.customer_name.as_str()).collect();
  assert_eq!(names, ["Asha", "bhavin", "Chitra"]);
}

#[test]
fn tag_filter_matches_on_overlap() {
  let env = repo().run_query(&QueryDescriptor {
    tags: vec!["wireless".into(), "gadgets".into()],
    page_size: Some(100),
    ..Default::default()
  });
  // Indices 0,3,6,9 carry "wireless"; 1,4,7,10 carry "gadgets".
  assert_eq!(env.total_records, 8);
  assert!(env.data.iter().all(|r| !r.tags.is_empty()));
}

#[test]
fn inverted_age_range_matches_unfiltered_set() {
  let repo = repo();
  let unfiltered = repo.run_query(&QueryDescriptor::default());
  let inverted =
    repo.run_query(&QueryDescriptor { age_range: Some((30, 20)), ..Default::default() });
  assert_eq!(unfiltered, inverted);
}

#[test]
fn numeric_search_matches_phone_even_when_name_does_not() {
  let env = repo().run_query(&QueryDescriptor {
    search: Some("98070".into()),
    ..Default::default()
  });
  assert_eq!(env.total_records, 1);
  assert_eq!(env.data[0].transaction_id, "T-07");
}

#[test]
fn metrics_cover_the_whole_filtered_set_regardless_of_page_size() {
  let day = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
  let mut a = SalesRecord::new("a", day);
  (a.quantity, a.final_amount, a.total_amount) = (5, 100.0, 120.0);
  let mut b = SalesRecord::new("b", day);
  (b.quantity, b.final_amount, b.total_amount) = (3, 50.0, 50.0);
  let repo = InMemoryRepository::new(vec![a, b]);

  let q = QueryDescriptor { page_size: Some(1), ..Default::default() };
  assert_eq!(repo.run_query(&q).data.len(), 1);
  assert_eq!(
    repo.run_aggregate(&q),
    MetricsSummary {
      total_units_sold: 8,
      total_amount:     150.0,
      total_discount:   20.0,
      total_records:    2,
    }
  );
}

#[test]
fn raw_params_drive_the_same_query() {
  let (q, ignored) = RawSalesParams {
    regions: Some("NORTH".into()),
    age_range: Some("20,abc".into()),
    page_size: Some("2".into()),
    ..Default::default()
  }
  .into_descriptor();
  assert_eq!(ignored.len(), 1);

  let env = repo().run_query(&q);
  assert_eq!(env.total_records, 4);
  assert_eq!(env.total_pages, 2);
  assert!(env.data.iter().all(|r| r.customer_region == "North"));
}

#[tokio::test]
async fn trait_methods_match_the_synchronous_path() {
  let repo = repo();
  let q = QueryDescriptor { search: Some("isha".into()), ..Default::default() };

  let env = repo.query(&q).await.unwrap();
  assert_eq!(env, repo.run_query(&q));
  // "esha" does not contain "isha"; "Isha" does.
  assert_eq!(env.total_records, 1);

  let metrics = repo.aggregate(&q).await.unwrap();
  assert_eq!(metrics.total_records, 1);
}
