use super::*;

fn yearly(count: usize) -> CurrentTimeStrategy {
    CurrentTimeStrategy::new(PartitionSize::years(1).unwrap(), count, None, None).unwrap()
}

#[test]
fn test_current_time_yearly_creates() {
    let strategy = yearly(2);
    let specs: Vec<PartitionSpec> = strategy.to_create(at("2019-01-01")).unwrap().collect();

    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].start_datetime(), Some(at("2019-01-01")));
    assert_eq!(specs[1].start_datetime(), Some(at("2020-01-01")));
    assert_eq!(names(specs.into_iter()), vec!["2019", "2020"]);
}

#[test]
fn test_create_starts_at_current_bucket() {
    let strategy = CurrentTimeStrategy::new(PartitionSize::months(1).unwrap(), 3, None, None).unwrap();
    let created = names(strategy.to_create(at_time("2019-05-17 10:11:12")).unwrap());
    assert_eq!(created, vec!["2019_may", "2019_jun", "2019_jul"]);
}

#[test]
fn test_horizon_count_and_monotonic_buckets() {
    let sizes = [
        PartitionSize::years(1).unwrap(),
        PartitionSize::months(1).unwrap(),
        PartitionSize::weeks(1).unwrap(),
        PartitionSize::days(3).unwrap(),
        PartitionSize::hours(1).unwrap(),
    ];

    for size in sizes.iter() {
        let strategy = CurrentTimeStrategy::new(*size, 12, None, None).unwrap();
        let specs: Vec<PartitionSpec> = strategy.to_create(at_time("2019-01-31 05:30:00")).unwrap().collect();
        assert_eq!(specs.len(), 12, "count for {}", size);

        for pair in specs.windows(2) {
            assert!(pair[0].start_datetime() < pair[1].start_datetime(), "order for {}", size);
            assert_ne!(pair[0].name().unwrap(), pair[1].name().unwrap(), "names for {}", size);
            assert_eq!(pair[0].bucket().unwrap().end, pair[1].bucket().unwrap().start);
        }
    }
}

#[test]
fn test_zero_count_creates_nothing() {
    assert!(yearly(0).to_create(at("2019-01-01")).unwrap().next().is_none());
}

#[test]
fn test_delete_without_max_age_is_empty() {
    assert!(yearly(2).to_delete(at("2019-01-01")).unwrap().next().is_none());

    let zero_age = CurrentTimeStrategy::new(
        PartitionSize::years(1).unwrap(),
        2,
        Some(CalendarDelta::months(0)),
        None,
    )
    .unwrap();
    assert!(zero_age.to_delete(at("2019-01-01")).unwrap().next().is_none());
}

#[test]
fn test_delete_walks_backward_without_end() {
    let strategy = CurrentTimeStrategy::new(
        PartitionSize::months(1).unwrap(),
        2,
        Some(CalendarDelta::months(1)),
        None,
    )
    .unwrap();
    let specs: Vec<PartitionSpec> = strategy.to_delete(at("2019-03-01")).unwrap().take(500).collect();

    assert_eq!(specs.len(), 500);
    assert_eq!(names(specs.iter().take(3).cloned()), vec!["2019_feb", "2019_jan", "2018_dec"]);
    for pair in specs.windows(2) {
        assert!(pair[0].start_datetime() > pair[1].start_datetime());
    }
}

#[test]
fn test_retention_anchor_bucket_end() {
    let size = PartitionSize::months(1).unwrap();
    let max_age = CalendarDelta::months(1);
    let strategy = CurrentTimeStrategy::new(size, 2, Some(max_age), None)
        .unwrap()
        .with_retention_anchor(RetentionAnchor::BucketEnd);

    for now in [at("2019-03-01"), at_time("2019-03-17 09:00:00"), at("2019-12-31")] {
        let cutoff = max_age.sub_from(now).unwrap();
        let first = strategy.to_delete(now).unwrap().next().unwrap();
        let bucket = first.bucket().unwrap();

        assert!(bucket.end <= cutoff, "{} ends after cutoff {}", first.name().unwrap(), cutoff);
        // the bucket right after it has not aged out yet
        assert!(size.as_delta().add_to(bucket.end).unwrap() > cutoff);
    }

    let first = strategy.to_delete(at("2019-03-01")).unwrap().next().unwrap();
    assert_eq!(first.name().unwrap(), "2019_jan");
}

#[test]
fn test_time_and_category_creates() {
    let strategy = CurrentTimeAndCategoryStrategy::new(
        PartitionSize::years(1).unwrap(),
        2,
        vec![1.into(), 2.into()],
        None,
        None,
    )
    .unwrap();

    let created = names(strategy.to_create(at("2019-01-01")).unwrap());
    assert_eq!(created, vec!["2019_1", "2020_1", "2019_2", "2020_2"]);
}

#[test]
fn test_time_and_category_delete_order() {
    let strategy = CurrentTimeAndCategoryStrategy::new(
        PartitionSize::months(1).unwrap(),
        2,
        vec![1.into(), 2.into()],
        Some(CalendarDelta::months(1)),
        None,
    )
    .unwrap();

    let deleted = names(strategy.to_delete(at("2019-06-01")).unwrap().take(4));
    assert_eq!(deleted, vec!["2019_may_1", "2019_may_2", "2019_apr_1", "2019_apr_2"]);
}

#[test]
fn test_time_and_category_without_categories() {
    let strategy = CurrentTimeAndCategoryStrategy::new(
        PartitionSize::months(1).unwrap(),
        2,
        Vec::new(),
        Some(CalendarDelta::months(1)),
        None,
    )
    .unwrap();

    assert!(strategy.to_create(at("2019-06-01")).unwrap().next().is_none());
    assert!(strategy.to_delete(at("2019-06-01")).unwrap().next().is_none());
}

#[test]
fn test_time_and_category_validation() {
    let size = PartitionSize::years(1).unwrap();
    assert!(matches!(
        CurrentTimeAndCategoryStrategy::new(size, 1, vec!["eu".into()], None, None),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        CurrentTimeAndCategoryStrategy::new(size, 1, vec![1.into()], None, Some("%Y".to_string())),
        Err(Error::Configuration(_))
    ));
    assert!(
        CurrentTimeAndCategoryStrategy::new(size, 1, vec![1.into()], None, Some("y%Y_{category}".to_string()))
            .is_ok()
    );
}

#[test]
fn test_category_current_time_creates() {
    let strategy = CategoryCurrentTimeStrategy::new(
        vec![1.into(), 2.into()],
        PartitionSize::years(1).unwrap(),
        3,
        None,
        (None, None),
    )
    .unwrap();

    let specs: Vec<PartitionSpec> = strategy.to_create(at("2019-01-01")).unwrap().collect();
    let outer: Vec<&PartitionSpec> = specs.iter().filter(|s| matches!(s, PartitionSpec::List(_))).collect();

    assert_eq!(specs.len(), 2 * (1 + 3));
    assert_eq!(outer.len(), 2);
    assert_eq!(
        names(specs.into_iter()),
        vec!["1", "1_2019", "1_2020", "1_2021", "2", "2_2019", "2_2020", "2_2021"]
    );
}

#[test]
fn test_category_current_time_accepts_text_categories() {
    let strategy = CategoryCurrentTimeStrategy::new(
        vec!["EU".into(), "US".into()],
        PartitionSize::months(1).unwrap(),
        1,
        None,
        (Some("region_%s".to_string()), Some("%Y%m".to_string())),
    )
    .unwrap();

    let created = names(strategy.to_create(at("2019-01-01")).unwrap());
    assert_eq!(created, vec!["region_eu", "region_eu_201901", "region_us", "region_us_201901"]);
}

#[test]
fn test_category_current_time_deletes_only_sub_partitions() {
    let strategy = CategoryCurrentTimeStrategy::new(
        vec![1.into(), 2.into()],
        PartitionSize::years(1).unwrap(),
        2,
        Some(CalendarDelta::years(2)),
        (Some("categories_%s".to_string()), None),
    )
    .unwrap();

    let specs: Vec<PartitionSpec> = strategy.to_delete(at("2021-01-01")).unwrap().take(20).collect();
    assert!(specs.iter().all(|s| matches!(s, PartitionSpec::TimeSub(_))));
    assert_eq!(
        names(specs.into_iter().take(4)),
        vec!["categories_1_2019", "categories_2_2019", "categories_1_2018", "categories_2_2018"]
    );
}

#[test]
fn test_enumerate_returns_both_sequences() {
    let strategy: PartitioningStrategy = CurrentTimeStrategy::new(
        PartitionSize::days(1).unwrap(),
        2,
        Some(CalendarDelta::weeks(1)),
        None,
    )
    .unwrap()
    .into();

    let Enumeration { to_create, to_delete } = strategy.enumerate(at("2019-01-10")).unwrap();
    assert_eq!(names(to_create), vec!["2019_jan_10", "2019_jan_11"]);
    assert_eq!(names(to_delete.take(2)), vec!["2019_jan_03", "2019_jan_02"]);
    assert_eq!(strategy.count(), 2);
    assert_eq!(strategy.max_age(), Some(CalendarDelta::days(7)));
}

#[test]
fn test_strategy_requires_matching_table() {
    let list_table = PartitionedTable::new("events", PartitioningMethod::List, ["category_id"]).unwrap();
    assert!(matches!(
        PartitioningConfig::new(list_table, yearly(1)),
        Err(Error::Configuration(_))
    ));

    assert!(matches!(
        partition_by_current_time_and_categories(range_table("events"), years(1), 1, vec![1.into()], None, None),
        Err(Error::Configuration(_))
    ));

    let flat_list = PartitionedTable::new("events", PartitioningMethod::List, ["category_id"]).unwrap();
    assert!(matches!(
        partition_by_category_and_current_time(flat_list, vec![1.into()], years(1), 1, None, (None, None)),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_table_requires_keys() {
    assert!(matches!(
        PartitionedTable::new("events", PartitioningMethod::Range, Vec::<String>::new()),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        PartitionedTable::new("events", PartitioningMethod::List, ["category_id"])
            .unwrap()
            .sub_partitioned_by(PartitioningMethod::Range, Vec::<String>::new()),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_name_format_needs_a_date_field() {
    let size = PartitionSize::months(1).unwrap();

    assert!(matches!(
        CurrentTimeStrategy::new(size, 3, None, Some("static".to_string())),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        CurrentTimeAndCategoryStrategy::new(size, 3, vec![1.into()], None, Some("{category}".to_string())),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        CategoryCurrentTimeStrategy::new(vec![1.into()], size, 3, None, (None, Some("static".to_string()))),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        partition_by_current_time_and_categories(
            time_category_table("events"),
            months(1),
            3,
            vec![1.into()],
            None,
            Some("{category}".to_string()),
        ),
        Err(Error::Configuration(_))
    ));

    assert!(CurrentTimeStrategy::new(size, 3, None, Some("m%m".to_string())).is_ok());
    assert!(CategoryCurrentTimeStrategy::new(vec![1.into()], size, 3, None, (None, Some("%b".to_string()))).is_ok());
}

#[test]
fn test_horizon_past_representable_range() {
    let now = chrono::NaiveDate::from_ymd_opt(262_140, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc();
    let size = PartitionSize::years(1).unwrap();

    let within = CurrentTimeStrategy::new(size, 2, None, None).unwrap();
    assert_eq!(within.to_create(now).unwrap().count(), 2);

    let past = CurrentTimeStrategy::new(size, 5, None, None).unwrap();
    assert!(matches!(past.to_create(now), Err(Error::OutOfRange(_))));

    let per_category = CurrentTimeAndCategoryStrategy::new(size, 5, vec![1.into()], None, None).unwrap();
    assert!(matches!(per_category.to_create(now), Err(Error::OutOfRange(_))));

    let hierarchical = CategoryCurrentTimeStrategy::new(vec![1.into()], size, 5, None, (None, None)).unwrap();
    assert!(matches!(hierarchical.to_create(now), Err(Error::OutOfRange(_))));
}
