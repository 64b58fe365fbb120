use super::*;

fn time_name(size: PartitionSize, start: &str, format: Option<&str>) -> String {
    TimePartition::new(size, at_time(start), format.map(str::to_string))
        .unwrap()
        .name()
        .unwrap()
}

#[test]
fn test_default_time_names() {
    assert_eq!(time_name(PartitionSize::years(1).unwrap(), "2019-01-01 00:00:00", None), "2019");
    assert_eq!(time_name(PartitionSize::months(1).unwrap(), "2019-01-01 00:00:00", None), "2019_jan");
    assert_eq!(time_name(PartitionSize::weeks(1).unwrap(), "2019-01-07 00:00:00", None), "2019_week_01");
    assert_eq!(time_name(PartitionSize::days(1).unwrap(), "2019-01-05 00:00:00", None), "2019_jan_05");
    assert_eq!(
        time_name(PartitionSize::hours(1).unwrap(), "2019-01-05 13:00:00", None),
        "2019_jan_05_13:00:00"
    );
}

#[test]
fn test_custom_time_name_is_lowercased() {
    let size = PartitionSize::months(1).unwrap();
    assert_eq!(time_name(size, "2019-02-01 00:00:00", Some("P%Y%B")), "p2019february");
}

#[test]
fn test_invalid_format_is_naming_error() {
    let partition = TimePartition::new(
        PartitionSize::years(1).unwrap(),
        at("2019-01-01"),
        Some("%Y_%".to_string()),
    )
    .unwrap();
    assert!(matches!(partition.name(), Err(Error::Naming(_))));
}

#[test]
fn test_list_names() {
    let partition = ListPartition::new(vec!["Foo".into(), 2.into()], None);
    assert_eq!(partition.name().unwrap(), "foo_2");

    let partition = ListPartition::new(vec![1.into()], Some(DEFAULT_CATEGORY_NAME_FORMAT.to_string()));
    assert_eq!(partition.name().unwrap(), "categories_1");

    let partition = ListPartition::new(vec![1.into()], Some("categories".to_string()));
    assert!(matches!(partition.name(), Err(Error::Naming(_))));
}

#[test]
fn test_time_category_names() {
    let yearly = PartitionSize::years(1).unwrap();
    let partition = TimeCategoryPartition::new(yearly, at("2019-01-01"), &Category::Int(1), None).unwrap();
    assert_eq!(partition.name().unwrap(), "2019_1");

    let monthly = PartitionSize::months(1).unwrap();
    let partition = TimeCategoryPartition::new(
        monthly,
        at("2019-03-01"),
        &Category::Int(42),
        Some("%Y_%m_Cat{category}".to_string()),
    )
    .unwrap();
    assert_eq!(partition.name().unwrap(), "2019_03_cat42");
}

#[test]
fn test_time_category_predicate_is_half_open() {
    let yearly = PartitionSize::years(1).unwrap();
    let partition = TimeCategoryPartition::new(yearly, at("2019-01-01"), &Category::Int(7), None).unwrap();

    assert_eq!(
        partition.predicate(),
        PartitionPredicate::Range {
            from: vec![
                PartitionBound::Timestamp(at("2019-01-01")),
                PartitionBound::Category(Category::Int(7)),
            ],
            to: vec![
                PartitionBound::Timestamp(at("2020-01-01")),
                PartitionBound::Category(Category::Int(8)),
            ],
        }
    );
}

#[test]
fn test_time_category_rejects_non_ordinal() {
    let yearly = PartitionSize::years(1).unwrap();
    assert!(matches!(
        TimeCategoryPartition::new(yearly, at("2019-01-01"), &Category::from("eu"), None),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        TimeCategoryPartition::new(yearly, at("2019-01-01"), &Category::Int(i64::MAX), None),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_sub_partition_name_and_target() {
    let parent = Arc::new(ListPartition::new(vec![1.into()], Some("categories_%s".to_string())));
    let spec = PartitionSpec::TimeSub(
        TimeSubPartition::new(parent, PartitionSize::years(1).unwrap(), at("2019-01-01"), None).unwrap(),
    );

    assert_eq!(spec.name().unwrap(), "categories_1_2019");
    assert_eq!(spec.target_table("events").unwrap(), "events_categories_1");

    let flat = PartitionSpec::List(ListPartition::new(vec![1.into()], None));
    assert_eq!(flat.target_table("events").unwrap(), "events");
}

#[test]
fn test_names_are_deterministic() {
    let size = PartitionSize::days(1).unwrap();
    let a = TimePartition::new(size, at("2019-05-05"), None).unwrap();
    let b = TimePartition::new(size, at("2019-05-05"), None).unwrap();
    assert_eq!(a.name().unwrap(), b.name().unwrap());
    assert_eq!(a.end_datetime(), at("2019-05-06"));
}
