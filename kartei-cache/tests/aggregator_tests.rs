use std::sync::Arc;

use kartei_api::{ApiConfig, HttpTransport};
use kartei_cache::{
    Aggregator, CacheError, DefinitionCache, InstanceCache, InstanceCacheConfig,
    DEFAULT_AGGREGATION_KEY,
};
use kartei_types::{InstanceId, PropertyId};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup(server: &MockServer) -> Aggregator {
    let transport = Arc::new(HttpTransport::new(ApiConfig {
        base_url: server.uri(),
        api_key: "test_key".to_string(),
        ..Default::default()
    }));
    let definitions = DefinitionCache::new(transport.clone());
    let instances = InstanceCache::new(
        transport,
        definitions.clone(),
        InstanceCacheConfig::default(),
    );
    Aggregator::new(instances, definitions)
}

async fn mount_person_definition(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/definition/person"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "properties": [
                {"id": 1, "title": "firstname", "datatype": "plain", "default": ""},
                {"id": 2, "title": "lastname", "datatype": "plain", "default": ""},
                {"id": 3, "title": "birthday", "datatype": "date", "default": ""}
            ],
            "label": ["firstname", "lastname"]
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_records(server: &MockServer, request_path: &str, records: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(request_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(records)))
        .expect(1)
        .mount(server)
        .await;
}

fn person(id: u64, firstname: &str, lastname: &str) -> Value {
    json!({
        "id": id,
        "type": "person",
        "properties": {"1": firstname, "2": lastname}
    })
}

fn ids(range: std::ops::RangeInclusive<u64>) -> Vec<InstanceId> {
    range.map(InstanceId::new).collect()
}

fn member_ids(group: &[kartei_model::Instance]) -> Vec<u64> {
    group.iter().map(|i| i.id.value()).collect()
}

// ── Grouping ────────────────────────────────────────────────────

#[tokio::test]
async fn groups_records_with_matching_values() {
    let server = MockServer::start().await;
    mount_person_definition(&server).await;
    mount_records(
        &server,
        "/object/1,2,3",
        vec![
            person(1, "Anna", "Smith"),
            person(2, "Bea", "Smith"),
            person(3, "Carl", "Jones"),
        ],
    )
    .await;

    let aggregator = setup(&server);
    let groups = aggregator
        .aggregate(
            &ids(1..=3),
            "person",
            &[PropertyId::new(2)],
            DEFAULT_AGGREGATION_KEY,
        )
        .await
        .unwrap();

    // The two Smiths group; the lone Jones is not a group.
    assert_eq!(groups.len(), 1);
    assert_eq!(member_ids(&groups[0]), vec![1, 2]);

    assert!(aggregator.has_aggregated(DEFAULT_AGGREGATION_KEY));
    assert_eq!(aggregator.get_aggregated(DEFAULT_AGGREGATION_KEY), groups);
}

#[tokio::test]
async fn tuples_group_in_first_appearance_order() {
    let server = MockServer::start().await;
    mount_person_definition(&server).await;
    mount_records(
        &server,
        "/object/1,2,3,4,5",
        vec![
            person(1, "Anna", "Smith"),
            person(2, "Anna", "Jones"),
            person(3, "Anna", "Smith"),
            person(4, "Bea", "Krause"),
            person(5, "Bea", "Krause"),
        ],
    )
    .await;

    let aggregator = setup(&server);
    let groups = aggregator
        .aggregate(
            &ids(1..=5),
            "person",
            &[PropertyId::new(1), PropertyId::new(2)],
            "names",
        )
        .await
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(member_ids(&groups[0]), vec![1, 3]);
    assert_eq!(member_ids(&groups[1]), vec![4, 5]);
}

#[tokio::test]
async fn all_empty_records_are_excluded() {
    let server = MockServer::start().await;
    mount_person_definition(&server).await;
    mount_records(
        &server,
        "/object/1,2",
        vec![person(1, "", ""), person(2, "", "")],
    )
    .await;

    let aggregator = setup(&server);
    let groups = aggregator
        .aggregate(
            &ids(1..=2),
            "person",
            &[PropertyId::new(1), PropertyId::new(2)],
            DEFAULT_AGGREGATION_KEY,
        )
        .await
        .unwrap();

    // Their empty tuples agree, but all-empty records never group.
    assert!(groups.is_empty());
    assert!(aggregator.has_aggregated(DEFAULT_AGGREGATION_KEY));
}

#[tokio::test]
async fn partially_empty_tuples_still_group() {
    let server = MockServer::start().await;
    mount_person_definition(&server).await;
    mount_records(
        &server,
        "/object/1,2",
        vec![person(1, "", "Smith"), person(2, "", "Smith")],
    )
    .await;

    let aggregator = setup(&server);
    let groups = aggregator
        .aggregate(
            &ids(1..=2),
            "person",
            &[PropertyId::new(1), PropertyId::new(2)],
            DEFAULT_AGGREGATION_KEY,
        )
        .await
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(member_ids(&groups[0]), vec![1, 2]);
}

#[tokio::test]
async fn date_properties_group_by_rendered_form() {
    let server = MockServer::start().await;
    mount_person_definition(&server).await;
    mount_records(
        &server,
        "/object/1,2,3",
        vec![
            json!({"id": 1, "type": "person", "properties": {"3": "1990-04-12"}}),
            json!({"id": 2, "type": "person", "properties": {"3": "1990-04-12"}}),
            json!({"id": 3, "type": "person", "properties": {"3": "not a date"}}),
        ],
    )
    .await;

    let aggregator = setup(&server);
    let groups = aggregator
        .aggregate(
            &ids(1..=3),
            "person",
            &[PropertyId::new(3)],
            DEFAULT_AGGREGATION_KEY,
        )
        .await
        .unwrap();

    // The unparsable birthday renders empty, excluding record 3.
    assert_eq!(groups.len(), 1);
    assert_eq!(member_ids(&groups[0]), vec![1, 2]);
}

// ── Validation ──────────────────────────────────────────────────

#[tokio::test]
async fn type_mismatch_fails_the_whole_call() {
    let server = MockServer::start().await;
    mount_person_definition(&server).await;
    Mock::given(method("GET"))
        .and(path("/definition/company"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "properties": [{"id": 10, "title": "name", "datatype": "plain", "default": ""}]
        })))
        .mount(&server)
        .await;
    mount_records(
        &server,
        "/object/1,2,3",
        vec![
            person(1, "Anna", "Smith"),
            person(2, "Bea", "Smith"),
            json!({"id": 3, "type": "company", "properties": {"10": "Acme"}}),
        ],
    )
    .await;

    let aggregator = setup(&server);
    let err = aggregator
        .aggregate(
            &ids(1..=3),
            "person",
            &[PropertyId::new(2)],
            DEFAULT_AGGREGATION_KEY,
        )
        .await
        .unwrap_err();

    match err {
        CacheError::TypeMismatch {
            id,
            expected,
            found,
        } => {
            assert_eq!(id, InstanceId::new(3));
            assert_eq!(expected, "person");
            assert_eq!(found, "company");
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
    assert!(!aggregator.has_aggregated(DEFAULT_AGGREGATION_KEY));
}

#[tokio::test]
async fn unknown_property_fails_the_call() {
    let server = MockServer::start().await;
    mount_person_definition(&server).await;
    mount_records(
        &server,
        "/object/1,2",
        vec![person(1, "Anna", "Smith"), person(2, "Bea", "Smith")],
    )
    .await;

    let aggregator = setup(&server);
    let err = aggregator
        .aggregate(
            &ids(1..=2),
            "person",
            &[PropertyId::new(99)],
            DEFAULT_AGGREGATION_KEY,
        )
        .await
        .unwrap_err();

    match err {
        CacheError::UnknownProperty { property_id } => {
            assert_eq!(property_id, PropertyId::new(99));
        }
        other => panic!("expected UnknownProperty, got {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_property_id_fails_the_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/definition/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "properties": [
                {"id": 7, "title": "first", "datatype": "plain", "default": ""},
                {"id": 7, "title": "second", "datatype": "plain", "default": ""}
            ]
        })))
        .mount(&server)
        .await;
    mount_records(
        &server,
        "/object/1,2",
        vec![
            json!({"id": 1, "type": "broken", "properties": {"7": "x"}}),
            json!({"id": 2, "type": "broken", "properties": {"7": "x"}}),
        ],
    )
    .await;

    let aggregator = setup(&server);
    let err = aggregator
        .aggregate(
            &ids(1..=2),
            "broken",
            &[PropertyId::new(7)],
            DEFAULT_AGGREGATION_KEY,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, CacheError::UnknownProperty { .. }));
}

#[tokio::test]
async fn fetch_failure_fails_the_aggregation() {
    let server = MockServer::start().await;
    mount_person_definition(&server).await;
    // Record 2 is missing from the batch, so its fetch fails.
    mount_records(&server, "/object/1,2", vec![person(1, "Anna", "Smith")]).await;

    let aggregator = setup(&server);
    let err = aggregator
        .aggregate(
            &ids(1..=2),
            "person",
            &[PropertyId::new(2)],
            DEFAULT_AGGREGATION_KEY,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, CacheError::LoadFailed { .. }));
    assert!(!aggregator.has_aggregated(DEFAULT_AGGREGATION_KEY));
}

// ── Result lifecycle ────────────────────────────────────────────

#[tokio::test]
async fn reaggregation_is_idempotent() {
    let server = MockServer::start().await;
    mount_person_definition(&server).await;
    // One call: the second aggregation is served from the record cache.
    mount_records(
        &server,
        "/object/1,2",
        vec![person(1, "Anna", "Smith"), person(2, "Bea", "Smith")],
    )
    .await;

    let aggregator = setup(&server);
    let first = aggregator
        .aggregate(
            &ids(1..=2),
            "person",
            &[PropertyId::new(2)],
            DEFAULT_AGGREGATION_KEY,
        )
        .await
        .unwrap();
    let second = aggregator
        .aggregate(
            &ids(1..=2),
            "person",
            &[PropertyId::new(2)],
            DEFAULT_AGGREGATION_KEY,
        )
        .await
        .unwrap();

    assert_eq!(first, second);
    assert!(aggregator.has_aggregated(DEFAULT_AGGREGATION_KEY));
}

#[tokio::test]
async fn new_result_replaces_the_previous_one() {
    let server = MockServer::start().await;
    mount_person_definition(&server).await;
    mount_records(
        &server,
        "/object/1,2",
        vec![person(1, "Anna", "Smith"), person(2, "Bea", "Smith")],
    )
    .await;
    mount_records(
        &server,
        "/object/3,4",
        vec![person(3, "Carl", "Jones"), person(4, "Dora", "Krause")],
    )
    .await;

    let aggregator = setup(&server);
    let first = aggregator
        .aggregate(
            &ids(1..=2),
            "person",
            &[PropertyId::new(2)],
            DEFAULT_AGGREGATION_KEY,
        )
        .await
        .unwrap();
    assert_eq!(first.len(), 1);

    let second = aggregator
        .aggregate(
            &ids(3..=4),
            "person",
            &[PropertyId::new(2)],
            DEFAULT_AGGREGATION_KEY,
        )
        .await
        .unwrap();
    assert!(second.is_empty());
    assert_eq!(aggregator.get_aggregated(DEFAULT_AGGREGATION_KEY), second);
}

#[tokio::test]
async fn separate_keys_coexist() {
    let server = MockServer::start().await;
    mount_person_definition(&server).await;
    mount_records(
        &server,
        "/object/1,2",
        vec![person(1, "Anna", "Smith"), person(2, "Bea", "Smith")],
    )
    .await;
    mount_records(
        &server,
        "/object/3,4",
        vec![person(3, "Carl", "Jones"), person(4, "Dora", "Krause")],
    )
    .await;

    let aggregator = setup(&server);
    let by_name = aggregator
        .aggregate(&ids(1..=2), "person", &[PropertyId::new(2)], "by_name")
        .await
        .unwrap();
    let by_birthday = aggregator
        .aggregate(&ids(3..=4), "person", &[PropertyId::new(3)], "by_birthday")
        .await
        .unwrap();

    assert_eq!(by_name.len(), 1);
    assert!(by_birthday.is_empty());
    assert_eq!(aggregator.get_aggregated("by_name"), by_name);
    assert_eq!(aggregator.get_aggregated("by_birthday"), by_birthday);
}

#[tokio::test]
async fn readiness_subscription_observes_completion() {
    let server = MockServer::start().await;
    mount_person_definition(&server).await;
    mount_records(
        &server,
        "/object/1,2",
        vec![person(1, "Anna", "Smith"), person(2, "Bea", "Smith")],
    )
    .await;

    let aggregator = setup(&server);
    let mut rx = aggregator.subscribe_aggregated("dupes");
    assert!(!*rx.borrow_and_update());
    assert!(!aggregator.has_aggregated("dupes"));

    aggregator
        .aggregate(&ids(1..=2), "person", &[PropertyId::new(2)], "dupes")
        .await
        .unwrap();

    assert!(*rx.borrow_and_update());
}
