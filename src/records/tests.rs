//! Record fetch tests

use super::*;
use crate::error::ErrorKind;
use crate::store::MemoryConnector;
use crate::types::FieldTypeCode;
use bson::{doc, oid::ObjectId, Document};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn db_config() -> Value {
    json!({
        "MONGODB_HOST": "localhost",
        "MONGODB_PORT": "27017",
        "MONGODB_USERNAME": "",
        "MONGODB_PASSWORD": "",
        "MONGODB_NAME": "test",
        "TABLE_NAME": "users"
    })
}

fn mappings() -> Value {
    json!([
        { "sourceFieldId": "fid_1", "sourceFieldName": "name", "targetFieldType": 1, "enabled": true },
        { "sourceFieldId": "fid_2", "sourceFieldName": "age", "targetFieldType": 2, "enabled": true },
        { "sourceFieldId": "fid_3", "sourceFieldName": "email", "targetFieldType": 1, "enabled": false }
    ])
}

fn config() -> Value {
    json!({ "dbConfig": db_config(), "fieldMappings": mappings() })
}

fn users(count: i64) -> Vec<Document> {
    (1..=count)
        .map(|i| {
            doc! {
                "_id": i,
                "name": format!("user-{i}"),
                "age": format!("{}", 20 + i),
                "email": format!("user{i}@example.com"),
            }
        })
        .collect()
}

fn connector(count: i64) -> MemoryConnector {
    MemoryConnector::new().with_collection("users", users(count))
}

fn primary_ids(page: &RecordPage) -> Vec<&str> {
    page.records.iter().map(|r| r.primary_id.as_str()).collect()
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_page_with_more_records() {
    let connector = connector(3);
    let request = RecordsRequest::new(config()).with_max_page_size(2);

    let page = fetch_records(&connector, &request).await.unwrap();

    assert_eq!(page.records.len(), 2);
    assert!(page.has_more);
    assert_eq!(page.next_page_token, "2");
    assert_eq!(primary_ids(&page), vec!["1", "2"]);
}

#[tokio::test]
async fn test_last_page() {
    let connector = connector(3);
    let request = RecordsRequest::new(config()).with_max_page_size(10);

    let page = fetch_records(&connector, &request).await.unwrap();

    assert_eq!(page.records.len(), 3);
    assert!(!page.has_more);
    assert_eq!(page.next_page_token, "");
}

#[tokio::test]
async fn test_exact_page_size_has_no_more() {
    let connector = connector(2);
    let request = RecordsRequest::new(config()).with_max_page_size(2);

    let page = fetch_records(&connector, &request).await.unwrap();

    assert_eq!(page.records.len(), 2);
    assert!(!page.has_more);
    assert!(page.next_page_token.is_empty());
}

#[tokio::test]
async fn test_pages_are_disjoint_and_complete() {
    let connector = connector(5);
    let mut seen = Vec::new();
    let mut token = String::new();
    let mut calls = 0;

    loop {
        let request = RecordsRequest::new(config())
            .with_max_page_size(2)
            .with_page_token(token.clone());
        let page = fetch_records(&connector, &request).await.unwrap();
        calls += 1;

        for record in &page.records {
            if let Some(previous) = seen.last() {
                let current: i64 = record.primary_id.parse().unwrap();
                assert!(current > *previous, "records must advance strictly");
            }
            seen.push(record.primary_id.parse::<i64>().unwrap());
        }

        if !page.has_more {
            break;
        }
        token = page.next_page_token;
    }

    assert_eq!(calls, 3);
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_object_id_tokens_round_trip() {
    let ids: Vec<ObjectId> = [
        "65a4f0c2e4b0a1b2c3d4e5f1",
        "65a4f0c2e4b0a1b2c3d4e5f2",
        "65a4f0c2e4b0a1b2c3d4e5f3",
    ]
    .iter()
    .map(|s| ObjectId::parse_str(s).unwrap())
    .collect();
    let connector = MemoryConnector::new().with_collection(
        "users",
        ids.iter().rev().map(|id| doc! { "_id": *id, "name": id.to_hex() }),
    );

    let first = fetch_records(&connector, &RecordsRequest::new(config()).with_max_page_size(1))
        .await
        .unwrap();
    assert_eq!(first.next_page_token, ids[0].to_hex());

    let second = fetch_records(
        &connector,
        &RecordsRequest::new(config())
            .with_max_page_size(1)
            .with_page_token(first.next_page_token.clone()),
    )
    .await
    .unwrap();
    assert_eq!(primary_ids(&second), vec![ids[1].to_hex().as_str()]);
}

#[tokio::test]
async fn test_string_identity_with_explicit_id_type() {
    let mut db = db_config();
    db["ID_TYPE"] = json!("string");
    let config = json!({ "dbConfig": db, "fieldMappings": [] });
    let connector = MemoryConnector::new().with_collection(
        "users",
        vec![doc! { "_id": "10" }, doc! { "_id": "2" }, doc! { "_id": "30" }],
    );

    let page = fetch_records(
        &connector,
        &RecordsRequest::new(config).with_page_token("2"),
    )
    .await
    .unwrap();

    assert_eq!(primary_ids(&page), vec!["30"]);
}

#[tokio::test]
async fn test_numeric_looking_string_ids_page_completely() {
    let connector = MemoryConnector::new().with_collection(
        "users",
        vec![doc! { "_id": "0003" }, doc! { "_id": "0001" }, doc! { "_id": "0002" }],
    );
    let config = json!({ "dbConfig": db_config(), "fieldMappings": [] });

    let first = fetch_records(&connector, &RecordsRequest::new(config.clone()).with_max_page_size(2))
        .await
        .unwrap();
    assert_eq!(primary_ids(&first), vec!["0001", "0002"]);
    assert!(first.has_more);
    assert_eq!(first.next_page_token, "0002");

    let second = fetch_records(
        &connector,
        &RecordsRequest::new(config)
            .with_max_page_size(2)
            .with_page_token(first.next_page_token.clone()),
    )
    .await
    .unwrap();
    assert_eq!(primary_ids(&second), vec!["0003"]);
    assert!(!second.has_more);
}

#[tokio::test]
async fn test_hex_and_fractional_ids_page_completely() {
    let hex_ids = [
        "65a4f0c2e4b0a1b2c3d4e5f1",
        "65a4f0c2e4b0a1b2c3d4e5f2",
        "65a4f0c2e4b0a1b2c3d4e5f3",
    ];
    let cases: Vec<Vec<Document>> = vec![
        hex_ids.iter().map(|id| doc! { "_id": *id }).collect(),
        [0.5, 1.5, 2.5].iter().map(|id| doc! { "_id": *id }).collect(),
    ];

    for documents in cases {
        let connector = MemoryConnector::new().with_collection("users", documents);
        let mut token = String::new();
        let mut seen = 0;

        loop {
            let request = RecordsRequest::new(config())
                .with_max_page_size(1)
                .with_page_token(token.clone());
            let page = fetch_records(&connector, &request).await.unwrap();
            seen += page.records.len();
            if !page.has_more {
                break;
            }
            token = page.next_page_token;
        }

        assert_eq!(seen, 3);
    }
}

#[tokio::test]
async fn test_missing_custom_identity_with_more_pages() {
    let mut db = db_config();
    db["ID_FIELD"] = json!("uid");
    let config = json!({ "dbConfig": db, "fieldMappings": [] });
    let connector = MemoryConnector::new().with_collection(
        "users",
        vec![doc! { "name": "a" }, doc! { "name": "b" }],
    );

    let err = fetch_records(&connector, &RecordsRequest::new(config).with_max_page_size(1))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Query);
    assert!(err.to_string().contains("'uid'"));
    assert_eq!(connector.closed(), 1);
}

#[tokio::test]
async fn test_default_page_size() {
    let connector = connector(101);

    let page = fetch_records(&connector, &RecordsRequest::new(config()))
        .await
        .unwrap();

    assert_eq!(page.records.len(), DEFAULT_PAGE_SIZE);
    assert!(page.has_more);
    assert_eq!(page.next_page_token, "100");
}

// ============================================================================
// Projection
// ============================================================================

#[tokio::test]
async fn test_disabled_mapping_contributes_no_key() {
    let page = fetch_records(&connector(1), &RecordsRequest::new(config()))
        .await
        .unwrap();

    let record = &page.records[0];
    assert_eq!(record.primary_id, "1");
    assert_eq!(
        Value::Object(record.data.clone()),
        json!({ "fid_1": "user-1", "fid_2": 21 })
    );
    assert!(!record.data.contains_key("fid_3"));
}

#[tokio::test]
async fn test_date_and_multi_select_mappings() {
    let when = bson::DateTime::from_millis(1_705_314_600_000);
    let connector = MemoryConnector::new().with_collection(
        "users",
        vec![doc! { "_id": 1, "created": when, "tag": "vip", "tags": ["a", "b"] }],
    );
    let config = json!({
        "dbConfig": db_config(),
        "fieldMappings": [
            { "sourceFieldId": "created", "sourceFieldName": "created", "targetFieldType": 5, "enabled": true },
            { "sourceFieldId": "tag", "sourceFieldName": "tag", "targetFieldType": 4, "enabled": true },
            { "sourceFieldId": "tags", "sourceFieldName": "tags", "targetFieldType": 4, "enabled": true },
            { "sourceFieldId": "raw", "sourceFieldName": "created", "enabled": true }
        ]
    });

    let page = fetch_records(&connector, &RecordsRequest::new(config))
        .await
        .unwrap();
    let data = &page.records[0].data;

    assert_eq!(data["created"], json!(1_705_314_600_000_i64));
    assert!(data["created"].is_i64());
    assert_eq!(data["tag"], json!(["vip"]));
    assert_eq!(data["tags"], json!(["a", "b"]));
    assert_eq!(data["raw"], json!(1_705_314_600_000_i64));
}

#[tokio::test]
async fn test_lookup_falls_back_to_field_id() {
    let connector =
        MemoryConnector::new().with_collection("users", vec![doc! { "_id": 1, "fid_9": "by id" }]);
    let config = json!({
        "dbConfig": db_config(),
        "fieldMappings": [
            { "sourceFieldId": "fid_9", "sourceFieldName": "renamed", "targetFieldType": 1, "enabled": true }
        ]
    });

    let page = fetch_records(&connector, &RecordsRequest::new(config))
        .await
        .unwrap();

    assert_eq!(page.records[0].data["fid_9"], json!("by id"));
}

#[test]
fn test_mapping_target_type() {
    let mapping: FieldMapping = serde_json::from_value(json!({
        "sourceFieldId": "a", "sourceFieldName": "a", "targetFieldType": "8", "enabled": true
    }))
    .unwrap();
    assert_eq!(mapping.target_type(), Some(FieldTypeCode::Currency));

    let mapping: FieldMapping = serde_json::from_value(json!({
        "sourceFieldId": "a", "targetFieldType": 99
    }))
    .unwrap();
    assert_eq!(mapping.target_type(), None);
    assert!(!mapping.enabled);

    let mapping = FieldMapping::new("a", "a", FieldTypeCode::Rating).disabled();
    assert_eq!(mapping.target_type(), Some(FieldTypeCode::Rating));
    assert!(!mapping.enabled);
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_config_as_json_string() {
    let request = RecordsRequest::new(Value::String(config().to_string())).with_max_page_size(1);

    let page = fetch_records(&connector(2), &request).await.unwrap();

    assert_eq!(page.records.len(), 1);
}

#[tokio::test]
async fn test_missing_db_config_is_config_error() {
    let connector = connector(1);
    let request = RecordsRequest::new(json!({ "fieldMappings": mappings() }));

    let err = fetch_records(&connector, &request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("Failed to parse datasourceConfig"));
    assert!(err.to_string().contains("dbConfig"));
    assert_eq!(connector.opened(), 0);
}

#[tokio::test]
async fn test_missing_field_mappings_is_config_error() {
    let request = RecordsRequest::new(json!({ "dbConfig": db_config(), "fieldMappings": null }));

    let err = fetch_records(&connector(1), &request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("fieldMappings"));
}

#[tokio::test]
async fn test_invalid_config_shapes() {
    for value in [json!(42), json!(null), json!("{not json"), json!("[1, 2]")] {
        let err = fetch_records(&connector(1), &RecordsRequest::new(value.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config, "{value}");
    }
}

#[tokio::test]
async fn test_invalid_page_size() {
    for size in [json!(0), json!(-5), json!("many")] {
        let request: RecordsRequest = serde_json::from_value(json!({
            "datasourceConfig": config(),
            "maxPageSize": size
        }))
        .unwrap();

        let err = fetch_records(&connector(1), &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    let request: RecordsRequest = serde_json::from_value(json!({
        "datasourceConfig": config(),
        "maxPageSize": i64::MAX
    }))
    .unwrap();
    assert_eq!(request.page_size().unwrap(), i64::MAX as usize);
    let page = fetch_records(&connector(3), &request).await.unwrap();
    assert_eq!(page.records.len(), 3);
    assert!(!page.has_more);

    let request: RecordsRequest = serde_json::from_value(json!({
        "datasourceConfig": config(),
        "maxPageSize": "2",
        "pageToken": null
    }))
    .unwrap();
    let page = fetch_records(&connector(3), &request).await.unwrap();
    assert_eq!(page.records.len(), 2);
}

// ============================================================================
// Failures and resource release
// ============================================================================

#[tokio::test]
async fn test_connection_error() {
    let connector = connector(1).failing_open("authentication failed");

    let err = fetch_records(&connector, &RecordsRequest::new(config()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err
        .to_string()
        .contains("Failed to get table records from MongoDB: authentication failed"));
}

#[tokio::test]
async fn test_query_error_releases_connection() {
    let connector = connector(1).failing_query("cursor not found");

    let err = fetch_records(&connector, &RecordsRequest::new(config()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Query);
    assert_eq!(connector.opened(), 1);
    assert_eq!(connector.closed(), 1);
}

#[tokio::test]
async fn test_success_releases_connection() {
    let connector = connector(3);

    fetch_records(&connector, &RecordsRequest::new(config()))
        .await
        .unwrap();

    assert_eq!(connector.opened(), 1);
    assert_eq!(connector.closed(), 1);
}
