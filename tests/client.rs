use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get, post},
    Json, Router,
};
use notion_portfolio::{
    client::{FetchError, Filter, PageRequest, Sort},
    response::{ErrorCode, NotionId},
    NotionClient,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const PAGE: &str = "59833787-2cf9-4fdf-8782-e53db20768a5";
const DATA_SOURCE: &str = "248104cd-477e-80af-bc30-000bd28de8f9";

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    authorization: Option<String>,
    version: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|value| value.to_str().unwrap().to_string())
}

fn record(log: &Log, method: Method, headers: &HeaderMap, body: Bytes) {
    log.lock().unwrap().push(Seen {
        method,
        authorization: header(headers, "authorization"),
        version: header(headers, "notion-version"),
        content_type: header(headers, "content-type"),
        body: body.to_vec(),
    });
}

async fn serve(api: Router) -> NotionClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, api).await.unwrap() });

    NotionClient::with_base_url("secret_abc", &format!("http://{}/v1", address)).unwrap()
}

fn page_id() -> NotionId {
    PAGE.parse().unwrap()
}

fn page_json() -> Value {
    json!({
        "object": "page",
        "id": PAGE,
        "created_time": "2024-03-01T10:00:00.000Z",
        "last_edited_time": "2024-03-01T10:00:00.000Z",
        "parent": { "type": "workspace", "workspace": true },
        "archived": false,
        "in_trash": false,
        "icon": { "type": "emoji", "emoji": "🦀" },
        "cover": null,
        "properties": {
            "Name": {
                "id": "title",
                "type": "title",
                "title": [{ "plain_text": "Ferris", "href": null }]
            }
        },
        "url": "https://www.notion.so/59833787"
    })
}

fn empty_list() -> Value {
    json!({ "object": "list", "results": [], "next_cursor": null, "has_more": false })
}

#[tokio::test]
async fn sends_authentication_and_version() {
    let log = Log::default();
    let seen = log.clone();
    let client = serve(Router::new().route(
        &format!("/v1/pages/{}", PAGE),
        get(move |method: Method, headers: HeaderMap, body: Bytes| async move {
            record(&seen, method, &headers, body);
            Json(page_json())
        }),
    ))
    .await;

    let page = client.fetch(&PageRequest::new(page_id())).await.unwrap();

    assert_eq!(page.id, page_id());
    assert!(page.property("Name").is_some());

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, Method::GET);
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer secret_abc"));
    assert_eq!(seen[0].version.as_deref(), Some("2025-09-03"));
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
    assert!(seen[0].body.is_empty());
}

#[tokio::test]
async fn queries_are_posted_with_optional_bodies() {
    let log = Log::default();
    let seen = log.clone();
    let client = serve(Router::new().route(
        &format!("/v1/data_sources/{}/query", DATA_SOURCE),
        post(move |method: Method, headers: HeaderMap, body: Bytes| async move {
            record(&seen, method, &headers, body);
            Json(empty_list())
        }),
    ))
    .await;
    let id: NotionId = DATA_SOURCE.parse().unwrap();

    let bare = client.query_data_source(id, None, None).await.unwrap();
    let filtered = client
        .query_data_source(
            id,
            Some(Filter::checkbox_equals("Hidden", false)),
            Some(vec![Sort::ascending("Display Order")]),
        )
        .await
        .unwrap();

    assert!(bare.is_empty());
    assert!(filtered.is_empty());

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].method, Method::POST);
    assert!(seen[0].body.is_empty());
    assert_eq!(
        serde_json::from_slice::<Value>(&seen[1].body).unwrap(),
        json!({
            "filter": { "property": "Hidden", "checkbox": { "equals": false } },
            "sorts": [{ "property": "Display Order", "direction": "ascending" }]
        })
    );
}

#[tokio::test]
async fn reads_block_children() {
    let client = serve(Router::new().route(
        &format!("/v1/blocks/{}/children", PAGE),
        get(|| async {
            Json(json!({
                "object": "list",
                "results": [{
                    "object": "block",
                    "id": "eb39a20e-1036-4469-b750-a9df8f4f18df",
                    "parent": { "type": "page_id", "page_id": PAGE },
                    "created_time": "2021-11-13T17:35:00.000Z",
                    "last_edited_time": "2021-11-13T19:02:00.000Z",
                    "has_children": false,
                    "archived": false,
                    "type": "divider",
                    "divider": {}
                }],
                "next_cursor": "fe2cc560-036c-44cd-90e8-294d5a74cebc",
                "has_more": true
            }))
        }),
    ))
    .await;

    let blocks = client.get_block_children(page_id()).await.unwrap();

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].ty.name(), "divider");
}

#[tokio::test]
async fn remote_errors_keep_their_code() {
    let client = serve(Router::new().route(
        &format!("/v1/pages/{}", PAGE),
        get(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "object": "error",
                    "status": 401,
                    "code": "unauthorized",
                    "message": "API token is invalid."
                })),
            )
        }),
    ))
    .await;

    let error = client
        .fetch(&PageRequest::new(page_id()))
        .await
        .err()
        .unwrap();

    match &error {
        FetchError::Rejected {
            status,
            code,
            message,
            ..
        } => {
            assert_eq!(*status, StatusCode::UNAUTHORIZED);
            assert_eq!(*code, ErrorCode::Unauthorized);
            assert_eq!(message, "API token is invalid.");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(error
        .to_string()
        .ends_with("responded with 401 Unauthorized: unauthorized: API token is invalid."));
}

#[tokio::test]
async fn unreadable_errors_fall_back_to_raw_text() {
    let client = serve(Router::new().route(
        "/v1/{*rest}",
        any(|| async { (StatusCode::BAD_GATEWAY, "upstream went away") }),
    ))
    .await;

    let error = client
        .fetch(&PageRequest::new(page_id()))
        .await
        .err()
        .unwrap();

    match error {
        FetchError::Rejected { code, message, .. } => {
            assert_eq!(code, ErrorCode::Unknown);
            assert_eq!(message, "upstream went away");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn malformed_bodies_fail_to_decode() {
    let client = serve(Router::new().route(
        &format!("/v1/pages/{}", PAGE),
        get(|| async { "{\"object\": \"page\"" }),
    ))
    .await;

    let error = client
        .fetch(&PageRequest::new(page_id()))
        .await
        .err()
        .unwrap();

    assert!(matches!(error, FetchError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_hosts_are_transport_errors() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let client =
        NotionClient::with_base_url("secret_abc", &format!("http://{}/v1", address)).unwrap();
    let error = client
        .fetch(&PageRequest::new(page_id()))
        .await
        .err()
        .unwrap();

    assert!(matches!(error, FetchError::Transport { .. }));
}
