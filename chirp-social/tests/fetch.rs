mod common;

use chirp_http::HttpError;
use chirp_social::twitter::{FetchOptions, SearchError, TEXT_COLUMN, TwitterApi};
use chirp_social::{Cell, Table};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/2/tweets/search/recent";
const TOKEN: &str = "test-bearer";

fn tweets(texts: &[&str]) -> Value {
    let data: Vec<Value> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| {
            json!({
                "id": format!("{}", 1000 + i),
                "text": t,
                "edit_history_tweet_ids": [format!("{}", 1000 + i)]
            })
        })
        .collect();
    json!({
        "data": data,
        "meta": { "result_count": texts.len(), "newest_id": "1000", "oldest_id": "1000" }
    })
}

fn api(server: &MockServer) -> TwitterApi {
    TwitterApi::with_base_url(&server.uri(), TOKEN.to_string()).expect("valid base url")
}

fn texts(table: &Table) -> Vec<String> {
    table
        .column(TEXT_COLUMN)
        .expect("text column")
        .into_iter()
        .map(Cell::to_string)
        .collect()
}

#[tokio::test]
async fn fetch_cleans_by_default() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("query", "rust lang"))
        .and(query_param("max_results", "100"))
        .and(header("authorization", "Bearer test-bearer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweets(&[
            "Check this out! https://example.com/x #cool @friend 😀",
            "Line one\nLine two",
            "HELLO #world",
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let table = api(&server)
        .fetch("rust lang", FetchOptions::default())
        .await
        .expect("fetch succeeds");

    assert_eq!(table.columns(), [TEXT_COLUMN.to_string()]);
    assert_eq!(
        texts(&table),
        vec![
            "check this out!  cool friend ",
            "line oneline two",
            "hello world"
        ]
    );
}

#[tokio::test]
async fn raw_fetch_keeps_original_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweets(&["HELLO #world"])))
        .expect(1)
        .mount(&server)
        .await;

    let table = api(&server)
        .fetch(
            "hello",
            FetchOptions {
                clean: false,
                count: 20,
            },
        )
        .await
        .unwrap();

    assert_eq!(texts(&table), vec!["HELLO #world"]);
}

#[tokio::test]
async fn small_counts_request_api_minimum_and_truncate() {
    let server = MockServer::start().await;
    let ten: Vec<String> = (0..10).map(|i| format!("post {i}")).collect();
    let ten_refs: Vec<&str> = ten.iter().map(String::as_str).collect();
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("max_results", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweets(&ten_refs)))
        .expect(1)
        .mount(&server)
        .await;

    let table = api(&server)
        .fetch(
            "anything",
            FetchOptions {
                clean: true,
                count: 5,
            },
        )
        .await
        .unwrap();

    assert_eq!(table.len(), 5);
    assert_eq!(texts(&table)[4], "post 4");
}

#[tokio::test]
async fn zero_matches_yield_an_empty_text_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"meta": {"result_count": 0}})),
        )
        .mount(&server)
        .await;

    let table = api(&server)
        .fetch("nothing matches this", FetchOptions::default())
        .await
        .unwrap();

    assert!(table.is_empty());
    assert_eq!(table.columns(), [TEXT_COLUMN.to_string()]);
}

#[tokio::test]
async fn auth_failure_propagates_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "title": "Unauthorized",
            "type": "about:blank",
            "status": 401,
            "detail": "Unauthorized"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = api(&server)
        .fetch("rust", FetchOptions::default())
        .await
        .unwrap_err();

    match err {
        SearchError::Http(ref http @ HttpError::Api { .. }) => {
            assert_eq!(http.status().map(|s| s.as_u16()), Some(401));
        }
        other => panic!("expected HTTP 401, got {other:?}"),
    }
}

#[tokio::test]
async fn out_of_range_counts_fail_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweets(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let api = api(&server);
    for count in [0, 4, 101, 500] {
        let err = api
            .fetch("rust", FetchOptions { clean: true, count })
            .await
            .unwrap_err();
        assert!(
            matches!(err, SearchError::CountOutOfRange { count: c } if c == count),
            "count {count} gave {err:?}"
        );
    }
}

#[tokio::test]
async fn in_range_counts_are_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweets(&["ok"])))
        .mount(&server)
        .await;

    let api = api(&server);
    for count in [5, 9, 10, 42, 100] {
        let table = api
            .fetch("rust", FetchOptions { clean: true, count })
            .await
            .unwrap_or_else(|e| panic!("count {count} failed: {e}"));
        assert_eq!(table.len(), 1);
    }
}

#[tokio::test]
async fn blank_query_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = api(&server)
        .fetch("   ", FetchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::EmptyQuery));
}

#[tokio::test]
async fn recent_search_exposes_meta() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("max_results", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweets(&["a", "b"])))
        .mount(&server)
        .await;

    let resp = api(&server).recent_search("x", 25).await.unwrap();
    assert_eq!(resp.tweets().len(), 2);
    assert_eq!(resp.tweets()[0].id, "1000");
    assert_eq!(resp.meta.and_then(|m| m.result_count), Some(2));
}
