use std::sync::Arc;

use hackerthink_admin::application::loader::{CancelScope, CollectionLoader, LoadError, LoadOutcome};
use hackerthink_admin::application::repos::{AdminApi, ApiError, CategorySource, ServerQuery};
use hackerthink_admin::domain::content::ContentKind;
use hackerthink_admin::infra::http::AdminClient;
use hackerthink_api_types::{PublicationStatus, Tutorial};
use httpmock::MockServer;
use serde_json::json;
use url::Url;

fn client(server: &MockServer, token: Option<&str>) -> AdminClient {
    let base = Url::parse(&server.base_url()).expect("base url");
    AdminClient::new(base, token.map(str::to_string)).expect("client")
}

#[tokio::test]
async fn fetch_sends_bearer_token_and_query() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/api/admin/tutorials")
            .header("authorization", "Bearer s3cret")
            .query_param("search", "async")
            .query_param("category", "Systems");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"tutorials":[{"id":1,"title":"Async Rust","is_active":"true"}]}"#);
    });

    let query = ServerQuery {
        search: Some("async".to_string()),
        status: None,
        category: Some("Systems".to_string()),
    };
    let body = client(&server, Some("s3cret"))
        .fetch_collection(ContentKind::Tutorials, &query)
        .await
        .expect("body");
    assert_eq!(body["tutorials"][0]["title"], "Async Rust");
    mock.assert();
}

#[tokio::test]
async fn loader_decodes_lenient_records() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/admin/tutorials");
        then.status(200)
            .header("content-type", "application/json")
            .body(
                r#"{"tutorials":[
                    {"id":1,"title":"Async Rust","is_active":1,"sections_count":"4"},
                    {"id":"t2","title":"Tokio","is_active":false}
                ]}"#,
            );
    });

    let loader = CollectionLoader::new(Arc::new(client(&server, None)));
    let scope = CancelScope::new();
    let outcome = loader
        .load::<Tutorial>(&ServerQuery::default(), &scope.token())
        .await
        .expect("loaded");
    let LoadOutcome::Loaded(loaded) = outcome else {
        panic!("load was not cancelled");
    };
    let ids: Vec<&str> = loaded.items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, ["1", "t2"]);
    assert!(loaded.items[0].is_active);
    assert!(!loaded.items[1].is_active);
}

#[tokio::test]
async fn duplicate_ids_are_rejected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/admin/tutorials");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id":1,"title":"A"},{"id":"1","title":"B"}]"#);
    });

    let loader = CollectionLoader::new(Arc::new(client(&server, None)));
    let err = loader
        .load::<Tutorial>(&ServerQuery::default(), &CancelScope::new().token())
        .await
        .expect_err("duplicate id");
    assert!(matches!(err, LoadError::DuplicateId { .. }));
}

#[tokio::test]
async fn error_status_carries_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("PATCH").path("/api/admin/news/9");
        then.status(422).body("status is invalid");
    });

    let err = client(&server, None)
        .patch_item(ContentKind::News, "9", json!({ "status": "published" }))
        .await
        .expect_err("unprocessable");
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, "status is invalid");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn mutations_hit_their_endpoints() {
    let server = MockServer::start();
    let patch = server.mock(|when, then| {
        when.method("PATCH")
            .path("/api/admin/news/1")
            .json_body_includes(r#"{"status":"draft"}"#);
        then.status(204);
    });
    let publish = server.mock(|when, then| {
        when.method("POST").path("/api/admin/interviews/7/publish");
        then.status(200).body("");
    });
    let delete = server.mock(|when, then| {
        when.method("DELETE").path("/api/admin/products/p-1");
        then.status(204);
    });
    let replace = server.mock(|when, then| {
        when.method("PUT")
            .path("/api/admin/interviews/7")
            .json_body_includes(r#"{"title":"AI Trends"}"#);
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"id":"7","title":"AI Trends","status":"published"}"#);
    });

    let client = client(&server, Some("session"));
    client
        .patch_item(ContentKind::News, "1", json!({ "status": "draft" }))
        .await
        .expect("patched");
    client
        .toggle_publish(ContentKind::Interviews, "7")
        .await
        .expect("toggled");
    client
        .delete_item(ContentKind::Products, "p-1")
        .await
        .expect("deleted");
    let body = client
        .replace_item(
            ContentKind::Interviews,
            "7",
            json!({ "id": "7", "title": "AI Trends", "status": "draft" }),
        )
        .await
        .expect("replaced");

    let record: hackerthink_api_types::Interview =
        serde_json::from_value(body).expect("interview");
    assert_eq!(record.status, PublicationStatus::Published);
    patch.assert();
    publish.assert();
    delete.assert();
    replace.assert();
}

#[tokio::test]
async fn categories_come_from_either_endpoint() {
    let server = MockServer::start();
    let admin = server.mock(|when, then| {
        when.method("GET").path("/api/admin/categories");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"categories":[{"id":1,"name":"Research"}]}"#);
    });
    let taxonomy = server.mock(|when, then| {
        when.method("GET").path("/api/admin/taxonomy/categories");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id":2,"name":"Agents","slug":"agents"}]"#);
    });

    let loader = CollectionLoader::new(Arc::new(client(&server, None)));
    let admin_categories = loader
        .load_categories(CategorySource::Admin)
        .await
        .expect("admin");
    let taxonomy_categories = loader
        .load_categories(CategorySource::Taxonomy)
        .await
        .expect("taxonomy");

    assert_eq!(admin_categories[0].name, "Research");
    assert_eq!(taxonomy_categories[0].id, "2");
    admin.assert();
    taxonomy.assert();
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let base = Url::parse("http://127.0.0.1:9").expect("base url");
    let client = AdminClient::new(base, None).expect("client");
    let err = client
        .fetch_collection(ContentKind::News, &ServerQuery::default())
        .await
        .expect_err("nothing listens on the discard port");
    assert!(matches!(err, ApiError::Transport(_)));
}
