use std::time::Duration;

use memorable_cli::api::ApiClient;
use memorable_cli::error::ApiError;
use memorable_cli::library::{BookmarkList, CategoryFilter, DisplayType, DocumentList};
use memorable_cli::mock::MockStore;
use memorable_cli::model::{Document, DocumentKind, NewWorksheet};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The client is blocking, so it has to run off the async test runtime.
async fn with_client<T, F>(server: &MockServer, f: F) -> T
where
    T: Send + 'static,
    F: FnOnce(ApiClient) -> T + Send + 'static,
{
    let base_url = server.uri();
    tokio::task::spawn_blocking(move || {
        let client = ApiClient::with_store(&base_url, Duration::from_secs(5), MockStore::seeded())
            .expect("client builds");
        f(client)
    })
    .await
    .expect("blocking task panicked")
}

fn worksheet_json(id: i64, category: &str, bookmarked: bool) -> serde_json::Value {
    json!({
        "worksheetId": id,
        "name": format!("Worksheet {id}"),
        "category": category,
        "isBookmark": bookmarked,
        "worksheetCreateDate": "2024-07-01T09:00:00.123456"
    })
}

fn worksheet_detail_json() -> serde_json::Value {
    json!({
        "worksheetId": 5,
        "name": "Photosynthesis",
        "category": "Science",
        "content": "Plants turn light into sugar.",
        "answer": ["light", "sugar"],
        "isCompleteAllBlanks": [true, false],
        "isAddWorksheet": false,
        "isMakeTestSheet": true,
        "recentDate": "2024-07-02T10:00:00"
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn fetches_worksheet_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/worksheet/user/alice"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([worksheet_json(1, "Math", false), worksheet_json(2, "Science", true)])),
        )
        .mount(&server)
        .await;

    let sheets = with_client(&server, |c| c.get_worksheets("alice")).await.unwrap();
    assert_eq!(sheets.len(), 2);
    assert_eq!(sheets[1].category, "Science");
    assert!(sheets[1].is_bookmarked);
}

#[tokio::test(flavor = "multi_thread")]
async fn fetches_worksheet_detail_and_most_recent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/worksheet/ws/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(worksheet_detail_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/worksheet/recentDate/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(worksheet_detail_json()))
        .mount(&server)
        .await;

    let (detail, recent) = with_client(&server, |c| (c.get_worksheet(5), c.get_most_recent_worksheet("alice"))).await;
    let detail = detail.unwrap();
    assert_eq!(detail.answer, vec!["light", "sugar"]);
    assert!(detail.is_make_test_sheet);
    assert!(detail.recent_date.is_some());
    assert_eq!(recent.unwrap().worksheet_id, 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn creates_worksheet_with_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/worksheet"))
        .and(body_json(json!({
            "userId": "alice",
            "name": "Photosynthesis",
            "category": "Science",
            "content": "Plants turn light into sugar."
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(worksheet_detail_json()))
        .expect(1)
        .mount(&server)
        .await;

    let request = NewWorksheet {
        user_id: "alice".into(),
        name: "Photosynthesis".into(),
        category: "Science".into(),
        content: "Plants turn light into sugar.".into(),
    };
    let detail = with_client(&server, move |c| c.create_worksheet(&request)).await.unwrap();
    assert_eq!(detail.name, "Photosynthesis");
}

#[tokio::test(flavor = "multi_thread")]
async fn patches_bookmark_and_recent_date() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/worksheet/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(worksheet_json(3, "Math", true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/worksheet/recentDate/3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (toggled, touched) = with_client(&server, |c| {
        (c.toggle_worksheet_bookmark(3), c.update_worksheet_recent_date(3))
    })
    .await;
    assert!(toggled.unwrap().is_bookmarked);
    touched.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn deletes_worksheet() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/worksheet/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    with_client(&server, |c| c.delete_worksheet(9)).await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn non_success_status_becomes_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/worksheet/ws/1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such worksheet"))
        .mount(&server)
        .await;

    let err = with_client(&server, |c| c.get_worksheet(1)).await.unwrap_err();
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such worksheet");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_body_becomes_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/worksheet/user/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "worksheetId": 1,
            "name": "Broken",
            "category": "Math",
            "isBookmark": false,
            "worksheetCreateDate": "last tuesday"
        }])))
        .mount(&server)
        .await;

    let err = with_client(&server, |c| c.get_worksheets("alice")).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "got {err:?}");
    assert!(err.to_string().contains("last tuesday"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_network_error() {
    let err = tokio::task::spawn_blocking(|| {
        let client = ApiClient::with_store("http://127.0.0.1:1", Duration::from_secs(2), MockStore::empty())
            .expect("client builds");
        client.get_worksheets("alice")
    })
    .await
    .unwrap()
    .unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn documents_merge_all_three_families() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/worksheet/user/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([worksheet_json(1, "Math", false)])))
        .mount(&server)
        .await;

    let documents = with_client(&server, |c| c.get_documents("alice")).await.unwrap();
    assert_eq!(documents.len(), 7);
    assert_eq!(documents[0].kind(), DocumentKind::Worksheet);
    assert_eq!(
        documents.iter().filter(|d| d.kind() == DocumentKind::Testsheet).count(),
        3
    );
    assert_eq!(
        documents.iter().filter(|d| d.kind() == DocumentKind::Wrongsheet).count(),
        3
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn documents_fail_when_worksheets_fail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/worksheet/user/alice"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = with_client(&server, |c| c.get_documents("alice")).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test(flavor = "multi_thread")]
async fn toggling_dispatches_by_kind() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/worksheet/user/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (before, after) = with_client(&server, |c| {
        let documents = c.get_documents("alice").unwrap();
        let science = documents
            .iter()
            .find(|d| d.kind() == DocumentKind::Wrongsheet && d.category() == "Science")
            .unwrap()
            .clone();
        let toggled = c.toggle_bookmark(&science).unwrap();
        (science, toggled)
    })
    .await;
    assert!(!before.is_bookmarked());
    assert!(after.is_bookmarked());
    assert_eq!(after.key(), before.key());
}

#[tokio::test(flavor = "multi_thread")]
async fn mock_families_delete_and_report_missing() {
    let server = MockServer::start().await;
    let (deleted, again) = with_client(&server, |c| {
        let testsheet = c.get_testsheets("alice").unwrap().remove(0);
        let doc: Document = testsheet.into();
        (c.delete_document(&doc), c.delete_document(&doc))
    })
    .await;
    deleted.unwrap();
    assert!(matches!(again, Err(ApiError::NotFound { kind: DocumentKind::Testsheet, id: 1 })));
}

#[tokio::test(flavor = "multi_thread")]
async fn renames_survive_a_reload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/worksheet/user/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([worksheet_json(1, "Math", true)])))
        .mount(&server)
        .await;

    let (list, bookmarks) = with_client(&server, |c| {
        let mut list = DocumentList::new();
        list.set_documents(c.get_documents("alice").unwrap(), CategoryFilter::All, DisplayType::All);

        for kind in [DocumentKind::Worksheet, DocumentKind::Testsheet] {
            let document = list.get(kind, 1).unwrap().clone();
            let renamed = c.rename_document(&document, &format!("Renamed {kind}")).unwrap();
            list.rename(renamed.kind(), renamed.id(), renamed.name()).unwrap();
        }

        list.set_documents(c.get_documents("alice").unwrap(), CategoryFilter::All, DisplayType::All);
        let mut bookmarks = BookmarkList::new();
        bookmarks.set_documents(list.documents().to_vec());
        (list, bookmarks)
    })
    .await;

    for kind in [DocumentKind::Worksheet, DocumentKind::Testsheet] {
        let expected = format!("Renamed {kind}");
        assert_eq!(list.get(kind, 1).unwrap().name(), expected);
        let bookmarked = bookmarks.visible().into_iter().find(|d| d.key() == (kind, 1)).unwrap();
        assert_eq!(bookmarked.name(), expected);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn mock_rename_reaches_detail() {
    let server = MockServer::start().await;
    let detail = with_client(&server, |c| {
        let doc: Document = c.get_wrongsheets("alice").unwrap().remove(0).into();
        c.rename_document(&doc, "Fractions").unwrap();
        c.get_wrongsheet(doc.id()).unwrap()
    })
    .await;
    assert_eq!(detail.name, "Fractions");
}
