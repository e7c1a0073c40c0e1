use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, AppState, CHECK_PATH};
use solmask_core::encode::encode_mask;
use solmask_core::{MaskStore, RowPolicy};
use tower::ServiceExt;

async fn body_text(response: axum::response::Response) -> String {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_request(body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(CHECK_PATH)
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded;")
        .body(body.to_string())
        .unwrap()
}

/// A 4x2 mask whose right half is the target region.
fn state_with_mask(id: &str, consume: bool) -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let row = vec![false, false, true, true];
    std::fs::write(
        dir.path().join(format!("{id}.rle")),
        encode_mask(&[row.clone(), row]).unwrap(),
    )
    .unwrap();
    let state = AppState {
        store: MaskStore::new(dir.path(), RowPolicy::Strict),
        consume,
    };
    (dir, state)
}

// --- hello ---

#[tokio::test]
async fn hello_defaults_to_world() {
    let (_dir, state) = state_with_mask("m", false);
    let resp = app(state)
        .oneshot(Request::builder().uri("/").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[http::header::CACHE_CONTROL], "no-cache");
    assert_eq!(resp.headers()[http::header::CONNECTION], "close");
    assert_eq!(body_text(resp).await, "Hello, World!");
}

#[tokio::test]
async fn hello_uses_name_query() {
    let (_dir, state) = state_with_mask("m", false);
    let resp = app(state)
        .oneshot(Request::builder().uri("/?name=abc").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(body_text(resp).await, "Hello, abc!");
}

// --- check ---

#[tokio::test]
async fn check_inside_target_is_ok() {
    let (_dir, state) = state_with_mask("m", false);
    let resp = app(state)
        .oneshot(form_request("cid=m&csol=3%3A1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "OK");
}

#[tokio::test]
async fn check_outside_target_is_ko() {
    let (_dir, state) = state_with_mask("m", false);
    let resp = app(state)
        .oneshot(form_request("cid=m&csol=null&nojs_csol_x=0&nojs_csol_y=0"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "KO");
}

#[tokio::test]
async fn check_out_of_range_is_ko() {
    let (_dir, state) = state_with_mask("m", false);
    let resp = app(state)
        .oneshot(form_request("cid=m&csol=-1%3A0"))
        .await
        .unwrap();

    assert_eq!(body_text(resp).await, "KO");
}

#[tokio::test]
async fn check_unknown_mask_returns_404() {
    let (_dir, state) = state_with_mask("m", false);
    let resp = app(state)
        .oneshot(form_request("cid=other&csol=3%3A1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn check_bad_input_returns_400() {
    for body in ["csol=3%3A1", "cid=m", "cid=m&csol=abc", "cid=..%2Fm&csol=3%3A1"] {
        let (_dir, state) = state_with_mask("m", false);
        let resp = app(state).oneshot(form_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
    }
}

#[tokio::test]
async fn check_consumes_mask() {
    let (dir, state) = state_with_mask("m", true);
    let router = app(state);

    let resp = router
        .clone()
        .oneshot(form_request("cid=m&csol=3%3A1"))
        .await
        .unwrap();
    assert_eq!(body_text(resp).await, "OK");
    assert!(!dir.path().join("m.rle").exists());

    let resp = router
        .oneshot(form_request("cid=m&csol=3%3A1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn check_on_last_boundary_row_is_ko_and_consumes() {
    // The mask is 2 rows high; y == 2 is in range but has no stored row.
    let (dir, state) = state_with_mask("m", true);
    let resp = app(state)
        .oneshot(form_request("cid=m&csol=0%3A2"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "KO");
    assert!(!dir.path().join("m.rle").exists());
}
