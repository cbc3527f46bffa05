mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{InMemoryDb, build_app};
use tower::ServiceExt;

const REQUESTS: usize = 50;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolutions_are_all_counted() {
    let db = InMemoryDb::new();
    let (owner_id, _) = db.issue_token("primary");
    let link = db.insert_link(owner_id, "burst1", "https://example.com/landing");
    let app = build_app(db.repositories(), false);

    let handles: Vec<_> = (0..REQUESTS)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                let request = Request::builder()
                    .uri("/burst1")
                    .body(Body::empty())
                    .unwrap();
                app.oneshot(request).await.unwrap()
            })
        })
        .collect();

    for handle in handles {
        let response = handle.await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://example.com/landing"
        );
    }

    assert_eq!(db.link(link.id).unwrap().clicks, REQUESTS as i64);
    assert_eq!(db.clicks_for(link.id).len(), REQUESTS);
}
