//! `HttpMutationService` against a mocked backend.

use std::time::Duration;

use roughcode_business::{
    ApiError, ApiResult, BusinessConfig, CacheKey, Feedback, FeedbackContext, FeedbackId,
    FeedbackItems, FeedbackMutation, FeedbackReconciler, HttpMutationService, MutationService,
    Notices, QueryClient, REPORTED_NOTICE, build_state_ctx,
};
use roughcode_states::StateCtx;
use serde_json::json;
use tokio::runtime::Handle;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, HttpMutationService) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mock_server = MockServer::start().await;
    let config = BusinessConfig::new(mock_server.uri())
        .with_auth_token("test-token");
    let service = HttpMutationService::new(config, Handle::current());
    (mock_server, service)
}

/// Run a mutation through the callback interface and wait for its outcome.
async fn mutate(service: &HttpMutationService, mutation: FeedbackMutation) -> ApiResult<()> {
    let (send, recv) = flume::bounded(1);
    service.mutate(
        mutation,
        Box::new(move |result| {
            let _ = send.send(result);
        }),
    );
    recv.recv_async().await.expect("callback fires")
}

#[tokio::test]
async fn test_like_posts_with_bearer_token() {
    let (mock_server, service) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/project/feedback/5/like"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let like = FeedbackMutation::Like(FeedbackId::Project(5));
    let result = mutate(&service, like).await;
    assert_eq!(result, Ok(()));
}

#[tokio::test]
async fn test_edit_sends_json_body_per_feedback_kind() {
    let (mock_server, service) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/project/feedback"))
        .and(body_json(json!({ "feedbackId": 3, "content": "updated" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/code/review/feedback"))
        .and(body_json(json!({ "id": 9, "content": "fixed" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let project = FeedbackMutation::Edit {
        id: FeedbackId::Project(3),
        content: "updated".to_owned(),
    };
    let review = FeedbackMutation::Edit {
        id: FeedbackId::CodeReview(9),
        content: "fixed".to_owned(),
    };

    assert_eq!(mutate(&service, project).await, Ok(()));
    assert_eq!(mutate(&service, review).await, Ok(()));
}

#[tokio::test]
async fn test_report_and_delete_hit_review_endpoints() {
    let (mock_server, service) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/code/review/feedback/4/complaint"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/code/review/feedback/4"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = FeedbackMutation::Report(FeedbackId::CodeReview(4));
    let delete = FeedbackMutation::Delete(FeedbackId::CodeReview(4));
    assert_eq!(service.send(&report).await, Ok(()));
    assert_eq!(service.send(&delete).await, Ok(()));
}

#[tokio::test]
async fn test_server_error_maps_to_status() {
    let (mock_server, service) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/project/feedback/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let delete = FeedbackMutation::Delete(FeedbackId::Project(1));
    let result = mutate(&service, delete).await;
    assert_eq!(
        result,
        Err(ApiError::Status {
            status: 500,
            body: "boom".to_owned(),
        })
    );
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = BusinessConfig::new("http://127.0.0.1:1");
    let service = HttpMutationService::new(config, Handle::current());

    let result = service
        .send(&FeedbackMutation::Like(FeedbackId::Project(1)))
        .await;
    assert!(matches!(result, Err(ApiError::Network(_))), "{result:?}");
}

/// Pump updates into `ctx` until no action on `id` is in flight.
async fn settle(ctx: &mut StateCtx, id: FeedbackId) {
    for _ in 0..200 {
        ctx.sync();
        if !ctx.state::<FeedbackItems>().item(id).has_pending() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("mutation on {id:?} never settled");
}

fn review_row() -> FeedbackReconciler {
    let feedback: Feedback = serde_json::from_value(json!({
        "reReviewId": 4,
        "userId": 2,
        "userName": "bob",
        "liked": false,
        "like": 0,
        "content": "missing null check",
        "date": "2023-05-10T09:30:00",
    }))
    .expect("review feedback decodes");

    FeedbackReconciler::new(feedback, FeedbackContext::review(21, 7, false))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_report_round_trip_updates_context() {
    let (mock_server, service) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/code/review/feedback/4/complaint"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut ctx = build_state_ctx(BusinessConfig::new(mock_server.uri()), service);
    let row = review_row();

    row.report(&mut ctx).expect("report dispatches");
    assert!(!row.view(&ctx).force_close);

    settle(&mut ctx, FeedbackId::CodeReview(4)).await;

    assert!(row.view(&ctx).force_close);
    assert_eq!(
        ctx.state_mut::<Notices>().drain(),
        vec![REPORTED_NOTICE.to_owned()]
    );
    assert_eq!(
        ctx.state::<QueryClient>().invalidations(),
        vec![CacheKey::code_info(21), CacheKey::code_review_feedbacks(7)]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_like_leaves_cache_untouched() {
    let (mock_server, service) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/code/review/feedback/4/like"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut ctx = build_state_ctx(BusinessConfig::new(mock_server.uri()), service);
    let row = review_row();

    row.like(&mut ctx).expect("like dispatches");
    settle(&mut ctx, FeedbackId::CodeReview(4)).await;

    assert!(ctx.state::<QueryClient>().invalidations().is_empty());
    assert!(ctx.state::<Notices>().is_empty());
}
