use super::*;
use chrono::{Duration as TokenTtl, Utc};
use parking_lot::Mutex;
use roster_tonic_core::{
    methods,
    roster::{self, TokenCodec},
};
use std::{
    io,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use uuid::Uuid;

#[derive(Default)]
struct RecordingSink {
    records: Mutex<Vec<CallRecord>>,
}

impl RecordingSink {
    fn records(&self) -> Vec<CallRecord> {
        self.records.lock().clone()
    }
}

impl CallSink for RecordingSink {
    fn record(&self, record: CallRecord) {
        self.records.lock().push(record);
    }
}

struct Harness {
    pipeline: Pipeline,
    codec: Arc<TokenCodec>,
    sink: Arc<RecordingSink>,
    calls: AtomicUsize,
}

impl Harness {
    fn new() -> Self {
        let codec = Arc::new(TokenCodec::new(
            b"pipeline-test-secret",
            TokenTtl::hours(1),
            "roster-test",
        ));
        let sink = Arc::new(RecordingSink::default());
        let pipeline = Pipeline::new(
            Recovery::new(),
            Logging::new(sink.clone()),
            Authenticate::new(codec.clone(), Visibility::default()),
        );
        Self {
            pipeline,
            codec,
            sink,
            calls: AtomicUsize::new(0),
        }
    }

    fn token(&self) -> String {
        self.codec.issue(Uuid::new_v4(), "a@b.com").unwrap()
    }

    fn request(&self, authorization: Option<&str>) -> Request<&'static str> {
        let mut request = Request::new("payload");
        if let Some(value) = authorization {
            request
                .metadata_mut()
                .insert("authorization", value.parse().unwrap());
        }
        request
    }

    /// Runs a handler that counts invocations and echoes the caller's email.
    async fn echo(
        &self,
        method: &'static str,
        request: Request<&'static str>,
    ) -> Result<Response<Option<String>>, Status> {
        self.pipeline
            .unary(method, request, |identity, _message| async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, roster::Error>(identity.map(|id| id.email))
            })
            .await
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[tokio::test]
async fn protected_call_without_metadata_never_reaches_handler() {
    let h = Harness::new();

    let status = h
        .echo(methods::EMPLOYEE_GET, h.request(None))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::Unauthenticated);
    assert_eq!(status.message(), "missing metadata");
    assert_eq!(h.calls(), 0);
}

#[tokio::test]
async fn protected_call_with_bad_header_never_reaches_handler() {
    let h = Harness::new();

    let mut request = h.request(None);
    request.metadata_mut().insert("x-request-id", "7".parse().unwrap());
    let status = h.echo(methods::EMPLOYEE_GET, request).await.unwrap_err();
    assert_eq!(status.message(), "missing authorization header");

    let status = h
        .echo(methods::EMPLOYEE_GET, h.request(Some("Token abc")))
        .await
        .unwrap_err();
    assert_eq!(status.message(), "invalid authorization header format");

    assert_eq!(h.calls(), 0);
}

#[tokio::test]
async fn expired_or_forged_token_is_invalid_token() {
    let h = Harness::new();
    let expired = h
        .codec
        .issue_at(Uuid::new_v4(), "a@b.com", Utc::now() - TokenTtl::hours(2))
        .unwrap();
    let foreign = TokenCodec::new(b"another-secret", TokenTtl::hours(1), "roster-test")
        .issue(Uuid::new_v4(), "a@b.com")
        .unwrap();

    for token in [expired.as_str(), foreign.as_str(), "not.a.jwt"] {
        let header = format!("Bearer {token}");
        let status = h
            .echo(methods::SALARY_NET, h.request(Some(&header)))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);
        assert_eq!(status.message(), "invalid token");
    }
    assert_eq!(h.calls(), 0);
}

#[tokio::test]
async fn valid_token_injects_identity() {
    let h = Harness::new();
    let header = format!("Bearer {}", h.token());

    let response = h
        .echo(methods::EMPLOYEE_CREATE, h.request(Some(&header)))
        .await
        .unwrap();

    assert_eq!(response.into_inner().as_deref(), Some("a@b.com"));
    assert_eq!(h.calls(), 1);
}

#[tokio::test]
async fn public_methods_pass_without_credential() {
    let h = Harness::new();

    for method in [methods::AUTH_REGISTER, methods::AUTH_LOGIN] {
        let response = h.echo(method, h.request(None)).await.unwrap();
        assert_eq!(response.into_inner(), None);
    }
    assert_eq!(h.calls(), 2);
}

#[tokio::test]
async fn unknown_method_is_protected() {
    let h = Harness::new();
    let status = h
        .echo("/admin.v1.AdminService/Wipe", h.request(None))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
    assert_eq!(h.calls(), 0);
}

#[tokio::test]
async fn domain_errors_are_translated_once() {
    let h = Harness::new();

    let status = h
        .pipeline
        .unary(methods::AUTH_LOGIN, h.request(None), |_, _| async {
            Err::<(), _>(roster::Error::unauthorized("invalid credentials"))
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
    assert_eq!(status.message(), "invalid credentials");

    let status = h
        .pipeline
        .unary(methods::AUTH_REGISTER, h.request(None), |_, _| async {
            Err::<(), _>(roster::Error::internal(io::Error::other("disk on fire")))
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Internal);
    assert_eq!(status.message(), "internal server error");
}

#[tokio::test]
async fn foreign_errors_are_unknown() {
    let h = Harness::new();

    let status = h
        .pipeline
        .unary(methods::AUTH_REGISTER, h.request(None), |_, _| async {
            Err::<(), _>(io::Error::other("raw io"))
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::Unknown);
    assert_eq!(status.message(), "unknown error");
}

#[tokio::test]
async fn panic_becomes_internal_and_is_logged() {
    let h = Harness::new();

    let status = h
        .pipeline
        .unary(methods::AUTH_LOGIN, h.request(None), |_, _| async {
            if h.calls() == 0 {
                panic!("handler exploded");
            }
            Ok::<(), roster::Error>(())
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::Internal);
    assert_eq!(status.message(), "internal server error");

    let records = h.sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].method, methods::AUTH_LOGIN);
    assert_eq!(records[0].code, Code::Internal);
    assert!(records[0].duration >= Duration::ZERO);
}

#[tokio::test]
async fn every_outcome_is_recorded() {
    let h = Harness::new();
    let header = format!("Bearer {}", h.token());

    h.echo(methods::EMPLOYEE_GET, h.request(Some(&header)))
        .await
        .unwrap();
    h.echo(methods::EMPLOYEE_GET, h.request(None))
        .await
        .unwrap_err();

    let codes: Vec<_> = h.sink.records().into_iter().map(|r| r.code).collect();
    assert_eq!(codes, [Code::Ok, Code::Unauthenticated]);
}

#[tokio::test]
async fn cancelled_call_is_recorded() {
    let h = Harness::new();

    let call = h
        .pipeline
        .unary(methods::AUTH_LOGIN, h.request(None), |_, _| async {
            futures::future::pending::<Result<(), roster::Error>>().await
        });
    let outcome = tokio::time::timeout(Duration::from_millis(20), call).await;
    assert!(outcome.is_err());

    let records = h.sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].code, Code::Cancelled);
}

#[tokio::test]
async fn call_carries_identity_after_authentication() {
    let mut call = Call::new(methods::EMPLOYEE_GET, MetadataMap::new());
    assert!(call.identity().is_none());

    let id = Uuid::new_v4();
    call.authenticate(Identity {
        user_id: id,
        email: "a@b.com".into(),
    });
    assert_eq!(call.identity().map(|i| i.user_id), Some(id));
    assert_eq!(call.method(), methods::EMPLOYEE_GET);
}
