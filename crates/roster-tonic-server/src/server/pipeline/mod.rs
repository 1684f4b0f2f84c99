//! The per-call interceptor pipeline.
//!
//! Every unary method runs through the same fixed chain, outermost first:
//!
//! 1. [`Recovery`] - turns a panic anywhere below into `Internal`.
//! 2. [`Logging`] - records method, duration and final status code, including
//!    for auth failures, recovered panics and cancelled calls.
//! 3. [`Authenticate`] - enforces [`Visibility`] and verifies the bearer
//!    token, attaching the caller's [`Identity`] to the call.
//! 4. The business handler, whose domain error is translated to a
//!    [`Status`] by the error boundary.
//!
//! Stages share one contract, [`Stage::handle`], and are composed inside
//! [`Pipeline::unary`] only, so no method can skip or reorder them.

mod auth;
mod logging;
mod recovery;

pub use auth::{Access, Authenticate, Visibility};
pub use logging::{CallRecord, CallSink, Logging, TracingSink};
pub use recovery::Recovery;

use futures::future::BoxFuture;
use roster_tonic_core::{error::translate, roster::Identity};
use std::{future::Future, sync::Arc};
use tonic::{Code, Request, Response, Status, metadata::MetadataMap};
use tracing::Instrument;

/// Outcome of a call as seen by the stages.
pub type CallResult<R> = Result<R, Status>;

/// Per-call state threaded through the stages.
#[derive(Debug)]
pub struct Call {
    method: &'static str,
    metadata: MetadataMap,
    identity: Option<Identity>,
}

impl Call {
    pub fn new(method: &'static str, metadata: MetadataMap) -> Self {
        Self {
            method,
            metadata,
            identity: None,
        }
    }

    /// Fully-qualified method path, e.g. `/auth.v1.AuthService/Login`.
    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn authenticate(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    fn into_identity(self) -> Option<Identity> {
        self.identity
    }
}

/// The remainder of the chain below a stage. Consumed by running it.
pub struct Next<'a, R> {
    inner: Box<dyn FnOnce(Call) -> BoxFuture<'a, CallResult<R>> + Send + 'a>,
}

impl<'a, R> Next<'a, R> {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Call) -> BoxFuture<'a, CallResult<R>> + Send + 'a,
    {
        Self { inner: Box::new(f) }
    }

    pub fn run(self, call: Call) -> BoxFuture<'a, CallResult<R>> {
        (self.inner)(call)
    }
}

/// One link of the chain.
///
/// A stage may inspect or amend the call, short-circuit with a [`Status`],
/// or run `next` and observe its result.
pub trait Stage: Send + Sync {
    fn handle<'a, R: Send + 'a>(
        &'a self,
        call: Call,
        next: Next<'a, R>,
    ) -> BoxFuture<'a, CallResult<R>>;
}

struct Stages {
    recovery: Recovery,
    logging: Logging,
    authenticate: Authenticate,
}

/// The composed chain. Cheap to clone; every service holds one.
#[derive(Clone)]
pub struct Pipeline {
    stages: Arc<Stages>,
}

impl Pipeline {
    pub fn new(recovery: Recovery, logging: Logging, authenticate: Authenticate) -> Self {
        Self {
            stages: Arc::new(Stages {
                recovery,
                logging,
                authenticate,
            }),
        }
    }

    pub fn visibility(&self) -> &Visibility {
        self.stages.authenticate.visibility()
    }

    /// Runs one unary call through the chain.
    ///
    /// `handler` receives the verified identity (`None` for public methods)
    /// and the request message. Its error is translated exactly once, here.
    pub async fn unary<'a, T, R, E, F, Fut>(
        &'a self,
        method: &'static str,
        request: Request<T>,
        handler: F,
    ) -> Result<Response<R>, Status>
    where
        T: Send + 'a,
        R: Send + 'a,
        E: std::error::Error + Send + 'static,
        F: FnOnce(Option<Identity>, T) -> Fut + Send + 'a,
        Fut: Future<Output = Result<R, E>> + Send + 'a,
    {
        let (metadata, _extensions, message) = request.into_parts();
        let call = Call::new(method, metadata);
        let stages = &*self.stages;

        let business = Next::new(move |call: Call| -> BoxFuture<'a, CallResult<R>> {
            Box::pin(async move {
                handler(call.into_identity(), message)
                    .await
                    .map_err(|err| error_boundary(method, &err))
            })
        });
        let authenticate = Next::new(move |call| stages.authenticate.handle(call, business));
        let logging = Next::new(move |call| stages.logging.handle(call, authenticate));

        stages
            .recovery
            .handle(call, logging)
            .instrument(tracing::info_span!("call", method))
            .await
            .map(Response::new)
    }
}

/// Translates a handler error and logs anything the caller will not see.
fn error_boundary(method: &'static str, err: &(dyn std::error::Error + 'static)) -> Status {
    let status = translate(err);
    if matches!(status.code(), Code::Internal | Code::Unknown) {
        tracing::error!(
            method,
            error = %err,
            causes = ?causes(err),
            code = ?status.code(),
            "call failed"
        );
    }
    status
}

fn causes(err: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}

#[cfg(test)]
mod tests;
