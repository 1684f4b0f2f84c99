//! Per-call outcome records.

use super::{Call, CallResult, Next, Stage};
use crate::server::telemetry;
use futures::{FutureExt, future::BoxFuture};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    time::{Duration, Instant},
};
use tonic::Code;

/// What the logging stage knows about a finished call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRecord {
    pub method: &'static str,
    pub duration: Duration,
    pub code: Code,
}

/// Destination for [`CallRecord`]s.
pub trait CallSink: Send + Sync {
    fn record(&self, record: CallRecord);
}

/// Writes each record as an `info` event and feeds the call metrics.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl CallSink for TracingSink {
    fn record(&self, record: CallRecord) {
        let duration_ms = record.duration.as_secs_f64() * 1_000.0;
        tracing::info!(
            method = record.method,
            duration_ms,
            code = ?record.code,
            "call finished"
        );
        telemetry::record_call(record.method, record.code, duration_ms);
    }
}

/// Emits exactly one record per call, however the call ends. If the call's
/// future is dropped before completing, the record says `Cancelled`.
struct CallGuard<'a> {
    sink: &'a dyn CallSink,
    method: &'static str,
    started: Instant,
    done: bool,
}

impl<'a> CallGuard<'a> {
    fn start(sink: &'a dyn CallSink, method: &'static str) -> Self {
        telemetry::increment_calls_inflight();
        Self {
            sink,
            method,
            started: Instant::now(),
            done: false,
        }
    }

    fn finish(mut self, code: Code) {
        self.emit(code);
    }

    fn emit(&mut self, code: Code) {
        self.done = true;
        telemetry::decrement_calls_inflight();
        self.sink.record(CallRecord {
            method: self.method,
            duration: self.started.elapsed(),
            code,
        });
    }
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.emit(Code::Cancelled);
        }
    }
}

/// Records method, wall-clock duration and final status code of every call.
///
/// Sits inside [`super::Recovery`]: a panic below is recorded as `Internal`
/// and then handed on for recovery.
#[derive(Clone)]
pub struct Logging {
    sink: Arc<dyn CallSink>,
}

impl Logging {
    pub fn new(sink: Arc<dyn CallSink>) -> Self {
        Self { sink }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl Stage for Logging {
    fn handle<'a, R: Send + 'a>(
        &'a self,
        call: Call,
        next: Next<'a, R>,
    ) -> BoxFuture<'a, CallResult<R>> {
        Box::pin(async move {
            let guard = CallGuard::start(self.sink.as_ref(), call.method());
            let inner = AssertUnwindSafe(async move { next.run(call).await });

            match inner.catch_unwind().await {
                Ok(result) => {
                    guard.finish(match &result {
                        Ok(_) => Code::Ok,
                        Err(status) => status.code(),
                    });
                    result
                }
                Err(payload) => {
                    guard.finish(Code::Internal);
                    panic::resume_unwind(payload)
                }
            }
        })
    }
}
