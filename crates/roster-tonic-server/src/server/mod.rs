//! Server internals: configuration, telemetry, the per-call pipeline and
//! the gRPC service bindings.

pub mod config;
pub mod pipeline;
pub mod service;
pub mod storage;
pub mod telemetry;
