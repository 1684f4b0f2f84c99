//! gRPC bindings for the auth, employee and salary services.
//!
//! Each method body is a single [`Pipeline::unary`] call naming the method
//! path and a module-private handler returning a domain result. Transport
//! concerns (credentials, outcome logging, panic recovery, status mapping)
//! live in the pipeline, not here.
//!
//! ## Structure
//!
//! - [`auth`] - `AuthService` (Register, Login).
//! - [`employee`] - `EmployeeService` CRUD.
//! - [`salary`] - `SalaryService` payroll queries.
//! - [`convert`] - wire message conversions.

pub mod auth;
pub mod convert;
pub mod employee;
pub mod salary;

use crate::server::{pipeline::Pipeline, storage::Backends};
use auth::AuthHandler;
use employee::EmployeeHandler;
use roster_tonic_core::{
    proto::{
        auth::v1::auth_service_server::AuthServiceServer,
        employee::v1::employee_service_server::EmployeeServiceServer,
        salary::v1::salary_service_server::SalaryServiceServer,
    },
    roster::{
        TokenCodec,
        service::{Accounts, Employees, Payroll},
    },
};
use salary::SalaryHandler;
use std::sync::Arc;
use tonic::codec::CompressionEncoding;

/// The three handlers, all sharing one pipeline.
#[derive(Clone)]
pub struct Handlers {
    pub auth: AuthHandler,
    pub employee: EmployeeHandler,
    pub salary: SalaryHandler,
}

impl Handlers {
    pub fn new(pipeline: &Pipeline, backends: &Backends, codec: Arc<TokenCodec>) -> Self {
        Self::with_accounts(
            pipeline,
            backends,
            Accounts::new(backends.users.clone(), codec),
        )
    }

    /// Same as [`Handlers::new`] with a caller-built account service, e.g.
    /// one using a different password hasher.
    pub fn with_accounts(pipeline: &Pipeline, backends: &Backends, accounts: Accounts) -> Self {
        Self {
            auth: AuthHandler::new(pipeline.clone(), accounts),
            employee: EmployeeHandler::new(
                pipeline.clone(),
                Employees::new(backends.employees.clone()),
            ),
            salary: SalaryHandler::new(pipeline.clone(), Payroll::new(backends.employees.clone())),
        }
    }
}

// Every service speaks zstd, gzip and deflate in both directions.
macro_rules! compressed {
    ($server:expr) => {
        $server
            .send_compressed(CompressionEncoding::Zstd)
            .send_compressed(CompressionEncoding::Gzip)
            .send_compressed(CompressionEncoding::Deflate)
            .accept_compressed(CompressionEncoding::Zstd)
            .accept_compressed(CompressionEncoding::Gzip)
            .accept_compressed(CompressionEncoding::Deflate)
    };
}

pub fn build_auth_service(handler: AuthHandler) -> AuthServiceServer<AuthHandler> {
    compressed!(AuthServiceServer::new(handler))
}

pub fn build_employee_service(handler: EmployeeHandler) -> EmployeeServiceServer<EmployeeHandler> {
    compressed!(EmployeeServiceServer::new(handler))
}

pub fn build_salary_service(handler: SalaryHandler) -> SalaryServiceServer<SalaryHandler> {
    compressed!(SalaryServiceServer::new(handler))
}
