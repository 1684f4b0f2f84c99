//! Storage boundary.
//!
//! Use-case services only ever talk to these traits. Implementations must
//! keep "row absent" ([`Error::NotFound`]) and "storage failed"
//! ([`Error::Internal`]) distinct.
//!
//! - [`memory`] - Lock-protected in-process maps. The default backend and
//!   the one used by tests.
//! - `postgres` - `sqlx` backend, behind the `postgres` feature.
//!
//! [`Error::NotFound`]: crate::Error::NotFound
//! [`Error::Internal`]: crate::Error::Internal

use crate::{
    domain::{Employee, JobTitleSalaryStats, SalaryStats, User},
    error::Result,
};
use async_trait::async_trait;
use core::fmt;
use uuid::Uuid;

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::{InMemoryEmployeeRepository, InMemoryUserRepository};
#[cfg(feature = "postgres")]
pub use postgres::{PgEmployeeRepository, PgUserRepository};

/// Resource names used in `NotFound` errors.
pub mod resource {
    pub const EMPLOYEE: &str = "employee";
    pub const USER: &str = "user";
    pub const EMPLOYEES_IN_COUNTRY: &str = "employees in country";
    pub const EMPLOYEES_WITH_JOB_TITLE: &str = "employees with job title";
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync + fmt::Debug {
    async fn create(&self, employee: &Employee) -> Result<()>;

    /// # Errors
    ///
    /// `NotFound` if no employee has this id.
    async fn find_by_id(&self, id: Uuid) -> Result<Employee>;

    /// # Errors
    ///
    /// `NotFound` if no employee has `employee.id`.
    async fn update(&self, employee: &Employee) -> Result<()>;

    /// # Errors
    ///
    /// `NotFound` if no employee has this id.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Min, max, average and count of gross salaries in `country`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the country has no employees.
    async fn salary_stats_by_country(&self, country: &str) -> Result<SalaryStats>;

    /// Average and count of gross salaries for `job_title`.
    ///
    /// # Errors
    ///
    /// `NotFound` if nobody holds the job title.
    async fn avg_salary_by_job_title(&self, job_title: &str) -> Result<JobTitleSalaryStats>;
}

#[async_trait]
pub trait UserRepository: Send + Sync + fmt::Debug {
    /// # Errors
    ///
    /// `Conflict` if the email is already taken.
    async fn create(&self, user: &User) -> Result<()>;

    /// # Errors
    ///
    /// `NotFound` if no account uses this email.
    async fn find_by_email(&self, email: &str) -> Result<User>;

    async fn exists_by_email(&self, email: &str) -> Result<bool>;
}
