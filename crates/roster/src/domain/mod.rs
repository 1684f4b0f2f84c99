//! Records handled by the service.
//!
//! - [`user`] - Registered accounts.
//! - [`employee`] - Employee records and the drafts used to create or
//!   replace them.
//! - [`salary`] - Tax table, net-salary arithmetic and aggregate statistics.

pub mod employee;
pub mod salary;
pub mod user;

pub use employee::{Employee, EmployeeDraft};
pub use salary::{JobTitleSalaryStats, NetSalary, SalaryStats};
pub use user::User;
