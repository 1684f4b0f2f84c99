//! Use cases over the repositories.
//!
//! Each service owns `Arc`s to its collaborators and is cheap to clone into
//! transport handlers.

mod accounts;
mod employees;
mod payroll;

pub use accounts::Accounts;
pub use employees::Employees;
pub use payroll::Payroll;
