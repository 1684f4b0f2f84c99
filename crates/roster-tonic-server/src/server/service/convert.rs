//! Wire message <-> domain value conversions.
//!
//! Parsing failures are domain validation errors so that they flow through
//! the same translation as every other handler error.

use chrono::{DateTime, Utc};
use core::str::FromStr;
use prost_types::Timestamp;
use roster_tonic_core::{
    proto::employee::v1 as pb,
    roster::{
        Error, Result,
        domain::{Employee, EmployeeDraft},
    },
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub fn parse_uuid(raw: &str, message: &'static str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::validation(message))
}

pub fn parse_salary(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|_| Error::validation("invalid gross_salary format"))
}

/// Builds a draft from raw request fields. The salary is parsed first; the
/// remaining rules are checked by the use case.
pub fn draft(
    full_name: String,
    job_title: String,
    country: String,
    gross_salary: &str,
) -> Result<EmployeeDraft> {
    Ok(EmployeeDraft {
        gross_salary: parse_salary(gross_salary)?,
        full_name,
        job_title,
        country,
    })
}

pub fn timestamp(at: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos() as i32,
    }
}

pub fn employee(employee: Employee) -> pb::Employee {
    pb::Employee {
        id: employee.id.to_string(),
        full_name: employee.full_name,
        job_title: employee.job_title,
        country: employee.country,
        gross_salary: employee.gross_salary.to_string(),
        created_at: Some(timestamp(employee.created_at)),
        updated_at: Some(timestamp(employee.updated_at)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn salary_must_be_decimal() {
        assert_eq!(parse_salary(" 85000.50 ").unwrap(), Decimal::new(8_500_050, 2));
        for raw in ["", "abc", "1,000"] {
            let err = parse_salary(raw).unwrap_err();
            assert_eq!(err.message(), "invalid gross_salary format");
        }
    }

    #[test]
    fn uuid_message_is_caller_chosen() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string(), "x").unwrap(), id);

        let err = parse_uuid("42", "invalid employee id format").unwrap_err();
        assert_eq!(err.message(), "invalid employee id format");
    }

    #[test]
    fn timestamps_keep_sub_second_precision() {
        let at = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let ts = timestamp(at);
        assert_eq!(ts.seconds, 1_700_000_000);
        assert_eq!(ts.nanos, 123_456_789);
    }

    #[test]
    fn employee_salary_is_a_string() {
        let row = Employee::new(EmployeeDraft {
            full_name: "Jane Roe".into(),
            job_title: "Engineer".into(),
            country: "India".into(),
            gross_salary: Decimal::new(123_450, 2),
        });
        let id = row.id;
        let wire = employee(row);
        assert_eq!(wire.id, id.to_string());
        assert_eq!(wire.gross_salary, "1234.50");
        assert!(wire.created_at.is_some());
    }
}
