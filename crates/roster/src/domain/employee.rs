use crate::{error::Result, validate};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// The caller-supplied fields of an employee record.
///
/// Used both to create a record and to replace the mutable fields of an
/// existing one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeDraft {
    pub full_name: String,
    pub job_title: String,
    pub country: String,
    pub gross_salary: Decimal,
}

impl EmployeeDraft {
    /// Checks required fields and rejects a negative salary.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate::required(&self.full_name, "full_name")?;
        validate::required(&self.job_title, "job_title")?;
        validate::required(&self.country, "country")?;
        if self.gross_salary < Decimal::ZERO {
            return Err(crate::Error::validation("gross_salary cannot be negative"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Employee {
    pub id: Uuid,
    pub full_name: String,
    pub job_title: String,
    pub country: String,
    pub gross_salary: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn new(draft: EmployeeDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            full_name: draft.full_name,
            job_title: draft.job_title,
            country: draft.country,
            gross_salary: draft.gross_salary,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every mutable field and bumps `updated_at`.
    pub fn apply(&mut self, draft: EmployeeDraft) {
        self.full_name = draft.full_name;
        self.job_title = draft.job_title;
        self.country = draft.country;
        self.gross_salary = draft.gross_salary;
        self.updated_at = Utc::now();
    }
}
