//! In-process repositories backed by `parking_lot::RwLock`ed maps.
//!
//! Locks are never held across an `.await`, so these are safe to share
//! between any number of concurrent calls.

use super::{EmployeeRepository, UserRepository, resource};
use crate::{
    domain::{Employee, JobTitleSalaryStats, SalaryStats, User, salary::round_money},
    error::{Error, Result},
};
use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryEmployeeRepository {
    rows: RwLock<HashMap<Uuid, Employee>>,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn salaries_where(&self, pred: impl Fn(&Employee) -> bool) -> Vec<Decimal> {
        self.rows
            .read()
            .values()
            .filter(|employee| pred(employee))
            .map(|employee| employee.gross_salary)
            .collect()
    }
}

fn average(salaries: &[Decimal]) -> Result<Decimal> {
    salaries
        .iter()
        .try_fold(Decimal::ZERO, |total, salary| total.checked_add(*salary))
        .and_then(|total| total.checked_div(Decimal::from(salaries.len())))
        .map(round_money)
        .ok_or_else(|| Error::internal("salary aggregate overflowed"))
}

#[async_trait]
impl EmployeeRepository for InMemoryEmployeeRepository {
    async fn create(&self, employee: &Employee) -> Result<()> {
        let mut rows = self.rows.write();
        if rows.contains_key(&employee.id) {
            return Err(Error::internal(format!(
                "duplicate employee primary key {}",
                employee.id
            )));
        }
        rows.insert(employee.id, employee.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Employee> {
        self.rows
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(resource::EMPLOYEE))
    }

    async fn update(&self, employee: &Employee) -> Result<()> {
        match self.rows.write().get_mut(&employee.id) {
            Some(row) => {
                *row = employee.clone();
                Ok(())
            }
            None => Err(Error::not_found(resource::EMPLOYEE)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.rows
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(resource::EMPLOYEE))
    }

    async fn salary_stats_by_country(&self, country: &str) -> Result<SalaryStats> {
        let salaries = self.salaries_where(|employee| employee.country == country);
        let (Some(min), Some(max)) = (salaries.iter().min(), salaries.iter().max()) else {
            return Err(Error::not_found(resource::EMPLOYEES_IN_COUNTRY));
        };

        Ok(SalaryStats {
            min_salary: *min,
            max_salary: *max,
            avg_salary: average(&salaries)?,
            count: salaries.len() as i64,
        })
    }

    async fn avg_salary_by_job_title(&self, job_title: &str) -> Result<JobTitleSalaryStats> {
        let salaries = self.salaries_where(|employee| employee.job_title == job_title);
        if salaries.is_empty() {
            return Err(Error::not_found(resource::EMPLOYEES_WITH_JOB_TITLE));
        }

        Ok(JobTitleSalaryStats {
            job_title: job_title.to_owned(),
            avg_salary: average(&salaries)?,
            count: salaries.len() as i64,
        })
    }
}

/// Users keyed by email, which doubles as the uniqueness constraint.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    rows: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<()> {
        let mut rows = self.rows.write();
        if rows.contains_key(&user.email) {
            return Err(Error::conflict("email already registered"));
        }
        rows.insert(user.email.clone(), user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<User> {
        self.rows
            .read()
            .get(email)
            .cloned()
            .ok_or_else(|| Error::not_found(resource::USER))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self.rows.read().contains_key(email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::EmployeeDraft, error::ErrorKind};
    use core::str::FromStr;

    fn employee(job_title: &str, country: &str, salary: &str) -> Employee {
        Employee::new(EmployeeDraft {
            full_name: "Jane Roe".into(),
            job_title: job_title.into(),
            country: country.into(),
            gross_salary: Decimal::from_str(salary).unwrap(),
        })
    }

    #[tokio::test]
    async fn employee_crud() {
        let repo = InMemoryEmployeeRepository::new();
        let mut row = employee("Engineer", "India", "1000");

        repo.create(&row).await.unwrap();
        assert_eq!(repo.find_by_id(row.id).await.unwrap(), row);

        row.full_name = "Jane Updated".into();
        repo.update(&row).await.unwrap();
        assert_eq!(repo.find_by_id(row.id).await.unwrap().full_name, "Jane Updated");

        repo.delete(row.id).await.unwrap();
        let err = repo.find_by_id(row.id).await.unwrap_err();
        assert_eq!(err.message(), "employee not found");
        assert_eq!(repo.delete(row.id).await.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(repo.update(&row).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn country_stats() {
        let repo = InMemoryEmployeeRepository::new();
        for salary in ["1000", "2000", "4000"] {
            repo.create(&employee("Engineer", "India", salary)).await.unwrap();
        }
        repo.create(&employee("Engineer", "United States", "9000"))
            .await
            .unwrap();

        let stats = repo.salary_stats_by_country("India").await.unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min_salary, Decimal::from(1000));
        assert_eq!(stats.max_salary, Decimal::from(4000));
        // 7000 / 3 = 2333.333...
        assert_eq!(stats.avg_salary, Decimal::from_str("2333.33").unwrap());

        let err = repo.salary_stats_by_country("Atlantis").await.unwrap_err();
        assert_eq!(err.message(), "employees in country not found");
    }

    #[tokio::test]
    async fn aggregate_overflow_is_internal() {
        let repo = InMemoryEmployeeRepository::new();
        for _ in 0..2 {
            let mut row = employee("Engineer", "India", "1");
            row.gross_salary = Decimal::MAX;
            repo.create(&row).await.unwrap();
        }

        let err = repo.salary_stats_by_country("India").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message(), "internal server error");

        let err = repo.avg_salary_by_job_title("Engineer").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn job_title_average() {
        let repo = InMemoryEmployeeRepository::new();
        repo.create(&employee("Engineer", "India", "1000")).await.unwrap();
        repo.create(&employee("Engineer", "Peru", "2001")).await.unwrap();
        repo.create(&employee("Designer", "India", "5000")).await.unwrap();

        let stats = repo.avg_salary_by_job_title("Engineer").await.unwrap();
        assert_eq!(stats.job_title, "Engineer");
        assert_eq!(stats.count, 2);
        assert_eq!(stats.avg_salary, Decimal::from_str("1500.50").unwrap());

        let err = repo.avg_salary_by_job_title("Pilot").await.unwrap_err();
        assert_eq!(err.message(), "employees with job title not found");
    }

    #[tokio::test]
    async fn users_are_unique_by_email() {
        let repo = InMemoryUserRepository::new();
        let user = User::new("a@b.com", "hash");

        assert!(!repo.exists_by_email("a@b.com").await.unwrap());
        repo.create(&user).await.unwrap();
        assert!(repo.exists_by_email("a@b.com").await.unwrap());
        assert_eq!(repo.find_by_email("a@b.com").await.unwrap(), user);

        let err = repo.create(&User::new("a@b.com", "other")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = repo.find_by_email("c@d.com").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
