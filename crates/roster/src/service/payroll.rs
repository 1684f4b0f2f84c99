use crate::{
    domain::{JobTitleSalaryStats, NetSalary, SalaryStats},
    error::Result,
    repository::EmployeeRepository,
};
use std::sync::Arc;
use uuid::Uuid;

/// Salary calculations and aggregates.
#[derive(Clone, Debug)]
pub struct Payroll {
    repo: Arc<dyn EmployeeRepository>,
}

impl Payroll {
    pub fn new(repo: Arc<dyn EmployeeRepository>) -> Self {
        Self { repo }
    }

    /// Net salary of one employee under their country's tax rate.
    pub async fn net_salary(&self, employee_id: Uuid) -> Result<NetSalary> {
        let employee = self.repo.find_by_id(employee_id).await?;
        Ok(NetSalary::calculate(employee.gross_salary, &employee.country))
    }

    pub async fn stats_by_country(&self, country: &str) -> Result<SalaryStats> {
        self.repo.salary_stats_by_country(country).await
    }

    pub async fn avg_by_job_title(&self, job_title: &str) -> Result<JobTitleSalaryStats> {
        self.repo.avg_salary_by_job_title(job_title).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Employee, EmployeeDraft},
        error::ErrorKind,
        repository::InMemoryEmployeeRepository,
    };
    use rust_decimal::Decimal;

    async fn seeded() -> (Payroll, Employee) {
        let repo = Arc::new(InMemoryEmployeeRepository::new());
        let employee = Employee::new(EmployeeDraft {
            full_name: "Asha Rao".into(),
            job_title: "Engineer".into(),
            country: "United States".into(),
            gross_salary: Decimal::from(50_000),
        });
        repo.create(&employee).await.unwrap();
        (Payroll::new(repo), employee)
    }

    #[tokio::test]
    async fn net_salary_uses_employee_country() {
        let (payroll, employee) = seeded().await;

        let net = payroll.net_salary(employee.id).await.unwrap();
        assert_eq!(net.gross_salary, Decimal::from(50_000));
        assert_eq!(net.tax_amount, Decimal::from(6_000));
        assert_eq!(net.net_salary, Decimal::from(44_000));
    }

    #[tokio::test]
    async fn net_salary_of_unknown_employee() {
        let (payroll, _) = seeded().await;
        let err = payroll.net_salary(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.message(), "employee not found");
    }

    #[tokio::test]
    async fn aggregates_delegate_to_storage() {
        let (payroll, _) = seeded().await;

        let stats = payroll.stats_by_country("United States").await.unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.avg_salary, Decimal::from(50_000));

        let avg = payroll.avg_by_job_title("Engineer").await.unwrap();
        assert_eq!(avg.count, 1);

        let err = payroll.stats_by_country("India").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
