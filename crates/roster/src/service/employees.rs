use crate::{
    domain::{Employee, EmployeeDraft},
    error::Result,
    repository::EmployeeRepository,
};
use std::sync::Arc;
use uuid::Uuid;

/// Employee record management.
#[derive(Clone, Debug)]
pub struct Employees {
    repo: Arc<dyn EmployeeRepository>,
}

impl Employees {
    pub fn new(repo: Arc<dyn EmployeeRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, draft: EmployeeDraft) -> Result<Employee> {
        draft.validate()?;
        let employee = Employee::new(draft);
        self.repo.create(&employee).await?;
        tracing::debug!(employee_id = %employee.id, "employee created");
        Ok(employee)
    }

    pub async fn get(&self, id: Uuid) -> Result<Employee> {
        self.repo.find_by_id(id).await
    }

    /// Replaces the mutable fields of employee `id`.
    ///
    /// The draft is validated before the record is loaded, so bad input is
    /// reported even for an unknown id.
    pub async fn update(&self, id: Uuid, draft: EmployeeDraft) -> Result<Employee> {
        draft.validate()?;
        let mut employee = self.repo.find_by_id(id).await?;
        employee.apply(draft);
        self.repo.update(&employee).await?;
        Ok(employee)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, repository::InMemoryEmployeeRepository};
    use rust_decimal::Decimal;

    fn employees() -> Employees {
        Employees::new(Arc::new(InMemoryEmployeeRepository::new()))
    }

    fn draft(name: &str, salary: i64) -> EmployeeDraft {
        EmployeeDraft {
            full_name: name.into(),
            job_title: "Engineer".into(),
            country: "India".into(),
            gross_salary: Decimal::from(salary),
        }
    }

    #[tokio::test]
    async fn lifecycle() {
        let employees = employees();

        let created = employees.create(draft("John Doe", 1000)).await.unwrap();
        assert_eq!(employees.get(created.id).await.unwrap(), created);

        let updated = employees
            .update(created.id, draft("John Smith", 2000))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.full_name, "John Smith");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        employees.delete(created.id).await.unwrap();
        let err = employees.get(created.id).await.unwrap_err();
        assert_eq!(err.message(), "employee not found");
    }

    #[tokio::test]
    async fn create_rejects_invalid_draft() {
        let err = employees().create(draft("", 1000)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "full_name is required");
    }

    #[tokio::test]
    async fn update_validates_before_lookup() {
        let err = employees()
            .update(Uuid::new_v4(), draft("John", -1))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "gross_salary cannot be negative");

        let err = employees()
            .update(Uuid::new_v4(), draft("John", 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let err = employees().delete(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
