//! PostgreSQL repositories over a shared [`PgPool`].
//!
//! Expects `users` and `employees` tables to exist. Deleting an employee
//! stamps `deleted_at`; every employee read filters those rows out. Users
//! are never deleted and the `users` table has no `deleted_at` column.

use super::{EmployeeRepository, UserRepository, resource};
use crate::{
    domain::{Employee, JobTitleSalaryStats, SalaryStats, User, salary::round_money},
    error::{Error, Result},
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

const EMPLOYEE_COLUMNS: &str =
    "id, full_name, job_title, country, gross_salary, created_at, updated_at";

const FIND_USER_BY_EMAIL: &str =
    "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE email = $1";

const USER_EXISTS_BY_EMAIL: &str = "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)";

fn employee_from_row(row: &PgRow) -> Result<Employee> {
    Ok(Employee {
        id: row.try_get("id").map_err(Error::internal)?,
        full_name: row.try_get("full_name").map_err(Error::internal)?,
        job_title: row.try_get("job_title").map_err(Error::internal)?,
        country: row.try_get("country").map_err(Error::internal)?,
        gross_salary: row.try_get("gross_salary").map_err(Error::internal)?,
        created_at: row.try_get("created_at").map_err(Error::internal)?,
        updated_at: row.try_get("updated_at").map_err(Error::internal)?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id").map_err(Error::internal)?,
        email: row.try_get("email").map_err(Error::internal)?,
        password_hash: row.try_get("password_hash").map_err(Error::internal)?,
        created_at: row.try_get("created_at").map_err(Error::internal)?,
        updated_at: row.try_get("updated_at").map_err(Error::internal)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[derive(Clone, Debug)]
pub struct PgEmployeeRepository {
    pool: PgPool,
}

impl PgEmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeRepository {
    async fn create(&self, employee: &Employee) -> Result<()> {
        sqlx::query(
            "INSERT INTO employees \
             (id, full_name, job_title, country, gross_salary, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(employee.id)
        .bind(&employee.full_name)
        .bind(&employee.job_title)
        .bind(&employee.country)
        .bind(employee.gross_salary)
        .bind(employee.created_at)
        .bind(employee.updated_at)
        .execute(&self.pool)
        .await
        .map_err(Error::internal)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Employee> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1 AND deleted_at IS NULL"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::internal)?
            .ok_or_else(|| Error::not_found(resource::EMPLOYEE))?;
        employee_from_row(&row)
    }

    async fn update(&self, employee: &Employee) -> Result<()> {
        let result = sqlx::query(
            "UPDATE employees \
             SET full_name = $2, job_title = $3, country = $4, gross_salary = $5, updated_at = $6 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(employee.id)
        .bind(&employee.full_name)
        .bind(&employee.job_title)
        .bind(&employee.country)
        .bind(employee.gross_salary)
        .bind(employee.updated_at)
        .execute(&self.pool)
        .await
        .map_err(Error::internal)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(resource::EMPLOYEE));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE employees SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::internal)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(resource::EMPLOYEE));
        }
        Ok(())
    }

    async fn salary_stats_by_country(&self, country: &str) -> Result<SalaryStats> {
        let row = sqlx::query(
            "SELECT MIN(gross_salary) AS min_salary, MAX(gross_salary) AS max_salary, \
                    AVG(gross_salary) AS avg_salary, COUNT(*) AS count \
             FROM employees WHERE country = $1 AND deleted_at IS NULL",
        )
        .bind(country)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::internal)?;

        let count: i64 = row.try_get("count").map_err(Error::internal)?;
        if count == 0 {
            return Err(Error::not_found(resource::EMPLOYEES_IN_COUNTRY));
        }

        let min: Option<Decimal> = row.try_get("min_salary").map_err(Error::internal)?;
        let max: Option<Decimal> = row.try_get("max_salary").map_err(Error::internal)?;
        let avg: Option<Decimal> = row.try_get("avg_salary").map_err(Error::internal)?;

        Ok(SalaryStats {
            min_salary: min.unwrap_or_default(),
            max_salary: max.unwrap_or_default(),
            avg_salary: round_money(avg.unwrap_or_default()),
            count,
        })
    }

    async fn avg_salary_by_job_title(&self, job_title: &str) -> Result<JobTitleSalaryStats> {
        let row = sqlx::query(
            "SELECT AVG(gross_salary) AS avg_salary, COUNT(*) AS count \
             FROM employees WHERE job_title = $1 AND deleted_at IS NULL",
        )
        .bind(job_title)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::internal)?;

        let count: i64 = row.try_get("count").map_err(Error::internal)?;
        if count == 0 {
            return Err(Error::not_found(resource::EMPLOYEES_WITH_JOB_TITLE));
        }
        let avg: Option<Decimal> = row.try_get("avg_salary").map_err(Error::internal)?;

        Ok(JobTitleSalaryStats {
            job_title: job_title.to_owned(),
            avg_salary: round_money(avg.unwrap_or_default()),
            count,
        })
    }
}

#[derive(Clone, Debug)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                Error::conflict("email already registered")
            } else {
                Error::internal(err)
            }
        })?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<User> {
        let row = sqlx::query(FIND_USER_BY_EMAIL)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::internal)?
        .ok_or_else(|| Error::not_found(resource::USER))?;
        user_from_row(&row)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(USER_EXISTS_BY_EMAIL)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::internal)
    }
}
