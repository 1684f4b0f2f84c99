use super::convert;
use crate::server::pipeline::Pipeline;
use roster_tonic_core::{
    methods,
    proto::employee::v1::{
        CreateEmployeeRequest, CreateEmployeeResponse, DeleteEmployeeRequest,
        DeleteEmployeeResponse, GetEmployeeRequest, GetEmployeeResponse, UpdateEmployeeRequest,
        UpdateEmployeeResponse, employee_service_server::EmployeeService,
    },
    roster::{Identity, Result, service::Employees},
};
use tonic::{Request, Response, Status};

const INVALID_ID: &str = "invalid employee id format";

/// `employee.v1.EmployeeService`. Every method is protected.
#[derive(Clone)]
pub struct EmployeeHandler {
    pipeline: Pipeline,
    employees: Employees,
}

impl EmployeeHandler {
    pub fn new(pipeline: Pipeline, employees: Employees) -> Self {
        Self {
            pipeline,
            employees,
        }
    }
}

#[tonic::async_trait]
impl EmployeeService for EmployeeHandler {
    async fn create_employee(
        &self,
        request: Request<CreateEmployeeRequest>,
    ) -> Result<Response<CreateEmployeeResponse>, Status> {
        self.pipeline
            .unary(methods::EMPLOYEE_CREATE, request, |caller, req| {
                create(&self.employees, caller, req)
            })
            .await
    }

    async fn get_employee(
        &self,
        request: Request<GetEmployeeRequest>,
    ) -> Result<Response<GetEmployeeResponse>, Status> {
        self.pipeline
            .unary(methods::EMPLOYEE_GET, request, |_, req| {
                get(&self.employees, req)
            })
            .await
    }

    async fn update_employee(
        &self,
        request: Request<UpdateEmployeeRequest>,
    ) -> Result<Response<UpdateEmployeeResponse>, Status> {
        self.pipeline
            .unary(methods::EMPLOYEE_UPDATE, request, |caller, req| {
                update(&self.employees, caller, req)
            })
            .await
    }

    async fn delete_employee(
        &self,
        request: Request<DeleteEmployeeRequest>,
    ) -> Result<Response<DeleteEmployeeResponse>, Status> {
        self.pipeline
            .unary(methods::EMPLOYEE_DELETE, request, |caller, req| {
                delete(&self.employees, caller, req)
            })
            .await
    }
}

fn actor(caller: &Option<Identity>) -> String {
    caller
        .as_ref()
        .map_or_else(|| "anonymous".to_owned(), |identity| identity.user_id.to_string())
}

async fn create(
    employees: &Employees,
    caller: Option<Identity>,
    req: CreateEmployeeRequest,
) -> Result<CreateEmployeeResponse> {
    let draft = convert::draft(req.full_name, req.job_title, req.country, &req.gross_salary)?;
    let employee = employees.create(draft).await?;
    tracing::info!(employee_id = %employee.id, actor = %actor(&caller), "employee created");
    Ok(CreateEmployeeResponse {
        employee: Some(convert::employee(employee)),
    })
}

async fn get(employees: &Employees, req: GetEmployeeRequest) -> Result<GetEmployeeResponse> {
    let id = convert::parse_uuid(&req.id, INVALID_ID)?;
    let employee = employees.get(id).await?;
    Ok(GetEmployeeResponse {
        employee: Some(convert::employee(employee)),
    })
}

async fn update(
    employees: &Employees,
    caller: Option<Identity>,
    req: UpdateEmployeeRequest,
) -> Result<UpdateEmployeeResponse> {
    let id = convert::parse_uuid(&req.id, INVALID_ID)?;
    let draft = convert::draft(req.full_name, req.job_title, req.country, &req.gross_salary)?;
    let employee = employees.update(id, draft).await?;
    tracing::info!(employee_id = %employee.id, actor = %actor(&caller), "employee updated");
    Ok(UpdateEmployeeResponse {
        employee: Some(convert::employee(employee)),
    })
}

async fn delete(
    employees: &Employees,
    caller: Option<Identity>,
    req: DeleteEmployeeRequest,
) -> Result<DeleteEmployeeResponse> {
    let id = convert::parse_uuid(&req.id, INVALID_ID)?;
    employees.delete(id).await?;
    tracing::info!(employee_id = %id, actor = %actor(&caller), "employee deleted");
    Ok(DeleteEmployeeResponse { success: true })
}
