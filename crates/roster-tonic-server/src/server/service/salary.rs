use super::convert;
use crate::server::pipeline::Pipeline;
use roster_tonic_core::{
    methods,
    proto::salary::v1::{
        CalculateNetSalaryRequest, CalculateNetSalaryResponse, GetAvgSalaryByJobTitleRequest,
        GetAvgSalaryByJobTitleResponse, GetSalaryStatsByCountryRequest,
        GetSalaryStatsByCountryResponse, salary_service_server::SalaryService,
    },
    roster::{Result, service::Payroll},
};
use tonic::{Request, Response, Status};

/// `salary.v1.SalaryService`. Every method is protected.
#[derive(Clone)]
pub struct SalaryHandler {
    pipeline: Pipeline,
    payroll: Payroll,
}

impl SalaryHandler {
    pub fn new(pipeline: Pipeline, payroll: Payroll) -> Self {
        Self { pipeline, payroll }
    }
}

#[tonic::async_trait]
impl SalaryService for SalaryHandler {
    async fn calculate_net_salary(
        &self,
        request: Request<CalculateNetSalaryRequest>,
    ) -> Result<Response<CalculateNetSalaryResponse>, Status> {
        self.pipeline
            .unary(methods::SALARY_NET, request, |_, req| {
                net_salary(&self.payroll, req)
            })
            .await
    }

    async fn get_salary_stats_by_country(
        &self,
        request: Request<GetSalaryStatsByCountryRequest>,
    ) -> Result<Response<GetSalaryStatsByCountryResponse>, Status> {
        self.pipeline
            .unary(methods::SALARY_STATS_BY_COUNTRY, request, |_, req| {
                stats_by_country(&self.payroll, req)
            })
            .await
    }

    async fn get_avg_salary_by_job_title(
        &self,
        request: Request<GetAvgSalaryByJobTitleRequest>,
    ) -> Result<Response<GetAvgSalaryByJobTitleResponse>, Status> {
        self.pipeline
            .unary(methods::SALARY_AVG_BY_JOB_TITLE, request, |_, req| {
                avg_by_job_title(&self.payroll, req)
            })
            .await
    }
}

async fn net_salary(
    payroll: &Payroll,
    req: CalculateNetSalaryRequest,
) -> Result<CalculateNetSalaryResponse> {
    let id = convert::parse_uuid(&req.employee_id, "invalid employee_id format")?;
    let net = payroll.net_salary(id).await?;
    Ok(CalculateNetSalaryResponse {
        employee_id: id.to_string(),
        gross_salary: net.gross_salary.to_string(),
        tax_rate: net.tax_rate.normalize().to_string(),
        tax_amount: net.tax_amount.to_string(),
        net_salary: net.net_salary.to_string(),
    })
}

async fn stats_by_country(
    payroll: &Payroll,
    req: GetSalaryStatsByCountryRequest,
) -> Result<GetSalaryStatsByCountryResponse> {
    let stats = payroll.stats_by_country(&req.country).await?;
    Ok(GetSalaryStatsByCountryResponse {
        country: req.country,
        min_salary: stats.min_salary.to_string(),
        max_salary: stats.max_salary.to_string(),
        avg_salary: stats.avg_salary.to_string(),
        employee_count: stats.count,
    })
}

async fn avg_by_job_title(
    payroll: &Payroll,
    req: GetAvgSalaryByJobTitleRequest,
) -> Result<GetAvgSalaryByJobTitleResponse> {
    let stats = payroll.avg_by_job_title(&req.job_title).await?;
    Ok(GetAvgSalaryByJobTitleResponse {
        job_title: stats.job_title,
        avg_salary: stats.avg_salary.to_string(),
        employee_count: stats.count,
    })
}
