use crate::server::pipeline::Pipeline;
use roster_tonic_core::{
    methods,
    proto::auth::v1::{
        LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, auth_service_server::AuthService,
    },
    roster::{Result, service::Accounts},
};
use tonic::{Request, Response, Status};

/// `auth.v1.AuthService`. Both methods are public.
#[derive(Clone)]
pub struct AuthHandler {
    pipeline: Pipeline,
    accounts: Accounts,
}

impl AuthHandler {
    pub fn new(pipeline: Pipeline, accounts: Accounts) -> Self {
        Self { pipeline, accounts }
    }
}

#[tonic::async_trait]
impl AuthService for AuthHandler {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        self.pipeline
            .unary(methods::AUTH_REGISTER, request, |_, req| {
                register(&self.accounts, req)
            })
            .await
    }

    async fn login(&self, request: Request<LoginRequest>) -> Result<Response<LoginResponse>, Status> {
        self.pipeline
            .unary(methods::AUTH_LOGIN, request, |_, req| login(&self.accounts, req))
            .await
    }
}

async fn register(accounts: &Accounts, req: RegisterRequest) -> Result<RegisterResponse> {
    let user = accounts.register(&req.email, &req.password).await?;
    Ok(RegisterResponse {
        id: user.id.to_string(),
        email: user.email,
    })
}

async fn login(accounts: &Accounts, req: LoginRequest) -> Result<LoginResponse> {
    let token = accounts.login(&req.email, &req.password).await?;
    Ok(LoginResponse { token })
}
