#![doc = include_str!("../README.md")]

mod server;

use clap::Parser;
use futures::Stream;
use roster_tonic_core::{
    proto::{
        FILE_DESCRIPTOR_SET, auth::v1::auth_service_server::AuthServiceServer,
        employee::v1::employee_service_server::EmployeeServiceServer,
        salary::v1::salary_service_server::SalaryServiceServer,
    },
    roster::TokenCodec,
};
use server::{
    config::{CliArgs, ServerConfig},
    pipeline::{Authenticate, Logging, Pipeline, Recovery, Visibility},
    service::{
        Handlers, auth::AuthHandler, build_auth_service, build_employee_service,
        build_salary_service, employee::EmployeeHandler, salary::SalaryHandler,
    },
    storage::Backends,
    telemetry::{TelemetryProviders, init_telemetry},
};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Server, server::Connected};
use tonic_health::server::HealthReporter;
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;

    if config.uds {
        #[cfg(unix)]
        {
            use tokio::net::UnixListener;
            use tokio_stream::wrappers::UnixListenerStream;
            let uds_path = config.server_addr.clone();
            let uds = UnixListener::bind(&uds_path)?;
            let incoming = UnixListenerStream::new(uds);
            log_startup_info(&uds_path, &config);
            let res = run_server_with_incoming(providers, incoming, config).await;
            // A panic outside the pipeline can still leave the socket file
            // behind.
            let _ = std::fs::remove_file(&uds_path);
            res
        }
        #[cfg(not(unix))]
        {
            anyhow::bail!("Unix domain sockets are not supported on this platform");
        }
    } else {
        let tcp_path = config.server_addr.clone();
        let tcp = TcpListener::bind(&tcp_path).await?;
        let incoming = TcpListenerStream::new(tcp);
        log_startup_info(&tcp_path, &config);
        run_server_with_incoming(providers, incoming, config).await
    }
}

fn build_pipeline(codec: Arc<TokenCodec>) -> Pipeline {
    let pipeline = Pipeline::new(
        Recovery::new(),
        Logging::default(),
        Authenticate::new(codec, Visibility::default()),
    );
    let public: Vec<_> = pipeline.visibility().public_methods().collect();
    tracing::info!(?public, "methods callable without a credential");
    pipeline
}

async fn run_server_with_incoming<I, IO, IE>(
    providers: TelemetryProviders,
    incoming: I,
    config: ServerConfig,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
{
    let served = serve(incoming, config, shutdown_signal()).await;
    // Flush only after in-flight calls have drained and logged their outcome.
    providers.shutdown();
    served
}

/// Serves until `signal` resolves, then reports NOT_SERVING and returns once
/// in-flight calls have finished.
async fn serve<I, IO, IE, S>(incoming: I, config: ServerConfig, signal: S) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
    S: Future<Output = ()>,
{
    let codec = Arc::new(TokenCodec::new(
        config.jwt_secret.as_bytes(),
        config.jwt_ttl,
        config.jwt_issuer.clone(),
    ));
    let backends = Backends::connect(&config).await?;
    let pipeline = build_pipeline(codec.clone());
    let handlers = Handlers::new(&pipeline, &backends, codec);

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<AuthServiceServer<AuthHandler>>()
        .await;
    health_reporter
        .set_serving::<EmployeeServiceServer<EmployeeHandler>>()
        .await;
    health_reporter
        .set_serving::<SalaryServiceServer<SalaryHandler>>()
        .await;

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    Server::builder()
        .accept_http1(true)
        .http2_adaptive_window(Some(true))
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(GrpcWebLayer::new()),
        )
        .add_service(health_service)
        .add_service(reflection)
        .add_service(build_auth_service(handlers.auth))
        .add_service(build_employee_service(handlers.employee))
        .add_service(build_salary_service(handlers.salary))
        .serve_with_incoming_shutdown(incoming, stop_serving(signal, health_reporter))
        .await?;

    tracing::info!("service shut down successfully");
    Ok(())
}

fn log_startup_info(addr: &str, config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("starting roster service on {addr} with config: {config:#?}");
    } else {
        tracing::info!(
            "starting roster service on {addr} (token issuer {}, ttl {}s)",
            config.jwt_issuer,
            config.jwt_ttl.num_seconds()
        );
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C signal"),
        () = terminate => tracing::info!("received SIGTERM signal"),
    }
}

async fn stop_serving<S: Future<Output = ()>>(signal: S, health_reporter: HealthReporter) {
    signal.await;
    tracing::info!("shutdown signal received, draining in-flight calls...");

    health_reporter
        .set_not_serving::<AuthServiceServer<AuthHandler>>()
        .await;
    health_reporter
        .set_not_serving::<EmployeeServiceServer<EmployeeHandler>>()
        .await;
    health_reporter
        .set_not_serving::<SalaryServiceServer<SalaryHandler>>()
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_tonic_core::proto::auth::v1::{LoginRequest, auth_service_client::AuthServiceClient};
    use tokio::sync::oneshot;
    use tonic::{Code, transport::Channel};

    #[tokio::test]
    async fn serves_until_signalled_then_returns() {
        let args = CliArgs::try_parse_from(["roster", "--jwt-secret", "main-test-secret"]).unwrap();
        let config = ServerConfig::try_from(args).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(TcpListenerStream::new(listener), config, async {
            let _ = stopped.await;
        }));

        let channel = Channel::builder(format!("http://{addr}").parse().unwrap())
            .connect()
            .await
            .unwrap();
        let status = AuthServiceClient::new(channel)
            .login(LoginRequest {
                email: "nobody@b.com".into(),
                password: "pass1234".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);
        assert_eq!(status.message(), "invalid credentials");

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
