//! Process entrypoint: wires configuration, credentials, the vSphere
//! backend, and the gRPC + admin HTTP servers together.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Registry};

use virtrigaud::cli::{Cli, Command};
use virtrigaud::resilience::ResilientBackend;
use virtrigaud::rpc::{GrpcProviderService, ProviderServer};
use virtrigaud::runtime::{Credentials, HarnessConfig};
use virtrigaud::vsphere::soap::SoapHypervisorClient;
use virtrigaud::vsphere::VsphereProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level.to_string());

    let mut config = HarnessConfig::from_env()?;
    if let Some(addr) = &cli.grpc_listen_addr {
        config.grpc_listen_addr = addr.clone();
    }
    if let Some(addr) = &cli.admin_listen_addr {
        config.admin_listen_addr = addr.clone();
    }

    let credentials = Credentials::load_default()?;
    let endpoint: url::Url = config.provider_endpoint.parse()?;
    let client = SoapHypervisorClient::new(endpoint, config.tls_insecure_skip_verify, credentials)?;
    let backend = Arc::new(VsphereProvider::new(client, config.defaults.clone()));

    match cli.command() {
        Command::Validate => {
            use virtrigaud::rpc::ProviderBackend;
            let outcome = backend.validate().await?;
            if outcome.ok {
                info!("validate: ok");
                Ok(())
            } else {
                error!(message = %outcome.message, "validate: failed");
                std::process::exit(1);
            }
        }
        Command::Serve => serve(config, backend).await,
    }
}

async fn serve(config: HarnessConfig, backend: Arc<VsphereProvider<SoapHypervisorClient>>) -> anyhow::Result<()> {
    let grpc_addr: std::net::SocketAddr = config.grpc_listen_addr.parse()?;
    let admin_addr: std::net::SocketAddr = config.admin_listen_addr.parse()?;

    let resilient = ResilientBackend::new(backend.clone(), config.resilience);
    let grpc_service = GrpcProviderService::new(resilient);

    let health: Arc<dyn virtrigaud::runtime::SessionHealth> = backend.clone();
    let admin_router = virtrigaud::runtime::admin_router(health, prometheus::Registry::new());

    info!(%grpc_addr, %admin_addr, "starting vsphere-provider");

    let grpc = tonic::transport::Server::builder()
        .add_service(ProviderServer::new(grpc_service))
        .serve(grpc_addr);

    let admin = axum::serve(tokio::net::TcpListener::bind(admin_addr).await?, admin_router);

    tokio::select! {
        result = grpc => result.map_err(anyhow::Error::from),
        result = admin => result.map_err(anyhow::Error::from),
    }
}

fn init_tracing(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    Registry::default()
        .with(env_filter)
        .with(fmt::layer())
        .init();
}
