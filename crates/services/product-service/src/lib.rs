//! Product Service Library
//!
//! This crate provides the product catalog via gRPC: creation, role-aware
//! listing and lookup, partial updates, soft delete and restore, and batch
//! validation of product references. Full product responses are enriched
//! with user summaries from the identity service.

pub mod client;
pub mod config;
pub mod grpc;
pub mod infra;
pub mod repository;
pub mod service;

use std::net::SocketAddr;
use std::sync::Arc;

use tonic::transport::Server;
use tracing::info;

use crate::client::IdentityClient;
use crate::config::ProductServiceConfig;
use crate::grpc::ProductGrpcService;
use crate::infra::Database;
use crate::repository::ProductStore;
use crate::service::ProductManager;

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: &ProductServiceConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Run the gRPC server with the given configuration.
pub async fn run_server(config: ProductServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize database
    let db = Database::connect(&config.database).await?;

    // Identity service; the channel connects on first use
    let users = Arc::new(IdentityClient::connect_lazy(&config.user_service)?);

    // Create repository and service
    let product_repo = Arc::new(ProductStore::new(db.get_connection()));
    let product_service = Arc::new(ProductManager::new(product_repo, users));

    // Create gRPC service
    let grpc_service = ProductGrpcService::new(product_service);

    let addr: SocketAddr = format!("{}:{}", config.service.host, config.service.port).parse()?;
    info!(
        user_service = %config.user_service.endpoint,
        "{} listening on {}", config.service.service_name, addr
    );

    Server::builder()
        .add_service(proto::ProductServiceServer::new(grpc_service))
        .serve(addr)
        .await?;

    Ok(())
}
