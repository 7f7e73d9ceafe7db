//! gRPC protocol buffer definitions.
//!
//! This crate contains the generated gRPC service definitions for:
//! - ProductService: Product catalog (CRUD, soft delete, batch validation)
//! - UserService: Identity service batch lookup of user summaries

/// Product service definitions.
pub mod product {
    tonic::include_proto!("product");
}

/// Identity service definitions.
pub mod user {
    tonic::include_proto!("user");
}

// Re-export commonly used items
pub use product::product_service_server::ProductServiceServer;
pub use user::user_service_client::UserServiceClient;
