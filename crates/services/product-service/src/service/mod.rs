//! Business logic layer.

mod product_service;
mod user_resolver;

pub use product_service::{ProductManager, ProductService};
pub use user_resolver::UserResolver;
