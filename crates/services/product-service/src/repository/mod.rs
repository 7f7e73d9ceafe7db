//! Repository layer for data access.

pub mod entities;
#[cfg(any(test, feature = "test-utils"))]
mod memory;
mod product_repository;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryProductStore;
pub use product_repository::{ProductRepository, ProductStore};

#[cfg(any(test, feature = "test-utils"))]
pub use product_repository::MockProductRepository;
