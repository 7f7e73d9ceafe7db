//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the product entity and its soft-delete lifecycle, the caller identity and
//! the visibility rule derived from it, price rules and the pagination policy.

pub mod actor;
pub mod constants;
pub mod error;
pub mod pagination;
pub mod price;
pub mod product;
pub mod user;

pub use actor::{Actor, UserRole, Visibility};
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use pagination::{PageMeta, PageRequest, Paginated};
pub use price::Price;
pub use product::{
    CreateProduct, DeleteState, EnrichedProduct, NewProduct, Product, ProductDelta,
    ProductReference, ProductSummary, UpdateProduct,
};
pub use user::UserSummary;
