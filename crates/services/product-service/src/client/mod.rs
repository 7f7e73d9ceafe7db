//! Clients for services this one depends on.

mod user_client;

pub use user_client::{IdentityClient, UserDirectory, USER_SERVICE_NAME};

#[cfg(any(test, feature = "test-utils"))]
pub use user_client::MockUserDirectory;
