//! gRPC client for the identity (user) service.

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;
use uuid::Uuid;

use common::{AppError, AppResult, GrpcClientConfig};
use domain::UserSummary;
use proto::user::FindUserSummariesRequest;
use proto::UserServiceClient;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Name used when reporting failures of the identity service.
pub const USER_SERVICE_NAME: &str = "user-service";

/// The one identity-service operation the catalog needs.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve user ids to summaries in one batched call.
    ///
    /// Unknown ids are simply absent from the result.
    async fn find_summaries(&self, ids: &[Uuid]) -> AppResult<Vec<UserSummary>>;
}

/// gRPC client wrapper for the identity service.
pub struct IdentityClient {
    client: UserServiceClient<Channel>,
}

impl IdentityClient {
    /// Build a client whose channel connects on first use.
    ///
    /// Every request is bounded by the configured request timeout; an expired
    /// deadline surfaces like any other remote failure.
    pub fn connect_lazy(config: &GrpcClientConfig) -> Result<Self, tonic::transport::Error> {
        debug!("Configuring user-service client for {}", config.endpoint);
        let channel = Endpoint::from_shared(config.endpoint.clone())?
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .connect_lazy();

        Ok(Self {
            client: UserServiceClient::new(channel),
        })
    }
}

#[async_trait]
impl UserDirectory for IdentityClient {
    async fn find_summaries(&self, ids: &[Uuid]) -> AppResult<Vec<UserSummary>> {
        let request = tonic::Request::new(FindUserSummariesRequest {
            ids: ids.iter().map(Uuid::to_string).collect(),
        });

        let mut client = self.client.clone();
        let response = client.find_user_summaries(request).await.map_err(|status| {
            AppError::remote_dependency(
                USER_SERVICE_NAME,
                format!("{:?}: {}", status.code(), status.message()),
            )
        })?;

        response
            .into_inner()
            .users
            .into_iter()
            .map(proto_to_summary)
            .collect()
    }
}

/// Convert proto UserSummary to domain UserSummary.
fn proto_to_summary(proto: proto::user::UserSummary) -> AppResult<UserSummary> {
    let id = proto.id.parse().map_err(|_| {
        AppError::remote_dependency(
            USER_SERVICE_NAME,
            format!("Invalid user id '{}' in response", proto.id),
        )
    })?;

    Ok(UserSummary {
        id,
        name: proto.name,
        email: proto.email,
    })
}
