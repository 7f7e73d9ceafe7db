//! User summaries owned by the identity service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimal display attributes of a user, as returned by the identity
/// service's batch lookup. Held only while enriching a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}
