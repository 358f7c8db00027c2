use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{User, UserCreate};
use crate::user_actor::UserError;

/// Client for interacting with the User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl_basic_client!(UserClient, User, UserError, user);

impl UserClient {
    #[instrument(skip(self, params), fields(email = %params.email, role = %params.role))]
    pub async fn create_user(&self, params: UserCreate) -> Result<String, UserError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(UserError::from)
    }

    /// Like `get_user`, but a missing user is an error.
    #[instrument(skip(self))]
    pub async fn require_user(&self, id: String) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner
            .get(id.clone())
            .await?
            .ok_or(UserError::NotFound(id))
    }
}
