use crate::{api::error, modules::user::model::UserInfo};

/// Resolves identity attributes for an authenticated user id.
#[async_trait::async_trait]
pub trait IdentityProvider {
    async fn get_user(&self, user_id: &str) -> Result<UserInfo, error::SystemError>;
}
