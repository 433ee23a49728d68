use std::sync::Arc;

use crate::{
    api::error,
    modules::{
        user::{identity::IdentityProvider, model::UserInfo},
        workflow::pipeline::Step,
    },
};

/// Workflow contexts that carry a requesting user id and accept resolved identity.
pub trait RequesterContext {
    fn user_id(&self) -> &str;
    fn attach_user(&mut self, user: UserInfo);
}

/// Fetches the requester's identity attributes and attaches them to the context.
pub struct ResolveIdentity {
    identity: Arc<dyn IdentityProvider + Send + Sync>,
}

impl ResolveIdentity {
    pub fn new(identity: Arc<dyn IdentityProvider + Send + Sync>) -> Self {
        ResolveIdentity { identity }
    }
}

#[async_trait::async_trait]
impl<C> Step<C> for ResolveIdentity
where
    C: RequesterContext + Send + 'static,
{
    fn name(&self) -> &'static str {
        "get_user_info"
    }

    async fn run(&self, mut ctx: C) -> Result<C, error::SystemError> {
        let user_id = ctx.user_id().to_string();
        let user = self.identity.get_user(&user_id).await?;
        ctx.attach_user(user);
        Ok(ctx)
    }
}
