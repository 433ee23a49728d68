use std::sync::Arc;

use crate::{
    api::error,
    modules::{
        file::repository::FileRepository,
        share::{
            model::{ShareContext, ShareRequest, ShareResponse},
            steps::{AuditShare, AuthorizeShare, NotifyRecipients, PersistShare, ValidateShare},
        },
        storage::repository::ObjectStore,
        user::identity::IdentityProvider,
        workflow::{identity::ResolveIdentity, pipeline::Pipeline},
    },
};

/// validate → get_user_info → authorize → audit → persist → notify
pub struct ShareWorkflow {
    pipeline: Pipeline<ShareContext>,
}

impl ShareWorkflow {
    pub fn with_dependencies(
        files: Arc<dyn FileRepository + Send + Sync>,
        objects: Arc<dyn ObjectStore + Send + Sync>,
        identity: Arc<dyn IdentityProvider + Send + Sync>,
        api_url: impl Into<String>,
    ) -> Self {
        let pipeline = Pipeline::new("share")
            .step(ValidateShare)
            .step(ResolveIdentity::new(identity))
            .step(AuthorizeShare::new(objects))
            .step(AuditShare)
            .step(PersistShare::new(files))
            .step(NotifyRecipients::new(api_url));

        ShareWorkflow { pipeline }
    }

    pub async fn run(&self, request: ShareRequest) -> Result<ShareResponse, error::SystemError> {
        let ctx = self.pipeline.run(ShareContext::new(request)).await?;
        let recipients = ctx.shared_with.into_iter().map(|r| r.recipient_email).collect();
        Ok(ShareResponse { file_id: ctx.request.file_id, recipients })
    }
}
