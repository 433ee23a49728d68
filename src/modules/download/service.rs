use std::sync::Arc;

use crate::{
    api::error,
    modules::{
        download::{
            model::{DownloadContext, DownloadRequest},
            steps::{AuditDownload, AuthorizeDownload, IssueDownloadUrl, ValidateDownload},
        },
        file::repository::{DownloadRepository, FileRepository},
        storage::repository::ObjectStore,
        user::identity::IdentityProvider,
        workflow::{identity::ResolveIdentity, pipeline::Pipeline},
    },
};

/// validate → get_user_info → authorize → audit → process
pub struct DownloadWorkflow {
    pipeline: Pipeline<DownloadContext>,
}

impl DownloadWorkflow {
    pub fn with_dependencies(
        files: Arc<dyn FileRepository + Send + Sync>,
        downloads: Arc<dyn DownloadRepository + Send + Sync>,
        objects: Arc<dyn ObjectStore + Send + Sync>,
        identity: Arc<dyn IdentityProvider + Send + Sync>,
        record_ttl: chrono::Duration,
    ) -> Self {
        let pipeline = Pipeline::new("download")
            .step(ValidateDownload)
            .step(ResolveIdentity::new(identity))
            .step(AuthorizeDownload::new(files, downloads.clone()))
            .step(AuditDownload::new(downloads, record_ttl))
            .step(IssueDownloadUrl::new(objects));

        DownloadWorkflow { pipeline }
    }

    /// Returns the signed GET URL.
    pub async fn run(&self, request: DownloadRequest) -> Result<String, error::SystemError> {
        let ctx = self.pipeline.run(DownloadContext::new(request)).await?;
        ctx.download_url
            .ok_or_else(|| error::SystemError::internal("download workflow produced no url"))
    }
}
