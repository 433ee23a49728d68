use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    api::error,
    constants::{META_FILENAME, META_RECIPIENT_EMAIL, META_RECIPIENT_ID},
    modules::{
        download::model::DownloadContext,
        file::{
            repository::{DownloadRepository, FileRepository},
            schema::DownloadRecord,
        },
        storage::repository::ObjectStore,
        workflow::pipeline::Step,
    },
};

const NOT_AUTHORIZED: &str = "User is not authorized to download or file does not exist";

pub struct ValidateDownload;

#[async_trait::async_trait]
impl Step<DownloadContext> for ValidateDownload {
    fn name(&self) -> &'static str {
        "validate"
    }

    async fn run(&self, ctx: DownloadContext) -> Result<DownloadContext, error::SystemError> {
        ctx.request
            .validate()
            .map_err(|_| error::SystemError::bad_request("Download request is invalid"))?;
        Ok(ctx)
    }
}

/// Recipients are bound by their record's limit and expiry; owners always pass.
pub struct AuthorizeDownload {
    files: Arc<dyn FileRepository + Send + Sync>,
    downloads: Arc<dyn DownloadRepository + Send + Sync>,
}

impl AuthorizeDownload {
    pub fn new(
        files: Arc<dyn FileRepository + Send + Sync>,
        downloads: Arc<dyn DownloadRepository + Send + Sync>,
    ) -> Self {
        AuthorizeDownload { files, downloads }
    }
}

#[async_trait::async_trait]
impl Step<DownloadContext> for AuthorizeDownload {
    fn name(&self) -> &'static str {
        "authorize"
    }

    async fn run(&self, mut ctx: DownloadContext) -> Result<DownloadContext, error::SystemError> {
        let Some(user) = &ctx.user else {
            return Err(error::SystemError::internal("download context is missing user"));
        };
        let user_id = user.id.to_string();
        let file_id = &ctx.request.file_id;

        if let Some(record) = self.files.find(file_id, &user.email).await? {
            if let Some(limit) = record.download_limit {
                let count = self.downloads.count(file_id, &user_id).await?;
                if count >= i64::from(limit) {
                    log::info!("Download limit reached for {} on file {}", user_id, file_id);
                    return Err(error::SystemError::forbidden(NOT_AUTHORIZED));
                }
            }
            if record.is_expired_at(Utc::now()) {
                log::info!("Share of file {} to {} has expired", file_id, user_id);
                return Err(error::SystemError::forbidden(NOT_AUTHORIZED));
            }
            ctx.file = Some(record);
            return Ok(ctx);
        }

        match self.files.find_owner_record(file_id).await? {
            Some(owner) if owner.owner_id == user_id => {
                ctx.file = Some(owner);
                Ok(ctx)
            }
            _ => Err(error::SystemError::forbidden(NOT_AUTHORIZED)),
        }
    }
}

/// Records the authorized download; rows expire after `ttl`.
pub struct AuditDownload {
    downloads: Arc<dyn DownloadRepository + Send + Sync>,
    ttl: chrono::Duration,
}

impl AuditDownload {
    pub fn new(downloads: Arc<dyn DownloadRepository + Send + Sync>, ttl: chrono::Duration) -> Self {
        AuditDownload { downloads, ttl }
    }
}

#[async_trait::async_trait]
impl Step<DownloadContext> for AuditDownload {
    fn name(&self) -> &'static str {
        "audit"
    }

    async fn run(&self, ctx: DownloadContext) -> Result<DownloadContext, error::SystemError> {
        let record = DownloadRecord::new(
            &ctx.request.file_id,
            &ctx.request.user_id,
            Utc::now(),
            self.ttl,
        );
        self.downloads.create(&record).await?;
        Ok(ctx)
    }
}

pub struct IssueDownloadUrl {
    objects: Arc<dyn ObjectStore + Send + Sync>,
}

impl IssueDownloadUrl {
    pub fn new(objects: Arc<dyn ObjectStore + Send + Sync>) -> Self {
        IssueDownloadUrl { objects }
    }
}

#[async_trait::async_trait]
impl Step<DownloadContext> for IssueDownloadUrl {
    fn name(&self) -> &'static str {
        "process"
    }

    async fn run(&self, mut ctx: DownloadContext) -> Result<DownloadContext, error::SystemError> {
        let (Some(user), Some(file)) = (&ctx.user, &ctx.file) else {
            return Err(error::SystemError::internal("download context is missing user or file"));
        };

        let presigned = self
            .objects
            .presign_download(
                &file.object_key(),
                &[
                    (META_RECIPIENT_ID, ctx.request.user_id.as_str()),
                    (META_RECIPIENT_EMAIL, user.email.as_str()),
                    (META_FILENAME, file.filename.as_str()),
                ],
            )
            .await?;

        ctx.download_url = Some(presigned.url);
        Ok(ctx)
    }
}
