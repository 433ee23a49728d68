use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use validator::Validate;

use crate::{
    api::error,
    constants::OWNER_RECIPIENT,
    modules::{
        file::{repository::FileRepository, schema::FileRecord},
        share::model::ShareContext,
        storage::{repository::ObjectStore, schema::object_key},
        workflow::pipeline::Step,
    },
    utils::parse_iso_datetime,
};

pub struct ValidateShare;

#[async_trait::async_trait]
impl Step<ShareContext> for ValidateShare {
    fn name(&self) -> &'static str {
        "validate"
    }

    async fn run(&self, ctx: ShareContext) -> Result<ShareContext, error::SystemError> {
        ctx.request
            .validate()
            .map_err(|_| error::SystemError::bad_request("Share request is invalid"))?;
        Ok(ctx)
    }
}

/// The object must exist under the requester's prefix and carry their id as owner.
pub struct AuthorizeShare {
    objects: Arc<dyn ObjectStore + Send + Sync>,
}

impl AuthorizeShare {
    pub fn new(objects: Arc<dyn ObjectStore + Send + Sync>) -> Self {
        AuthorizeShare { objects }
    }
}

#[async_trait::async_trait]
impl Step<ShareContext> for AuthorizeShare {
    fn name(&self) -> &'static str {
        "authorize"
    }

    async fn run(&self, mut ctx: ShareContext) -> Result<ShareContext, error::SystemError> {
        let key = object_key(&ctx.request.user_id, &ctx.request.file_id);
        match self.objects.head(&key).await? {
            Some(meta) if meta.owner_id == ctx.request.user_id => {
                ctx.file = Some(meta);
                Ok(ctx)
            }
            _ => Err(error::SystemError::forbidden("User is not authorized to share this file")),
        }
    }
}

pub struct AuditShare;

#[async_trait::async_trait]
impl Step<ShareContext> for AuditShare {
    fn name(&self) -> &'static str {
        "audit"
    }

    async fn run(&self, ctx: ShareContext) -> Result<ShareContext, error::SystemError> {
        Ok(ctx)
    }
}

/// Writes the owner record when absent, then one record per recipient.
pub struct PersistShare {
    files: Arc<dyn FileRepository + Send + Sync>,
}

impl PersistShare {
    pub fn new(files: Arc<dyn FileRepository + Send + Sync>) -> Self {
        PersistShare { files }
    }
}

#[async_trait::async_trait]
impl Step<ShareContext> for PersistShare {
    fn name(&self) -> &'static str {
        "persist"
    }

    async fn run(&self, mut ctx: ShareContext) -> Result<ShareContext, error::SystemError> {
        let (Some(user), Some(meta)) = (&ctx.user, &ctx.file) else {
            return Err(error::SystemError::internal("share context is missing user or file"));
        };
        let now = Utc::now();
        let request = &ctx.request;

        let owner = match self.files.find_owner_record(&request.file_id).await? {
            Some(existing) => existing,
            None => {
                let record = FileRecord {
                    file_id: request.file_id.clone(),
                    recipient_email: OWNER_RECIPIENT.to_string(),
                    owner_id: meta.owner_id.clone(),
                    owner_email: user.email.clone(),
                    owner_name: user.name.clone(),
                    filename: meta.filename.clone(),
                    size: meta.size,
                    content_type: meta.content_type.clone(),
                    date_added: now,
                    expiry_date: None,
                    download_limit: None,
                    notify: None,
                    date_shared: None,
                };
                self.files.put(&record).await?;
                log::info!("Created owner record for file {}", record.file_id);
                record
            }
        };

        let default_expiry = request.expiry_date.as_deref().and_then(parse_iso_datetime);

        // Later entries for the same email win, as with repeated puts.
        let mut seen = HashSet::new();
        let mut records: Vec<FileRecord> = request
            .recipients
            .iter()
            .rev()
            .filter(|r| r.recipient_email != OWNER_RECIPIENT)
            .filter(|r| seen.insert(r.recipient_email.clone()))
            .map(|r| {
                let expiry = match r.expiry_date.as_deref() {
                    Some(value) => parse_iso_datetime(value),
                    None => default_expiry,
                };
                owner.for_recipient(
                    &r.recipient_email,
                    r.notify,
                    expiry,
                    r.download_limit.or(request.download_limit),
                    now,
                )
            })
            .collect();
        records.reverse();

        self.files.put_many(&records).await?;

        ctx.shared_with = records;
        Ok(ctx)
    }
}

/// Written recipients that asked to be notified.
pub fn notification_targets(records: &[FileRecord]) -> Vec<&str> {
    records
        .iter()
        .filter(|r| r.notify == Some(true))
        .map(|r| r.recipient_email.as_str())
        .collect()
}

pub struct NotifyRecipients {
    api_url: String,
}

impl NotifyRecipients {
    pub fn new(api_url: impl Into<String>) -> Self {
        NotifyRecipients { api_url: api_url.into() }
    }

    pub fn download_link(&self, file_id: &str) -> String {
        format!("{}/api/download/{}", self.api_url.trim_end_matches('/'), file_id)
    }
}

#[async_trait::async_trait]
impl Step<ShareContext> for NotifyRecipients {
    fn name(&self) -> &'static str {
        "notify"
    }

    async fn run(&self, ctx: ShareContext) -> Result<ShareContext, error::SystemError> {
        let link = self.download_link(&ctx.request.file_id);
        for email in notification_targets(&ctx.shared_with) {
            log::info!("Share notification for {}: {}", email, link);
        }
        Ok(ctx)
    }
}
