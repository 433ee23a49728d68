use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    modules::{
        file::schema::FileRecord, storage::schema::ObjectMetadata, user::model::UserInfo,
        workflow::identity::RequesterContext,
    },
    utils::validate_iso_date,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecipientInput {
    #[validate(email)]
    pub recipient_email: String,
    pub notify: Option<bool>,
    #[validate(custom(function = "validate_iso_date"))]
    pub expiry_date: Option<String>,
    #[validate(range(min = 1))]
    pub download_limit: Option<i32>,
}

/// Body of `POST /share/{file_id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareBody {
    #[serde(default)]
    pub recipients: Vec<RecipientInput>,
    pub expiry_date: Option<String>,
    pub download_limit: Option<i32>,
}

#[derive(Debug, Clone, Validate)]
pub struct ShareRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
    #[validate(length(min = 1))]
    pub file_id: String,
    #[validate(length(min = 1), nested)]
    pub recipients: Vec<RecipientInput>,
    #[validate(custom(function = "validate_iso_date"))]
    pub expiry_date: Option<String>,
    #[validate(range(min = 1))]
    pub download_limit: Option<i32>,
}

impl ShareRequest {
    pub fn new(user_id: String, file_id: String, body: ShareBody) -> Self {
        ShareRequest {
            user_id,
            file_id,
            recipients: body.recipients,
            expiry_date: body.expiry_date,
            download_limit: body.download_limit,
        }
    }
}

pub struct ShareContext {
    pub request: ShareRequest,
    pub user: Option<UserInfo>,
    pub file: Option<ObjectMetadata>,
    /// Recipient records actually written, in request order without duplicates.
    pub shared_with: Vec<FileRecord>,
}

impl ShareContext {
    pub fn new(request: ShareRequest) -> Self {
        ShareContext { request, user: None, file: None, shared_with: Vec::new() }
    }
}

impl RequesterContext for ShareContext {
    fn user_id(&self) -> &str {
        &self.request.user_id
    }

    fn attach_user(&mut self, user: UserInfo) {
        self.user = Some(user);
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub file_id: String,
    pub recipients: Vec<String>,
}
