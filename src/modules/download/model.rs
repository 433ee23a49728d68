use serde::Serialize;
use validator::Validate;

use crate::modules::{
    file::schema::FileRecord, user::model::UserInfo, workflow::identity::RequesterContext,
};

#[derive(Debug, Clone, Validate)]
pub struct DownloadRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
    #[validate(length(min = 1))]
    pub file_id: String,
}

pub struct DownloadContext {
    pub request: DownloadRequest,
    pub user: Option<UserInfo>,
    pub file: Option<FileRecord>,
    pub download_url: Option<String>,
}

impl DownloadContext {
    pub fn new(request: DownloadRequest) -> Self {
        DownloadContext { request, user: None, file: None, download_url: None }
    }
}

impl RequesterContext for DownloadContext {
    fn user_id(&self) -> &str {
        &self.request.user_id
    }

    fn attach_user(&mut self, user: UserInfo) {
        self.user = Some(user);
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub download_url: String,
}
