use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::file::schema::FileRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub file_id: String,
    pub filename: String,
    pub size: i64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub owner_id: String,
    pub owner_email: String,
    pub owner_name: String,
    pub date_added: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_limit: Option<i32>,
}

impl From<&FileRecord> for FileResponse {
    fn from(record: &FileRecord) -> Self {
        FileResponse {
            file_id: record.file_id.clone(),
            filename: record.filename.clone(),
            size: record.size,
            content_type: record.content_type.clone(),
            owner_id: record.owner_id.clone(),
            owner_email: record.owner_email.clone(),
            owner_name: record.owner_name.clone(),
            date_added: record.date_added,
            expiry_date: record.expiry_date,
            download_limit: record.download_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub recipient_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_limit: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_shared: Option<DateTime<Utc>>,
}

impl From<&FileRecord> for Recipient {
    fn from(record: &FileRecord) -> Self {
        Recipient {
            recipient_email: record.recipient_email.clone(),
            notify: record.notify,
            expiry_date: record.expiry_date,
            download_limit: record.download_limit,
            date_shared: record.date_shared,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnedFile {
    #[serde(flatten)]
    pub file: FileResponse,
    pub recipients: Vec<Recipient>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedFile {
    #[serde(flatten)]
    pub file: FileResponse,
    pub recipient_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<bool>,
    pub date_shared: Option<DateTime<Utc>>,
}

impl From<FileRecord> for SharedFile {
    fn from(record: FileRecord) -> Self {
        SharedFile {
            file: FileResponse::from(&record),
            recipient_email: record.recipient_email,
            notify: record.notify,
            date_shared: record.date_shared,
        }
    }
}

/// Groups owner-index rows into one entry per owner record, each listing its recipients.
/// Recipient rows whose owner record is missing are dropped.
pub fn group_owned_files(rows: Vec<FileRecord>) -> Vec<OwnedFile> {
    let (owners, recipients): (Vec<_>, Vec<_>) =
        rows.into_iter().partition(|row| row.is_owner_record());

    owners
        .iter()
        .map(|owner| OwnedFile {
            file: FileResponse::from(owner),
            recipients: recipients
                .iter()
                .filter(|r| r.file_id == owner.file_id)
                .map(Recipient::from)
                .collect(),
        })
        .collect()
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecipientEmailModel {
    #[validate(email(message = "Invalid email format"))]
    pub recipient_email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteRecipientsModel {
    #[validate(length(min = 1, message = "At least one recipient is required"), nested)]
    pub recipients: Vec<RecipientEmailModel>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub upload_url: String,
    pub file_id: String,
    pub headers: BTreeMap<String, String>,
}
