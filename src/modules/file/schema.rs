use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::constants::OWNER_RECIPIENT;
use crate::modules::storage::schema::object_key;
use crate::utils::to_iso_string;

/// One row of the file table: either the owner record (`recipient_email == "-"`)
/// or a recipient record carrying a copy of the file attributes.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_id: String,
    pub recipient_email: String,
    pub owner_id: String,
    pub owner_email: String,
    pub owner_name: String,
    pub filename: String,
    pub size: i64,
    pub content_type: String,
    pub date_added: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub download_limit: Option<i32>,
    pub notify: Option<bool>,
    pub date_shared: Option<DateTime<Utc>>,
}

impl FileRecord {
    pub fn is_owner_record(&self) -> bool {
        self.recipient_email == OWNER_RECIPIENT
    }

    pub fn object_key(&self) -> String {
        object_key(&self.owner_id, &self.file_id)
    }

    /// Recipient record inheriting this file's attributes.
    pub fn for_recipient(
        &self,
        recipient_email: &str,
        notify: Option<bool>,
        expiry_date: Option<DateTime<Utc>>,
        download_limit: Option<i32>,
        date_shared: DateTime<Utc>,
    ) -> FileRecord {
        FileRecord {
            recipient_email: recipient_email.to_string(),
            expiry_date,
            download_limit,
            notify,
            date_shared: Some(date_shared),
            ..self.clone()
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| now > expiry)
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub file_id: String,
    pub download_id: String,
    pub user_id: String,
    pub date_time_stamp: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl DownloadRecord {
    pub fn new(file_id: &str, user_id: &str, at: DateTime<Utc>, ttl: Duration) -> Self {
        DownloadRecord {
            file_id: file_id.to_string(),
            download_id: format!("{}{}", download_id_prefix(user_id), to_iso_string(&at)),
            user_id: user_id.to_string(),
            date_time_stamp: at,
            expires_at: at + ttl,
        }
    }
}

/// All download ids of one user for a file start with this prefix.
pub fn download_id_prefix(user_id: &str) -> String {
    format!("{user_id}#")
}
