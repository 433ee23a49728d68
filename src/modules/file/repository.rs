use chrono::{DateTime, Utc};

use crate::{
    api::error,
    constants::OWNER_RECIPIENT,
    modules::file::schema::{DownloadRecord, FileRecord},
};

#[async_trait::async_trait]
pub trait FileRepository {
    async fn find(
        &self,
        file_id: &str,
        recipient_email: &str,
    ) -> Result<Option<FileRecord>, error::SystemError>;

    async fn find_owner_record(
        &self,
        file_id: &str,
    ) -> Result<Option<FileRecord>, error::SystemError> {
        self.find(file_id, OWNER_RECIPIENT).await
    }

    /// Every record (owner and recipients) sharing the file id.
    async fn find_by_file(&self, file_id: &str) -> Result<Vec<FileRecord>, error::SystemError>;

    /// Owner index lookup.
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<FileRecord>, error::SystemError>;

    /// Recipient index lookup.
    async fn find_by_recipient(
        &self,
        recipient_email: &str,
    ) -> Result<Vec<FileRecord>, error::SystemError>;

    /// Inserts or replaces records keyed by `(file_id, recipient_email)`.
    async fn put_many(&self, records: &[FileRecord]) -> Result<(), error::SystemError>;

    async fn put(&self, record: &FileRecord) -> Result<(), error::SystemError> {
        self.put_many(std::slice::from_ref(record)).await
    }

    async fn delete_many(
        &self,
        file_id: &str,
        recipient_emails: &[String],
    ) -> Result<u64, error::SystemError>;
}

#[async_trait::async_trait]
pub trait DownloadRepository {
    async fn create(&self, record: &DownloadRecord) -> Result<(), error::SystemError>;

    /// Number of download records for the file whose id begins with `{user_id}#`.
    async fn count(&self, file_id: &str, user_id: &str) -> Result<i64, error::SystemError>;

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, error::SystemError>;
}
