use crate::{
    api::error,
    modules::storage::schema::{ObjectMetadata, PresignedUrl},
};

#[async_trait::async_trait]
pub trait ObjectStore {
    /// Signed PUT for `key`; `metadata` is stored as user metadata on the object.
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        metadata: &[(&str, &str)],
    ) -> Result<PresignedUrl, error::SystemError>;

    /// Signed GET for `key`; `metadata` is embedded as `x-amz-meta-*` query parameters
    /// so that it shows up in access logs.
    async fn presign_download(
        &self,
        key: &str,
        metadata: &[(&str, &str)],
    ) -> Result<PresignedUrl, error::SystemError>;

    async fn head(&self, key: &str) -> Result<Option<ObjectMetadata>, error::SystemError>;

    async fn delete(&self, key: &str) -> Result<(), error::SystemError>;
}
