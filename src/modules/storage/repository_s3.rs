use std::collections::BTreeMap;
use std::time::Duration;

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::{PresignedRequest, PresigningConfig};

use crate::{
    api::error,
    constants::{META_FILENAME, META_OWNER_ID},
    modules::storage::{
        repository::ObjectStore,
        schema::{ObjectMetadata, PresignedUrl},
    },
};

#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    expires_in: Duration,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>, expires_in: Duration) -> Self {
        Self { client, bucket: bucket.into(), expires_in }
    }

    fn presigning_config(&self) -> Result<PresigningConfig, error::SystemError> {
        PresigningConfig::expires_in(self.expires_in)
            .map_err(|e| error::SystemError::object_store(e.to_string()))
    }
}

fn to_presigned_url(request: PresignedRequest) -> PresignedUrl {
    let headers = request
        .headers()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect::<BTreeMap<_, _>>();
    PresignedUrl { url: request.uri().to_string(), headers }
}

/// User metadata travels as signed `x-amz-meta-*` headers, which must stay ASCII.
fn encode_metadata_value(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn decode_metadata_value(value: &str) -> String {
    urlencoding::decode(value).map(|v| v.into_owned()).unwrap_or_else(|_| value.to_string())
}

fn metadata_query(metadata: &[(&str, &str)]) -> String {
    metadata
        .iter()
        .map(|(key, value)| {
            format!("x-amz-meta-{}={}", urlencoding::encode(key), urlencoding::encode(value))
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        metadata: &[(&str, &str)],
    ) -> Result<PresignedUrl, error::SystemError> {
        let mut request =
            self.client.put_object().bucket(&self.bucket).key(key).content_type(content_type);
        for (name, value) in metadata {
            request = request.metadata(*name, encode_metadata_value(value));
        }

        let presigned = request
            .presigned(self.presigning_config()?)
            .await
            .map_err(|e| error::SystemError::object_store(DisplayErrorContext(&e).to_string()))?;

        Ok(to_presigned_url(presigned))
    }

    async fn presign_download(
        &self,
        key: &str,
        metadata: &[(&str, &str)],
    ) -> Result<PresignedUrl, error::SystemError> {
        let query = metadata_query(metadata);

        // The extra query parameters must be in place before signing.
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .customize()
            .mutate_request(move |req| {
                if query.is_empty() {
                    return;
                }
                let separator = if req.uri().contains('?') { '&' } else { '?' };
                let uri = format!("{}{}{}", req.uri(), separator, query);
                if let Err(e) = req.set_uri(uri) {
                    log::warn!("Could not attach download metadata to request: {}", e);
                }
            })
            .presigned(self.presigning_config()?)
            .await
            .map_err(|e| error::SystemError::object_store(DisplayErrorContext(&e).to_string()))?;

        Ok(to_presigned_url(presigned))
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectMetadata>, error::SystemError> {
        let response = match self.client.head_object().bucket(&self.bucket).key(key).send().await
        {
            Ok(response) => response,
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                    return Ok(None);
                }
                return Err(error::SystemError::object_store(DisplayErrorContext(&e).to_string()));
            }
        };

        let (Some(content_type), Some(size), Some(metadata)) =
            (response.content_type(), response.content_length(), response.metadata())
        else {
            return Err(error::SystemError::object_store(format!(
                "Invalid object metadata for {key}"
            )));
        };

        let owner_id =
            metadata.get(META_OWNER_ID).map(|v| decode_metadata_value(v)).unwrap_or_default();
        let filename =
            metadata.get(META_FILENAME).map(|v| decode_metadata_value(v)).unwrap_or_default();

        Ok(Some(ObjectMetadata {
            filename,
            size,
            content_type: content_type.to_string(),
            owner_id,
        }))
    }

    async fn delete(&self, key: &str) -> Result<(), error::SystemError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| error::SystemError::object_store(DisplayErrorContext(&e).to_string()))?;

        log::debug!("Deleted object '{}' from bucket '{}'", key, self.bucket);
        Ok(())
    }
}
