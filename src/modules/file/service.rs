use std::sync::Arc;

use uuid::Uuid;

use crate::api::error;
use crate::constants::{META_FILENAME, META_OWNER_ID, OWNER_RECIPIENT};
use crate::modules::file::model::{group_owned_files, OwnedFile, SharedFile, UploadResponse};
use crate::modules::file::repository::FileRepository;
use crate::modules::file::schema::FileRecord;
use crate::modules::storage::{repository::ObjectStore, schema::object_key};
use crate::modules::user::identity::IdentityProvider;

#[derive(Clone)]
pub struct FileService {
    files: Arc<dyn FileRepository + Send + Sync>,
    objects: Arc<dyn ObjectStore + Send + Sync>,
    identity: Arc<dyn IdentityProvider + Send + Sync>,
}

impl FileService {
    pub fn with_dependencies(
        files: Arc<dyn FileRepository + Send + Sync>,
        objects: Arc<dyn ObjectStore + Send + Sync>,
        identity: Arc<dyn IdentityProvider + Send + Sync>,
    ) -> Self {
        FileService { files, objects, identity }
    }

    /// Issues a signed PUT URL for a new file id under the user's prefix.
    pub async fn create_upload_url(
        &self,
        user_id: &str,
        filename: &str,
    ) -> Result<UploadResponse, error::SystemError> {
        if filename.trim().is_empty() {
            return Err(error::SystemError::bad_request("File path parameter is missing"));
        }

        let file_id = Uuid::new_v4().to_string();
        let key = object_key(user_id, &file_id);
        let content_type = mime_guess::from_path(filename).first_or_octet_stream();

        let presigned = self
            .objects
            .presign_upload(
                &key,
                content_type.as_ref(),
                &[(META_OWNER_ID, user_id), (META_FILENAME, filename)],
            )
            .await?;

        log::info!("Issued upload url for {}", key);

        Ok(UploadResponse { upload_url: presigned.url, file_id, headers: presigned.headers })
    }

    pub async fn get_owned_files(
        &self,
        user_id: &str,
    ) -> Result<Vec<OwnedFile>, error::SystemError> {
        let rows = self.files.find_by_owner(user_id).await?;
        Ok(group_owned_files(rows))
    }

    pub async fn get_shared_files(
        &self,
        user_id: &str,
    ) -> Result<Vec<SharedFile>, error::SystemError> {
        let user = self.identity.get_user(user_id).await?;
        let rows = self.files.find_by_recipient(&user.email).await?;
        Ok(rows.into_iter().map(SharedFile::from).collect())
    }

    async fn owned_record(
        &self,
        user_id: &str,
        file_id: &str,
        message: &'static str,
    ) -> Result<FileRecord, error::SystemError> {
        match self.files.find_owner_record(file_id).await? {
            Some(file) if file.owner_id == user_id => Ok(file),
            _ => Err(error::SystemError::forbidden(message)),
        }
    }

    /// Removes the owner record, every recipient record and then the stored object.
    pub async fn delete_file(&self, user_id: &str, file_id: &str) -> Result<(), error::SystemError> {
        self.owned_record(
            user_id,
            file_id,
            "User is not authorized to delete file or file does not exist",
        )
        .await?;

        let recipient_emails: Vec<String> = self
            .files
            .find_by_file(file_id)
            .await?
            .into_iter()
            .map(|record| record.recipient_email)
            .collect();

        let deleted = self.files.delete_many(file_id, &recipient_emails).await?;
        log::info!("Deleted {} record(s) for file {}", deleted, file_id);

        self.objects.delete(&object_key(user_id, file_id)).await?;

        Ok(())
    }

    /// Revokes the given recipients; the owner record and the object stay in place.
    pub async fn delete_recipients(
        &self,
        user_id: &str,
        file_id: &str,
        recipient_emails: Vec<String>,
    ) -> Result<u64, error::SystemError> {
        self.owned_record(
            user_id,
            file_id,
            "User is not authorized to modify file or file does not exist",
        )
        .await?;

        let recipient_emails: Vec<String> =
            recipient_emails.into_iter().filter(|email| email != OWNER_RECIPIENT).collect();

        self.files.delete_many(file_id, &recipient_emails).await
    }
}
