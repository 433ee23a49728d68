use actix_web::{delete, get, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::file::{
        model::{DeleteRecipientsModel, OwnedFile, SharedFile, UploadResponse},
        service::FileService,
    },
};
use validator::Validate;

#[get("/upload/{filepath:.*}")]
pub async fn upload_file(
    file_service: web::Data<FileService>,
    filepath: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<UploadResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub.to_string();
    let response = file_service.create_upload_url(&user_id, &filepath).await?;
    Ok(success::Success::ok(Some(response)).message("Upload url created successfully"))
}

#[get("")]
pub async fn list_owned_files(
    file_service: web::Data<FileService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<OwnedFile>>, error::Error> {
    let user_id = get_claims(&req)?.sub.to_string();
    let files = file_service.get_owned_files(&user_id).await?;
    Ok(success::Success::ok(Some(files)).message("Files retrieved successfully"))
}

#[delete("/{file_id}")]
pub async fn delete_file(
    file_service: web::Data<FileService>,
    file_id: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub.to_string();
    file_service.delete_file(&user_id, &file_id).await?;
    Ok(success::Success::ok(None).message("File deleted successfully"))
}

#[delete("/{file_id}/recipients")]
pub async fn delete_recipients(
    file_service: web::Data<FileService>,
    file_id: web::Path<String>,
    body: web::Json<DeleteRecipientsModel>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub.to_string();
    let body = body.into_inner();
    body.validate().map_err(|_| error::Error::bad_request("Invalid request"))?;
    let emails = body.recipients.into_iter().map(|r| r.recipient_email).collect();
    file_service.delete_recipients(&user_id, &file_id, emails).await?;
    Ok(success::Success::ok(None).message("Recipients removed successfully"))
}

#[get("/shared-files")]
pub async fn list_shared_files(
    file_service: web::Data<FileService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<SharedFile>>, error::Error> {
    let user_id = get_claims(&req)?.sub.to_string();
    let files = file_service.get_shared_files(&user_id).await?;
    Ok(success::Success::ok(Some(files)).message("Shared files retrieved successfully"))
}
