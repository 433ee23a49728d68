use actix_web::{get, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::download::{
        model::{DownloadRequest, DownloadResponse},
        service::DownloadWorkflow,
    },
};

#[get("/download/{file_id}")]
pub async fn download_file(
    workflow: web::Data<DownloadWorkflow>,
    file_id: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<DownloadResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub.to_string();
    let request = DownloadRequest { user_id, file_id: file_id.into_inner() };
    let download_url = workflow.run(request).await?;
    Ok(success::Success::ok(Some(DownloadResponse { download_url })))
}
