use actix_web::{post, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::share::{
        model::{ShareBody, ShareRequest, ShareResponse},
        service::ShareWorkflow,
    },
};

#[post("/{file_id}")]
pub async fn share_file(
    workflow: web::Data<ShareWorkflow>,
    file_id: web::Path<String>,
    body: web::Json<ShareBody>,
    req: HttpRequest,
) -> Result<success::Success<ShareResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub.to_string();
    let request = ShareRequest::new(user_id, file_id.into_inner(), body.into_inner());
    let response = workflow.run(request).await?;
    Ok(success::Success::ok(Some(response)).message("File shared successfully"))
}
