use actix_web::{get, post, web, HttpRequest};

use crate::middlewares::get_claims;
use crate::modules::user::model::{SignInModel, SignInResponse, SignUpModel, SignUpResponse, UserInfo};
use crate::modules::user::service::UserService;
use crate::{
    api::{error, success},
    utils::ValidatedJson,
};

#[get("/profile")]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<UserInfo>, error::Error> {
    let id = get_claims(&req)?.sub;
    let user = user_service.get_by_id(id).await?;
    Ok(success::Success::ok(Some(user)).message("Profile retrieved successfully"))
}

#[post("/signup")]
pub async fn sign_up(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<SignUpModel>,
) -> Result<success::Success<SignUpResponse>, error::Error> {
    let user_id = user_service.sign_up(user_data.0).await?;
    Ok(success::Success::created(Some(SignUpResponse { id: user_id })).message("Signup successful"))
}

#[post("/signin")]
pub async fn sign_in(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<SignInModel>,
) -> Result<success::Success<SignInResponse>, error::Error> {
    let access_token = user_service.sign_in(user_data.0).await?;
    Ok(success::Success::ok(Some(SignInResponse { access_token })).message("Signin successful"))
}
