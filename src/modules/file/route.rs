use crate::{modules::file::handle::*, utils::json_config};
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(upload_file).service(list_shared_files).service(
        scope("/owned-files")
            .app_data(json_config("Invalid request"))
            .service(list_owned_files)
            .service(delete_recipients)
            .service(delete_file),
    );
}
