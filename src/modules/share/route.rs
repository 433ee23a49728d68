use crate::{modules::share::handle::*, utils::json_config};
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/share").app_data(json_config("Share request is invalid")).service(share_file),
    );
}
