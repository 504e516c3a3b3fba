use actix_web::web;

use crate::handlers::attendance;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            .route("", web::get().to(attendance::daily_attendance))
            .route("/check-in", web::post().to(attendance::check_in))
            .route("/current", web::get().to(attendance::currently_in))
            .route("/{id}/check-out", web::post().to(attendance::check_out)),
    );
}
