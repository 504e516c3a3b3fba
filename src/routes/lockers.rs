use actix_web::web;

use crate::handlers::lockers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/lockers")
            .route("", web::get().to(lockers::list_lockers))
            .route("/summary", web::get().to(lockers::get_summary))
            .route("/{number}", web::get().to(lockers::get_locker))
            .route("/{number}/assign", web::post().to(lockers::assign_locker))
            .route("/{number}/release", web::post().to(lockers::release_locker))
            .route(
                "/{number}/maintenance",
                web::put().to(lockers::set_maintenance),
            ),
    );
}
