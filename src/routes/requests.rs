use actix_web::web;

use crate::handlers::requests;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/requests")
            .route("", web::post().to(requests::create_request))
            .route("", web::get().to(requests::list_requests))
            .route("/{id}", web::get().to(requests::get_request))
            .route("/{id}/approve", web::post().to(requests::approve_request))
            .route("/{id}/reject", web::post().to(requests::reject_request)),
    );
}
