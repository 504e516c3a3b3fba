use actix_web::web;

use crate::handlers::inquiries;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/inquiries")
            .route("", web::post().to(inquiries::create_inquiry))
            .route("", web::get().to(inquiries::list_inquiries))
            .route("/{id}", web::get().to(inquiries::get_inquiry))
            .route("/{id}/reply", web::post().to(inquiries::reply_inquiry)),
    );
}
