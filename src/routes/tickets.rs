use actix_web::web;

use crate::handlers::tickets;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/plans").route(web::get().to(tickets::list_plans)))
        .service(
            web::scope("/tickets")
                .route("", web::post().to(tickets::issue_ticket))
                .route("", web::get().to(tickets::list_tickets))
                .route(
                    "/fix-dates",
                    web::post().to(tickets::fix_degenerate_windows),
                )
                .route("/{id}/sessions", web::post().to(tickets::consume_session))
                .route("/{id}/trainer", web::put().to(tickets::assign_trainer)),
        );
}
