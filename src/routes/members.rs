use actix_web::web;

use crate::handlers::members;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/members")
            .route("", web::post().to(members::register_member))
            .route("", web::get().to(members::list_members))
            .route("/register", web::post().to(members::register_with_plans))
            .route("/{id}", web::get().to(members::get_member))
            .route("/{id}/tickets", web::get().to(members::get_member_tickets))
            .route(
                "/{id}/membership",
                web::get().to(members::get_active_membership),
            )
            .route("/{id}/sales", web::get().to(members::get_member_sales))
            .route("/{id}/bookings", web::get().to(members::get_member_bookings))
            .route(
                "/{id}/attendance",
                web::get().to(members::get_member_attendance),
            )
            .route("/{id}/payments", web::get().to(members::get_member_payments)),
    );
}
