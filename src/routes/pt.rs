use actix_web::web;

use crate::handlers::pt;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/trainers")
            .route("", web::post().to(pt::create_trainer))
            .route("", web::get().to(pt::list_trainers))
            .route("/{id}", web::get().to(pt::get_trainer))
            .route("/{id}", web::put().to(pt::update_trainer))
            .route("/{id}", web::delete().to(pt::delete_trainer))
            .route("/{id}/slots", web::get().to(pt::free_slots))
            .route("/{id}/completed", web::get().to(pt::monthly_completed)),
    )
    .service(
        web::scope("/bookings")
            .route("", web::post().to(pt::book))
            .route("", web::get().to(pt::daily_schedule))
            .route("/{id}/cancel", web::post().to(pt::cancel_booking))
            .route("/{id}/complete", web::post().to(pt::complete_booking)),
    );
}
