use actix_web::web;

use crate::handlers::payments;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments").route("/webhook", web::post().to(payments::payment_webhook)),
    );
}
