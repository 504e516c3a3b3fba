use actix_web::web;

pub mod attendance;
pub mod inquiries;
pub mod lockers;
pub mod members;
pub mod payments;
pub mod pt;
pub mod requests;
pub mod tickets;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(members::configure)
            .configure(tickets::configure)
            .configure(lockers::configure)
            .configure(pt::configure)
            .configure(attendance::configure)
            .configure(requests::configure)
            .configure(inquiries::configure)
            .configure(payments::configure),
    );
}
