pub mod attendance;
pub mod inquiries;
pub mod lockers;
pub mod members;
pub mod payments;
pub mod pt;
pub mod requests;
pub mod shared;
pub mod tickets;
