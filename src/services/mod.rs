pub mod attendance;
pub mod auth;
pub mod catalog;
pub mod clock;
pub mod entitlements;
pub mod inquiries;
pub mod lockers;
pub mod members;
pub mod payments;
pub mod pt;
pub mod requests;
pub mod status;
pub mod trainers;

pub use auth::{Caller, Claims, Role};
pub use catalog::PlanCatalog;
pub use clock::{Clock, FixedClock, SharedClock, SystemClock};
pub use status::EntitlementStatus;
