pub mod attendance;
pub mod inquiry;
pub mod locker;
pub(crate) mod macros;
pub mod member;
pub mod payment;
pub mod plan;
pub mod request;
pub mod sale;
pub mod schedule;
pub mod ticket;
pub mod trainer;

// Re-export all models for easy importing
pub use attendance::*;
pub use inquiry::*;
pub use locker::*;
pub use member::*;
pub use payment::*;
pub use plan::*;
pub use request::*;
pub use sale::*;
pub use schedule::*;
pub use ticket::*;
pub use trainer::*;
