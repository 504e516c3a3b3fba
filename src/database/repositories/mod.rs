//! Storage access, one module per table. Every function takes a bare
//! connection so it can run on a pooled connection or inside a transaction.

pub mod attendance;
pub mod inquiry;
pub mod locker;
pub mod member;
pub mod payment;
pub mod request;
pub mod sale;
pub mod schedule;
pub mod ticket;
pub mod trainer;
