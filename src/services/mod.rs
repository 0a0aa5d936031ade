//! Route editing services

pub mod edit_session;
pub mod geo;
pub mod ledger;
pub mod map;
pub mod optimizer;
pub mod overlay;
pub mod render;
pub mod requests;
pub mod schedule;
pub mod validation;
