//! API Routes
//!
//! Route handlers organized by functionality.

pub mod bins;
pub mod events;
pub mod health;
pub mod history;
pub mod locations;
