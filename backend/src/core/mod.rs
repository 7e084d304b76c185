//! Time management

pub mod time;
