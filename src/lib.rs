// src/lib.rs

//! housing-watch library
//!
//! Fetches the Student Housing Aarhus listings, compares them with the last
//! delivered snapshot and mails a report when something changed.

pub mod error;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
