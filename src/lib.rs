// src/lib.rs

//! KTD Crawler Library
//!
//! Mirrors the files linked from a single download page and archives
//! superseded versions into dated folders.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
