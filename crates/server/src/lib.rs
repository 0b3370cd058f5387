//! Seamline server library.
//!
//! Production-reporting backend for a garments manufacturer: wraps a
//! legacy server-rendered ERP behind a JSON API. The crate is a library
//! so the integration tests can drive the ERP layer and services against
//! an in-process mock ERP.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod erp;
pub mod error;
pub mod reports;
pub mod routes;
pub mod state;
