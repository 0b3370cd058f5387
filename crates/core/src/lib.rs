//! Seamline Core - Shared report types and aggregation logic.
//!
//! This crate provides the domain model used across all Seamline components:
//! - `server` - Report API and ERP integration layer
//! - `integration-tests` - End-to-end tests against a mock ERP
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no HTML parsing. Everything here is a deterministic function of
//! its inputs, which keeps the numeric reconciliation logic trivially
//! testable.
//!
//! # Modules
//!
//! - [`report`] - Scraped record types (report blocks, challans, floor lines)
//! - [`qty`] - Tolerant quantity/text extraction from scraped cells
//! - [`metrics`] - Derived per-size metrics and block totals
//! - [`size_order`] - Canonical garment size ordering
//! - [`color_group`] - Color-wise challan grouping
//! - [`po`] - PO sheet color/size pivot tables

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod color_group;
pub mod metrics;
pub mod po;
pub mod qty;
pub mod report;
pub mod size_order;
