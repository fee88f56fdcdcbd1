//! Step-by-step walkthrough of a columnar analytic database.
//!
//! [`tour::run_tour`] issues DDL, inserts sample rows and runs join and
//! aggregation queries through any [`Warehouse`]; [`ClickHouseHttp`] is the
//! implementation that talks to a real server.

pub mod client;
pub mod table;
pub mod tour;

pub use client::{ClickHouseHttp, Warehouse, WarehouseError};
pub use table::RowSet;
pub use tour::{TourOptions, TourReport, run_tour};
