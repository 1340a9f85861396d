//! Splits new time entries around the existing entries of a project, then
//! aligns them to time fragments or rounds them as the project is configured.

pub mod dates;
pub mod earnings;
pub mod errors;
pub mod fragments;
pub mod interval;
pub mod logging;
pub mod materialize;
pub mod models;
pub mod notification;
pub mod overlap;
pub mod rounding;
pub mod settings;
pub mod storage;

pub use errors::{Result, TimeEntryError};
