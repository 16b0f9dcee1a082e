//! Core Weekly Byte library (fetching, selection, digest dispatch, config).

pub mod backend;
pub mod config;
pub mod dashboard;
pub mod dispatch;
pub mod fetch;
pub mod item;
pub mod logging;
pub mod notify;
pub mod prefs;
pub mod selection;
pub mod store;
pub mod wire;
