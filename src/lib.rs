use axum::extract::State;
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod client;
pub mod config;
pub mod db;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod gateway;
pub mod logging;
pub mod persistence;
pub mod retry;
pub mod routing_utils;

#[cfg(test)]
mod test_util;

/// Data shared between every request handler on the backend
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
}

/// Shorthand for the axum extractor which pulls [SharedData] out of the router's state
pub type AppState = State<Arc<SharedData>>;
