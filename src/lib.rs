pub mod auth;
pub mod config;
pub mod constants;
pub mod domain;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod mapper;
pub mod metrics;
pub mod ordering;
pub mod server;
pub mod service;
pub mod state;
pub mod storage;
