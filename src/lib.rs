pub mod browser;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod ledger;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod types;
