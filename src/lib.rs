pub mod api;
pub mod config;
pub mod models;
pub mod service;

pub use config::{AppConfig, PairingConfig};
pub use models::{BatchContext, ConciliationStatus, DocumentPair, PairSummary, RawDocument};
pub use service::PairingEngine;
