pub mod error;
pub mod fingerprint;
pub mod ports;
pub mod repo;
pub mod service;
pub mod stats;
pub mod validation;
