pub mod client_info;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
