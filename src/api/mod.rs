//! HTTP surface of both services

pub mod audit;
pub mod error;
pub mod openapi;
pub mod risk;
