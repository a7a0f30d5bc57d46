//! Token risk analysis and smart contract audit services backed by a
//! generative-AI model.

pub mod api;
pub mod app;
pub mod model;
pub mod service;
