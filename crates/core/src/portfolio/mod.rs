//! Portfolio model, allocation math, and price refresh.

pub mod allocation;
pub mod portfolio_model;
pub mod portfolio_store;
pub mod pricing_service;
