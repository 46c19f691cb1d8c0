//! Rebalancing strategies, selection, and orchestration.

pub mod rebalancing_model;
pub mod rebalancing_service;
pub mod strategies;
pub mod strategy_selector;
