//! In-memory portfolio registry.

use std::collections::HashMap;

use crate::errors::{Error, Result};
use crate::portfolio::portfolio_model::Portfolio;

/// Keeps portfolios by id. Lookup failures surface as
/// [`Error::PortfolioNotFound`] so callers can report a user error instead
/// of unwrapping an `Option` everywhere.
#[derive(Debug, Default)]
pub struct PortfolioStore {
    portfolios: HashMap<String, Portfolio>,
}

impl PortfolioStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a portfolio under its own id.
    pub fn upsert(&mut self, portfolio: Portfolio) {
        self.portfolios.insert(portfolio.id.clone(), portfolio);
    }

    pub fn get(&self, id: &str) -> Result<&Portfolio> {
        self.portfolios
            .get(id)
            .ok_or_else(|| Error::PortfolioNotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Portfolio> {
        self.portfolios
            .get_mut(id)
            .ok_or_else(|| Error::PortfolioNotFound(id.to_string()))
    }

    pub fn remove(&mut self, id: &str) -> Result<Portfolio> {
        self.portfolios
            .remove(id)
            .ok_or_else(|| Error::PortfolioNotFound(id.to_string()))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.portfolios.keys().map(String::as_str).collect()
    }
}
