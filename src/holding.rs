use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A single recorded purchase: some quantity of coins or bars of one
/// metal, with the per-ounce price paid. Immutable once stored; the only
/// way to change a holding is to delete it and enter a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub metal: String,
    #[serde(default)]
    pub design: String,
    pub weight: f64,
    pub quantity: u32,
    pub buy_price: f64,
}

impl Holding {
    pub fn new(metal: &str, design: &str, weight: f64, quantity: u32, buy_price: f64) -> Holding {
        Holding {
            metal: metal.to_string(),
            design: design.to_string(),
            weight,
            quantity,
            buy_price,
        }
    }

    /// Total troy ounces this holding contributes.
    pub fn ounces(&self) -> f64 {
        self.weight * self.quantity as f64
    }

    /// Total amount paid for this holding.
    pub fn cost(&self) -> f64 {
        self.buy_price * self.weight * self.quantity as f64
    }

    /// Check the entry against the store's acceptance rules. A holding
    /// that fails here is rejected before anything touches the wallet file.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.metal.trim().is_empty() {
            return Err(ValidationError::MetalRequired);
        }
        if !self.weight.is_finite() {
            return Err(ValidationError::InvalidWeight(self.weight));
        }
        if self.weight <= 0.0 {
            return Err(ValidationError::NonPositiveWeight(self.weight));
        }
        if self.quantity == 0 {
            return Err(ValidationError::NonPositiveQuantity(self.quantity));
        }
        if !self.buy_price.is_finite() {
            return Err(ValidationError::InvalidBuyPrice(self.buy_price));
        }
        if self.buy_price < 0.0 {
            return Err(ValidationError::NegativeBuyPrice(self.buy_price));
        }
        Ok(())
    }
}
