use serde::{Deserialize, Serialize};

use crate::error::{VolError, VolResult};

/// Inputs for a European option quote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionParameters {
    /// Years until expiry.
    pub time_to_maturity: f64,
    pub strike: f64,
    pub spot: f64,
    /// Annualized volatility.
    pub volatility: f64,
    /// Continuously compounded annual rate.
    pub risk_free_rate: f64,
}

impl OptionParameters {
    pub fn new(
        time_to_maturity: f64,
        strike: f64,
        spot: f64,
        volatility: f64,
        risk_free_rate: f64,
    ) -> VolResult<Self> {
        let params = Self {
            time_to_maturity,
            strike,
            spot,
            volatility,
            risk_free_rate,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> VolResult<()> {
        let fields = [
            ("time_to_maturity", self.time_to_maturity),
            ("strike", self.strike),
            ("spot", self.spot),
            ("volatility", self.volatility),
            ("risk_free_rate", self.risk_free_rate),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(VolError::invalid_parameters(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in &fields[..4] {
            if *value <= 0.0 {
                return Err(VolError::invalid_parameters(format!(
                    "{} must be > 0, got {}",
                    name, value
                )));
            }
        }
        if self.risk_free_rate < 0.0 {
            return Err(VolError::invalid_parameters(format!(
                "risk_free_rate must be >= 0, got {}",
                self.risk_free_rate
            )));
        }
        Ok(())
    }

    pub fn with_spot(self, spot: f64) -> Self {
        Self { spot, ..self }
    }

    pub fn with_volatility(self, volatility: f64) -> Self {
        Self { volatility, ..self }
    }
}

/// Prices and sensitivities for a call/put pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub call_price: f64,
    pub put_price: f64,
    pub call_delta: f64,
    pub put_delta: f64,
    /// Shared by call and put.
    pub gamma: f64,
}
