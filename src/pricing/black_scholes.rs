//! Closed-form European option pricing.
//!
//! No dividend yield and no early exercise. Inputs are validated up front; there is
//! no intrinsic-value fallback for zero volatility or expiry.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};

use crate::error::VolResult;
use crate::model::{OptionParameters, OptionQuote};

/// Standard normal CDF.
pub fn norm_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

/// Standard normal PDF.
pub fn norm_pdf(x: f64) -> f64 {
    Normal::standard().pdf(x)
}

/// `(d1, d2)` for validated parameters.
pub fn d1_d2(p: &OptionParameters) -> (f64, f64) {
    let vol_sqrt_t = p.volatility * p.time_to_maturity.sqrt();
    let d1 = ((p.spot / p.strike).ln()
        + (p.risk_free_rate + 0.5 * p.volatility * p.volatility) * p.time_to_maturity)
        / vol_sqrt_t;
    (d1, d1 - vol_sqrt_t)
}

/// Stateless Black-Scholes pricer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackScholesEngine;

impl BlackScholesEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn price(&self, params: &OptionParameters) -> VolResult<OptionQuote> {
        params.validate()?;
        let normal = Normal::standard();
        let (d1, d2) = d1_d2(params);
        let discounted_strike =
            params.strike * (-params.risk_free_rate * params.time_to_maturity).exp();
        let cdf_d1 = normal.cdf(d1);

        Ok(OptionQuote {
            call_price: params.spot * cdf_d1 - discounted_strike * normal.cdf(d2),
            put_price: discounted_strike * normal.cdf(-d2) - params.spot * normal.cdf(-d1),
            call_delta: cdf_d1,
            put_delta: cdf_d1 - 1.0,
            gamma: normal.pdf(d1)
                / (params.spot * params.volatility * params.time_to_maturity.sqrt()),
        })
    }
}
