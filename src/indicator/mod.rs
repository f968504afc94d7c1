pub mod ewma;
pub mod rolling;
pub mod rsi;

pub use ewma::{ewma_volatility, riskmetrics_weights};
pub use rolling::{rolling, RollingWindow};
pub use rsi::rsi;
