pub mod option;
pub mod price_series;

pub use option::{OptionParameters, OptionQuote};
pub use price_series::{PricePoint, PriceSeries};
