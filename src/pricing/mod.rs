pub mod black_scholes;
pub mod grid;

pub use black_scholes::{norm_cdf, norm_pdf, BlackScholesEngine};
pub use grid::{linspace, price_grid, PriceGrid};
