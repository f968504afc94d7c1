use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use sigma_quant::config::{Config, LoggingConfig};
use sigma_quant::data::load_prices;
use sigma_quant::pipeline::{self, Forecast};
use sigma_quant::pricing::{linspace, price_grid, BlackScholesEngine, PriceGrid};
use sigma_quant::{ModelKind, OptionParameters, OptionQuote};

#[derive(Parser)]
#[command(name = "sigma-quant")]
#[command(about = "Forecast forward volatility and price European options")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (falls back to $SIGMA_QUANT_CONFIG, then config/default.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast annualized volatility over the next horizon from a CSV of closes
    Forecast {
        #[command(flatten)]
        args: ForecastArgs,
    },
    /// Price a call/put pair
    Price {
        #[command(flatten)]
        option: OptionArgs,
        /// Volatility to price with; omitted means the configured default
        #[arg(long, conflicts_with = "prices")]
        vol: Option<f64>,
        /// Forecast the volatility from this price file instead
        #[arg(long)]
        prices: Option<PathBuf>,
        #[arg(long, requires = "prices")]
        horizon: Option<usize>,
        #[arg(long, requires = "prices")]
        model: Option<ModelKind>,
    },
    /// Price a grid of spots and volatilities
    Grid {
        #[command(flatten)]
        option: OptionArgs,
        #[arg(long)]
        spot_min: Option<f64>,
        #[arg(long)]
        spot_max: Option<f64>,
        #[arg(long)]
        vol_min: Option<f64>,
        #[arg(long)]
        vol_max: Option<f64>,
        /// Points along each axis
        #[arg(long)]
        points: Option<usize>,
    },
}

#[derive(Args)]
struct ForecastArgs {
    /// CSV with a date column and a close (or adj close) column
    #[arg(long)]
    prices: PathBuf,
    /// Trading days ahead
    #[arg(long)]
    horizon: Option<usize>,
    /// ridge or forest
    #[arg(long)]
    model: Option<ModelKind>,
}

#[derive(Args)]
struct OptionArgs {
    #[arg(long)]
    spot: Option<f64>,
    #[arg(long)]
    strike: Option<f64>,
    /// Years to expiry
    #[arg(long)]
    maturity: Option<f64>,
    /// Annual risk-free rate
    #[arg(long)]
    rate: Option<f64>,
}

impl OptionArgs {
    fn parameters(&self, config: &Config) -> Result<OptionParameters> {
        let d = &config.pricing;
        Ok(OptionParameters::new(
            self.maturity.unwrap_or(d.time_to_maturity),
            self.strike.unwrap_or(d.strike),
            self.spot.unwrap_or(d.spot),
            d.volatility,
            self.rate.unwrap_or(d.risk_free_rate),
        )?)
    }
}

#[derive(Serialize)]
struct PricedForecast<'a> {
    forecast: Option<&'a Forecast>,
    parameters: OptionParameters,
    quote: OptionQuote,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    init_tracing(&config.logging);

    tracing::debug!(
        model = %config.training.model.kind,
        horizon_days = config.prediction.horizon_days,
        "Starting sigma-quant"
    );

    match &cli.command {
        Commands::Forecast { args } => {
            let forecast = run_forecast(&config, &args.prices, args.horizon, args.model)?;
            if cli.json {
                print_json(&forecast)?;
            } else {
                print_forecast(&forecast);
            }
        }
        Commands::Price {
            option,
            vol,
            prices,
            horizon,
            model,
        } => {
            let mut params = option.parameters(&config)?;
            let forecast = match prices {
                Some(path) => Some(run_forecast(&config, path, *horizon, *model)?),
                None => None,
            };
            if let Some(f) = &forecast {
                params = params.with_volatility(f.sigma);
            } else if let Some(v) = vol {
                params = params.with_volatility(*v);
            }
            let quote = BlackScholesEngine.price(&params)?;
            if cli.json {
                print_json(&PricedForecast {
                    forecast: forecast.as_ref(),
                    parameters: params,
                    quote,
                })?;
            } else {
                if let Some(f) = &forecast {
                    print_forecast(f);
                    println!();
                }
                print_quote(&params, &quote);
            }
        }
        Commands::Grid {
            option,
            spot_min,
            spot_max,
            vol_min,
            vol_max,
            points,
        } => {
            let d = &config.pricing;
            let base = option.parameters(&config)?;
            let n = points.unwrap_or(d.grid_points);
            let spots = linspace(spot_min.unwrap_or(d.spot_min), spot_max.unwrap_or(d.spot_max), n);
            let vols = linspace(vol_min.unwrap_or(d.vol_min), vol_max.unwrap_or(d.vol_max), n);
            let grid = price_grid(&base, &spots, &vols)?;
            if cli.json {
                print_json(&grid)?;
            } else {
                print_grid(&grid);
            }
        }
    }
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        logging
            .level
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    // stdout carries results; logs go to stderr
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_forecast(
    config: &Config,
    prices: &std::path::Path,
    horizon: Option<usize>,
    model: Option<ModelKind>,
) -> Result<Forecast> {
    let series = load_prices(prices)?;
    let mut cfg = config.pipeline();
    if let Some(h) = horizon {
        cfg.horizon_days = h;
    }
    if let Some(kind) = model {
        cfg.training.model.kind = kind;
    }
    tracing::info!(
        prices = %prices.display(),
        rows = series.len(),
        horizon_days = cfg.horizon_days,
        model = %cfg.training.model.kind,
        "Running volatility forecast"
    );
    pipeline::forecast(&series, &cfg).context("volatility forecast failed")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_forecast(f: &Forecast) {
    println!("as of           {}", f.as_of);
    println!("horizon (days)  {}", f.horizon_days);
    println!("model           {}", f.model);
    println!("training rows   {}", f.training_rows);
    println!("sigma           {:.4}", f.sigma);
    if f.raw_sigma != f.sigma {
        println!("raw sigma       {:.4} (clipped)", f.raw_sigma);
    }
    match f.mae_cv {
        Some(mae) => println!("cv mae          {:.4}", mae),
        None => println!("cv mae          n/a (too few rows)"),
    }
    for fold in &f.folds {
        println!(
            "  fold {}  train {}..{}  valid {}..{}  mae {:.4}",
            fold.index,
            fold.train_start,
            fold.train_end,
            fold.validation_start,
            fold.validation_end,
            fold.mae
        );
    }
}

fn print_quote(p: &OptionParameters, q: &OptionQuote) {
    println!(
        "S={} K={} T={} r={} sigma={:.4}",
        p.spot, p.strike, p.time_to_maturity, p.risk_free_rate, p.volatility
    );
    println!("call  {:>10.4}  delta {:>7.4}", q.call_price, q.call_delta);
    println!("put   {:>10.4}  delta {:>7.4}", q.put_price, q.put_delta);
    println!("gamma {:>10.6}", q.gamma);
}

fn print_grid(grid: &PriceGrid) {
    for (title, table) in [("CALL", grid.call_prices()), ("PUT", grid.put_prices())] {
        println!("{} (rows: vol, cols: spot)", title);
        print!("{:>8}", "");
        for s in &grid.spots {
            print!("{:>9.2}", s);
        }
        println!();
        for (vol, row) in grid.vols.iter().zip(&table) {
            print!("{:>8.3}", vol);
            for price in row {
                print!("{:>9.2}", price);
            }
            println!();
        }
        println!();
    }
}
