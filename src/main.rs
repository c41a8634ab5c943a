mod error;
mod forecast;
mod market_data;
mod optimizer;
mod series;
mod solver;

use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use serde::Deserialize;

use crate::forecast::{DriftModel, MarketForecaster};
use crate::optimizer::{Asset, PortfolioOptimizer};

const DRIFT_WINDOW: usize = 30;

#[derive(Debug, Deserialize)]
struct Config {
    assets: AssetTickers,
    years_of_history: i64,
    forecast_horizon_days: usize,
    /// When set, closes load from `<data_dir>/<SYMBOL>.csv` instead of Yahoo.
    data_dir: Option<PathBuf>,
}

/// The three portfolio slots. Their order here is the order of the output
/// weights.
#[derive(Debug, Deserialize)]
struct AssetTickers {
    growth: String,
    bond: String,
    market: String,
}

fn load_yaml_config(path: &str) -> Result<Config, Box<dyn Error>> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    let _ = file.read_to_string(&mut contents)?;
    Ok(serde_yaml::from_str(&contents)?)
}

async fn acquire_asset(
    label: &str,
    symbol: &str,
    config: &Config,
) -> Result<Asset, Box<dyn Error>> {
    let prices = match &config.data_dir {
        Some(dir) => market_data::load_close_csv(&dir.join(format!("{symbol}.csv")))?,
        None => market_data::fetch_daily_closes(symbol, config.years_of_history).await?,
    };
    let summary = series::summarize(&prices);
    tracing::info!(
        label,
        symbol,
        count = summary.count,
        mean = summary.mean,
        std_dev = summary.std_dev,
        "loaded closing prices"
    );
    Ok(Asset::new(label, prices))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "max_sharpe_portfolio=info".into()),
        )
        .init();

    let config = load_yaml_config("portfolio.yaml")?;

    let growth = acquire_asset("growth", &config.assets.growth, &config).await?;
    let bond = acquire_asset("bond", &config.assets.bond, &config).await?;
    let market = acquire_asset("market", &config.assets.market, &config).await?;

    let forecaster = MarketForecaster::new(
        DriftModel::new(DRIFT_WINDOW),
        config.forecast_horizon_days,
    );
    let projection = forecaster.generate(&growth.prices)?;
    let outlook = forecast::analyze(&projection);
    tracing::info!(
        symbol = %config.assets.growth,
        horizon = config.forecast_horizon_days,
        trend = ?outlook.trend,
        volatility = outlook.volatility,
        "growth-asset projection"
    );

    let optimizer = PortfolioOptimizer::new([growth, bond, market])?;
    let portfolio = optimizer.optimize_portfolio()?;

    println!("Max-Sharpe weights:");
    for (label, weight) in portfolio.labels.iter().zip(portfolio.weights.iter()) {
        println!("  {label:<8} {weight:.4}");
    }
    println!("Expected annual return: {:.4}", portfolio.expected_return);
    println!("Annual volatility:      {:.4}", portfolio.volatility);
    println!("Sharpe ratio:           {:.4}", portfolio.sharpe);

    Ok(())
}
