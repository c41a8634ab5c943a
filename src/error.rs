use thiserror::Error;

/// Failures from the portfolio optimization core.
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// The three cleaned return series must be equal length; they are assumed
    /// to come from price histories covering the same trading calendar.
    #[error("return series must be equal length, got {0}, {1} and {2}")]
    DimensionMismatch(usize, usize, usize),

    #[error("asset {0} has too few usable returns ({1}, need at least 2)")]
    InsufficientData(String, usize),

    /// Every feasible weighting has zero variance, so the Sharpe ratio is
    /// undefined for the whole search space.
    #[error("portfolio volatility is zero for every candidate weighting")]
    DegenerateVolatility,

    #[error("optimization did not converge: {0}")]
    OptimizationFailed(String),
}

/// Failures while acquiring closing-price data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("yahoo finance request failed: {0}")]
    Yahoo(#[from] yahoo_finance_api::YahooError),

    #[error("csv read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("unparseable date {0:?}, expected YYYY-MM-DD")]
    BadDate(String),

    #[error("no usable closing prices for {0}")]
    NoData(String),
}

/// Failures while projecting prices forward.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("not enough history: model needs {need} closes, got {got}")]
    NotEnoughHistory { need: usize, got: usize },
}
