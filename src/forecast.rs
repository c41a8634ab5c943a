use crate::error::ForecastError;
use crate::series::{self, Price};

/// A fitted one-step-ahead price model.
///
/// Training is someone else's problem; implementations arrive fitted and the
/// forecaster only drives prediction. ARIMA-style backends and learned
/// sequence models both fit behind this seam.
pub trait ForecastModel {
    /// Trailing-window length the model needs to produce a prediction.
    fn window(&self) -> usize;

    /// Predict the next closing price from the trailing `window()` closes.
    fn predict_next(&self, history: &[f64]) -> f64;
}

/// Random walk with drift: projects the trailing window's mean percentage
/// change forward one step.
#[derive(Debug, Clone, Copy)]
pub struct DriftModel {
    window: usize,
}

impl DriftModel {
    pub fn new(window: usize) -> Self {
        Self { window }
    }
}

impl ForecastModel for DriftModel {
    fn window(&self) -> usize {
        self.window
    }

    fn predict_next(&self, history: &[f64]) -> f64 {
        let changes: Vec<f64> = history
            .windows(2)
            .filter_map(|w| {
                if w[0] == 0.0 {
                    None
                } else {
                    Some((w[1] - w[0]) / w[0])
                }
            })
            .collect();
        let drift = series::mean(&changes);
        history.last().copied().unwrap_or(0.0) * (1.0 + drift)
    }
}

/// Rolls a model forward a fixed horizon, feeding each prediction back into
/// the input window (sequence prediction).
pub struct MarketForecaster<M> {
    model: M,
    horizon: usize,
}

impl<M: ForecastModel> MarketForecaster<M> {
    pub fn new(model: M, horizon: usize) -> Self {
        Self { model, horizon }
    }

    pub fn generate(&self, prices: &[Price]) -> Result<Vec<f64>, ForecastError> {
        let need = self.model.window().max(2);
        if prices.len() < need {
            return Err(ForecastError::NotEnoughHistory {
                need,
                got: prices.len(),
            });
        }

        let mut window: Vec<f64> = prices[prices.len() - need..]
            .iter()
            .map(|p| p.value)
            .collect();
        let mut forecast = Vec::with_capacity(self.horizon);
        for _ in 0..self.horizon {
            let next = self.model.predict_next(&window);
            forecast.push(next);
            let _ = window.remove(0);
            window.push(next);
        }
        Ok(forecast)
    }
}

/// Direction of a projected price path, judged by its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Upward,
    Downward,
    Stable,
}

/// Headline read of a forecast: direction plus dispersion.
#[derive(Debug, Clone, Copy)]
pub struct ForecastSummary {
    pub trend: Trend,
    pub volatility: f64,
}

pub fn analyze(forecast: &[f64]) -> ForecastSummary {
    let trend = match (forecast.first(), forecast.last()) {
        (Some(first), Some(last)) if last > first => Trend::Upward,
        (Some(first), Some(last)) if last < first => Trend::Downward,
        _ => Trend::Stable,
    };
    ForecastSummary {
        trend,
        volatility: series::sample_std_dev(forecast),
    }
}
