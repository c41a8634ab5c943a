use time::OffsetDateTime;

/// One cleaned closing-price observation.
#[derive(Debug, Clone, Copy)]
pub struct Price {
    pub value: f64,
    pub date: OffsetDateTime,
}

/// Coerce a raw close field to a numeric price.
///
/// Upstream files and feeds occasionally carry the close column as text
/// ("101.5", "n/a", ""). Anything that does not parse to a finite number is
/// treated as missing.
pub fn coerce_close(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Simple period-over-period percentage changes: `(p[i] - p[i-1]) / p[i-1]`.
///
/// The leading entry has no predecessor and is dropped, as is any change
/// whose previous close is zero (the ratio is undefined). A "simple return"
/// is the plain percentage change of the price over one period, without the
/// compounding adjustment a log return applies; it is what the annualization
/// by 252 below expects.
pub fn simple_returns(prices: &[Price]) -> Vec<f64> {
    prices
        .windows(2)
        .filter_map(|w| {
            let prev = w[0].value;
            if prev == 0.0 {
                None
            } else {
                Some((w[1].value - prev) / prev)
            }
        })
        .collect()
}

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std_dev(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let variance = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    variance.sqrt()
}

/// Sample covariance of two equal-length series (n - 1 denominator).
pub fn sample_covariance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    if a.len() < 2 {
        return 0.0;
    }
    let mean_a = mean(a);
    let mean_b = mean(b);
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / (a.len() - 1) as f64
}

/// Descriptive statistics for one closing-price series.
#[derive(Debug, Clone, Copy)]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

pub fn summarize(prices: &[Price]) -> SeriesSummary {
    let values: Vec<f64> = prices.iter().map(|p| p.value).collect();
    SeriesSummary {
        count: values.len(),
        mean: mean(&values),
        std_dev: sample_std_dev(&values),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}
