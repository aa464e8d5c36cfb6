/// Descriptive statistics over aligned value windows

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance
pub fn variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(sum_sq / values.len() as f64)
}

fn central_moment_ratio(values: &[f64], order: i32) -> Option<f64> {
    let m = mean(values)?;
    let var = variance(values)?;
    if var == 0.0 {
        return None;
    }
    let moment: f64 = values.iter().map(|v| (v - m).powi(order)).sum::<f64>() / values.len() as f64;
    Some(moment / var.powf(order as f64 / 2.0))
}

/// Population skewness; None for constant input
pub fn skewness(values: &[f64]) -> Option<f64> {
    central_moment_ratio(values, 3)
}

/// Excess kurtosis (normal distribution = 0); None for constant input
pub fn kurtosis(values: &[f64]) -> Option<f64> {
    central_moment_ratio(values, 4).map(|k| k - 3.0)
}

/// Laplace integral: standard normal cumulative probability at `x`
pub fn laplace_integral(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

// Abramowitz & Stegun 7.1.26, |error| < 1.5e-7
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));

    sign * (1.0 - poly * (-x * x).exp())
}
