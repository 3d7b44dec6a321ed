//! Risk and return statistics over a realized equity curve.
//!
//! All functions are pure reductions: they never mutate their inputs
//! and degenerate cases resolve to explicit fallback values rather
//! than arithmetic faults.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use statrs::statistics::Statistics;

/// Trading sessions per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Bar-over-bar returns of the equity curve: `equity[i]/equity[i-1] - 1`.
pub fn daily_returns(curve: &[(i64, Decimal)]) -> Vec<f64> {
    curve
        .windows(2)
        .filter_map(|pair| {
            let prev = pair[0].1.to_f64()?;
            let curr = pair[1].1.to_f64()?;
            if prev != 0.0 {
                Some(curr / prev - 1.0)
            } else {
                None
            }
        })
        .collect()
}

/// Total return over the curve as a fraction: `equity[-1]/equity[0] - 1`.
pub fn total_return(curve: &[(i64, Decimal)]) -> f64 {
    let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
        return 0.0;
    };
    let first = first.1.to_f64().unwrap_or(0.0);
    let last = last.1.to_f64().unwrap_or(0.0);
    if first != 0.0 {
        last / first - 1.0
    } else {
        0.0
    }
}

/// Annualized return assuming daily bars: `(1 + r)^(252/n) - 1`.
pub fn annualized_return(total_return: f64, bars: usize) -> f64 {
    if bars == 0 || total_return <= -1.0 {
        return 0.0;
    }
    (1.0 + total_return).powf(TRADING_DAYS_PER_YEAR / bars as f64) - 1.0
}

/// Annualized volatility: population standard deviation of daily
/// returns scaled by the square root of 252.
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    returns.population_std_dev() * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Sharpe ratio: `mean / std_dev * sqrt(252)`, 0 when the standard
/// deviation is 0.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let std_dev = returns.population_std_dev();
    if std_dev == 0.0 {
        return 0.0;
    }
    returns.mean() / std_dev * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Maximum drawdown as a fraction of the running peak, in `[0, 1]`.
/// 0 for a monotonically non-decreasing curve.
pub fn max_drawdown(curve: &[(i64, Decimal)]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0f64;

    for (_, equity) in curve {
        let value = equity.to_f64().unwrap_or(0.0);
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (peak - value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn curve(values: &[f64]) -> Vec<(i64, Decimal)> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as i64, Decimal::try_from(v).unwrap()))
            .collect()
    }

    #[test]
    fn test_daily_returns() {
        let c = curve(&[100.0, 110.0, 99.0]);
        let returns = daily_returns(&c);

        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.10).abs() < 1e-10);
        assert!((returns[1] + 0.10).abs() < 1e-10);
    }

    #[test]
    fn test_total_return_matches_chained_product() {
        let c = curve(&[100.0, 105.0, 110.25, 99.225]);
        let total = total_return(&c);

        let chained: f64 = daily_returns(&c).iter().map(|r| 1.0 + r).product::<f64>() - 1.0;
        assert!((total - chained).abs() < 1e-10);
    }

    #[test]
    fn test_total_return_empty_curve() {
        assert_eq!(total_return(&[]), 0.0);
    }

    #[test]
    fn test_sharpe_zero_when_std_dev_zero() {
        // Constant returns have zero dispersion
        let returns = vec![0.01; 30];
        assert_eq!(sharpe_ratio(&returns), 0.0);
        assert_eq!(sharpe_ratio(&[]), 0.0);
    }

    #[test]
    fn test_sharpe_positive_for_positive_drift() {
        let returns: Vec<f64> = (0..100)
            .map(|i| 0.001 + (i as f64 * 0.9).sin() * 0.01)
            .collect();
        assert!(sharpe_ratio(&returns) > 0.0);
    }

    #[test]
    fn test_annualized_volatility() {
        let returns = vec![0.01, -0.01, 0.01, -0.01];
        // Population std dev of the alternating series is exactly 0.01
        let expected = 0.01 * TRADING_DAYS_PER_YEAR.sqrt();
        assert!((annualized_volatility(&returns) - expected).abs() < 1e-10);
    }

    #[test]
    fn test_max_drawdown_zero_on_monotonic_curve() {
        let c = curve(&[100.0, 101.0, 101.0, 105.0, 110.0]);
        assert_eq!(max_drawdown(&c), 0.0);
    }

    #[test]
    fn test_max_drawdown_fraction_of_peak() {
        let c = curve(&[100.0, 120.0, 90.0, 130.0, 104.0]);
        // Worst decline: 120 -> 90 = 25% of the 120 peak
        assert!((max_drawdown(&c) - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_max_drawdown_bounded() {
        let c = curve(&[100.0, 0.0, 50.0]);
        let dd = max_drawdown(&c);
        assert!((0.0..=1.0).contains(&dd));
        assert!((dd - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_annualized_return() {
        // +10% over exactly one year of bars stays +10%
        assert!((annualized_return(0.10, 252) - 0.10).abs() < 1e-10);
        // Shorter windows compound up
        assert!(annualized_return(0.10, 126) > 0.10);
        assert_eq!(annualized_return(0.10, 0), 0.0);
    }

    #[test]
    fn test_decimal_curve_roundtrip() {
        let c = vec![(0, dec!(10000)), (1, dec!(11000))];
        assert!((total_return(&c) - 0.10).abs() < 1e-12);
    }
}
