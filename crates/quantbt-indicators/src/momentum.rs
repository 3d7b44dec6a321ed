//! Momentum indicators.

use quantbt_core::traits::{Indicator, MultiOutputIndicator};
use serde::{Deserialize, Serialize};

/// Relative Strength Index (RSI).
///
/// Wilder-smoothed average gain/loss ratio; 100 when the average loss
/// over the window is zero.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 2 for the short-term variant.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let n = data.len();
        let mut result = vec![f64::NAN; n.min(self.period)];
        if n <= self.period {
            return result;
        }

        let period_f64 = self.period as f64;

        // Initial averages over the first `period` changes
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;
        for i in 1..=self.period {
            let change = data[i] - data[i - 1];
            if change > 0.0 {
                avg_gain += change;
            } else {
                avg_loss += -change;
            }
        }
        avg_gain /= period_f64;
        avg_loss /= period_f64;
        result.push(Self::rsi_value(avg_gain, avg_loss));

        // Wilder's smoothing: avg = (prev_avg * (period-1) + value) / period
        for i in (self.period + 1)..n {
            let change = data[i] - data[i - 1];
            let (gain, loss) = if change > 0.0 {
                (change, 0.0)
            } else {
                (0.0, -change)
            };
            avg_gain = (avg_gain * (period_f64 - 1.0) + gain) / period_f64;
            avg_loss = (avg_loss * (period_f64 - 1.0) + loss) / period_f64;
            result.push(Self::rsi_value(avg_gain, avg_loss));
        }

        result
    }

    fn period(&self) -> usize {
        self.period + 1 // Need period+1 data points
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// MACD (Moving Average Convergence Divergence) output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: f64,
    /// Signal line (EMA of MACD)
    pub signal: f64,
    /// Histogram (MACD - Signal)
    pub histogram: f64,
}

/// MACD indicator.
///
/// Difference of two EMAs with a signal EMA on top. With the seeded EMA
/// recurrence every point is defined; consumers conventionally wait
/// `slow + signal` bars before acting on it.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Create a new MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast > 0 && slow > 0 && signal > 0);
        assert!(fast < slow, "Fast period must be less than slow period");
        Self {
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
        }
    }

    /// Bars a consumer should wait before treating the lines as stable.
    pub fn stabilization_period(&self) -> usize {
        self.slow_period + self.signal_period
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiOutputIndicator for Macd {
    type Outputs = MacdOutput;

    fn calculate(&self, data: &[f64]) -> Vec<MacdOutput> {
        use crate::moving_average::Ema;

        let fast_ema = Ema::new(self.fast_period).calculate(data);
        let slow_ema = Ema::new(self.slow_period).calculate(data);

        let macd_line: Vec<f64> = fast_ema
            .iter()
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect();

        let signal_line = Ema::new(self.signal_period).calculate(&macd_line);

        macd_line
            .iter()
            .zip(signal_line.iter())
            .map(|(&macd, &signal)| MacdOutput {
                macd,
                signal,
                histogram: macd - signal,
            })
            .collect()
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

/// Stochastic oscillator output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StochasticOutput {
    /// %K (position of the close within the trailing range)
    pub k: f64,
    /// %D (SMA of %K)
    pub d: f64,
}

/// Stochastic oscillator.
///
/// `%K = 100 * (close - lowest_low) / (highest_high - lowest_low)` over
/// the trailing window, 50 when the window range is zero; %D is an SMA
/// of %K.
#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Stochastic {
    /// Create a new stochastic oscillator with default parameters (14, 3).
    pub fn new() -> Self {
        Self::with_periods(14, 3)
    }

    /// Create with custom periods.
    pub fn with_periods(k_period: usize, d_period: usize) -> Self {
        assert!(k_period > 0 && d_period > 0);
        Self { k_period, d_period }
    }

    /// Calculate stochastic from OHLC data.
    pub fn calculate_ohlc(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
    ) -> Vec<StochasticOutput> {
        let len = high.len().min(low.len()).min(close.len());

        // Raw %K, NaN during the lookback warm-up
        let mut k_values = vec![f64::NAN; len.min(self.k_period - 1)];
        for i in (self.k_period - 1)..len {
            let start = i + 1 - self.k_period;
            let highest = high[start..=i]
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            let lowest = low[start..=i].iter().cloned().fold(f64::INFINITY, f64::min);

            let range = highest - lowest;
            let k = if range == 0.0 {
                50.0 // Degenerate window, use midpoint
            } else {
                ((close[i] - lowest) / range) * 100.0
            };
            k_values.push(k);
        }

        // %D: SMA of %K once enough defined %K values exist
        let d_period_f64 = self.d_period as f64;
        let first_d = self.k_period - 1 + self.d_period - 1;
        k_values
            .iter()
            .enumerate()
            .map(|(i, &k)| {
                let d = if i >= first_d {
                    k_values[(i + 1 - self.d_period)..=i].iter().sum::<f64>() / d_period_f64
                } else {
                    f64::NAN
                };
                StochasticOutput { k, d }
            })
            .collect()
    }
}

impl Default for Stochastic {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Stochastic {
    type Output = StochasticOutput;

    /// Calculate using close prices only (close stands in for high/low).
    /// Prefer `calculate_ohlc` for accurate results.
    fn calculate(&self, data: &[f64]) -> Vec<StochasticOutput> {
        self.calculate_ohlc(data, data, data)
    }

    fn period(&self) -> usize {
        self.k_period + self.d_period - 1
    }

    fn name(&self) -> &str {
        "Stochastic"
    }
}

/// Momentum: difference between the current value and the value
/// `period` points back.
#[derive(Debug, Clone)]
pub struct Momentum {
    period: usize,
}

impl Momentum {
    /// Create a new momentum indicator.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for Momentum {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        data.iter()
            .enumerate()
            .map(|(i, &v)| {
                if i >= self.period {
                    v - data[i - self.period]
                } else {
                    f64::NAN
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "Momentum"
    }
}

/// Rate of Change: fractional change versus `period` points back.
#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
}

impl Roc {
    /// Create a new rate-of-change indicator.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for Roc {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        data.iter()
            .enumerate()
            .map(|(i, &v)| {
                if i >= self.period && data[i - self.period] != 0.0 {
                    (v - data[i - self.period]) / data[i - self.period]
                } else {
                    f64::NAN
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "ROC"
    }
}
