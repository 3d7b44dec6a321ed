//! Trend and channel indicators.

use serde::{Deserialize, Serialize};

/// Average Directional Index (ADX).
///
/// Wilder's directional movement system: smoothed +DM/-DM against the
/// smoothed true range give DI+ and DI-, their normalized spread is DX,
/// and ADX is a Wilder smoothing of DX. First defined value appears at
/// index `2 * period - 1`.
#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
}

impl Adx {
    /// Create a new ADX indicator. Common period is 14.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Minimum number of bars before the first defined value.
    pub fn period(&self) -> usize {
        2 * self.period
    }

    fn dx_value(sm_plus: f64, sm_minus: f64, sm_tr: f64) -> f64 {
        if sm_tr == 0.0 {
            return 0.0;
        }
        let di_plus = 100.0 * sm_plus / sm_tr;
        let di_minus = 100.0 * sm_minus / sm_tr;
        let di_sum = di_plus + di_minus;
        if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (di_plus - di_minus).abs() / di_sum
        }
    }

    /// Calculate ADX from OHLC data. Output is aligned with the input.
    pub fn calculate_ohlc(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
        let n = high.len().min(low.len()).min(close.len());
        let mut result = vec![f64::NAN; n];
        if n < 2 * self.period {
            return result;
        }

        let period_f64 = self.period as f64;

        // Directional movement and true range per bar (index 0 undefined)
        let mut plus_dm = vec![0.0; n];
        let mut minus_dm = vec![0.0; n];
        let mut tr = vec![0.0; n];
        for i in 1..n {
            let up = high[i] - high[i - 1];
            let down = low[i - 1] - low[i];
            if up > down && up > 0.0 {
                plus_dm[i] = up;
            }
            if down > up && down > 0.0 {
                minus_dm[i] = down;
            }
            let hl = high[i] - low[i];
            let hc = (high[i] - close[i - 1]).abs();
            let lc = (low[i] - close[i - 1]).abs();
            tr[i] = hl.max(hc).max(lc);
        }

        // Wilder-smoothed sums, first available after `period` changes
        let mut sm_plus: f64 = plus_dm[1..=self.period].iter().sum();
        let mut sm_minus: f64 = minus_dm[1..=self.period].iter().sum();
        let mut sm_tr: f64 = tr[1..=self.period].iter().sum();

        let mut dx = vec![f64::NAN; n];
        dx[self.period] = Self::dx_value(sm_plus, sm_minus, sm_tr);
        for i in (self.period + 1)..n {
            sm_plus = sm_plus - sm_plus / period_f64 + plus_dm[i];
            sm_minus = sm_minus - sm_minus / period_f64 + minus_dm[i];
            sm_tr = sm_tr - sm_tr / period_f64 + tr[i];
            dx[i] = Self::dx_value(sm_plus, sm_minus, sm_tr);
        }

        // ADX: seed with the mean of the first `period` DX values,
        // then Wilder smoothing
        let mut adx: f64 =
            dx[self.period..2 * self.period].iter().sum::<f64>() / period_f64;
        result[2 * self.period - 1] = adx;
        for i in (2 * self.period)..n {
            adx = (adx * (period_f64 - 1.0) + dx[i]) / period_f64;
            result[i] = adx;
        }

        result
    }
}

/// Donchian Channel output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DonchianOutput {
    /// Highest high over the trailing window
    pub upper: f64,
    /// Lowest low over the trailing window
    pub lower: f64,
}

impl DonchianOutput {
    fn undefined() -> Self {
        Self {
            upper: f64::NAN,
            lower: f64::NAN,
        }
    }

    /// Check if the output is past the warm-up window.
    pub fn is_defined(&self) -> bool {
        !self.upper.is_nan()
    }
}

/// Donchian Channel: highest high and lowest low over a trailing window.
#[derive(Debug, Clone)]
pub struct DonchianChannel {
    period: usize,
}

impl DonchianChannel {
    /// Create a new Donchian channel. Common period is 20.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Minimum number of bars before the first defined value.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Calculate the channel from high/low data. Output is aligned.
    pub fn calculate_ohlc(&self, high: &[f64], low: &[f64]) -> Vec<DonchianOutput> {
        let n = high.len().min(low.len());
        let mut result = vec![DonchianOutput::undefined(); n.min(self.period - 1)];

        for i in (self.period - 1)..n {
            let start = i + 1 - self.period;
            let upper = high[start..=i]
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            let lower = low[start..=i].iter().cloned().fold(f64::INFINITY, f64::min);
            result.push(DonchianOutput { upper, lower });
        }

        result
    }
}

/// Ichimoku output. Spans are the forward-projected cloud values as
/// seen at the given bar, so every field depends only on past bars.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IchimokuOutput {
    /// Conversion line (midpoint of the short window)
    pub tenkan: f64,
    /// Base line (midpoint of the medium window)
    pub kijun: f64,
    /// Leading span A ((tenkan + kijun) / 2 projected forward)
    pub senkou_a: f64,
    /// Leading span B (midpoint of the long window projected forward)
    pub senkou_b: f64,
}

/// Ichimoku Kinko Hyo (cloud spans only; chikou is a plotting artifact).
#[derive(Debug, Clone)]
pub struct Ichimoku {
    tenkan_period: usize,
    kijun_period: usize,
    senkou_b_period: usize,
}

impl Ichimoku {
    /// Create with the standard parameters (9, 26, 52).
    pub fn new() -> Self {
        Self::with_periods(9, 26, 52)
    }

    /// Create with custom periods. The forward displacement of the
    /// spans equals the kijun period.
    pub fn with_periods(tenkan: usize, kijun: usize, senkou_b: usize) -> Self {
        assert!(tenkan > 0 && kijun > 0 && senkou_b > 0);
        Self {
            tenkan_period: tenkan,
            kijun_period: kijun,
            senkou_b_period: senkou_b,
        }
    }

    /// Minimum number of bars before both spans are defined.
    pub fn period(&self) -> usize {
        self.senkou_b_period + self.kijun_period
    }

    /// Midpoint of the highest high and lowest low over a trailing window.
    fn midpoint(high: &[f64], low: &[f64], period: usize, i: usize) -> f64 {
        if i + 1 < period {
            return f64::NAN;
        }
        let start = i + 1 - period;
        let highest = high[start..=i]
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let lowest = low[start..=i].iter().cloned().fold(f64::INFINITY, f64::min);
        (highest + lowest) / 2.0
    }

    /// Calculate the lines from high/low data. Output is aligned.
    pub fn calculate_ohlc(&self, high: &[f64], low: &[f64]) -> Vec<IchimokuOutput> {
        let n = high.len().min(low.len());
        let displacement = self.kijun_period;

        let mut result = Vec::with_capacity(n);
        for i in 0..n {
            let tenkan = Self::midpoint(high, low, self.tenkan_period, i);
            let kijun = Self::midpoint(high, low, self.kijun_period, i);

            let (senkou_a, senkou_b) = if i >= displacement {
                let j = i - displacement;
                let a = (Self::midpoint(high, low, self.tenkan_period, j)
                    + Self::midpoint(high, low, self.kijun_period, j))
                    / 2.0;
                let b = Self::midpoint(high, low, self.senkou_b_period, j);
                (a, b)
            } else {
                (f64::NAN, f64::NAN)
            };

            result.push(IchimokuOutput {
                tenkan,
                kijun,
                senkou_a,
                senkou_b,
            });
        }

        result
    }
}

impl Default for Ichimoku {
    fn default() -> Self {
        Self::new()
    }
}
