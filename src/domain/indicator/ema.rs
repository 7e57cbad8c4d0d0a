//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) values are `None`.

/// EMA over a plain slice, `None` for warm-up positions. Feeds both MACD
/// legs and the signal line, which smooths the MACD line rather than closes.
pub fn ema_values(input: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; input.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(input.len());
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &x) in input.iter().enumerate() {
        if i < period - 1 {
            sum += x;
            out.push(None);
        } else if i == period - 1 {
            sum += x;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = x * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }

    out
}
