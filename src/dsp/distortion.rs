//! Fold-back limiting and linear range mapping.
//!
//! The sequencer's lanes are limited to ±5 V by FOLDING rather than
//! clipping: a value that overshoots the limit is reflected back inside it.
//!
//! # Clip vs Fold
//!
//! Hard clip:
//!   f(x) = clamp(x, -limit, limit)
//!   - Everything past the limit flattens onto it
//!   - A loud sequence collapses onto two notes
//!
//! Foldback:
//!   When x exceeds the limit it "folds" back on itself
//!   - 6 V becomes 4 V, 7 V becomes 3 V
//!   - Overshooting steps keep distinct values
//!
//! The fold is a triangle wave of period 4·limit evaluated at x, so it is
//! computed in closed form. Any finite input costs the same, and values
//! already inside [-limit, limit] pass through unchanged.
//!
//! # Range Mapping
//!
//! `rescale` is the usual linear map between two intervals. It is used both
//! to read 0..10 V control voltages into parameter ranges and to move the
//! folded ±5 V lane into a unipolar output range.

/// Fold `x` back into `[-limit, limit]`.
///
/// Non-finite input yields 0.0. A non-positive limit yields 0.0.
#[inline]
pub fn foldback(x: f32, limit: f32) -> f32 {
    if !x.is_finite() || limit <= 0.0 {
        return 0.0;
    }
    if (-limit..=limit).contains(&x) {
        return x;
    }

    let period = 4.0 * limit;
    let y = (x + limit).rem_euclid(period);
    let folded = if y < 2.0 * limit {
        y - limit
    } else {
        3.0 * limit - y
    };
    folded.clamp(-limit, limit)
}

/// Map `x` linearly from `[in_lo, in_hi]` to `[out_lo, out_hi]`.
///
/// Does not clamp. A degenerate input range maps everything to `out_lo`.
#[inline]
pub fn rescale(x: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    let span = in_hi - in_lo;
    if span == 0.0 {
        return out_lo;
    }
    out_lo + (x - in_lo) / span * (out_hi - out_lo)
}
