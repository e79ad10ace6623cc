//! Net Present Value and Internal Rate of Return
//!
//! Used to value the resale-horizon cashflow vector. Flows are per period
//! (yearly here), the first flow is at t = 0 and is not discounted.

use log::{debug, warn};

use crate::error::{LmnpError, LmnpResult};

const TOLERANCE: f64 = 1e-10;
pub(crate) const MAX_ITERATIONS: u32 = 1000;

const NEWTON_LOW: f64 = -0.99;
const NEWTON_HIGH: f64 = 10.0;

/// Rates scanned for a sign change when Newton-Raphson fails
const BRACKET_GRID: [f64; 18] = [
    -0.999_999, -0.999_9, -0.999, -0.99, -0.9, -0.5, 0.0, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0,
    100.0, 1_000.0, 10_000.0, 100_000.0,
];

/// Net present value of `cashflows` at a periodic `rate`
pub fn npv(rate: f64, cashflows: &[f64]) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Calculate the Internal Rate of Return (IRR) for a series of cash flows
/// using the Newton-Raphson method, falling back to bisection.
///
/// # Returns
/// * `Option<f64>` - Periodic IRR as a decimal (e.g., 0.05 for 5%), or None if no solution found
pub fn calculate_irr(cashflows: &[f64]) -> Option<f64> {
    if cashflows.is_empty() {
        return None;
    }

    if cashflows.iter().all(|&cf| cf.abs() < 1e-10) {
        return Some(0.0);
    }

    // An IRR needs at least one sign change
    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return None;
    }

    let npv_tolerance = residual_tolerance(cashflows);
    let mut rate = 0.05;

    for _ in 0..MAX_ITERATIONS {
        let (value, derivative) = npv_and_derivative(cashflows, rate);

        if derivative.abs() < 1e-20 {
            debug!("IRR derivative vanished at {:.6}, switching to bisection", rate);
            return calculate_irr_bisection(cashflows);
        }

        let new_rate = (rate - value / derivative).max(NEWTON_LOW).min(NEWTON_HIGH);

        if (new_rate - rate).abs() < TOLERANCE {
            // a step pinned at a bound is not a root
            if npv(new_rate, cashflows).abs() <= npv_tolerance {
                return Some(new_rate);
            }
            break;
        }

        rate = new_rate;
    }

    debug!("Newton-Raphson did not converge, switching to bisection");
    calculate_irr_bisection(cashflows)
}

/// IRR that reports the absence of a solution as an error
pub fn irr(cashflows: &[f64]) -> LmnpResult<f64> {
    calculate_irr(cashflows).ok_or_else(|| {
        warn!("No IRR found for {} cashflows", cashflows.len());
        LmnpError::NoConvergence {
            function: "IRR".to_string(),
            iterations: MAX_ITERATIONS,
        }
    })
}

/// NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut value = 0.0;
    let mut derivative = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        value += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            derivative -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (value, derivative)
}

/// NPV residual accepted as zero, scaled to the size of the flows
fn residual_tolerance(cashflows: &[f64]) -> f64 {
    let scale = cashflows.iter().fold(1.0_f64, |acc, cf| acc.max(cf.abs()));
    1e-7 * scale
}

/// First pair of adjacent grid rates whose NPVs bracket a root
fn find_bracket(cashflows: &[f64]) -> Option<(f64, f64)> {
    BRACKET_GRID.windows(2).find_map(|pair| {
        let (low, high) = (pair[0], pair[1]);
        if npv(low, cashflows) * npv(high, cashflows) <= 0.0 {
            Some((low, high))
        } else {
            None
        }
    })
}

/// Fallback IRR calculation using bisection
fn calculate_irr_bisection(cashflows: &[f64]) -> Option<f64> {
    let Some((mut low, mut high)) = find_bracket(cashflows) else {
        debug!("No IRR bracket found for {} cashflows", cashflows.len());
        return None;
    };

    let mut npv_low = npv(low, cashflows);
    if npv_low == 0.0 {
        return Some(low);
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(mid, cashflows);

        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}
