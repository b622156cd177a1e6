//! Position sizing and protective level derivation.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tradesim_core::{PortfolioState, PositionSide, RiskConfig, TradeDecision};

fn decimal_fraction(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Calculates the quantity for an entry.
///
/// Takes the minimum of three constraints: risk-based size
/// (`max_risk_fraction` of equity over the stop distance), the position
/// value cap (`max_position_fraction` of equity), and the provider's
/// suggested cash fraction when present. The cap clamps, it never rejects.
#[must_use]
pub fn position_size(
    decision: &TradeDecision,
    portfolio: &PortfolioState,
    price: Decimal,
    config: &RiskConfig,
) -> Decimal {
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let equity = portfolio.total_equity;

    let stop_distance = decision
        .stop_loss
        .map(|stop| (price - stop).abs())
        .filter(|d| *d > Decimal::ZERO)
        .unwrap_or_else(|| price * decimal_fraction(config.stop_loss_fraction));

    let mut quantity = if stop_distance > Decimal::ZERO {
        decimal_fraction(config.max_risk_fraction) * equity / stop_distance
    } else {
        Decimal::ZERO
    };

    let cap = decimal_fraction(config.max_position_fraction) * equity / price;
    quantity = quantity.min(cap);

    if let Some(fraction) = decision.quantity {
        let suggested = decimal_fraction(fraction) * portfolio.cash / price;
        quantity = quantity.min(suggested);
    }

    quantity.max(Decimal::ZERO)
}

/// Derives the stop-loss level for an entry.
///
/// A suggested level is accepted only if it sits on the protective side of
/// the entry and its distance is within [0.5x, 2x] of the configured
/// fraction; otherwise the configured fraction applies.
#[must_use]
pub fn derive_stop_loss(
    entry: Decimal,
    side: PositionSide,
    suggested: Option<Decimal>,
    config: &RiskConfig,
) -> Decimal {
    let fraction = decimal_fraction(config.stop_loss_fraction);
    derive_level(entry, side, suggested, fraction, Decimal::TWO, true)
}

/// Derives the take-profit level for an entry; suggested distance accepted
/// within [0.5x, 3x] of the configured fraction.
#[must_use]
pub fn derive_take_profit(
    entry: Decimal,
    side: PositionSide,
    suggested: Option<Decimal>,
    config: &RiskConfig,
) -> Decimal {
    let fraction = decimal_fraction(config.take_profit_fraction);
    derive_level(entry, side, suggested, fraction, Decimal::from(3), false)
}

fn derive_level(
    entry: Decimal,
    side: PositionSide,
    suggested: Option<Decimal>,
    fraction: Decimal,
    upper_factor: Decimal,
    protective: bool,
) -> Decimal {
    let default_distance = entry * fraction;

    if let Some(level) = suggested {
        // Stops sit below a long entry and above a short one; targets the
        // other way around.
        let right_side = match (side, protective) {
            (PositionSide::Long, true) | (PositionSide::Short, false) => level < entry,
            (PositionSide::Long, false) | (PositionSide::Short, true) => level > entry,
        };
        let distance = (entry - level).abs();
        let half = default_distance / Decimal::TWO;
        if right_side && distance >= half && distance <= upper_factor * default_distance {
            return level;
        }
    }

    match (side, protective) {
        (PositionSide::Long, true) | (PositionSide::Short, false) => entry - default_distance,
        (PositionSide::Long, false) | (PositionSide::Short, true) => entry + default_distance,
    }
}
