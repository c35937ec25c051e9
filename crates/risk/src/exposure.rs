//! Portfolio exposure rules: position count, existing position, duplicate order.

use oipulse_core::RiskConfig;
use rust_decimal::Decimal;

use crate::types::{CheckError, CheckId, RiskContext, RiskFinding, Severity};

const POSITION_COUNT_WARNING_RISK: u32 = 20;
const POSITION_COUNT_INFO_RISK: u32 = 8;
const AVERAGING_DOWN_RISK: u32 = 20;
const EXISTING_POSITION_RISK: u32 = 5;
const DUPLICATE_ORDER_RISK: u32 = 15;

/// Warns when the book already holds many open positions.
pub fn check_position_count(
    ctx: &RiskContext,
    config: &RiskConfig,
) -> Result<RiskFinding, CheckError> {
    let open = ctx.portfolio()?.open_positions().count();

    let finding = if open >= config.position_count_warning {
        RiskFinding::raised(
            CheckId::PositionCount,
            Severity::Warning,
            POSITION_COUNT_WARNING_RISK,
            "Too many open positions",
            format!("{open} positions already open; adding more concentrates risk."),
        )
    } else if open >= config.position_count_info {
        RiskFinding::raised(
            CheckId::PositionCount,
            Severity::Info,
            POSITION_COUNT_INFO_RISK,
            "Several open positions",
            format!("{open} positions already open."),
        )
    } else {
        RiskFinding::passed(CheckId::PositionCount, format!("{open} open positions."))
    };
    Ok(finding)
}

/// Flags adding to a losing position on the same side (averaging down), or
/// just notes that a position on the symbol already exists.
pub fn check_existing_position(
    ctx: &RiskContext,
    config: &RiskConfig,
) -> Result<RiskFinding, CheckError> {
    let symbol = ctx.order.tradingsymbol.as_str();
    let Some(position) = ctx.portfolio()?.position_for(symbol) else {
        return Ok(RiskFinding::passed(
            CheckId::ExistingPosition,
            format!("No open position in {symbol}."),
        ));
    };

    let same_side = position.side() == Some(ctx.order.transaction_type);
    let losing = position.unrealised_pnl < -config.averaging_down_loss.abs();

    if same_side && losing {
        tracing::debug!(
            symbol,
            pnl = %position.unrealised_pnl,
            threshold = %config.averaging_down_loss,
            "Averaging down detected"
        );
        return Ok(RiskFinding::raised(
            CheckId::ExistingPosition,
            Severity::Warning,
            AVERAGING_DOWN_RISK,
            "Averaging down",
            format!(
                "Adding to {symbol} while it shows an unrealised loss of {}.",
                position.unrealised_pnl.round_dp(2)
            ),
        ));
    }

    let pnl = position.unrealised_pnl.round_dp(2);
    let pnl_note = if pnl < Decimal::ZERO {
        format!("unrealised loss {pnl}")
    } else {
        format!("unrealised P&L {pnl}")
    };
    Ok(RiskFinding::raised(
        CheckId::ExistingPosition,
        Severity::Info,
        EXISTING_POSITION_RISK,
        "Existing position",
        format!(
            "Already holding {} of {symbol} ({pnl_note}).",
            position.quantity
        ),
    ))
}

/// Warns when a working order on the same symbol is already queued.
pub fn check_duplicate_order(
    ctx: &RiskContext,
    _config: &RiskConfig,
) -> Result<RiskFinding, CheckError> {
    let symbol = ctx.order.tradingsymbol.as_str();
    let working = ctx.portfolio()?.working_orders_for(symbol).count();

    if working == 0 {
        return Ok(RiskFinding::passed(
            CheckId::DuplicateOrder,
            format!("No working orders on {symbol}."),
        ));
    }

    Ok(RiskFinding::raised(
        CheckId::DuplicateOrder,
        Severity::Warning,
        DUPLICATE_ORDER_RISK,
        "Possible duplicate order",
        format!("{working} order(s) on {symbol} are still working."),
    ))
}
