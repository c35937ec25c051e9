//! Market-condition rules: volatility, PCR extremes, OI walls and max pain.

use oipulse_core::{Bias, RiskConfig};

use crate::types::{CheckError, CheckId, RiskContext, RiskFinding, Severity};

const VIX_WARNING_RISK: u32 = 20;
const VIX_CAUTION_RISK: u32 = 8;
const PCR_EXTREME_RISK: u32 = 10;
const OI_WALL_RISK: u32 = 15;
const MAX_PAIN_RISK: u32 = 10;

fn distance_pct(level: f64, spot: f64) -> f64 {
    (level - spot).abs() / spot * 100.0
}

pub fn check_volatility(ctx: &RiskContext, config: &RiskConfig) -> Result<RiskFinding, CheckError> {
    let vix = ctx.vix()?;
    if !vix.is_finite() || vix < 0.0 {
        return Err(CheckError::InvalidInput(format!("VIX {vix}")));
    }

    let finding = if vix > config.vix_warning {
        RiskFinding::raised(
            CheckId::Volatility,
            Severity::Warning,
            VIX_WARNING_RISK,
            "High volatility",
            format!("VIX at {vix:.1}; premiums are rich and moves are large."),
        )
    } else if vix > config.vix_caution {
        RiskFinding::raised(
            CheckId::Volatility,
            Severity::Caution,
            VIX_CAUTION_RISK,
            "Elevated volatility",
            format!("VIX at {vix:.1}."),
        )
    } else {
        RiskFinding::passed(CheckId::Volatility, format!("VIX at {vix:.1}."))
    };
    Ok(finding)
}

/// Index options only: a bullish trade into a very low PCR, or a bearish
/// trade into a very high one.
pub fn check_pcr_extreme(
    ctx: &RiskContext,
    config: &RiskConfig,
) -> Result<RiskFinding, CheckError> {
    if !ctx.is_index || ctx.order.resolved_option_type().is_none() {
        return Ok(RiskFinding::passed(
            CheckId::PcrExtreme,
            "Applies to index options only.",
        ));
    }

    let pcr = ctx.metrics()?.pcr;
    let trade = ctx.trade_bias();

    let extreme = match trade {
        Bias::Bullish if pcr < config.pcr_extreme_low => {
            Some("call writers dominate; upside is capped")
        }
        Bias::Bearish if pcr > config.pcr_extreme_high => {
            Some("put writers dominate; downside is supported")
        }
        _ => None,
    };

    let finding = match extreme {
        Some(reason) => RiskFinding::raised(
            CheckId::PcrExtreme,
            Severity::Caution,
            PCR_EXTREME_RISK,
            "PCR at an extreme",
            format!("PCR {pcr:.2} against a {trade} trade: {reason}."),
        ),
        None => RiskFinding::passed(CheckId::PcrExtreme, format!("PCR {pcr:.2}.")),
    };
    Ok(finding)
}

/// A bullish trade just under heavy call OI, or a bearish trade just above
/// heavy put OI.
pub fn check_oi_wall(ctx: &RiskContext, config: &RiskConfig) -> Result<RiskFinding, CheckError> {
    let metrics = ctx.metrics()?;
    let trade = ctx.trade_bias();

    let wall = match trade {
        Bias::Bullish => Some(("resistance", metrics.resistance)),
        Bias::Bearish => Some(("support", metrics.support)),
        Bias::Neutral => None,
    };

    if let Some((name, level)) = wall {
        let distance = distance_pct(level.level, metrics.spot);
        if distance <= config.oi_wall_proximity_pct {
            return Ok(RiskFinding::raised(
                CheckId::OiWall,
                Severity::Warning,
                OI_WALL_RISK,
                format!("Trading into {name}"),
                format!(
                    "Spot {:.0} is {distance:.2}% from the {name} wall at {:.0} ({:.0} OI).",
                    metrics.spot, level.level, level.oi
                ),
            ));
        }
    }

    Ok(RiskFinding::passed(
        CheckId::OiWall,
        format!(
            "Support {:.0}, resistance {:.0}, spot {:.0}.",
            metrics.support.level, metrics.resistance.level, metrics.spot
        ),
    ))
}

/// Close to expiry, spot far from max pain tends to get pulled back.
pub fn check_max_pain(ctx: &RiskContext, config: &RiskConfig) -> Result<RiskFinding, CheckError> {
    let metrics = ctx.metrics()?;
    let dte = (metrics.expiry - ctx.today).num_days();
    if dte < 0 {
        return Err(CheckError::InvalidInput(format!(
            "expiry {} is before {}",
            metrics.expiry, ctx.today
        )));
    }

    let distance = distance_pct(metrics.max_pain_strike, metrics.spot);
    if dte <= config.max_pain_dte && distance > config.max_pain_distance_pct {
        return Ok(RiskFinding::raised(
            CheckId::MaxPain,
            Severity::Caution,
            MAX_PAIN_RISK,
            "Far from max pain near expiry",
            format!(
                "{dte} day(s) to expiry with spot {:.0} {distance:.2}% away from max pain {:.0}.",
                metrics.spot, metrics.max_pain_strike
            ),
        ));
    }

    Ok(RiskFinding::passed(
        CheckId::MaxPain,
        format!(
            "{dte} day(s) to expiry, max pain {:.0}.",
            metrics.max_pain_strike
        ),
    ))
}
