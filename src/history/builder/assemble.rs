use crate::core::models::Candle;
use crate::history::wire::QuoteBlock;

use super::actions::Actions;
use super::adjust::price_factor_for_row;

/// Builds candles from the parallel chart arrays.
///
/// Rows with any missing OHLC value are dropped. Volume is scaled by later splits
/// only, never by dividends.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub(super) fn assemble_candles(
    ts: &[i64],
    q: &QuoteBlock,
    adj: &[Option<f64>],
    auto_adjust: bool,
    cum_split_after: &[f64],
    actions: &Actions,
) -> Vec<Candle> {
    let mut out = Vec::with_capacity(ts.len());

    for (i, &t) in ts.iter().enumerate() {
        let at = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();
        let (Some(mut open), Some(mut high), Some(mut low), Some(mut close)) =
            (at(&q.open), at(&q.high), at(&q.low), at(&q.close))
        else {
            continue;
        };
        let mut volume = q.volume.get(i).copied().flatten();

        if auto_adjust {
            let split_after = cum_split_after.get(i).copied().unwrap_or(1.0);
            let pf = price_factor_for_row(adj.get(i).copied().flatten(), Some(close), split_after);
            open *= pf;
            high *= pf;
            low *= pf;
            close *= pf;

            volume = volume.map(|v| {
                let v_adj = v as f64 * split_after;
                if v_adj.is_finite() { v_adj.round() as u64 } else { v }
            });
        }

        out.push(Candle {
            ts: t,
            open,
            high,
            low,
            close,
            volume,
            dividend: actions
                .dividends
                .iter()
                .find(|(div_ts, _)| same_day(**div_ts, t))
                .map(|(_, amount)| *amount),
            split: actions
                .splits
                .iter()
                .find(|(split_ts, _)| same_day(*split_ts, t))
                .map(|(_, ratio)| *ratio),
        });
    }

    out
}

/// Event stamps and bar stamps can differ by the session offset within one UTC day.
const fn same_day(a: i64, b: i64) -> bool {
    a.div_euclid(86_400) == b.div_euclid(86_400)
}
