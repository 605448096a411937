use std::collections::BTreeMap;

use crate::history::wire::Events;

/// Corporate actions keyed by event timestamp.
#[derive(Default)]
pub(super) struct Actions {
    pub(super) dividends: BTreeMap<i64, f64>,
    /// Split ratios (`numerator / denominator`), ascending by timestamp.
    pub(super) splits: Vec<(i64, f64)>,
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn extract_actions(events: Option<&Events>) -> Actions {
    let mut out = Actions::default();
    let Some(ev) = events else {
        return out;
    };

    if let Some(divs) = ev.dividends.as_ref() {
        for (k, d) in divs {
            let ts = k.parse::<i64>().unwrap_or(d.date.unwrap_or(0));
            if let Some(amount) = d.amount {
                out.dividends.insert(ts, amount);
            }
        }
    }

    if let Some(splits) = ev.splits.as_ref() {
        for (k, s) in splits {
            let ts = k.parse::<i64>().unwrap_or(s.date.unwrap_or(0));
            let (num, den) = if let (Some(n), Some(d)) = (s.numerator, s.denominator) {
                (n, d)
            } else if let Some(r) = s.split_ratio.as_deref() {
                let mut it = r.split(['/', ':']);
                let n = it.next().and_then(|x| x.trim().parse::<u64>().ok()).unwrap_or(1);
                let d = it.next().and_then(|x| x.trim().parse::<u64>().ok()).unwrap_or(1);
                (n, d)
            } else {
                (1, 1)
            };
            let ratio = if den == 0 { 1.0 } else { num as f64 / den as f64 };
            out.splits.push((ts, ratio));
        }
    }

    out.splits.sort_by_key(|(ts, _)| *ts);
    out
}
