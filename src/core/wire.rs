use serde::{Deserialize, Deserializer};

/// Yahoo wraps most numbers as `{ "raw": 1.23, "fmt": "1.23" }`.
#[derive(Deserialize, Clone, Copy)]
pub struct RawNum<T> {
    pub(crate) raw: Option<T>,
}

pub fn from_raw<T>(raw: Option<RawNum<T>>) -> Option<T> {
    raw.and_then(|n| n.raw)
}

#[derive(Deserialize, Clone, Copy)]
pub struct RawDate {
    pub(crate) raw: Option<i64>,
}

pub fn from_raw_date(r: Option<RawDate>) -> Option<i64> {
    r.and_then(|d| d.raw)
}

/// Same shape as [`RawNum`], but tolerates integer-valued floats (`12.0`) for counts.
#[derive(Deserialize, Clone, Copy)]
pub struct RawNumU64 {
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub(crate) raw: Option<u64>,
}

pub fn from_raw_u64(r: Option<RawNumU64>) -> Option<u64> {
    r.and_then(|n| n.raw)
}

/// Accepts `u64`, non-negative integer-valued `f64`, or null.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn de_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AnyNumber {
        U64(u64),
        F64(f64),
    }

    match Option::<AnyNumber>::deserialize(deserializer)? {
        Some(AnyNumber::U64(u)) => Ok(Some(u)),
        Some(AnyNumber::F64(f)) => {
            if f.is_finite() && f.fract() == 0.0 && f >= 0.0 {
                Ok(Some(f as u64))
            } else {
                Err(serde::de::Error::custom(format!(
                    "cannot convert float {f} to u64"
                )))
            }
        }
        None => Ok(None),
    }
}
