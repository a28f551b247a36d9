use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

pub fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Today in UTC as `YYYY-MM-DD`.
pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Timestamp `ttl` from now, in the same format as [`now_ts`].
pub fn expires_after(ttl: Duration) -> String {
    let ttl = chrono::Duration::milliseconds(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX));
    (Utc::now() + ttl).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Unparseable timestamps count as past.
pub fn is_past(ts: &str) -> bool {
    match DateTime::parse_from_rfc3339(ts) {
        Ok(t) => t.with_timezone(&Utc) <= Utc::now(),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_in_the_future() {
        assert!(!is_past(&expires_after(Duration::from_secs(60))));
        assert!(is_past(&expires_after(Duration::ZERO)));
        assert!(is_past("2020-01-01T00:00:00.000Z"));
        assert!(is_past("not a date"));
    }

    #[test]
    fn day_has_iso_shape() {
        let day = today();
        assert_eq!(day.len(), 10);
        assert_eq!(&day[4..5], "-");
    }
}
