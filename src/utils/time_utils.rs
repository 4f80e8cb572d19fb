use chrono::DateTime;

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_4_H: i64 = Self::MS_IN_MIN * 60 * 4;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const MS_IN_W: i64 = Self::MS_IN_D * 7;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d";
    pub const DETAILED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

    /// Convert interval in milliseconds to a Binance-style shorthand (e.g. `4h`, `1d`).
    pub fn interval_to_string(interval_ms: i64) -> &'static str {
        match interval_ms {
            Self::MS_IN_MIN => "1m",
            Self::MS_IN_H => "1h",
            Self::MS_IN_4_H => "4h",
            Self::MS_IN_D => "1d",
            Self::MS_IN_W => "1w",
            _ => "custom",
        }
    }
}

pub fn epoch_ms_to_utc(epoch_ms: i64) -> String {
    // Used for display purposes
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(dt) => dt.format(TimeUtils::STANDARD_TIME_FORMAT).to_string(),
        None => String::from("invalid-date"),
    }
}

pub fn epoch_ms_to_utc_detailed(epoch_ms: i64) -> String {
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(dt) => dt.format(TimeUtils::DETAILED_TIME_FORMAT).to_string(),
        None => String::from("invalid-date"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_epoch_ms_as_date() {
        assert_eq!(epoch_ms_to_utc(0), "1970-01-01");
        assert_eq!(epoch_ms_to_utc(TimeUtils::MS_IN_D * 31), "1970-02-01");
        assert_eq!(epoch_ms_to_utc_detailed(TimeUtils::MS_IN_H * 5), "1970-01-01 05:00");
    }

    #[test]
    fn interval_shorthand() {
        assert_eq!(TimeUtils::interval_to_string(TimeUtils::MS_IN_D), "1d");
        assert_eq!(TimeUtils::interval_to_string(12_345), "custom");
    }
}
