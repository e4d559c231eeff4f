//! Simulated calendar. Dates derive from the save's start date and week number
//! only; wall-clock time never enters the simulation.

use chrono::{Datelike, Duration, NaiveDate};

/// Default season start: 1 April 2001.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2001, 4, 1).unwrap_or(NaiveDate::MIN)
}

pub fn default_birthday() -> NaiveDate {
    NaiveDate::from_ymd_opt(1975, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Date of the given week: `start + (week - 1) * 7` days.
pub fn sim_date(start: NaiveDate, week: u32) -> NaiveDate {
    let weeks = i64::from(week.max(1) - 1);
    start + Duration::days(weeks * 7)
}

/// Whole years between `birthday` and `today`.
pub fn age_on(birthday: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birthday.year();
    if (today.month(), today.day()) < (birthday.month(), birthday.day()) {
        age -= 1;
    }
    age
}

pub fn format_dmy(d: NaiveDate) -> String {
    d.format("%d-%m-%Y").to_string()
}

/// Accepts `DD-MM-YYYY` and falls back to ISO `YYYY-MM-DD`.
pub fn parse_dmy(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%d-%m-%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

/// Compact `YYYYMMDD` stamp used in record ids.
pub fn ymd_stamp(d: NaiveDate) -> String {
    d.format("%Y%m%d").to_string()
}

/// Serde adapter for the `DD-MM-YYYY` save format.
pub mod dmy {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_dmy(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(de)?;
        super::parse_dmy(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("bad date: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_one_is_start() {
        let s = default_start_date();
        assert_eq!(sim_date(s, 1), s);
        assert_eq!(sim_date(s, 0), s);
        assert_eq!(format_dmy(sim_date(s, 3)), "15-04-2001");
    }

    #[test]
    fn age_counts_birthday() {
        let b = NaiveDate::from_ymd_opt(1970, 4, 10).unwrap();
        assert_eq!(age_on(b, NaiveDate::from_ymd_opt(2001, 4, 9).unwrap()), 30);
        assert_eq!(age_on(b, NaiveDate::from_ymd_opt(2001, 4, 10).unwrap()), 31);
    }

    #[test]
    fn parses_both_formats() {
        let want = NaiveDate::from_ymd_opt(1969, 7, 20);
        assert_eq!(parse_dmy("20-07-1969"), want);
        assert_eq!(parse_dmy("1969-07-20"), want);
        assert_eq!(parse_dmy("July"), None);
    }
}
