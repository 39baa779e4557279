use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};

const ISO_DATE: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Formats a date as its ISO key (`YYYY-MM-DD`). Lexicographic order of
/// keys is chronological order.
pub fn date_key(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Parses a date from either a bare ISO date or an RFC3339 timestamp,
/// discarding any time-of-day component. Unrecognized input is `None`.
pub fn parse_date_flexible(value: &str) -> Option<Date> {
    if let Ok(date) = Date::parse(value, ISO_DATE) {
        return Some(date);
    }

    OffsetDateTime::parse(value, &Rfc3339).ok().map(|dt| dt.date())
}

/// Serde adapter for `Option<Date>` fields carried as strings in remote
/// documents. Deserialization is tolerant: an unparseable value becomes
/// `None` rather than failing the whole document.
pub mod flexible_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&super::date_key(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Date>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;

        Ok(raw.as_deref().and_then(super::parse_date_flexible))
    }
}
