use chrono::NaiveDateTime;
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

use super::dates::{format_date_str, parse_kindle_date};

/// Serialize a timestamp as a `dateStr` (`August 04, 2022 10:15:00`)
pub fn serialize_date_str<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_date_str(date))
}

/// Deserialize a `dateStr`; any layout the clippings parser accepts is allowed
pub fn deserialize_date_str<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_kindle_date(&s).ok_or_else(|| Error::custom(format!("invalid date string: '{}'", s)))
}

pub fn serialize_optional_date_str<S>(
    date: &Option<NaiveDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(date) => serialize_date_str(date, serializer),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize_optional_date_str<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) => parse_kindle_date(&s)
            .map(Some)
            .ok_or_else(|| Error::custom(format!("invalid date string: '{}'", s))),
        None => Ok(None),
    }
}
