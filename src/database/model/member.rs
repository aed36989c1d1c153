use crate::database::error::MemberError;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use dto::member::Member;
use std::str::FromStr;

/// Columns the notification sweep reads.
/// Credentials are deliberately not selected.
#[derive(Queryable, Selectable, Debug, PartialEq)]
#[diesel(table_name = crate::database::schema::member)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct StoredMember {
    id: i32,
    name: String,
    mobile: String,
    birth_date: Option<String>,
    membership_end_date: Option<String>,
    is_cancelled: bool,
}

#[cfg(any(test, feature = "demo"))]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::database::schema::member)]
#[diesel(treat_none_as_default_value = false)]
pub(crate) struct NewMember<'a> {
    pub name: &'a str,
    pub mobile: &'a str,
    pub password: Option<&'a str>,
    pub birth_date: Option<String>,
    pub membership_end_date: Option<String>,
    pub is_cancelled: bool,
}

impl TryFrom<StoredMember> for Member {
    type Error = MemberError;

    fn try_from(value: StoredMember) -> Result<Self, Self::Error> {
        let birth_date = parse_stored_date(value.id, "birth date", value.birth_date)?;
        let membership_end_date =
            parse_stored_date(value.id, "membership end date", value.membership_end_date)?;

        Ok(Member::new(
            value.id,
            value.name,
            value.mobile,
            birth_date,
            membership_end_date,
            value.is_cancelled,
        ))
    }
}

/// Dates may have been stored as plain dates or as full timestamps.
/// Timestamps are brought back to the local calendar date.
fn parse_stored_date(
    id: i32,
    field: &'static str,
    value: Option<String>,
) -> Result<Option<NaiveDate>, MemberError> {
    let value = match value {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Ok(None),
    };
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::from_str(trimmed) {
        return Ok(Some(date));
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(date_time.with_timezone(&Local).date_naive()));
    }
    if let Ok(date_time) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(Some(date_time.date()));
    }

    Err(MemberError::MalformedDate { id, field, value })
}
