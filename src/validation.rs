// src/validation.rs
//! Checks a [`PollDraft`] before a poll is created.
//!
//! Every rule runs on every call, so the report always carries the full set
//! of failing fields. The field keys are what the form uses to place each
//! message and must stay stable.
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::models::PollDraft;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const DESCRIPTION_REQUIRED: &str = "Description is required";
pub const OPTIONS_REQUIRED: &str = "At least 2 options are required";
pub const EXPIRY_IN_PAST: &str = "Expiration date must be in the future";

/// Fewest non-blank options a poll can be created with.
pub const MIN_FILLED_OPTIONS: usize = 2;

// ISO-8601 minute precision with a zone, which RFC 3339 leaves out.
const ZONED_MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M%:z";
const UTC_MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

// Forms produced by a `datetime-local` picker carry no offset.
const LOCAL_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Description,
    Options,
    ExpiresAt,
}

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Options => "options",
            Field::ExpiresAt => "expiresAt",
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Outcome of one validation pass. Validity is derived from the error map,
/// there is no separate flag to get out of sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<Field, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &BTreeMap<Field, String> {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    fn reject(&mut self, field: Field, message: &str) {
        self.errors.insert(field, message.to_string());
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut report = serializer.serialize_struct("ValidationReport", 2)?;
        report.serialize_field("isValid", &self.is_valid())?;
        report.serialize_field("errors", &self.errors)?;
        report.end()
    }
}

/// Validates a draft against the clock returned by `now`.
///
/// `now` is only consulted when the draft carries an expiry.
pub fn validate_create_poll<F>(draft: &PollDraft, now: F) -> ValidationReport
where
    F: Fn() -> DateTime<Utc>,
{
    let mut report = ValidationReport::default();

    if is_blank(&draft.title) {
        report.reject(Field::Title, TITLE_REQUIRED);
    }

    if is_blank(&draft.description) {
        report.reject(Field::Description, DESCRIPTION_REQUIRED);
    }

    let filled = draft.options.iter().filter(|option| !is_blank(option)).count();
    if filled < MIN_FILLED_OPTIONS {
        report.reject(Field::Options, OPTIONS_REQUIRED);
    }

    // An empty string is what a cleared picker sends; it means "no expiry".
    if let Some(raw) = draft.expires_at.as_deref().filter(|raw| !raw.is_empty()) {
        match parse_expiry(raw) {
            Some(expires_at) if expires_at > now() => {}
            _ => report.reject(Field::ExpiresAt, EXPIRY_IN_PAST),
        }
    }

    report
}

pub fn validate_create_poll_now(draft: &PollDraft) -> ValidationReport {
    validate_create_poll(draft, Utc::now)
}

/// Parses an expiry as sent by the form: RFC 3339, a zoned minute-precision
/// ISO-8601 value, an offset-less `datetime-local` value, or a bare date.
/// Offset-less values are read as UTC.
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }

    if let Ok(at) = DateTime::parse_from_str(raw, ZONED_MINUTE_FORMAT) {
        return Some(at.with_timezone(&Utc));
    }

    if let Ok(at) = NaiveDateTime::parse_from_str(raw, UTC_MINUTE_FORMAT) {
        return Some(at.and_utc());
    }

    if let Some(at) = LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(at.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn draft(title: &str, description: &str, options: &[&str], expires_at: Option<&str>) -> PollDraft {
        PollDraft {
            title: title.to_string(),
            description: description.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            expires_at: expires_at.map(str::to_string),
        }
    }

    #[test]
    fn accepts_a_complete_draft() {
        let report = validate_create_poll(
            &draft(
                "Best Programming Language",
                "Vote for your favorite",
                &["JavaScript", "Python"],
                None,
            ),
            fixed_now,
        );

        assert!(report.is_valid());
        assert!(report.errors().is_empty());
    }

    #[test]
    fn reports_every_missing_field_at_once() {
        let report = validate_create_poll(
            &draft("  ", "", &["Only one option", "   "], None),
            fixed_now,
        );

        assert!(!report.is_valid());
        assert_eq!(report.errors().len(), 3);
        assert_eq!(report.error(Field::Title), Some(TITLE_REQUIRED));
        assert_eq!(report.error(Field::Description), Some(DESCRIPTION_REQUIRED));
        assert_eq!(report.error(Field::Options), Some(OPTIONS_REQUIRED));
        assert_eq!(report.error(Field::ExpiresAt), None);
    }

    #[test]
    fn blank_title_fails_regardless_of_other_fields() {
        for title in ["", " ", "\t\n"] {
            let report = validate_create_poll(&draft(title, "D", &["A", "B"], None), fixed_now);
            assert_eq!(report.error(Field::Title), Some(TITLE_REQUIRED));
            assert_eq!(report.errors().len(), 1);
        }
    }

    #[test]
    fn fewer_than_two_filled_options_fail() {
        for options in [&[][..], &["A"][..], &["A", " ", ""][..]] {
            let report = validate_create_poll(&draft("T", "D", options, None), fixed_now);
            assert_eq!(report.error(Field::Options), Some(OPTIONS_REQUIRED));
        }
    }

    #[test]
    fn blank_options_are_tolerated_when_enough_are_filled() {
        let report = validate_create_poll(&draft("T", "D", &["", "A", "  ", "B", ""], None), fixed_now);
        assert!(report.is_valid());
    }

    #[test]
    fn rejects_past_or_unparseable_expiry() {
        for expires_at in ["2023-12-31T23:59:59Z", "not-a-date", "2024-01-01T12:00:00Z", "   "] {
            let report = validate_create_poll(&draft("T", "D", &["A", "B"], Some(expires_at)), fixed_now);
            assert!(!report.is_valid(), "{expires_at} should be rejected");
            assert_eq!(report.error(Field::ExpiresAt), Some(EXPIRY_IN_PAST));
        }
    }

    #[test]
    fn accepts_future_expiry_in_form_formats() {
        for expires_at in [
            "2024-01-01T12:00:01Z",
            "2024-01-01T13:00:00+00:30",
            "2024-06-01T09:30",
            "2024-06-01T09:30:15",
            "2024-06-01T09:30:15.250",
            "2024-06-01",
            "2030-06-01T09:30Z",
            "2030-06-01T09:30+02:00",
        ] {
            let report = validate_create_poll(&draft("T", "D", &["A", "B"], Some(expires_at)), fixed_now);
            assert!(report.is_valid(), "{expires_at} should be accepted");
        }
    }

    #[test]
    fn zoned_minute_precision_resolves_to_utc() {
        assert_eq!(
            parse_expiry("2030-06-01T09:30Z"),
            Some(Utc.with_ymd_and_hms(2030, 6, 1, 9, 30, 0).unwrap())
        );
        assert_eq!(
            parse_expiry("2030-06-01T09:30+02:00"),
            Some(Utc.with_ymd_and_hms(2030, 6, 1, 7, 30, 0).unwrap())
        );
        assert_eq!(parse_expiry("2030-06-01T09:30+2"), None);
    }

    #[test]
    fn field_keys_match_serialized_keys() {
        for field in [Field::Title, Field::Description, Field::Options, Field::ExpiresAt] {
            assert_eq!(serde_json::to_value(field).unwrap(), field.key());
        }
    }

    #[test]
    fn empty_expiry_means_none() {
        let report = validate_create_poll(&draft("T", "D", &["A", "B"], Some("")), || {
            panic!("clock should not be read without an expiry")
        });
        assert!(report.is_valid());
    }

    #[test]
    fn repeated_calls_give_identical_reports() {
        let input = draft("", "D", &["A"], Some("nope"));
        let first = validate_create_poll(&input, fixed_now);
        let second = validate_create_poll(&input, fixed_now);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn report_serializes_with_stable_keys() {
        let report = validate_create_poll(&draft("", "", &[], Some("bad")), fixed_now);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["isValid"], false);
        assert_eq!(json["errors"]["title"], TITLE_REQUIRED);
        assert_eq!(json["errors"]["description"], DESCRIPTION_REQUIRED);
        assert_eq!(json["errors"]["options"], OPTIONS_REQUIRED);
        assert_eq!(json["errors"]["expiresAt"], EXPIRY_IN_PAST);
    }
}
