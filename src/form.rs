// src/form.rs
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::PollDraft;
use crate::validation::{validate_create_poll, Field, ValidationReport};

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;

/// Editing state behind the poll-creation form.
///
/// The option count is held between [`MIN_OPTIONS`] and [`MAX_OPTIONS`]
/// here; the validator itself only counts filled options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollForm {
    draft: PollDraft,
    report: ValidationReport,
}

impl Default for PollForm {
    fn default() -> Self {
        Self::new()
    }
}

impl PollForm {
    pub fn new() -> Self {
        Self {
            draft: PollDraft {
                options: vec![String::new(); MIN_OPTIONS],
                ..PollDraft::default()
            },
            report: ValidationReport::default(),
        }
    }

    pub fn draft(&self) -> &PollDraft {
        &self.draft
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    pub fn set_expires_at(&mut self, expires_at: Option<String>) {
        self.draft.expires_at = expires_at;
    }

    pub fn add_option(&mut self) -> bool {
        if self.draft.options.len() >= MAX_OPTIONS {
            return false;
        }
        self.draft.options.push(String::new());
        true
    }

    pub fn remove_option(&mut self, index: usize) -> bool {
        if self.draft.options.len() <= MIN_OPTIONS || index >= self.draft.options.len() {
            return false;
        }
        self.draft.options.remove(index);
        true
    }

    pub fn update_option(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.draft.options.get_mut(index) {
            Some(option) => {
                *option = text.into();
                true
            }
            None => false,
        }
    }

    /// Message to show next to `field` after the last submit, if any.
    pub fn error(&self, field: Field) -> Option<&str> {
        self.report.error(field)
    }

    /// Validates the current draft. A valid draft is handed back and the form
    /// starts over; an invalid one stays put with its errors recorded.
    pub fn submit<F>(&mut self, now: F) -> Result<PollDraft, ValidationReport>
    where
        F: Fn() -> DateTime<Utc>,
    {
        let report = validate_create_poll(&self.draft, now);
        if !report.is_valid() {
            debug!(errors = report.errors().len(), "poll form rejected");
            self.report = report.clone();
            return Err(report);
        }

        let submitted = std::mem::take(self).draft;
        Ok(submitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{OPTIONS_REQUIRED, TITLE_REQUIRED};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn starts_with_two_empty_options() {
        let form = PollForm::new();
        assert_eq!(form.draft().options, vec!["", ""]);
        assert_eq!(form.draft().expires_at, None);
    }

    #[test]
    fn option_count_stays_within_bounds() {
        let mut form = PollForm::new();
        assert!(!form.remove_option(0));

        while form.add_option() {}
        assert_eq!(form.draft().options.len(), MAX_OPTIONS);
        assert!(!form.add_option());

        assert!(form.remove_option(3));
        assert_eq!(form.draft().options.len(), MAX_OPTIONS - 1);
        assert!(!form.remove_option(MAX_OPTIONS));
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut form = PollForm::new();
        form.add_option();
        form.update_option(0, "A");
        form.update_option(1, "B");
        form.update_option(2, "C");

        form.remove_option(1);
        assert_eq!(form.draft().options, vec!["A", "C"]);
        assert!(!form.update_option(5, "Z"));
    }

    #[test]
    fn failed_submit_keeps_draft_and_exposes_errors() {
        let mut form = PollForm::new();
        form.set_description("D");
        form.update_option(0, "Only");

        let report = form.submit(now).unwrap_err();
        assert_eq!(report.errors().len(), 2);
        assert_eq!(form.error(Field::Title), Some(TITLE_REQUIRED));
        assert_eq!(form.error(Field::Options), Some(OPTIONS_REQUIRED));
        assert_eq!(form.draft().description, "D");
    }

    #[test]
    fn successful_submit_resets_form() {
        let mut form = PollForm::new();
        form.set_title("Lunch");
        form.submit(now).unwrap_err();

        form.set_description("Where?");
        form.update_option(0, "Tacos");
        form.update_option(1, "Ramen");
        form.set_expires_at(Some("2024-01-02T12:00".to_string()));

        let draft = form.submit(now).unwrap();
        assert_eq!(draft.title, "Lunch");
        assert_eq!(draft.options, vec!["Tacos", "Ramen"]);
        assert_eq!(form, PollForm::new());
        assert_eq!(form.error(Field::Title), None);
    }
}
