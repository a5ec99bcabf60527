//! Free-text date parsing and event-date policy.
//!
//! Candidate dates are pinned to noon and "today" to midnight before any
//! comparison, so a timezone offset can never move a date across a day
//! boundary.

use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Days ahead (inclusive) that still count as "too close" to organize.
pub const TOO_CLOSE_DAYS: i64 = 7;

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid iso date regex")
});

static BR_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?$").expect("valid br date regex")
});

static TEXT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:dia\s+)?(\d{1,2})\s+de\s+(\w+)(?:\s+de\s+(\d{4}))?")
        .expect("valid textual date regex")
});

static DATE_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}(?:/\d{2,4})?|\d{1,2}\s+de\s+\w+(?:\s+de\s+\d{4})?)\b",
    )
    .expect("valid embedded date regex")
});

fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "janeiro" | "jan" => 1,
        "fevereiro" | "fev" => 2,
        "março" | "marco" | "mar" => 3,
        "abril" | "abr" => 4,
        "maio" | "mai" => 5,
        "junho" | "jun" => 6,
        "julho" | "jul" => 7,
        "agosto" | "ago" => 8,
        "setembro" | "set" => 9,
        "outubro" | "out" => 10,
        "novembro" | "nov" => 11,
        "dezembro" | "dez" => 12,
        _ => return None,
    };
    Some(month)
}

/// Normalize a date expression to `YYYY-MM-DD`, using the local current year
/// when the text omits one.
///
/// The result is syntactic only: `31/02` yields `"YYYY-02-31"`.
pub fn parse_to_iso_date(text: &str) -> Option<String> {
    parse_to_iso_date_in(text, Local::now().year())
}

/// Same as [`parse_to_iso_date`] with an explicit default year.
pub fn parse_to_iso_date_in(text: &str, default_year: i32) -> Option<String> {
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    if ISO_DATE.is_match(&normalized) {
        return Some(normalized);
    }

    if let Some(caps) = BR_DATE.captures(&normalized) {
        let day = &caps[1];
        let month = &caps[2];
        let year = match caps.get(3).map(|m| m.as_str()) {
            None => default_year.to_string(),
            Some(y) if y.len() == 2 => format!("20{y}"),
            Some(y) => y.to_string(),
        };
        return Some(format!("{year}-{month:0>2}-{day:0>2}"));
    }

    if let Some(caps) = TEXT_DATE.captures(&normalized) {
        let month = month_number(&caps[2])?;
        let year = caps
            .get(3)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| default_year.to_string());
        return Some(format!("{year}-{month:02}-{:0>2}", &caps[1]));
    }

    None
}

/// The fragment of `text` that normalizes to `iso`, so replies can quote the
/// date the way the user typed it.
pub fn date_as_written<'a>(text: &'a str, iso: &str, today: NaiveDate) -> Option<&'a str> {
    DATE_IN_TEXT
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|fragment| parse_to_iso_date_in(fragment, today.year()).as_deref() == Some(iso))
}

fn parse_calendar(iso: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok()
}

fn at_noon(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
}

fn at_midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Whole days from `today` to `date`, floor of the hour difference.
fn days_between(today: NaiveDate, date: NaiveDate) -> i64 {
    let hours = (at_noon(date) - at_midnight(today)).num_hours();
    hours.div_euclid(24)
}

/// True when `iso` names a real calendar date that is today or later.
pub fn is_valid_future_date(iso: &str) -> bool {
    is_valid_future_date_at(iso, Local::now().date_naive())
}

pub fn is_valid_future_date_at(iso: &str, today: NaiveDate) -> bool {
    parse_calendar(iso).is_some_and(|date| at_noon(date) >= at_midnight(today))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateWarning {
    Past,
    TooClose,
}

/// Outcome of applying event-date policy to user text. Never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValidation {
    pub valid: bool,
    pub iso_date: Option<String>,
    pub warning: Option<DateWarning>,
    pub message: Option<String>,
    pub suggested_date: Option<String>,
    pub days_from_now: Option<i64>,
}

impl DateValidation {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            iso_date: None,
            warning: None,
            message: Some(message.into()),
            suggested_date: None,
            days_from_now: None,
        }
    }
}

pub fn validate_event_date(text: &str) -> DateValidation {
    validate_event_date_at(text, Local::now().date_naive())
}

/// Validate `text` as an event date relative to an explicit `today`.
pub fn validate_event_date_at(text: &str, today: NaiveDate) -> DateValidation {
    let Some(iso) = parse_to_iso_date_in(text, today.year()) else {
        return DateValidation::invalid(
            "Não consegui entender a data. Pode informar no formato DD/MM/AAAA?",
        );
    };

    let Some(date) = parse_calendar(&iso) else {
        return DateValidation::invalid("Essa data não parece válida. Pode verificar?");
    };

    let days = days_between(today, date);

    if at_noon(date) < at_midnight(today) {
        let suggestion = restamp_year(date, today.year())
            .filter(|d| at_noon(*d) >= at_midnight(today))
            .or_else(|| restamp_year(date, today.year() + 1));

        let suggested_iso = suggestion.map(|d| d.format("%Y-%m-%d").to_string());
        let message = match suggestion {
            Some(d) => format!(
                "A data {} já passou. Você quis dizer {}?",
                text.trim(),
                d.format("%d/%m/%Y")
            ),
            None => format!("A data {} já passou. Pode informar outra data?", text.trim()),
        };

        return DateValidation {
            valid: false,
            iso_date: Some(iso),
            warning: Some(DateWarning::Past),
            message: Some(message),
            suggested_date: suggested_iso,
            days_from_now: Some(days),
        };
    }

    if days == 0 {
        return DateValidation {
            valid: true,
            iso_date: Some(iso),
            warning: None,
            message: Some("O evento é hoje! Vamos agilizar os preparativos.".to_string()),
            suggested_date: None,
            days_from_now: Some(0),
        };
    }

    if days <= TOO_CLOSE_DAYS {
        let unit = if days == 1 { "dia" } else { "dias" };
        return DateValidation {
            valid: true,
            iso_date: Some(iso),
            warning: Some(DateWarning::TooClose),
            message: Some(format!(
                "Atenção: faltam só {days} {unit} para o evento. O prazo para organizar está curto."
            )),
            suggested_date: None,
            days_from_now: Some(days),
        };
    }

    DateValidation {
        valid: true,
        iso_date: Some(iso),
        warning: None,
        message: None,
        suggested_date: None,
        days_from_now: Some(days),
    }
}

/// Move `date` into `year`. 29/02 becomes 28/02 in common years.
fn restamp_year(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
}
