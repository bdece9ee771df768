use crate::error::AppError;
use chrono::{Duration, Local, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A resolved date query: a single day, or an inclusive range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: Option<String>,
}

impl DateRange {
    /// Last day of the range, or the single day.
    pub fn last(&self) -> &str {
        self.end.as_deref().unwrap_or(self.start.as_str())
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        AppError::validation(format!("Invalid date format: {value}. Use YYYY-MM-DD."))
    })
}

fn fmt(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn shortcut(name: &str, today: NaiveDate) -> Option<(NaiveDate, Option<NaiveDate>)> {
    match name {
        "today" => Some((today, None)),
        "yesterday" => Some((today - Duration::days(1), None)),
        "week" => Some((today - Duration::days(7), Some(today))),
        "month" => Some((today - Duration::days(30), Some(today))),
        _ => None,
    }
}

/// Resolves date arguments relative to the local current date.
///
/// `date` may be a shortcut (`today`, `yesterday`, `week`, `month`) or `YYYY-MM-DD`.
pub fn resolve_date(
    date: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRange, AppError> {
    resolve_date_from(Local::now().date_naive(), date, start, end)
}

pub fn resolve_date_from(
    today: NaiveDate,
    date: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRange, AppError> {
    if let Some(date) = date {
        if let Some((start, end)) = shortcut(date, today) {
            return Ok(DateRange {
                start: fmt(start),
                end: end.map(fmt),
            });
        }
        return Ok(DateRange {
            start: fmt(parse_date(date)?),
            end: None,
        });
    }

    match (start, end) {
        (Some(start), Some(end)) => Ok(DateRange {
            start: fmt(parse_date(start)?),
            end: Some(fmt(parse_date(end)?)),
        }),
        (Some(_), None) | (None, Some(_)) => Err(AppError::validation(
            "Both --start and --end are required for a date range",
        )),
        (None, None) => Ok(DateRange {
            start: fmt(today),
            end: None,
        }),
    }
}

/// Like [`resolve_date`], except that an `end` without `start` stretches the
/// resolved day into a range ending there.
pub fn resolve_span(
    date: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRange, AppError> {
    resolve_span_from(Local::now().date_naive(), date, start, end)
}

pub fn resolve_span_from(
    today: NaiveDate,
    date: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRange, AppError> {
    match (start, end) {
        (None, Some(end)) => {
            let mut range = resolve_date_from(today, date, None, None)?;
            range.end = Some(fmt(parse_date(end)?));
            Ok(range)
        }
        _ => resolve_date_from(today, date, start, end),
    }
}

/// The day `weeks` weeks before `end` (YYYY-MM-DD).
pub fn weeks_before(end: &str, weeks: u32) -> Result<String, AppError> {
    Ok(fmt(parse_date(end)? - Duration::weeks(i64::from(weeks))))
}
