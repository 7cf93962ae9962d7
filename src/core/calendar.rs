//! Calendar conventions shared by the loader and the turnover report.
//!
//! Weeks for the `SemanaInicioDt` column run Monday to Sunday. Weeks for the
//! turnover report use `%U` numbering: they start on Sunday and the days
//! before the first Sunday of the year fall in week `00`.

use crate::domain::model::Cell;
use crate::utils::error::DashboardError;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Date formats tried in order when the loader parses `Data`.
///
/// Slash dates are read day-first, so `03/02/2024` is 3 February. Sources
/// that write month-first dates must set `[loader] date_formats` (for
/// example `"%m/%d/%Y %H:%M"`), otherwise ambiguous days land in the wrong
/// month and unambiguous ones such as `02/13/2024` are dropped as unparseable.
pub fn default_date_formats() -> Vec<String> {
    [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%d/%m/%Y",
    ]
    .iter()
    .map(|f| f.to_string())
    .collect()
}

/// Parses a cell into a date-time using an ordered list of formats.
/// Date-only formats yield midnight.
#[derive(Debug, Clone)]
pub struct DateParser {
    formats: Vec<String>,
}

impl DateParser {
    pub fn new(formats: Vec<String>) -> Self {
        Self { formats }
    }

    pub fn parse_cell(&self, cell: &Cell) -> Option<NaiveDateTime> {
        match cell {
            Cell::DateTime(dt) => Some(*dt),
            Cell::Text(s) => self.parse_str(s),
            _ => None,
        }
    }

    pub fn parse_str(&self, raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        self.formats.iter().find_map(|fmt| {
            NaiveDateTime::parse_from_str(raw, fmt).ok().or_else(|| {
                NaiveDate::parse_from_str(raw, fmt)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
        })
    }
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(default_date_formats())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeekdayLocale {
    #[default]
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "en")]
    English,
}

impl WeekdayLocale {
    pub fn name(&self, day: Weekday) -> &'static str {
        match self {
            WeekdayLocale::Portuguese => match day {
                Weekday::Mon => "Segunda-feira",
                Weekday::Tue => "Terça-feira",
                Weekday::Wed => "Quarta-feira",
                Weekday::Thu => "Quinta-feira",
                Weekday::Fri => "Sexta-feira",
                Weekday::Sat => "Sábado",
                Weekday::Sun => "Domingo",
            },
            WeekdayLocale::English => match day {
                Weekday::Mon => "Monday",
                Weekday::Tue => "Tuesday",
                Weekday::Wed => "Wednesday",
                Weekday::Thu => "Thursday",
                Weekday::Fri => "Friday",
                Weekday::Sat => "Saturday",
                Weekday::Sun => "Sunday",
            },
        }
    }
}

pub fn semester_label(dt: &NaiveDateTime) -> &'static str {
    if dt.month() <= 6 {
        "S1"
    } else {
        "S2"
    }
}

pub fn quarter_period(dt: &NaiveDateTime) -> String {
    format!("{}Q{}", dt.year(), (dt.month() - 1) / 3 + 1)
}

pub fn month_period(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m").to_string()
}

/// Monday-to-Sunday span containing `dt`, rendered `start/end`.
pub fn week_period(dt: &NaiveDateTime) -> String {
    let date = dt.date();
    let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    let end = start + Duration::days(6);
    format!("{}/{}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
}

pub fn day_label(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// Time bucket for the turnover report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKind {
    Year,
    Semester,
    Quarter,
    Month,
    Week,
    Weekday,
    Date,
}

impl PeriodKind {
    pub const ALL: [PeriodKind; 7] = [
        PeriodKind::Year,
        PeriodKind::Semester,
        PeriodKind::Quarter,
        PeriodKind::Month,
        PeriodKind::Week,
        PeriodKind::Weekday,
        PeriodKind::Date,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PeriodKind::Year => "Ano",
            PeriodKind::Semester => "Semestre",
            PeriodKind::Quarter => "Trimestre",
            PeriodKind::Month => "Mês",
            PeriodKind::Week => "Semana",
            PeriodKind::Weekday => "Dia da Semana",
            PeriodKind::Date => "Data",
        }
    }

    /// ASCII name used in file names.
    pub fn slug(&self) -> &'static str {
        match self {
            PeriodKind::Year => "ano",
            PeriodKind::Semester => "semestre",
            PeriodKind::Quarter => "trimestre",
            PeriodKind::Month => "mes",
            PeriodKind::Week => "semana",
            PeriodKind::Weekday => "dia_semana",
            PeriodKind::Date => "data",
        }
    }

    pub fn bucket(&self, dt: &NaiveDateTime, locale: WeekdayLocale) -> Cell {
        match self {
            PeriodKind::Year => Cell::Int(dt.year() as i64),
            PeriodKind::Semester => {
                Cell::Text(format!("{} - S{}", dt.year(), (dt.month() - 1) / 6 + 1))
            }
            PeriodKind::Quarter => {
                Cell::Text(format!("{} - T{}", dt.year(), (dt.month() - 1) / 3 + 1))
            }
            PeriodKind::Month => Cell::Text(month_period(dt)),
            PeriodKind::Week => Cell::Text(dt.format("%Y - Semana %U").to_string()),
            PeriodKind::Weekday => Cell::from(locale.name(dt.weekday())),
            PeriodKind::Date => Cell::Text(day_label(dt)),
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PeriodKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let kind = match normalized.as_str() {
            "ano" | "year" => PeriodKind::Year,
            "semestre" | "semester" => PeriodKind::Semester,
            "trimestre" | "quarter" => PeriodKind::Quarter,
            "mês" | "mes" | "month" => PeriodKind::Month,
            "semana" | "week" => PeriodKind::Week,
            "dia da semana" | "dia-da-semana" | "weekday" => PeriodKind::Weekday,
            "data" | "date" | "day" => PeriodKind::Date,
            _ => {
                return Err(DashboardError::InvalidPeriod {
                    value: s.to_string(),
                })
            }
        };
        Ok(kind)
    }
}
