//! Results panel markup.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use maud::{html, Markup};
use skycast_weather::{CurrentWeather, ForecastDay, Place, WeatherReport};

const DAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    DAYS[date.weekday().num_days_from_sunday() as usize]
}

/// `Sunday, 8 December`
pub fn format_day(date: NaiveDate) -> String {
    format!(
        "{}, {} {}",
        weekday_name(date),
        date.day(),
        MONTHS[date.month0() as usize]
    )
}

/// Format an API date (`YYYY-MM-DD` or `YYYY-MM-DD HH:MM`); anything else is returned as is.
pub fn format_date(value: &str) -> String {
    match parse_date(value) {
        Some(date) => format_day(date),
        None => value.to_string(),
    }
}

fn num(value: f64) -> String {
    value.to_string()
}

pub fn render_current(place: &Place, current: &CurrentWeather) -> Markup {
    html! {
        div class="weather-card" {
            h3 { (place.name) ", " (place.country) }
            p { (format_date(&current.updated_at)) }
            div class="temp" { (num(current.temperature)) sup { "o" } "C" }
            img src=(current.condition.icon_url()) alt=(current.condition.text) class="icon";
            p { (current.condition.text) }
            p { "Feels like: " (num(current.feels_like)) sup { "o" } "C" }
            p { "Humidity: " (num(current.humidity)) "%" }
            p { "UV Index: " (num(current.uv)) }
            p { "Pressure: " (num(current.pressure)) " mb" }
            p { "Visibility: " (num(current.visibility)) " km" }
            p { "Wind: " (num(current.wind_speed)) " km/h, " (current.wind_direction) }
            p { "Precipitation: " (num(current.precipitation)) " mm" }
        }
    }
}

/// One card per forecast day
pub fn render_forecast(days: &[ForecastDay]) -> Markup {
    html! {
        @for day in days {
            div class="weather-card" {
                h3 { (weekday_name(day.date)) }
                p { (format_day(day.date)) }
                div class="temp" { (num(day.high)) sup { "o" } "C" }
                small { "Low: " (num(day.low)) sup { "o" } "C" }
                img src=(day.condition.icon_url()) alt=(day.condition.text) class="icon";
                p { (day.condition.text) }
                p { "Humidity: " (num(day.humidity)) "%" }
                p { "UV Index: " (num(day.uv)) }
            }
        }
    }
}

/// Current conditions followed by cards for the days after today
pub fn compose(report: &WeatherReport) -> Markup {
    html! {
        (render_current(&report.place, &report.current))
        (render_forecast(report.upcoming()))
    }
}

pub fn render_alert(message: &str) -> Markup {
    html! {
        p class="text-danger" { (message) }
    }
}

/// What the results container shows: an optional alert above optional content.
///
/// Every change re-renders the whole panel, so the host does one replace.
#[derive(Debug, Clone, Default)]
pub struct ResultsPanel {
    alert: Option<String>,
    content: Option<Markup>,
}

impl ResultsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh weather: clears any alert
    pub fn show_report(&mut self, report: &WeatherReport) {
        self.alert = None;
        self.content = Some(compose(report));
    }

    /// Alert that replaces whatever was shown
    pub fn show_error(&mut self, message: &str) {
        self.alert = Some(message.to_string());
        self.content = None;
    }

    /// Alert above the current content
    pub fn show_notice(&mut self, message: &str) {
        self.alert = Some(message.to_string());
    }

    pub fn render(&self) -> String {
        html! {
            @if let Some(alert) = &self.alert {
                (render_alert(alert))
            }
            @if let Some(content) = &self.content {
                (content)
            }
        }
        .into_string()
    }
}
