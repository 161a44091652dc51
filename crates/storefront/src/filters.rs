//! Custom Askama template filters.
//!
//! Each filter delegates to a pure function so the formatting rules can be
//! unit-tested without rendering a template.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::NaiveDate;

/// Renders a rating as a five-star row.
///
/// Accepts anything that displays as a number (a review's 1-5 rating or a
/// product's fractional average); the value is rounded to the nearest star.
///
/// Usage in templates: `{{ product.average_rating|stars }}`
#[askama::filter_fn]
pub fn stars(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(star_row(&value.to_string()))
}

/// Formats a timestamp as a short human date, e.g. `Mar 14, 2026`.
///
/// Usage in templates: `{{ ts|date }}`
#[askama::filter_fn]
pub fn date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(short_date(&value.to_string()))
}

/// Reduces a display name to its initials for the reviewer avatar.
///
/// Usage in templates: `{{ reviewer_name|initials }}`
#[askama::filter_fn]
pub fn initials(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(name_initials(&value.to_string()))
}

/// Formats a numeric amount as a dollar price.
///
/// Usage in templates: `{{ amount|price }}`
#[askama::filter_fn]
pub fn price(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(dollar_price(&value.to_string()))
}

/// Total width of a star row.
const STAR_COUNT: u32 = 5;

/// Round a displayed number to the nearest star and render filled/hollow
/// stars. Unparseable input renders as zero stars rather than failing the
/// whole page.
fn star_row(raw: &str) -> String {
    let value = raw.parse::<f64>().unwrap_or(0.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = value.clamp(0.0, f64::from(STAR_COUNT)).round() as u32;

    let mut row = String::new();
    for position in 1..=STAR_COUNT {
        row.push(if position <= filled { '\u{2605}' } else { '\u{2606}' });
    }
    row
}

/// Reformat the date part of a displayed timestamp.
///
/// `chrono::DateTime` displays as `YYYY-MM-DD HH:MM:SS UTC`; anything whose
/// leading token is not a `YYYY-MM-DD` date passes through unchanged.
fn short_date(raw: &str) -> String {
    raw.split_whitespace()
        .next()
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .map_or_else(
            || raw.to_string(),
            |day| day.format("%b %-d, %Y").to_string(),
        )
}

/// First letter of the first two words, uppercased. Falls back to `?` for
/// blank names so the avatar never renders empty.
fn name_initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

/// Format a displayed number as `$X.XX`; unparseable input keeps its raw
/// form behind a dollar sign.
fn dollar_price(raw: &str) -> String {
    raw.parse::<f64>()
        .map_or_else(|_| format!("${raw}"), |amount| format!("${amount:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_row_rounds_to_the_nearest_star() {
        assert_eq!(star_row("4.5"), "★★★★★");
        assert_eq!(star_row("4.4"), "★★★★☆");
        assert_eq!(star_row("5"), "★★★★★");
        assert_eq!(star_row("1"), "★☆☆☆☆");
        assert_eq!(star_row("0"), "☆☆☆☆☆");
    }

    #[test]
    fn star_row_tolerates_garbage_and_out_of_range() {
        assert_eq!(star_row("not a number"), "☆☆☆☆☆");
        assert_eq!(star_row("42"), "★★★★★");
        assert_eq!(star_row("-3"), "☆☆☆☆☆");
    }

    #[test]
    fn short_date_reformats_chrono_display() {
        // How chrono's DateTime<Utc> displays.
        assert_eq!(short_date("2026-03-14 09:30:00 UTC"), "Mar 14, 2026");
        assert_eq!(short_date("2025-12-01 00:00:00.123 UTC"), "Dec 1, 2025");
    }

    #[test]
    fn short_date_passes_unknown_shapes_through() {
        assert_eq!(short_date("yesterday"), "yesterday");
        assert_eq!(short_date(""), "");
    }

    #[test]
    fn initials_take_the_first_two_words() {
        assert_eq!(name_initials("Dana Weaver"), "DW");
        assert_eq!(name_initials("dana"), "D");
        assert_eq!(name_initials("Dana van der Berg"), "DV");
    }

    #[test]
    fn initials_never_render_empty() {
        assert_eq!(name_initials(""), "?");
        assert_eq!(name_initials("   "), "?");
    }

    #[test]
    fn dollar_price_formats_two_decimals() {
        assert_eq!(dollar_price("499.99"), "$499.99");
        assert_eq!(dollar_price("12"), "$12.00");
        assert_eq!(dollar_price("banana"), "$banana");
    }
}
