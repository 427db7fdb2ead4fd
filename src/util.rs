//! Text and date helpers shared by several adapters.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static BBCODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[/?[bus]\]").expect("valid regex"));

static SINGULAR_UNIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(minute|hour|day|month|year)\b").expect("valid regex"));

/// Converts a relative "N units ago" string into an absolute time.
///
/// Recognises minutes, hours, days and years. "a"/"an" in place of the count
/// means 1. Anything unrecognised, or too far back to represent, resolves
/// to `now`.
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use shiori::util::convert_time;
///
/// let now = Utc::now();
/// assert_eq!(convert_time("5 minutes ago", now), now - Duration::minutes(5));
/// assert_eq!(convert_time("a year ago", now), now - Duration::milliseconds(31_556_952_000));
/// assert_eq!(convert_time("yesterday-ish", now), now);
/// ```
pub fn convert_time(time_ago: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let text = time_ago.trim().to_lowercase();
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    let mut amount = digits.parse::<i64>().unwrap_or(0);
    if amount == 0 && (text.starts_with("a ") || text.starts_with("an ")) {
        amount = 1;
    }

    let ago = if text.contains("minutes") {
        Duration::try_minutes(amount)
    } else if text.contains("hours") {
        Duration::try_hours(amount)
    } else if text.contains("days") {
        Duration::try_days(amount)
    } else if text.contains("year") {
        amount
            .checked_mul(31_556_952_000)
            .and_then(Duration::try_milliseconds)
    } else {
        None
    };

    // Counts too large for a date resolve like unrecognised text
    ago.and_then(|ago| now.checked_sub_signed(ago)).unwrap_or(now)
}

/// Parses the release dates Madara themes print next to chapters.
///
/// Relative dates ("1 day ago", "3 hours ago") go through [`convert_time`]
/// after singular units are pluralised. Absolute dates in the
/// "April 16, 2020", "16 Apr 2020" and "04/16/2020" formats are read as UTC
/// midnight.
///
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use shiori::util::parse_madara_date;
///
/// let now = Utc::now();
/// assert_eq!(parse_madara_date("1 day ago", now), now - Duration::days(1));
/// assert_eq!(
///     parse_madara_date("April 16, 2020", now),
///     Utc.with_ymd_and_hms(2020, 4, 16, 0, 0, 0).unwrap()
/// );
/// ```
pub fn parse_madara_date(date: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let trimmed = date.trim();

    for format in ["%B %d, %Y", "%d %b %Y", "%m/%d/%Y"] {
        if let Ok(day) = NaiveDate::parse_from_str(trimmed, format) {
            return Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
        }
    }

    let pluralised = SINGULAR_UNIT.replace_all(&trimmed.to_lowercase(), "${1}s").into_owned();
    convert_time(&pluralised, now)
}

/// Decodes HTML entities (`&amp;`, `&#039;`, ...) in a plain string.
///
/// ```rust
/// use shiori::util::decode_html_entities;
///
/// assert_eq!(decode_html_entities("Kaguya-sama &amp; Friends"), "Kaguya-sama & Friends");
/// assert_eq!(decode_html_entities("It&#039;s fine"), "It's fine");
/// ```
pub fn decode_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    Html::parse_fragment(text).root_element().text().collect()
}

/// Removes `[b]`, `[u]` and `[s]` BBCode tags.
///
/// ```rust
/// use shiori::util::strip_bbcode;
///
/// assert_eq!(strip_bbcode("[b]Bold[/b] and [s]gone[/s]"), "Bold and gone");
/// ```
pub fn strip_bbcode(text: &str) -> String {
    BBCODE.replace_all(text, "").into_owned()
}

/// Last non-empty `/`-separated segment of a URL, without query string.
///
/// ```rust
/// use shiori::util::last_path_segment;
///
/// assert_eq!(last_path_segment("https://site.com/manga/solo-leveling/"), Some("solo-leveling"));
/// assert_eq!(last_path_segment("https://site.com/single/46862?x=1"), Some("46862"));
/// assert_eq!(last_path_segment(""), None);
/// ```
pub fn last_path_segment(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.split('/').rev().find(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_units() {
        let now = Utc::now();
        assert_eq!(convert_time("2 hours ago", now), now - Duration::hours(2));
        assert_eq!(convert_time("3 days ago", now), now - Duration::days(3));
        assert_eq!(convert_time("an hour ago", now), now);
        assert_eq!(parse_madara_date("an hour ago", now), now - Duration::hours(1));
    }

    #[test]
    fn oversized_counts_fall_back_to_now() {
        let now = Utc::now();
        assert_eq!(convert_time("99999999999999 days ago", now), now);
        assert_eq!(convert_time("999999999999 years ago", now), now);
        assert_eq!(convert_time("9223372036854775807 minutes ago", now), now);
        assert_eq!(parse_madara_date("99999999999 hour ago", now), now);
    }

    #[test]
    fn madara_absolute_formats() {
        let now = Utc::now();
        let expected = Utc.with_ymd_and_hms(2020, 4, 16, 0, 0, 0).unwrap();
        assert_eq!(parse_madara_date("16 Apr 2020", now), expected);
        assert_eq!(parse_madara_date("04/16/2020", now), expected);
    }

    #[test]
    fn entities_without_ampersand_untouched() {
        assert_eq!(decode_html_entities("<b>plain</b>"), "<b>plain</b>");
    }
}
