//! Money, date, and string helpers shared across payout flows.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};

/// Seconds in one civil day.
pub const SECONDS_IN_A_DAY: i64 = 86_400;

const MINOR_UNITS_PER_RUPEE: f64 = 100.0;

/// IST offset (+05:30). Payout cut-offs and settlement windows are defined
/// in Indian local time regardless of where the service runs.
fn ist() -> FixedOffset {
    FixedOffset::east_opt(19_800).expect("IST offset is in range")
}

/// Convert rupees to paisa, rounding to the nearest minor unit.
pub fn rupees_to_paisa(amount: f64) -> i64 {
    (amount * MINOR_UNITS_PER_RUPEE).round() as i64
}

/// Convert paisa back to rupees.
pub fn paisa_to_rupees(amount: i64) -> f64 {
    amount as f64 / MINOR_UNITS_PER_RUPEE
}

/// Unix timestamp of 00:00:00 IST on the given date.
pub fn get_start_of_day_epoch(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(ist())
        .single()
        .expect("fixed offset conversions are unambiguous")
        .timestamp()
}

/// Unix timestamp of 23:59:59 IST on the given date.
pub fn get_end_of_day_epoch(date: NaiveDate) -> i64 {
    get_start_of_day_epoch(date) + (SECONDS_IN_A_DAY - 1)
}

/// Render an epoch as `YYYY-mm-dd HH:MM:SS` in IST. `None` when the epoch
/// falls outside the representable date range.
pub fn get_str_datetime_from_epoch(epoch: i64) -> Option<String> {
    DateTime::from_timestamp(epoch, 0).map(|datetime| {
        datetime
            .with_timezone(&ist())
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    })
}

/// The IST date one day before today.
pub fn yesterday() -> NaiveDate {
    Utc::now()
        .with_timezone(&ist())
        .date_naive()
        .pred_opt()
        .expect("today has a predecessor")
}

/// Replace every character outside `[A-Za-z0-9]` with a hyphen.
pub fn to_hyphenated(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Format a rupee amount with Indian digit grouping, e.g. `₹ 5,00,000.00`.
///
/// The last three digits stand alone and the rest group in pairs.
pub fn format_inr(amount: f64) -> String {
    let paisa = rupees_to_paisa(amount.abs());
    let rupees = (paisa / 100).to_string();
    let fraction = paisa % 100;

    let grouped = if rupees.len() > 3 {
        let (head, tail) = rupees.split_at(rupees.len() - 3);
        let mut pairs: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            pairs.push(&head[end - 2..end]);
            end -= 2;
        }
        pairs.push(&head[..end]);
        pairs.reverse();
        format!("{},{}", pairs.join(","), tail)
    } else {
        rupees
    };

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}₹ {}.{:02}", sign, grouped, fraction)
}
