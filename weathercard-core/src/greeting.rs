use chrono::NaiveDate;

/// The morning weather-report opener, e.g.
/// `Good morning. It's August 13, 2021, and it's a Friday!`
pub fn greeting(date: NaiveDate) -> String {
    format!(
        "Good morning. It's {}, and it's a {}!",
        date.format("%B %-d, %Y"),
        date.format("%A")
    )
}
