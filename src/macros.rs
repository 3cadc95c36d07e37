use chrono::{DateTime, Local};

/// Prints a progress line to stdout, prefixed with the local time.
/// Pass a starting time first to also print how long it took from then to now.
/// ```
/// use tapestry_archive::info_time;
///
/// info_time!("observation {}", 4242);
/// let start = chrono::Local::now();
/// info_time!(start, "walked {} observations", 3);
/// ```
#[macro_export]
macro_rules! info_time {
    ($strfm:literal $(, $arg:expr)* $(,)?) => {{
        let local_now = ::chrono::Local::now();
        println!(
            "{} : {}",
            local_now.format($crate::TIME_PREFIX_FORMAT),
            format_args!($strfm $(, $arg)*)
        );
    }};
    ($since:expr, $strfm:literal $(, $arg:expr)* $(,)?) => {{
        let local_now = ::chrono::Local::now();
        println!(
            "{} : {}\nRUNTIME: {:.3} sec",
            local_now.format($crate::TIME_PREFIX_FORMAT),
            format_args!($strfm $(, $arg)*),
            $crate::secs_between($since, local_now)
        );
    }};
}

/// Seconds from `since` to `until`, with microsecond precision. Negative spans count as 0.
#[doc(hidden)]
pub fn secs_between(since: DateTime<Local>, until: DateTime<Local>) -> f64 {
    (until - since)
        .num_microseconds()
        .map(|n| n.max(0) as f64 / 1_000_000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secs_between_measures_the_span() {
        let start = Local::now();
        let end = start + chrono::Duration::milliseconds(1500);
        assert_eq!(secs_between(start, end), 1.5);
        assert_eq!(secs_between(end, start), 0.0);
    }
}
