//! Date labels shown next to tasks.

use chrono::{DateTime, FixedOffset, Local, Offset};

const LIST_DATE_FORMAT: &str = "%d/%m/%y";
const DETAIL_DATE_FORMAT: &str = "%d %B %Y, %H:%M";

/// UTC offset of the device right now.
pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// Short label for list rows, e.g. `03/08/25`.
pub fn list_date_label(created_at_ms: i64, offset: &FixedOffset) -> String {
    format_epoch_ms(created_at_ms, offset, LIST_DATE_FORMAT)
}

/// Long label for the detail screen, e.g. `03 August 2025, 14:05`.
pub fn detail_date_label(created_at_ms: i64, offset: &FixedOffset) -> String {
    format_epoch_ms(created_at_ms, offset, DETAIL_DATE_FORMAT)
}

fn format_epoch_ms(value: i64, offset: &FixedOffset, pattern: &str) -> String {
    DateTime::from_timestamp_millis(value)
        .map(|utc| utc.with_timezone(offset).format(pattern).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{detail_date_label, list_date_label};
    use chrono::FixedOffset;

    #[test]
    fn labels_follow_offset() {
        let utc_plus_3 = FixedOffset::east_opt(3 * 3600).unwrap();
        assert_eq!(detail_date_label(0, &utc_plus_3), "01 January 1970, 03:00");
        assert_eq!(list_date_label(0, &utc_plus_3), "01/01/70");
    }

    #[test]
    fn out_of_range_timestamp_yields_empty_label() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(list_date_label(i64::MAX, &utc), "");
    }
}
