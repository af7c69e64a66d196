//! Formatting helpers shared by front ends.

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human-readable file size using 1024-based units.
///
/// Zero renders as `"0 MB"`. Values are shown with at most one decimal and
/// a trailing `.0` is dropped.
///
/// # Examples
/// ```
/// use vscan_models::format_file_size;
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(2 * 1024 * 1024 * 1024), "2 GB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 MB".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, UNITS[unit])
    }
}
