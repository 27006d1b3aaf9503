//! Human readable byte sizes (1024-based) for the download page.

const UNITS: [&str; 6] = ["bytes", "KB", "MB", "GB", "TB", "PB"];

/// Format `bytes` with `precision` decimals, e.g. `human_size(1536, 1) == "1.5KB"`.
///
/// Values below one byte are rendered in bytes, negative values as `-`.
pub fn human_size(bytes: i64, precision: usize) -> String {
    if bytes < 0 {
        return "-".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.*}{}", precision, value, UNITS[unit])
}
