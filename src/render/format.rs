const MB: f64 = 1024.0 * 1024.0;

/// Human-readable byte count in binary multiples: MB, then GB, then TB.
///
/// Zero renders as an empty string, which the chart treats as "no data".
pub fn format_bytes(bytes: i64) -> String {
    if bytes == 0 {
        return String::new();
    }

    let mb = bytes as f64 / MB;
    if mb > 1024.0 {
        let gb = mb / 1024.0;
        if gb > 1024.0 {
            return format!("{:.2} TB", gb / 1024.0);
        }
        return format!("{:.2} GB", gb);
    }
    format!("{:.2} MB", mb)
}
