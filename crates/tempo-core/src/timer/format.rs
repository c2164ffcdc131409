//! Display formatting for elapsed and remaining time.

/// Format elapsed milliseconds as `MM:SS.CC`.
///
/// Minutes are not wrapped into hours; they simply grow.
pub fn format_elapsed(ms: u64) -> String {
    let min = ms / 60_000;
    let sec = (ms % 60_000) / 1000;
    let centi = (ms % 1000) / 10;
    format!("{:02}:{:02}.{:02}", min, sec, centi)
}

/// Format a lap split as `+MM:SS.CC`.
pub fn format_split(ms: u64) -> String {
    format!("+{}", format_elapsed(ms))
}

/// Format remaining milliseconds for the countdown.
///
/// Rounds UP to whole seconds so that `00:00` only appears once time has
/// actually run out. The largest nonzero unit picks the layout:
/// `Dd HH:MM:SS`, `H:MM:SS` or `MM:SS`.
pub fn format_remaining(ms: u64) -> String {
    let total_sec = ms.div_ceil(1000);
    let d = total_sec / 86_400;
    let h = (total_sec % 86_400) / 3_600;
    let m = (total_sec % 3_600) / 60;
    let s = total_sec % 60;

    if d > 0 {
        format!("{}d {:02}:{:02}:{:02}", d, h, m, s)
    } else if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}
