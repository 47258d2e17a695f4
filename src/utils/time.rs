//! Time formatting utilities

/// Seconds as passed to ffmpeg's `-ss`/`-t` options (millisecond precision)
pub fn ffmpeg_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

/// Format seconds to HH:MM:SS.ms (or MM:SS.ms under an hour)
pub fn format_hms(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let milliseconds = total_ms % 1000;

    if hours > 0 {
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            hours, minutes, secs, milliseconds
        )
    } else {
        format!("{:02}:{:02}.{:03}", minutes, secs, milliseconds)
    }
}
