// Thu Oct 15 2026 - Alex

pub mod logging;
pub mod testing;

use std::time::Duration;

pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();

    if total_secs < 0.001 {
        format!("{}µs", duration.as_micros())
    } else if total_secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{:.2}s", total_secs)
    }
}
