use chrono::{DateTime, Utc};

/// 将毫秒时间戳格式化为 HH:MM:SS.mmm (UTC)
pub fn format_timestamp(timestamp_ms: i64) -> String {
    match DateTime::from_timestamp_millis(timestamp_ms) {
        Some(time) => time.format("%H:%M:%S%.3f").to_string(),
        None => format!("Invalid timestamp: {}", timestamp_ms),
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Round half away from zero to `decimals` places.
///
/// Values too large to scale are already coarser than the requested precision
/// and come back unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}
