/// Format a playback position as `m:ss`.
/// NaN, infinite and negative positions render as `0:00`.
pub fn format_time(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "0:00".to_string();
    }
    let total = secs.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.7), "0:09");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(-1.0), "0:00");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("kenangan-pantai.jpg", 3), "ken");
        // counts characters, not bytes
        assert_eq!(truncate_string("📷📷📷📷📷", 5), "📷📷📷📷📷");
    }
}
