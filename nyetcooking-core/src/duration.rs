use std::sync::LazyLock;

use regex::Regex;

static ISO_DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").expect("Invalid ISO duration regex")
});

/// Turn an ISO-8601 time duration ("PT1H30M") into "1 hour 30 minutes".
///
/// Seconds are only shown when there are no hours. Anything that isn't a
/// `PT...` duration (including already-readable text) is returned unchanged.
pub fn format_duration(duration: &str) -> String {
    let Some(cap) = ISO_DURATION_REGEX.captures(duration.trim()) else {
        return duration.to_string();
    };

    let part = |i: usize| -> u64 {
        cap.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let (hours, minutes, seconds) = (part(1), part(2), part(3));

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(plural(minutes, "minute"));
    }
    if seconds > 0 && hours == 0 {
        parts.push(plural(seconds, "second"));
    }

    if parts.is_empty() {
        duration.to_string()
    } else {
        parts.join(" ")
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}
