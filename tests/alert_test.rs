//! Tests for alert payload helpers and the byte/uptime formatters.

use lazarus::alert::{format_bytes, format_uptime, AlertSeverity, RestartAlert};

#[test]
fn format_bytes_zero() {
    assert_eq!(format_bytes(0), "0 B");
}

#[test]
fn format_bytes_below_one_kilobyte_has_no_decimals() {
    assert_eq!(format_bytes(1), "1 B");
    assert_eq!(format_bytes(512), "512 B");
    assert_eq!(format_bytes(1023), "1023 B");
}

#[test]
fn format_bytes_scales_with_two_decimals() {
    assert_eq!(format_bytes(1024), "1.00 KB");
    assert_eq!(format_bytes(1536), "1.50 KB");
    assert_eq!(format_bytes(1_048_576), "1.00 MB");
    assert_eq!(format_bytes(1_073_741_824), "1.00 GB");
}

#[test]
fn format_bytes_caps_at_gigabytes() {
    // Terabyte-scale values still render in GB.
    assert_eq!(format_bytes(2_199_023_255_552), "2048.00 GB");
}

#[test]
fn format_uptime_minutes_and_seconds() {
    assert_eq!(format_uptime(65), "0d 0h 1m 5s");
}

#[test]
fn format_uptime_one_of_each() {
    assert_eq!(format_uptime(90_061), "1d 1h 1m 1s");
}

#[test]
fn format_uptime_zero() {
    assert_eq!(format_uptime(0), "0d 0h 0m 0s");
}

#[test]
fn alert_displays_unknown_memory() {
    let alert = RestartAlert {
        reason: "boom".to_owned(),
        attempt: 1,
        max_restarts: 5,
        memory_bytes: None,
        uptime_secs: 65,
        severity: AlertSeverity::Warning,
    };

    assert_eq!(alert.memory_display(), "unknown");
    assert_eq!(alert.uptime_display(), "0d 0h 1m 5s");
}

#[test]
fn alert_displays_sampled_memory() {
    let alert = RestartAlert {
        reason: "boom".to_owned(),
        attempt: 2,
        max_restarts: 5,
        memory_bytes: Some(1536),
        uptime_secs: 0,
        severity: AlertSeverity::Critical,
    };

    assert_eq!(alert.memory_display(), "1.50 KB");
}
