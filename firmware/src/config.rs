#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Build-time configuration for the sensor node.
//!
//! Credentials arrive through environment variables at compile time and
//! default to empty strings so the workspace builds without secrets.

use embassy_time::Duration;

use sensor_core::trigger::Sample;

/// Wi-Fi access point name (`LUX_WIFI_SSID`).
pub const WIFI_SSID: &str = match option_env!("LUX_WIFI_SSID") {
    Some(value) => value,
    None => "",
};

/// Wi-Fi passphrase (`LUX_WIFI_PASS`).
pub const WIFI_PASSPHRASE: &str = match option_env!("LUX_WIFI_PASS") {
    Some(value) => value,
    None => "",
};

/// Push service application token (`LUX_PUSH_TOKEN`).
pub const PUSH_TOKEN: &str = match option_env!("LUX_PUSH_TOKEN") {
    Some(value) => value,
    None => "",
};

/// Push service user key (`LUX_PUSH_USER`).
pub const PUSH_USER: &str = match option_env!("LUX_PUSH_USER") {
    Some(value) => value,
    None => "",
};

/// Interval between light samples.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Depth of the sample smoothing window.
pub const FILTER_DEPTH: usize = 8;

/// Trigger release threshold; smoothed values below it raise the alarm.
pub const LOWER_THRESHOLD: Sample = 3_000;

/// Trigger arm threshold; smoothed values above it clear the alarm.
pub const UPPER_THRESHOLD: Sample = 10_000;
