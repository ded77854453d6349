use super::AppConfig;
use clap::Parser;
use std::path::PathBuf;

fn base_config() -> AppConfig {
    AppConfig::parse_from(["beamscope"])
}

#[test]
fn default_config_passes_validation() {
    let cfg = base_config();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.output, PathBuf::from("beamscope.wav"));
    assert_eq!(cfg.seconds, 5);
    assert_eq!(cfg.energy_width, 500);
    assert_eq!(cfg.samples_per_slot, 10);
    assert_eq!(cfg.poll_interval_ms, 50);
    assert!(!cfg.json);
    assert!(!cfg.list_input_devices);
}

#[test]
fn rejects_seconds_out_of_bounds() {
    let cfg = AppConfig::parse_from(["beamscope", "--seconds", "0"]);
    assert!(cfg.validate().is_err());

    let cfg = AppConfig::parse_from(["beamscope", "--seconds", "61"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_seconds_bounds() {
    let cfg = AppConfig::parse_from(["beamscope", "--seconds", "1"]);
    assert!(cfg.validate().is_ok());

    let cfg = AppConfig::parse_from(["beamscope", "--seconds", "60"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_energy_width_out_of_bounds() {
    let cfg = AppConfig::parse_from(["beamscope", "--energy-width", "0"]);
    assert!(cfg.validate().is_err());

    let cfg = AppConfig::parse_from(["beamscope", "--energy-width", "10001"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_energy_width_bounds() {
    let cfg = AppConfig::parse_from(["beamscope", "--energy-width", "1"]);
    assert!(cfg.validate().is_ok());

    let cfg = AppConfig::parse_from(["beamscope", "--energy-width", "10000"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_samples_per_slot_out_of_bounds() {
    let cfg = AppConfig::parse_from(["beamscope", "--samples-per-slot", "0"]);
    assert!(cfg.validate().is_err());

    let cfg = AppConfig::parse_from(["beamscope", "--samples-per-slot", "1001"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_energy_blend_out_of_bounds() {
    let cfg = AppConfig::parse_from(["beamscope", "--energy-blend=-0.1"]);
    assert!(cfg.validate().is_err());

    let cfg = AppConfig::parse_from(["beamscope", "--energy-blend", "1.1"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_energy_blend_bounds() {
    let cfg = AppConfig::parse_from(["beamscope", "--energy-blend", "0.0"]);
    assert!(cfg.validate().is_ok());

    let cfg = AppConfig::parse_from(["beamscope", "--energy-blend", "1.0"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_non_positive_or_non_finite_energy_clamp() {
    let cfg = AppConfig::parse_from(["beamscope", "--energy-clamp", "0.0"]);
    assert!(cfg.validate().is_err());

    let cfg = AppConfig::parse_from(["beamscope", "--energy-clamp=-4.0"]);
    assert!(cfg.validate().is_err());

    let cfg = AppConfig::parse_from(["beamscope", "--energy-clamp", "NaN"]);
    assert!(cfg.validate().is_err());

    let cfg = AppConfig::parse_from(["beamscope", "--energy-clamp", "inf"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_angle_smoothing_out_of_bounds() {
    let cfg = AppConfig::parse_from(["beamscope", "--angle-smoothing=-0.01"]);
    assert!(cfg.validate().is_err());

    let cfg = AppConfig::parse_from(["beamscope", "--angle-smoothing", "1.01"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_confidence_threshold_out_of_bounds() {
    let cfg = AppConfig::parse_from(["beamscope", "--confidence-threshold=-0.5"]);
    assert!(cfg.validate().is_err());

    let cfg = AppConfig::parse_from(["beamscope", "--confidence-threshold", "1.5"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_poll_interval_out_of_bounds() {
    let cfg = AppConfig::parse_from(["beamscope", "--poll-interval-ms", "0"]);
    assert!(cfg.validate().is_err());

    let cfg = AppConfig::parse_from(["beamscope", "--poll-interval-ms", "1001"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_channel_capacity_out_of_bounds() {
    let cfg = AppConfig::parse_from(["beamscope", "--channel-capacity", "7"]);
    assert!(cfg.validate().is_err());

    let cfg = AppConfig::parse_from(["beamscope", "--channel-capacity", "1025"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn flags_parse_into_fields() {
    let cfg = AppConfig::parse_from([
        "beamscope",
        "--output",
        "take1.wav",
        "--seconds",
        "12",
        "--input-device",
        "USB Mic",
        "--json",
        "--energy-width",
        "200",
        "--poll-interval-ms",
        "25",
    ]);
    assert_eq!(cfg.output, PathBuf::from("take1.wav"));
    assert_eq!(cfg.seconds, 12);
    assert_eq!(cfg.input_device.as_deref(), Some("USB Mic"));
    assert!(cfg.json);
    assert_eq!(cfg.energy_width, 200);
    assert_eq!(cfg.poll_interval_ms, 25);
    assert!(cfg.validate().is_ok());
}

#[test]
fn pipeline_config_mirrors_cli_values() {
    let cfg = AppConfig::parse_from([
        "beamscope",
        "--energy-width",
        "250",
        "--samples-per-slot",
        "20",
        "--energy-blend",
        "0.4",
        "--energy-clamp",
        "8.0",
        "--angle-smoothing",
        "0.5",
        "--confidence-threshold",
        "0.6",
        "--poll-interval-ms",
        "100",
        "--channel-capacity",
        "32",
    ]);
    assert!(cfg.validate().is_ok());

    let pipeline = cfg.pipeline_config();
    assert_eq!(pipeline.energy_width, 250);
    assert_eq!(pipeline.samples_per_slot, 20);
    assert_eq!(pipeline.energy_blend, 0.4);
    assert_eq!(pipeline.energy_clamp_max, 8.0);
    assert_eq!(pipeline.angle_smoothing, 0.5);
    assert_eq!(pipeline.confidence_threshold, 0.6);
    assert_eq!(pipeline.poll_interval_ms, 100);
    assert_eq!(pipeline.channel_capacity, 32);
}
