use accretion_jet::config::{Config, SourceMode};
use accretion_jet::gradient::Color;
use accretion_jet::params::{MAX_JET_MULT, ParamsError, SimParams};
use accretion_jet::sim::SimError;
use clap::Parser;

#[test]
fn defaults_are_valid() {
    let p = SimParams::default();
    p.validate().expect("defaults should validate");
    assert_eq!(p.disk_particle_count, 20_000);
    assert_eq!(p.jet_particle_count, 2_000);
    assert_eq!(p.jet_mult, 5.0);
    assert_eq!(p.jetting_interval, 1);
    assert!(p.jet_enabled);
    assert!(p.color_stops.len() >= 2);
}

#[test]
fn params_file_overrides_defaults() {
    let text = r#"
        # smaller disk for testing
        disk_start = 100
        disk_range = 300
        disk_particle_count = 4_000
        jet_enabled = off
        jetting_interval = 3
        revolution_falloff = 1.5
        color_stops = #000000, #ff8000 ,ffffff
        seed = 9
    "#;
    let p = SimParams::parse(text).expect("parse should succeed");
    assert_eq!(p.disk_start, 100.0);
    assert_eq!(p.disk_range, 300.0);
    assert_eq!(p.disk_particle_count, 4_000);
    assert!(!p.jet_enabled);
    assert_eq!(p.jetting_interval, 3);
    assert_eq!(p.revolution_falloff, 1.5);
    assert_eq!(p.seed, Some(9));
    assert_eq!(
        p.color_stops,
        vec![
            Color::from_rgb8([0, 0, 0]),
            Color::from_rgb8([255, 128, 0]),
            Color::from_rgb8([255, 255, 255]),
        ]
    );
    assert_eq!(p.strength, SimParams::default().strength);
}

#[test]
fn parse_errors_carry_line_numbers() {
    let err = SimParams::parse("disk_start = 1\nbogus = 2\n").expect_err("unknown key");
    assert!(matches!(err, ParamsError::Parse { line: 2, .. }));

    let err = SimParams::parse("strength = loud").expect_err("bad number");
    assert!(matches!(err, ParamsError::Parse { line: 1, .. }));

    let err = SimParams::parse("\n\njust words").expect_err("missing =");
    assert!(matches!(err, ParamsError::Parse { line: 3, .. }));

    let err = SimParams::parse("color_stops = #12345").expect_err("bad color");
    assert!(err.to_string().contains("bad color"));

    let err = SimParams::parse("strength = NaN").expect_err("nan");
    assert!(matches!(err, ParamsError::Parse { .. }));
}

#[test]
fn parsed_but_invalid_values_fail_validation() {
    let p = SimParams::parse("color_stops = #ffffff").expect("one stop still parses");
    assert_eq!(p.validate(), Err(SimError::TooFewColorStops(1)));

    let p = SimParams::parse("jet_particle_count = 0").expect("zero still parses");
    assert_eq!(p.validate(), Err(SimError::ZeroJetCapacity));

    let p = SimParams::parse("revolution_offset = 0").expect("zero offset parses");
    assert!(matches!(
        p.validate(),
        Err(SimError::InvalidValue {
            field: "revolution_offset",
            ..
        })
    ));

    let p = SimParams::parse("star_inner_radius = 10\nstar_outer_radius = 5").expect("parses");
    assert!(p.validate().is_err());
}

#[test]
fn missing_params_file_is_an_io_error() {
    let path = std::env::temp_dir().join("accretion_jet_definitely_missing.params");
    assert!(matches!(SimParams::load(&path), Err(ParamsError::Io(_))));
}

#[test]
fn params_file_loads_from_disk() {
    let path = std::env::temp_dir().join(format!("accretion_jet_{}.params", std::process::id()));
    std::fs::write(&path, "strength = 12.5\n").expect("write params");
    let p = SimParams::load(&path);
    let _ = std::fs::remove_file(&path);
    assert_eq!(p.expect("load").strength, 12.5);
}

#[test]
fn cli_overrides_apply_on_top_of_defaults() {
    let cfg = Config::try_parse_from([
        "accretion-jet",
        "--source",
        "silent",
        "--seed",
        "5",
        "--disk-particles",
        "1000",
        "--jet-particles",
        "50",
        "--no-jet",
    ])
    .expect("args should parse");
    assert_eq!(cfg.source, SourceMode::Silent);
    cfg.validate().expect("config should validate");

    let p = cfg.sim_params().expect("params");
    assert_eq!(p.seed, Some(5));
    assert_eq!(p.disk_particle_count, 1000);
    assert_eq!(p.jet_particle_count, 50);
    assert!(!p.jet_enabled);
}

#[test]
fn wav_source_requires_a_path() {
    let cfg = Config::try_parse_from(["accretion-jet", "--source", "wav"]).expect("args should parse");
    assert!(cfg.validate().is_err());

    let cfg = Config::try_parse_from(["accretion-jet", "--fps", "0"]).expect("args should parse");
    assert!(cfg.validate().is_err());
}

#[test]
fn jet_multiplier_must_stay_in_range() {
    let p = SimParams::parse("jet_mult = 1e30").expect("finite value parses");
    assert!(matches!(
        p.validate(),
        Err(SimError::InvalidValue {
            field: "jet_mult",
            ..
        })
    ));

    let p = SimParams::parse("jet_mult = -1").expect("parses");
    assert!(p.validate().is_err());

    let p = SimParams {
        jet_mult: MAX_JET_MULT,
        ..SimParams::default()
    };
    p.validate().expect("upper bound is inclusive");
}

#[test]
fn non_finite_durations_are_rejected() {
    for args in [
        ["accretion-jet", "--seconds", "inf"],
        ["accretion-jet", "--seconds", "NaN"],
        ["accretion-jet", "--stats-interval", "inf"],
    ] {
        let cfg = Config::try_parse_from(args).expect("args should parse");
        assert!(cfg.validate().is_err(), "{args:?} should be rejected");
    }
}

#[test]
fn oversized_run_length_is_an_error_not_a_panic() {
    let cfg = Config::try_parse_from([
        "accretion-jet",
        "--source",
        "silent",
        "--disk-particles",
        "100",
        "--jet-particles",
        "10",
        "--seconds",
        "1e30",
    ])
    .expect("args should parse");
    cfg.validate().expect("finite values validate");
    assert!(accretion_jet::app::run(cfg).is_err());
}
