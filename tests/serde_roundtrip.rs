//! Board descriptions as data, eg loaded by a build script.
#![cfg(feature = "serde")]

use stm32f1_boardgen::{
    ClockConfig, PinDescriptor, emit,
    clocks::ClockSourceKind,
    gpio::{InitialState, OutputType, PinMode, Port},
};

#[test]
fn pin_descriptor_defaults() {
    let json = r#"{ "name": "LED", "port": "C", "pin_no": 13, "mode": { "Output": "PushPull" }, "invert": true }"#;
    let desc: PinDescriptor = serde_json::from_str(json).unwrap();

    assert_eq!(
        desc,
        PinDescriptor::new("LED", Port::C, 13, PinMode::Output(OutputType::PushPull)).inverted()
    );
    assert!(desc.init);
    assert_eq!(desc.initial, None);
}

#[test]
fn clock_config_from_json() {
    let json = r#"{ "source": "ExternalOscillatorWithPLL", "external_freq_hz": 8000000, "target_freq_hz": 72000000 }"#;
    let config: ClockConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.source, ClockSourceKind::ExternalOscillatorWithPLL);
    assert_eq!(config, ClockConfig::default());
}

#[test]
fn plan_and_pin_map_serialize() {
    let plan = ClockConfig::default().resolve().unwrap();
    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(value["system_freq_hz"], 72_000_000);
    assert_eq!(value["steps"].as_array().map(|steps| steps.len()), Some(6));

    let map = emit(&[PinDescriptor::new("EN", Port::A, 1, PinMode::Output(OutputType::OpenDrain))
        .initial(InitialState::Inactive)])
    .unwrap();
    let value = serde_json::to_value(&map).unwrap();
    assert_eq!(value["pins"][0]["name"], "EN");
    assert_eq!(value["pins"][0]["operations"]["ops"]["SetActive"]["Alias"], "SetHigh");
}
