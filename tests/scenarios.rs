//! End-to-end board descriptions, through the public API only.

use stm32f1_boardgen::{
    ClockConfig, Error, PinDescriptor, resolve_board,
    clocks::{ClockCfg, ClockError, HwStep, PllMul, SysclkSrc, WaitState},
    gpio::{OpDef, OutputType, PinError, PinMode, PinOp, Port, Pull},
    vectors::VectorTable,
};

fn led() -> PinDescriptor {
    PinDescriptor::new("LED", Port::C, 13, PinMode::Output(OutputType::PushPull)).inverted()
}

#[test]
fn internal_oscillator_without_pll() {
    let plan = ClockConfig::hsi().resolve().unwrap();

    assert_eq!(plan.system_freq_hz(), 8_000_000);
    assert_eq!(plan.flash_wait_states().value(), 0);
    assert!(plan.steps().is_empty());
    assert!(!plan.steps().contains(&HwStep::EnablePllAndWait));
    assert!(
        !plan
            .steps()
            .iter()
            .any(|step| matches!(step, HwStep::SwitchSystemClockAndWait(_)))
    );
}

#[test]
fn external_oscillator_pll_to_72mhz() {
    let plan = ClockConfig::hse_pll(8_000_000, 72_000_000).resolve().unwrap();

    assert_eq!(plan.pll_input_freq_hz(), Some(8_000_000));
    assert_eq!(plan.pll_multiplier().map(|mul| mul.value()), Some(9));
    assert_eq!(plan.system_freq_hz(), 72_000_000);
    assert_eq!(plan.flash_wait_states().value(), 2);
    assert!(plan.needs_apb1_div2());

    let kinds: Vec<_> = plan
        .steps()
        .iter()
        .map(|step| match step {
            HwStep::EnableExternalOscillatorAndWait => "enable-external",
            HwStep::ConfigurePrescalersAndSource(_) => "configure",
            HwStep::EnablePllAndWait => "enable-pll",
            HwStep::SetFlashLatency(_) => "set-latency",
            HwStep::SwitchSystemClockAndWait(_) => "switch",
            HwStep::DisableInternalOscillator => "disable-internal",
        })
        .collect();
    assert_eq!(
        kinds,
        [
            "enable-external",
            "configure",
            "enable-pll",
            "set-latency",
            "switch",
            "disable-internal"
        ]
    );

    match &plan.steps()[1] {
        HwStep::ConfigurePrescalersAndSource(flags) => assert_eq!(
            flags.to_string(),
            "RCC_CFGR_PLLMULL9 | RCC_CFGR_PLLSRC | RCC_CFGR_PPRE1_DIV2"
        ),
        other => panic!("expected the CFGR write, got {other:?}"),
    }
}

#[test]
fn external_oscillator_direct() {
    let plan = ClockConfig::hse(8_000_000).resolve().unwrap();

    assert_eq!(plan.system_freq_hz(), 8_000_000);
    assert!(!plan.steps().contains(&HwStep::EnablePllAndWait));
    assert!(
        plan.steps()
            .contains(&HwStep::SwitchSystemClockAndWait(SysclkSrc::Hse))
    );
    assert_eq!(plan.flash_wait_states(), WaitState::W0);
}

#[test]
fn internal_oscillator_pll_to_48mhz() {
    let plan = ClockConfig::hsi_pll(48_000_000).resolve().unwrap();

    assert_eq!(plan.pll_input_freq_hz(), Some(4_000_000));
    assert_eq!(plan.pll_multiplier(), Some(PllMul::Mul12));
    assert_eq!(plan.flash_wait_states().value(), 1);
    assert_eq!(plan.apb1(), 24_000_000);
}

#[test]
fn inverted_led_operations() {
    let (_, pins) = resolve_board(ClockConfig::default(), &[led()]).unwrap();
    let ops = pins.operations("LED").unwrap();

    assert_eq!(ops.get(PinOp::SetActive), Some(OpDef::Alias(PinOp::SetLow)));
    assert_eq!(ops.resolve(PinOp::SetActive), Some(OpDef::WriteReset));
    assert_eq!(ops.get(PinOp::IsActive), Some(OpDef::Alias(PinOp::IsLow)));
    assert_eq!(ops.resolve(PinOp::IsActive), Some(OpDef::InputIsLow));
}

#[test]
fn duplicate_name_is_reported() {
    let pins = [
        led(),
        PinDescriptor::new("LED", Port::A, 5, PinMode::Input(Pull::Floating)),
    ];

    assert_eq!(
        resolve_board(ClockConfig::default(), &pins),
        Err(Error::PinError(PinError::DuplicateName {
            names: vec!["LED".to_string()]
        }))
    );
}

#[test]
fn clock_errors_come_first() {
    let pins = [led(), led()];
    let err = resolve_board(ClockConfig::hse(2_000_000), &pins).unwrap_err();

    assert_eq!(
        err,
        Error::ClockError(ClockError::ExternalFrequencyOutOfRange { freq_hz: 2_000_000 })
    );
    assert_eq!(
        err.to_string(),
        "clocks: external oscillator at 2000000 Hz is outside 4000000 - 16000000 Hz"
    );
}

#[test]
fn blue_pill_board() {
    let pins = [
        led(),
        PinDescriptor::from_designator("USART1_TX", "PA9", "af".parse().unwrap())
            .unwrap()
            .speed(50),
        PinDescriptor::from_designator("USART1_RX", "PA10", "in".parse().unwrap()).unwrap(),
        PinDescriptor::from_designator("BOOT1", "PB2", "in-down".parse().unwrap()).unwrap(),
    ];
    let (plan, map) = resolve_board(ClockConfig::default(), &pins).unwrap();

    assert_eq!(plan.sysclk(), 72_000_000);
    assert_eq!(map.len(), 4);
    assert_eq!(
        map.iter().map(|pin| pin.name.as_str()).collect::<Vec<_>>(),
        ["USART1_TX", "USART1_RX", "BOOT1", "LED"]
    );
    assert!(!map.operations("USART1_TX").unwrap().has_writes());
    assert!(map.operations("LED").unwrap().has_writes());
    assert_eq!(map.used_ports().len(), 3);
}

#[test]
fn vector_listing() {
    let table = VectorTable::parse("@0x3c\nSysTick_Handler\nWWDG_IRQHandler\n").unwrap();
    assert_eq!(
        table.handlers().collect::<Vec<_>>(),
        [(0x3c, "SysTick_Handler"), (0x40, "WWDG_IRQHandler")]
    );
}
