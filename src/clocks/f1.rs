//! Clock resolution for the F103. See RM0008, section 7.2 for the clock tree, and
//! section 3.3.3 for flash latency.

use core::{fmt, str::FromStr};

use paste::paste;

use crate::clocks::ClockCfg;

/// Frequency of the internal RC oscillator (HSI), in Hz.
pub const HSI_FREQ: u32 = 8_000_000;
/// Lowest external oscillator (HSE) frequency the F103 supports, in Hz.
pub const HSE_MIN_FREQ: u32 = 4_000_000;
/// Highest external oscillator (HSE) frequency the F103 supports, in Hz.
pub const HSE_MAX_FREQ: u32 = 16_000_000;
/// Maximum SYSCLK, in Hz.
pub const SYSCLK_MAX: u32 = 72_000_000;
/// Maximum APB1 clock, in Hz. Above this, APB1 must be divided by 2.
pub const APB1_MAX: u32 = 36_000_000;

/// Highest SYSCLK that runs with zero flash wait states.
const WAIT_STATE_0_MAX: u32 = 24_000_000;
/// Highest SYSCLK that runs with one flash wait state.
const WAIT_STATE_1_MAX: u32 = 48_000_000;

/// Upper bound on the number of steps in a bring-up sequence.
pub const MAX_STEPS: usize = 6;

/// The ordered bring-up sequence of a [`ClockPlan`].
pub type Steps = heapless::Vec<HwStep, MAX_STEPS>;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors that can occur while resolving a clock configuration.
pub enum ClockError {
    /// An HSE-based source was requested without an oscillator frequency.
    MissingExternalFrequency,
    /// An HSI-based source was given an external oscillator frequency.
    UnexpectedExternalFrequency,
    /// The external oscillator frequency is outside 4 - 16 Mhz.
    ExternalFrequencyOutOfRange { freq_hz: u32 },
    /// The target needs a PLL multiplier outside of 2 - 16.
    NoFeasibleMultiplier { pll_input_hz: u32, target_hz: u32 },
    /// The resulting system clock exceeds 72 Mhz.
    FrequencyOutOfRange { sysclk_hz: u32 },
    /// A clock source keyword that isn't one of `hsi`, `hsi-pll`, `hse`, `hse-pll`.
    UnknownSource,
}

impl_display!(ClockError, self, f, {
    Self::MissingExternalFrequency => ("external oscillator requested without a frequency"),
    Self::UnexpectedExternalFrequency => ("external frequency given for an internal oscillator source"),
    Self::ExternalFrequencyOutOfRange { freq_hz } => (
        "external oscillator at {} Hz is outside {} - {} Hz",
        freq_hz,
        HSE_MIN_FREQ,
        HSE_MAX_FREQ
    ),
    Self::NoFeasibleMultiplier { pll_input_hz, target_hz } => (
        "no PLL multiplier in 2 - 16 takes {} Hz to {} Hz",
        pll_input_hz,
        target_hz
    ),
    Self::FrequencyOutOfRange { sysclk_hz } => (
        "system clock of {} Hz exceeds the {} Hz maximum",
        sysclk_hz,
        SYSCLK_MAX
    ),
    Self::UnknownSource => ("unknown clock source; expected hsi, hsi-pll, hse or hse-pll"),
});

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Which oscillator drives SYSCLK, and whether it goes through the PLL.
pub enum ClockSourceKind {
    /// HSI, 8Mhz.
    InternalOscillator,
    /// HSI / 2, into the PLL.
    InternalOscillatorWithPLL,
    /// HSE, directly.
    ExternalOscillator,
    /// HSE, into the PLL.
    ExternalOscillatorWithPLL,
}

impl ClockSourceKind {
    pub fn uses_pll(&self) -> bool {
        matches!(
            self,
            Self::InternalOscillatorWithPLL | Self::ExternalOscillatorWithPLL
        )
    }

    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::ExternalOscillator | Self::ExternalOscillatorWithPLL
        )
    }

    /// The keyword used for this source in board descriptions.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::InternalOscillator => "hsi",
            Self::InternalOscillatorWithPLL => "hsi-pll",
            Self::ExternalOscillator => "hse",
            Self::ExternalOscillatorWithPLL => "hse-pll",
        }
    }
}

impl FromStr for ClockSourceKind {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hsi" => Ok(Self::InternalOscillator),
            "hsi-pll" => Ok(Self::InternalOscillatorWithPLL),
            "hse" => Ok(Self::ExternalOscillator),
            "hse-pll" => Ok(Self::ExternalOscillatorWithPLL),
            _ => Err(ClockError::UnknownSource),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// The clocks source input used by the PLL.
pub enum PllSrc {
    /// HSI, after its fixed /2 divider.
    HsiDiv2,
    Hse,
}

macro_rules! make_pll_mul {
    ($($n:literal),+) => {
        paste! {
            #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
            #[cfg_attr(feature = "defmt", derive(defmt::Format))]
            #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
            /// PLL multiplication factor, `RCC_CFGR` bits `PLLMUL`.
            pub enum PllMul {
                $(
                    [<Mul $n>],
                )+
            }

            impl PllMul {
                /// All multipliers, in ascending order.
                pub const ALL: [Self; 15] = [$(Self::[<Mul $n>]),+];

                pub fn value(&self) -> u8 {
                    match self {
                        $(
                            Self::[<Mul $n>] => $n,
                        )+
                    }
                }

                /// The multiplier for an integer factor, if the PLL supports it.
                pub fn from_value(value: u8) -> Option<Self> {
                    match value {
                        $(
                            $n => Some(Self::[<Mul $n>]),
                        )+
                        _ => None,
                    }
                }

                /// CMSIS name of the `RCC_CFGR` flag selecting this multiplier.
                pub fn flag_name(&self) -> &'static str {
                    match self {
                        $(
                            Self::[<Mul $n>] => concat!("RCC_CFGR_PLLMULL", $n),
                        )+
                    }
                }
            }
        }
    };
}

make_pll_mul!(2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16);

impl PllMul {
    /// Value of the 4-bit `PLLMUL` field.
    pub fn bits(&self) -> u8 {
        self.value() - 2
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// One flag in the single `RCC_CFGR` write that configures the PLL and prescalers.
pub enum CfgrFlag {
    /// PLL is fed from HSE instead of HSI / 2.
    PllSrcHse,
    /// APB1 = HCLK / 2.
    Ppre1Div2,
    PllMul(PllMul),
}

impl CfgrFlag {
    /// CMSIS name of the flag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PllSrcHse => "RCC_CFGR_PLLSRC",
            Self::Ppre1Div2 => "RCC_CFGR_PPRE1_DIV2",
            Self::PllMul(mul) => mul.flag_name(),
        }
    }

    /// Register bits this flag sets.
    pub fn bits(&self) -> u32 {
        match self {
            Self::PllSrcHse => 1 << 16,
            Self::Ppre1Div2 => 0b100 << 8,
            Self::PllMul(mul) => (mul.bits() as u32) << 18,
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// The set of flags written to `RCC_CFGR` in one assignment. Kept sorted by flag name,
/// so the rendered expression doesn't depend on the order flags were chosen in.
pub struct CfgrFlags(heapless::Vec<CfgrFlag, 3>);

impl CfgrFlags {
    pub fn new(pll_src: Option<PllSrc>, apb1_div2: bool, pll_mul: Option<PllMul>) -> Self {
        let mut flags: heapless::Vec<CfgrFlag, 3> = [
            matches!(pll_src, Some(PllSrc::Hse)).then_some(CfgrFlag::PllSrcHse),
            apb1_div2.then_some(CfgrFlag::Ppre1Div2),
            pll_mul.map(CfgrFlag::PllMul),
        ]
        .into_iter()
        .flatten()
        .collect();

        flags.sort_unstable_by_key(|flag| flag.name());
        Self(flags)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CfgrFlag> {
        self.0.iter()
    }

    pub fn contains(&self, flag: CfgrFlag) -> bool {
        self.0.contains(&flag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The combined register value.
    pub fn bits(&self) -> u32 {
        self.0.iter().fold(0, |acc, flag| acc | flag.bits())
    }
}

/// Renders as a C expression, eg `RCC_CFGR_PLLMULL9 | RCC_CFGR_PLLSRC`. An empty set
/// renders as `0`, the register's reset value.
impl fmt::Display for CfgrFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("0");
        }
        for (i, flag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            f.write_str(flag.name())?;
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CfgrFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=[?]}", self.0.as_slice())
    }
}

// F1 uses 0 - 2 only.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
/// Represents Flash wait states in the FLASH_ACR register.
pub enum WaitState {
    W0 = 0,
    W1 = 1,
    W2 = 2,
}

impl WaitState {
    /// Wait states needed to read flash at a given SYSCLK.
    pub fn for_sysclk(sysclk: u32) -> Self {
        if sysclk <= WAIT_STATE_0_MAX {
            Self::W0
        } else if sysclk <= WAIT_STATE_1_MAX {
            Self::W1
        } else {
            Self::W2
        }
    }

    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// StdPeriph constant passed to `FLASH_SetLatency`.
    pub fn stdperiph(&self) -> &'static str {
        match self {
            Self::W0 => "FLASH_Latency_0",
            Self::W1 => "FLASH_Latency_1",
            Self::W2 => "FLASH_Latency_2",
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// A source SYSCLK can be switched to. HSI isn't listed, since it's selected out of reset.
pub enum SysclkSrc {
    Hse,
    Pll,
}

impl SysclkSrc {
    /// Value of the `SW` field. `SWS` reports the same value once the switch completes.
    pub fn bits(&self) -> u8 {
        match self {
            Self::Hse => 0b01,
            Self::Pll => 0b10,
        }
    }

    /// CMSIS name of the `SW` value selecting this source.
    pub fn switch_flag(&self) -> &'static str {
        match self {
            Self::Hse => "RCC_CFGR_SW_HSE",
            Self::Pll => "RCC_CFGR_SW_PLL",
        }
    }

    /// CMSIS name of the `SWS` value reporting this source as active.
    pub fn status_flag(&self) -> &'static str {
        match self {
            Self::Hse => "RCC_CFGR_SWS_HSE",
            Self::Pll => "RCC_CFGR_SWS_PLL",
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// One action in the clock bring-up sequence. Each maps to one register statement,
/// or one statement plus its ready-wait loop.
pub enum HwStep {
    /// Set `HSEON`, and wait for `HSERDY`.
    EnableExternalOscillatorAndWait,
    /// Assign `RCC_CFGR` in one write.
    ConfigurePrescalersAndSource(CfgrFlags),
    /// Set `PLLON`, and wait for `PLLRDY`.
    EnablePllAndWait,
    SetFlashLatency(WaitState),
    /// Write `SW`, and wait until `SWS` matches.
    SwitchSystemClockAndWait(SysclkSrc),
    /// Clear `HSION`.
    DisableInternalOscillator,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Settings used to describe the clocks. Create this struct with one of the constructors,
/// or its `Default::default()` implementation, then turn it into a plan with `resolve()`.
pub struct ClockConfig {
    /// The oscillator path for SYSCLK.
    pub source: ClockSourceKind,
    /// HSE crystal or oscillator frequency, in Hz. Required for HSE-based sources, and
    /// rejected for HSI-based ones.
    pub external_freq_hz: Option<u32>,
    /// Desired SYSCLK, in Hz. Only used when the PLL is; otherwise SYSCLK is the
    /// oscillator frequency.
    pub target_freq_hz: u32,
}

impl ClockConfig {
    /// Run from HSI directly.
    pub fn hsi() -> Self {
        Self {
            source: ClockSourceKind::InternalOscillator,
            external_freq_hz: None,
            target_freq_hz: HSI_FREQ,
        }
    }

    /// Run from HSI / 2 through the PLL.
    pub fn hsi_pll(target_freq_hz: u32) -> Self {
        Self {
            source: ClockSourceKind::InternalOscillatorWithPLL,
            external_freq_hz: None,
            target_freq_hz,
        }
    }

    /// Run from HSE directly.
    pub fn hse(external_freq_hz: u32) -> Self {
        Self {
            source: ClockSourceKind::ExternalOscillator,
            external_freq_hz: Some(external_freq_hz),
            target_freq_hz: external_freq_hz,
        }
    }

    /// Run from HSE through the PLL.
    pub fn hse_pll(external_freq_hz: u32, target_freq_hz: u32) -> Self {
        Self {
            source: ClockSourceKind::ExternalOscillatorWithPLL,
            external_freq_hz: Some(external_freq_hz),
            target_freq_hz,
        }
    }

    /// See [`resolve`].
    pub fn resolve(&self) -> Result<ClockPlan, ClockError> {
        resolve(*self)
    }
}

impl Default for ClockConfig {
    /// This default configures an 8Mhz HSE through the PLL, for a 72Mhz sysclk, and
    /// a 36Mhz APB1.
    fn default() -> Self {
        Self::hse_pll(8_000_000, SYSCLK_MAX)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// A resolved clock configuration: derived frequencies, and the ordered register actions
/// that bring the clocks up. Produced only by [`resolve`], so it's always valid.
pub struct ClockPlan {
    source: ClockSourceKind,
    base_freq_hz: u32,
    pll_input_freq_hz: Option<u32>,
    pll_multiplier: Option<PllMul>,
    system_freq_hz: u32,
    needs_apb1_div2: bool,
    flash_wait_states: WaitState,
    steps: Steps,
}

impl ClockPlan {
    pub fn source(&self) -> ClockSourceKind {
        self.source
    }

    /// Oscillator frequency: HSI, or HSE, in Hz.
    pub fn base_freq_hz(&self) -> u32 {
        self.base_freq_hz
    }

    /// Oscillator feeding the PLL, if the PLL is used.
    pub fn pll_source(&self) -> Option<PllSrc> {
        match self.source {
            ClockSourceKind::InternalOscillatorWithPLL => Some(PllSrc::HsiDiv2),
            ClockSourceKind::ExternalOscillatorWithPLL => Some(PllSrc::Hse),
            _ => None,
        }
    }

    /// PLL input frequency in Hz, if the PLL is used.
    pub fn pll_input_freq_hz(&self) -> Option<u32> {
        self.pll_input_freq_hz
    }

    pub fn pll_multiplier(&self) -> Option<PllMul> {
        self.pll_multiplier
    }

    pub fn system_freq_hz(&self) -> u32 {
        self.system_freq_hz
    }

    /// Whether APB1 must run at HCLK / 2 to stay within 36Mhz.
    pub fn needs_apb1_div2(&self) -> bool {
        self.needs_apb1_div2
    }

    pub fn flash_wait_states(&self) -> WaitState {
        self.flash_wait_states
    }

    /// Bring-up actions, in the order they must execute.
    pub fn steps(&self) -> &[HwStep] {
        &self.steps
    }
}

impl ClockCfg for ClockPlan {
    fn sysclk(&self) -> u32 {
        self.system_freq_hz
    }

    // The AHB prescaler is left at its /1 reset value.
    fn hclk(&self) -> u32 {
        self.sysclk()
    }

    fn systick(&self) -> u32 {
        self.hclk()
    }

    fn apb1(&self) -> u32 {
        if self.needs_apb1_div2 {
            self.hclk() / 2
        } else {
            self.hclk()
        }
    }

    fn apb1_timer(&self) -> u32 {
        if self.needs_apb1_div2 {
            self.apb1() * 2
        } else {
            self.apb1()
        }
    }

    fn apb2(&self) -> u32 {
        self.hclk()
    }

    fn apb2_timer(&self) -> u32 {
        self.apb2()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ClockPlan {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "ClockPlan: {} at {} Hz, PLL {}, APB1 div2 {}, {}, steps {=[?]}",
            self.source,
            self.system_freq_hz,
            self.pll_multiplier,
            self.needs_apb1_div2,
            self.flash_wait_states,
            self.steps.as_slice(),
        )
    }
}

/// Check the external oscillator frequency against the source, and return the oscillator
/// frequency SYSCLK or the PLL is derived from.
fn base_freq(config: &ClockConfig) -> Result<u32, ClockError> {
    match (config.source.is_external(), config.external_freq_hz) {
        (true, None) => Err(ClockError::MissingExternalFrequency),
        (false, Some(_)) => Err(ClockError::UnexpectedExternalFrequency),
        (false, None) => Ok(HSI_FREQ),
        (true, Some(freq)) => {
            if !(HSE_MIN_FREQ..=HSE_MAX_FREQ).contains(&freq) {
                return Err(ClockError::ExternalFrequencyOutOfRange { freq_hz: freq });
            }
            Ok(freq)
        }
    }
}

/// Find the multiplier taking `pll_input` closest to `target`. Candidates are tried in
/// ascending order and an equal error replaces the best so far, so ties go to the larger
/// multiplier.
fn select_pll_mul(pll_input: u32, target: u32) -> Result<PllMul, ClockError> {
    let infeasible = ClockError::NoFeasibleMultiplier {
        pll_input_hz: pll_input,
        target_hz: target,
    };

    let input = u64::from(pll_input);
    let target_ = u64::from(target);
    if target_ < input * 2 || target_ > input * 16 {
        return Err(infeasible);
    }

    let mut best: Option<(PllMul, u64)> = None;
    for mul in PllMul::ALL {
        let error = (input * u64::from(mul.value())).abs_diff(target_);
        trace!("PLL x{}: {} Hz off target", mul.value(), error);

        if best.is_none_or(|(_, best_error)| error <= best_error) {
            best = Some((mul, error));
        }
    }

    best.map(|(mul, _)| mul).ok_or(infeasible)
}

/// Resolve a clock configuration into a plan. Fails on the first violation found; there's
/// no partially valid plan. A plain HSI configuration resolves to an empty step list,
/// since the reset state already runs from HSI.
pub fn resolve(config: ClockConfig) -> Result<ClockPlan, ClockError> {
    debug!(
        "Resolving clocks: source {}, target {} Hz",
        config.source.keyword(),
        config.target_freq_hz
    );

    let result = resolve_inner(&config);

    match &result {
        Ok(plan) => {
            if plan.system_freq_hz != config.target_freq_hz {
                warn!(
                    "SYSCLK resolved to {} Hz; {} Hz was requested",
                    plan.system_freq_hz,
                    config.target_freq_hz
                );
            }
        }
        Err(e) => warn!("Clock configuration rejected: {}", e),
    }

    result
}

fn resolve_inner(config: &ClockConfig) -> Result<ClockPlan, ClockError> {
    let base_freq_hz = base_freq(config)?;

    let pll_src = match config.source {
        ClockSourceKind::InternalOscillatorWithPLL => Some(PllSrc::HsiDiv2),
        ClockSourceKind::ExternalOscillatorWithPLL => Some(PllSrc::Hse),
        _ => None,
    };

    let (pll_input_freq_hz, pll_multiplier, system_freq_hz) = match pll_src {
        Some(src) => {
            let input = match src {
                PllSrc::HsiDiv2 => base_freq_hz / 2,
                PllSrc::Hse => base_freq_hz,
            };
            let mul = select_pll_mul(input, config.target_freq_hz)?;
            debug!("PLL: {} Hz x{}", input, mul.value());

            (Some(input), Some(mul), input * mul.value() as u32)
        }
        None => (None, None, base_freq_hz),
    };

    if system_freq_hz > SYSCLK_MAX {
        return Err(ClockError::FrequencyOutOfRange {
            sysclk_hz: system_freq_hz,
        });
    }

    let needs_apb1_div2 = system_freq_hz > APB1_MAX;
    let flash_wait_states = WaitState::for_sysclk(system_freq_hz);

    let switch = match config.source {
        ClockSourceKind::InternalOscillator => None,
        ClockSourceKind::ExternalOscillator => Some(SysclkSrc::Hse),
        ClockSourceKind::InternalOscillatorWithPLL
        | ClockSourceKind::ExternalOscillatorWithPLL => Some(SysclkSrc::Pll),
    };
    let external = config.source.is_external();
    // HSI alone runs from reset values; there's nothing to write.
    let configure = config.source != ClockSourceKind::InternalOscillator;

    // HSI can only be turned off once SYSCLK has switched away from it.
    let steps: Steps = [
        external.then_some(HwStep::EnableExternalOscillatorAndWait),
        configure.then(|| {
            HwStep::ConfigurePrescalersAndSource(CfgrFlags::new(
                pll_src,
                needs_apb1_div2,
                pll_multiplier,
            ))
        }),
        pll_src.map(|_| HwStep::EnablePllAndWait),
        (flash_wait_states != WaitState::W0).then_some(HwStep::SetFlashLatency(flash_wait_states)),
        switch.map(HwStep::SwitchSystemClockAndWait),
        external.then_some(HwStep::DisableInternalOscillator),
    ]
    .into_iter()
    .flatten()
    .collect();

    Ok(ClockPlan {
        source: config.source,
        base_freq_hz,
        pll_input_freq_hz,
        pll_multiplier,
        system_freq_hz,
        needs_apb1_div2,
        flash_wait_states,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsi_without_pll_has_no_steps() {
        let plan = ClockConfig::hsi().resolve().unwrap();

        assert_eq!(plan.system_freq_hz(), 8_000_000);
        assert_eq!(plan.flash_wait_states(), WaitState::W0);
        assert_eq!(plan.pll_multiplier(), None);
        assert_eq!(plan.pll_input_freq_hz(), None);
        assert!(!plan.needs_apb1_div2());
        // Reset state already runs from HSI; not even a CFGR write.
        assert!(plan.steps().is_empty());
    }

    #[test]
    fn hse_pll_72mhz() {
        let plan = ClockConfig::hse_pll(8_000_000, 72_000_000).resolve().unwrap();

        assert_eq!(plan.pll_input_freq_hz(), Some(8_000_000));
        assert_eq!(plan.pll_multiplier(), Some(PllMul::Mul9));
        assert_eq!(plan.system_freq_hz(), 72_000_000);
        assert_eq!(plan.flash_wait_states(), WaitState::W2);
        assert!(plan.needs_apb1_div2());
        assert_eq!(plan.pll_source(), Some(PllSrc::Hse));

        let flags = CfgrFlags::new(Some(PllSrc::Hse), true, Some(PllMul::Mul9));
        assert_eq!(
            plan.steps(),
            &[
                HwStep::EnableExternalOscillatorAndWait,
                HwStep::ConfigurePrescalersAndSource(flags),
                HwStep::EnablePllAndWait,
                HwStep::SetFlashLatency(WaitState::W2),
                HwStep::SwitchSystemClockAndWait(SysclkSrc::Pll),
                HwStep::DisableInternalOscillator,
            ]
        );
    }

    #[test]
    fn hse_direct_switches_to_hse() {
        let plan = ClockConfig::hse(8_000_000).resolve().unwrap();

        assert_eq!(plan.system_freq_hz(), 8_000_000);
        assert_eq!(plan.flash_wait_states(), WaitState::W0);
        assert_eq!(plan.pll_multiplier(), None);
        assert_eq!(
            plan.steps(),
            &[
                HwStep::EnableExternalOscillatorAndWait,
                HwStep::ConfigurePrescalersAndSource(CfgrFlags::default()),
                HwStep::SwitchSystemClockAndWait(SysclkSrc::Hse),
                HwStep::DisableInternalOscillator,
            ]
        );
    }

    #[test]
    fn hsi_pll_halves_input() {
        let plan = ClockConfig::hsi_pll(48_000_000).resolve().unwrap();

        assert_eq!(plan.pll_input_freq_hz(), Some(4_000_000));
        assert_eq!(plan.pll_multiplier(), Some(PllMul::Mul12));
        assert_eq!(plan.system_freq_hz(), 48_000_000);
        assert_eq!(plan.flash_wait_states(), WaitState::W1);
        assert!(plan.needs_apb1_div2());
        assert_eq!(plan.pll_source(), Some(PllSrc::HsiDiv2));

        // HSI stays on; it feeds the PLL.
        assert!(!plan.steps().contains(&HwStep::DisableInternalOscillator));
        assert!(!plan.steps().contains(&HwStep::EnableExternalOscillatorAndWait));
    }

    #[test]
    fn nearest_multiplier_is_chosen() {
        // 4Mhz x 8 = 32Mhz is 1Mhz off; x9 is 3Mhz off.
        let plan = ClockConfig::hsi_pll(33_000_000).resolve().unwrap();
        assert_eq!(plan.pll_multiplier(), Some(PllMul::Mul8));
        assert_eq!(plan.system_freq_hz(), 32_000_000);
    }

    #[test]
    fn ties_prefer_larger_multiplier() {
        // 4Mhz x 8 and x9 are both 2Mhz from 34Mhz.
        let plan = ClockConfig::hsi_pll(34_000_000).resolve().unwrap();
        assert_eq!(plan.pll_multiplier(), Some(PllMul::Mul9));
        assert_eq!(plan.system_freq_hz(), 36_000_000);
    }

    #[test]
    fn multiplier_out_of_range() {
        assert_eq!(
            ClockConfig::hsi_pll(4_000_000).resolve(),
            Err(ClockError::NoFeasibleMultiplier {
                pll_input_hz: 4_000_000,
                target_hz: 4_000_000
            })
        );
        assert_eq!(
            ClockConfig::hse_pll(8_000_000, 200_000_000).resolve(),
            Err(ClockError::NoFeasibleMultiplier {
                pll_input_hz: 8_000_000,
                target_hz: 200_000_000
            })
        );
    }

    #[test]
    fn sysclk_above_72mhz() {
        // 8Mhz x 16 = 128Mhz: a legal multiplier, but too fast.
        assert_eq!(
            ClockConfig::hse_pll(8_000_000, 128_000_000).resolve(),
            Err(ClockError::FrequencyOutOfRange {
                sysclk_hz: 128_000_000
            })
        );
    }

    #[test]
    fn external_frequency_must_match_source() {
        let missing = ClockConfig {
            source: ClockSourceKind::ExternalOscillatorWithPLL,
            external_freq_hz: None,
            target_freq_hz: 72_000_000,
        };
        assert_eq!(missing.resolve(), Err(ClockError::MissingExternalFrequency));

        let unexpected = ClockConfig {
            source: ClockSourceKind::InternalOscillator,
            external_freq_hz: Some(8_000_000),
            target_freq_hz: 8_000_000,
        };
        assert_eq!(
            unexpected.resolve(),
            Err(ClockError::UnexpectedExternalFrequency)
        );

        assert_eq!(
            ClockConfig::hse(25_000_000).resolve(),
            Err(ClockError::ExternalFrequencyOutOfRange {
                freq_hz: 25_000_000
            })
        );
    }

    #[test]
    fn wait_state_boundaries() {
        assert_eq!(WaitState::for_sysclk(24_000_000), WaitState::W0);
        assert_eq!(WaitState::for_sysclk(24_000_001), WaitState::W1);
        assert_eq!(WaitState::for_sysclk(48_000_000), WaitState::W1);
        assert_eq!(WaitState::for_sysclk(48_000_001), WaitState::W2);
    }

    #[test]
    fn cfgr_flags_render_sorted() {
        let flags = CfgrFlags::new(Some(PllSrc::Hse), true, Some(PllMul::Mul9));
        assert_eq!(
            format!("{flags}"),
            "RCC_CFGR_PLLMULL9 | RCC_CFGR_PLLSRC | RCC_CFGR_PPRE1_DIV2"
        );
        assert_eq!(flags.bits(), 0x001D_0400);

        assert_eq!(format!("{}", CfgrFlags::default()), "0");
        assert!(CfgrFlags::new(Some(PllSrc::HsiDiv2), false, None).is_empty());
    }

    #[test]
    fn pll_mul_table() {
        assert_eq!(PllMul::ALL.len(), 15);
        assert_eq!(PllMul::from_value(16), Some(PllMul::Mul16));
        assert_eq!(PllMul::from_value(1), None);
        assert_eq!(PllMul::Mul16.flag_name(), "RCC_CFGR_PLLMULL16");
        assert_eq!(PllMul::Mul2.bits(), 0);
        assert_eq!(PllMul::Mul16.bits(), 0b1110);
    }

    #[test]
    fn bus_speeds() {
        let plan = ClockConfig::default().resolve().unwrap();
        assert_eq!(plan.sysclk(), 72_000_000);
        assert_eq!(plan.apb1(), 36_000_000);
        assert_eq!(plan.apb1_timer(), 72_000_000);
        assert_eq!(plan.apb2(), 72_000_000);

        let slow = ClockConfig::hse(8_000_000).resolve().unwrap();
        assert_eq!(slow.apb1(), 8_000_000);
        assert_eq!(slow.apb1_timer(), 8_000_000);
    }

    #[test]
    fn source_keywords() {
        for kind in [
            ClockSourceKind::InternalOscillator,
            ClockSourceKind::InternalOscillatorWithPLL,
            ClockSourceKind::ExternalOscillator,
            ClockSourceKind::ExternalOscillatorWithPLL,
        ] {
            assert_eq!(kind.keyword().parse::<ClockSourceKind>(), Ok(kind));
        }
        assert_eq!(
            "lse".parse::<ClockSourceKind>(),
            Err(ClockError::UnknownSource)
        );
    }
}
