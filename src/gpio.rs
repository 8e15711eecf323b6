//! This module resolves pin descriptions into the named operations generated code exposes
//! for each pin: `get`, `is_high` etc for every pin, and `set_high`, `toggle` etc only for
//! modes that drive the pin. Active / inactive variants are aliases picked by the pin's
//! polarity.
//!
//! It also provides the groupings used to emit bulk GPIO initialization.

use alloc::{
    collections::{BTreeMap, BTreeSet},
    format,
    string::String,
    vec::Vec,
};
use core::{cmp::Ordering, fmt, str::FromStr};

use cfg_if::cfg_if;
use paste::paste;

#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors that can occur while resolving a pin map.
pub enum PinError {
    /// Pin number outside 0 - 15.
    InvalidPinNumber { name: String, pin_no: u8 },
    /// Port not bonded out on the selected part.
    InvalidPort { name: String, port: Port },
    /// A pin designator not of the form `PA13`.
    InvalidPinName(String),
    /// A mode keyword that isn't one of `analog`, `in`, `in-up`, `in-down`, `out`, `out-od`,
    /// `af`, `af-od`.
    UnknownMode(String),
    /// An initial state that isn't one of `on`, `off`, `high`, `low`.
    UnknownInitialState(String),
    /// Names used by more than one pin. Lists every duplicated name, once each.
    DuplicateName { names: Vec<String> },
    /// Designators, eg `PA5`, claimed by more than one pin.
    DuplicatePin { designators: Vec<String> },
}

/// Comma-separated list, for error messages.
struct Listed<'a>(&'a [String]);

impl fmt::Display for Listed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(item)?;
        }
        Ok(())
    }
}

impl_display!(PinError, self, f, {
    Self::InvalidPinNumber { name, pin_no } => (
        "pin {} has pin number {}; must be between 0 and 15",
        name,
        pin_no
    ),
    Self::InvalidPort { name, port } => (
        "pin {} is on port {}, which this part doesn't have",
        name,
        port.letter()
    ),
    Self::InvalidPinName(designator) => ("pin designator '{}' is invalid", designator),
    Self::UnknownMode(mode) => (
        "invalid pin mode '{}'; allowed are af, af-od, analog, in, in-down, in-up, out, out-od",
        mode
    ),
    Self::UnknownInitialState(state) => (
        "invalid initial state '{}'; allowed are on, off, high, low",
        state
    ),
    Self::DuplicateName { names } => ("duplicate pin name(s): {}", Listed(names)),
    Self::DuplicatePin { designators } => (
        "pin(s) assigned more than once: {}",
        Listed(designators)
    ),
});

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// GPIO port letter
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

cfg_if! {
    if #[cfg(feature = "f103x6")] {
        /// Last port bonded out on this part.
        const LAST_PORT: Port = Port::D;
    } else if #[cfg(feature = "f103xb")] {
        const LAST_PORT: Port = Port::E;
    } else {
        const LAST_PORT: Port = Port::G;
    }
}

impl Port {
    pub fn letter(&self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
            Self::F => 'F',
            Self::G => 'G',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            'E' => Some(Self::E),
            'F' => Some(Self::F),
            'G' => Some(Self::G),
            _ => None,
        }
    }

    /// Whether the selected part has this port.
    pub fn is_available(&self) -> bool {
        *self <= LAST_PORT
    }

    /// CMSIS name of the port's register block, eg `GPIOA`.
    pub fn register_block(&self) -> &'static str {
        match self {
            Self::A => "GPIOA",
            Self::B => "GPIOB",
            Self::C => "GPIOC",
            Self::D => "GPIOD",
            Self::E => "GPIOE",
            Self::F => "GPIOF",
            Self::G => "GPIOG",
        }
    }
}

macro_rules! make_pin_num {
    ($($n:literal),+) => {
        paste! {
            #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
            #[cfg_attr(feature = "defmt", derive(defmt::Format))]
            #[cfg_attr(feature = "serde", derive(serde::Serialize))]
            /// Pin number; 0 through 15. For example, use 5 for PA5 or PB5.
            pub enum PinNum {
                $(
                    [<P $n>],
                )+
            }

            impl PinNum {
                pub fn value(&self) -> u8 {
                    match self {
                        $(
                            Self::[<P $n>] => $n,
                        )+
                    }
                }

                pub fn from_value(value: u8) -> Option<Self> {
                    match value {
                        $(
                            $n => Some(Self::[<P $n>]),
                        )+
                        _ => None,
                    }
                }
            }
        }
    };
}

make_pin_num!(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15);

impl PinNum {
    /// Bit of this pin in the port's data registers.
    pub fn mask(&self) -> u16 {
        1 << self.value()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Input pull resistor: Pull up, pull down, or floating.
pub enum Pull {
    Floating,
    Up,
    Dn,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Output driver type
pub enum OutputType {
    PushPull,
    OpenDrain,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Pin mode, with the sub-kind the F1's `GPIOx_CRL` / `GPIOx_CRH` encode alongside it.
pub enum PinMode {
    Input(Pull),
    Output(OutputType),
    /// Driven by a peripheral. Never settable from code, for either output type.
    AlternateFunction(OutputType),
    Analog,
}

impl PinMode {
    /// Whether code may drive this pin, ie whether write operations exist for it.
    pub fn settable(&self) -> bool {
        matches!(self, Self::Output(_))
    }

    /// Suffix of the StdPeriph `GPIO_Mode_` constant for this mode.
    pub fn stdperiph(&self) -> &'static str {
        match self {
            Self::Analog => "AIN",
            Self::Input(Pull::Floating) => "IN_FLOATING",
            Self::Input(Pull::Up) => "IPU",
            Self::Input(Pull::Dn) => "IPD",
            Self::Output(OutputType::PushPull) => "Out_PP",
            Self::Output(OutputType::OpenDrain) => "Out_OD",
            Self::AlternateFunction(OutputType::PushPull) => "AF_PP",
            Self::AlternateFunction(OutputType::OpenDrain) => "AF_OD",
        }
    }

    /// The keyword used for this mode in board descriptions.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Analog => "analog",
            Self::Input(Pull::Floating) => "in",
            Self::Input(Pull::Up) => "in-up",
            Self::Input(Pull::Dn) => "in-down",
            Self::Output(OutputType::PushPull) => "out",
            Self::Output(OutputType::OpenDrain) => "out-od",
            Self::AlternateFunction(OutputType::PushPull) => "af",
            Self::AlternateFunction(OutputType::OpenDrain) => "af-od",
        }
    }

    /// Descriptive name, as used in generated comments.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Analog => "Analog",
            Self::Input(Pull::Floating) => "InputFloat",
            Self::Input(Pull::Up) => "InputPullup",
            Self::Input(Pull::Dn) => "InputPulldown",
            Self::Output(OutputType::PushPull) => "OutputPushPull",
            Self::Output(OutputType::OpenDrain) => "OutputOpenDrain",
            Self::AlternateFunction(OutputType::PushPull) => "AlternateFunction",
            Self::AlternateFunction(OutputType::OpenDrain) => "AlternateFunctionOpenDrain",
        }
    }
}

impl FromStr for PinMode {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analog" => Ok(Self::Analog),
            "in" => Ok(Self::Input(Pull::Floating)),
            "in-up" => Ok(Self::Input(Pull::Up)),
            "in-down" => Ok(Self::Input(Pull::Dn)),
            "out" => Ok(Self::Output(OutputType::PushPull)),
            "out-od" => Ok(Self::Output(OutputType::OpenDrain)),
            "af" => Ok(Self::AlternateFunction(OutputType::PushPull)),
            "af-od" => Ok(Self::AlternateFunction(OutputType::OpenDrain)),
            _ => Err(PinError::UnknownMode(s.into())),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Electrical level of a pin.
pub enum PinState {
    High,
    Low,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Output state to set during initialization. `Active` and `Inactive` take the pin's
/// polarity into account; `High` and `Low` don't.
pub enum InitialState {
    Active,
    Inactive,
    High,
    Low,
}

impl FromStr for InitialState {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::Active),
            "off" => Ok(Self::Inactive),
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            _ => Err(PinError::UnknownInitialState(s.into())),
        }
    }
}

/// Split a designator like `PA13` into its port and pin number. The pin number is
/// range-checked when the pin map is resolved, not here.
pub fn parse_designator(designator: &str) -> Result<(Port, u8), PinError> {
    let invalid = || PinError::InvalidPinName(designator.into());

    let rest = designator.strip_prefix('P').ok_or_else(invalid)?;
    let mut chars = rest.chars();
    let port = chars.next().and_then(Port::from_letter).ok_or_else(invalid)?;

    let digits = chars.as_str();
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let pin_no = digits.parse().map_err(|_| invalid())?;

    Ok((port, pin_no))
}

#[cfg(feature = "serde")]
fn default_init() -> bool {
    true
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// One named pin assignment, as described by the board.
pub struct PinDescriptor {
    /// Identifier used as the prefix of the pin's generated operations. Unique across the map.
    pub name: String,
    pub port: Port,
    /// Checked to be 0 - 15 on resolution.
    pub pin_no: u8,
    pub mode: PinMode,
    /// Active low.
    #[cfg_attr(feature = "serde", serde(default))]
    pub invert: bool,
    /// Output speed, in Mhz. Recorded as-is.
    #[cfg_attr(feature = "serde", serde(default))]
    pub speed_mhz: Option<u8>,
    /// Alternate function number. Recorded as-is; expected when the mode is
    /// `AlternateFunction`, but not checked.
    #[cfg_attr(feature = "serde", serde(default))]
    pub alt_function: Option<u8>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub initial: Option<InitialState>,
    /// Include this pin in bulk GPIO initialization.
    #[cfg_attr(feature = "serde", serde(default = "default_init"))]
    pub init: bool,
}

impl PinDescriptor {
    pub fn new(name: &str, port: Port, pin_no: u8, mode: PinMode) -> Self {
        Self {
            name: name.into(),
            port,
            pin_no,
            mode,
            invert: false,
            speed_mhz: None,
            alt_function: None,
            initial: None,
            init: true,
        }
    }

    /// Create a descriptor from a designator like `PA13`.
    pub fn from_designator(name: &str, designator: &str, mode: PinMode) -> Result<Self, PinError> {
        let (port, pin_no) = parse_designator(designator)?;
        Ok(Self::new(name, port, pin_no, mode))
    }

    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    pub fn speed(mut self, mhz: u8) -> Self {
        self.speed_mhz = Some(mhz);
        self
    }

    pub fn alt_function(mut self, af: u8) -> Self {
        self.alt_function = Some(af);
        self
    }

    pub fn initial(mut self, state: InitialState) -> Self {
        self.initial = Some(state);
        self
    }

    /// Leave this pin out of bulk GPIO initialization.
    pub fn no_init(mut self) -> Self {
        self.init = false;
        self
    }

    fn designator(&self) -> String {
        format!("P{}{}", self.port.letter(), self.pin_no)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// A named operation generated for a pin, eg `LED_set_active()`.
pub enum PinOp {
    Get,
    IsHigh,
    IsLow,
    IsActive,
    IsInactive,
    SetHigh,
    SetLow,
    SetActive,
    SetInactive,
    Toggle,
}

impl PinOp {
    /// Operations every pin has.
    pub const READ: [Self; 5] = [
        Self::Get,
        Self::IsHigh,
        Self::IsLow,
        Self::IsActive,
        Self::IsInactive,
    ];

    /// Operations only settable pins have.
    pub const WRITE: [Self; 5] = [
        Self::SetHigh,
        Self::SetLow,
        Self::SetActive,
        Self::SetInactive,
        Self::Toggle,
    ];

    /// Suffix of the generated operation, eg `set_active`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::IsHigh => "is_high",
            Self::IsLow => "is_low",
            Self::IsActive => "is_active",
            Self::IsInactive => "is_inactive",
            Self::SetHigh => "set_high",
            Self::SetLow => "set_low",
            Self::SetActive => "set_active",
            Self::SetInactive => "set_inactive",
            Self::Toggle => "toggle",
        }
    }

    pub fn is_write(&self) -> bool {
        Self::WRITE.contains(self)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// What an operation does, in register terms.
pub enum OpDef {
    /// Read the pin's bit of `IDR`, as 0 or 1.
    ReadInput,
    /// `get() != 0`
    InputIsHigh,
    /// `get() == 0`
    InputIsLow,
    /// Write the pin mask to `BSRR`.
    WriteSet,
    /// Write the pin mask to `BRR`.
    WriteReset,
    /// XOR the pin mask into `ODR`.
    ToggleOutput,
    /// Defined as another operation of the same pin.
    Alias(PinOp),
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// The operations generated for one pin. Write operations are absent, rather than
/// erroring, for pins that can't be driven.
pub struct PinOperationSet {
    ops: BTreeMap<PinOp, OpDef>,
}

impl PinOperationSet {
    pub fn new(mode: PinMode, invert: bool) -> Self {
        let (active, inactive) = if invert {
            (PinState::Low, PinState::High)
        } else {
            (PinState::High, PinState::Low)
        };
        let read = |state| match state {
            PinState::High => PinOp::IsHigh,
            PinState::Low => PinOp::IsLow,
        };
        let write = |state| match state {
            PinState::High => PinOp::SetHigh,
            PinState::Low => PinOp::SetLow,
        };

        let mut ops = BTreeMap::new();
        ops.insert(PinOp::Get, OpDef::ReadInput);
        ops.insert(PinOp::IsHigh, OpDef::InputIsHigh);
        ops.insert(PinOp::IsLow, OpDef::InputIsLow);
        ops.insert(PinOp::IsActive, OpDef::Alias(read(active)));
        ops.insert(PinOp::IsInactive, OpDef::Alias(read(inactive)));

        if mode.settable() {
            ops.insert(PinOp::SetHigh, OpDef::WriteSet);
            ops.insert(PinOp::SetLow, OpDef::WriteReset);
            ops.insert(PinOp::SetActive, OpDef::Alias(write(active)));
            ops.insert(PinOp::SetInactive, OpDef::Alias(write(inactive)));
            ops.insert(PinOp::Toggle, OpDef::ToggleOutput);
        }

        Self { ops }
    }

    pub fn get(&self, op: PinOp) -> Option<OpDef> {
        self.ops.get(&op).copied()
    }

    pub fn contains(&self, op: PinOp) -> bool {
        self.ops.contains_key(&op)
    }

    /// The register-level definition of an operation, following aliases.
    pub fn resolve(&self, op: PinOp) -> Option<OpDef> {
        match self.get(op)? {
            OpDef::Alias(target) => self.resolve(target),
            def => Some(def),
        }
    }

    pub fn has_writes(&self) -> bool {
        PinOp::WRITE.iter().any(|op| self.contains(*op))
    }

    /// Operations in declaration order: reads, then writes.
    pub fn iter(&self) -> impl Iterator<Item = (PinOp, OpDef)> + '_ {
        self.ops.iter().map(|(op, def)| (*op, *def))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// A validated pin, with its operations.
pub struct ResolvedPin {
    pub name: String,
    pub port: Port,
    pub pin: PinNum,
    pub mode: PinMode,
    pub invert: bool,
    pub speed_mhz: Option<u8>,
    pub alt_function: Option<u8>,
    pub initial: Option<InitialState>,
    pub init: bool,
    pub operations: PinOperationSet,
}

impl ResolvedPin {
    /// eg `PA13`
    pub fn designator(&self) -> String {
        format!("P{}{}", self.port.letter(), self.pin.value())
    }

    pub fn mask(&self) -> u16 {
        self.pin.mask()
    }

    /// Comment line describing the pin, eg `PA13, mode = OutputPushPull, inverted`.
    pub fn describe(&self) -> String {
        let mut desc = format!("{}, mode = {}", self.designator(), self.mode.name());
        if self.invert {
            desc.push_str(", inverted");
        }
        if let Some(speed) = self.speed_mhz {
            desc.push_str(&format!(", speed {speed} MHz"));
        }
        if let Some(af) = self.alt_function {
            desc.push_str(&format!(", alternate function {af}"));
        }
        desc
    }

    /// Electrical level to drive at initialization, with `on` / `off` resolved through
    /// the pin's polarity.
    pub fn initial_level(&self) -> Option<PinState> {
        let (active, inactive) = if self.invert {
            (PinState::Low, PinState::High)
        } else {
            (PinState::High, PinState::Low)
        };

        self.initial.map(|state| match state {
            InitialState::Active => active,
            InitialState::Inactive => inactive,
            InitialState::High => PinState::High,
            InitialState::Low => PinState::Low,
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// Pins sharing these can be initialized with one `GPIO_Init` call.
pub struct GroupKey {
    pub port: Port,
    pub mode: PinMode,
    pub speed_mhz: Option<u8>,
    pub init: bool,
}

impl GroupKey {
    fn sort_key(&self) -> (Port, &'static str, Option<u8>, bool) {
        (self.port, self.mode.name(), self.speed_mhz, self.init)
    }
}

/// Ordered by port, then mode name (eg `Analog` before `InputFloat`), speed and init flag.
impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// The resolved pin set: pins sorted by port and number, looked up by name.
pub struct PinMap {
    pins: Vec<ResolvedPin>,
    #[cfg_attr(feature = "serde", serde(skip))]
    by_name: BTreeMap<String, usize>,
}

impl PinMap {
    pub fn get(&self, name: &str) -> Option<&ResolvedPin> {
        self.by_name.get(name).and_then(|&i| self.pins.get(i))
    }

    /// The operations of the named pin.
    pub fn operations(&self, name: &str) -> Option<&PinOperationSet> {
        self.get(name).map(|pin| &pin.operations)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedPin> {
        self.pins.iter()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Ports with at least one pin, eg to enable their clocks.
    pub fn used_ports(&self) -> BTreeSet<Port> {
        self.pins.iter().map(|pin| pin.port).collect()
    }

    /// Pins grouped by port, mode, speed and init flag, in [`GroupKey`] order.
    pub fn functional_groups(&self) -> BTreeMap<GroupKey, Vec<&ResolvedPin>> {
        let mut groups: BTreeMap<GroupKey, Vec<&ResolvedPin>> = BTreeMap::new();
        for pin in &self.pins {
            let key = GroupKey {
                port: pin.port,
                mode: pin.mode,
                speed_mhz: pin.speed_mhz,
                init: pin.init,
            };
            groups.entry(key).or_default().push(pin);
        }
        groups
    }
}

/// Names or designators that occur more than once, each listed once, in first-seen order.
fn duplicates(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut dups = Vec::new();
    for item in items {
        if !seen.insert(item.clone()) && !dups.contains(&item) {
            dups.push(item);
        }
    }
    dups
}

/// Resolve a complete pin set. Each pin is checked on its own first, failing on the first
/// bad one; then names and designators are checked across the whole set, reporting every
/// duplicate found. Pass the whole set at once: uniqueness can't be checked piecewise.
pub fn emit(pins: &[PinDescriptor]) -> Result<PinMap, PinError> {
    let mut resolved = Vec::with_capacity(pins.len());

    for desc in pins {
        if !desc.port.is_available() {
            warn!("Pin {} is on an unavailable port", desc.name.as_str());
            return Err(PinError::InvalidPort {
                name: desc.name.clone(),
                port: desc.port,
            });
        }

        let Some(pin) = PinNum::from_value(desc.pin_no) else {
            warn!(
                "Pin {} has invalid pin number {}",
                desc.name.as_str(),
                desc.pin_no
            );
            return Err(PinError::InvalidPinNumber {
                name: desc.name.clone(),
                pin_no: desc.pin_no,
            });
        };

        resolved.push(ResolvedPin {
            name: desc.name.clone(),
            port: desc.port,
            pin,
            mode: desc.mode,
            invert: desc.invert,
            speed_mhz: desc.speed_mhz,
            alt_function: desc.alt_function,
            initial: desc.initial,
            init: desc.init,
            operations: PinOperationSet::new(desc.mode, desc.invert),
        });
    }

    let names = duplicates(pins.iter().map(|desc| desc.name.clone()));
    if !names.is_empty() {
        for name in &names {
            warn!("Duplicate pin name: {}", name.as_str());
        }
        return Err(PinError::DuplicateName { names });
    }

    let designators = duplicates(pins.iter().map(PinDescriptor::designator));
    if !designators.is_empty() {
        for designator in &designators {
            warn!("Pin assigned more than once: {}", designator.as_str());
        }
        return Err(PinError::DuplicatePin { designators });
    }

    resolved.sort_by_key(|pin| (pin.port, pin.pin));

    let by_name = resolved
        .iter()
        .enumerate()
        .map(|(i, pin)| (pin.name.clone(), i))
        .collect();

    for pin in &resolved {
        debug!(
            "Pin {}: {}, {}, writable: {}",
            pin.name.as_str(),
            pin.designator().as_str(),
            pin.mode.keyword(),
            pin.mode.settable()
        );
    }

    Ok(PinMap {
        pins: resolved,
        by_name,
    })
}
