//! Resolves an STM32F103 board description into what firmware code generation needs:
//!
//! - [`clocks::resolve`] turns a clock source and target frequency into a validated
//!   [`clocks::ClockPlan`]: PLL multiplier, flash wait states, APB1 prescaler, and the
//!   ordered register actions that bring the clocks up.
//! - [`gpio::emit`] turns named pin assignments into a [`gpio::PinMap`]: per pin, the
//!   operations generated code may call. Write operations only exist for pins that can be
//!   driven.
//! - [`vectors::VectorTable`] reads interrupt vector listings.
//!
//! Everything here is a pure computation, run once per build. Rendering source text from
//! the results is left to the caller.
//!
//! Enable the `defmt` feature to log resolution decisions, and the `serde` feature to
//! exchange descriptions and results as data.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
mod macros;

pub mod clocks;
pub mod error;
pub mod gpio;
pub mod vectors;

pub use crate::{
    clocks::{ClockConfig, ClockPlan, resolve},
    error::{Error, Result},
    gpio::{PinDescriptor, PinMap, emit},
};

/// Resolve a board's clocks and pins together, eg from a build script.
pub fn resolve_board(clocks: ClockConfig, pins: &[PinDescriptor]) -> Result<(ClockPlan, PinMap)> {
    let plan = resolve(clocks)?;
    let pin_map = emit(pins)?;
    Ok((plan, pin_map))
}
