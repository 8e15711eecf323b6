//! Clock tree resolution. A [`ClockConfig`] describes which oscillator to run from and the
//! system clock we'd like; [`resolve`] turns it into a [`ClockPlan`]: the derived frequencies,
//! flash wait states and bus prescalers, and the ordered register actions that bring the
//! clocks up. Emitters turn each [`HwStep`] into one register statement, without making any
//! decisions of their own.
//!
//! Only the F103 clock tree is modeled.

mod f1;

pub use f1::*;

/// This trait allows you to return information about a clocks's speeds.
/// It's used for configuring peripherals, eg timer and USART prescalers in generated code.
pub trait ClockCfg {
    /// System clock speed, in Hz.
    fn sysclk(&self) -> u32;

    /// HCLK speed, in Hz. Ie AHB bus, core, memory, and DMA.
    fn hclk(&self) -> u32;

    /// Cortex System timer speed, in Hz.
    fn systick(&self) -> u32;

    /// APB1 peripheral clocks speed, in Hz.
    fn apb1(&self) -> u32;

    /// APB1 timer clocks speed, in Hz.
    fn apb1_timer(&self) -> u32;

    /// APB2 peripheral clocks speed, in Hz.
    fn apb2(&self) -> u32;

    /// APB2 timer clocks speed, in Hz.
    fn apb2_timer(&self) -> u32;
}
