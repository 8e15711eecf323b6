//! Interrupt vector table listings, used to generate the vector table and weak handler
//! aliases.
//!
//! The listing has one entry per 4-byte slot: a handler name, or `-` for a reserved slot.
//! `@<hex>` moves to an absolute offset. Blank lines and lines starting with `#` are
//! ignored.
//!
//! ```text
//! # Cortex-M3 core
//! @0x04
//! Reset_Handler
//! NMI_Handler
//! HardFault_Handler
//! ```

use alloc::{collections::BTreeMap, string::String};

/// Bytes per vector slot.
pub const VECTOR_SIZE: u32 = 4;

#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VectorError {
    /// An `@` line whose offset isn't hexadecimal. Holds the 1-based line number.
    InvalidOffset { line: usize },
    /// The listing has no slots.
    Empty,
}

impl_display!(VectorError, self, f, {
    Self::InvalidOffset { line } => ("line {}: invalid vector offset", line),
    Self::Empty => ("vector listing has no entries"),
});

#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VectorTable {
    min_offset: u32,
    max_offset: u32,
    vectors: BTreeMap<u32, String>,
}

impl VectorTable {
    pub fn parse(listing: &str) -> Result<Self, VectorError> {
        let mut vectors: BTreeMap<u32, String> = BTreeMap::new();
        let mut offset = 0;
        let mut range: Option<(u32, u32)> = None;

        for (i, line) in listing.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(hex) = line.strip_prefix('@') {
                let hex = hex
                    .strip_prefix("0x")
                    .or_else(|| hex.strip_prefix("0X"))
                    .unwrap_or(hex);
                offset = u32::from_str_radix(hex, 16)
                    .map_err(|_| VectorError::InvalidOffset { line: i + 1 })?;
                continue;
            }

            if line != "-" {
                vectors.insert(offset, line.into());
            }
            range = Some(match range {
                Some((min, max)) => (min.min(offset), max.max(offset)),
                None => (offset, offset),
            });
            offset = offset.saturating_add(VECTOR_SIZE);
        }

        let (min_offset, max_offset) = range.ok_or(VectorError::Empty)?;
        debug!(
            "Vector table: {} handlers, offsets {} - {}",
            vectors.len(),
            min_offset,
            max_offset
        );

        Ok(Self {
            min_offset,
            max_offset,
            vectors,
        })
    }

    /// Every slot from the lowest offset to the highest, with its handler name, or `None`
    /// for reserved and unlisted slots.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Option<&str>)> + '_ {
        (self.min_offset..=self.max_offset)
            .step_by(VECTOR_SIZE as usize)
            .map(|offset| (offset, self.vectors.get(&offset).map(String::as_str)))
    }

    /// Named handlers only, by offset.
    pub fn handlers(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.vectors.iter().map(|(offset, name)| (*offset, name.as_str()))
    }
}
