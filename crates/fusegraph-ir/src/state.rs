//! Input and detection states.
//!
//! [`InputState`] describes what is injected into each spatial mode: vacuum
//! or a single photon with a given polarization. [`FockState`] is a detected
//! occupation pattern, rendered as `|n0,n1,...>`; this string form is the key
//! of every raw outcome map.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::element::Polarization;
use crate::error::IrError;

/// Content of one input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeInput {
    /// Empty mode.
    Vacuum,
    /// A single photon with the given polarization.
    Photon(Polarization),
}

/// A polarization-resolved input state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputState {
    modes: Vec<ModeInput>,
}

impl InputState {
    /// Create from an explicit per-mode description.
    pub fn new(modes: Vec<ModeInput>) -> Self {
        Self { modes }
    }

    /// `num_photons` photons with polarization `pol` in modes `0..num_photons`,
    /// followed by `num_ancillas` vacuum modes.
    pub fn polarized(num_photons: usize, num_ancillas: usize, pol: Polarization) -> Self {
        let modes = std::iter::repeat_n(ModeInput::Photon(pol), num_photons)
            .chain(std::iter::repeat_n(ModeInput::Vacuum, num_ancillas))
            .collect();
        Self { modes }
    }

    /// Per-mode contents.
    pub fn modes(&self) -> &[ModeInput] {
        &self.modes
    }

    /// Number of spatial modes.
    pub fn num_modes(&self) -> usize {
        self.modes.len()
    }

    /// Number of injected photons.
    pub fn num_photons(&self) -> usize {
        self.modes
            .iter()
            .filter(|m| matches!(m, ModeInput::Photon(_)))
            .count()
    }
}

impl fmt::Display for InputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .modes
            .iter()
            .map(|m| match m {
                ModeInput::Vacuum => "0".to_string(),
                ModeInput::Photon(pol) => format!("{{P:{pol}}}"),
            })
            .collect();
        write!(f, "|{}>", parts.join(","))
    }
}

/// A detected occupation pattern over spatial modes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FockState(pub Vec<u32>);

impl FockState {
    /// Create from per-mode photon counts.
    pub fn new(counts: Vec<u32>) -> Self {
        Self(counts)
    }

    /// Photon count in `mode` (zero outside the state).
    pub fn count(&self, mode: usize) -> u32 {
        self.0.get(mode).copied().unwrap_or(0)
    }

    /// Total photon number.
    pub fn num_photons(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Number of modes.
    pub fn num_modes(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for FockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        write!(f, "|{}>", parts.join(","))
    }
}

impl FromStr for FockState {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('|')
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or_else(|| IrError::InvalidState(s.to_string()))?;
        if inner.is_empty() {
            return Ok(Self(vec![]));
        }
        inner
            .split(',')
            .map(|n| n.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| IrError::InvalidState(s.to_string()))
    }
}
