//! Linear-optical elements.
//!
//! Every spatial mode carries two polarization components, horizontal (`H`)
//! and vertical (`V`). Elements act either on the polarization pair of a
//! single mode, on a pair of neighbouring modes, or permute a block of modes.
//!
//! | Element | Modes | Action |
//! |---------|-------|--------|
//! | `WavePlate(δ, ξ)` | 1 | Jones matrix of a retarder with phase δ at angle ξ |
//! | `PhaseShifter(φ)` | 1 | global phase `e^{iφ}` on both polarizations |
//! | `BeamSplitter` | 2 | rail-form splitter, identical on both polarizations |
//! | `PolarizingBeamSplitter` | 2 | exchanges the `H` components, keeps `V` in place |
//! | `Permutation` | n | mode `i` moves to mode `perm[i]` |

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::unitary::Unitary2x2;

/// Polarization component of a spatial mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Polarization {
    /// Horizontal, the reference state.
    H,
    /// Vertical.
    V,
}

impl Polarization {
    /// Index of this component inside a mode's polarization pair.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Polarization::H => 0,
            Polarization::V => 1,
        }
    }
}

impl fmt::Display for Polarization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarization::H => write!(f, "H"),
            Polarization::V => write!(f, "V"),
        }
    }
}

/// A two-mode rail-form beam splitter.
///
/// `U = [[e^{i(φtl+φtr)} cos(θ/2), i e^{i(φtr+φbl)} sin(θ/2)],
///       [i e^{i(φtl+φbr)} sin(θ/2), e^{i(φbl+φbr)} cos(θ/2)]]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSplitter {
    /// Mixing angle.
    pub theta: f64,
    /// Input phase on the top mode.
    #[serde(default)]
    pub phi_tl: f64,
    /// Input phase on the bottom mode.
    #[serde(default)]
    pub phi_bl: f64,
    /// Output phase on the top mode.
    #[serde(default)]
    pub phi_tr: f64,
    /// Output phase on the bottom mode.
    #[serde(default)]
    pub phi_br: f64,
}

impl BeamSplitter {
    /// Splitter with the given angle and no extra phases.
    pub const fn new(theta: f64) -> Self {
        Self {
            theta,
            phi_tl: 0.0,
            phi_bl: 0.0,
            phi_tr: 0.0,
            phi_br: 0.0,
        }
    }

    /// Transfer matrix of the splitter.
    pub fn unitary(&self) -> Unitary2x2 {
        let c = (self.theta / 2.0).cos();
        let s = (self.theta / 2.0).sin();
        let i = Complex64::new(0.0, 1.0);
        let e = |phase: f64| Complex64::from_polar(1.0, phase);
        Unitary2x2::new(
            e(self.phi_tl + self.phi_tr) * c,
            i * e(self.phi_tr + self.phi_bl) * s,
            i * e(self.phi_tl + self.phi_br) * s,
            e(self.phi_bl + self.phi_br) * c,
        )
    }
}

/// An optical element placed in a [`Network`](crate::Network).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpticalElement {
    /// Birefringent retarder with phase `delta` and fast-axis angle `xsi`.
    WavePlate {
        /// Retardance.
        delta: f64,
        /// Axis angle.
        xsi: f64,
    },
    /// Phase shifter applying `e^{i phi}`.
    PhaseShifter {
        /// Phase.
        phi: f64,
    },
    /// Rail-form beam splitter.
    BeamSplitter(BeamSplitter),
    /// Polarizing beam splitter over two neighbouring modes.
    PolarizingBeamSplitter,
    /// Mode permutation.
    Permutation {
        /// Target mode of each input mode.
        perm: Vec<usize>,
    },
}

impl OpticalElement {
    /// Generic wave plate.
    pub fn wave_plate(delta: f64, xsi: f64) -> Self {
        OpticalElement::WavePlate { delta, xsi }
    }

    /// Half-wave plate at angle `xsi`.
    pub fn hwp(xsi: f64) -> Self {
        Self::wave_plate(FRAC_PI_2, xsi)
    }

    /// Quarter-wave plate at angle `xsi`.
    pub fn qwp(xsi: f64) -> Self {
        Self::wave_plate(FRAC_PI_4, xsi)
    }

    /// Phase shifter.
    pub fn phase_shifter(phi: f64) -> Self {
        OpticalElement::PhaseShifter { phi }
    }

    /// Polarizing beam splitter.
    pub fn pbs() -> Self {
        OpticalElement::PolarizingBeamSplitter
    }

    /// Mode permutation; `perm` must be a bijection of `0..perm.len()`.
    pub fn permutation(perm: Vec<usize>) -> IrResult<Self> {
        let mut seen = vec![false; perm.len()];
        let bijective = perm.iter().all(|&target| match seen.get_mut(target) {
            Some(slot) if !*slot => {
                *slot = true;
                true
            }
            _ => false,
        });
        if !bijective {
            return Err(IrError::InvalidPermutation(perm));
        }
        Ok(OpticalElement::Permutation { perm })
    }

    /// Identity permutation over `n` modes.
    pub fn identity(n: usize) -> Self {
        OpticalElement::Permutation {
            perm: (0..n).collect(),
        }
    }

    /// Permutation exchanging modes `a` and `b` within a block of `n` modes.
    pub fn swap(n: usize, a: usize, b: usize) -> IrResult<Self> {
        let mut perm: Vec<usize> = (0..n).collect();
        if a >= n || b >= n {
            return Err(IrError::InvalidPermutation(perm));
        }
        perm.swap(a, b);
        Ok(OpticalElement::Permutation { perm })
    }

    /// Short display name.
    pub fn name(&self) -> &'static str {
        match self {
            OpticalElement::WavePlate { .. } => "WP",
            OpticalElement::PhaseShifter { .. } => "PS",
            OpticalElement::BeamSplitter(_) => "BS",
            OpticalElement::PolarizingBeamSplitter => "PBS",
            OpticalElement::Permutation { .. } => "PERM",
        }
    }

    /// Number of consecutive spatial modes the element spans.
    pub fn num_modes(&self) -> usize {
        match self {
            OpticalElement::WavePlate { .. } | OpticalElement::PhaseShifter { .. } => 1,
            OpticalElement::BeamSplitter(_) | OpticalElement::PolarizingBeamSplitter => 2,
            OpticalElement::Permutation { perm } => perm.len(),
        }
    }

    /// Jones matrix for single-mode elements, acting on `(H, V)`.
    pub fn jones_matrix(&self) -> Option<Unitary2x2> {
        match *self {
            OpticalElement::WavePlate { delta, xsi } => Some(Unitary2x2::wave_plate(delta, xsi)),
            OpticalElement::PhaseShifter { phi } => Some(Unitary2x2::phase(phi)),
            _ => None,
        }
    }

    /// Check whether this is an identity permutation (a stage barrier).
    pub fn is_barrier(&self) -> bool {
        matches!(self, OpticalElement::Permutation { perm } if perm.iter().enumerate().all(|(i, &p)| i == p))
    }
}

impl fmt::Display for OpticalElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpticalElement::WavePlate { delta, xsi } => {
                write!(f, "WP(delta={delta:.4}, xsi={xsi:.4})")
            }
            OpticalElement::PhaseShifter { phi } => write!(f, "PS(phi={phi:.4})"),
            OpticalElement::BeamSplitter(bs) => write!(
                f,
                "BS(theta={:.4}, phi_tl={:.4}, phi_bl={:.4}, phi_tr={:.4}, phi_br={:.4})",
                bs.theta, bs.phi_tl, bs.phi_bl, bs.phi_tr, bs.phi_br
            ),
            OpticalElement::PolarizingBeamSplitter => write!(f, "PBS"),
            OpticalElement::Permutation { perm } => write!(f, "PERM{perm:?}"),
        }
    }
}
