//! Lookup tables for the 24 single-qubit Clifford corrections.
//!
//! Each correction index maps to an optical realization in two encodings:
//!
//! - **Polarization form**: a short sequence of wave plates and a phase
//!   shifter acting on the `(H, V)` pair of one spatial mode. This is the
//!   form the assembler places in the network.
//! - **Rail form**: a single two-mode beam splitter with input and output
//!   phases, acting on a dual-rail qubit.
//!
//! Indices follow the usual Clifford enumeration in which 0 is the identity,
//! 1-3 are the Paulis, 4 and 5 are `S` and `S†`, and 6 is the Hadamard.
//! Both encodings reproduce [`reference_unitary`] up to a global phase.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_8, PI};

use fusegraph_ir::{BeamSplitter, OpticalElement, Unitary2x2};

use crate::error::{CompileError, CompileResult};

/// Number of single-qubit Clifford operators.
pub const NUM_CLIFFORDS: usize = 24;

/// A single-mode polarization operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolarOp {
    /// Wave plate with retardance `delta` at axis angle `xsi`.
    Plate {
        /// Retardance.
        delta: f64,
        /// Axis angle.
        xsi: f64,
    },
    /// Global phase shift.
    Phase(f64),
}

impl PolarOp {
    /// Optical element realizing this operation.
    pub fn to_element(self) -> OpticalElement {
        match self {
            PolarOp::Plate { delta, xsi } => OpticalElement::wave_plate(delta, xsi),
            PolarOp::Phase(phi) => OpticalElement::phase_shifter(phi),
        }
    }

    /// Jones matrix of this operation.
    pub fn jones(self) -> Unitary2x2 {
        match self {
            PolarOp::Plate { delta, xsi } => Unitary2x2::wave_plate(delta, xsi),
            PolarOp::Phase(phi) => Unitary2x2::phase(phi),
        }
    }
}

const fn wp(delta: f64, xsi: f64) -> PolarOp {
    PolarOp::Plate { delta, xsi }
}

const fn ps(phi: f64) -> PolarOp {
    PolarOp::Phase(phi)
}

const fn bs(theta: f64, phi_tl: f64, phi_bl: f64, phi_tr: f64, phi_br: f64) -> BeamSplitter {
    BeamSplitter {
        theta,
        phi_tl,
        phi_bl,
        phi_tr,
        phi_br,
    }
}

const HALF: f64 = FRAC_PI_2;
const QUARTER: f64 = FRAC_PI_4;

/// Polarization-form sequences, applied in order.
pub const POLAR_TABLE: [&[PolarOp]; NUM_CLIFFORDS] = [
    &[wp(0.0, 0.0)],
    &[wp(HALF, QUARTER), ps(-HALF)],
    &[wp(HALF, 0.0), wp(HALF, QUARTER), ps(-HALF)],
    &[wp(HALF, 0.0), ps(-HALF)],
    &[wp(-QUARTER, 0.0), ps(QUARTER)],
    &[wp(QUARTER, 0.0), ps(7.0 * QUARTER)],
    &[wp(HALF, FRAC_PI_8), ps(3.0 * HALF)],
    &[wp(3.0 * QUARTER, QUARTER), ps(PI)],
    &[wp(HALF, FRAC_PI_8), wp(HALF, QUARTER), ps(PI)],
    &[wp(-QUARTER, PI), wp(HALF, QUARTER), ps(PI)],
    &[wp(QUARTER, PI), wp(HALF, QUARTER), ps(-PI)],
    &[wp(HALF, 3.0 * FRAC_PI_8), ps(HALF)],
    &[wp(HALF, 3.0 * FRAC_PI_8), wp(HALF, QUARTER)],
    &[wp(QUARTER, QUARTER), wp(HALF, 0.0)],
    &[wp(QUARTER, 3.0 * QUARTER), wp(HALF, 0.0)],
    &[wp(QUARTER, QUARTER), ps(PI)],
    &[wp(QUARTER, 0.0), wp(HALF, FRAC_PI_8)],
    &[wp(QUARTER, 0.0), wp(HALF, 3.0 * FRAC_PI_8), ps(PI)],
    &[wp(QUARTER, HALF), wp(HALF, 3.0 * FRAC_PI_8), ps(PI)],
    &[wp(QUARTER, HALF), wp(HALF, 5.0 * FRAC_PI_8)],
    &[wp(QUARTER, 0.0), wp(QUARTER, QUARTER), ps(PI)],
    &[wp(QUARTER, QUARTER), wp(HALF, FRAC_PI_8)],
    &[wp(QUARTER, 0.0), wp(QUARTER, 3.0 * QUARTER)],
    &[wp(QUARTER, HALF), wp(QUARTER, QUARTER), ps(PI)],
];

/// Rail-form beam splitters.
pub const RAIL_TABLE: [BeamSplitter; NUM_CLIFFORDS] = [
    bs(0.0, 0.0, 0.0, 0.0, 0.0),
    bs(PI, 0.0, -HALF, 0.0, -HALF),
    bs(PI, -HALF, HALF, HALF, HALF),
    bs(0.0, 0.0, HALF, 0.0, HALF),
    bs(0.0, 0.0, 0.0, 0.0, HALF),
    bs(0.0, 0.0, 0.0, 0.0, -HALF),
    bs(HALF, 0.0, 3.0 * HALF, 0.0, 3.0 * HALF),
    bs(HALF, HALF, -HALF, -HALF, HALF),
    bs(HALF, 0.0, HALF, 0.0, 3.0 * HALF),
    bs(PI, 3.0 * QUARTER, 0.0, -3.0 * QUARTER, 0.0),
    bs(PI, -3.0 * QUARTER, 0.0, 3.0 * QUARTER, 0.0),
    bs(HALF, 0.0, HALF, 0.0, HALF),
    bs(HALF, 3.0 * QUARTER, QUARTER, QUARTER, 3.0 * QUARTER),
    bs(HALF, 0.0, 0.0, HALF, 3.0 * HALF),
    bs(HALF, HALF, 3.0 * HALF, 0.0, 0.0),
    bs(HALF, 0.0, 0.0, PI, 3.0 * PI),
    bs(HALF, 0.0, PI, 3.0 * QUARTER, QUARTER),
    bs(HALF, 0.0, 0.0, 3.0 * QUARTER, 5.0 * QUARTER),
    bs(HALF, 0.0, PI, QUARTER, 3.0 * QUARTER),
    bs(HALF, 0.0, 0.0, 5.0 * QUARTER, 3.0 * QUARTER),
    bs(HALF, 5.0 * QUARTER, 3.0 * QUARTER, 0.0, 0.0),
    bs(HALF, HALF, 0.0, QUARTER, 5.0 * QUARTER),
    bs(HALF, 0.0, HALF, QUARTER, 5.0 * QUARTER),
    bs(HALF, 3.0 * QUARTER, 5.0 * QUARTER, 0.0, 0.0),
];

/// Index of the adjoint of each Clifford.
pub const ADJOINT: [usize; NUM_CLIFFORDS] = [
    0, 1, 2, 3, 5, 4, 6, 15, 12, 9, 10, 11, 8, 13, 14, 7, 20, 22, 23, 21, 16, 19, 17, 18,
];

#[derive(Debug, Clone, Copy)]
enum Gate {
    H,
    S,
    Sdg,
    X,
    Y,
    Z,
}

impl Gate {
    fn matrix(self) -> Unitary2x2 {
        match self {
            Gate::H => Unitary2x2::h(),
            Gate::S => Unitary2x2::s(),
            Gate::Sdg => Unitary2x2::sdg(),
            Gate::X => Unitary2x2::x(),
            Gate::Y => Unitary2x2::y(),
            Gate::Z => Unitary2x2::z(),
        }
    }
}

// Gate words, first gate applied first.
const WORDS: [&[Gate]; NUM_CLIFFORDS] = {
    use Gate::{H, S, Sdg, X, Y, Z};
    [
        &[],
        &[X],
        &[Y],
        &[Z],
        &[S],
        &[Sdg],
        &[H],
        &[H, S, H],
        &[H, X],
        &[S, X],
        &[S, Y],
        &[H, Y],
        &[H, Z],
        &[S, H, Sdg],
        &[Sdg, H, S],
        &[H, Sdg, H],
        &[Sdg, H],
        &[S, H, Z],
        &[S, H, Y],
        &[S, H],
        &[H, S],
        &[H, Sdg],
        &[H, S, X],
        &[H, S, Y],
    ]
};

fn check_index(index: usize) -> CompileResult<usize> {
    if index < NUM_CLIFFORDS {
        Ok(index)
    } else {
        Err(CompileError::CorrectionOutOfRange(index))
    }
}

/// Polarization-form operator sequence for a correction.
pub fn operators_for(index: usize) -> CompileResult<&'static [PolarOp]> {
    check_index(index).map(|i| POLAR_TABLE[i])
}

/// Rail-form beam splitter for a correction.
pub fn rail_operator(index: usize) -> CompileResult<BeamSplitter> {
    check_index(index).map(|i| RAIL_TABLE[i])
}

/// Index of the adjoint correction.
pub fn adjoint(index: usize) -> CompileResult<usize> {
    check_index(index).map(|i| ADJOINT[i])
}

/// The abstract single-qubit Clifford with the given index.
pub fn reference_unitary(index: usize) -> CompileResult<Unitary2x2> {
    let word = WORDS[check_index(index)?];
    Ok(word
        .iter()
        .fold(Unitary2x2::identity(), |acc, gate| gate.matrix().mul(&acc)))
}

/// Combined Jones matrix of the polarization-form sequence.
pub fn polar_unitary(index: usize) -> CompileResult<Unitary2x2> {
    Ok(operators_for(index)?
        .iter()
        .fold(Unitary2x2::identity(), |acc, op| op.jones().mul(&acc)))
}
