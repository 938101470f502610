//! Sub-network generators.
//!
//! Every generator returns a small named [`Network`] over its own modes
//! `0..n`; the assembler appends it at the right offset. Photons start
//! horizontally polarized, so a half-wave plate at π/8 acts as the Hadamard
//! and a polarizing beam splitter as the entangling step.

use std::f64::consts::FRAC_PI_8;

use fusegraph_ir::{Network, OpticalElement};

use crate::clifford;
use crate::decompose::{Cluster, ClusterKind};
use crate::error::{CompileError, CompileResult};

/// GHZ-state generator over `n` photons, entangling photon 0 with all others.
pub fn ghz(n: usize) -> CompileResult<Network> {
    let mut net = Network::new("GHZ", n);
    for mode in 0..n {
        net.hwp(mode, FRAC_PI_8)?;
    }
    for mode in 0..n.saturating_sub(1) {
        net.pbs(mode)?;
    }
    for mode in 1..n {
        net.hwp(mode, FRAC_PI_8)?;
    }
    Ok(net)
}

/// Linear cluster generator over `n >= 4` photons.
pub fn linear(n: usize) -> CompileResult<Network> {
    if n < 4 {
        return Err(CompileError::UnsupportedCluster(format!(
            "linear pattern needs at least 4 photons, got {n}"
        )));
    }
    let mut net = Network::new("LINEAR", n);
    for mode in 0..n {
        net.hwp(mode, FRAC_PI_8)?;
    }
    for mode in 0..n - 1 {
        net.pbs(mode)?;
        if mode >= 1 && mode != n - 2 {
            net.hwp(mode + 1, FRAC_PI_8)?;
        }
    }
    net.barrier();
    net.hwp(0, FRAC_PI_8)?.hwp(n - 1, FRAC_PI_8)?;
    Ok(net)
}

/// Generator for a decomposed cluster.
pub fn cluster(cluster: &Cluster) -> CompileResult<Network> {
    match cluster.kind() {
        ClusterKind::Ghz => ghz(cluster.len()),
        ClusterKind::Linear => linear(cluster.len()),
    }
}

/// Type-1 fusion between photons `first < second`.
///
/// The network spans modes `first..=second`. When the photons are not
/// adjacent, `second` is swapped next to `first` and back afterwards.
pub fn fusion(first: usize, second: usize) -> CompileResult<Network> {
    if second <= first {
        return Err(CompileError::InvalidFusion { first, second });
    }
    let span = second - first;
    let width = span + 1;
    let mut net = Network::new(format!("FUSE {first}-{second}"), width);
    if span > 1 {
        net.add(0, OpticalElement::swap(width, 1, span)?)?;
    }
    net.pbs(0)?.hwp(1, FRAC_PI_8)?;
    if span > 1 {
        net.add(0, OpticalElement::swap(width, 1, span)?)?;
    }
    Ok(net)
}

/// Single-mode correction network for a Clifford index.
pub fn correction(index: usize) -> CompileResult<Network> {
    let mut net = Network::new(format!("CLIFFORD {index}"), 1);
    for op in clifford::operators_for(index)? {
        net.add(0, op.to_element())?;
    }
    Ok(net)
}
