//! Polarization-resolved Fock-space engine.
//!
//! Each spatial mode `m` carries two internal modes, `2m` (H) and `2m + 1`
//! (V). A state is a sum of monomials `c · a†_{q1} a†_{q2} …` over internal
//! modes, stored as sorted mode lists. Elements act linearly on creation
//! operators, `a†_k → Σ_j U_jk a†_j`, so applying one means expanding every
//! photon it touches. The Fock amplitude of a monomial with occupations
//! `n_k` is `c · sqrt(Π n_k!)`.

use std::collections::BTreeMap;

use fusegraph_ir::{FockState, InputState, ModeInput, OpticalElement, Placement, Polarization};
use num_complex::Complex64;
use rustc_hash::FxHashMap;

use crate::error::{SimError, SimResult};

/// Amplitudes below this magnitude are dropped after each element.
const PRUNE: f64 = 1e-12;

/// Sorted internal-mode list of one monomial.
type Monomial = Vec<u32>;

/// Where one creation operator goes: target internal modes with weights.
type Branches = Vec<(u32, Complex64)>;

/// A multi-photon state over polarized spatial modes.
#[derive(Debug, Clone)]
pub struct PolarizedState {
    num_modes: usize,
    terms: FxHashMap<Monomial, Complex64>,
}

impl PolarizedState {
    /// Prepare the state described by `input`.
    pub fn from_input(input: &InputState) -> Self {
        let mut monomial: Monomial = input
            .modes()
            .iter()
            .enumerate()
            .filter_map(|(m, content)| match content {
                ModeInput::Photon(pol) => Some(internal(m, *pol)),
                ModeInput::Vacuum => None,
            })
            .collect();
        monomial.sort_unstable();
        let mut terms = FxHashMap::default();
        terms.insert(monomial, Complex64::new(1.0, 0.0));
        Self {
            num_modes: input.num_modes(),
            terms,
        }
    }

    /// Number of spatial modes.
    pub fn num_modes(&self) -> usize {
        self.num_modes
    }

    /// Number of monomials currently held.
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Apply one placed element.
    pub fn apply(&mut self, placement: &Placement) -> SimResult<()> {
        let first = placement.first_mode;
        let element = &placement.element;
        if placement.modes().end > self.num_modes {
            return Err(SimError::ElementOutOfRange {
                element: element.name(),
                mode: first,
                num_modes: self.num_modes,
            });
        }
        if element.is_barrier() {
            return Ok(());
        }

        let mut next: FxHashMap<Monomial, Complex64> = FxHashMap::default();
        for (monomial, amplitude) in &self.terms {
            let mut partial: Vec<(Monomial, Complex64)> =
                vec![(Vec::with_capacity(monomial.len()), *amplitude)];
            for &q in monomial {
                match transfer(element, first, q) {
                    None => {
                        for (modes, _) in &mut partial {
                            modes.push(q);
                        }
                    }
                    Some(branches) => {
                        partial = partial
                            .into_iter()
                            .flat_map(|(modes, amp)| {
                                branches.iter().map(move |&(target, weight)| {
                                    let mut modes = modes.clone();
                                    modes.push(target);
                                    (modes, amp * weight)
                                })
                            })
                            .collect();
                    }
                }
            }
            for (mut modes, amp) in partial {
                modes.sort_unstable();
                *next.entry(modes).or_default() += amp;
            }
        }
        next.retain(|_, amp| amp.norm() > PRUNE);
        self.terms = next;
        Ok(())
    }

    /// Keep only the terms with exactly `count` photons across the spatial
    /// `modes`.
    pub fn project(&mut self, modes: &[usize], count: u32) {
        self.terms.retain(|monomial, _| {
            let inside = monomial
                .iter()
                .filter(|&&q| modes.contains(&((q / 2) as usize)))
                .count();
            inside == count as usize
        });
    }

    /// Squared norm of the state.
    pub fn norm_sqr(&self) -> f64 {
        self.terms
            .iter()
            .map(|(monomial, amplitude)| amplitude.norm_sqr() * multiplicity(monomial))
            .sum()
    }

    /// Detection probabilities per spatial occupation pattern.
    ///
    /// Polarization is not resolved by the detectors, so internal modes of
    /// the same spatial mode are summed.
    pub fn probabilities(&self) -> BTreeMap<FockState, f64> {
        let mut out: BTreeMap<FockState, f64> = BTreeMap::new();
        for (monomial, amplitude) in &self.terms {
            let p = amplitude.norm_sqr() * multiplicity(monomial);
            let mut occupation = vec![0u32; self.num_modes];
            for &q in monomial {
                occupation[(q / 2) as usize] += 1;
            }
            *out.entry(FockState::new(occupation)).or_insert(0.0) += p;
        }
        out
    }
}

fn internal(mode: usize, pol: Polarization) -> u32 {
    (2 * mode + pol.index()) as u32
}

/// `Π n_k!` over the internal-mode occupations of a sorted monomial.
fn multiplicity(monomial: &[u32]) -> f64 {
    let mut total = 1.0;
    for run in monomial.chunk_by(|a, b| a == b) {
        total *= (1..=run.len()).map(|k| k as f64).product::<f64>();
    }
    total
}

/// Image of creation operator `q` under `element` placed at `first`, or
/// `None` if the element does not touch it.
fn transfer(element: &OpticalElement, first: usize, q: u32) -> Option<Branches> {
    let mode = (q / 2) as usize;
    let pol = q % 2;
    let span = first..first + element.num_modes();
    if !span.contains(&mode) {
        return None;
    }
    let local = mode - first;
    let at = |m: usize, p: u32| (2 * m) as u32 + p;

    let branches = match element {
        OpticalElement::WavePlate { .. } | OpticalElement::PhaseShifter { .. } => {
            let jones = element.jones_matrix()?;
            (0..2u32)
                .map(|row| (at(mode, row), jones.get(row as usize, pol as usize)))
                .filter(|(_, w)| w.norm() > PRUNE)
                .collect()
        }
        OpticalElement::BeamSplitter(bs) => {
            let u = bs.unitary();
            (0..2usize)
                .map(|row| (at(first + row, pol), u.get(row, local)))
                .filter(|(_, w)| w.norm() > PRUNE)
                .collect()
        }
        OpticalElement::PolarizingBeamSplitter => {
            // H crosses to the other mode, V stays.
            let target = if pol == 0 { first + 1 - local } else { mode };
            vec![(at(target, pol), Complex64::new(1.0, 0.0))]
        }
        OpticalElement::Permutation { perm } => {
            vec![(at(first + perm[local], pol), Complex64::new(1.0, 0.0))]
        }
    };
    Some(branches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusegraph_ir::Network;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_8};

    fn run(net: &Network, input: &InputState) -> BTreeMap<FockState, f64> {
        let mut state = PolarizedState::from_input(input);
        for placement in net.placements() {
            state.apply(placement).unwrap();
        }
        state.probabilities()
    }

    fn prob(probs: &BTreeMap<FockState, f64>, occ: &[u32]) -> f64 {
        probs.get(&FockState::new(occ.to_vec())).copied().unwrap_or(0.0)
    }

    #[test]
    fn test_pbs_routes_h_across() {
        let mut net = Network::new("pbs", 2);
        net.pbs(0).unwrap();
        let probs = run(&net, &InputState::polarized(1, 1, Polarization::H));
        assert!((prob(&probs, &[0, 1]) - 1.0).abs() < 1e-12);

        let probs = run(&net, &InputState::polarized(1, 1, Polarization::V));
        assert!((prob(&probs, &[1, 0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_diagonal_photon_splits_evenly() {
        let mut net = Network::new("diag", 2);
        net.hwp(0, FRAC_PI_8).unwrap().pbs(0).unwrap();
        let probs = run(&net, &InputState::polarized(1, 1, Polarization::H));
        assert!((prob(&probs, &[0, 1]) - 0.5).abs() < 1e-12);
        assert!((prob(&probs, &[1, 0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_hong_ou_mandel_bunching() {
        let mut net = Network::new("hom", 2);
        net.add(0, OpticalElement::BeamSplitter(fusegraph_ir::BeamSplitter::new(FRAC_PI_2)))
            .unwrap();
        let input = InputState::new(vec![
            ModeInput::Photon(Polarization::H),
            ModeInput::Photon(Polarization::H),
        ]);
        let probs = run(&net, &input);
        assert!(prob(&probs, &[1, 1]) < 1e-12);
        assert!((prob(&probs, &[2, 0]) - 0.5).abs() < 1e-12);
        assert!((prob(&probs, &[0, 2]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_distinguishable_polarizations_do_not_bunch() {
        let mut net = Network::new("hom-hv", 2);
        net.add(0, OpticalElement::BeamSplitter(fusegraph_ir::BeamSplitter::new(FRAC_PI_2)))
            .unwrap();
        let input = InputState::new(vec![
            ModeInput::Photon(Polarization::H),
            ModeInput::Photon(Polarization::V),
        ]);
        let probs = run(&net, &input);
        assert!((prob(&probs, &[1, 1]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_permutation_moves_photons() {
        let mut net = Network::new("perm", 3);
        net.add(0, OpticalElement::permutation(vec![2, 0, 1]).unwrap())
            .unwrap();
        let input = InputState::polarized(1, 2, Polarization::V);
        let probs = run(&net, &input);
        assert!((prob(&probs, &[0, 0, 1]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_norm_preserved() {
        let mut net = Network::new("mix", 4);
        net.hwp(0, 0.3)
            .unwrap()
            .qwp(1, FRAC_PI_4)
            .unwrap()
            .pbs(0)
            .unwrap()
            .pbs(1)
            .unwrap()
            .hwp(2, 1.1)
            .unwrap()
            .pbs(2)
            .unwrap();
        let probs = run(&net, &InputState::polarized(2, 2, Polarization::H));
        let total: f64 = probs.values().sum();
        assert!((total - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_out_of_range_placement() {
        let mut wide = Network::new("wide", 3);
        wide.pbs(1).unwrap();
        let mut state = PolarizedState::from_input(&InputState::polarized(1, 1, Polarization::H));
        let err = state.apply(&wide.placements()[0]).unwrap_err();
        assert!(matches!(err, SimError::ElementOutOfRange { element: "PBS", .. }));
    }

    #[test]
    fn test_projection_keeps_matching_terms() {
        let mut net = Network::new("diag", 2);
        net.hwp(0, FRAC_PI_8).unwrap().pbs(0).unwrap();
        let mut state = PolarizedState::from_input(&InputState::polarized(1, 1, Polarization::H));
        for placement in net.placements() {
            state.apply(placement).unwrap();
        }
        assert_eq!(state.num_terms(), 2);
        state.project(&[0], 1);
        assert_eq!(state.num_terms(), 1);
        assert!((state.norm_sqr() - 0.5).abs() < 1e-12);
        assert!((prob(&state.probabilities(), &[1, 0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_multiplicity() {
        assert_eq!(multiplicity(&[0, 0, 1, 3, 3, 3]), 12.0);
        assert_eq!(multiplicity(&[]), 1.0);
    }
}
