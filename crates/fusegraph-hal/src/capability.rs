//! Backend capability introspection.
//!
//! [`Capabilities`] describe what a photonic backend can execute: how many
//! spatial modes and photons it handles, which element families it
//! implements and whether it can filter outcomes itself. The runtime uses
//! them to reject a network before submission.

use fusegraph_ir::{InputState, Network, OpticalElement};
use serde::{Deserialize, Serialize};

use crate::backend::ValidationResult;

/// Hardware capabilities of a photonic backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Maximum number of spatial modes.
    pub max_modes: u32,
    /// Maximum number of injected photons.
    pub max_photons: u32,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
    /// Whether polarization elements (wave plates, PBS) are supported.
    pub supports_polarization: bool,
    /// Whether the backend applies postselection before reporting results.
    pub supports_postselection: bool,
    /// Whether exact probability queries are supported.
    pub supports_probabilities: bool,
    /// Additional capability flags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Capabilities of the local polarization-resolved simulator.
    pub fn simulator(max_modes: u32) -> Self {
        Self {
            name: "simulator".into(),
            max_modes,
            max_photons: max_modes / 2,
            max_shots: 1_000_000,
            is_simulator: true,
            supports_polarization: true,
            supports_postselection: true,
            supports_probabilities: true,
            features: vec!["fock".into(), "polarization".into()],
        }
    }

    /// Capabilities of a Quandela cloud platform.
    ///
    /// Platforms prefixed with `sim:` are remote simulators and accept
    /// polarization elements and probability queries; QPUs only sample.
    pub fn quandela(platform: impl Into<String>) -> Self {
        let name = platform.into();
        let is_simulator = name.starts_with("sim:");
        Self {
            max_modes: if is_simulator { 24 } else { 12 },
            max_photons: 6,
            max_shots: 10_000_000,
            is_simulator,
            supports_polarization: is_simulator,
            supports_postselection: true,
            supports_probabilities: is_simulator,
            features: vec!["photonic".into()],
            name,
        }
    }

    /// Check a network and its input state against these capabilities.
    pub fn check(&self, network: &Network, input: &InputState) -> ValidationResult {
        let mut reasons = vec![];
        if network.num_modes() != input.num_modes() {
            reasons.push(format!(
                "input state has {} modes but the network has {}",
                input.num_modes(),
                network.num_modes()
            ));
        }
        if network.num_modes() > self.max_modes as usize {
            reasons.push(format!(
                "network uses {} modes, backend supports {}",
                network.num_modes(),
                self.max_modes
            ));
        }
        if input.num_photons() > self.max_photons as usize {
            reasons.push(format!(
                "input injects {} photons, backend supports {}",
                input.num_photons(),
                self.max_photons
            ));
        }
        if !self.supports_polarization {
            let polarizing = network
                .placements()
                .iter()
                .filter(|p| {
                    matches!(
                        p.element,
                        OpticalElement::WavePlate { .. } | OpticalElement::PolarizingBeamSplitter
                    )
                })
                .count();
            if polarizing > 0 {
                reasons.push(format!(
                    "{polarizing} polarization elements, backend has no polarization control"
                ));
            }
        }
        if reasons.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { reasons }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusegraph_ir::Polarization;

    fn pbs_network() -> Network {
        let mut net = Network::new("test", 4);
        net.hwp(0, 0.3).unwrap().pbs(0).unwrap();
        net
    }

    #[test]
    fn test_simulator_accepts_polarization() {
        let caps = Capabilities::simulator(16);
        let input = InputState::polarized(2, 2, Polarization::H);
        assert!(caps.check(&pbs_network(), &input).is_valid());
    }

    #[test]
    fn test_qpu_rejects_polarization() {
        let caps = Capabilities::quandela("qpu:belenos");
        assert!(!caps.is_simulator);
        let input = InputState::polarized(2, 2, Polarization::H);
        let ValidationResult::Invalid { reasons } = caps.check(&pbs_network(), &input) else {
            panic!("expected invalid");
        };
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].contains("polarization"));
    }

    #[test]
    fn test_size_limits() {
        let caps = Capabilities::simulator(2);
        let input = InputState::polarized(2, 2, Polarization::H);
        let ValidationResult::Invalid { reasons } = caps.check(&pbs_network(), &input) else {
            panic!("expected invalid");
        };
        assert_eq!(reasons.len(), 2);
    }

    #[test]
    fn test_mode_mismatch() {
        let caps = Capabilities::simulator(16);
        let input = InputState::polarized(1, 1, Polarization::H);
        assert!(!caps.check(&pbs_network(), &input).is_valid());
    }
}
