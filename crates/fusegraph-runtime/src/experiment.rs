//! Binding a compiled circuit to a backend and querying it.

use std::collections::BTreeMap;

use fusegraph_adapter_quandela::QuandelaBackend;
use fusegraph_adapter_sim::SimulatorBackend;
use fusegraph_compile::{CompiledCircuit, Photon, PhotonRole, compile};
use fusegraph_hal::{Backend, BackendConfig, BackendRegistry, ExecutionResult, HalError, Task};
use fusegraph_ir::{FockState, GraphProgram, InputState, Network, PostSelect};
use tracing::{debug, info, instrument, warn};

use crate::error::{RuntimeError, RuntimeResult};
use crate::results::{OutcomeValue, Outcomes, PhotonCount, PhotonDistribution};

/// How raw backend outcomes are filtered and labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Only keep outcomes satisfying the circuit's postselection.
    pub postselect: bool,
    /// Relabel raw Fock strings with logical output labels.
    pub format: bool,
}

impl QueryOptions {
    /// Postselect and relabel.
    pub fn new() -> Self {
        Self {
            postselect: true,
            format: true,
        }
    }

    /// Raw backend outcomes without filtering or relabelling.
    pub fn raw() -> Self {
        Self {
            postselect: false,
            format: false,
        }
    }

    /// Toggle postselection.
    pub fn with_postselect(mut self, postselect: bool) -> Self {
        self.postselect = postselect;
        self
    }

    /// Toggle relabelling.
    pub fn with_format(mut self, format: bool) -> Self {
        self.format = format;
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Backends available to [`Experiment::bind_config`] by default.
///
/// - `simulator`: local Fock-space simulator, accepts `seed`, `max_modes` and `max_terms` extras
/// - `quandela`: Quandela cloud, accepts a `platform` extra
pub fn default_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register::<SimulatorBackend>("simulator");
    registry.register::<QuandelaBackend>("quandela");
    registry
}

/// Compile a program and wrap it in an unbound [`Experiment`].
pub fn to_experiment(program: &GraphProgram) -> RuntimeResult<Experiment> {
    let circuit = compile(program)?;
    Ok(Experiment::new(circuit))
}

/// A compiled circuit plus the backend it runs on.
///
/// Input and output templates are derived whenever a backend is bound, so
/// they are only available after [`bind`](Experiment::bind).
pub struct Experiment {
    circuit: CompiledCircuit,
    backend: Option<Box<dyn Backend>>,
    input_state: Option<InputState>,
    output_states: Option<BTreeMap<String, String>>,
}

impl std::fmt::Debug for Experiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Experiment")
            .field("photons", &self.circuit.num_photons())
            .field("modes", &self.circuit.network.num_modes())
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .finish()
    }
}

impl Experiment {
    /// Wrap a compiled circuit.
    pub fn new(circuit: CompiledCircuit) -> Self {
        Self {
            circuit,
            backend: None,
            input_state: None,
            output_states: None,
        }
    }

    /// Bind a backend, replacing any previous one.
    pub fn bind(&mut self, backend: Box<dyn Backend>) -> &mut Self {
        if let Some(previous) = &self.backend {
            warn!(
                "Backend '{}' already bound, previous backend will be overwritten by '{}'",
                previous.name(),
                backend.name()
            );
        }
        info!("Binding experiment to backend '{}'", backend.name());
        self.backend = Some(backend);
        self.input_state = Some(self.circuit.input_state());
        self.output_states = match output_labels(&self.circuit) {
            Ok(labels) => Some(labels),
            Err(e) => {
                warn!("{e}; only raw detection patterns are available");
                None
            }
        };
        self
    }

    /// Bind a backend created from `config` through `registry`.
    pub fn bind_config(
        &mut self,
        registry: &BackendRegistry,
        config: BackendConfig,
    ) -> RuntimeResult<&mut Self> {
        if config.name.is_empty() {
            return Err(RuntimeError::Config("no backend name given".into()));
        }
        if !registry.has_backend(&config.name) {
            return Err(RuntimeError::Config(format!(
                "unknown backend '{}', available: {}",
                config.name,
                registry.available_backends().join(", ")
            )));
        }
        let backend = registry.create(config).map_err(|e| match e {
            HalError::Configuration(msg) => RuntimeError::Config(msg),
            other => RuntimeError::Backend(other),
        })?;
        Ok(self.bind(backend))
    }

    /// Bind the local simulator.
    pub fn bind_local(&mut self, seed: Option<u64>) -> &mut Self {
        let backend = match seed {
            Some(seed) => SimulatorBackend::new().with_seed(seed),
            None => SimulatorBackend::new(),
        };
        self.bind(Box::new(backend))
    }

    /// Bind a Quandela cloud platform.
    pub fn bind_remote(&mut self, platform: &str, token: &str) -> RuntimeResult<&mut Self> {
        if platform.is_empty() {
            return Err(RuntimeError::Config("no remote platform given".into()));
        }
        let backend = QuandelaBackend::with_token(platform, token)
            .map_err(|e| RuntimeError::Backend(e.into()))?;
        Ok(self.bind(Box::new(backend)))
    }

    /// Check whether a backend is bound.
    pub fn is_bound(&self) -> bool {
        self.backend.is_some()
    }

    /// The bound backend.
    pub fn backend(&self) -> RuntimeResult<&dyn Backend> {
        self.backend.as_deref().ok_or(RuntimeError::NoBackend)
    }

    /// The compiled circuit.
    pub fn circuit(&self) -> &CompiledCircuit {
        &self.circuit
    }

    /// The assembled network.
    pub fn network(&self) -> &Network {
        &self.circuit.network
    }

    /// All photons by id.
    pub fn photons(&self) -> &[Photon] {
        &self.circuit.photons
    }

    /// Photon with the given id.
    pub fn photon(&self, id: usize) -> RuntimeResult<&Photon> {
        self.circuit
            .photons
            .get(id)
            .ok_or_else(|| RuntimeError::KeyNotFound(format!("photon {id}")))
    }

    /// Photons carrying logical outputs, in id order.
    pub fn readout_photons(&self) -> Vec<&Photon> {
        self.circuit.photons_with_role(PhotonRole::Readout).collect()
    }

    /// Photons measured in a rotated basis, in id order.
    pub fn compute_photons(&self) -> Vec<&Photon> {
        self.circuit.photons_with_role(PhotonRole::Compute).collect()
    }

    /// Photons consumed by fusions, in id order.
    pub fn witness_photons(&self) -> Vec<&Photon> {
        self.circuit.photons_with_role(PhotonRole::Witness).collect()
    }

    /// Input state sent to the backend.
    pub fn input_state(&self) -> RuntimeResult<&InputState> {
        self.input_state.as_ref().ok_or(RuntimeError::NoBackend)
    }

    /// Map from raw detection pattern to logical output label.
    pub fn output_states(&self) -> RuntimeResult<&BTreeMap<String, String>> {
        match (&self.output_states, &self.backend) {
            (Some(labels), _) => Ok(labels),
            (None, Some(_)) => Err(RuntimeError::TooManyReadouts(
                self.readout_photons().len(),
            )),
            (None, None) => Err(RuntimeError::NoBackend),
        }
    }

    /// Detection constraints heralding a successful run.
    pub fn postselection(&self) -> PostSelect {
        self.circuit.postselection()
    }

    /// Exact output distribution.
    #[instrument(skip(self))]
    pub async fn probability_distribution(
        &self,
        options: QueryOptions,
    ) -> RuntimeResult<PhotonDistribution> {
        let result = self.execute(Task::probabilities(), options).await?;
        let distribution = PhotonDistribution::try_from(&result)?;
        debug!("Backend returned {} outcomes", distribution.len());
        self.finish(distribution, options)
    }

    /// Draw `shots` samples.
    #[instrument(skip(self))]
    pub async fn sample(&self, shots: u32, options: QueryOptions) -> RuntimeResult<PhotonCount> {
        let result = self.execute(Task::samples(shots), options).await?;
        let counts = PhotonCount::try_from(&result)?;
        debug!("Backend returned {} distinct outcomes", counts.len());
        self.finish(counts, options)
    }

    async fn execute(
        &self,
        task: Task,
        options: QueryOptions,
    ) -> RuntimeResult<ExecutionResult> {
        let backend = self.backend()?;
        let input = self.input_state()?;
        let task = if options.postselect {
            task.with_postselect(self.postselection())
        } else {
            task
        };
        info!("Running {} on '{}'", task, backend.name());
        Ok(backend.run(&self.circuit.network, input, &task).await?)
    }

    fn finish<V: OutcomeValue>(
        &self,
        outcomes: Outcomes<V>,
        options: QueryOptions,
    ) -> RuntimeResult<Outcomes<V>> {
        if options.format {
            Ok(outcomes.replace_keys(self.output_states()?))
        } else {
            Ok(outcomes)
        }
    }
}

/// Raw detection pattern for every assignment of the readout bits.
///
/// The first readout photon is the most significant bit. Logical 0 is seen
/// as `(0, 1)` on the photon's mode pair and logical 1 as `(1, 0)`; compute
/// and witness photons are fixed at `(0, 1)`. Fails with
/// [`RuntimeError::TooManyReadouts`] when the bits do not fit in a `u64`.
pub fn output_labels(circuit: &CompiledCircuit) -> RuntimeResult<BTreeMap<String, String>> {
    let readouts: Vec<usize> = circuit
        .photons_with_role(PhotonRole::Readout)
        .map(|p| p.id)
        .collect();
    let width = readouts.len();
    let end = u32::try_from(width)
        .ok()
        .and_then(|w| 1u64.checked_shl(w))
        .ok_or(RuntimeError::TooManyReadouts(width))?;

    let labels = (0..end)
        .map(|value| {
            let mut counts = vec![0u32; 2 * circuit.num_photons()];
            for photon in &circuit.photons {
                let bit = readouts
                    .iter()
                    .position(|&id| id == photon.id)
                    .is_some_and(|pos| (value >> (width - 1 - pos)) & 1 == 1);
                counts[2 * photon.id + usize::from(!bit)] = 1;
            }
            (
                FockState::new(counts).to_string(),
                format!("|{value:0width$b}>"),
            )
        })
        .collect();
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusegraph_ir::Graph;

    fn bell() -> GraphProgram {
        let graph = Graph::from_parts([0u32, 1], [(0, 1)]).unwrap();
        GraphProgram::new(graph)
            .with_correction(1u32, 6)
            .with_outputs([0u32, 1])
    }

    #[test]
    fn test_output_labels_bell() {
        let circuit = compile(&bell()).unwrap();
        let labels = output_labels(&circuit).unwrap();
        assert_eq!(labels.len(), 4);
        assert_eq!(labels["|0,1,0,1>"], "|00>");
        assert_eq!(labels["|0,1,1,0>"], "|01>");
        assert_eq!(labels["|1,0,0,1>"], "|10>");
        assert_eq!(labels["|1,0,1,0>"], "|11>");
    }

    #[test]
    fn test_output_labels_fix_compute_photons() {
        let graph = Graph::from_parts([0u32, 1], [(0, 1)]).unwrap();
        let program = GraphProgram::new(graph).with_outputs([1u32]);
        let circuit = compile(&program).unwrap();
        let labels = output_labels(&circuit).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels["|0,1,0,1>"], "|0>");
        assert_eq!(labels["|0,1,1,0>"], "|1>");
    }

    #[test]
    fn test_output_labels_without_readouts() {
        let graph = Graph::from_parts([0u32], std::iter::empty::<(u32, u32)>()).unwrap();
        let circuit = compile(&GraphProgram::new(graph)).unwrap();
        let labels = output_labels(&circuit).unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels["|0,1>"], "|0>");
    }

    #[test]
    fn test_wide_readout_register_has_no_labels() {
        let nodes: Vec<u32> = (0..64).collect();
        let graph = Graph::from_parts(nodes.iter().copied(), std::iter::empty::<(u32, u32)>())
            .unwrap();
        let program = GraphProgram::new(graph).with_outputs(nodes);
        let circuit = compile(&program).unwrap();
        assert!(matches!(
            output_labels(&circuit),
            Err(RuntimeError::TooManyReadouts(64))
        ));

        let mut experiment = Experiment::new(circuit);
        experiment.bind_local(None);
        assert!(experiment.input_state().is_ok());
        assert!(matches!(
            experiment.output_states(),
            Err(RuntimeError::TooManyReadouts(64))
        ));
    }

    #[test]
    fn test_templates_need_backend() {
        let experiment = to_experiment(&bell()).unwrap();
        assert!(!experiment.is_bound());
        assert!(matches!(experiment.input_state(), Err(RuntimeError::NoBackend)));
        assert!(matches!(experiment.output_states(), Err(RuntimeError::NoBackend)));
        assert!(matches!(experiment.backend(), Err(RuntimeError::NoBackend)));
    }

    #[test]
    fn test_bind_derives_templates() {
        let mut experiment = to_experiment(&bell()).unwrap();
        experiment.bind_local(Some(1));
        assert!(experiment.is_bound());
        assert_eq!(experiment.input_state().unwrap().to_string(), "|{P:H},{P:H},0,0>");
        assert_eq!(experiment.output_states().unwrap().len(), 4);
    }

    #[test]
    fn test_rebind_replaces_backend() {
        let mut experiment = to_experiment(&bell()).unwrap();
        experiment.bind_local(None);
        experiment.bind(Box::new(SimulatorBackend::with_max_modes(8)));
        assert_eq!(experiment.backend().unwrap().capabilities().max_modes, 8);
        assert_eq!(experiment.output_states().unwrap().len(), 4);
    }

    #[test]
    fn test_bind_config_errors() {
        let registry = default_registry();
        let mut experiment = to_experiment(&bell()).unwrap();
        assert!(matches!(
            experiment.bind_config(&registry, BackendConfig::new("")),
            Err(RuntimeError::Config(_))
        ));
        let err = experiment
            .bind_config(&registry, BackendConfig::new("photon-cannon"))
            .unwrap_err();
        assert!(err.to_string().contains("quandela, simulator"));
        assert!(!experiment.is_bound());
    }

    #[test]
    fn test_bind_config_simulator() {
        let registry = default_registry();
        let mut experiment = to_experiment(&bell()).unwrap();
        let config = BackendConfig::new("simulator").with_extra("seed", 7.into());
        experiment.bind_config(&registry, config).unwrap();
        assert_eq!(experiment.backend().unwrap().name(), "simulator");
    }

    #[test]
    fn test_bind_remote_requires_platform() {
        let mut experiment = to_experiment(&bell()).unwrap();
        assert!(matches!(experiment.bind_remote("", "tok"), Err(RuntimeError::Config(_))));
    }

    #[test]
    fn test_role_getters() {
        let graph = Graph::from_parts([0u32, 1, 2], [(0, 1), (1, 2), (2, 0)]).unwrap();
        let program = GraphProgram::new(graph).with_outputs([1u32, 2]);
        let experiment = to_experiment(&program).unwrap();
        assert_eq!(experiment.readout_photons().len(), 2);
        assert_eq!(experiment.compute_photons().len(), 1);
        assert_eq!(experiment.witness_photons().len(), 2);
        assert!(experiment.photon(4).is_ok());
        assert!(matches!(experiment.photon(5), Err(RuntimeError::KeyNotFound(_))));
    }

    #[test]
    fn test_query_options() {
        assert_eq!(QueryOptions::default(), QueryOptions::new());
        let opts = QueryOptions::new().with_format(false);
        assert!(opts.postselect && !opts.format);
        assert_eq!(QueryOptions::raw().with_postselect(true).with_format(true), QueryOptions::new());
    }
}
