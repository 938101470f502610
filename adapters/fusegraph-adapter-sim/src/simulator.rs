//! Simulator backend implementation.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use fusegraph_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    Distribution, ExecutionResult, HalError, HalResult, Job, JobId, JobStatus, Task, TaskKind,
};
use fusegraph_ir::{FockState, InputState, Network, PostSelect};
use rand::SeedableRng;
use rand::distributions::{Distribution as _, WeightedIndex};
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{SimError, SimResult};
use crate::fock::PolarizedState;
use crate::projection::ProjectionPlan;

/// Default maximum number of spatial modes.
const DEFAULT_MAX_MODES: u32 = 32;

/// Default budget of Fock-space terms held at once.
const DEFAULT_MAX_TERMS: usize = 1 << 21;

/// Finished jobs kept for `status`/`result` before the oldest are dropped.
const DEFAULT_RETAINED_JOBS: usize = 256;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Jobs in submission order.
#[derive(Default)]
struct JobStore {
    jobs: FxHashMap<String, SimJob>,
    order: VecDeque<String>,
}

impl JobStore {
    fn insert(&mut self, id: String, job: SimJob) {
        self.order.push_back(id.clone());
        self.jobs.insert(id, job);
    }

    /// Drop the oldest finished jobs until at most `keep` remain.
    fn evict(&mut self, keep: usize) {
        while self.jobs.len() > keep {
            let oldest = self.order.iter().position(|id| {
                self.jobs
                    .get(id)
                    .is_none_or(|j| j.job.status.is_terminal())
            });
            let Some(id) = oldest.and_then(|pos| self.order.remove(pos)) else {
                break;
            };
            self.jobs.remove(&id);
        }
    }
}

/// Local simulator backend.
///
/// Networks are simulated exactly in polarization-resolved Fock space.
/// Postselection constraints are applied as soon as the photon count they
/// test can no longer change, which keeps compiled graph programs small.
/// Probability queries return the exact distribution; sampling queries draw
/// from it with a [`StdRng`], seeded when `seed` is configured.
pub struct SimulatorBackend {
    config: BackendConfig,
    capabilities: Capabilities,
    jobs: Arc<Mutex<JobStore>>,
    seed: Option<u64>,
    max_terms: usize,
    retained_jobs: usize,
}

impl SimulatorBackend {
    /// Create a new simulator backend with default settings.
    pub fn new() -> Self {
        Self::with_config(BackendConfig::new("simulator"), DEFAULT_MAX_MODES, None)
    }

    /// Create a simulator with a custom mode limit.
    pub fn with_max_modes(max_modes: u32) -> Self {
        Self::with_config(BackendConfig::new("simulator"), max_modes, None)
    }

    /// Use a fixed seed for sampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fail with [`SimError::TooManyTerms`] once the state holds more than
    /// `max_terms` terms.
    pub fn with_max_terms(mut self, max_terms: usize) -> Self {
        self.max_terms = max_terms;
        self
    }

    /// Keep at most `retained` finished jobs.
    pub fn with_retained_jobs(mut self, retained: usize) -> Self {
        self.retained_jobs = retained;
        self
    }

    fn with_config(config: BackendConfig, max_modes: u32, seed: Option<u64>) -> Self {
        let mut capabilities = Capabilities::simulator(max_modes);
        capabilities.name.clone_from(&config.name);
        Self {
            config,
            capabilities,
            jobs: Arc::new(Mutex::new(JobStore::default())),
            seed,
            max_terms: DEFAULT_MAX_TERMS,
            retained_jobs: DEFAULT_RETAINED_JOBS,
        }
    }

    /// Exact output distribution of `network` on `input`.
    ///
    /// With `postselect`, outcomes violating it are removed while the
    /// network is simulated; the remaining probabilities are unnormalised
    /// and sum to the acceptance.
    #[instrument(skip_all, fields(modes = network.num_modes(), elements = network.len()))]
    pub fn simulate(
        &self,
        network: &Network,
        input: &InputState,
        postselect: Option<&PostSelect>,
    ) -> SimResult<BTreeMap<FockState, f64>> {
        if input.num_modes() != network.num_modes() {
            return Err(SimError::ModeMismatch {
                input: input.num_modes(),
                network: network.num_modes(),
            });
        }
        let plan = postselect
            .map(|ps| ProjectionPlan::new(network, ps))
            .unwrap_or_default();
        debug!("Scheduled {} projections", plan.len());

        let mut state = PolarizedState::from_input(input);
        for projection in plan.due(0) {
            state.project(&projection.modes, projection.count);
        }
        for (i, placement) in network.placements().iter().enumerate() {
            state.apply(placement)?;
            for projection in plan.due(i + 1) {
                state.project(&projection.modes, projection.count);
            }
            if state.num_terms() > self.max_terms {
                return Err(SimError::TooManyTerms {
                    terms: state.num_terms(),
                    limit: self.max_terms,
                });
            }
            if i > 0 && i % 100 == 0 {
                debug!("Applied {} elements, {} terms", i, state.num_terms());
            }
        }
        debug!("Final state has {} terms", state.num_terms());
        let mut probabilities = state.probabilities();
        if let Some(ps) = postselect {
            probabilities.retain(|outcome, _| ps.accepts(outcome));
        }
        Ok(probabilities)
    }

    /// Run a task synchronously.
    #[instrument(skip_all, fields(task = %task))]
    fn run_task(
        &self,
        network: &Network,
        input: &InputState,
        task: &Task,
    ) -> SimResult<ExecutionResult> {
        let start = Instant::now();

        let probabilities = self.simulate(network, input, task.postselect.as_ref())?;
        let acceptance = probabilities.values().sum::<f64>();
        if let Some(ps) = &task.postselect {
            debug!("Postselection {} accepts {:.6}", ps, acceptance);
        }

        let result = match task.kind {
            TaskKind::Probabilities => {
                let mut dist: Distribution = probabilities.into_iter().collect();
                dist.normalize();
                ExecutionResult::probabilities(dist)
            }
            TaskKind::Samples { shots } => {
                let counts = self.sample(&probabilities, shots, task)?;
                ExecutionResult::samples(counts)
            }
        };

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);
        Ok(result
            .with_acceptance(acceptance)
            .with_execution_time(elapsed.as_millis() as u64))
    }

    fn sample(
        &self,
        probabilities: &BTreeMap<FockState, f64>,
        shots: u32,
        task: &Task,
    ) -> SimResult<Counts> {
        let outcomes: Vec<&FockState> = probabilities.keys().collect();
        let weights = WeightedIndex::new(probabilities.values().copied()).map_err(|_| {
            SimError::NothingAccepted(
                task.postselect
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            )
        })?;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut tally = vec![0u64; outcomes.len()];
        for _ in 0..shots {
            tally[weights.sample(&mut rng)] += 1;
        }
        Ok(outcomes
            .into_iter()
            .zip(tally)
            .filter(|(_, n)| *n > 0)
            .map(|(state, n)| (state.clone(), n))
            .collect())
    }

    /// Snapshot of a job record, while it is retained.
    pub fn job(&self, job_id: &JobId) -> Option<Job> {
        self.lock_jobs().jobs.get(&job_id.0).map(|j| j.job.clone())
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, JobStore> {
        self.jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    #[instrument(skip(self, network, input))]
    async fn submit(&self, network: &Network, input: &InputState, task: &Task) -> HalResult<JobId> {
        if network.num_modes() > self.capabilities.max_modes as usize {
            return Err(HalError::NetworkTooLarge(format!(
                "Network has {} modes but simulator only supports {}",
                network.num_modes(),
                self.capabilities.max_modes
            )));
        }
        if let Some(shots) = task.shots() {
            HalError::check_samples(shots, self.capabilities.max_shots)?;
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::submitted(job_id.clone(), self.name(), task.clone());
        self.lock_jobs()
            .insert(job_id.0.clone(), SimJob { job, result: None });
        debug!("Submitted job: {}", job_id);

        // Simulation runs inline; the job is terminal before submit returns.
        let outcome = self.run_task(network, input, task);

        let mut store = self.lock_jobs();
        if let Some(sim_job) = store.jobs.get_mut(&job_id.0) {
            match outcome {
                Ok(result) => {
                    sim_job.job.complete(&result);
                    sim_job.result = Some(result);
                }
                Err(err) => {
                    debug!("Job {} failed: {}", job_id, err);
                    sim_job.job.transition(JobStatus::Failed(err.to_string()));
                    if !matches!(err, SimError::NothingAccepted(_)) {
                        store.jobs.remove(&job_id.0);
                        store.order.retain(|id| id != &job_id.0);
                        return Err(err.into());
                    }
                }
            }
        }
        store.evict(self.retained_jobs);

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.lock_jobs()
            .jobs
            .get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let store = self.lock_jobs();
        let sim_job = store
            .jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        match &sim_job.job.status {
            JobStatus::Failed(msg) => Err(HalError::JobFailed(msg.clone())),
            JobStatus::Cancelled => Err(HalError::JobCancelled),
            _ => sim_job
                .result
                .clone()
                .ok_or_else(|| HalError::JobNotFound(job_id.0.clone())),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut store = self.lock_jobs();
        let sim_job = store
            .jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        sim_job.job.transition(JobStatus::Cancelled);
        Ok(())
    }
}

/// Read a non-negative integer extra that must fit in `T`.
fn extra<T: TryFrom<u64>>(config: &BackendConfig, key: &str) -> HalResult<Option<T>> {
    match config.extra.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|v| T::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| {
                HalError::Configuration(format!("{key} is out of range or not an integer: {value}"))
            }),
    }
}

impl BackendFactory for SimulatorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_modes = extra::<u32>(&config, "max_modes")?.unwrap_or(DEFAULT_MAX_MODES);
        let seed = extra::<u64>(&config, "seed")?;
        let max_terms = extra::<usize>(&config, "max_terms")?.unwrap_or(DEFAULT_MAX_TERMS);
        Ok(Self::with_config(config, max_modes, seed).with_max_terms(max_terms))
    }
}
