//! Simulation of networks produced by the compiler.

use fusegraph_adapter_sim::SimulatorBackend;
use fusegraph_compile::compile;
use fusegraph_hal::{Backend, Task};
use fusegraph_ir::{Graph, GraphProgram};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn test_single_node_with_correction_reads_zero() {
    let graph = Graph::from_parts([0u32], []).unwrap();
    let program = GraphProgram::new(graph)
        .with_correction(0u32, 6)
        .with_outputs([0u32]);
    let circuit = compile(&program).unwrap();

    let backend = SimulatorBackend::new();
    let task = Task::probabilities().with_postselect(circuit.postselection());
    let result = backend
        .run(&circuit.network, &circuit.input_state(), &task)
        .await
        .unwrap();
    let dist = result.distribution().unwrap();
    assert_eq!(dist.len(), 1);
    assert_close(dist.get("|0,1>"), 1.0);
}

#[tokio::test]
async fn test_bell_pair_is_correlated() {
    let graph = Graph::from_parts([0u32, 1], [(0, 1)]).unwrap();
    let program = GraphProgram::new(graph)
        .with_correction(1u32, 6)
        .with_outputs([0u32, 1]);
    let circuit = compile(&program).unwrap();

    let backend = SimulatorBackend::new();
    let task = Task::probabilities().with_postselect(circuit.postselection());
    let result = backend
        .run(&circuit.network, &circuit.input_state(), &task)
        .await
        .unwrap();
    let dist = result.distribution().unwrap();
    assert_close(dist.get("|0,1,0,1>"), 0.5);
    assert_close(dist.get("|1,0,1,0>"), 0.5);
    assert_close(result.acceptance.unwrap(), 0.5);
}

#[tokio::test]
async fn test_unpostselected_probabilities_sum_to_one() {
    let graph = Graph::from_parts([0u32, 1, 2, 3, 4], [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)])
        .unwrap();
    let program = GraphProgram::new(graph)
        .with_angle(0u32, 0.25)
        .with_outputs([3u32]);
    let circuit = compile(&program).unwrap();
    assert_eq!(circuit.num_photons(), 7);

    let backend = SimulatorBackend::new();
    let result = backend
        .run(&circuit.network, &circuit.input_state(), &Task::probabilities())
        .await
        .unwrap();
    assert_close(result.distribution().unwrap().total(), 1.0);
}

#[tokio::test]
async fn test_ghz3_samples() {
    let graph = Graph::from_parts([0u32, 1, 2], [(0, 1), (0, 2)]).unwrap();
    let program = GraphProgram::new(graph)
        .with_correction(1u32, 6)
        .with_correction(2u32, 6)
        .with_outputs([0u32, 1, 2]);
    let circuit = compile(&program).unwrap();

    let backend = SimulatorBackend::new().with_seed(11);
    let task = Task::samples(1000).with_postselect(circuit.postselection());
    let result = backend
        .run(&circuit.network, &circuit.input_state(), &task)
        .await
        .unwrap();
    let counts = result.counts().unwrap();
    assert_eq!(counts.total_shots(), 1000);
    let zeros = counts.get("|0,1,0,1,0,1>");
    let ones = counts.get("|1,0,1,0,1,0>");
    assert_eq!(zeros + ones, 1000);
    assert!(zeros > 400 && ones > 400);
}

#[test]
fn test_early_postselection_matches_final_filter() {
    let graph = Graph::from_parts([0u32, 1, 2, 3, 4], [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)])
        .unwrap();
    let program = GraphProgram::new(graph)
        .with_angle(0u32, 0.25)
        .with_angle(2u32, 0.5)
        .with_correction(4u32, 9)
        .with_outputs([3u32]);
    let circuit = compile(&program).unwrap();
    let postselect = circuit.postselection();

    let backend = SimulatorBackend::new();
    let input = circuit.input_state();
    let mut late = backend.simulate(&circuit.network, &input, None).unwrap();
    late.retain(|outcome, _| postselect.accepts(outcome));
    let early = backend
        .simulate(&circuit.network, &input, Some(&postselect))
        .unwrap();

    assert_eq!(early.len(), late.len());
    for (outcome, p) in &late {
        assert_close(early[outcome], *p);
    }
}

#[tokio::test]
async fn test_star_joined_to_path_fits_in_memory() {
    // GHZ(5) fused to LINEAR(6): 11 photons over 22 modes.
    let graph = Graph::from_parts(
        0u32..10,
        [(0, 1), (0, 2), (0, 3), (0, 4), (4, 5), (5, 6), (6, 7), (7, 8), (8, 9)],
    )
    .unwrap();
    let program = GraphProgram::new(graph).with_outputs([9u32]);
    let circuit = compile(&program).unwrap();
    assert_eq!(circuit.num_photons(), 11);
    assert_eq!(circuit.network.num_modes(), 22);

    let backend = SimulatorBackend::new().with_max_terms(1 << 16);
    let task = Task::probabilities().with_postselect(circuit.postselection());
    let result = backend
        .run(&circuit.network, &circuit.input_state(), &task)
        .await
        .unwrap();
    let dist = result.distribution().unwrap();
    assert!(!dist.is_empty() && dist.len() <= 2);
    assert_close(dist.total(), 1.0);
    let acceptance = result.acceptance.unwrap();
    assert!(acceptance > 0.0 && acceptance < 1.0);
}
