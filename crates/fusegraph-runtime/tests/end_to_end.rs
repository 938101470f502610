//! Compile graph programs, run them on the local simulator and compare the
//! postselected logical distribution with a direct graph-state calculation.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use fusegraph_compile::rail_operator;
use fusegraph_ir::{Graph, GraphProgram, NodeId};
use fusegraph_runtime::{Experiment, QueryOptions, RuntimeError, to_experiment};
use num_complex::Complex64;

const TOL: f64 = 1e-6;

fn program(
    nodes: &[u32],
    edges: &[(u32, u32)],
    angles: &[(u32, f64)],
    corrections: &[(u32, u8)],
    outputs: &[u32],
) -> GraphProgram {
    let graph = Graph::from_parts(nodes.iter().copied(), edges.iter().copied()).unwrap();
    let mut program = GraphProgram::new(graph).with_outputs(outputs.iter().copied());
    for &(node, angle) in angles {
        program = program.with_angle(node, angle);
    }
    for &(node, index) in corrections {
        program = program.with_correction(node, index);
    }
    program
}

fn bound(program: &GraphProgram) -> Experiment {
    let mut experiment = to_experiment(program).unwrap();
    experiment.bind_local(Some(2024));
    experiment
}

/// Logical output distribution of an ideal graph-state computation.
///
/// Prepares `|+>` on every node, applies CZ per edge and the correction
/// unitaries, then projects measured nodes onto `(|0> + e^{-iaπ}|1>)/√2`.
/// Bits are ordered as in `order`.
fn reference(program: &GraphProgram, order: &[NodeId]) -> BTreeMap<String, f64> {
    let nodes: Vec<NodeId> = program.graph.nodes().collect();
    let n = nodes.len();
    let index = |node: NodeId| nodes.iter().position(|&m| m == node).unwrap();

    let mut amps = vec![Complex64::new((0.5f64).powf(n as f64 / 2.0), 0.0); 1 << n];
    for (a, b) in program.graph.edges() {
        let (ia, ib) = (index(a), index(b));
        for (s, amp) in amps.iter_mut().enumerate() {
            if (s >> ia) & 1 == 1 && (s >> ib) & 1 == 1 {
                *amp = -*amp;
            }
        }
    }
    for (&node, &c) in &program.corrections {
        let u = rail_operator(usize::from(c)).unwrap().unitary();
        let i = index(node);
        let mut next = vec![Complex64::new(0.0, 0.0); 1 << n];
        for (s, amp) in amps.iter().enumerate() {
            let bit = (s >> i) & 1;
            for r in 0..2 {
                next[(s & !(1 << i)) | (r << i)] += u.get(r, bit) * amp;
            }
        }
        amps = next;
    }

    let measured: Vec<NodeId> = nodes
        .iter()
        .copied()
        .filter(|node| !program.is_output(*node))
        .collect();
    let mut grouped: BTreeMap<String, Complex64> = BTreeMap::new();
    for (s, amp) in amps.iter().enumerate() {
        let mut a = *amp;
        for &node in &measured {
            let angle = program.angles.get(&node).copied().unwrap_or(0.0);
            if (s >> index(node)) & 1 == 1 {
                a *= Complex64::from_polar(1.0, angle * PI);
            }
            a /= 2f64.sqrt();
        }
        let bits: String = order
            .iter()
            .map(|&o| if (s >> index(o)) & 1 == 1 { '1' } else { '0' })
            .collect();
        *grouped.entry(format!("|{bits}>")).or_default() += a;
    }
    let total: f64 = grouped.values().map(|a| a.norm_sqr()).sum();
    grouped
        .into_iter()
        .map(|(k, a)| (k, a.norm_sqr() / total))
        .filter(|(_, p)| *p > 1e-9)
        .collect()
}

async fn assert_matches_reference(program: GraphProgram, acceptance: f64) {
    let experiment = bound(&program);
    let order: Vec<NodeId> = experiment.readout_photons().iter().map(|p| p.node).collect();
    let expected = reference(&program, &order);

    let dist = experiment
        .probability_distribution(QueryOptions::default())
        .await
        .unwrap();
    for (label, p) in &expected {
        let got = dist.get(label).unwrap();
        assert!((got - p).abs() < TOL, "{label}: got {got}, expected {p}");
    }
    for (label, p) in dist.iter() {
        if !expected.contains_key(label) {
            assert!(p < TOL, "unexpected outcome {label} with {p}");
        }
    }
    assert!((dist.total() - 1.0).abs() < TOL);
    let got = dist.acceptance().unwrap();
    assert!(
        (got / acceptance - 1.0).abs() < TOL,
        "acceptance {got}, expected {acceptance}"
    );
}

#[tokio::test]
async fn test_single_node_always_zero() {
    let experiment = bound(&program(&[0], &[], &[], &[(0, 6)], &[0]));
    let dist = experiment
        .probability_distribution(QueryOptions::default())
        .await
        .unwrap();
    assert!((dist.get("|0>").unwrap() - 1.0).abs() < TOL);
    assert!(dist.get("|1>").map_or(true, |p| p < TOL));
}

#[tokio::test]
async fn test_bell_pair_is_correlated() {
    let experiment = bound(&program(&[0, 1], &[(0, 1)], &[], &[(1, 6)], &[0, 1]));
    let dist = experiment
        .probability_distribution(QueryOptions::default())
        .await
        .unwrap();
    assert!((dist.get("|00>").unwrap() - 0.5).abs() < TOL);
    assert!((dist.get("|11>").unwrap() - 0.5).abs() < TOL);
    for label in ["|01>", "|10>"] {
        assert!(dist.get(label).map_or(true, |p| p < TOL));
    }
    assert!((dist.acceptance().unwrap() - 0.5).abs() < TOL);
}

#[tokio::test]
async fn test_ghz_star_is_correlated() {
    let experiment = bound(&program(
        &[0, 1, 2],
        &[(0, 1), (0, 2)],
        &[],
        &[(1, 6), (2, 6)],
        &[0, 1, 2],
    ));
    let dist = experiment
        .probability_distribution(QueryOptions::default())
        .await
        .unwrap();
    assert!((dist.get("|000>").unwrap() - 0.5).abs() < TOL);
    assert!((dist.get("|111>").unwrap() - 0.5).abs() < TOL);
    assert!((dist.acceptance().unwrap() - 0.25).abs() < TOL);
}

#[tokio::test]
async fn test_measured_neighbour_in_x_basis() {
    assert_matches_reference(program(&[0, 1], &[(0, 1)], &[(0, 0.0)], &[], &[1]), 0.25).await;
}

#[tokio::test]
async fn test_measured_neighbour_in_y_basis() {
    assert_matches_reference(program(&[0, 1], &[(0, 1)], &[(0, 0.5)], &[], &[1]), 0.25).await;
}

#[tokio::test]
async fn test_measured_neighbour_at_quarter_turn() {
    let program = program(&[0, 1], &[(0, 1)], &[(0, 0.25)], &[], &[1]);
    let experiment = bound(&program);
    let dist = experiment
        .probability_distribution(QueryOptions::default())
        .await
        .unwrap();
    let cos = (PI / 4.0).cos();
    assert!((dist.get("|0>").unwrap() - (1.0 + cos) / 2.0).abs() < TOL);
    assert!((dist.get("|1>").unwrap() - (1.0 - cos) / 2.0).abs() < TOL);
    assert_matches_reference(program, 0.25).await;
}

#[tokio::test]
async fn test_three_node_path() {
    let program = program(&[0, 1, 2], &[(0, 1), (1, 2)], &[(0, 0.0), (1, 0.0)], &[], &[2]);
    assert_matches_reference(program, 0.0625).await;
}

#[tokio::test]
async fn test_fused_triangle() {
    let program = program(&[0, 1, 2], &[(0, 1), (1, 2), (0, 2)], &[(0, 0.0)], &[], &[1, 2]);
    let experiment = bound(&program);
    assert_eq!(experiment.witness_photons().len(), 2);
    assert_matches_reference(program, 0.00390625).await;
}

#[tokio::test]
async fn test_linear_chain_single_output() {
    let program = program(
        &[0, 1, 2, 3],
        &[(0, 1), (1, 2), (2, 3)],
        &[(0, 0.0), (1, 0.0), (2, 0.0)],
        &[],
        &[3],
    );
    assert_matches_reference(program, 0.015625).await;
}

#[tokio::test]
async fn test_linear_chain_two_outputs() {
    let program = program(
        &[0, 1, 2, 3],
        &[(0, 1), (1, 2), (2, 3)],
        &[(0, 0.5), (1, 0.25)],
        &[],
        &[2, 3],
    );
    let experiment = bound(&program);
    let dist = experiment
        .probability_distribution(QueryOptions::default())
        .await
        .unwrap();
    let cos = (PI / 4.0).cos();
    assert!((dist.get("|00>").unwrap() - (1.0 + cos) / 4.0).abs() < TOL);
    assert!((dist.get("|11>").unwrap() - (1.0 - cos) / 4.0).abs() < TOL);
    assert_matches_reference(program, 0.03125).await;
}

fn cycle(n: u32) -> Vec<(u32, u32)> {
    (0..n).map(|i| (i, (i + 1) % n)).collect()
}

fn path(n: u32) -> Vec<(u32, u32)> {
    (0..n - 1).map(|i| (i, i + 1)).collect()
}

#[tokio::test]
async fn test_five_node_path() {
    let nodes: Vec<u32> = (0..5).collect();
    let angles = [(0, 0.0), (1, 0.5), (2, 0.25), (3, 0.0)];
    let program = program(&nodes, &path(5), &angles, &[], &[4]);
    assert_matches_reference(program, 1.0 / 256.0).await;
}

#[tokio::test]
async fn test_six_node_path_two_outputs() {
    let nodes: Vec<u32> = (0..6).collect();
    let angles = [(0, 0.5), (1, 0.25), (2, 0.0), (3, 0.75)];
    let program = program(&nodes, &path(6), &angles, &[], &[4, 5]);
    assert_matches_reference(program, 1.0 / 512.0).await;
}

#[tokio::test]
async fn test_pentagon() {
    let nodes: Vec<u32> = (0..5).collect();
    let angles = [(0, 0.0), (1, 0.0), (2, 0.25)];
    let program = program(&nodes, &cycle(5), &angles, &[], &[3, 4]);
    let experiment = bound(&program);
    assert_eq!(experiment.photons().len(), 7);
    assert_eq!(experiment.witness_photons().len(), 2);

    let dist = experiment
        .probability_distribution(QueryOptions::default())
        .await
        .unwrap();
    let cos = (PI / 4.0).cos();
    assert!((dist.get("|00>").unwrap() - (1.0 + cos) / 4.0).abs() < TOL);
    assert!((dist.get("|01>").unwrap() - (1.0 - cos) / 4.0).abs() < TOL);
    assert_matches_reference(program, 1.0 / 4096.0).await;
}

#[tokio::test]
async fn test_hexagon_two_outputs() {
    let nodes: Vec<u32> = (0..6).collect();
    let program = program(&nodes, &cycle(6), &[], &[], &[4, 5]);
    let experiment = bound(&program);
    assert_eq!(experiment.photons().len(), 8);

    let dist = experiment
        .probability_distribution(QueryOptions::default())
        .await
        .unwrap();
    for label in ["|00>", "|01>", "|10>", "|11>"] {
        assert!((dist.get(label).unwrap() - 0.25).abs() < TOL, "{label}");
    }
    assert_matches_reference(program, 1.0 / 16384.0).await;
}

#[tokio::test]
async fn test_hexagon_three_outputs() {
    let nodes: Vec<u32> = (0..6).collect();
    let angles = [(1, 0.0), (2, 0.0), (3, 0.25)];
    let program = program(&nodes, &cycle(6), &angles, &[], &[0, 4, 5]);
    assert_matches_reference(program, 1.0 / 8192.0).await;
}

#[tokio::test]
async fn test_heptagon() {
    let nodes: Vec<u32> = (0..7).collect();
    let program = program(&nodes, &cycle(7), &[], &[], &[6]);
    let experiment = bound(&program);
    let dist = experiment
        .probability_distribution(QueryOptions::default())
        .await
        .unwrap();
    assert!((dist.get("|0>").unwrap() - 0.5).abs() < TOL);
    assert!((dist.get("|1>").unwrap() - 0.5).abs() < TOL);
    assert_matches_reference(program, 1.0 / 131072.0).await;
}

#[tokio::test]
async fn test_heptagon_with_measured_angles() {
    let nodes: Vec<u32> = (0..7).collect();
    let program = program(&nodes, &cycle(7), &[(1, 0.5), (3, 0.25)], &[], &[5, 6]);
    assert_matches_reference(program, 1.0 / 65536.0).await;
}

#[tokio::test]
async fn test_node_shared_by_three_clusters() {
    // Node 1 is a star leaf and sits on both halves of the cut triangle.
    let program = program(
        &[0, 1, 2, 3, 4, 5],
        &[(0, 1), (0, 2), (0, 3), (1, 4), (4, 5), (5, 1)],
        &[(0, 0.0), (1, 0.25), (2, 0.5), (3, 0.0)],
        &[],
        &[4, 5],
    );
    let experiment = bound(&program);
    assert_eq!(experiment.photons().len(), 9);
    let copies = experiment.photons().iter().filter(|p| p.node == NodeId(1)).count();
    assert_eq!(copies, 3);
    assert_eq!(experiment.witness_photons().len(), 3);

    let dist = experiment
        .probability_distribution(QueryOptions::default())
        .await
        .unwrap();
    let cos = (PI / 4.0).cos();
    assert!((dist.get("|00>").unwrap() - (1.0 + cos) / 4.0).abs() < TOL);
    assert!((dist.get("|01>").unwrap() - (1.0 - cos) / 4.0).abs() < TOL);
    assert_matches_reference(program, 1.0 / 65536.0).await;
}

#[tokio::test]
async fn test_samples_without_postselection_keep_every_shot() {
    let experiment = bound(&program(&[0, 1], &[(0, 1)], &[], &[(1, 6)], &[0, 1]));
    let counts = experiment.sample(1000, QueryOptions::raw()).await.unwrap();
    assert_eq!(counts.total(), 1000);
    assert!(counts.keys().all(|k| k.starts_with('|') && k.contains(',')));
}

#[tokio::test]
async fn test_postselected_samples_only_use_labels() {
    let experiment = bound(&program(&[0, 1], &[(0, 1)], &[], &[(1, 6)], &[0, 1]));
    let counts = experiment.sample(1000, QueryOptions::default()).await.unwrap();
    let labels: Vec<&String> = experiment.output_states().unwrap().values().collect();
    assert!(counts.keys().all(|k| labels.iter().any(|l| l.as_str() == k)));
    assert_eq!(counts.total(), 1000);
    assert!(counts.get("|00>").unwrap() > 400);
    assert!(counts.get("|11>").unwrap() > 400);
}

#[tokio::test]
async fn test_raw_distribution_keeps_rejected_outcomes() {
    let experiment = bound(&program(&[0, 1], &[(0, 1)], &[], &[(1, 6)], &[0, 1]));
    let raw = experiment
        .probability_distribution(QueryOptions::raw())
        .await
        .unwrap();
    assert!((raw.total() - 1.0).abs() < TOL);
    let accepted = experiment
        .probability_distribution(QueryOptions::raw().with_postselect(true))
        .await
        .unwrap();
    assert!(accepted.len() < raw.len());
    assert!(accepted.keys().all(|k| raw.contains(k)));
}

#[tokio::test]
async fn test_missing_label_fails_loudly() {
    let experiment = bound(&program(&[0, 1], &[(0, 1)], &[], &[(1, 6)], &[0, 1]));
    let dist = experiment
        .probability_distribution(QueryOptions::default())
        .await
        .unwrap();
    assert!(matches!(dist.get("|000>"), Err(RuntimeError::KeyNotFound(_))));
}

#[tokio::test]
async fn test_query_before_bind() {
    let experiment = to_experiment(&program(&[0, 1], &[(0, 1)], &[], &[], &[0, 1])).unwrap();
    let err = experiment
        .probability_distribution(QueryOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::NoBackend));
    assert!(matches!(
        experiment.sample(10, QueryOptions::default()).await,
        Err(RuntimeError::NoBackend)
    ));
}

#[tokio::test]
async fn test_backend_errors_propagate() {
    let mut experiment = to_experiment(&program(&[0, 1], &[(0, 1)], &[], &[(1, 6)], &[0, 1])).unwrap();
    experiment.bind_local(None);
    let err = experiment.sample(0, QueryOptions::default()).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Backend(_)));
}
