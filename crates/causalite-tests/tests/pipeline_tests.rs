//! End-to-end pipeline tests against exact ground-truth oracles.

use causalite_core::metrics::{compare, structure_from_arcs};
use causalite_core::{CausalLearner, Checkpoint, LearnerConfig, NodeId, Variant};
use causalite_tests::DSeparationOracle;

fn n(id: u32) -> NodeId {
    NodeId(id)
}

fn learner(variant: Variant) -> CausalLearner {
    CausalLearner::new(variant, LearnerConfig::default())
}

#[test]
fn chain_is_recovered_as_a_chain() {
    // Ground truth 0 → 1 → 2. The skeleton must be 0—1, 1—2 with no 0—2
    // edge, and since 1 ∈ sepset(0, 2), the triple must not be oriented as
    // a collider at 1.
    let oracle = DSeparationOracle::new(3, &[(0, 1), (1, 2)]);
    let mut learner = learner(Variant::PcStable);
    let structure = learner
        .learn(oracle.nodes(), &oracle)
        .expect("chain should be learnable");

    assert_eq!(structure.arcs().count(), 2);
    assert!(!structure.exists_arc(n(0), n(2)));
    assert!(!structure.exists_arc(n(2), n(0)));
    assert!(
        !(structure.exists_arc(n(0), n(1)) && structure.exists_arc(n(2), n(1))),
        "no collider at the middle of the chain"
    );
    assert!(learner.sepsets().separates_via(n(0), n(2), n(1)));
}

#[test]
fn diamond_is_recovered_exactly() {
    // 0→1, 0→2, 1→3, 2→3: the collider at 3 is identifiable and R2
    // propagation plus completion recovers the generating DAG itself.
    let truth_arcs = [(0, 1), (0, 2), (1, 3), (2, 3)];
    let oracle = DSeparationOracle::new(4, &truth_arcs);
    let truth = structure_from_arcs(4, &truth_arcs).expect("truth is acyclic");

    let mut learner = learner(Variant::PcStable);
    let structure = learner
        .learn(oracle.nodes(), &oracle)
        .expect("diamond should be learnable");

    let result = compare(structure, &truth);
    assert_eq!(result.hamming, 0, "skeleton must match exactly");
    assert_eq!(result.structural_hamming, 0, "orientations must match exactly");
    assert_eq!(result.fscore, 1.0);
    assert_eq!(structure.arcs().collect::<Vec<_>>(), oracle.arcs());
}

#[test]
fn all_variants_find_the_identifiable_collider() {
    let oracle = DSeparationOracle::new(3, &[(0, 2), (1, 2)]);
    for variant in [
        Variant::Pc,
        Variant::PcStable,
        Variant::CcsOrientation,
        Variant::CcsSkeleton,
    ] {
        let mut learner = learner(variant);
        let structure = learner
            .learn(oracle.nodes(), &oracle)
            .expect("collider should be learnable");
        assert!(
            structure.exists_arc(n(0), n(2)) && structure.exists_arc(n(1), n(2)),
            "{variant:?} must orient the collider 0→2←1"
        );
        assert!(!structure.exists_arc(n(0), n(1)));
        assert!(!structure.exists_arc(n(1), n(0)));
    }
}

#[test]
fn learner_survives_a_robustness_loop() {
    // Thousands of learn calls on one instance must neither fail nor
    // drift; reset has to fully reinitialize owned state.
    let truth_arcs = [(0, 1), (0, 2), (1, 3), (2, 3)];
    let oracle = DSeparationOracle::new(4, &truth_arcs);

    for variant in [
        Variant::Pc,
        Variant::PcStable,
        Variant::CcsOrientation,
        Variant::CcsSkeleton,
    ] {
        let mut learner = learner(variant);
        let reference: Vec<_> = learner
            .learn(oracle.nodes(), &oracle)
            .expect("first learn")
            .arcs()
            .collect();
        for round in 0..500 {
            let arcs: Vec<_> = learner
                .learn(oracle.nodes(), &oracle)
                .unwrap_or_else(|e| panic!("{variant:?} failed at round {round}: {e}"))
                .arcs()
                .collect();
            assert_eq!(arcs, reference, "{variant:?} drifted at round {round}");
        }
    }
}

#[test]
fn variables_carry_the_configured_cardinality() {
    let oracle = DSeparationOracle::new(3, &[(0, 1), (1, 2)]);
    let config = LearnerConfig {
        nb_values: 4,
        ..LearnerConfig::default()
    };
    let mut learner = CausalLearner::new(Variant::PcStable, config);
    let structure = learner
        .learn(oracle.nodes(), &oracle)
        .expect("chain should be learnable");
    for node in structure.nodes() {
        assert_eq!(structure.cardinality(node), Some(4));
    }
}

#[test]
fn ccs_observer_reports_iteration_checkpoints() {
    use std::sync::{Arc, Mutex};

    let seen: Arc<Mutex<Vec<Checkpoint>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let oracle = DSeparationOracle::new(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);

    let mut learner = CausalLearner::new(Variant::CcsOrientation, LearnerConfig::default())
        .with_observer(Box::new(move |c, _| {
            sink.lock().expect("observer mutex").push(c)
        }));
    learner
        .learn(oracle.nodes(), &oracle)
        .expect("diamond should be learnable");

    let seen = seen.lock().expect("observer mutex");
    assert_eq!(seen.first(), Some(&Checkpoint::Initialized));
    assert_eq!(seen.last(), Some(&Checkpoint::Final));
    assert!(seen
        .iter()
        .any(|c| matches!(c, Checkpoint::ConsistencyIteration(_))));
}

#[test]
fn isolated_variables_stay_unconnected() {
    // Two disconnected chains: no cross edges may survive.
    let oracle = DSeparationOracle::new(4, &[(0, 1), (2, 3)]);
    let mut learner = learner(Variant::PcStable);
    let structure = learner
        .learn(oracle.nodes(), &oracle)
        .expect("disconnected truth should be learnable");

    for &(x, y) in &[(0u32, 2u32), (0, 3), (1, 2), (1, 3)] {
        assert!(!structure.exists_arc(n(x), n(y)));
        assert!(!structure.exists_arc(n(y), n(x)));
    }
}
