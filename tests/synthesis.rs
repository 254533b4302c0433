use test_log::test;

use nor_synth::circuit::{Circuit, Node};
use nor_synth::encoding::Encoding;
use nor_synth::error::Error;
use nor_synth::search::{search, search_report, SearchConfig};
use nor_synth::synth::{solve, synthesize, Problem, SynthesisConfig};
use nor_synth::truth_table::TruthTable;
use nor_synth::types::{max_nodes, Kind};

fn config(max_depth: u32) -> SynthesisConfig {
    SynthesisConfig {
        max_depth,
        ..SynthesisConfig::default()
    }
}

fn parallel(split_at: usize) -> SearchConfig {
    SearchConfig {
        parallel: true,
        split_at,
        ..SearchConfig::default()
    }
}

/// Every solution must be legal, fill exactly the depth's slots, and reproduce the target.
fn check_solution(target: &TruthTable, encoding: &Encoding, gates: usize) {
    assert!(encoding.is_legal_complete());
    assert_eq!(encoding.len(), max_nodes(encoding.depth()));
    assert_eq!(encoding.gate_count(), gates);

    let circuit = Circuit::decode(encoding).unwrap();
    assert_eq!(circuit.gate_count(), gates);
    assert!(circuit.depth() <= encoding.depth());

    let output = circuit.evaluate_root();
    assert_eq!(output.len(), 1 << target.num_inputs());
    assert_eq!(&output, target);
}

#[test]
fn test_two_input_nor() {
    let target = TruthTable::parse(2, "1000").unwrap();
    let solution = synthesize(&target, &config(4)).unwrap();

    assert_eq!(solution.depth, 1);
    assert_eq!(solution.gate_count, 1);
    check_solution(&target, &solution.encoding, 1);

    let root = solution.encoding.cell(0).unwrap();
    assert_eq!(root.kind, Kind::Nor);
    let circuit = solution.circuit().unwrap();
    let Node::Nor(l, r) = circuit.node(circuit.root()) else {
        panic!("root is not a gate");
    };
    let mut inputs = [circuit.node(l), circuit.node(r)];
    inputs.sort_by_key(|n| match n {
        Node::Input(k) => *k,
        Node::Nor(..) => u32::MAX,
    });
    assert_eq!(inputs, [Node::Input(1), Node::Input(2)]);
}

#[test]
fn test_xor_needs_depth_three() {
    let target = TruthTable::parse(2, "0110").unwrap();
    for depth in 0..3 {
        assert_eq!(
            search(&target, depth, &SearchConfig::default()).unwrap_err(),
            Error::NoSolutionAtDepth(depth)
        );
    }

    let solution = synthesize(&target, &config(4)).unwrap();
    assert_eq!(solution.depth, 3);
    assert_eq!(solution.gate_count, 5);
    check_solution(&target, &solution.encoding, 5);
}

#[test]
fn test_xor_fails_below_depth_three() {
    let target = TruthTable::parse(2, "0110").unwrap();
    assert_eq!(
        synthesize(&target, &config(3)).unwrap_err(),
        Error::SynthesisFailed { max_depth: 3 }
    );
}

#[test]
fn test_inputs_and_inversions() {
    for n in 1..=3 {
        for k in 1..=n {
            let x = nor_synth::truth_table::column(k, n);
            let solution = synthesize(&x, &config(4)).unwrap();
            assert_eq!((solution.depth, solution.gate_count), (0, 0));
            check_solution(&x, &solution.encoding, 0);

            let not_x = x.nor(&x);
            let solution = synthesize(&not_x, &config(4)).unwrap();
            assert_eq!((solution.depth, solution.gate_count), (1, 1));
            check_solution(&not_x, &solution.encoding, 1);
        }
    }
}

#[test]
fn test_and_and_or() {
    // AND(x1, x2) = NOR(NOT x1, NOT x2)
    let and = TruthTable::parse(2, "0001").unwrap();
    let solution = synthesize(&and, &config(4)).unwrap();
    assert_eq!((solution.depth, solution.gate_count), (2, 3));
    check_solution(&and, &solution.encoding, 3);

    // OR(x1, x2) = NOT NOR(x1, x2), two copies of the inner gate
    let or = TruthTable::parse(2, "0111").unwrap();
    let solution = synthesize(&or, &config(4)).unwrap();
    assert_eq!((solution.depth, solution.gate_count), (2, 3));
    check_solution(&or, &solution.encoding, 3);
}

#[test]
fn test_constants() {
    let zero = TruthTable::constant(1, false).unwrap();
    let solution = synthesize(&zero, &config(4)).unwrap();
    assert_eq!((solution.depth, solution.gate_count), (2, 2));
    check_solution(&zero, &solution.encoding, 2);
}

#[test]
fn test_deterministic() {
    let target = TruthTable::parse(2, "0001").unwrap();
    let a = synthesize(&target, &config(4)).unwrap();
    let b = synthesize(&target, &config(4)).unwrap();
    assert_eq!(a.encoding, b.encoding);
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn test_gate_count_monotone_in_depth() {
    let cases = [("1000", 1..4), ("0001", 2..4), ("0111", 2..4)];
    for (bits, depths) in cases {
        let target = TruthTable::parse(2, bits).unwrap();
        let mut previous = usize::MAX;
        for depth in depths {
            let best = search(&target, depth, &SearchConfig::default()).unwrap();
            check_solution(&target, &best.encoding, best.gate_count);
            assert!(best.gate_count <= previous, "{} got worse at depth {}", bits, depth);
            previous = best.gate_count;
        }
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let targets = [(2, "0110", 3), (2, "0001", 2), (3, "11000000", 2), (1, "00", 2)];
    for (n, bits, depth) in targets {
        let target = TruthTable::parse(n, bits).unwrap();
        let sequential = search_report(&target, depth, &SearchConfig::default()).unwrap();
        for split_at in [1, 2, 4] {
            let report = search_report(&target, depth, &parallel(split_at)).unwrap();
            assert_eq!(report.best, sequential.best, "{} split at {}", bits, split_at);
        }
    }
}

#[test]
fn test_solve_problem_text() {
    let problem: Problem = "2\n1 0 0 0\n".parse().unwrap();
    let solution = solve(&problem, &SynthesisConfig::default()).unwrap();
    assert_eq!(solution.to_string(), "2 1 1\n1 -1 2 3\n2 1 0 0\n3 2 0 0\n");

    let problem: Problem = "2 0110 2".parse().unwrap();
    assert_eq!(
        solve(&problem, &SynthesisConfig::default()).unwrap_err(),
        Error::SynthesisFailed { max_depth: 2 }
    );
}

#[test]
fn test_every_two_input_function() {
    // All 16 functions of two inputs are reachable within depth 4.
    for value in 0u32..16 {
        let target = TruthTable::from_fn(2, |row| (value >> (3 - row)) & 1 == 1).unwrap();
        let solution = synthesize(&target, &config(5)).unwrap();
        check_solution(&target, &solution.encoding, solution.gate_count);
    }
}
