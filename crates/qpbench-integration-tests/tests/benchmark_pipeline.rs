use nalgebra::{DMatrix, DVector};
use qpbench_results::{BenchmarkConfig, Metric, ResultsStore, StoreOptions};
use qpbench_types::{Problem, QpProblem, Solution};
use qpbench_validation::{is_valid_dual_solution, is_valid_primal_solution, QpSolution};

/// minimize 0.5 x^T diag(d) x + q^T x subject to lb <= x <= ub
fn box_qp(name: &str, d: &[f64], q: &[f64], lb: &[f64], ub: &[f64]) -> QpProblem {
    QpProblem::new(
        name,
        DMatrix::from_diagonal(&DVector::from_row_slice(d)),
        DVector::from_row_slice(q),
    )
    .with_bounds(
        Some(DVector::from_row_slice(lb)),
        Some(DVector::from_row_slice(ub)),
    )
}

fn test_problems() -> Vec<QpProblem> {
    vec![
        box_qp("BOX1", &[1.0, 1.0], &[-2.0, 0.5], &[0.0, 0.0], &[1.0, 1.0]),
        box_qp("BOX2", &[2.0, 4.0, 1.0], &[1.0, -1.0, -0.5], &[-1.0, -1.0, -1.0], &[1.0, 1.0, 1.0]),
        box_qp("BOX3", &[1.0], &[-10.0], &[-5.0], &[5.0]),
    ]
}

/// Closed-form primal-dual solution of a diagonal box QP
fn exact_solve(problem: &QpProblem) -> QpSolution {
    let (lb, ub) = (problem.lb.as_ref().unwrap(), problem.ub.as_ref().unwrap());
    let n = problem.num_vars();
    let x = DVector::from_fn(n, |i, _| {
        (-problem.q[i] / problem.p[(i, i)]).clamp(lb[i], ub[i])
    });
    let y = DVector::from_fn(n, |i, _| -(problem.p[(i, i)] * x[i] + problem.q[i]));
    QpSolution::evaluate(problem, Some(true), Some(x), Some(y)).unwrap()
}

/// Claims success with a perturbed primal and no dual
fn sloppy_solve(problem: &QpProblem) -> QpSolution {
    let exact = exact_solve(problem);
    let x = exact.x().unwrap().add_scalar(0.01);
    QpSolution::evaluate(problem, Some(true), Some(x), None).unwrap()
}

const CONFIG: &str = r#"{
    "time_limit": 10.0,
    "runtime_shift": 1.0,
    "tolerances": {
        "default": {"primal": 1e-6, "dual": 1e-6, "gap": 1e-6},
        "low_accuracy": {"primal": 1e-1, "dual": 1e-1, "gap": 1e-1}
    }
}"#;

#[test]
fn test_exact_solutions_pass_validation() {
    for problem in test_problems() {
        let solution = exact_solve(&problem);
        let x = solution.x().unwrap();
        let y = solution.y().unwrap();

        assert!(is_valid_primal_solution(&problem, x, 1e-9).unwrap());
        assert!(is_valid_dual_solution(&problem, y, x, 1e-9).unwrap());
        assert!(solution.duality_gap() < 1e-9, "{}", problem.name());
    }
}

#[test]
fn test_full_benchmark_pipeline() {
    let config = BenchmarkConfig::from_json_str(CONFIG).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("box_qps.csv");
    let options = StoreOptions::default().with_objective_val().with_primal_sol();
    let problems = test_problems();

    // First pass: run everything and persist
    {
        let mut store = ResultsStore::open(&path, "box_qps", options).unwrap();
        for settings in config.tolerances.keys() {
            for problem in &problems {
                store.update(problem, "exact", settings, &exact_solve(problem), 0.5);
                store.update(problem, "sloppy", settings, &sloppy_solve(problem), 0.1);

                // "stalls" only finishes the smallest problem
                if problem.num_vars() == 1 {
                    store.update(problem, "stalls", settings, &exact_solve(problem), 2.0);
                } else {
                    store.update(
                        problem,
                        "stalls",
                        settings,
                        &QpSolution::not_found(),
                        config.time_limit,
                    );
                }
            }
        }
        store.write().unwrap();
        assert_eq!(store.len(), 2 * 3 * 3);
    }

    // Second pass: resume from disk, skipping known runs
    let mut store = ResultsStore::open(&path, "box_qps", options).unwrap();
    assert_eq!(store.len(), 18);
    for problem in &problems {
        assert!(store.has(problem, "exact", "default"));
        let timed_out = store
            .is_timeout(problem, "stalls", "default", config.time_limit)
            .unwrap();
        assert_eq!(timed_out, problem.num_vars() != 1);
    }

    // Rerunning a known key replaces it
    store.update(&problems[0], "exact", "default", &exact_solve(&problems[0]), 0.4);
    assert_eq!(store.len(), 18);

    let failed = store.get("BOX2", "stalls", "default").unwrap();
    assert!(!failed.found);
    assert_eq!(failed.objective_val, Some(f64::INFINITY));
    assert_eq!(failed.primal_sol, Some(vec![f64::INFINITY]));

    let stats = store.statistics();
    let (primal, dual, gap) = (
        config.primal_tolerances(),
        config.dual_tolerances(),
        config.gap_tolerances(),
    );

    let success = stats.success_rate(&primal, &dual, &gap).unwrap();
    assert_eq!(success.solvers(), ["exact", "sloppy", "stalls"]);
    assert_eq!(success.settings(), ["default", "low_accuracy"]);
    assert_eq!(success.get("exact", "default"), Some(100.0));
    assert_eq!(success.get("sloppy", "default"), Some(0.0));
    assert!((success.get("stalls", "default").unwrap() - 100.0 / 3.0).abs() < 1e-12);

    let correct = stats.correct_rate(&primal, &dual, &gap).unwrap();
    assert_eq!(correct.get("exact", "default"), Some(100.0));
    // Sloppy always claims a success it never delivers
    assert_eq!(correct.get("sloppy", "default"), Some(0.0));
    // Stalls reports its failures honestly
    assert_eq!(correct.get("stalls", "default"), Some(100.0));

    let runtime = stats
        .shifted_geometric_mean(Metric::Runtime, config.runtime_shift, &config.runtime_penalties())
        .unwrap();
    for settings in runtime.settings() {
        assert_eq!(runtime.get("sloppy", settings), Some(1.0));
        assert!(runtime.get("exact", settings).unwrap() > 1.0);
        assert!(runtime.get("stalls", settings).unwrap() > runtime.get("exact", settings).unwrap());
    }
}
