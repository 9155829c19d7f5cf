use approx::assert_relative_eq;
use cohort_core::{Precision, TimeSpan};
use cohort_engine::{Engine, EngineConfig, Error, RowStatus};
use cohort_observers::{ObserverConfig, ObserverKind};
use cohort_solvers::{SolverConfig, StepFailure, Stepper};
use integration_tests::test_systems::{
    Oscillator, blow_up, decay_problem, device, ornstein_uhlenbeck, ornstein_uhlenbeck_problem,
};
use ndarray::{Array2, ShapeBuilder, array};

fn oscillator_engine(observer: ObserverKind, stepper: Stepper) -> Engine<Oscillator> {
    let config = EngineConfig {
        stepper,
        observer,
        precision: Precision::Double,
        seed: 0,
    };
    Engine::new(device(), Oscillator::problem(), Oscillator, config).expect("should build")
}

fn span(start: f64, end: f64) -> TimeSpan {
    TimeSpan::new(start, end).unwrap()
}

#[test]
fn output_shape_follows_ensemble_and_features() {
    let mut engine = oscillator_engine(ObserverKind::BasicAll, Stepper::Rk4);
    let n = 37;
    let x0 = Array2::from_shape_fn((n, 2), |(i, j)| if j == 0 { 1.0 + i as f64 } else { 0.0 });
    let params = Array2::from_elem((n, 1), 2.0);

    engine
        .initialize(
            span(0.0, 3.0),
            x0.view(),
            params.view(),
            SolverConfig::default().dt(0.01),
            ObserverConfig::default(),
        )
        .unwrap();

    let run = engine.features(true).unwrap();
    assert_eq!(run.values.dim(), (n, engine.feature_names().len()));
    assert_eq!(run.values.ncols(), 7);
    assert_eq!(run.final_state.dim(), (n, 2));
    assert_eq!(engine.final_aux().unwrap().dim(), (n, 1));
    assert_eq!(engine.len(), n);

    // Energy is conserved by the oscillator.
    let aux = engine.final_aux().unwrap();
    for i in 0..n {
        let a = 1.0 + i as f64;
        assert_relative_eq!(aux[[i, 0]], 2.0 * a * a, max_relative = 1e-6);
    }
}

#[test]
fn mismatched_shapes_fail_before_running() {
    let mut engine = oscillator_engine(ObserverKind::Basic, Stepper::Rk4);

    let err = engine
        .initialize(
            span(0.0, 1.0),
            array![[1.0, 0.0, 0.0]].view(),
            array![[1.0]].view(),
            SolverConfig::default(),
            ObserverConfig::default(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ShapeMismatch {
            buffer: "x0",
            expected: [1, 2],
            found: [1, 3]
        }
    ));

    let err = engine
        .initialize(
            span(0.0, 1.0),
            array![[1.0, 0.0]].view(),
            Array2::<f64>::zeros((1, 0)).view(),
            SolverConfig::default(),
            ObserverConfig::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { buffer: "params", .. }));

    assert!(matches!(engine.features(true), Err(Error::NotInitialized)));
}

#[test]
fn column_major_input_matches_row_major() {
    let rows = array![[1.0, 0.0], [0.5, 0.5], [2.0, -1.0], [0.1, 0.0]];
    let params = array![[1.0], [2.0], [0.5], [3.0]];

    let mut column_major = Array2::zeros((4, 2).f());
    column_major.assign(&rows);
    let transposed_params = params.t().to_owned();

    let run = |x0: ndarray::ArrayView2<'_, f64>, p: ndarray::ArrayView2<'_, f64>| {
        let mut engine =
            oscillator_engine(ObserverKind::ThresholdCrossing, Stepper::DormandPrince5);
        engine
            .initialize(
                span(0.0, 20.0),
                x0,
                p,
                SolverConfig::default(),
                ObserverConfig::default().rejection(0.1, 0.1),
            )
            .unwrap();
        engine.features(true).unwrap()
    };

    let a = run(rows.view(), params.view());
    let b = run(column_major.view(), transposed_params.t());

    assert_eq!(a.final_state, b.final_state);
    for (x, y) in a.values.iter().zip(b.values.iter()) {
        assert!(x == y || (x.is_nan() && y.is_nan()));
    }
}

#[test]
fn repeated_feature_runs_are_identical() {
    let mut engine = oscillator_engine(ObserverKind::Derivative, Stepper::DormandPrince5);
    engine
        .initialize(
            span(0.0, 30.0),
            array![[1.0, 0.0], [3.0, 1.0]].view(),
            array![[1.0], [0.7]].view(),
            SolverConfig::default().tolerances(1e-9, 1e-9),
            ObserverConfig::default(),
        )
        .unwrap();
    engine.transient().unwrap();

    let first = engine.features(true).unwrap();
    let second = engine.features(true).unwrap();

    assert_eq!(first.values, second.values);
    assert_eq!(first.final_state, second.final_state);
}

#[test]
fn same_seed_reproduces_noisy_ensemble() {
    let build = |seed| {
        let config = EngineConfig {
            stepper: Stepper::Euler,
            observer: ObserverKind::Basic,
            precision: Precision::Double,
            seed,
        };
        let mut engine = Engine::new(
            device(),
            ornstein_uhlenbeck_problem(),
            ornstein_uhlenbeck,
            config,
        )
        .unwrap();
        engine
            .initialize(
                span(0.0, 5.0),
                Array2::zeros((64, 1)).view(),
                Array2::from_shape_fn((64, 2), |(_, j)| if j == 0 { 1.0 } else { 0.5 }).view(),
                SolverConfig::default().dt(0.01),
                ObserverConfig::default(),
            )
            .unwrap();
        engine
    };

    let mut a = build(42);
    let mut b = build(42);
    let mut c = build(43);

    let (ra, rb, rc) = (
        a.features(true).unwrap(),
        b.features(true).unwrap(),
        c.features(true).unwrap(),
    );
    assert_eq!(ra.values, rb.values);
    assert_ne!(ra.values, rc.values);

    // Trajectories draw from distinct streams.
    assert_ne!(ra.final_state[[0, 0]], ra.final_state[[1, 0]]);

    // The streams continue across runs, and reseeding restarts them.
    let next = a.features(true).unwrap();
    assert_ne!(next.values, ra.values);
    a.seed_rng(42);
    let reseeded = a.features(true).unwrap();
    assert_eq!(reseeded.values, ra.values);
}

#[test]
fn noise_reaches_stationary_variance() {
    let config = EngineConfig {
        stepper: Stepper::Euler,
        observer: ObserverKind::Basic,
        precision: Precision::Double,
        seed: 2024,
    };
    let mut engine =
        Engine::new(device(), ornstein_uhlenbeck_problem(), ornstein_uhlenbeck, config).unwrap();

    let n = 2000;
    engine
        .initialize(
            span(0.0, 10.0),
            Array2::zeros((n, 1)).view(),
            Array2::from_shape_fn((n, 2), |_| 1.0).view(),
            SolverConfig::default().dt(0.01),
            ObserverConfig::default(),
        )
        .unwrap();
    engine.transient().unwrap();

    let x = engine.final_state().unwrap();
    let mean = x.mean().unwrap();
    let var = x.var(1.0);

    assert!(mean.abs() < 0.06, "mean {mean}");
    assert!((var - 0.5).abs() < 0.08, "variance {var}");
}

#[test]
fn blow_up_is_isolated_to_its_row() {
    let config = EngineConfig {
        stepper: Stepper::Rk4,
        observer: ObserverKind::Basic,
        precision: Precision::Double,
        seed: 0,
    };
    let mut engine = Engine::new(device(), decay_problem(), blow_up, config).unwrap();
    engine
        .initialize(
            span(0.0, 3.0),
            array![[1.0], [1.0], [1.0]].view(),
            array![[0.0], [1.0], [0.1]].view(),
            SolverConfig::default().dt(0.01),
            ObserverConfig::default(),
        )
        .unwrap();

    let run = engine.features(true).unwrap();

    assert_eq!(run.failed(), 1);
    assert_eq!(run.status[0], RowStatus::Complete);
    assert_eq!(run.status[2], RowStatus::Complete);
    match run.status[1] {
        RowStatus::Failed(StepFailure::NonFinite { t }) => assert!(t > 0.9 && t < 1.1, "t = {t}"),
        other => panic!("unexpected status {other:?}"),
    }

    assert!(run.values.row(1).iter().all(|v| v.is_nan()));
    assert!(run.values.row(0).iter().all(|v| v.is_finite()));
    assert!(run.values.row(2).iter().all(|v| v.is_finite()));

    // x' = 0.1 x² from 1 gives x(3) = 1 / (1 - 0.3).
    assert_relative_eq!(run.values[[2, 0]], 1.0 / 0.7, max_relative = 1e-8);
    assert_eq!(run.values[[0, 0]], 1.0);
}

#[test]
fn shift_and_reinitialize_resumes() {
    let config = EngineConfig {
        stepper: Stepper::Rk4,
        observer: ObserverKind::Basic,
        precision: Precision::Double,
        seed: 0,
    };
    let solver = SolverConfig::default().dt(0.01);
    let x0 = array![[1.0, 0.0], [0.0, 2.0]];
    let params = array![[1.0], [3.0]];

    let mut whole = Engine::new(device(), Oscillator::problem(), Oscillator, config).unwrap();
    whole
        .initialize(span(0.0, 2.0), x0.view(), params.view(), solver, ObserverConfig::default())
        .unwrap();
    whole.transient().unwrap();

    let mut parts = Engine::new(device(), Oscillator::problem(), Oscillator, config).unwrap();
    parts
        .initialize(span(0.0, 1.0), x0.view(), params.view(), solver, ObserverConfig::default())
        .unwrap();
    parts.transient().unwrap();
    parts.shift_initial_state().unwrap();
    let resumed = parts.initial_state().unwrap();
    parts
        .initialize(
            span(1.0, 2.0),
            resumed.view(),
            params.view(),
            solver,
            ObserverConfig::default(),
        )
        .unwrap();
    parts.transient().unwrap();

    let expected = whole.final_state().unwrap();
    let found = parts.final_state().unwrap();
    for (a, b) in expected.iter().zip(found.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-10);
    }
    assert_relative_eq!(found[[0, 0]], 2.0_f64.cos(), epsilon = 1e-8);
}

#[test]
fn single_precision_stores_f32_values() {
    let config = EngineConfig {
        stepper: Stepper::Rk4,
        observer: ObserverKind::Basic,
        precision: Precision::Single,
        seed: 0,
    };
    let mut engine = Engine::new(device(), Oscillator::problem(), Oscillator, config).unwrap();
    engine
        .initialize(
            span(0.0, 1.0),
            array![[0.1, 0.2]].view(),
            array![[1.3]].view(),
            SolverConfig::default().dt(0.01),
            ObserverConfig::default(),
        )
        .unwrap();

    let run = engine.features(true).unwrap();
    for v in run.final_state.iter().chain(run.values.iter()) {
        assert_eq!(*v, f64::from(*v as f32));
    }
    assert_eq!(engine.initial_state().unwrap()[[0, 0]], f64::from(0.1_f32));
}
