use std::f64::consts::TAU;

use approx::assert_relative_eq;
use cohort_core::{Precision, TimeSpan};
use cohort_engine::{Engine, EngineConfig, FeatureRun};
use cohort_observers::{ObserverConfig, ObserverKind};
use cohort_solvers::{SolverConfig, Stepper};
use integration_tests::test_systems::{Oscillator, decay, decay_problem, device};
use ndarray::array;

/// Column of a named feature.
fn col(engine: &Engine<Oscillator>, name: &str) -> usize {
    engine
        .feature_names()
        .iter()
        .position(|n| n == name)
        .unwrap_or_else(|| panic!("no feature named {name}"))
}

/// Oscillators `x = A cos(ω t)` for each `(A, ω)`, measured after a transient
/// of the same duration.
fn oscillators(
    observer: ObserverKind,
    config: ObserverConfig,
    cases: &[(f64, f64)],
    duration: f64,
) -> (Engine<Oscillator>, FeatureRun) {
    let engine_config = EngineConfig {
        stepper: Stepper::DormandPrince5,
        observer,
        precision: Precision::Double,
        seed: 0,
    };
    let mut engine =
        Engine::new(device(), Oscillator::problem(), Oscillator, engine_config).unwrap();

    let x0 = ndarray::Array2::from_shape_fn((cases.len(), 2), |(i, j)| {
        if j == 0 { cases[i].0 } else { 0.0 }
    });
    let params = ndarray::Array2::from_shape_fn((cases.len(), 1), |(i, _)| cases[i].1);

    engine
        .initialize(
            TimeSpan::new(0.0, duration).unwrap(),
            x0.view(),
            params.view(),
            SolverConfig::default()
                .dt(1e-3)
                .dtmax(0.01)
                .tolerances(1e-10, 1e-10),
            config,
        )
        .unwrap();
    engine.transient().unwrap();
    engine.shift_initial_state().unwrap();
    let run = engine.features(true).unwrap();
    (engine, run)
}

#[test]
fn threshold_crossing_measures_sinusoid() {
    let cases = [(2.0, 1.0), (1.5, 2.0), (3.0, 0.5)];
    let (engine, run) = oscillators(
        ObserverKind::ThresholdCrossing,
        ObserverConfig::default(),
        &cases,
        60.0,
    );

    let (period, amplitude, count) = (
        col(&engine, "period mean"),
        col(&engine, "amplitude mean"),
        col(&engine, "event count"),
    );

    for (i, &(a, omega)) in cases.iter().enumerate() {
        let p = TAU / omega;
        assert_relative_eq!(run.values[[i, period]], p, max_relative = 1e-3);
        assert_relative_eq!(run.values[[i, amplitude]], a, max_relative = 1e-3);

        // One event per period after the reference crossing.
        let expected = (60.0 / p).floor() - 1.0;
        assert!((run.values[[i, count]] - expected).abs() <= 1.0);
    }
}

#[test]
fn derivative_measures_peak_to_trough() {
    let cases = [(2.0, 1.0), (1.0, 3.0)];
    let (engine, run) =
        oscillators(ObserverKind::Derivative, ObserverConfig::default(), &cases, 40.0);

    for (i, &(a, omega)) in cases.iter().enumerate() {
        assert_relative_eq!(
            run.values[[i, col(&engine, "period mean")]],
            TAU / omega,
            max_relative = 1e-3
        );
        assert_relative_eq!(
            run.values[[i, col(&engine, "amplitude mean")]],
            2.0 * a,
            max_relative = 1e-3
        );
        assert!(run.values[[i, col(&engine, "period variance")]] < 1e-4);
    }
}

#[test]
fn neighbourhood_finds_recurrence() {
    let cases = [(1.0, 1.0), (2.0, 1.5)];
    let config = ObserverConfig::default().neighbourhood_radius(0.1);
    let (engine, run) = oscillators(ObserverKind::Neighbourhood, config, &cases, 40.0);

    for (i, &(a, omega)) in cases.iter().enumerate() {
        assert_relative_eq!(
            run.values[[i, col(&engine, "period mean")]],
            TAU / omega,
            max_relative = 1e-3
        );
        assert_relative_eq!(
            run.values[[i, col(&engine, "amplitude mean")]],
            2.0 * a,
            max_relative = 1e-3
        );
    }
}

#[test]
fn split_windows_accumulate_like_one_run() {
    // Each window ends inside the return ball, just before a closest
    // approach that only the following window reaches.
    let window = TAU - 0.05;
    let engine_config = EngineConfig {
        stepper: Stepper::Rk4,
        observer: ObserverKind::Neighbourhood,
        precision: Precision::Double,
        seed: 0,
    };
    let observer = ObserverConfig::default().neighbourhood_radius(0.3);
    let solver = SolverConfig::default().dt(window / 6000.0);
    let start = |duration: f64| {
        let mut engine =
            Engine::new(device(), Oscillator::problem(), Oscillator, engine_config).unwrap();
        engine
            .initialize(
                TimeSpan::new(0.0, duration).unwrap(),
                array![[1.0, 0.0]].view(),
                array![[1.0]].view(),
                solver,
                observer,
            )
            .unwrap();
        engine
    };

    let mut whole = start(3.0 * window);
    let expected = whole.features(true).unwrap();

    let mut split = start(window);
    split.features(true).unwrap();
    let mut run = None;
    for _ in 0..2 {
        split.shift_initial_state().unwrap();
        split.shift_time_span().unwrap();
        run = Some(split.features(false).unwrap());
    }
    let run = run.unwrap();

    let count = col(&split, "event count");
    assert_eq!(run.values[[0, count]], 3.0);
    assert_eq!(run.values[[0, count]], expected.values[[0, count]]);
    for name in ["period mean", "period min", "period max", "amplitude mean"] {
        let c = col(&split, name);
        assert_relative_eq!(run.values[[0, c]], expected.values[[0, c]], epsilon = 1e-6);
    }
    assert_relative_eq!(run.values[[0, col(&split, "period max")]], TAU, epsilon = 2e-3);
}

#[test]
fn event_window_is_bounded() {
    let config = ObserverConfig::default().max_event_count(3);
    let (engine, run) = oscillators(ObserverKind::ThresholdCrossing, config, &[(2.0, TAU)], 30.0);

    // Thirty periods: many more events than the window holds.
    assert!(run.values[[0, col(&engine, "event count")]] >= 28.0);
    assert_relative_eq!(run.values[[0, col(&engine, "period mean")]], 1.0, max_relative = 1e-3);
    assert_relative_eq!(run.values[[0, col(&engine, "period min")]], 1.0, max_relative = 1e-3);
    assert_relative_eq!(run.values[[0, col(&engine, "period max")]], 1.0, max_relative = 1e-3);
}

#[test]
fn too_few_events_report_insufficient_data() {
    // Amplitude below the rising threshold: no crossings at all.
    let (engine, run) = oscillators(
        ObserverKind::ThresholdCrossing,
        ObserverConfig::default(),
        &[(0.1, 1.0)],
        20.0,
    );

    assert_eq!(run.values[[0, col(&engine, "event count")]], 0.0);
    assert!(run.values[[0, col(&engine, "period mean")]].is_nan());
    assert!(run.values[[0, col(&engine, "amplitude variance")]].is_nan());
    assert_relative_eq!(run.values[[0, col(&engine, "max x")]], 0.1, max_relative = 1e-4);
    assert!(run.status[0] == cohort_engine::RowStatus::Complete);
}

#[test]
fn noise_triggered_events_are_rejected() {
    // A period-1 oscillation crosses the thresholds twice as often as
    // `min_imi` allows, so every other candidate is dropped.
    let config = ObserverConfig::default().rejection(0.5, 1.5);
    let (engine, run) = oscillators(ObserverKind::ThresholdCrossing, config, &[(2.0, TAU)], 20.0);

    assert_relative_eq!(run.values[[0, col(&engine, "period mean")]], 2.0, max_relative = 1e-3);
}

#[test]
fn adaptive_stepper_needs_fewer_steps_than_euler() {
    let run = |stepper: Stepper, solver: SolverConfig| {
        let config = EngineConfig {
            stepper,
            observer: ObserverKind::Basic,
            precision: Precision::Double,
            seed: 0,
        };
        let mut engine = Engine::new(device(), decay_problem(), decay, config).unwrap();
        engine
            .initialize(
                TimeSpan::new(0.0, 5.0).unwrap(),
                array![[1.0]].view(),
                array![[1.0]].view(),
                solver,
                ObserverConfig::default(),
            )
            .unwrap();
        let run = engine.features(true).unwrap();
        let error = (run.values[[0, 0]] - (-5.0_f64).exp()).abs();
        (error, run.values[[0, 4]])
    };

    let (euler_coarse, _) = run(Stepper::Euler, SolverConfig::default().dt(1e-3));
    let (euler_fine, euler_steps) = run(Stepper::Euler, SolverConfig::default().dt(5e-4));
    let (dopri, dopri_steps) = run(
        Stepper::DormandPrince5,
        SolverConfig::default().tolerances(1e-10, 1e-8),
    );

    // Euler is first order: halving dt halves the error.
    assert_relative_eq!(euler_coarse / euler_fine, 2.0, max_relative = 0.02);

    assert!(dopri < euler_fine / 100.0, "dopri {dopri}, euler {euler_fine}");
    assert!(dopri_steps * 10.0 < euler_steps, "{dopri_steps} vs {euler_steps}");
}
