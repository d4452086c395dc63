mod common;

use common::*;
use execution_monitor::prelude::*;

#[test]
fn test_three_steps_finish_in_three_ticks() {
    let mut sim = start(pending_plan(3), ForcedSource::always());
    assert_eq!(sim.steps()[0].status, StepStatus::Running);

    for _ in 0..2 {
        assert!(matches!(sim.advance(), TickOutcome::Advanced { .. }));
        assert!(!sim.is_finished());
    }
    assert_eq!(
        sim.advance(),
        TickOutcome::Finished {
            completed: "step-3".into()
        }
    );

    assert!(sim.steps().iter().all(|s| s.status == StepStatus::Completed));
    assert_eq!(sim.status(), ExecutionStatus::Completed);
    assert_eq!(sim.metrics().progress_percent, 100.0);
    assert!(sim.finished_at().is_some());
}

#[test]
fn test_completed_single_step_is_noop() {
    let plan = ExecutionPlan::new("done", vec![StepSpec::new("only", "Only").completed(1.0, 2.0)]);
    let mut sim = start(plan, ForcedSource::always());
    let before = sim.metrics();
    let steps_before = sim.steps().to_vec();

    assert_eq!(sim.advance(), TickOutcome::Idle);

    assert_eq!(sim.metrics(), before);
    assert_eq!(sim.steps(), steps_before.as_slice());
    assert_eq!(sim.status(), ExecutionStatus::Completed);
}

#[test]
fn test_zero_probability_never_changes_state() {
    let mut sim = start(pending_plan(4), ForcedSource::never());
    let steps_before = sim.steps().to_vec();

    for _ in 0..50 {
        assert!(matches!(sim.advance(), TickOutcome::Stuck { .. }));
    }

    assert_eq!(sim.steps(), steps_before.as_slice());
    assert_eq!(sim.status(), ExecutionStatus::Running);
}

#[test]
fn test_zero_probability_with_seeded_source() {
    let config = SimulationConfig {
        completion_probability: 0.0,
        ..Default::default()
    };
    let mut sim =
        ExecutionSimulation::start(pending_plan(2), config, SeededSource::new(9)).unwrap();
    let steps_before = sim.steps().to_vec();

    for _ in 0..100 {
        sim.advance();
    }
    assert_eq!(sim.steps(), steps_before.as_slice());
}

#[test]
fn test_empty_registry() {
    let mut sim = start(ExecutionPlan::new("empty", vec![]), ForcedSource::always());
    let metrics = sim.metrics();

    assert_eq!(metrics.total_steps, 0);
    assert_eq!(metrics.completed_steps, 0);
    assert_eq!(metrics.progress_percent, 0.0);
    assert_eq!(sim.advance(), TickOutcome::Idle);
}

#[test]
fn test_invariants_hold_across_seeds() {
    for seed in 0..25 {
        let config = SimulationConfig {
            seed: Some(seed),
            ..Default::default()
        };
        let mut sim = ExecutionSimulation::from_config(pending_plan(6), config).unwrap();
        let mut previous_completed = 0;

        for _ in 0..200 {
            sim.advance();
            assert_invariants(sim.steps());

            let metrics = sim.metrics();
            assert!((0.0..=100.0).contains(&metrics.progress_percent));
            assert_eq!(
                metrics.progress_percent,
                metrics.completed_steps as f64 / metrics.total_steps as f64 * 100.0
            );
            assert!(metrics.completed_steps >= previous_completed);
            assert!(metrics.completed_steps - previous_completed <= 1);
            previous_completed = metrics.completed_steps;
        }
    }
}

#[test]
fn test_stamped_values_within_configured_ranges() {
    let config = SimulationConfig {
        seed: Some(3),
        completion_probability: 1.0,
        ..Default::default()
    };
    let duration_range = config.duration_range;
    let cost_range = config.cost_range;
    let mut sim = ExecutionSimulation::from_config(pending_plan(5), config).unwrap();

    while !sim.is_finished() {
        sim.advance();
    }

    for step in sim.steps() {
        assert!(duration_range.contains(step.duration_seconds.unwrap()));
        assert!(cost_range.contains(step.cost.unwrap()));
        assert_eq!(
            step.credits_used.unwrap(),
            (step.cost.unwrap() * 150.0).round() as u64
        );
    }

    let metrics = sim.metrics();
    let cost: f64 = sim.steps().iter().filter_map(|s| s.cost).sum();
    assert!((metrics.total_cost - cost).abs() < 1e-9);
}

#[test]
fn test_same_seed_same_run() {
    let run = |seed| {
        let config = SimulationConfig {
            seed: Some(seed),
            ..Default::default()
        };
        let mut sim = ExecutionSimulation::from_config(pending_plan(5), config).unwrap();
        let outcomes: Vec<_> = (0..40).map(|_| sim.advance()).collect();
        (outcomes, sim.metrics())
    };

    assert_eq!(run(11), run(11));
}

#[test]
fn test_next_pending_promoted_when_nothing_running() {
    let plan = ExecutionPlan::new(
        "resume",
        vec![
            StepSpec::new("a", "A").completed(1.0, 1.0),
            StepSpec::new("b", "B"),
        ],
    );
    let sim = start(plan, ForcedSource::never());
    assert_eq!(sim.running_step().unwrap().id, "b");
}

#[test]
fn test_onboarding_preset_runs_to_completion() {
    let mut sim = start(presets::customer_onboarding(), ForcedSource::always());
    let mut ticks = 0;
    while !sim.is_finished() {
        sim.advance();
        ticks += 1;
    }

    assert_eq!(ticks, 4);
    let metrics = sim.metrics();
    assert_eq!(metrics.completed_steps, 5);
    // 2.3s/1.5 from the first step plus four midpoint samples
    assert!((metrics.total_duration_seconds - (2.3 + 4.0 * 3.0)).abs() < 1e-9);
    assert!((metrics.total_cost - (1.5 + 4.0 * 1.5)).abs() < 1e-9);
}
