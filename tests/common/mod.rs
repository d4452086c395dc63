#![allow(dead_code)]

use std::fs;
use std::path::Path;

use execution_monitor::prelude::*;
use tempfile::TempDir;

pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn write_plan(dir: &Path, filename: &str, content: &str) {
    fs::write(dir.join(filename), content).expect("Failed to write plan file");
}

pub fn write_monitor_config(dir: &Path, content: &str) {
    fs::write(dir.join("monitor.yaml"), content).expect("Failed to write monitor.yaml");
}

/// YAML for a plan of `count` pending steps
pub fn pending_plan_yaml(name: &str, count: usize) -> String {
    let mut yaml = format!("name: {}\nsteps:\n", name);
    for i in 1..=count {
        yaml.push_str(&format!("  - id: step-{}\n    name: Step {}\n", i, i));
    }
    yaml
}

pub fn pending_plan(count: usize) -> ExecutionPlan {
    let steps = (1..=count)
        .map(|i| StepSpec::new(format!("step-{}", i), format!("Step {}", i)))
        .collect();
    ExecutionPlan::new("pending", steps)
}

pub fn start(plan: ExecutionPlan, source: impl TransitionSource + 'static) -> ExecutionSimulation {
    ExecutionSimulation::start(plan, SimulationConfig::default(), source)
        .expect("Failed to start simulation")
}

/// Assert the ordering invariants hold for the current steps
pub fn assert_invariants(steps: &[ExecutionStep]) {
    let running = steps.iter().filter(|s| s.status == StepStatus::Running).count();
    assert!(running <= 1, "more than one running step: {:?}", steps);

    let mut seen_unfinished = false;
    for step in steps {
        match step.status {
            StepStatus::Completed => assert!(
                !seen_unfinished,
                "step {} completed after an unfinished step",
                step.id
            ),
            StepStatus::Running => {
                assert!(!seen_unfinished, "step {} running out of order", step.id);
                seen_unfinished = true;
            }
            _ => seen_unfinished = true,
        }
    }
}
