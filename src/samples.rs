//! Built-in sample machines, embedded as JSON definitions.

use serde::Deserialize;

use crate::machine::TuringMachine;

// Default embedded machines
const SAMPLE_TEXTS: [&str; 3] = [
    include_str!("../machines/binary-increment.json"),
    include_str!("../machines/even-ones.json"),
    include_str!("../machines/endless-walker.json"),
];

lazy_static::lazy_static! {
    pub static ref SAMPLES: Vec<Sample> = load_samples();
}

/// A named machine definition shipped with the crate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sample {
    pub name: String,
    /// What the machine does, including any cell left undefined as a reject path.
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub machine: TuringMachine,
}

fn load_samples() -> Vec<Sample> {
    SAMPLE_TEXTS
        .iter()
        .filter_map(|text| match serde_json::from_str::<Sample>(text) {
            Ok(sample) => Some(sample),
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse built-in sample");
                None
            }
        })
        .collect()
}

/// Looks a sample up by name.
pub fn by_name(name: &str) -> Option<&'static Sample> {
    SAMPLES.iter().find(|sample| sample.name == name)
}

/// Names of all samples, in embedding order.
pub fn names() -> Vec<&'static str> {
    SAMPLES.iter().map(|sample| sample.name.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ExecutionEngine;
    use crate::types::{HeadStart, Status};
    use crate::validator::readiness;
    use std::sync::Arc;

    fn run(name: &str, tape: &str, max_steps: usize) -> crate::ProgramResult {
        let program = by_name(name).unwrap().machine.compile().unwrap();
        let mut engine = ExecutionEngine::with_tape(Arc::new(program), tape).unwrap();
        let steps = std::cell::Cell::new(0);
        engine
            .run_to_completion(|| {
                steps.set(steps.get() + 1);
                steps.get() > max_steps
            })
            .unwrap()
    }

    #[test]
    fn test_all_samples_load_and_compile() {
        assert_eq!(SAMPLES.len(), SAMPLE_TEXTS.len());
        for sample in SAMPLES.iter() {
            assert!(
                sample.machine.compile().is_ok(),
                "sample {} does not compile",
                sample.name
            );
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(names(), vec!["binary-increment", "even-ones", "endless-walker"]);
        assert!(by_name("missing").is_none());
    }

    #[test]
    fn test_binary_increment() {
        let sample = by_name("binary-increment").unwrap();
        assert!(readiness(&sample.machine).is_ready());

        let result = run("binary-increment", "1011", 100);
        assert_eq!(result.status, Status::Accepted);
        assert_eq!(result.tape, "1100_");
        assert_eq!(result.steps, 8);

        let result = run("binary-increment", "111", 100);
        assert_eq!(result.tape, "1000_");
        assert_eq!(result.head, -1);
    }

    #[test]
    fn test_even_ones_rejects_through_its_only_empty_cell() {
        let sample = by_name("even-ones").unwrap();
        let status = readiness(&sample.machine);

        assert!(!status.is_ready());
        assert_eq!(status.status(), "Missing: instructions for (q1, '_')");
        assert!(sample.description.contains("(q1, blank)"));
    }

    #[test]
    fn test_every_sample_is_described() {
        for sample in SAMPLES.iter() {
            assert!(!sample.description.is_empty(), "{} has no description", sample.name);
        }
    }

    #[test]
    fn test_even_ones() {
        assert_eq!(run("even-ones", "0110", 100).status, Status::Accepted);
        assert_eq!(run("even-ones", "10", 100).status, Status::Rejected);
    }

    #[test]
    fn test_endless_walker_never_halts() {
        let sample = by_name("endless-walker").unwrap();
        assert_eq!(sample.machine.head_start, HeadStart::FromRightmostSymbol);

        let result = run("endless-walker", "11", 500);
        assert_eq!(result.status, Status::TimedOut);
        assert_eq!(result.steps, 500);
        assert_eq!(result.head, 501);
    }
}
