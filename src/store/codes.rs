use crate::workflow::StepCode;
use ahash::AHashSet;
use rand::{Rng, distr::Alphanumeric};

const MAX_ATTEMPTS: usize = 16;

/// Source of candidate step codes. Uniqueness is enforced by the store, not here.
pub trait CodeGenerator: Send + Sync {
    fn next_code(&mut self) -> String;
}

/// Random alphanumeric codes of a fixed length.
#[derive(Debug, Clone)]
pub struct RandomCodes {
    length: usize,
}

impl RandomCodes {
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(1),
        }
    }
}

impl Default for RandomCodes {
    fn default() -> Self {
        Self::new(8)
    }
}

impl CodeGenerator for RandomCodes {
    fn next_code(&mut self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

/// Predictable `prefix-1`, `prefix-2`, … codes.
#[derive(Debug, Clone)]
pub struct SequentialCodes {
    prefix: String,
    next: usize,
}

impl SequentialCodes {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl CodeGenerator for SequentialCodes {
    fn next_code(&mut self) -> String {
        let code = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        code
    }
}

/// Draws a code that is not in `taken`. After repeated collisions the last candidate
/// is suffixed with a counter, so this always terminates.
pub(crate) fn unique_code(generator: &mut dyn CodeGenerator, taken: &AHashSet<String>) -> StepCode {
    let mut candidate = String::new();
    for _ in 0..MAX_ATTEMPTS {
        candidate = generator.next_code();
        if !candidate.trim().is_empty() && !taken.contains(&candidate) {
            return StepCode::new(candidate);
        }
    }

    if candidate.trim().is_empty() {
        candidate = "step".to_string();
    }
    (1..)
        .map(|n| format!("{}-{}", candidate, n))
        .find(|code| !taken.contains(code))
        .map(StepCode::new)
        .unwrap_or_default()
}
