use thiserror::Error;

use crate::entry::Entry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnhanceError {
    #[error("enhancement step '{step}' violated the `{field}` invariant: {reason}")]
    InvariantViolation {
        step: String,
        field: &'static str,
        reason: String,
    },
    #[error("enhancement step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },
}

pub type EnhanceResult<T> = Result<T, EnhanceError>;

/// One enrichment pass over a standardized entry.
///
/// A step may refine `content`, `context` and `intent` only. Every other
/// field must come back unchanged and `content` must stay non-empty.
pub trait EnhancementStep: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, entry: &Entry) -> EnhanceResult<Entry>;
}

pub struct FnStep<F> {
    name: String,
    f: F,
}

impl<F> EnhancementStep for FnStep<F>
where
    F: Fn(&Entry) -> EnhanceResult<Entry> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, entry: &Entry) -> EnhanceResult<Entry> {
        (self.f)(entry)
    }
}

pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnStep<F>
where
    F: Fn(&Entry) -> EnhanceResult<Entry> + Send + Sync,
{
    FnStep {
        name: name.into(),
        f,
    }
}

/// Ordered list of enrichment steps. With no steps it is the identity.
#[derive(Default)]
pub struct Enhancer {
    steps: Vec<Box<dyn EnhancementStep>>,
}

impl Enhancer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_step(mut self, step: Box<dyn EnhancementStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in order; the first failure aborts the whole pass.
    pub fn enhance(&self, entry: &Entry) -> EnhanceResult<Entry> {
        let mut current = entry.clone();
        for step in &self.steps {
            let next = step.apply(&current)?;
            check_invariants(step.name(), &current, &next)?;
            current = next;
        }
        Ok(current)
    }
}

fn check_invariants(step: &str, before: &Entry, after: &Entry) -> EnhanceResult<()> {
    let violation = |field: &'static str, reason: &str| EnhanceError::InvariantViolation {
        step: step.to_string(),
        field,
        reason: reason.to_string(),
    };

    if after.content.trim().is_empty() {
        return Err(violation("content", "content became empty"));
    }
    if after.role != before.role {
        return Err(violation("role", "role is not enrichable"));
    }
    if after.mode != before.mode {
        return Err(violation("mode", "mode is assigned once by the classifier"));
    }
    if after.structure != before.structure {
        return Err(violation("structure", "structure is fixed"));
    }
    if after.density != before.density {
        return Err(violation("density", "density is not enrichable"));
    }
    if after.entropy != before.entropy {
        return Err(violation("entropy", "entropy is not enrichable"));
    }
    if after.meaning_preserved != before.meaning_preserved {
        return Err(violation("meaning_preserved", "meaning_preserved is not enrichable"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Level, Mode, Role, Structure};

    fn entry() -> Entry {
        Entry {
            role: Role::User,
            content: "define recursion".into(),
            intent: "define".into(),
            mode: Mode::Instruction,
            context: String::new(),
            structure: Structure::Coherent,
            density: Level::Low,
            entropy: Level::High,
            meaning_preserved: true,
        }
    }

    #[test]
    fn test_default_is_identity() {
        let enhancer = Enhancer::new();
        assert!(enhancer.is_identity());
        assert_eq!(enhancer.enhance(&entry()).unwrap(), entry());
    }

    #[test]
    fn test_steps_run_in_order() {
        let enhancer = Enhancer::new()
            .with_step(Box::new(from_fn("context", |e: &Entry| {
                Ok(Entry {
                    context: "glossary".into(),
                    ..e.clone()
                })
            })))
            .with_step(Box::new(from_fn("suffix", |e: &Entry| {
                Ok(Entry {
                    context: format!("{} v2", e.context),
                    ..e.clone()
                })
            })));

        let out = enhancer.enhance(&entry()).unwrap();

        assert_eq!(enhancer.step_names(), vec!["context", "suffix"]);
        assert_eq!(out.context, "glossary v2");
    }

    #[test]
    fn test_emptying_content_fails() {
        let enhancer = Enhancer::new().with_step(Box::new(from_fn("wipe", |e: &Entry| {
            Ok(Entry {
                content: "  ".into(),
                ..e.clone()
            })
        })));

        let err = enhancer.enhance(&entry()).unwrap_err();
        assert!(matches!(
            err,
            EnhanceError::InvariantViolation { field: "content", .. }
        ));
    }

    #[test]
    fn test_structural_field_change_fails() {
        let enhancer = Enhancer::new().with_step(Box::new(from_fn("remode", |e: &Entry| {
            Ok(Entry {
                mode: Mode::Narrative,
                ..e.clone()
            })
        })));

        let err = enhancer.enhance(&entry()).unwrap_err();
        assert!(matches!(
            err,
            EnhanceError::InvariantViolation { field: "mode", .. }
        ));
    }

    #[test]
    fn test_step_error_propagates() {
        let enhancer = Enhancer::new().with_step(Box::new(from_fn("broken", |_: &Entry| {
            Err(EnhanceError::StepFailed {
                step: "broken".into(),
                message: "no backend".into(),
            })
        })));

        assert!(enhancer.enhance(&entry()).is_err());
    }
}
