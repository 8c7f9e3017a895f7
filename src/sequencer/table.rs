//! Phase table definitions.
//!
//! A phase table is the immutable description of one forward-only flow:
//! an ordered list of phases, each with optional entry effects, at most
//! one automatic (timer-driven) transition, and any number of named
//! manual transitions. Tables are built once, validated structurally,
//! and shared read-only with the engine.

use std::time::Duration;

use indexmap::IndexMap;

use crate::effects::EffectCommand;
use crate::error::SequencerError;

// ============================================================================
// Phase
// ============================================================================

/// An automatic transition: after `after` elapses in the phase, advance
/// to the phase at index `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoAdvance {
    /// Delay before the transition fires, measured from phase entry.
    pub after: Duration,
    /// Index of the target phase.
    pub target: usize,
}

/// One named phase of a flow.
#[derive(Debug, Clone)]
pub struct Phase {
    name: String,
    on_enter: Vec<EffectCommand>,
    auto: Option<AutoAdvance>,
    /// Manual transitions: event name → target phase index.
    transitions: IndexMap<String, usize>,
}

impl Phase {
    /// Phase name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effect commands dispatched when the phase is entered.
    #[must_use]
    pub fn on_enter(&self) -> &[EffectCommand] {
        &self.on_enter
    }

    /// The automatic transition, if any.
    #[must_use]
    pub const fn auto(&self) -> Option<&AutoAdvance> {
        self.auto.as_ref()
    }

    /// Manual transitions (event name → target phase index), in
    /// declaration order.
    #[must_use]
    pub const fn transitions(&self) -> &IndexMap<String, usize> {
        &self.transitions
    }

    /// Whether the phase has no outgoing transitions at all.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.auto.is_none() && self.transitions.is_empty()
    }
}

// ============================================================================
// PhaseTable
// ============================================================================

/// Immutable, validated phase table for one flow.
///
/// Invariants enforced at build time:
/// - at least one phase; unique phase names
/// - every transition target exists and is strictly later in the list
///   (forward-only; no cycles by construction)
/// - at most one automatic transition per phase
/// - every phase except the entry is reachable
///
/// The last property plus forward-only edges guarantees every path from
/// the entry ends at a terminal phase.
#[derive(Debug, Clone)]
pub struct PhaseTable {
    flow: String,
    phases: Vec<Phase>,
}

impl PhaseTable {
    /// Starts building a table for the named flow.
    #[must_use]
    pub fn builder(flow: impl Into<String>) -> PhaseTableBuilder {
        PhaseTableBuilder {
            flow: flow.into(),
            phases: Vec::new(),
        }
    }

    /// Flow name.
    #[must_use]
    pub fn flow(&self) -> &str {
        &self.flow
    }

    /// All phases in order.
    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// The phase at `index`, if in bounds.
    #[must_use]
    pub fn phase_at(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    /// Looks up a phase index by name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.phases.iter().position(|p| p.name == name)
    }

    /// Number of phases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Whether the table has no phases. Always `false` for built tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Phase under construction, with string targets resolved at build time.
#[derive(Debug)]
struct PhaseSpec {
    name: String,
    on_enter: Vec<EffectCommand>,
    auto: Option<(Duration, String)>,
    transitions: IndexMap<String, String>,
}

/// Builder for [`PhaseTable`].
#[derive(Debug)]
pub struct PhaseTableBuilder {
    flow: String,
    phases: Vec<PhaseSpec>,
}

impl PhaseTableBuilder {
    /// Appends a phase. Subsequent `auto_after`/`on_enter`/`on_event`
    /// calls apply to it.
    #[must_use]
    pub fn phase(mut self, name: impl Into<String>) -> Self {
        self.phases.push(PhaseSpec {
            name: name.into(),
            on_enter: Vec::new(),
            auto: None,
            transitions: IndexMap::new(),
        });
        self
    }

    /// Sets the automatic transition of the phase added last.
    ///
    /// # Panics
    ///
    /// Panics if called before any `phase()`; table construction is
    /// programmer-driven, so this is a usage bug, not runtime input.
    #[must_use]
    pub fn auto_after(mut self, after: Duration, target: impl Into<String>) -> Self {
        let spec = self.phases.last_mut().expect("auto_after before phase()");
        spec.auto = Some((after, target.into()));
        self
    }

    /// Adds an entry effect to the phase added last.
    ///
    /// # Panics
    ///
    /// Panics if called before any `phase()`.
    #[must_use]
    pub fn on_enter(mut self, command: EffectCommand) -> Self {
        let spec = self.phases.last_mut().expect("on_enter before phase()");
        spec.on_enter.push(command);
        self
    }

    /// Adds a manual transition to the phase added last.
    ///
    /// # Panics
    ///
    /// Panics if called before any `phase()`.
    #[must_use]
    pub fn on_event(mut self, event: impl Into<String>, target: impl Into<String>) -> Self {
        let spec = self.phases.last_mut().expect("on_event before phase()");
        spec.transitions.insert(event.into(), target.into());
        self
    }

    /// Validates and builds the table.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::InvalidTable`] when the table is empty,
    /// has duplicate phase names, references unknown targets, contains a
    /// backward or self transition, or leaves a phase unreachable.
    pub fn build(self) -> Result<PhaseTable, SequencerError> {
        let invalid = |message: String| SequencerError::InvalidTable {
            flow: self.flow.clone(),
            message,
        };

        if self.phases.is_empty() {
            return Err(invalid("table has no phases".to_string()));
        }

        // Unique names
        for (i, spec) in self.phases.iter().enumerate() {
            if self.phases[..i].iter().any(|p| p.name == spec.name) {
                return Err(invalid(format!("duplicate phase name '{}'", spec.name)));
            }
        }

        let index_of = |name: &str| self.phases.iter().position(|p| p.name == name);

        let mut reachable = vec![false; self.phases.len()];
        reachable[0] = true;

        let mut phases = Vec::with_capacity(self.phases.len());
        for (i, spec) in self.phases.iter().enumerate() {
            let resolve = |event: &str, target: &str| -> Result<usize, SequencerError> {
                let Some(t) = index_of(target) else {
                    return Err(invalid(format!(
                        "phase '{}' transition '{event}' targets unknown phase '{target}'",
                        spec.name
                    )));
                };
                if t <= i {
                    return Err(invalid(format!(
                        "phase '{}' transition '{event}' targets '{target}' which is not \
                         strictly later (flows are forward-only)",
                        spec.name
                    )));
                }
                Ok(t)
            };

            let auto = spec
                .auto
                .as_ref()
                .map(|(after, target)| {
                    resolve("<auto>", target).map(|t| AutoAdvance {
                        after: *after,
                        target: t,
                    })
                })
                .transpose()?;
            if let Some(a) = &auto {
                reachable[a.target] = true;
            }

            let mut transitions = IndexMap::with_capacity(spec.transitions.len());
            for (event, target) in &spec.transitions {
                let t = resolve(event, target)?;
                reachable[t] = true;
                transitions.insert(event.clone(), t);
            }

            phases.push(Phase {
                name: spec.name.clone(),
                on_enter: spec.on_enter.clone(),
                auto,
                transitions,
            });
        }

        if let Some(i) = reachable.iter().position(|r| !r) {
            return Err(invalid(format!(
                "phase '{}' is unreachable from the entry phase",
                self.phases[i].name
            )));
        }

        Ok(PhaseTable {
            flow: self.flow,
            phases,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_build_linear_table() {
        let table = PhaseTable::builder("bottle")
            .phase("floating")
            .on_event("open", "opening")
            .phase("opening")
            .auto_after(ms(1500), "revealed")
            .phase("revealed")
            .build()
            .unwrap();

        assert_eq!(table.flow(), "bottle");
        assert_eq!(table.len(), 3);
        assert_eq!(table.index_of("opening"), Some(1));
        assert!(table.phase_at(2).unwrap().is_terminal());
        assert!(!table.phase_at(0).unwrap().is_terminal());
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = PhaseTable::builder("empty").build().unwrap_err();
        assert!(matches!(err, SequencerError::InvalidTable { .. }));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = PhaseTable::builder("dup")
            .phase("a")
            .on_event("go", "a2")
            .phase("a2")
            .on_event("go", "a")
            .phase("a")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_unknown_target_rejected() {
        let err = PhaseTable::builder("bad")
            .phase("a")
            .on_event("go", "nowhere")
            .phase("b")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("unknown phase"));
    }

    #[test]
    fn test_backward_transition_rejected() {
        let err = PhaseTable::builder("loop")
            .phase("a")
            .on_event("go", "b")
            .phase("b")
            .on_event("back", "a")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("forward-only"));
    }

    #[test]
    fn test_self_transition_rejected() {
        let err = PhaseTable::builder("self")
            .phase("a")
            .on_event("again", "a")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("forward-only"));
    }

    #[test]
    fn test_unreachable_phase_rejected() {
        let err = PhaseTable::builder("gap")
            .phase("a")
            .on_event("skip", "c")
            .phase("b")
            .on_event("go", "c")
            .phase("c")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("unreachable"));
    }

    #[test]
    fn test_auto_and_manual_coexist() {
        let table = PhaseTable::builder("intro")
            .phase("reveal")
            .auto_after(ms(10_000), "done")
            .on_event("tap", "done")
            .phase("done")
            .build()
            .unwrap();
        let reveal = table.phase_at(0).unwrap();
        assert_eq!(reveal.auto().unwrap().target, 1);
        assert_eq!(reveal.transitions().get("tap"), Some(&1));
    }

    #[test]
    fn test_entry_effects_kept_in_order() {
        let table = PhaseTable::builder("fx")
            .phase("burst")
            .on_enter(EffectCommand::new("chime"))
            .on_enter(EffectCommand::new("confetti-burst"))
            .build()
            .unwrap();
        let names: Vec<_> = table
            .phase_at(0)
            .unwrap()
            .on_enter()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["chime", "confetti-burst"]);
    }
}
