//! Inter-species interaction rules: a MAX_SPECIES×MAX_SPECIES matrix of
//! (behavior, strength, range) records, with "target = all-others" rows
//! pre-expanded to concrete cells at upload time.

use bytemuck::{Pod, Zeroable};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum number of distinct species the simulation supports.
pub const MAX_SPECIES: usize = 7;

/// Sentinel target id meaning "every other species", expanded by
/// [`InteractionMatrix::expand_all_others`].
pub const ALL_OTHERS: u32 = u32::MAX;

/// Per-pair steering behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    Ignore,
    Avoid,
    Pursue,
    Attract,
    Mirror,
    Orbit,
}

impl Behavior {
    pub fn all() -> &'static [Behavior] {
        &[
            Behavior::Ignore,
            Behavior::Avoid,
            Behavior::Pursue,
            Behavior::Attract,
            Behavior::Mirror,
            Behavior::Orbit,
        ]
    }

    fn as_code(self) -> u32 {
        match self {
            Behavior::Ignore => 0,
            Behavior::Avoid => 1,
            Behavior::Pursue => 2,
            Behavior::Attract => 3,
            Behavior::Mirror => 4,
            Behavior::Orbit => 5,
        }
    }

    fn from_code(code: u32) -> Behavior {
        match code {
            1 => Behavior::Avoid,
            2 => Behavior::Pursue,
            3 => Behavior::Attract,
            4 => Behavior::Mirror,
            5 => Behavior::Orbit,
            _ => Behavior::Ignore,
        }
    }
}

/// One (source, target) interaction rule cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionRule {
    pub behavior: Behavior,
    pub strength: f32,
    pub range: f32,
}

impl Default for InteractionRule {
    fn default() -> Self {
        Self {
            behavior: Behavior::Ignore,
            strength: 0.0,
            range: 0.0,
        }
    }
}

/// GPU-packed form: `(behavior, strength, range, 0)` as a four-float vector.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct InteractionRuleGpu {
    pub behavior: f32,
    pub strength: f32,
    pub range: f32,
    pub _reserved: f32,
}

impl From<&InteractionRule> for InteractionRuleGpu {
    fn from(r: &InteractionRule) -> Self {
        Self {
            behavior: r.behavior.as_code() as f32,
            strength: r.strength,
            range: r.range,
            _reserved: 0.0,
        }
    }
}

/// Entry as authored by the host: either an explicit (source, target) cell
/// or a (source, all-others) row, expanded at upload time.
#[derive(Debug, Clone, Copy)]
pub struct InteractionEntry {
    pub source: u32,
    /// `None` means "every species other than `source`".
    pub target: Option<u32>,
    pub rule: InteractionRule,
}

/// MAX_SPECIES×MAX_SPECIES row-major interaction matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionMatrix {
    cells: [[InteractionRule; MAX_SPECIES]; MAX_SPECIES],
}

impl Default for InteractionMatrix {
    fn default() -> Self {
        Self {
            cells: [[InteractionRule::default(); MAX_SPECIES]; MAX_SPECIES],
        }
    }
}

impl InteractionMatrix {
    pub fn get(&self, source: u32, target: u32) -> InteractionRule {
        self.cells[source as usize][target as usize]
    }

    fn set(&mut self, source: u32, target: u32, rule: InteractionRule) {
        self.cells[source as usize][target as usize] = rule;
    }

    /// Build a matrix from a list of entries, expanding `target = all-others`
    /// rows first and applying explicit (source, target) cells last so they
    /// always take precedence, independent of entry order. This is the
    /// decided behavior for the spec's "target = all-others" Open Question.
    pub fn expand_all_others(entries: &[InteractionEntry], num_species: usize) -> Self {
        let mut matrix = Self::default();

        for entry in entries.iter().filter(|e| e.target.is_none()) {
            for target in 0..num_species as u32 {
                if target != entry.source {
                    matrix.set(entry.source, target, entry.rule);
                }
            }
        }

        for entry in entries.iter().filter_map(|e| e.target.map(|t| (e, t))) {
            let (e, target) = entry;
            matrix.set(e.source, target, e.rule);
        }

        matrix
    }

    /// Pack the full matrix as 49 four-float GPU vectors, row-major (source, target).
    pub fn to_gpu_buffer(&self) -> [InteractionRuleGpu; MAX_SPECIES * MAX_SPECIES] {
        let mut out = [InteractionRuleGpu {
            behavior: 0.0,
            strength: 0.0,
            range: 0.0,
            _reserved: 0.0,
        }; MAX_SPECIES * MAX_SPECIES];
        for s in 0..MAX_SPECIES {
            for t in 0..MAX_SPECIES {
                out[s * MAX_SPECIES + t] = (&self.cells[s][t]).into();
            }
        }
        out
    }

    /// Check that every active (source, target) cell among the first
    /// `num_species` rows/columns has a finite, non-negative strength and
    /// range. Checked in parallel across the 49-cell matrix since this runs
    /// whenever the population's species count changes.
    pub fn validate(&self, num_species: usize) -> Result<(), String> {
        let num_species = num_species.min(MAX_SPECIES);
        let bad = (0..num_species)
            .into_par_iter()
            .flat_map(|s| (0..num_species).into_par_iter().map(move |t| (s, t)))
            .find_any(|&(s, t)| {
                let rule = self.cells[s][t];
                !rule.strength.is_finite() || !rule.range.is_finite() || rule.range < 0.0
            });

        match bad {
            Some((s, t)) => Err(format!("interaction cell ({s}, {t}) has an invalid strength/range")),
            None => Ok(()),
        }
    }
}

#[allow(dead_code)]
fn behavior_round_trip(code: u32) -> Behavior {
    Behavior::from_code(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_others_expands_and_explicit_cell_wins() {
        let entries = vec![
            InteractionEntry {
                source: 0,
                target: None,
                rule: InteractionRule {
                    behavior: Behavior::Avoid,
                    strength: 0.5,
                    range: 100.0,
                },
            },
            InteractionEntry {
                source: 0,
                target: Some(2),
                rule: InteractionRule {
                    behavior: Behavior::Pursue,
                    strength: 0.9,
                    range: 50.0,
                },
            },
        ];
        let matrix = InteractionMatrix::expand_all_others(&entries, 3);
        assert_eq!(matrix.get(0, 1).behavior, Behavior::Avoid);
        // Explicit cell overrides the all-others expansion regardless of order.
        assert_eq!(matrix.get(0, 2).behavior, Behavior::Pursue);
        assert_eq!(matrix.get(0, 0).behavior, Behavior::Ignore);
    }

    #[test]
    fn expansion_is_idempotent_regardless_of_entry_order() {
        let forward = vec![
            InteractionEntry {
                source: 0,
                target: None,
                rule: InteractionRule {
                    behavior: Behavior::Avoid,
                    strength: 1.0,
                    range: 10.0,
                },
            },
            InteractionEntry {
                source: 0,
                target: Some(1),
                rule: InteractionRule {
                    behavior: Behavior::Attract,
                    strength: 1.0,
                    range: 10.0,
                },
            },
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = InteractionMatrix::expand_all_others(&forward, 2);
        let b = InteractionMatrix::expand_all_others(&reversed, 2);
        assert_eq!(a.get(0, 1).behavior, b.get(0, 1).behavior);
        assert_eq!(a.get(0, 1).behavior, Behavior::Attract);
    }
}
