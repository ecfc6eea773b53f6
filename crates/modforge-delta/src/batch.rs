//! Translates the legacy [`BatchDelta`] sugar into a sequence of
//! path-based [`SpecDelta`]s. The semantic contract stays the path-based
//! one; this module only expands shorthand before the real apply runs.

use modforge_core::delta::{BatchDelta, SpecDelta, SpecSequence};
use modforge_core::spec::ModSpec;
use std::collections::HashMap;

/// Expand a [`BatchDelta`] into the equivalent ordered sequence of
/// path-based deltas against `current` (the spec the batch will be
/// applied to): removes first (highest index first, so earlier removes
/// don't shift the indices later removes target), then updates, then
/// appends.
///
/// `current` is needed because an append's real index — `len(sequence)`
/// — is only known relative to the spec the batch is about to be applied
/// to; the batch form itself carries no path.
#[must_use]
pub fn expand_batch(batch: &BatchDelta, current: &ModSpec) -> Vec<SpecDelta> {
    let mut removes = batch.removes.clone();
    removes.sort_by(|a, b| b.index.cmp(&a.index));

    let mut out = Vec::with_capacity(batch.adds.len() + batch.updates.len() + batch.removes.len());
    for remove in &removes {
        out.push(SpecDelta::remove(format!("{}[{}]", remove.kind.field_name(), remove.index)));
    }
    for update in &batch.updates {
        out.push(SpecDelta::update(
            format!("{}[{}]", update.kind.field_name(), update.index),
            update.value.clone(),
        ));
    }

    let mut next_index = sequence_lengths(current);
    for add in &batch.adds {
        let index = next_index.entry(add.kind).or_insert(0);
        out.push(SpecDelta::add(format!("{}[{}]", add.kind.field_name(), index), add.value.clone()));
        *index += 1;
    }
    out
}

fn sequence_lengths(spec: &ModSpec) -> HashMap<SpecSequence, usize> {
    HashMap::from([
        (SpecSequence::Items, spec.items.len()),
        (SpecSequence::Blocks, spec.blocks.len()),
        (SpecSequence::Tools, spec.tools.len()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_core::delta::{BatchAdd, BatchRemove, BatchUpdate};
    use modforge_core::spec::ItemSpec;
    use serde_json::json;

    #[test]
    fn removes_are_ordered_highest_index_first() {
        let batch = BatchDelta {
            removes: vec![
                BatchRemove { kind: SpecSequence::Items, index: 0 },
                BatchRemove { kind: SpecSequence::Items, index: 2 },
            ],
            ..Default::default()
        };
        let expanded = expand_batch(&batch, &ModSpec::default());
        assert_eq!(expanded[0].path, "items[2]");
        assert_eq!(expanded[1].path, "items[0]");
    }

    #[test]
    fn adds_append_at_current_sequence_length() {
        let mut current = ModSpec::default();
        current.items.push(ItemSpec::default());
        let batch = BatchDelta {
            adds: vec![BatchAdd { kind: SpecSequence::Items, value: json!({"item_name": "Ruby Sword"}) }],
            ..Default::default()
        };
        let expanded = expand_batch(&batch, &current);
        assert_eq!(expanded[0].path, "items[1]");
    }

    #[test]
    fn multiple_adds_to_the_same_sequence_increment_in_order() {
        let batch = BatchDelta {
            adds: vec![
                BatchAdd { kind: SpecSequence::Tools, value: json!({"tool_name": "Axe"}) },
                BatchAdd { kind: SpecSequence::Tools, value: json!({"tool_name": "Pickaxe"}) },
            ],
            ..Default::default()
        };
        let expanded = expand_batch(&batch, &ModSpec::default());
        assert_eq!(expanded[0].path, "tools[0]");
        assert_eq!(expanded[1].path, "tools[1]");
    }

    #[test]
    fn updates_are_path_addressed_by_kind_and_index() {
        let batch = BatchDelta {
            updates: vec![BatchUpdate { kind: SpecSequence::Blocks, index: 1, value: json!({"hardness": 5.0}) }],
            ..Default::default()
        };
        let expanded = expand_batch(&batch, &ModSpec::default());
        assert_eq!(expanded[0].path, "blocks[1]");
    }
}
