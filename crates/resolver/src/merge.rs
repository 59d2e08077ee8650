//! Merge directives

use config::MergeSpec;
use types::{Mapping, Namespace, ResolveError, Result, Value};

/// Apply `merges` in declaration order.
///
/// Each destination is created as an empty mapping when absent, then the
/// top-level keys of every source are copied into it, later sources winning.
/// Nested mappings are replaced, not merged.
pub fn merge(namespace: &mut Namespace, merges: &[MergeSpec]) -> Result<()> {
    for directive in merges {
        let destination = namespace.entry_mut(&directive.name, Value::mapping);
        if !matches!(destination, Value::Mapping(_)) {
            return Err(ResolveError::TypeMismatch {
                merge: directive.key.clone(),
                input: directive.name.clone(),
                found: destination.kind().to_string(),
            });
        }

        let union = collect_sources(namespace, directive)?;
        tracing::debug!(
            merge = %directive.key,
            destination = %directive.name,
            keys = union.len(),
            "Merging inputs"
        );

        if let Some(target) = namespace.entry_mut(&directive.name, Value::mapping).as_mapping_mut() {
            target.extend(union);
        }
    }
    Ok(())
}

fn collect_sources(namespace: &Namespace, directive: &MergeSpec) -> Result<Mapping> {
    let mut union = Mapping::new();
    for input in &directive.inputs {
        let source = namespace.get(input).ok_or_else(|| ResolveError::UnknownMergeSource {
            merge: directive.key.clone(),
            input: input.clone(),
        })?;
        let entries = source.as_mapping().ok_or_else(|| ResolveError::TypeMismatch {
            merge: directive.key.clone(),
            input: input.clone(),
            found: source.kind().to_string(),
        })?;
        union.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    Ok(union)
}
