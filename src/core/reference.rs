//! Alias halls: a record whose name reads like `Siehe KGSE1` takes over the
//! data of the hall it points at while keeping its own code.
//!
//! Aliases resolve one hop, against base records only. An alias pointing at
//! itself or at another alias is dropped and reported, so cycles cannot loop.

use crate::core::patterns::PatternLibrary;
use crate::domain::model::{HallRecord, UnresolvedReason};
use indexmap::IndexMap;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedAlias {
    pub code: String,
    pub target: String,
    pub reason: UnresolvedReason,
}

#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub records: Vec<HallRecord>,
    pub unresolved: Vec<UnresolvedAlias>,
    /// Codes that appeared more than once; the later record replaced the earlier.
    pub duplicates: Vec<String>,
}

pub fn resolve_references(records: Vec<HallRecord>, patterns: &PatternLibrary) -> Resolution {
    let mut bases: IndexMap<String, HallRecord> = IndexMap::new();
    let mut aliases: Vec<(HallRecord, String)> = Vec::new();
    let mut duplicates = Vec::new();

    for record in records {
        match patterns.reference_target(&record.name) {
            Some(target) => aliases.push((record, target)),
            None => {
                let code = record.code.clone();
                if bases.insert(code.clone(), record).is_some() {
                    tracing::warn!("Hall {} listed more than once, keeping the later entry", code);
                    duplicates.push(code);
                }
            }
        }
    }

    if !aliases.is_empty() {
        tracing::info!("Found {} reference halls", aliases.len());
    }

    let alias_codes: HashSet<String> = aliases.iter().map(|(r, _)| r.code.clone()).collect();
    let mut resolved = Vec::new();
    let mut unresolved = Vec::new();

    for (alias, target) in aliases {
        let outcome = if target == alias.code {
            Err(UnresolvedReason::SelfReference)
        } else if let Some(base) = bases.get(&target) {
            Ok(base)
        } else if alias_codes.contains(&target) {
            Err(UnresolvedReason::TargetIsAlias)
        } else {
            Err(UnresolvedReason::TargetMissing)
        };

        match outcome {
            Ok(base) => {
                tracing::debug!("Resolved {} using data from {}", alias.code, target);
                resolved.push(HallRecord {
                    code: alias.code,
                    name: annotate(&base.name, &target),
                    ..base.clone()
                });
            }
            Err(reason) => {
                tracing::warn!(
                    "Reference hall {} points at {} which cannot be used ({:?}), dropping it",
                    alias.code,
                    target,
                    reason
                );
                unresolved.push(UnresolvedAlias {
                    code: alias.code,
                    target,
                    reason,
                });
            }
        }
    }

    let mut directory = bases;
    for record in resolved {
        let code = record.code.clone();
        if directory.insert(code.clone(), record).is_some() {
            tracing::warn!("Reference hall {} replaces a hall with the same code", code);
            duplicates.push(code);
        }
    }

    Resolution {
        records: directory.into_values().collect(),
        unresolved,
        duplicates,
    }
}

fn annotate(name: &str, target: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        format!("(reference: {})", target)
    } else {
        format!("{} (reference: {})", name, target)
    }
}
