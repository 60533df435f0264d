//! Field-set unit validation
//!
//! Checks the inclusion graph of units before composition: unknown
//! includes, inclusion cycles, and units nothing incorporates.

use crate::registry::Catalog;
use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use std::collections::{HashMap, HashSet};

/// Result of unit validation
#[derive(Debug, Default)]
pub struct UnitValidationResult {
    /// (unit, missing include)
    pub unknown_includes: Vec<(String, String)>,
    /// Units including each other, each group sorted by name
    pub inclusion_cycles: Vec<Vec<String>>,
    /// Units no record type reaches
    pub unused_units: Vec<String>,
}

impl UnitValidationResult {
    pub fn is_valid(&self) -> bool {
        self.unknown_includes.is_empty() && self.inclusion_cycles.is_empty()
    }
}

/// Unit validator
#[derive(Debug, Default)]
pub struct UnitValidator;

impl UnitValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, catalog: &Catalog) -> UnitValidationResult {
        let units = &catalog.field_sets;
        let mut graph = DiGraph::<&str, ()>::new();
        let mut nodes = HashMap::new();
        for unit in units.iter() {
            nodes.insert(unit.name.as_str(), graph.add_node(unit.name.as_str()));
        }

        let mut result = UnitValidationResult::default();
        for unit in units.iter() {
            for include in &unit.includes {
                match nodes.get(include.as_str()) {
                    Some(&target) => {
                        graph.update_edge(nodes[unit.name.as_str()], target, ());
                    }
                    None => result
                        .unknown_includes
                        .push((unit.name.clone(), include.clone())),
                }
            }
        }

        for component in tarjan_scc(&graph) {
            let is_cycle = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&idx| graph.contains_edge(idx, idx));
            if is_cycle {
                let mut names: Vec<String> =
                    component.iter().map(|&idx| graph[idx].to_string()).collect();
                names.sort();
                result.inclusion_cycles.push(names);
            }
        }

        // Units reachable from any record type through `uses` and includes
        let mut reached: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = catalog
            .list_record_types()
            .into_iter()
            .flat_map(|r| r.uses.iter().map(String::as_str))
            .collect();
        while let Some(name) = stack.pop() {
            if !reached.insert(name) {
                continue;
            }
            if let Ok(unit) = units.resolve(name) {
                stack.extend(unit.includes.iter().map(String::as_str));
            }
        }
        result.unused_units = units
            .names()
            .into_iter()
            .filter(|name| !reached.contains(name))
            .map(str::to_string)
            .collect();

        result
    }
}
