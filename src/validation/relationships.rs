//! Relationship validation functionality
//!
//! Resolves relation targets against the composed record types and orders
//! tables by their foreign key dependencies.

use crate::models::{Cardinality, EffectiveSchema};
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::warn;

/// Result of relationship validation
#[derive(Debug, Default)]
pub struct RelationshipValidationResult {
    /// Relations whose target record type does not exist
    pub unresolved: Vec<RelationshipValidationError>,
    /// Inverse sides declared without `mapped_by`
    pub missing_mapped_by: Vec<RelationshipValidationError>,
    /// `mapped_by`/`inversed_by` naming a relation the target lacks
    pub missing_inverse: Vec<MissingInverse>,
    pub self_references: Vec<SelfReference>,
}

impl RelationshipValidationResult {
    pub fn is_valid(&self) -> bool {
        self.unresolved.is_empty() && self.missing_mapped_by.is_empty()
    }
}

/// Inverse relation reference that does not resolve
#[derive(Debug, Clone, PartialEq)]
pub struct MissingInverse {
    pub record: String,
    pub relation: String,
    pub target: String,
    pub inverse: String,
}

/// Record type relating to itself
#[derive(Debug, Clone, PartialEq)]
pub struct SelfReference {
    pub record: String,
    pub relation: String,
}

/// Error during relationship validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RelationshipValidationError {
    #[error("Relation '{relation}' of record type '{record}' targets unknown record type '{target}'")]
    UnresolvedRelationship {
        record: String,
        relation: String,
        target: String,
    },
    #[error("One-to-many relation '{relation}' of record type '{record}' must declare mapped_by")]
    MissingMappedBy { record: String, relation: String },
}

/// Relationship validator
#[derive(Debug, Default)]
pub struct RelationshipValidator;

impl RelationshipValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check every relation of every schema against the set of schemas
    pub fn validate(&self, schemas: &[EffectiveSchema]) -> RelationshipValidationResult {
        let by_name: HashMap<&str, &EffectiveSchema> = schemas
            .iter()
            .map(|s| (s.record_type.as_str(), s))
            .collect();
        let mut result = RelationshipValidationResult::default();

        for schema in schemas {
            for rel in &schema.relations {
                let Some(target) = by_name.get(rel.target.as_str()) else {
                    result
                        .unresolved
                        .push(RelationshipValidationError::UnresolvedRelationship {
                            record: schema.record_type.clone(),
                            relation: rel.name.clone(),
                            target: rel.target.clone(),
                        });
                    continue;
                };

                if rel.cardinality == Cardinality::OneToMany && rel.mapped_by.is_none() {
                    result
                        .missing_mapped_by
                        .push(RelationshipValidationError::MissingMappedBy {
                            record: schema.record_type.clone(),
                            relation: rel.name.clone(),
                        });
                }

                for inverse in rel.mapped_by.iter().chain(rel.inversed_by.iter()) {
                    if target.relation(inverse).is_none() {
                        result.missing_inverse.push(MissingInverse {
                            record: schema.record_type.clone(),
                            relation: rel.name.clone(),
                            target: rel.target.clone(),
                            inverse: inverse.clone(),
                        });
                    }
                }

                if rel.target == schema.record_type {
                    result.self_references.push(SelfReference {
                        record: schema.record_type.clone(),
                        relation: rel.name.clone(),
                    });
                }
            }
        }

        result
    }

    /// Fail with the first relation whose target is not among `schemas`.
    ///
    /// Only targets are checked; a one-to-many relation without `mapped_by`
    /// is reported by [`validate`](Self::validate) and does not fail here.
    pub fn ensure_resolved(&self, schemas: &[EffectiveSchema]) -> Result<(), RelationshipValidationError> {
        match self.validate(schemas).unresolved.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Order schemas so that targets of join columns come before the tables
    /// referencing them.
    ///
    /// Falls back to the given order when the join-column graph has a cycle;
    /// foreign keys are emitted separately, so any order still produces valid
    /// DDL.
    pub fn dependency_order<'s>(&self, schemas: &'s [EffectiveSchema]) -> Vec<&'s EffectiveSchema> {
        let (graph, _) = Self::build_graph(schemas);
        match toposort(&graph, None) {
            Ok(order) => order.into_iter().map(|idx| &schemas[graph[idx]]).collect(),
            Err(cycle) => {
                warn!(
                    "Join column dependencies form a cycle through {}; keeping registration order",
                    schemas[graph[cycle.node_id()]].record_type
                );
                schemas.iter().collect()
            }
        }
    }

    /// Groups of record types that reference each other in a cycle
    pub fn find_cycles(&self, schemas: &[EffectiveSchema]) -> Vec<Vec<String>> {
        let (graph, _) = Self::build_graph(schemas);
        tarjan_scc(&graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| {
                let mut names: Vec<String> = component
                    .into_iter()
                    .map(|idx| schemas[graph[idx]].record_type.clone())
                    .collect();
                names.sort();
                names
            })
            .collect()
    }

    /// Edge target -> owner for every join column; self references skipped
    fn build_graph(schemas: &[EffectiveSchema]) -> (DiGraph<usize, ()>, HashMap<&str, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        for (i, schema) in schemas.iter().enumerate() {
            nodes.insert(schema.record_type.as_str(), graph.add_node(i));
        }
        for schema in schemas {
            let owner = nodes[schema.record_type.as_str()];
            for rel in &schema.relations {
                if rel.join_column_name().is_none() || rel.target == schema.record_type {
                    continue;
                }
                if let Some(&target) = nodes.get(rel.target.as_str()) {
                    graph.update_edge(target, owner, ());
                }
            }
        }
        (graph, nodes)
    }
}
