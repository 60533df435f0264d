//! Ordered member map used by composition
//!
//! Members keep the position of their first declaration. A replacement
//! takes over that slot; new names are appended.

use crate::models::{Member, Origin};
use std::collections::{BTreeMap, HashMap};

/// A member together with where it was declared
#[derive(Debug, Clone, PartialEq)]
pub struct Declared {
    pub member: Member,
    pub origin: Origin,
}

/// Two incorporated units disagreeing on one member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub member: String,
    pub first: String,
    pub second: String,
}

#[derive(Debug, Clone, Default)]
pub struct MemberMap {
    entries: Vec<Declared>,
    index: HashMap<String, usize>,
    conflicts: BTreeMap<String, Conflict>,
}

impl MemberMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a member coming from an incorporated unit.
    ///
    /// The later unit wins. A differing definition from another unit is
    /// remembered as a conflict until an override clears it.
    pub fn merge_from_unit(&mut self, member: Member, origin: Origin) {
        let name = member.name().to_string();
        match self.index.get(&name) {
            Some(&idx) => {
                let existing = &self.entries[idx];
                if existing.member == member {
                    return;
                }
                if let (Origin::Unit(first), Origin::Unit(second)) = (&existing.origin, &origin)
                    && first != second
                {
                    self.conflicts.insert(
                        name.clone(),
                        Conflict {
                            member: name,
                            first: first.clone(),
                            second: second.clone(),
                        },
                    );
                }
                self.entries[idx] = Declared { member, origin };
            }
            None => self.push(name, Declared { member, origin }),
        }
    }

    /// Declare a member that takes precedence over anything merged so far
    pub fn override_with(&mut self, member: Member, origin: Origin) {
        let name = member.name().to_string();
        self.conflicts.remove(&name);
        match self.index.get(&name) {
            Some(&idx) => self.entries[idx] = Declared { member, origin },
            None => self.push(name, Declared { member, origin }),
        }
    }

    /// Merge every entry of another map as unit members, keeping its
    /// unresolved conflicts
    pub fn absorb(&mut self, other: MemberMap) {
        let MemberMap {
            entries, conflicts, ..
        } = other;
        for declared in entries {
            self.merge_from_unit(declared.member, declared.origin);
        }
        for (name, conflict) in conflicts {
            self.conflicts.entry(name).or_insert(conflict);
        }
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.values()
    }

    pub fn into_entries(self) -> Vec<Declared> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, name: String, declared: Declared) {
        self.index.insert(name, self.entries.len());
        self.entries.push(declared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attribute, StorageType};

    fn string(name: &str, len: u32) -> Member {
        Attribute::new(name, StorageType::String).with_length(len).into()
    }

    fn unit(name: &str) -> Origin {
        Origin::Unit(name.to_string())
    }

    #[test]
    fn test_override_keeps_position() {
        let mut map = MemberMap::new();
        map.merge_from_unit(string("a", 10), unit("U"));
        map.merge_from_unit(string("b", 10), unit("U"));
        map.override_with(string("a", 20), Origin::Local);

        let entries = map.into_entries();
        assert_eq!(entries[0].member, string("a", 20));
        assert_eq!(entries[0].origin, Origin::Local);
        assert_eq!(entries[1].member.name(), "b");
    }

    #[test]
    fn test_conflict_between_units_cleared_by_override() {
        let mut map = MemberMap::new();
        map.merge_from_unit(string("a", 10), unit("U1"));
        map.merge_from_unit(string("a", 20), unit("U2"));
        assert_eq!(map.conflicts().count(), 1);

        map.override_with(string("a", 30), Origin::Local);
        assert_eq!(map.conflicts().count(), 0);
    }

    #[test]
    fn test_identical_definitions_do_not_conflict() {
        let mut map = MemberMap::new();
        map.merge_from_unit(string("a", 10), unit("U1"));
        map.merge_from_unit(string("a", 10), unit("U2"));
        assert_eq!(map.conflicts().count(), 0);
        assert_eq!(map.len(), 1);
    }
}
