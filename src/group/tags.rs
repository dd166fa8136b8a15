//! Tag index: string labels over sets of entities

use std::collections::HashMap;

use crate::entity::EntityRef;

/// Many-to-many map from tag to members.
///
/// Members of a tag keep the order they were tagged in. A tag stays known
/// after its last member is untagged, so lookups can tell "no members" apart
/// from "never registered".
#[derive(Default)]
pub(crate) struct TaggedIndex {
    tags: HashMap<String, Vec<EntityRef>>,
}

impl TaggedIndex {
    /// Tag an entity. Tagging twice is a no-op.
    pub fn add(&mut self, entity: &EntityRef, tag: &str) {
        let members = self.tags.entry(tag.to_string()).or_default();
        if !members.contains(entity) {
            members.push(entity.clone());
        }
    }

    /// Untag an entity. Returns `false` if the tag is unknown.
    pub fn remove(&mut self, entity: &EntityRef, tag: &str) -> bool {
        match self.tags.get_mut(tag) {
            Some(members) => {
                members.retain(|e| e != entity);
                true
            }
            None => false,
        }
    }

    pub fn is_known(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    pub fn members(&self, tag: &str) -> Option<&[EntityRef]> {
        self.tags.get(tag).map(Vec::as_slice)
    }

    /// Drop `entity` from every tag
    pub fn purge(&mut self, entity: &EntityRef) {
        for members in self.tags.values_mut() {
            members.retain(|e| e != entity);
        }
    }

    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.tags.values().any(|members| members.contains(entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Capabilities, Entity};

    struct Probe;

    impl Entity for Probe {
        fn capabilities(&self) -> Capabilities {
            Capabilities::NONE
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut index = TaggedIndex::default();
        let a = EntityRef::new(Probe);
        index.add(&a, "enemy");
        index.add(&a, "enemy");
        assert_eq!(index.members("enemy").map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_unknown_vs_empty() {
        let mut index = TaggedIndex::default();
        let a = EntityRef::new(Probe);
        assert!(!index.remove(&a, "ghost"));
        assert!(index.members("ghost").is_none());

        index.add(&a, "enemy");
        assert!(index.remove(&a, "enemy"));
        assert!(index.is_known("enemy"));
        assert_eq!(index.members("enemy"), Some(&[][..]));
    }

    #[test]
    fn test_purge_across_tags() {
        let mut index = TaggedIndex::default();
        let a = EntityRef::new(Probe);
        let b = EntityRef::new(Probe);
        index.add(&a, "x");
        index.add(&b, "x");
        index.add(&a, "y");
        index.purge(&a);
        assert!(!index.contains(&a));
        assert_eq!(index.members("x"), Some(&[b][..]));
    }
}
