//! Per-capability listener lists

use crate::entity::{Capabilities, Capability, EntityRef};

/// One ordered list of entities per capability.
///
/// Draw-capable entities are tracked by the layer index instead, so the
/// `Draw` list here always stays empty.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    lists: [Vec<EntityRef>; Capability::COUNT],
}

impl ListenerRegistry {
    /// Append `entity` to the list of every capability it declares
    pub fn register(&mut self, entity: &EntityRef, caps: Capabilities) {
        for cap in caps.iter().filter(|c| *c != Capability::Draw) {
            self.lists[cap.index()].push(entity.clone());
        }
    }

    /// Drop `entity` from every list, matching by identity
    pub fn purge(&mut self, entity: &EntityRef) {
        for list in &mut self.lists {
            list.retain(|e| e != entity);
        }
    }

    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.lists.iter().any(|list| list.contains(entity))
    }

    #[cfg(test)]
    pub fn get(&self, cap: Capability) -> &[EntityRef] {
        &self.lists[cap.index()]
    }

    /// Owned copy of a list, safe to iterate while callbacks mutate the group
    pub fn snapshot(&self, cap: Capability) -> Vec<EntityRef> {
        self.lists[cap.index()].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    struct Probe;

    impl Entity for Probe {
        fn capabilities(&self) -> Capabilities {
            Capabilities::NONE
        }
    }

    #[test]
    fn test_register_in_append_order() {
        let mut reg = ListenerRegistry::default();
        let a = EntityRef::new(Probe);
        let b = EntityRef::new(Probe);
        let caps = Capabilities::of(&[Capability::Update, Capability::Quit, Capability::Draw]);
        reg.register(&a, caps);
        reg.register(&b, Capabilities::of(&[Capability::Update]));

        assert_eq!(reg.get(Capability::Update), &[a.clone(), b.clone()]);
        assert_eq!(reg.get(Capability::Quit), &[a.clone()]);
        assert!(reg.get(Capability::Draw).is_empty());
        assert!(reg.get(Capability::Init).is_empty());
    }

    #[test]
    fn test_purge_first_entry_keeps_rest() {
        let mut reg = ListenerRegistry::default();
        let entities: Vec<_> = (0..3).map(|_| EntityRef::new(Probe)).collect();
        for e in &entities {
            reg.register(e, Capabilities::of(&[Capability::Update]));
        }

        reg.purge(&entities[0]);
        assert_eq!(reg.get(Capability::Update), &entities[1..]);

        reg.purge(&entities[2]);
        assert_eq!(reg.get(Capability::Update), &entities[1..2]);
    }
}
