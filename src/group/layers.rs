//! Draw layers
//!
//! Painter's algorithm: lower layer keys are drawn first, so later layers
//! end up on top. Inside a layer, entities draw in the order they were added.

use std::collections::BTreeMap;

use crate::entity::EntityRef;

/// Layer used when none is requested
pub const DEFAULT_DRAW_LAYER: i32 = 1;

pub(crate) struct DrawLayerIndex {
    layers: BTreeMap<i32, Vec<EntityRef>>,
}

impl DrawLayerIndex {
    pub fn new() -> Self {
        let mut layers = BTreeMap::new();
        layers.insert(DEFAULT_DRAW_LAYER, Vec::new());
        Self { layers }
    }

    /// Append to a layer, creating it on first use
    pub fn insert(&mut self, layer: i32, entity: &EntityRef) {
        self.layers.entry(layer).or_default().push(entity.clone());
    }

    /// Drop `entity` from every layer. Emptied layers are kept.
    pub fn purge(&mut self, entity: &EntityRef) {
        for bucket in self.layers.values_mut() {
            bucket.retain(|e| e != entity);
        }
    }

    /// Layer keys in draw order
    pub fn keys(&self) -> impl Iterator<Item = i32> + '_ {
        self.layers.keys().copied()
    }

    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.layers.values().any(|bucket| bucket.contains(entity))
    }

    /// Every drawable in draw order, as an owned list
    pub fn snapshot(&self) -> Vec<EntityRef> {
        self.layers.values().flatten().cloned().collect()
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
    fn test_layers_sorted_regardless_of_insertion() {
        let mut index = DrawLayerIndex::new();
        let a = EntityRef::new(Probe);
        let b = EntityRef::new(Probe);
        let c = EntityRef::new(Probe);
        index.insert(0, &a);
        index.insert(5, &b);
        index.insert(2, &c);

        assert_eq!(index.keys().collect::<Vec<_>>(), vec![0, 1, 2, 5]);
        assert_eq!(index.snapshot(), vec![a, c, b]);
    }

    #[test]
    fn test_purge_keeps_order_within_layer() {
        let mut index = DrawLayerIndex::new();
        let entities: Vec<_> = (0..3).map(|_| EntityRef::new(Probe)).collect();
        for e in &entities {
            index.insert(DEFAULT_DRAW_LAYER, e);
        }
        index.purge(&entities[1]);
        assert!(!index.contains(&entities[1]));
        assert_eq!(index.snapshot(), vec![entities[0].clone(), entities[2].clone()]);
    }
}
