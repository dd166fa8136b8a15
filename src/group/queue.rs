//! Deferred structural changes
//!
//! Removals requested during dispatch are only queued; the group drains the
//! queues at the start of the next `update`, never mid-iteration.

use std::collections::VecDeque;

use crate::entity::EntityRef;

#[derive(Default)]
pub(crate) struct MutationQueues {
    destroy: VecDeque<EntityRef>,
    remove: VecDeque<EntityRef>,
}

impl MutationQueues {
    pub fn push_destroy(&mut self, entity: &EntityRef) {
        self.destroy.push_back(entity.clone());
    }

    pub fn push_remove(&mut self, entity: &EntityRef) {
        self.remove.push_back(entity.clone());
    }

    /// Next entity to destroy, oldest first
    pub fn pop_destroy(&mut self) -> Option<EntityRef> {
        self.destroy.pop_front()
    }

    /// Next entity to remove, oldest first
    pub fn pop_remove(&mut self) -> Option<EntityRef> {
        self.remove.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.destroy.is_empty() && self.remove.is_empty()
    }
}
