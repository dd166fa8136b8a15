//! Entity Group
//!
//! The [`EntityGroup`] owns a set of entities and fans per-frame events out
//! to the ones that declared the matching [`Capability`]:
//! - Lifecycle: `init` once after setup, `update` every frame, `destroy`
//!   before an entity is purged
//! - Input: keyboard, mouse, text and file drops through [`EntityGroup::handle`]
//! - Drawing: layer by layer, lowest key first
//!
//! Structural changes requested while events are being dispatched (`remove`,
//! `destroy`) are queued and only applied at the start of the next `update`,
//! so a list is never modified while it is being walked.
//!
//! A group is itself an [`Entity`], which is how groups nest: a child group
//! draws at its parent's origin plus its own, and sees mouse coordinates
//! relative to itself.

mod layers;
mod listeners;
mod messages;
mod queue;
mod tags;

pub use layers::DEFAULT_DRAW_LAYER;
pub use messages::{Message, MessageId};

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::{Rc, Weak};

use macroquad::math::{vec2, Vec2};

use crate::entity::{Capabilities, Capability, Context, Entity, EntityRef};
use crate::error::GroupError;
use crate::event::{Event, KeyEvent, MouseButtonEvent, MouseMotionEvent, MouseWheelEvent};
use crate::render::Renderer;

use layers::DrawLayerIndex;
use listeners::ListenerRegistry;
use messages::MessageBus;
use queue::MutationQueues;
use tags::TaggedIndex;

/// What [`EntityGroup::handle`] did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Forwarded to the matching listeners
    Dispatched,
    /// A quit request that some entity vetoed
    QuitAborted,
    /// A quit request nobody vetoed; the host should shut down
    QuitAccepted,
}

struct GroupState {
    origin: Cell<Vec2>,
    parent: RefCell<Option<WeakGroup>>,
    initialized: Cell<bool>,
    /// Members with the capabilities they declared when added
    members: RefCell<HashMap<EntityRef, Capabilities>>,
    listeners: RefCell<ListenerRegistry>,
    layers: RefCell<DrawLayerIndex>,
    tags: RefCell<TaggedIndex>,
    messages: RefCell<MessageBus>,
    queues: RefCell<MutationQueues>,
    /// First error a nested group hit during this group's update dispatch
    nested_error: RefCell<Option<GroupError>>,
}

/// Shared handle to a group of entities. Cloning is cheap and every clone
/// refers to the same group.
#[derive(Clone)]
pub struct EntityGroup {
    inner: Rc<GroupState>,
}

/// Non-owning group handle, for entities and handlers that need to reach
/// back into their group without keeping it alive.
#[derive(Clone)]
pub struct WeakGroup(Weak<GroupState>);

impl WeakGroup {
    pub fn upgrade(&self) -> Option<EntityGroup> {
        self.0.upgrade().map(|inner| EntityGroup { inner })
    }
}

impl EntityGroup {
    /// Create an empty group at the origin
    pub fn new() -> Self {
        Self::with_origin(0.0, 0.0)
    }

    /// Create an empty group whose contents are offset by (x, y)
    pub fn with_origin(x: f32, y: f32) -> Self {
        Self {
            inner: Rc::new(GroupState {
                origin: Cell::new(vec2(x, y)),
                parent: RefCell::new(None),
                initialized: Cell::new(false),
                members: RefCell::new(HashMap::new()),
                listeners: RefCell::new(ListenerRegistry::default()),
                layers: RefCell::new(DrawLayerIndex::new()),
                tags: RefCell::new(TaggedIndex::default()),
                messages: RefCell::new(MessageBus::default()),
                queues: RefCell::new(MutationQueues::default()),
                nested_error: RefCell::new(None),
            }),
        }
    }

    pub fn origin(&self) -> Vec2 {
        self.inner.origin.get()
    }

    pub fn set_origin(&self, x: f32, y: f32) {
        self.inner.origin.set(vec2(x, y));
    }

    pub fn downgrade(&self) -> WeakGroup {
        WeakGroup(Rc::downgrade(&self.inner))
    }

    /// The enclosing group, once `init` has run for a nested group
    pub fn parent(&self) -> Option<EntityGroup> {
        self.inner.parent.borrow().as_ref().and_then(WeakGroup::upgrade)
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.get()
    }

    pub fn len(&self) -> usize {
        self.inner.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.inner.members.borrow().contains_key(entity)
    }

    /// Layer keys in draw order, including empty layers
    pub fn layers(&self) -> Vec<i32> {
        self.inner.layers.borrow().keys().collect()
    }

    /// Whether any index (members, layers, listeners, tags, message
    /// subscriptions) still refers to `entity`
    pub fn is_indexed(&self, entity: &EntityRef) -> bool {
        self.contains(entity)
            || self.inner.layers.borrow().contains(entity)
            || self.inner.listeners.borrow().contains(entity)
            || self.inner.tags.borrow().contains(entity)
            || self.inner.messages.borrow().is_subscribed(entity)
    }

    /// Whether any remove/destroy is waiting for the next `update`
    pub fn has_pending_mutations(&self) -> bool {
        !self.inner.queues.borrow().is_empty()
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Add an entity, drawing it on `layer` if it is drawable.
    ///
    /// No callback fires here; `init` is a separate step. An entity added
    /// while events are being dispatched is not visited by that dispatch.
    pub fn add(&self, entity: impl Into<EntityRef>, layer: i32) -> Result<EntityRef, GroupError> {
        let entity = entity.into();
        if self.contains(&entity) {
            return Err(GroupError::AlreadyMember);
        }

        let caps = entity.capabilities();
        if caps.contains(Capability::Draw) {
            self.inner.layers.borrow_mut().insert(layer, &entity);
        }
        self.inner.listeners.borrow_mut().register(&entity, caps);
        self.inner.members.borrow_mut().insert(entity.clone(), caps);
        log::debug!("added {:?} on layer {} with {:?}", entity, layer, caps);
        Ok(entity)
    }

    /// Add an entity on [`DEFAULT_DRAW_LAYER`]
    pub fn add_default(&self, entity: impl Into<EntityRef>) -> Result<EntityRef, GroupError> {
        self.add(entity, DEFAULT_DRAW_LAYER)
    }

    /// Queue the removal of an entity at the start of the next `update`
    pub fn remove(&self, entity: &EntityRef) {
        self.inner.queues.borrow_mut().push_remove(entity);
    }

    /// Queue the destruction of an entity at the start of the next `update`.
    /// Unlike `remove`, the entity's `destroy` callback runs first.
    pub fn destroy(&self, entity: &EntityRef) {
        self.inner.queues.borrow_mut().push_destroy(entity);
    }

    fn next_destroy(&self) -> Option<EntityRef> {
        self.inner.queues.borrow_mut().pop_destroy()
    }

    fn next_remove(&self) -> Option<EntityRef> {
        self.inner.queues.borrow_mut().pop_remove()
    }

    fn capabilities_of(&self, entity: &EntityRef) -> Option<Capabilities> {
        self.inner.members.borrow().get(entity).copied()
    }

    /// Drop an entity from every index and from the member set
    fn purge(&self, entity: &EntityRef) {
        self.inner.tags.borrow_mut().purge(entity);
        self.inner.layers.borrow_mut().purge(entity);
        self.inner.listeners.borrow_mut().purge(entity);
        self.inner.messages.borrow_mut().purge(entity);
        self.inner.members.borrow_mut().remove(entity);
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Call `init` on every Init-capable entity, in the order they were added.
    ///
    /// Meant to run once, after setup and message validation. Later calls
    /// are ignored.
    pub fn init(&self, parent: Option<&EntityGroup>) {
        if self.inner.initialized.replace(true) {
            log::warn!("EntityGroup::init called more than once; ignoring");
            return;
        }
        *self.inner.parent.borrow_mut() = parent.map(EntityGroup::downgrade);
        self.dispatch(Capability::Init, |entity, cx| entity.init(cx));
    }

    /// Apply queued destroys, then queued removals, then update every
    /// Update-capable entity.
    ///
    /// An entity queued during this frame's dispatch never sees this
    /// frame's update; one that queues itself during its own update is
    /// purged at the start of the next.
    ///
    /// An error from a nested group's update is returned here once every
    /// entity has been updated.
    pub fn update(&self, dt: f32) -> Result<(), GroupError> {
        while let Some(entity) = self.next_destroy() {
            let caps = self.capabilities_of(&entity).ok_or(GroupError::NotAMember)?;
            if caps.contains(Capability::Destroy) {
                let cx = Context::new(self, &entity);
                entity.borrow_mut().destroy(&cx);
            }
            self.purge(&entity);
            log::debug!("destroyed {:?}", entity);
        }

        while let Some(entity) = self.next_remove() {
            if !self.contains(&entity) {
                return Err(GroupError::NotAMember);
            }
            self.purge(&entity);
            log::debug!("removed {:?}", entity);
        }

        self.dispatch(Capability::Update, |entity, cx| entity.update(cx, dt));
        match self.inner.nested_error.borrow_mut().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Keep the first error a nested group reports during `update`
    fn record_nested_error(&self, error: GroupError) {
        let mut slot = self.inner.nested_error.borrow_mut();
        if slot.is_none() {
            *slot = Some(error);
        }
    }

    /// Draw every layer in ascending order at this group's origin
    pub fn draw(&self, renderer: &mut dyn Renderer) {
        self.draw_at(renderer, Vec2::ZERO);
    }

    /// Draw with an extra offset inherited from enclosing groups
    pub fn draw_at(&self, renderer: &mut dyn Renderer, offset: Vec2) {
        let origin = self.origin() + offset;
        let drawables = self.inner.layers.borrow().snapshot();
        for entity in &drawables {
            entity.borrow_mut().draw(renderer, origin);
        }
    }

    /// Destroy every member right away. Only called from a parent's
    /// destroy drain, which is already outside any dispatch.
    fn teardown(&self) {
        self.dispatch(Capability::Destroy, |entity, cx| entity.destroy(cx));
        let members: Vec<EntityRef> = self.inner.members.borrow().keys().cloned().collect();
        for entity in &members {
            self.purge(entity);
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Call `f` on every listener of `cap`, in registration order.
    ///
    /// Iterates a snapshot of the list, so callbacks may freely call back
    /// into the group.
    fn dispatch(&self, cap: Capability, mut f: impl FnMut(&mut dyn Entity, &Context<'_>)) {
        let listeners = self.inner.listeners.borrow().snapshot(cap);
        for entity in &listeners {
            let cx = Context::new(self, entity);
            f(&mut *entity.borrow_mut(), &cx);
        }
    }

    /// Route a raw event to the matching listeners
    pub fn handle(&self, event: &Event) -> Handled {
        match event {
            Event::Quit => {
                return if self.quit() {
                    Handled::QuitAborted
                } else {
                    Handled::QuitAccepted
                };
            }
            Event::KeyDown { key, mods, repeat } => {
                let ev = KeyEvent {
                    key: *key,
                    mods: *mods,
                    repeat: *repeat,
                };
                if *repeat {
                    self.key_repeated(&ev);
                } else {
                    self.key_pressed(&ev);
                }
            }
            Event::KeyUp { key, mods } => self.key_released(&KeyEvent {
                key: *key,
                mods: *mods,
                repeat: false,
            }),
            Event::MouseButtonDown { x, y, button } => self.mouse_pressed(&MouseButtonEvent {
                screen: vec2(*x, *y),
                pos: vec2(*x, *y),
                button: *button,
                is_touch: false,
            }),
            Event::MouseButtonUp { x, y, button } => self.mouse_released(&MouseButtonEvent {
                screen: vec2(*x, *y),
                pos: vec2(*x, *y),
                button: *button,
                is_touch: false,
            }),
            Event::MouseMotion { x, y, xrel, yrel } => self.mouse_moved(&MouseMotionEvent {
                screen: vec2(*x, *y),
                pos: vec2(*x, *y),
                delta: vec2(*xrel, *yrel),
            }),
            Event::MouseWheel { x, y, direction } => self.mouse_scrolled(&MouseWheelEvent {
                delta: vec2(*x, *y),
                direction: *direction,
            }),
            Event::TextInput(text) => self.text_input(text),
            Event::FileDropped(path) => {
                if path.is_dir() {
                    self.directory_dropped(path);
                } else {
                    self.file_dropped(path);
                }
            }
        }
        Handled::Dispatched
    }

    pub fn key_pressed(&self, event: &KeyEvent) {
        self.dispatch(Capability::KeyPressed, |entity, cx| entity.key_pressed(cx, event));
    }

    pub fn key_repeated(&self, event: &KeyEvent) {
        self.dispatch(Capability::KeyRepeated, |entity, cx| entity.key_repeated(cx, event));
    }

    pub fn key_released(&self, event: &KeyEvent) {
        self.dispatch(Capability::KeyReleased, |entity, cx| entity.key_released(cx, event));
    }

    /// `event.pos` is in the enclosing space; listeners get it relative to
    /// this group's origin
    pub fn mouse_pressed(&self, event: &MouseButtonEvent) {
        let local = event.relative_to(self.origin());
        self.dispatch(Capability::MousePressed, |entity, cx| entity.mouse_pressed(cx, &local));
    }

    pub fn mouse_released(&self, event: &MouseButtonEvent) {
        let local = event.relative_to(self.origin());
        self.dispatch(Capability::MouseReleased, |entity, cx| entity.mouse_released(cx, &local));
    }

    pub fn mouse_moved(&self, event: &MouseMotionEvent) {
        let local = event.relative_to(self.origin());
        self.dispatch(Capability::MouseMoved, |entity, cx| entity.mouse_moved(cx, &local));
    }

    pub fn mouse_scrolled(&self, event: &MouseWheelEvent) {
        self.dispatch(Capability::MouseScrolled, |entity, cx| entity.mouse_scrolled(cx, event));
    }

    pub fn text_input(&self, text: &str) {
        self.dispatch(Capability::TextInput, |entity, cx| entity.text_input(cx, text));
    }

    pub fn file_dropped(&self, path: &Path) {
        self.dispatch(Capability::FileDropped, |entity, cx| entity.file_dropped(cx, path));
    }

    pub fn directory_dropped(&self, path: &Path) {
        self.dispatch(Capability::DirectoryDropped, |entity, cx| entity.directory_dropped(cx, path));
    }

    /// Ask Quit-capable entities, in order, whether to abort shutdown.
    /// The first `true` wins and the rest are not asked.
    pub fn quit(&self) -> bool {
        let listeners = self.inner.listeners.borrow().snapshot(Capability::Quit);
        for entity in &listeners {
            let cx = Context::new(self, entity);
            if entity.borrow_mut().quit(&cx) {
                log::info!("shutdown aborted by {:?}", entity);
                return true;
            }
        }
        false
    }

    // =========================================================================
    // Tags
    // =========================================================================

    pub fn add_tags<S: AsRef<str>>(&self, entity: &EntityRef, tags: &[S]) -> Result<(), GroupError> {
        if !self.contains(entity) {
            return Err(GroupError::NotAMember);
        }
        let mut index = self.inner.tags.borrow_mut();
        for tag in tags {
            index.add(entity, tag.as_ref());
        }
        Ok(())
    }

    /// Untag an entity. Every tag must already be known; nothing changes
    /// if one of them is not.
    pub fn remove_tags<S: AsRef<str>>(&self, entity: &EntityRef, tags: &[S]) -> Result<(), GroupError> {
        if !self.contains(entity) {
            return Err(GroupError::NotAMember);
        }
        let tags: Vec<&str> = tags.iter().map(|t| t.as_ref()).collect();
        let mut index = self.inner.tags.borrow_mut();
        if let Some(unknown) = tags.iter().find(|t| !index.is_known(t)) {
            return Err(GroupError::UnknownTag(unknown.to_string()));
        }
        for tag in tags {
            index.remove(entity, tag);
        }
        Ok(())
    }

    /// Every member carrying `tag`, in tagging order. Fails for a tag that
    /// was never added, even if it would be empty.
    pub fn find_all_with_tag(&self, tag: &str) -> Result<Vec<EntityRef>, GroupError> {
        self.inner
            .tags
            .borrow()
            .members(tag)
            .map(<[EntityRef]>::to_vec)
            .ok_or_else(|| GroupError::UnknownTag(tag.to_string()))
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Declare channels. Declaring a channel twice is fine.
    pub fn register_messages(&self, ids: impl IntoIterator<Item = MessageId>) -> Result<(), GroupError> {
        let mut bus = self.inner.messages.borrow_mut();
        for id in ids {
            bus.register(id)?;
        }
        Ok(())
    }

    /// Subscribe `entity` to a channel. One handler per entity and channel.
    pub fn connect<A: 'static>(
        &self,
        entity: &EntityRef,
        message: Message<A>,
        handler: impl Fn(&A) + 'static,
    ) -> Result<(), GroupError> {
        self.inner
            .messages
            .borrow_mut()
            .connect(entity, message, Rc::new(handler))
    }

    /// Call every handler of a declared channel, in subscription order,
    /// before returning. A panicking handler unwinds into the sender.
    pub fn send_message<A: 'static>(&self, message: Message<A>, args: &A) -> Result<(), GroupError> {
        let handlers = self.inner.messages.borrow().handlers(message)?;
        for handler in &handlers {
            handler(args);
        }
        Ok(())
    }

    /// Check the wiring once setup is done: every declared channel needs a
    /// handler (unless listed in `ignore`) and every handler needs a declared
    /// channel. All problems are reported together.
    pub fn validate_message_connections(&self, ignore: &[&str]) -> Result<(), GroupError> {
        let report = self.inner.messages.borrow().validate(ignore);
        if report.unregistered.is_empty() && report.unused.is_empty() {
            Ok(())
        } else {
            Err(GroupError::InvalidConnections {
                unregistered: report.unregistered,
                unused: report.unused,
            })
        }
    }
}

impl Default for EntityGroup {
    fn default() -> Self {
        Self::new()
    }
}

/// A nested group forwards everything it receives to its own members
impl Entity for EntityGroup {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn init(&mut self, cx: &Context<'_>) {
        EntityGroup::init(self, Some(cx.group()));
    }

    fn destroy(&mut self, _cx: &Context<'_>) {
        self.teardown();
    }

    fn update(&mut self, cx: &Context<'_>, dt: f32) {
        if let Err(e) = EntityGroup::update(self, dt) {
            log::debug!("nested group update failed: {}", e);
            cx.group().record_nested_error(e);
        }
    }

    fn key_pressed(&mut self, _cx: &Context<'_>, event: &KeyEvent) {
        EntityGroup::key_pressed(self, event);
    }

    fn key_repeated(&mut self, _cx: &Context<'_>, event: &KeyEvent) {
        EntityGroup::key_repeated(self, event);
    }

    fn key_released(&mut self, _cx: &Context<'_>, event: &KeyEvent) {
        EntityGroup::key_released(self, event);
    }

    fn mouse_pressed(&mut self, _cx: &Context<'_>, event: &MouseButtonEvent) {
        EntityGroup::mouse_pressed(self, event);
    }

    fn mouse_released(&mut self, _cx: &Context<'_>, event: &MouseButtonEvent) {
        EntityGroup::mouse_released(self, event);
    }

    fn mouse_moved(&mut self, _cx: &Context<'_>, event: &MouseMotionEvent) {
        EntityGroup::mouse_moved(self, event);
    }

    fn mouse_scrolled(&mut self, _cx: &Context<'_>, event: &MouseWheelEvent) {
        EntityGroup::mouse_scrolled(self, event);
    }

    fn text_input(&mut self, _cx: &Context<'_>, text: &str) {
        EntityGroup::text_input(self, text);
    }

    fn file_dropped(&mut self, _cx: &Context<'_>, path: &Path) {
        EntityGroup::file_dropped(self, path);
    }

    fn directory_dropped(&mut self, _cx: &Context<'_>, path: &Path) {
        EntityGroup::directory_dropped(self, path);
    }

    fn quit(&mut self, _cx: &Context<'_>) -> bool {
        EntityGroup::quit(self)
    }

    fn draw(&mut self, renderer: &mut dyn Renderer, origin: Vec2) {
        self.draw_at(renderer, origin);
    }
}
