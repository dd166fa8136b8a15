//! Entities and capabilities
//!
//! An entity is anything implementing [`Entity`]. Instead of probing for
//! methods at dispatch time, each entity declares up front which callbacks
//! it wants through [`Entity::capabilities`]; the group reads that set once
//! when the entity is added and files it into the matching listener lists.
//!
//! Entities are shared through [`EntityRef`], whose equality is pointer
//! identity: two entities with identical state are still different entities.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::rc::Rc;

use macroquad::math::Vec2;

use crate::event::{KeyEvent, MouseButtonEvent, MouseMotionEvent, MouseWheelEvent};
use crate::group::EntityGroup;
use crate::render::Renderer;

/// A callback an entity may opt into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Init,
    Destroy,
    Update,
    KeyPressed,
    KeyRepeated,
    KeyReleased,
    MousePressed,
    MouseReleased,
    MouseMoved,
    MouseScrolled,
    TextInput,
    FileDropped,
    DirectoryDropped,
    Quit,
    Draw,
}

impl Capability {
    pub const COUNT: usize = 15;

    pub const ALL: [Capability; Capability::COUNT] = [
        Capability::Init,
        Capability::Destroy,
        Capability::Update,
        Capability::KeyPressed,
        Capability::KeyRepeated,
        Capability::KeyReleased,
        Capability::MousePressed,
        Capability::MouseReleased,
        Capability::MouseMoved,
        Capability::MouseScrolled,
        Capability::TextInput,
        Capability::FileDropped,
        Capability::DirectoryDropped,
        Capability::Quit,
        Capability::Draw,
    ];

    /// Position in [`Capability::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// A set of [`Capability`] values
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u16);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);

    pub const ALL: Capabilities = Capabilities::of(&Capability::ALL);

    /// Build a set from a list, usable in `const` context
    pub const fn of(caps: &[Capability]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < caps.len() {
            bits |= caps[i].bit();
            i += 1;
        }
        Capabilities(bits)
    }

    pub const fn with(self, cap: Capability) -> Self {
        Capabilities(self.0 | cap.bit())
    }

    pub const fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate in [`Capability::ALL`] order
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// What a callback gets to know about where it is running.
///
/// Gives access to the dispatching group (to queue removals, send messages,
/// tag entities...) and to the handle of the entity being called.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    group: &'a EntityGroup,
    entity: &'a EntityRef,
}

impl<'a> Context<'a> {
    pub(crate) fn new(group: &'a EntityGroup, entity: &'a EntityRef) -> Self {
        Self { group, entity }
    }

    /// The group dispatching this callback
    pub fn group(&self) -> &'a EntityGroup {
        self.group
    }

    /// Handle to the entity receiving this callback
    pub fn entity(&self) -> &'a EntityRef {
        self.entity
    }

    /// Queue this entity for destruction at the start of the next update
    pub fn destroy_self(&self) {
        self.group.destroy(self.entity);
    }

    /// Queue this entity for removal at the start of the next update
    pub fn remove_self(&self) {
        self.group.remove(self.entity);
    }
}

/// A participant in a group's dispatch.
///
/// Every callback has a no-op default; a callback is only ever invoked when
/// its [`Capability`] is in [`capabilities`](Entity::capabilities).
#[allow(unused_variables)]
pub trait Entity: 'static {
    /// Which callbacks this entity wants. Read once, when the entity is added.
    fn capabilities(&self) -> Capabilities;

    fn init(&mut self, cx: &Context<'_>) {}

    /// Called right before the entity is purged by a queued destroy
    fn destroy(&mut self, cx: &Context<'_>) {}

    fn update(&mut self, cx: &Context<'_>, dt: f32) {}

    fn key_pressed(&mut self, cx: &Context<'_>, event: &KeyEvent) {}

    fn key_repeated(&mut self, cx: &Context<'_>, event: &KeyEvent) {}

    fn key_released(&mut self, cx: &Context<'_>, event: &KeyEvent) {}

    fn mouse_pressed(&mut self, cx: &Context<'_>, event: &MouseButtonEvent) {}

    fn mouse_released(&mut self, cx: &Context<'_>, event: &MouseButtonEvent) {}

    fn mouse_moved(&mut self, cx: &Context<'_>, event: &MouseMotionEvent) {}

    fn mouse_scrolled(&mut self, cx: &Context<'_>, event: &MouseWheelEvent) {}

    fn text_input(&mut self, cx: &Context<'_>, text: &str) {}

    fn file_dropped(&mut self, cx: &Context<'_>, path: &Path) {}

    fn directory_dropped(&mut self, cx: &Context<'_>, path: &Path) {}

    /// Return `true` to abort the shutdown
    fn quit(&mut self, cx: &Context<'_>) -> bool {
        false
    }

    /// `origin` is the accumulated offset of every enclosing group
    fn draw(&mut self, renderer: &mut dyn Renderer, origin: Vec2) {}
}

/// Shared handle to an entity, compared by identity.
///
/// The capability set is read once when the handle is made, so adding an
/// entity to a group never has to borrow it.
#[derive(Clone)]
pub struct EntityRef {
    entity: Rc<RefCell<dyn Entity>>,
    caps: Capabilities,
}

impl EntityRef {
    /// Move an entity into a new shared handle
    pub fn new<E: Entity>(entity: E) -> Self {
        let caps = entity.capabilities();
        EntityRef {
            entity: Rc::new(RefCell::new(entity)),
            caps,
        }
    }

    /// Wrap an entity the caller keeps its own typed handle to.
    ///
    /// Panics if the entity is mutably borrowed at the time.
    pub fn from_shared<E: Entity>(entity: &Rc<RefCell<E>>) -> Self {
        let caps = entity.borrow().capabilities();
        let shared: Rc<RefCell<dyn Entity>> = entity.clone();
        EntityRef { entity: shared, caps }
    }

    /// Borrow the entity mutably for a callback.
    ///
    /// Panics if the entity is already borrowed, i.e. a callback re-entered
    /// the entity it was dispatched from.
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, dyn Entity> {
        self.entity.borrow_mut()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Identity comparison against a typed handle
    pub fn is<E: Entity>(&self, entity: &Rc<RefCell<E>>) -> bool {
        self.addr() == Rc::as_ptr(entity) as *const () as usize
    }

    fn addr(&self) -> usize {
        Rc::as_ptr(&self.entity) as *const () as usize
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityRef({:#x})", self.addr())
    }
}

impl<E: Entity> From<Rc<RefCell<E>>> for EntityRef {
    fn from(entity: Rc<RefCell<E>>) -> Self {
        EntityRef::from_shared(&entity)
    }
}
