//! Message bus
//!
//! Channels are named by [`Message`] tokens that also fix the argument type,
//! so a handler can never be called with the wrong payload. Every channel must
//! be declared with `register_messages` before it can be sent on, and a
//! validation pass catches channels nobody listens to and listeners on
//! channels nobody declared.

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::entity::EntityRef;
use crate::error::GroupError;

/// Typed channel token.
///
/// ```ignore
/// const SCORED: Message<u32> = Message::new("scored");
/// ```
pub struct Message<A: 'static> {
    name: &'static str,
    _args: PhantomData<fn(&A)>,
}

impl<A: 'static> Message<A> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _args: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Untyped description, for `register_messages`
    pub fn id(&self) -> MessageId {
        MessageId {
            name: self.name,
            args: TypeId::of::<A>(),
            args_name: std::any::type_name::<A>(),
        }
    }
}

impl<A: 'static> Clone for Message<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: 'static> Copy for Message<A> {}

impl<A: 'static> fmt::Debug for Message<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Message<{}>({:?})", std::any::type_name::<A>(), self.name)
    }
}

/// A channel name together with its argument type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageId {
    name: &'static str,
    args: TypeId,
    args_name: &'static str,
}

impl MessageId {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Stored as `Rc<dyn Any>` wrapping an `Rc<dyn Fn(&A)>`
type ErasedHandler = Rc<dyn Any>;

struct Subscription {
    entity: EntityRef,
    handler: ErasedHandler,
}

struct Channel {
    declared: bool,
    args: TypeId,
    args_name: &'static str,
    subscriptions: Vec<Subscription>,
}

impl Channel {
    fn new(id: MessageId, declared: bool) -> Self {
        Self {
            declared,
            args: id.args,
            args_name: id.args_name,
            subscriptions: Vec::new(),
        }
    }

    fn check(&self, id: MessageId) -> Result<(), GroupError> {
        if self.args == id.args {
            Ok(())
        } else {
            Err(GroupError::MessageTypeMismatch {
                name: id.name,
                expected: self.args_name,
                found: id.args_name,
            })
        }
    }
}

/// Outcome of a validation pass
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ConnectionReport {
    pub unregistered: Vec<&'static str>,
    pub unused: Vec<&'static str>,
}

#[derive(Default)]
pub(crate) struct MessageBus {
    channels: BTreeMap<&'static str, Channel>,
}

impl MessageBus {
    /// Declare a channel. Declaring again is a no-op.
    pub fn register(&mut self, id: MessageId) -> Result<(), GroupError> {
        match self.channels.get_mut(id.name) {
            Some(channel) => {
                channel.check(id)?;
                channel.declared = true;
            }
            None => {
                self.channels.insert(id.name, Channel::new(id, true));
            }
        }
        Ok(())
    }

    pub fn connect<A: 'static>(
        &mut self,
        entity: &EntityRef,
        message: Message<A>,
        handler: Rc<dyn Fn(&A)>,
    ) -> Result<(), GroupError> {
        let id = message.id();
        // Connecting to an undeclared channel is allowed here and reported
        // by validation, so wiring order does not matter during setup.
        let channel = self
            .channels
            .entry(id.name)
            .or_insert_with(|| Channel::new(id, false));
        channel.check(id)?;
        if channel.subscriptions.iter().any(|s| &s.entity == entity) {
            return Err(GroupError::AlreadyConnected(id.name));
        }
        channel.subscriptions.push(Subscription {
            entity: entity.clone(),
            handler: Rc::new(handler),
        });
        Ok(())
    }

    /// Handlers for a declared channel, in subscription order
    pub fn handlers<A: 'static>(&self, message: Message<A>) -> Result<Vec<Rc<dyn Fn(&A)>>, GroupError> {
        let id = message.id();
        let channel = self
            .channels
            .get(id.name)
            .filter(|c| c.declared)
            .ok_or(GroupError::UnregisteredMessage(id.name))?;
        channel.check(id)?;
        Ok(channel
            .subscriptions
            .iter()
            .filter_map(|s| s.handler.downcast_ref::<Rc<dyn Fn(&A)>>().cloned())
            .collect())
    }

    /// Drop every subscription held by `entity`
    pub fn purge(&mut self, entity: &EntityRef) {
        for channel in self.channels.values_mut() {
            channel.subscriptions.retain(|s| &s.entity != entity);
        }
    }

    pub fn is_subscribed(&self, entity: &EntityRef) -> bool {
        self.channels
            .values()
            .any(|c| c.subscriptions.iter().any(|s| &s.entity == entity))
    }

    /// Find unused and unregistered channels, sorted by name
    pub fn validate(&self, ignore: &[&str]) -> ConnectionReport {
        let mut report = ConnectionReport::default();
        for (name, channel) in &self.channels {
            if !channel.declared {
                report.unregistered.push(*name);
            } else if channel.subscriptions.is_empty() && !ignore.contains(name) {
                report.unused.push(*name);
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Capabilities, Entity};
    use std::cell::RefCell;

    struct Probe;

    impl Entity for Probe {
        fn capabilities(&self) -> Capabilities {
            Capabilities::NONE
        }
    }

    const PING: Message<u32> = Message::new("ping");
    const PING_TEXT: Message<String> = Message::new("ping");
    const PONG: Message<()> = Message::new("pong");

    #[test]
    fn test_handlers_in_subscription_order() {
        let mut bus = MessageBus::default();
        bus.register(PING.id()).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b"] {
            let log = log.clone();
            bus.connect(&EntityRef::new(Probe), PING, Rc::new(move |n: &u32| log.borrow_mut().push((tag, *n))))
                .unwrap();
        }
        for handler in bus.handlers(PING).unwrap() {
            handler(&7);
        }
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_type_mismatch() {
        let mut bus = MessageBus::default();
        bus.register(PING.id()).unwrap();
        assert!(matches!(
            bus.register(PING_TEXT.id()),
            Err(GroupError::MessageTypeMismatch { name: "ping", .. })
        ));
        assert!(matches!(bus.handlers(PING_TEXT), Err(GroupError::MessageTypeMismatch { .. })));
    }

    #[test]
    fn test_undeclared_channel_is_unregistered() {
        let mut bus = MessageBus::default();
        let e = EntityRef::new(Probe);
        bus.connect(&e, PONG, Rc::new(|_: &()| {})).unwrap();
        assert!(matches!(bus.handlers(PONG), Err(GroupError::UnregisteredMessage("pong"))));

        bus.register(PING.id()).unwrap();
        let report = bus.validate(&[]);
        assert_eq!(report.unregistered, vec!["pong"]);
        assert_eq!(report.unused, vec!["ping"]);
        assert!(bus.validate(&["ping"]).unused.is_empty());

        // declaring it afterwards fixes the wiring
        bus.register(PONG.id()).unwrap();
        assert!(bus.validate(&["ping"]).unregistered.is_empty());
    }

    #[test]
    fn test_purge_removes_subscriptions() {
        let mut bus = MessageBus::default();
        bus.register(PONG.id()).unwrap();
        let e = EntityRef::new(Probe);
        bus.connect(&e, PONG, Rc::new(|_: &()| {})).unwrap();
        assert!(bus.is_subscribed(&e));
        bus.purge(&e);
        assert!(!bus.is_subscribed(&e));
        assert!(bus.handlers(PONG).unwrap().is_empty());
    }
}
