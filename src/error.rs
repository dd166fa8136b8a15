//! Error types
//!
//! Contract violations (double add, unknown tag, double subscribe...) are
//! wiring bugs: they come back as `Err` immediately and leave every index
//! untouched. Nothing here is retried.

use std::path::PathBuf;

use crate::manifest::ManifestError;

/// Errors raised by [`EntityGroup`](crate::group::EntityGroup) operations.
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error("entity is already a member of this group")]
    AlreadyMember,

    #[error("entity is not a member of this group")]
    NotAMember,

    #[error("tag {0:?} was never registered")]
    UnknownTag(String),

    #[error("entity is already connected to message {0:?}")]
    AlreadyConnected(&'static str),

    #[error("message {0:?} was never registered")]
    UnregisteredMessage(&'static str),

    #[error("message {name:?} carries `{expected}`, not `{found}`")]
    MessageTypeMismatch {
        name: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Every wiring mistake found by a validation pass, reported at once.
    #[error("Unregistered message(s): {unregistered:?}, Unused message type(s): {unused:?}")]
    InvalidConnections {
        unregistered: Vec<&'static str>,
        unused: Vec<&'static str>,
    },
}

/// Errors raised while loading textures, fonts and resource manifests.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("I/O error loading '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to decode image '{0}': {1}")]
    Image(PathBuf, #[source] image::ImageError),

    #[error("image '{0}' is too large for a texture ({1}x{2})")]
    TextureTooLarge(PathBuf, u32, u32),

    #[error("failed to load font '{0}': {1}")]
    Font(PathBuf, String),

    #[error("a resource manifest named {0:?} is already loaded")]
    DuplicateManifest(String),

    #[error("sprite {0:?} is already declared")]
    DuplicateSprite(String),

    #[error("sprite {0:?} is not declared")]
    UnknownSprite(String),
}

/// Errors raised by [`load_level`](crate::level::load_level).
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error("no constructor registered for entity type {0:?}")]
    UnknownConstructor(String),

    #[error("constructor for {kind:?} failed: {source}")]
    Construct {
        kind: String,
        #[source]
        source: ResourceError,
    },
}

/// Any error the framework can produce.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Group(#[from] GroupError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Level(#[from] LevelError),
}

pub type Result<T> = std::result::Result<T, Error>;
