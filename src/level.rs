//! Level loading
//!
//! A level manifest lists the resource bundles it needs and the entities to
//! place, each built by a constructor registered under its `type`:
//!
//! ```toml
//! resources = ["ui"]          # loads ui.toml next to the level
//!
//! [[entities]]
//! type = "block"
//! pos = [10.0, 20.0]
//! layer = 3                   # optional
//! tags = ["solid"]            # optional
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::entity::{Entity, EntityRef};
use crate::error::{LevelError, ResourceError};
use crate::group::{EntityGroup, DEFAULT_DRAW_LAYER};
use crate::manifest::{ManifestError, ManifestFormat};
use crate::render::Renderer;
use crate::resources::Resources;

#[derive(Debug, Deserialize)]
struct LevelManifest {
    /// Bundle names, resolved next to the level file
    #[serde(default)]
    resources: Vec<String>,
    #[serde(default)]
    entities: Vec<EntityPlacement>,
}

#[derive(Debug, Deserialize)]
struct EntityPlacement {
    #[serde(rename = "type")]
    kind: String,
    pos: [f32; 2],
    #[serde(default)]
    layer: Option<i32>,
    #[serde(default)]
    tags: Vec<String>,
}

type Constructor = Box<dyn Fn(f32, f32, &Resources) -> Result<EntityRef, ResourceError>>;

/// Entity constructors by level `type` name
#[derive(Default)]
pub struct Constructors {
    by_name: HashMap<String, Constructor>,
}

impl Constructors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor called with the entity's position and the
    /// loaded resources. Registering a name again replaces the old one.
    pub fn register<E, F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        E: Entity,
        F: Fn(f32, f32, &Resources) -> Result<E, ResourceError> + 'static,
    {
        self.by_name.insert(
            name.into(),
            Box::new(move |x: f32, y: f32, resources: &Resources| {
                constructor(x, y, resources).map(EntityRef::new)
            }),
        );
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }
}

/// Load a level into `group`, returning the added entities in file order.
///
/// Resource bundles are loaded first. Every entity is constructed before
/// any is added, so an unknown type or failing constructor leaves the group
/// untouched (resources loaded by then stay loaded).
pub fn load_level(
    path: &Path,
    group: &EntityGroup,
    resources: &mut Resources,
    renderer: &mut dyn Renderer,
    constructors: &Constructors,
) -> Result<Vec<EntityRef>, LevelError> {
    let format =
        ManifestFormat::from_path(path).ok_or_else(|| ManifestError::UnsupportedFormat(path.to_path_buf()))?;
    let text = std::fs::read_to_string(path).map_err(|e| ManifestError::Io(path.to_path_buf(), e))?;
    let level: LevelManifest = format.parse(&text, path)?;
    log::info!(
        "loading level {} ({} resource bundles, {} entities)",
        path.display(),
        level.resources.len(),
        level.entities.len()
    );

    let level_dir = path.parent().unwrap_or_else(|| Path::new(""));
    for name in &level.resources {
        let bundle = level_dir.join(format!("{}.{}", name, format.extension()));
        log::info!("loading resource {:?}", name);
        resources.load(renderer, &bundle)?;
    }

    if let Some(unknown) = level.entities.iter().find(|e| !constructors.contains(&e.kind)) {
        return Err(LevelError::UnknownConstructor(unknown.kind.clone()));
    }

    let mut built = Vec::with_capacity(level.entities.len());
    for placement in &level.entities {
        let Some(constructor) = constructors.by_name.get(&placement.kind) else {
            return Err(LevelError::UnknownConstructor(placement.kind.clone()));
        };
        let [x, y] = placement.pos;
        let entity = constructor(x, y, resources).map_err(|source| LevelError::Construct {
            kind: placement.kind.clone(),
            source,
        })?;
        built.push(entity);
    }

    for (entity, placement) in built.iter().zip(&level.entities) {
        group.add(entity.clone(), placement.layer.unwrap_or(DEFAULT_DRAW_LAYER))?;
        if !placement.tags.is_empty() {
            group.add_tags(entity, &placement.tags)?;
        }
    }
    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Capabilities, Capability};
    use crate::render::testing::{DrawCall, RecordingRenderer};
    use crate::resources::Sprite;
    use crate::ui::Rect;
    use macroquad::math::Vec2;
    use std::fs;

    struct Block {
        sprite: Sprite,
        x: f32,
        y: f32,
    }

    impl Entity for Block {
        fn capabilities(&self) -> Capabilities {
            Capabilities::of(&[Capability::Draw])
        }

        fn draw(&mut self, renderer: &mut dyn Renderer, origin: Vec2) {
            self.sprite.draw(renderer, self.x + origin.x, self.y + origin.y);
        }
    }

    struct Marker;

    impl Entity for Marker {
        fn capabilities(&self) -> Capabilities {
            Capabilities::NONE
        }
    }

    fn constructors() -> Constructors {
        let mut constructors = Constructors::new();
        constructors
            .register("block", |x, y, res: &Resources| {
                Ok(Block {
                    sprite: res.draw_function("tiles/block")?,
                    x,
                    y,
                })
            })
            .register("marker", |_, _, _: &Resources| Ok(Marker));
        constructors
    }

    fn level_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("block.png"), "").unwrap();
        fs::write(
            dir.path().join("tiles.toml"),
            "name = \"tiles\"\n[simple]\nblock = \"block.png\"\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_load_level_places_entities() {
        let dir = level_dir();
        let level = dir.path().join("one.toml");
        fs::write(
            &level,
            r#"
resources = ["tiles"]

[[entities]]
type = "block"
pos = [10.0, 20.0]
layer = 3
tags = ["solid", "ground"]

[[entities]]
type = "marker"
pos = [0.0, 0.0]
"#,
        )
        .unwrap();

        let group = EntityGroup::new();
        let mut resources = Resources::default();
        let mut renderer = RecordingRenderer::new();
        let added = load_level(&level, &group, &mut resources, &mut renderer, &constructors()).unwrap();

        assert_eq!(added.len(), 2);
        assert_eq!(group.len(), 2);
        assert_eq!(group.layers(), vec![1, 3]);
        assert_eq!(group.find_all_with_tag("solid").unwrap(), vec![added[0].clone()]);
        assert!(resources.has_sprite("tiles/block"));

        group.draw(&mut renderer);
        assert!(matches!(
            renderer.calls.as_slice(),
            [DrawCall::Texture { dest, .. }] if *dest == Rect::new(10.0, 20.0, 32.0, 16.0)
        ));
    }

    #[test]
    fn test_ron_level_resolves_ron_bundles() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("block.png"), "").unwrap();
        fs::write(dir.path().join("tiles.ron"), "(name: \"tiles\", simple: {\"block\": \"block.png\"})").unwrap();
        let level = dir.path().join("two.ron");
        fs::write(
            &level,
            "(resources: [\"tiles\"], entities: [(type: \"block\", pos: (1.0, 2.0))])",
        )
        .unwrap();

        let group = EntityGroup::new();
        let mut resources = Resources::default();
        let mut renderer = RecordingRenderer::new();
        load_level(&level, &group, &mut resources, &mut renderer, &constructors()).unwrap();
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_unknown_type_adds_nothing() {
        let dir = level_dir();
        let level = dir.path().join("bad.toml");
        fs::write(
            &level,
            "[[entities]]\ntype = \"marker\"\npos = [0.0, 0.0]\n\n[[entities]]\ntype = \"dragon\"\npos = [0.0, 0.0]\n",
        )
        .unwrap();

        let group = EntityGroup::new();
        let mut resources = Resources::default();
        let mut renderer = RecordingRenderer::new();
        let result = load_level(&level, &group, &mut resources, &mut renderer, &constructors());
        assert!(matches!(result, Err(LevelError::UnknownConstructor(kind)) if kind == "dragon"));
        assert!(group.is_empty());
    }

    #[test]
    fn test_constructor_failure_is_reported_with_type() {
        let dir = tempfile::tempdir().unwrap();
        let level = dir.path().join("nores.toml");
        // no resources listed, so the block sprite is unknown
        fs::write(&level, "[[entities]]\ntype = \"block\"\npos = [0.0, 0.0]\n").unwrap();

        let group = EntityGroup::new();
        let mut resources = Resources::default();
        let mut renderer = RecordingRenderer::new();
        let result = load_level(&level, &group, &mut resources, &mut renderer, &constructors());
        assert!(matches!(
            result,
            Err(LevelError::Construct { kind, source: ResourceError::UnknownSprite(_) }) if kind == "block"
        ));
        assert!(group.is_empty());
    }

    #[test]
    fn test_missing_resource_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let level = dir.path().join("lvl.toml");
        fs::write(&level, "resources = [\"nowhere\"]\n").unwrap();

        let group = EntityGroup::new();
        let mut resources = Resources::default();
        let mut renderer = RecordingRenderer::new();
        let result = load_level(&level, &group, &mut resources, &mut renderer, &constructors());
        assert!(matches!(result, Err(LevelError::Resource(ResourceError::Manifest(ManifestError::Io(..))))));
    }

    #[test]
    fn test_unsupported_extension() {
        let group = EntityGroup::new();
        let mut resources = Resources::default();
        let mut renderer = RecordingRenderer::new();
        let result = load_level(
            Path::new("level.json"),
            &group,
            &mut resources,
            &mut renderer,
            &constructors(),
        );
        assert!(matches!(result, Err(LevelError::Manifest(ManifestError::UnsupportedFormat(_)))));
    }
}
