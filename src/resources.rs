//! Resources - Sprite registry backed by declarative manifests
//!
//! A resource manifest names a bundle and lists the sprites in it:
//!
//! ```toml
//! name = "ui"
//!
//! [simple]
//! button = "button.png"
//! ```
//!
//! Every sprite is then addressable as `"<bundle>/<sprite>"`, e.g.
//! `"ui/button"`. Texture paths are relative to the manifest's directory.
//! The same document can be written in RON.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use macroquad::math::{vec2, Vec2};
use serde::Deserialize;

use crate::error::ResourceError;
use crate::manifest::{read_manifest, ManifestError};
use crate::render::{Renderer, SpriteParams, Texture, TextureId};
use crate::ui::Rect;

/// On-disk layout of a resource manifest
#[derive(Debug, Deserialize)]
struct ResourceManifest {
    name: String,
    /// Sprite name -> texture path, each sprite covering its whole texture
    #[serde(default)]
    simple: BTreeMap<String, PathBuf>,
}

/// A ready-to-draw sprite: a texture region and the size it is drawn at.
///
/// Cheap to copy, so entities usually keep their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    texture: TextureId,
    source: Option<Rect>,
    size: Vec2,
}

impl Sprite {
    /// Drawn size in pixels, scale included
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Draw with the top-left corner at (x, y), snapped to whole pixels
    pub fn draw(&self, renderer: &mut dyn Renderer, x: f32, y: f32) {
        self.draw_ex(renderer, x, y, &SpriteParams::default());
    }

    pub fn draw_ex(&self, renderer: &mut dyn Renderer, x: f32, y: f32, params: &SpriteParams) {
        let dest = Rect::new(x.round(), y.round(), self.size.x, self.size.y);
        renderer.draw_texture(self.texture, self.source, dest, params);
    }
}

/// Registry of textures and named sprites
pub struct Resources {
    scale: f32,
    /// Loaded textures keyed by the path they were loaded from
    textures: HashMap<PathBuf, Texture>,
    sprites: HashMap<String, Sprite>,
    /// Canonical paths of manifests already loaded
    loaded_files: HashSet<PathBuf>,
    loaded_names: HashSet<String>,
}

impl Resources {
    /// Create an empty registry. Every sprite is drawn `scale` times its
    /// source size.
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            textures: HashMap::new(),
            sprites: HashMap::new(),
            loaded_files: HashSet::new(),
            loaded_names: HashSet::new(),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn has_sprite(&self, name: &str) -> bool {
        self.sprites.contains_key(name)
    }

    /// Sprite names, sorted
    pub fn sprite_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sprites.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Whether the manifest at `path` was already loaded
    pub fn is_loaded(&self, path: &Path) -> bool {
        std::fs::canonicalize(path)
            .map(|p| self.loaded_files.contains(&p))
            .unwrap_or(false)
    }

    /// Declare a sprite covering a whole texture
    pub fn declare_simple_sprite(
        &mut self,
        renderer: &mut dyn Renderer,
        name: &str,
        texture_path: &Path,
    ) -> Result<(), ResourceError> {
        self.declare_sprite(renderer, name, texture_path, None)
    }

    /// Declare a sprite from a region of a texture (`None` for all of it).
    /// The texture is loaded on first use and shared afterwards.
    pub fn declare_sprite(
        &mut self,
        renderer: &mut dyn Renderer,
        name: &str,
        texture_path: &Path,
        source: Option<Rect>,
    ) -> Result<(), ResourceError> {
        if self.sprites.contains_key(name) {
            return Err(ResourceError::DuplicateSprite(name.to_string()));
        }

        let texture = self.texture(renderer, texture_path)?;
        let size = match source {
            Some(rect) => rect.size(),
            None => vec2(texture.width, texture.height),
        } * self.scale;

        log::debug!("declaring sprite {} => {}", name, texture_path.display());
        self.sprites.insert(
            name.to_string(),
            Sprite {
                texture: texture.id,
                source,
                size,
            },
        );
        Ok(())
    }

    /// Look up a declared sprite
    pub fn draw_function(&self, name: &str) -> Result<Sprite, ResourceError> {
        self.sprites
            .get(name)
            .copied()
            .ok_or_else(|| ResourceError::UnknownSprite(name.to_string()))
    }

    /// Load every sprite listed in a resource manifest.
    ///
    /// Loading a file that was already loaded does nothing. Two different
    /// files may not use the same bundle name, and a manifest whose sprites
    /// clash with existing ones is rejected before any sprite is declared.
    pub fn load(&mut self, renderer: &mut dyn Renderer, path: &Path) -> Result<(), ResourceError> {
        let canonical = std::fs::canonicalize(path).map_err(|e| ManifestError::Io(path.to_path_buf(), e))?;
        if self.loaded_files.contains(&canonical) {
            log::debug!("resources {} already loaded", path.display());
            return Ok(());
        }

        let manifest: ResourceManifest = read_manifest(path)?;
        if self.loaded_names.contains(&manifest.name) {
            return Err(ResourceError::DuplicateManifest(manifest.name));
        }
        log::info!("loading resources '{}' from {}", manifest.name, path.display());

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let sprites: Vec<(String, PathBuf)> = manifest
            .simple
            .iter()
            .map(|(local, texture)| (format!("{}/{}", manifest.name, local), base_dir.join(texture)))
            .collect();
        if let Some((name, _)) = sprites.iter().find(|(name, _)| self.sprites.contains_key(name)) {
            return Err(ResourceError::DuplicateSprite(name.clone()));
        }

        // Load every texture before declaring anything, so a missing file
        // leaves the registry as it was
        for (_, texture) in &sprites {
            self.texture(renderer, texture)?;
        }
        for (name, texture) in &sprites {
            self.declare_simple_sprite(renderer, name, texture)?;
        }

        self.loaded_files.insert(canonical);
        self.loaded_names.insert(manifest.name);
        Ok(())
    }

    fn texture(&mut self, renderer: &mut dyn Renderer, path: &Path) -> Result<Texture, ResourceError> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(*texture);
        }
        let texture = renderer.load_texture(path)?;
        self.textures.insert(path.to_path_buf(), texture);
        Ok(texture)
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::new(1.0)
    }
}
