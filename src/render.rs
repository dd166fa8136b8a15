//! Rendering boundary
//!
//! Entities draw through the object-safe [`Renderer`] trait so the core
//! never touches macroquad's global drawing state directly. Textures and
//! fonts live inside the renderer and are referred to by small handles.

use std::path::Path;

use macroquad::color::Color;
use macroquad::prelude::{
    clear_background, draw_rectangle, draw_text_ex, draw_texture_ex, load_ttf_font_from_bytes,
    measure_text, vec2, DrawTextureParams, FilterMode, Font, TextParams, Texture2D, WHITE,
};

use crate::error::ResourceError;
use crate::ui::Rect;

/// Distance between text baselines, as a multiple of the font size
pub const LINE_SPACING: f32 = 1.2;

/// Handle to a texture owned by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// Handle to a font owned by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub usize);

/// A loaded texture and its pixel size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Texture {
    pub id: TextureId,
    pub width: f32,
    pub height: f32,
}

/// Per-draw sprite options
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpriteParams {
    /// Clockwise rotation in degrees around the destination center
    pub angle: f32,
    pub flip_x: bool,
    pub flip_y: bool,
}

/// How a run of text is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// `None` uses macroquad's built-in font
    pub font: Option<FontId>,
    pub size: u16,
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: None,
            size: 16,
            color: Color::from_rgba(0, 0, 0, 255),
        }
    }
}

/// Everything entities need to put pixels on screen
pub trait Renderer {
    fn load_texture(&mut self, path: &Path) -> Result<Texture, ResourceError>;

    fn load_font(&mut self, path: &Path) -> Result<FontId, ResourceError>;

    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, color: Color, rect: Rect);

    /// Draw `source` (or the whole texture) stretched over `dest`
    fn draw_texture(&mut self, texture: TextureId, source: Option<Rect>, dest: Rect, params: &SpriteParams);

    /// Draw a single line of text with its top-left corner at (x, y)
    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle);

    /// Vertical advance between consecutive lines of text
    fn line_skip(&self, style: &TextStyle) -> f32 {
        (style.size as f32 * LINE_SPACING).round()
    }
}

/// [`Renderer`] backed by macroquad's immediate-mode drawing functions.
///
/// Only usable once the macroquad window exists.
#[derive(Default)]
pub struct MacroquadRenderer {
    textures: Vec<Texture2D>,
    fonts: Vec<Font>,
}

impl MacroquadRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn font(&self, id: Option<FontId>) -> Option<&Font> {
        id.and_then(|id| self.fonts.get(id.0))
    }
}

impl Renderer for MacroquadRenderer {
    fn load_texture(&mut self, path: &Path) -> Result<Texture, ResourceError> {
        let image = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(io) => ResourceError::Io(path.to_path_buf(), io),
            other => ResourceError::Image(path.to_path_buf(), other),
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(ResourceError::TextureTooLarge(path.to_path_buf(), width, height));
        };

        let texture = Texture2D::from_rgba8(w, h, rgba.as_raw());
        // Pixel art stays crisp when scaled
        texture.set_filter(FilterMode::Nearest);

        let id = TextureId(self.textures.len());
        self.textures.push(texture);
        Ok(Texture {
            id,
            width: width as f32,
            height: height as f32,
        })
    }

    fn load_font(&mut self, path: &Path) -> Result<FontId, ResourceError> {
        let bytes = std::fs::read(path).map_err(|e| ResourceError::Io(path.to_path_buf(), e))?;
        let font = load_ttf_font_from_bytes(&bytes)
            .map_err(|e| ResourceError::Font(path.to_path_buf(), e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        Ok(id)
    }

    fn clear(&mut self, color: Color) {
        clear_background(color);
    }

    fn fill_rect(&mut self, color: Color, rect: Rect) {
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, color);
    }

    fn draw_texture(&mut self, texture: TextureId, source: Option<Rect>, dest: Rect, params: &SpriteParams) {
        let Some(texture) = self.textures.get(texture.0) else {
            log::warn!("draw_texture: unknown texture {:?}", texture);
            return;
        };
        draw_texture_ex(
            texture,
            dest.x,
            dest.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(dest.w, dest.h)),
                source: source.map(Into::into),
                rotation: params.angle.to_radians(),
                flip_x: params.flip_x,
                flip_y: params.flip_y,
                pivot: None,
            },
        );
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        let font = self.font(style.font);
        // macroquad anchors text at the baseline
        let ascent = measure_text("Mg", font, style.size, 1.0).offset_y;
        draw_text_ex(
            text,
            x.round(),
            (y + ascent).round(),
            TextParams {
                font,
                font_size: style.size,
                color: style.color,
                ..Default::default()
            },
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// One recorded renderer call
    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCall {
        Clear(Color),
        FillRect(Color, Rect),
        Texture {
            texture: TextureId,
            source: Option<Rect>,
            dest: Rect,
            params: SpriteParams,
        },
        Text {
            text: String,
            x: f32,
            y: f32,
            style: TextStyle,
        },
    }

    /// Headless renderer that records what would have been drawn
    pub struct RecordingRenderer {
        pub calls: Vec<DrawCall>,
        pub loaded_textures: Vec<std::path::PathBuf>,
        /// Size reported for every loaded texture
        pub texture_size: (f32, f32),
        fonts: usize,
    }

    impl RecordingRenderer {
        pub fn new() -> Self {
            Self {
                calls: Vec::new(),
                loaded_textures: Vec::new(),
                texture_size: (32.0, 16.0),
                fonts: 0,
            }
        }
    }

    impl Renderer for RecordingRenderer {
        fn load_texture(&mut self, path: &Path) -> Result<Texture, ResourceError> {
            if !path.exists() {
                let err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
                return Err(ResourceError::Io(path.to_path_buf(), err));
            }
            let id = TextureId(self.loaded_textures.len());
            self.loaded_textures.push(path.to_path_buf());
            Ok(Texture {
                id,
                width: self.texture_size.0,
                height: self.texture_size.1,
            })
        }

        fn load_font(&mut self, _path: &Path) -> Result<FontId, ResourceError> {
            self.fonts += 1;
            Ok(FontId(self.fonts - 1))
        }

        fn clear(&mut self, color: Color) {
            self.calls.push(DrawCall::Clear(color));
        }

        fn fill_rect(&mut self, color: Color, rect: Rect) {
            self.calls.push(DrawCall::FillRect(color, rect));
        }

        fn draw_texture(&mut self, texture: TextureId, source: Option<Rect>, dest: Rect, params: &SpriteParams) {
            self.calls.push(DrawCall::Texture {
                texture,
                source,
                dest,
                params: *params,
            });
        }

        fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
            self.calls.push(DrawCall::Text {
                text: text.to_string(),
                x,
                y,
                style: *style,
            });
        }
    }
}
