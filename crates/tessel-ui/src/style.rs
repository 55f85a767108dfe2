//! Style system for widgets.
//!
//! A [`Style`] is registered once in a [`StyleTable`] under the name of a
//! widget type and shared by every widget resolving to it. Resolution walks
//! the widget's type chain, most derived first, and ends at the `"Widget"`
//! default which every table carries.

use std::sync::Arc;

use tessel_core::alloc::HashMap;
use tessel_core::object::Type;
pub use taffy::FlexDirection;
use taffy::{Dimension, LengthPercentage, Rect, style::Style as TaffyStyle};

use crate::state::WidgetState;

/// Name of the style every table falls back to.
pub const DEFAULT_STYLE: &str = "Widget";

/// RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// From a `0xRRGGBB` value.
    pub fn hex(value: u32) -> Self {
        Color::rgb(
            ((value >> 16) & 0xff) as f32 / 255.0,
            ((value >> 8) & 0xff) as f32 / 255.0,
            (value & 0xff) as f32 / 255.0,
        )
    }
}

/// Visual attributes of a frame in one state.
#[derive(Debug, Clone, PartialEq)]
pub struct InkStyle {
    pub background: Option<Color>,
    pub border: Option<Color>,
    pub text: Color,
    pub border_width: f32,
    pub corner_radius: f32,
}

impl Default for InkStyle {
    fn default() -> Self {
        InkStyle {
            background: None,
            border: None,
            text: Color::BLACK,
            border_width: 0.0,
            corner_radius: 0.0,
        }
    }
}

impl InkStyle {
    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn border(mut self, color: Color, width: f32) -> Self {
        self.border = Some(color);
        self.border_width = width;
        self
    }

    pub fn text(mut self, color: Color) -> Self {
        self.text = color;
        self
    }

    pub fn corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }
}

/// How a frame takes part in hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Opacity {
    /// The frame is a hit target.
    #[default]
    Opaque,
    /// Never a hit itself, but its children are tested.
    Clear,
    /// Ignored by hit-testing together with its whole subtree.
    Hollow,
}

/// Named visual and layout configuration shared by widgets.
#[derive(Debug, Clone)]
pub struct Style {
    name: String,
    /// Taffy layout style
    pub layout: TaffyStyle,
    pub opacity: Opacity,
    /// Skin used when no state skin applies.
    pub ink: InkStyle,
    skins: Vec<(WidgetState, InkStyle)>,
}

impl Style {
    pub fn new(name: impl Into<String>) -> Self {
        Style {
            name: name.into(),
            layout: TaffyStyle::default(),
            opacity: Opacity::Opaque,
            ink: InkStyle::default(),
            skins: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(mut self, layout: TaffyStyle) -> Self {
        self.layout = layout;
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.layout.size.width = Dimension::Length(width);
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.layout.size.height = Dimension::Length(height);
        self
    }

    pub fn flex_direction(mut self, direction: FlexDirection) -> Self {
        self.layout.flex_direction = direction;
        self
    }

    pub fn padding(mut self, padding: f32) -> Self {
        self.layout.padding = Rect {
            left: LengthPercentage::Length(padding),
            right: LengthPercentage::Length(padding),
            top: LengthPercentage::Length(padding),
            bottom: LengthPercentage::Length(padding),
        };
        self
    }

    pub fn opacity(mut self, opacity: Opacity) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn ink(mut self, ink: InkStyle) -> Self {
        self.ink = ink;
        self
    }

    /// Skin applied while the widget state contains `state`.
    pub fn with_skin(mut self, state: WidgetState, ink: InkStyle) -> Self {
        match self.skins.iter_mut().find(|(s, _)| *s == state) {
            Some((_, existing)) => *existing = ink,
            None => self.skins.push((state, ink)),
        }
        self
    }

    /// Skin for `state`: the exact match, else the skin whose state is the
    /// largest subset of `state`, else the base ink.
    pub fn skin(&self, state: WidgetState) -> &InkStyle {
        if let Some((_, ink)) = self.skins.iter().find(|(s, _)| *s == state) {
            return ink;
        }

        self.skins
            .iter()
            .filter(|(s, _)| !s.is_empty() && state.contains(*s))
            .max_by_key(|(s, _)| s.bits().count_ones())
            .map(|(_, ink)| ink)
            .unwrap_or(&self.ink)
    }
}

/// Name to style registry, owned by the root sheet.
#[derive(Debug, Clone)]
pub struct StyleTable {
    styles: HashMap<String, Arc<Style>>,
}

impl StyleTable {
    /// A table holding only the default `"Widget"` style.
    pub fn new() -> Self {
        let mut styles = HashMap::new();
        styles.insert(DEFAULT_STYLE.to_string(), Arc::new(Style::new(DEFAULT_STYLE)));
        StyleTable { styles }
    }

    /// Register `style` under its name, replacing any previous entry.
    ///
    /// Widgets that already resolved the old entry keep it.
    pub fn register(&mut self, style: Style) -> Arc<Style> {
        let style = Arc::new(style);
        if self
            .styles
            .insert(style.name().to_string(), Arc::clone(&style))
            .is_some()
        {
            tracing::debug!("style '{}' replaced", style.name());
        }
        style
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Style>> {
        self.styles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    pub fn default_style(&self) -> Arc<Style> {
        match self.styles.get(DEFAULT_STYLE) {
            Some(style) => Arc::clone(style),
            None => Arc::new(Style::new(DEFAULT_STYLE)),
        }
    }

    /// First style registered along the type chain of `ty`, or the default.
    pub fn resolve(&self, ty: &Type) -> Arc<Style> {
        ty.ancestors()
            .find_map(|ty| self.styles.get(ty.name()))
            .map(Arc::clone)
            .unwrap_or_else(|| self.default_style())
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new()
    }
}
