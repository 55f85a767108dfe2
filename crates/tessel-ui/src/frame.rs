//! Widget frames: geometry, content, skin and solver state.

use std::sync::Arc;

use bitflags::bitflags;
use tessel_core::geometry::Rect;
use tessel_core::math::Vec2;

use crate::image::Image;
use crate::state::WidgetState;
use crate::style::{InkStyle, Opacity, Style};
use crate::widget::WidgetId;

/// How a widget takes part in layout and hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameKind {
    /// No frame of its own: never hit, not laid out. Children attach to
    /// the nearest framed ancestor.
    None,
    /// A regular frame in its parent's flow.
    #[default]
    Frame,
    /// Absolutely positioned above the regular frames of its parent.
    Layer,
    /// A layer filling its parent.
    MasterLayer,
}

impl FrameKind {
    pub fn has_frame(self) -> bool {
        self != FrameKind::None
    }

    pub fn is_layer(self) -> bool {
        matches!(self, FrameKind::Layer | FrameKind::MasterLayer)
    }
}

bitflags! {
    /// What changed on a frame since the last layout pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FrameDirty: u8 {
        const NONE       = 0;
        /// Layout style changed; the solver node must be updated.
        const LAYOUT     = 1 << 0;
        /// A skin is waiting to be applied.
        const SKIN       = 1 << 1;
        /// Icon or caption changed.
        const CONTENT    = 1 << 2;
        const VISIBILITY = 1 << 3;
    }
}

pub struct Frame {
    kind: FrameKind,
    /// Position relative to the host frame, and size.
    rect: Rect,
    visible: bool,
    z_order: i32,
    style: Option<Arc<Style>>,
    state: WidgetState,
    skin: InkStyle,
    pending_skin: bool,
    skin_revision: u64,
    icon: Option<Image>,
    caption: Option<String>,
    /// Framed ancestor this frame is attached to.
    host: Option<WidgetId>,
    pub(crate) solver: Option<taffy::NodeId>,
    dirty: FrameDirty,
}

impl Frame {
    pub fn new(kind: FrameKind) -> Self {
        Frame {
            kind,
            rect: Rect::ZERO,
            visible: true,
            z_order: 0,
            style: None,
            state: WidgetState::empty(),
            skin: InkStyle::default(),
            pending_skin: false,
            skin_revision: 0,
            icon: None,
            caption: None,
            host: None,
            solver: None,
            dirty: FrameDirty::LAYOUT,
        }
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn position(&self) -> Vec2 {
        self.rect.origin
    }

    pub fn size(&self) -> Vec2 {
        self.rect.size
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.rect.origin = position;
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.rect.size = size;
    }

    /// `pos` in this frame's own coordinates lies inside it.
    pub fn contains_local(&self, pos: Vec2) -> bool {
        Rect::new(Vec2::ZERO, self.rect.size).contains(pos)
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        if !self.visible {
            self.visible = true;
            self.dirty |= FrameDirty::VISIBILITY | FrameDirty::LAYOUT;
        }
    }

    pub fn hide(&mut self) {
        if self.visible {
            self.visible = false;
            self.dirty |= FrameDirty::VISIBILITY | FrameDirty::LAYOUT;
        }
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    pub fn set_z_order(&mut self, z_order: i32) {
        self.z_order = z_order;
    }

    pub fn opacity(&self) -> Opacity {
        self.style.as_ref().map_or(Opacity::Opaque, |style| style.opacity)
    }

    pub fn is_opaque(&self) -> bool {
        self.opacity() == Opacity::Opaque
    }

    pub fn style(&self) -> Option<&Arc<Style>> {
        self.style.as_ref()
    }

    /// Take a new style. `hard` re-resolves the skin now; otherwise the skin
    /// waits for [`Frame::flush_skin`] at the next layout pass.
    pub fn set_style(&mut self, style: Arc<Style>, hard: bool) {
        self.style = Some(style);
        self.dirty |= FrameDirty::LAYOUT;
        if hard {
            self.apply_skin();
        } else {
            self.pending_skin = true;
            self.dirty |= FrameDirty::SKIN;
        }
    }

    /// Re-resolve the skin for `state`.
    pub fn update_state(&mut self, state: WidgetState) {
        self.state = state;
        self.apply_skin();
    }

    /// Apply a deferred skin, if any. Returns whether one was applied.
    pub fn flush_skin(&mut self) -> bool {
        if !self.pending_skin {
            return false;
        }
        self.apply_skin();
        true
    }

    fn apply_skin(&mut self) {
        self.skin = match &self.style {
            Some(style) => style.skin(self.state).clone(),
            None => InkStyle::default(),
        };
        self.pending_skin = false;
        self.dirty.remove(FrameDirty::SKIN);
        self.skin_revision += 1;
    }

    pub fn skin(&self) -> &InkStyle {
        &self.skin
    }

    pub fn has_pending_skin(&self) -> bool {
        self.pending_skin
    }

    /// Number of times the skin has been re-resolved.
    pub fn skin_revision(&self) -> u64 {
        self.skin_revision
    }

    pub fn icon(&self) -> Option<&Image> {
        self.icon.as_ref()
    }

    pub fn set_icon(&mut self, icon: Image) {
        self.icon = Some(icon);
        self.dirty |= FrameDirty::CONTENT;
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = Some(caption.into());
        self.dirty |= FrameDirty::CONTENT;
    }

    pub fn host(&self) -> Option<WidgetId> {
        self.host
    }

    pub(crate) fn attach(&mut self, host: Option<WidgetId>) {
        self.host = host;
        self.dirty |= FrameDirty::LAYOUT;
    }

    pub(crate) fn detach(&mut self) {
        self.host = None;
        self.dirty |= FrameDirty::LAYOUT;
    }

    pub fn solver(&self) -> Option<taffy::NodeId> {
        self.solver
    }

    pub fn dirty(&self) -> FrameDirty {
        self.dirty
    }

    pub(crate) fn take_dirty(&mut self) -> FrameDirty {
        std::mem::replace(&mut self.dirty, FrameDirty::NONE)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("kind", &self.kind)
            .field("rect", &self.rect)
            .field("visible", &self.visible)
            .field("style", &self.style.as_ref().map(|s| s.name()))
            .field("caption", &self.caption)
            .field("icon", &self.icon.as_ref().map(Image::name))
            .finish()
    }
}
