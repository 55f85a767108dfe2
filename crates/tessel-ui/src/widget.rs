//! Widget nodes and their construction parameters.

use std::any::Any;
use std::fmt;
use std::num::NonZeroU64;
use std::sync::{Arc, OnceLock};

use static_assertions::assert_eq_size;
use tessel_core::object::{Type, TypeObject, Typed};

use crate::adapter::InputAdapter;
use crate::control::{ControlGraph, ControlTier};
use crate::frame::{Frame, FrameKind};
use crate::state::{Lifecycle, WidgetState};
use crate::style::Style;

/// Handle to a widget in a [`RootSheet`](crate::sheet::RootSheet).
///
/// Ids are never reused within a sheet, so a stale id reports
/// [`UiError::UnknownWidget`](crate::error::UiError) rather than aliasing
/// a newer widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(NonZeroU64);

assert_eq_size!(WidgetId, Option<WidgetId>);

impl WidgetId {
    pub(crate) const fn new(raw: NonZeroU64) -> Self {
        WidgetId(raw)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Parameters a widget is built from.
///
/// # Example
/// ```ignore
/// let button = sheet.create(
///     WidgetParams::new()
///         .parent(panel)
///         .behavior(Button::default())
///         .content("OK"),
/// )?;
/// ```
#[derive(Default)]
pub struct WidgetParams {
    pub parent: Option<WidgetId>,
    /// Position in the parent's children; appended when `None`.
    pub index: Option<usize>,
    /// Explicit style, skipping type-chain resolution.
    pub style: Option<Arc<Style>>,
    pub frame: FrameKind,
    /// Type override; defaults to the behavior's type, then `Widget`.
    pub ty: Option<&'static Type>,
    pub behavior: Option<Box<dyn InputAdapter>>,
    pub content: Option<String>,
}

impl WidgetParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parent(mut self, parent: WidgetId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn style(mut self, style: Arc<Style>) -> Self {
        self.style = Some(style);
        self
    }

    pub fn frame(mut self, kind: FrameKind) -> Self {
        self.frame = kind;
        self
    }

    pub fn ty(mut self, ty: &'static Type) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn behavior(mut self, behavior: impl InputAdapter) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// A node of the widget tree.
///
/// All links to other widgets are ids into the owning sheet. The node's
/// runtime type is the behavior's type unless overridden, so `upcast` on a
/// widget reaches both the node and the behavior it carries.
pub struct Widget {
    id: WidgetId,
    ty: &'static Type,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) container: Option<WidgetId>,
    pub(crate) index: usize,
    pub(crate) children: Vec<WidgetId>,
    pub(crate) style: Option<Arc<Style>>,
    pub(crate) frame: Frame,
    pub(crate) state: WidgetState,
    pub(crate) lifecycle: Lifecycle,
    /// Where unhandled events bubble to.
    pub(crate) control_parent: Option<WidgetId>,
    pub(crate) control_graph: Option<ControlGraph>,
    pub(crate) tier: ControlTier,
    pub(crate) behavior: Option<Box<dyn InputAdapter>>,
}

impl Widget {
    pub(crate) fn new(
        id: WidgetId,
        kind: FrameKind,
        ty: Option<&'static Type>,
        behavior: Option<Box<dyn InputAdapter>>,
    ) -> Self {
        let ty = ty
            .or_else(|| behavior.as_ref().map(|b| b.object_type()))
            .unwrap_or_else(Widget::cls);

        Widget {
            id,
            ty,
            parent: None,
            container: None,
            index: 0,
            children: Vec::new(),
            style: None,
            frame: Frame::new(kind),
            state: WidgetState::empty(),
            lifecycle: Lifecycle::Constructed,
            control_parent: None,
            control_graph: None,
            tier: ControlTier::None,
            behavior,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn ty(&self) -> &'static Type {
        self.ty
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    /// The widget whose child store holds this one.
    pub fn container(&self) -> Option<WidgetId> {
        self.container
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn style(&self) -> Option<&Arc<Style>> {
        self.style.as_ref()
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_alive(&self) -> bool {
        self.lifecycle.is_alive()
    }

    pub fn control_parent(&self) -> Option<WidgetId> {
        self.control_parent
    }

    pub fn control_graph(&self) -> Option<&ControlGraph> {
        self.control_graph.as_ref()
    }

    pub fn control_tier(&self) -> ControlTier {
        self.tier
    }

    pub fn behavior(&self) -> Option<&dyn InputAdapter> {
        self.behavior.as_deref()
    }

    pub fn behavior_mut(&mut self) -> Option<&mut (dyn InputAdapter + 'static)> {
        self.behavior.as_deref_mut()
    }
}

impl Typed for Widget {
    fn cls() -> &'static Type {
        static TYPE: OnceLock<Type> = OnceLock::new();
        TYPE.get_or_init(|| Type::new("Widget", None))
    }
}

impl TypeObject for Widget {
    fn object_type(&self) -> &'static Type {
        self.ty
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn embedded(&self) -> Option<&dyn TypeObject> {
        self.behavior.as_deref().map(|b| b as &dyn TypeObject)
    }

    fn embedded_mut(&mut self) -> Option<&mut dyn TypeObject> {
        self.behavior.as_deref_mut().map(|b| b as &mut dyn TypeObject)
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.id)
            .field("type", &self.ty.name())
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("state", &self.state)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}
