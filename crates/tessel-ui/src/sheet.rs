//! The widget tree and everything that owns widgets.
//!
//! A [`RootSheet`] owns every widget of a window in an arena keyed by
//! [`WidgetId`]. Tree links, control links and the layout solver nodes all
//! refer to widgets by id, so a widget can be looked up, moved or destroyed
//! without borrowing its neighbours.

use std::num::NonZeroU64;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use taffy::TaffyTree;
use tessel_core::geometry::Rect;
use tessel_core::math::Vec2;
use tessel_core::object::{Type, Typed};

use crate::control::ControlSwitch;
use crate::error::{UiError, UiResult};
use crate::frame::{Frame, FrameKind};
use crate::image::{Image, ImageCatalog, ImageSource};
use crate::state::{Lifecycle, WidgetState};
use crate::style::{Style, StyleTable};
use crate::widget::{Widget, WidgetId, WidgetParams};

pub struct RootSheet {
    pub(crate) widgets: IndexMap<WidgetId, Widget>,
    root: WidgetId,
    next_id: NonZeroU64,
    styles: StyleTable,
    pub(crate) switch: ControlSwitch,
    pub(crate) active: Option<WidgetId>,
    images: Box<dyn ImageSource>,
    pub(crate) solver: TaffyTree<()>,
    pub(crate) structure_dirty: bool,
    pub(crate) viewport: Vec2,
}

impl Typed for RootSheet {
    fn cls() -> &'static Type {
        static TYPE: OnceLock<Type> = OnceLock::new();
        TYPE.get_or_init(|| Type::new("RootSheet", Some(Widget::cls())))
    }
}

impl RootSheet {
    /// A sheet with a single root widget covering `viewport`.
    pub fn new(styles: StyleTable, viewport: Vec2) -> Self {
        let mut sheet = RootSheet {
            widgets: IndexMap::new(),
            root: WidgetId::new(NonZeroU64::MIN),
            next_id: NonZeroU64::MIN,
            styles,
            switch: ControlSwitch::new(),
            active: None,
            images: Box::new(ImageCatalog::new()),
            solver: TaffyTree::new(),
            structure_dirty: true,
            viewport,
        };

        let root = sheet.allocate_id();
        let mut widget = Widget::new(root, FrameKind::Frame, Some(RootSheet::cls()), None);
        widget.lifecycle = Lifecycle::InTree;
        widget.frame.set_rect(Rect::new(Vec2::ZERO, viewport));
        let style = sheet.styles.resolve(widget.ty());
        widget.style = Some(style.clone());
        widget.frame.set_style(style, true);
        sheet.widgets.insert(root, widget);
        sheet.root = root;

        tracing::debug!("created root sheet {} ({}x{})", root, viewport.x, viewport.y);
        sheet
    }

    fn allocate_id(&mut self) -> WidgetId {
        let id = WidgetId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut StyleTable {
        &mut self.styles
    }

    pub fn switch(&self) -> &ControlSwitch {
        &self.switch
    }

    /// The widget keyboard routing starts from.
    pub fn active(&self) -> Option<WidgetId> {
        self.active
    }

    pub fn set_image_source(&mut self, images: impl ImageSource + 'static) {
        self.images = Box::new(images);
    }

    pub fn find_image(&self, name: &str) -> Option<Image> {
        self.images.find_image(name)
    }

    /// Number of live widgets, the root included.
    pub fn len(&self) -> usize {
        self.widgets.values().filter(|w| w.is_alive()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_widget(&self, id: WidgetId) -> bool {
        self.widgets.get(&id).is_some_and(Widget::is_alive)
    }

    /// The widget, dead or alive, while it is still held by the sheet.
    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(&id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(&id)
    }

    pub(crate) fn alive(&self, id: WidgetId) -> UiResult<&Widget> {
        match self.widgets.get(&id) {
            Some(widget) if widget.is_alive() => Ok(widget),
            Some(_) => Err(UiError::Destroyed(id)),
            None => Err(UiError::UnknownWidget(id)),
        }
    }

    pub(crate) fn alive_mut(&mut self, id: WidgetId) -> UiResult<&mut Widget> {
        match self.widgets.get_mut(&id) {
            Some(widget) if widget.is_alive() => Ok(widget),
            Some(_) => Err(UiError::Destroyed(id)),
            None => Err(UiError::UnknownWidget(id)),
        }
    }

    pub fn widget(&self, id: WidgetId) -> UiResult<&Widget> {
        self.alive(id)
    }

    pub fn widget_mut(&mut self, id: WidgetId) -> UiResult<&mut Widget> {
        self.alive_mut(id)
    }

    pub fn frame(&self, id: WidgetId) -> UiResult<&Frame> {
        Ok(&self.alive(id)?.frame)
    }

    pub fn frame_mut(&mut self, id: WidgetId) -> UiResult<&mut Frame> {
        Ok(&mut self.alive_mut(id)?.frame)
    }

    pub fn parent(&self, id: WidgetId) -> UiResult<Option<WidgetId>> {
        Ok(self.alive(id)?.parent)
    }

    pub fn children(&self, id: WidgetId) -> UiResult<&[WidgetId]> {
        Ok(&self.alive(id)?.children)
    }

    /// Build a widget from `params`, inserting it under `params.parent` when
    /// one is given.
    pub fn create(&mut self, params: WidgetParams) -> UiResult<WidgetId> {
        let WidgetParams {
            parent,
            index,
            style,
            frame,
            ty,
            behavior,
            content,
        } = params;

        if let Some(parent) = parent {
            self.alive(parent)?;
        }

        let id = self.allocate_id();
        let mut widget = Widget::new(id, frame, ty, behavior);
        if let Some(style) = style {
            widget.style = Some(style.clone());
            widget.frame.set_style(style, true);
        }
        tracing::trace!("created widget {} of type {}", id, widget.ty().name());
        self.widgets.insert(id, widget);

        let built = self.build(id, parent, index, content);
        if let Err(err) = built {
            if let Err(cleanup) = self.destroy(id) {
                tracing::warn!("failed to drop half-built widget {}: {}", id, cleanup);
            }
            return Err(err);
        }
        Ok(id)
    }

    fn build(
        &mut self,
        id: WidgetId,
        parent: Option<WidgetId>,
        index: Option<usize>,
        content: Option<String>,
    ) -> UiResult<()> {
        if let Some(parent) = parent {
            self.insert(parent, id, index)?;
        } else {
            self.update_style(id)?;
        }
        if let Some(content) = content {
            self.set_content(id, &content)?;
        }
        Ok(())
    }

    /// Append `child` to the children of `parent`.
    pub fn append(&mut self, parent: WidgetId, child: WidgetId) -> UiResult<()> {
        self.insert(parent, child, None)
    }

    /// Insert `child` into the children of `parent` at `index` (clamped),
    /// taking it out of its previous container first.
    pub fn insert(&mut self, parent: WidgetId, child: WidgetId, index: Option<usize>) -> UiResult<()> {
        if child == self.root {
            return Err(UiError::RootWidget);
        }
        self.alive(parent)?;
        self.alive(child)?;
        if child == parent || Self::is_within(&self.widgets, parent, child) {
            return Err(UiError::CyclicParent { child, parent });
        }

        if let Some(previous) = self.alive(child)?.container {
            self.remove_from_store(previous, child);
            self.unbind(child)?;
        }

        let store = &mut self.alive_mut(parent)?.children;
        let index = index.unwrap_or(store.len()).min(store.len());
        store.insert(index, child);
        self.reindex(parent);
        self.alive_mut(child)?.container = Some(parent);

        self.bind(child, parent, index)
    }

    /// Move `id` under `parent`.
    pub fn reparent(&mut self, id: WidgetId, parent: WidgetId, index: Option<usize>) -> UiResult<()> {
        self.insert(parent, id, index)
    }

    /// Attach `id` to `parent` at `index`: tree links, control parent, frame
    /// host and style.
    pub fn bind(&mut self, id: WidgetId, parent: WidgetId, index: usize) -> UiResult<()> {
        let host = self.framed_ancestor(parent);
        let widget = self.alive_mut(id)?;
        widget.parent = Some(parent);
        widget.index = index;
        widget.control_parent = Some(parent);
        widget.lifecycle = Lifecycle::InTree;
        let inherits_style = widget.style.is_none();
        widget.frame.attach(host);
        self.structure_dirty = true;

        if inherits_style {
            self.update_style(id)?;
        }
        tracing::trace!("bound {} under {} at {}", id, parent, index);
        Ok(())
    }

    /// Detach the frame of `id` from its host.
    pub fn unbind(&mut self, id: WidgetId) -> UiResult<()> {
        self.alive_mut(id)?.frame.detach();
        self.structure_dirty = true;
        Ok(())
    }

    fn remove_from_store(&mut self, container: WidgetId, child: WidgetId) {
        if let Some(widget) = self.widgets.get_mut(&container) {
            widget.children.retain(|c| *c != child);
            self.reindex(container);
        }
    }

    fn reindex(&mut self, parent: WidgetId) {
        let Some(children) = self.widgets.get(&parent).map(|w| w.children.clone()) else {
            return;
        };
        for (index, child) in children.into_iter().enumerate() {
            if let Some(widget) = self.widgets.get_mut(&child) {
                widget.index = index;
            }
        }
    }

    /// `id` is `ancestor` or lies below it.
    pub(crate) fn is_within(widgets: &IndexMap<WidgetId, Widget>, id: WidgetId, ancestor: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(widget) = current {
            if widget == ancestor {
                return true;
            }
            current = widgets.get(&widget).and_then(|w| w.parent);
        }
        false
    }

    pub fn is_descendant(&self, id: WidgetId, ancestor: WidgetId) -> bool {
        id != ancestor && Self::is_within(&self.widgets, id, ancestor)
    }

    /// Nearest widget from `id` upwards that has a frame of its own.
    pub(crate) fn framed_ancestor(&self, id: WidgetId) -> Option<WidgetId> {
        let mut current = Some(id);
        while let Some(widget) = current.and_then(|id| self.widgets.get(&id)) {
            if widget.frame.kind().has_frame() {
                return Some(widget.id());
            }
            current = widget.parent;
        }
        None
    }

    /// Nearest widget from `id` upwards whose type is exactly `ty`.
    pub fn find_container(&self, id: WidgetId, ty: &Type) -> Option<WidgetId> {
        let mut current = Some(id);
        while let Some(widget) = current.and_then(|id| self.widgets.get(&id)) {
            if widget.ty() == ty {
                return Some(widget.id());
            }
            current = widget.parent;
        }
        None
    }

    /// Pre-order walk of the subtree at `id`. The walk stops as soon as
    /// `visitor` returns `false`.
    pub fn visit(&self, id: WidgetId, mut visitor: impl FnMut(&Widget) -> bool) -> UiResult<()> {
        self.alive(id)?;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(widget) = self.widgets.get(&next) else {
                continue;
            };
            if !visitor(widget) {
                break;
            }
            stack.extend(widget.children.iter().rev());
        }
        Ok(())
    }

    /// Ids of the subtree at `id`, parents before children.
    pub fn subtree(&self, id: WidgetId) -> UiResult<Vec<WidgetId>> {
        let mut ids = Vec::new();
        self.visit(id, |widget| {
            ids.push(widget.id());
            true
        })?;
        Ok(ids)
    }

    /// Tear down `id` alone: release its control grants, clear the active
    /// widget, notify its behavior and mark it destroyed. Tree links stay.
    pub fn destroy_self(&mut self, id: WidgetId) -> UiResult<()> {
        if id == self.root {
            return Err(UiError::RootWidget);
        }
        self.alive_mut(id)?.lifecycle = Lifecycle::Destroying;

        self.release_controls(id);

        let Some(widget) = self.widgets.get_mut(&id) else {
            return Err(UiError::UnknownWidget(id));
        };
        widget.control_graph = None;
        widget.tier = Default::default();
        widget.state = WidgetState::empty();
        if let Some(behavior) = widget.behavior.as_deref_mut() {
            behavior.destroyed(id);
        }
        widget.lifecycle = Lifecycle::Destroyed;
        self.structure_dirty = true;

        tracing::trace!("destroyed widget {}", id);
        Ok(())
    }

    /// Every id of the subtree at `id`, destroyed ones included, parents
    /// before children.
    fn subtree_entries(&self, id: WidgetId) -> UiResult<Vec<WidgetId>> {
        if !self.widgets.contains_key(&id) {
            return Err(UiError::UnknownWidget(id));
        }
        let mut ids = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(widget) = self.widgets.get(&next) {
                ids.push(next);
                stack.extend(widget.children.iter().rev());
            }
        }
        Ok(ids)
    }

    /// Tear down the subtree at `id`, children before parents. Widgets
    /// already destroyed are skipped.
    pub fn destroy_tree(&mut self, id: WidgetId) -> UiResult<()> {
        if id == self.root {
            return Err(UiError::RootWidget);
        }
        let ids = self.subtree_entries(id)?;
        for widget in ids.into_iter().rev() {
            if self.widgets.get(&widget).is_some_and(Widget::is_alive) {
                self.destroy_self(widget)?;
            }
        }
        Ok(())
    }

    /// Tear down the subtree at `id` and remove it from the sheet. `id` may
    /// already be destroyed; its entries are still reclaimed.
    pub fn destroy(&mut self, id: WidgetId) -> UiResult<()> {
        let ids = self.subtree_entries(id)?;
        self.destroy_tree(id)?;

        if let Some(container) = self.widgets.get(&id).and_then(|w| w.container) {
            self.remove_from_store(container, id);
        }
        for widget in &ids {
            if let Some(removed) = self.widgets.shift_remove(widget)
                && let Some(node) = removed.frame.solver
                && let Err(err) = self.solver.remove(node)
            {
                tracing::warn!("failed to drop layout node of {}: {}", widget, err);
            }
        }
        self.structure_dirty = true;

        tracing::debug!("destroyed {} widgets under {}", ids.len(), id);
        Ok(())
    }

    pub fn show(&mut self, id: WidgetId) -> UiResult<()> {
        self.alive_mut(id)?.frame.show();
        Ok(())
    }

    pub fn hide(&mut self, id: WidgetId) -> UiResult<()> {
        self.alive_mut(id)?.frame.hide();
        Ok(())
    }

    /// Set the content of `id`. `"(name)"` references an icon by image name
    /// (lowercased); anything else becomes the caption unless an icon is
    /// already set.
    pub fn set_content(&mut self, id: WidgetId, content: &str) -> UiResult<()> {
        self.alive(id)?;

        if let Some(name) = content.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
            let name = name.to_lowercase();
            let image = self
                .images
                .find_image(&name)
                .ok_or(UiError::MissingImage(name))?;
            self.alive_mut(id)?.frame.set_icon(image);
            return Ok(());
        }

        let frame = &mut self.alive_mut(id)?.frame;
        if frame.icon().is_none() {
            frame.set_caption(content);
        }
        Ok(())
    }

    /// Caption of `id`.
    pub fn label(&self, id: WidgetId) -> UiResult<&str> {
        self.alive(id)?.frame.caption().ok_or(UiError::NoCaption(id))
    }

    /// Re-resolve the style of `id` from its type chain, unless it carries an
    /// explicit style, and apply it to the frame.
    pub fn update_style(&mut self, id: WidgetId) -> UiResult<()> {
        let widget = self.alive(id)?;
        let style = match &widget.style {
            Some(style) => style.clone(),
            None => self.styles.resolve(widget.ty()),
        };
        self.alive_mut(id)?.frame.set_style(style, true);
        Ok(())
    }

    /// Give `id` an explicit style. Without `hard` the skin is applied at the
    /// next layout pass.
    pub fn set_style(&mut self, id: WidgetId, style: Arc<Style>, hard: bool) -> UiResult<()> {
        let widget = self.alive_mut(id)?;
        widget.style = Some(style.clone());
        widget.frame.set_style(style, hard);
        Ok(())
    }

    /// Style the frame of `id` currently uses.
    pub fn style(&self, id: WidgetId) -> UiResult<Option<&Arc<Style>>> {
        Ok(self.alive(id)?.frame.style())
    }

    pub fn state(&self, id: WidgetId) -> UiResult<WidgetState> {
        Ok(self.alive(id)?.state)
    }

    /// Flip `state` on `id` and re-skin it.
    pub fn toggle_state(&mut self, id: WidgetId, state: WidgetState) -> UiResult<()> {
        let widget = self.alive_mut(id)?;
        widget.state.toggle(state);
        let current = widget.state;
        widget.frame.update_state(current);
        tracing::trace!("{} state {:?}", id, current);
        Ok(())
    }

    /// Set the bits of `state` not set yet.
    pub fn enable_state(&mut self, id: WidgetId, state: WidgetState) -> UiResult<()> {
        let missing = state - self.alive(id)?.state;
        if missing.is_empty() {
            return Ok(());
        }
        self.toggle_state(id, missing)
    }

    /// Clear the bits of `state` currently set.
    pub fn disable_state(&mut self, id: WidgetId, state: WidgetState) -> UiResult<()> {
        let present = state & self.alive(id)?.state;
        if present.is_empty() {
            return Ok(());
        }
        self.toggle_state(id, present)
    }
}

impl std::fmt::Debug for RootSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootSheet")
            .field("root", &self.root)
            .field("widgets", &self.widgets.len())
            .field("active", &self.active)
            .field("viewport", &self.viewport)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> RootSheet {
        RootSheet::new(StyleTable::new(), Vec2::new(800.0, 600.0))
    }

    #[test]
    fn test_root_type() {
        let sheet = sheet();
        let root = sheet.widget(sheet.root()).unwrap();
        assert_eq!(root.ty().name(), "RootSheet");
        assert!(root.ty().upcast(Widget::cls()));
        assert_eq!(root.frame().size(), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn test_insert_keeps_indices() {
        let mut sheet = sheet();
        let root = sheet.root();
        let a = sheet.create(WidgetParams::new().parent(root)).unwrap();
        let b = sheet.create(WidgetParams::new().parent(root)).unwrap();
        let c = sheet.create(WidgetParams::new().parent(root).index(0)).unwrap();

        assert_eq!(sheet.children(root).unwrap(), &[c, a, b]);
        assert_eq!(sheet.widget(b).unwrap().index(), 2);

        sheet.reparent(c, a, None).unwrap();
        assert_eq!(sheet.children(root).unwrap(), &[a, b]);
        assert_eq!(sheet.widget(b).unwrap().index(), 1);
        assert_eq!(sheet.parent(c).unwrap(), Some(a));
        assert_eq!(sheet.widget(c).unwrap().control_parent(), Some(a));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut sheet = sheet();
        let root = sheet.root();
        let a = sheet.create(WidgetParams::new().parent(root)).unwrap();
        let b = sheet.create(WidgetParams::new().parent(a)).unwrap();

        assert_eq!(
            sheet.reparent(a, b, None),
            Err(UiError::CyclicParent { child: a, parent: b })
        );
        assert_eq!(sheet.reparent(root, a, None), Err(UiError::RootWidget));
    }

    #[test]
    fn test_enable_disable_are_idempotent() {
        let mut sheet = sheet();
        let a = sheet.create(WidgetParams::new().parent(sheet.root())).unwrap();
        let before = sheet.frame(a).unwrap().skin_revision();

        sheet.enable_state(a, WidgetState::SELECTED).unwrap();
        sheet.enable_state(a, WidgetState::SELECTED).unwrap();
        assert_eq!(sheet.state(a).unwrap(), WidgetState::SELECTED);
        sheet.disable_state(a, WidgetState::SELECTED).unwrap();
        sheet.disable_state(a, WidgetState::SELECTED).unwrap();
        assert!(sheet.state(a).unwrap().is_empty());
        assert_eq!(sheet.frame(a).unwrap().skin_revision(), before + 2);
    }

    #[test]
    fn test_visit_stops_early() {
        let mut sheet = sheet();
        let root = sheet.root();
        let a = sheet.create(WidgetParams::new().parent(root)).unwrap();
        let _b = sheet.create(WidgetParams::new().parent(a)).unwrap();
        let _c = sheet.create(WidgetParams::new().parent(root)).unwrap();

        let mut seen = Vec::new();
        sheet
            .visit(root, |w| {
                seen.push(w.id());
                seen.len() < 2
            })
            .unwrap();
        assert_eq!(seen, vec![root, a]);
        assert_eq!(sheet.subtree(root).unwrap().len(), 4);
    }
}
