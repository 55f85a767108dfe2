//! Layout pass over the frames of a sheet, solved with taffy.

use taffy::{AvailableSpace, Dimension, Display, LengthPercentageAuto, Position};
use tessel_core::geometry::Rect;
use tessel_core::math::Vec2;
use tessel_core::profiling::profile_function;

use crate::error::UiResult;
use crate::frame::{FrameDirty, FrameKind};
use crate::sheet::RootSheet;
use crate::widget::{Widget, WidgetId};

impl RootSheet {
    fn solver_style(&self, widget: &Widget) -> taffy::Style {
        let mut style = widget
            .frame
            .style()
            .map(|style| style.layout.clone())
            .unwrap_or_default();

        match widget.frame.kind() {
            FrameKind::Layer => style.position = Position::Absolute,
            FrameKind::MasterLayer => {
                style.position = Position::Absolute;
                style.inset = taffy::Rect {
                    left: LengthPercentageAuto::Length(0.0),
                    right: LengthPercentageAuto::Length(0.0),
                    top: LengthPercentageAuto::Length(0.0),
                    bottom: LengthPercentageAuto::Length(0.0),
                };
                style.size = taffy::Size {
                    width: Dimension::Percent(1.0),
                    height: Dimension::Percent(1.0),
                };
            }
            FrameKind::Frame | FrameKind::None => {}
        }

        if !widget.frame.visible() {
            style.display = Display::None;
        }
        if widget.id() == self.root() {
            style.size = taffy::Size {
                width: Dimension::Length(self.viewport.x),
                height: Dimension::Length(self.viewport.y),
            };
        }
        style
    }

    /// Create the solver node of `id` if it has a frame and no node yet.
    pub fn make_solver(&mut self, id: WidgetId) -> UiResult<Option<taffy::NodeId>> {
        let widget = self.alive(id)?;
        if !widget.frame.kind().has_frame() {
            return Ok(None);
        }
        if let Some(node) = widget.frame.solver {
            return Ok(Some(node));
        }

        let style = self.solver_style(widget);
        let node = self.solver.new_leaf(style)?;
        self.alive_mut(id)?.frame.solver = Some(node);
        self.structure_dirty = true;
        Ok(Some(node))
    }

    /// Change the viewport; the root frame follows at once, the rest at the
    /// next layout pass.
    pub fn resize(&mut self, viewport: Vec2) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        let root = self.root();
        if let Ok(frame) = self.frame_mut(root) {
            frame.set_size(viewport);
        }
        tracing::debug!("viewport resized to {}x{}", viewport.x, viewport.y);
    }

    /// Solve the layout of every live frame for `viewport` and write the
    /// results back to the frame rects. Deferred skins are applied too.
    pub fn layout(&mut self, viewport: Vec2) -> UiResult<()> {
        profile_function!();
        self.resize(viewport);

        let framed: Vec<WidgetId> = self
            .widgets
            .values()
            .filter(|w| w.is_alive() && w.frame.kind().has_frame())
            .map(Widget::id)
            .collect();

        for id in &framed {
            self.make_solver(*id)?;
        }

        let root = self.root();
        for id in &framed {
            let widget = self.alive(*id)?;
            let dirty = widget.frame.dirty();
            let Some(node) = widget.frame.solver else {
                continue;
            };
            if *id == root || dirty.intersects(FrameDirty::LAYOUT | FrameDirty::VISIBILITY) {
                let style = self.solver_style(widget);
                self.solver.set_style(node, style)?;
            }
        }

        if self.structure_dirty {
            self.rebuild_solver_tree(&framed)?;
        }

        let Some(root_node) = self.alive(root)?.frame.solver else {
            return Ok(());
        };
        self.solver.compute_layout(
            root_node,
            taffy::Size {
                width: AvailableSpace::Definite(viewport.x),
                height: AvailableSpace::Definite(viewport.y),
            },
        )?;

        let mut skins = 0;
        for id in &framed {
            let Some(node) = self.alive(*id)?.frame.solver else {
                continue;
            };
            let layout = *self.solver.layout(node)?;
            let frame = &mut self.alive_mut(*id)?.frame;
            frame.set_rect(Rect::new(
                Vec2::new(layout.location.x, layout.location.y),
                Vec2::new(layout.size.width, layout.size.height),
            ));
            if frame.flush_skin() {
                skins += 1;
            }
            frame.take_dirty();
        }

        tracing::trace!("laid out {} frames, {} skins applied", framed.len(), skins);
        Ok(())
    }

    fn rebuild_solver_tree(&mut self, framed: &[WidgetId]) -> UiResult<()> {
        for id in framed {
            if let Some(node) = self.alive(*id)?.frame.solver {
                self.solver.set_children(node, &[])?;
            }
        }

        for id in framed {
            let Some(node) = self.alive(*id)?.frame.solver else {
                continue;
            };
            let children: Vec<taffy::NodeId> = self
                .frame_children(*id, false)
                .into_iter()
                .filter_map(|child| self.widgets.get(&child).and_then(|w| w.frame.solver))
                .collect();
            self.solver.set_children(node, &children)?;

            let host = self.alive(*id)?.parent.and_then(|parent| self.framed_ancestor(parent));
            self.alive_mut(*id)?.frame.attach(host);
        }

        self.structure_dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::frame::FrameKind;
    use crate::sheet::RootSheet;
    use crate::style::{Style, StyleTable};
    use crate::widget::WidgetParams;
    use tessel_core::math::Vec2;

    #[test]
    fn test_fixed_children_in_a_row() {
        let mut styles = StyleTable::new();
        let item = styles.register(Style::new("Item").width(50.0).height(20.0));
        let mut sheet = RootSheet::new(styles, Vec2::new(400.0, 300.0));
        let root = sheet.root();

        let a = sheet.create(WidgetParams::new().parent(root).style(item.clone())).unwrap();
        let b = sheet.create(WidgetParams::new().parent(root).style(item)).unwrap();
        sheet.layout(Vec2::new(400.0, 300.0)).unwrap();

        assert_eq!(sheet.frame(root).unwrap().size(), Vec2::new(400.0, 300.0));
        assert_eq!(sheet.frame(a).unwrap().position(), Vec2::new(0.0, 0.0));
        assert_eq!(sheet.frame(b).unwrap().position(), Vec2::new(50.0, 0.0));
        assert_eq!(sheet.frame(b).unwrap().size(), Vec2::new(50.0, 20.0));
    }

    #[test]
    fn test_master_layer_fills_parent() {
        let mut sheet = RootSheet::new(StyleTable::new(), Vec2::new(320.0, 240.0));
        let root = sheet.root();
        let layer = sheet
            .create(WidgetParams::new().parent(root).frame(FrameKind::MasterLayer))
            .unwrap();
        sheet.layout(Vec2::new(320.0, 240.0)).unwrap();

        assert_eq!(sheet.frame(layer).unwrap().size(), Vec2::new(320.0, 240.0));

        sheet.layout(Vec2::new(640.0, 480.0)).unwrap();
        assert_eq!(sheet.frame(layer).unwrap().size(), Vec2::new(640.0, 480.0));
    }

    #[test]
    fn test_frameless_children_attach_to_host() {
        let mut styles = StyleTable::new();
        let item = styles.register(Style::new("Item").width(30.0).height(30.0));
        let mut sheet = RootSheet::new(styles, Vec2::new(200.0, 100.0));
        let root = sheet.root();
        let group = sheet
            .create(WidgetParams::new().parent(root).frame(FrameKind::None))
            .unwrap();
        let a = sheet.create(WidgetParams::new().parent(group).style(item.clone())).unwrap();
        let b = sheet.create(WidgetParams::new().parent(root).style(item)).unwrap();
        sheet.layout(Vec2::new(200.0, 100.0)).unwrap();

        assert_eq!(sheet.frame(a).unwrap().host(), Some(root));
        assert_eq!(sheet.frame(a).unwrap().position(), Vec2::new(0.0, 0.0));
        assert_eq!(sheet.frame(b).unwrap().position(), Vec2::new(30.0, 0.0));
        assert_eq!(sheet.frame(group).unwrap().solver(), None);
    }

    #[test]
    fn test_hidden_frames_take_no_space() {
        let mut styles = StyleTable::new();
        let item = styles.register(Style::new("Item").width(30.0).height(30.0));
        let mut sheet = RootSheet::new(styles, Vec2::new(200.0, 100.0));
        let root = sheet.root();
        let a = sheet.create(WidgetParams::new().parent(root).style(item.clone())).unwrap();
        let b = sheet.create(WidgetParams::new().parent(root).style(item)).unwrap();
        sheet.layout(Vec2::new(200.0, 100.0)).unwrap();
        assert_eq!(sheet.frame(b).unwrap().position().x, 30.0);

        sheet.hide(a).unwrap();
        sheet.layout(Vec2::new(200.0, 100.0)).unwrap();
        assert_eq!(sheet.frame(b).unwrap().position().x, 0.0);
    }
}
