//! Event routing: hit-testing, control delegation and bubbling.
//!
//! Routing an event happens in two steps. [`RootSheet::target`] decides the
//! first receiver: the switch's controller for the device, else pinpointing
//! from the root for mouse input or the active widget for keyboard input,
//! following local control graphs along the way. [`RootSheet::receive_event`]
//! then runs handlers from that receiver up the control-parent chain until
//! one handles the event.

use tessel_core::geometry::Rect;
use tessel_core::math::Vec2;
use tessel_core::profiling::profile_function;

use crate::adapter::{self, EventCx, Plain, UiEvent};
use crate::control::ControlMode;
use crate::error::UiResult;
use crate::frame::Frame;
use crate::sheet::RootSheet;
use crate::state::WidgetState;
use crate::style::Opacity;
use crate::widget::WidgetId;

/// Bound on control hops while resolving a target.
pub const MAX_CONTROL_HOPS: usize = 64;

impl RootSheet {
    /// Position of the frame of `id` in window coordinates. Widgets without
    /// a frame report the origin of their host.
    pub fn absolute_origin(&self, id: WidgetId) -> UiResult<Vec2> {
        self.alive(id)?;
        let mut origin = Vec2::ZERO;
        let mut current = Some(id);
        while let Some(widget) = current.and_then(|id| self.widgets.get(&id)) {
            if widget.frame.kind().has_frame() {
                origin += widget.frame.position();
            }
            current = widget.parent;
        }
        Ok(origin)
    }

    pub fn absolute_rect(&self, id: WidgetId) -> UiResult<Rect> {
        let origin = self.absolute_origin(id)?;
        Ok(Rect::new(origin, self.alive(id)?.frame.size()))
    }

    /// Express the event position relative to the frame of `id`.
    pub fn transform_event(&self, id: WidgetId, event: &mut UiEvent) {
        if !event.is_mouse() {
            return;
        }
        if let Ok(origin) = self.absolute_origin(id) {
            event.mouse.relative = event.mouse.pos - origin;
        }
    }

    /// Framed children of `id` in sibling order, looking through widgets
    /// without a frame. Hidden frameless widgets hide their children when
    /// `visible_only` is set.
    pub(crate) fn frame_children(&self, id: WidgetId, visible_only: bool) -> Vec<WidgetId> {
        let mut framed = Vec::new();
        let Some(widget) = self.widgets.get(&id) else {
            return framed;
        };

        let mut pending: Vec<WidgetId> = widget.children.iter().rev().copied().collect();
        while let Some(child) = pending.pop() {
            let Some(widget) = self.widgets.get(&child).filter(|w| w.is_alive()) else {
                continue;
            };
            if widget.frame.kind().has_frame() {
                framed.push(child);
            } else if !visible_only || widget.frame.visible() {
                pending.extend(widget.children.iter().rev());
            }
        }
        framed
    }

    /// Topmost hit under `pos`, given in the coordinates of the frame of `id`.
    pub fn pinpoint(&self, id: WidgetId, pos: Vec2) -> Option<WidgetId> {
        profile_function!();
        self.pinpoint_with(id, pos, &Frame::is_opaque)
    }

    /// Topmost widget under `pos` whose frame passes `filter`.
    ///
    /// Layers are tested before regular frames, higher z-order first, and
    /// later siblings before earlier ones. Invisible and hollow frames are
    /// skipped with their subtrees; clear frames are never hits themselves.
    pub fn pinpoint_with(&self, id: WidgetId, pos: Vec2, filter: &dyn Fn(&Frame) -> bool) -> Option<WidgetId> {
        let widget = self.widgets.get(&id).filter(|w| w.is_alive())?;
        let frame = &widget.frame;
        let framed = frame.kind().has_frame();

        if !frame.visible() {
            return None;
        }
        if framed && (frame.opacity() == Opacity::Hollow || !frame.contains_local(pos)) {
            return None;
        }

        let mut children = self.frame_children(id, true);
        children.reverse();
        // stable: later siblings stay ahead within one stacking level
        children.sort_by_key(|child| {
            let frame = &self.widgets[child].frame;
            let layer = frame.kind().is_layer();
            std::cmp::Reverse((layer, if layer { frame.z_order() } else { 0 }))
        });

        for child in children {
            let child_pos = pos - self.widgets[&child].frame.position();
            if let Some(hit) = self.pinpoint_with(child, child_pos, filter) {
                return Some(hit);
            }
        }

        (framed && frame.opacity() != Opacity::Clear && filter(frame)).then_some(id)
    }

    /// Resolve the receiver of `event` starting at `id`, following control
    /// graphs and pinpointing within the current widget.
    pub fn control_event(&self, id: WidgetId, event: &mut UiEvent) -> WidgetId {
        self.control_event_from(id, event, false)
    }

    /// Like [`RootSheet::control_event`]. A `captured` start skips spatial
    /// routing: the start receives the event unless its own graph hands it on.
    pub fn control_event_from(&self, id: WidgetId, event: &mut UiEvent, captured: bool) -> WidgetId {
        let mut current = id;
        let mut captured = captured;

        for _ in 0..MAX_CONTROL_HOPS {
            self.transform_event(current, event);

            let granted = self
                .widgets
                .get(&current)
                .and_then(|w| w.control_graph.as_ref())
                .and_then(|graph| graph.find(event.device))
                .map(|node| (node.receiver, node.mode));

            if let Some((receiver, mode)) = granted {
                if receiver != current && self.contains_widget(receiver) {
                    current = receiver;
                    captured = mode == ControlMode::Control;
                    continue;
                }
                if mode == ControlMode::Control {
                    return current;
                }
                captured = false;
            }

            if captured || !event.is_mouse() {
                return current;
            }

            match self.pinpoint(current, event.mouse.relative) {
                Some(hit) if hit != current => current = hit,
                _ => return current,
            }
        }

        tracing::warn!(
            "control routing exceeded {} hops, stopping at {}",
            MAX_CONTROL_HOPS,
            current
        );
        current
    }

    /// First receiver of `event`.
    pub fn target(&self, event: &mut UiEvent) -> WidgetId {
        if let Some(entry) = self.switch.controller(event.device)
            && self.contains_widget(entry.receiver)
        {
            return match entry.mode {
                ControlMode::Control => self.control_event_from(entry.receiver, event, true),
                ControlMode::Modal => self.control_event(entry.receiver, event),
            };
        }

        let start = if event.is_mouse() {
            self.root()
        } else {
            self.active
                .filter(|active| self.contains_widget(*active))
                .unwrap_or(self.root())
        };
        self.control_event(start, event)
    }

    /// Run handlers from `id` up the control-parent chain until one handles
    /// the event. Returns the last widget the event reached.
    pub fn receive_event(&mut self, id: WidgetId, event: &mut UiEvent) -> WidgetId {
        let mut current = id;
        loop {
            if event.is_consumed() || event.has_visited(&current) || !self.contains_widget(current) {
                return current;
            }

            event.visit(current);
            self.transform_event(current, event);

            if self.dispatch_to(current, event) {
                event.consume();
                return current;
            }

            match self.widgets.get(&current).and_then(|w| w.control_parent) {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    /// Resolve the target of `event` and deliver it.
    pub fn route(&mut self, event: &mut UiEvent) -> WidgetId {
        profile_function!();
        let target = self.target(event);
        self.receive_event(target, event)
    }

    /// Run the handler of `id` for `event`. Disabled widgets handle nothing.
    fn dispatch_to(&mut self, id: WidgetId, event: &mut UiEvent) -> bool {
        let Some(widget) = self.widgets.get_mut(&id) else {
            return false;
        };
        if widget.state.contains(WidgetState::DISABLED) {
            return false;
        }

        let mut behavior = widget.behavior.take();
        let handled = {
            let mut cx = EventCx::new(self, id);
            match behavior.as_deref_mut() {
                Some(behavior) => adapter::dispatch(behavior, &mut cx, event),
                None => adapter::dispatch(&mut Plain, &mut cx, event),
            }
        };

        match self.widgets.get_mut(&id) {
            Some(widget) if widget.is_alive() => {
                if widget.behavior.is_none() {
                    widget.behavior = behavior;
                }
            }
            _ => {
                if let Some(mut behavior) = behavior {
                    behavior.destroyed(id);
                }
            }
        }
        handled
    }
}
