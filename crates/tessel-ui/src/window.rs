//! The UI side of a window: a sheet fed by translated input.

use tessel_core::math::Vec2;
use tessel_core::profiling::profile_function;
use tessel_input::{EventKind, InputDispatcher, KeyEvent, MouseButton};

use crate::adapter::UiEvent;
use crate::error::{UiError, UiResult};
use crate::image::Image;
use crate::sheet::RootSheet;
use crate::style::StyleTable;
use crate::widget::WidgetId;

/// Owns the root sheet of a window and turns dispatcher calls into routed
/// events. Synthesizes hover transitions and clicks: a click fires when a
/// button is released over the widget it was pressed on.
#[derive(Debug)]
pub struct UiWindow {
    sheet: RootSheet,
    hovered: Option<WidgetId>,
    pressed: Option<(WidgetId, MouseButton)>,
    cursor: Vec2,
    shutdown: bool,
}

impl UiWindow {
    pub fn new(sheet: RootSheet) -> Self {
        UiWindow {
            sheet,
            hovered: None,
            pressed: None,
            cursor: Vec2::ZERO,
            shutdown: false,
        }
    }

    pub fn with_styles(styles: StyleTable, size: Vec2) -> Self {
        Self::new(RootSheet::new(styles, size))
    }

    pub fn sheet(&self) -> &RootSheet {
        &self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut RootSheet {
        &mut self.sheet
    }

    /// Widget the pointer is over.
    pub fn hovered(&self) -> Option<WidgetId> {
        self.hovered
    }

    /// Widget holding the pressed button, if a button is down.
    pub fn pressed(&self) -> Option<WidgetId> {
        self.pressed.map(|(id, _)| id)
    }

    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn find_image(&self, name: &str) -> UiResult<Image> {
        self.sheet
            .find_image(name)
            .ok_or_else(|| UiError::MissingImage(name.to_string()))
    }

    /// Ask the window to stop after the current frame.
    pub fn shutdown(&mut self) {
        if !self.shutdown {
            tracing::info!("ui window shutting down");
        }
        self.shutdown = true;
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// Run the per-frame layout pass. Returns `false` once shut down.
    pub fn next_frame(&mut self) -> bool {
        profile_function!();
        if self.shutdown {
            return false;
        }
        let viewport = self.sheet.viewport();
        if let Err(err) = self.sheet.layout(viewport) {
            tracing::error!("layout failed: {}", err);
        }
        !self.shutdown
    }

    fn deliver(&mut self, id: WidgetId, kind: EventKind, pos: Vec2) {
        if self.sheet.contains_widget(id) {
            let mut event = UiEvent::hover(kind, pos);
            self.sheet.receive_event(id, &mut event);
        }
    }

    fn update_hover(&mut self, pos: Vec2) {
        let mut probe = UiEvent::hover(EventKind::MouseEntered, pos);
        let target = self.sheet.target(&mut probe);
        if self.hovered == Some(target) {
            return;
        }

        if let Some(previous) = self.hovered.replace(target) {
            self.deliver(previous, EventKind::MouseLeaved, pos);
        }
        tracing::trace!("hover {:?} -> {}", self.hovered, target);
        self.deliver(target, EventKind::MouseEntered, pos);
    }

    fn route_key(&mut self, kind: EventKind, key: KeyEvent) {
        let mut event = UiEvent::key(kind, key);
        self.sheet.route(&mut event);
    }
}

impl InputDispatcher for UiWindow {
    fn dispatch_key_pressed(&mut self, event: KeyEvent) {
        self.route_key(EventKind::KeyPressed, event);
    }

    fn dispatch_key_released(&mut self, event: KeyEvent) {
        self.route_key(EventKind::KeyReleased, event);
    }

    fn dispatch_mouse_moved(&mut self, pos: Vec2, delta: Vec2) {
        self.cursor = pos;
        self.update_hover(pos);
        let mut event = UiEvent::mouse_moved(pos, delta);
        self.sheet.route(&mut event);
    }

    fn dispatch_mouse_pressed(&mut self, pos: Vec2, button: MouseButton) {
        self.cursor = pos;
        self.update_hover(pos);
        let mut event = UiEvent::mouse_pressed(pos, button);
        let target = self.sheet.target(&mut event);
        self.sheet.receive_event(target, &mut event);
        self.pressed = Some((target, button));
    }

    fn dispatch_mouse_released(&mut self, pos: Vec2, button: MouseButton) {
        self.cursor = pos;
        let mut event = UiEvent::mouse_released(pos, button);
        let target = self.sheet.target(&mut event);

        let pressed = match self.pressed {
            Some((id, held)) if held == button => {
                self.pressed = None;
                Some(id).filter(|id| self.sheet.contains_widget(*id))
            }
            _ => None,
        };

        self.sheet.receive_event(pressed.unwrap_or(target), &mut event);

        if pressed == Some(target) {
            let mut click = UiEvent::mouse_clicked(pos, button);
            let receiver = self.sheet.target(&mut click);
            self.sheet.receive_event(receiver, &mut click);
        }
        self.update_hover(pos);
    }

    fn resize(&mut self, size: Vec2) {
        self.sheet.resize(size);
    }

    fn pointer_left(&mut self) {
        if let Some(previous) = self.hovered.take() {
            self.deliver(previous, EventKind::MouseLeaved, self.cursor);
        }
    }
}
