//! Per-widget input handlers.
//!
//! A widget's behavior implements [`InputAdapter`]; every handler returns
//! whether it handled the event. A handled event is consumed, an unhandled
//! one bubbles to the widget's control parent. The default handlers give
//! hover and press feedback: entering sets `FOCUSED` and leaving clears it
//! without stopping propagation; pressing sets `TRIGGERED`, releasing clears
//! it, and both stop propagation.

use tessel_core::object::{TypeObject, Typed};
use tessel_input::{DeviceType, EventKind, InputEvent};

use crate::control::{ControlMode, ControlTier};
use crate::error::UiResult;
use crate::sheet::RootSheet;
use crate::state::WidgetState;
use crate::widget::{Widget, WidgetId};

/// Input events routed through the widget tree.
pub type UiEvent = InputEvent<WidgetId>;

/// Access to the sheet from inside a handler, scoped to the handling widget.
pub struct EventCx<'a> {
    sheet: &'a mut RootSheet,
    id: WidgetId,
}

impl<'a> EventCx<'a> {
    pub(crate) fn new(sheet: &'a mut RootSheet, id: WidgetId) -> Self {
        EventCx { sheet, id }
    }

    /// The widget handling the event.
    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn sheet(&self) -> &RootSheet {
        self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut RootSheet {
        self.sheet
    }

    pub fn state(&self) -> WidgetState {
        self.sheet.state(self.id).unwrap_or_default()
    }

    pub fn toggle_state(&mut self, state: WidgetState) -> UiResult<()> {
        self.sheet.toggle_state(self.id, state)
    }

    pub fn enable_state(&mut self, state: WidgetState) -> UiResult<()> {
        self.sheet.enable_state(self.id, state)
    }

    pub fn disable_state(&mut self, state: WidgetState) -> UiResult<()> {
        self.sheet.disable_state(self.id, state)
    }

    pub fn make_active(&mut self) -> UiResult<()> {
        self.sheet.make_active(self.id)
    }

    pub fn take_control(&mut self, mode: ControlMode, device: DeviceType) -> UiResult<ControlTier> {
        self.sheet.take_control(self.id, mode, device)
    }

    pub fn give_control(
        &mut self,
        receiver: WidgetId,
        mode: ControlMode,
        device: DeviceType,
    ) -> UiResult<ControlTier> {
        self.sheet.give_control(self.id, receiver, mode, device)
    }

    /// Set or clear gesture feedback flags, logging a failure. Returns
    /// whether the change was applied.
    pub(crate) fn feedback(&mut self, state: WidgetState, on: bool) -> bool {
        let result = if on {
            self.enable_state(state)
        } else {
            self.disable_state(state)
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("failed to update {:?} on {}: {}", state, self.id, err);
                false
            }
        }
    }

    pub fn yield_control(&mut self) -> UiResult<()> {
        self.sheet.yield_control(self.id)
    }

    pub fn set_content(&mut self, content: &str) -> UiResult<()> {
        self.sheet.set_content(self.id, content)
    }
}

/// Input handlers of a widget behavior.
///
/// Behaviors are typed objects declaring `Widget` (or another behavior) as
/// their base, so style lookup and `upcast` see them as widgets:
///
/// ```ignore
/// #[derive(Typed)]
/// #[typed(base = Widget)]
/// struct Button;
///
/// impl InputAdapter for Button {
///     fn mouse_clicked(&mut self, cx: &mut EventCx, _event: &mut UiEvent) -> bool {
///         let _ = cx.toggle_state(WidgetState::ACTIVATED);
///         true
///     }
/// }
/// ```
#[allow(unused_variables)]
pub trait InputAdapter: TypeObject {
    fn mouse_entered(&mut self, cx: &mut EventCx, event: &mut UiEvent) -> bool {
        cx.feedback(WidgetState::FOCUSED, true);
        false
    }

    fn mouse_leaved(&mut self, cx: &mut EventCx, event: &mut UiEvent) -> bool {
        cx.feedback(WidgetState::FOCUSED, false);
        false
    }

    fn mouse_pressed(&mut self, cx: &mut EventCx, event: &mut UiEvent) -> bool {
        cx.feedback(WidgetState::TRIGGERED, true);
        true
    }

    fn mouse_released(&mut self, cx: &mut EventCx, event: &mut UiEvent) -> bool {
        cx.feedback(WidgetState::TRIGGERED, false);
        true
    }

    fn mouse_moved(&mut self, cx: &mut EventCx, event: &mut UiEvent) -> bool {
        false
    }

    fn mouse_clicked(&mut self, cx: &mut EventCx, event: &mut UiEvent) -> bool {
        false
    }

    fn key_pressed(&mut self, cx: &mut EventCx, event: &mut UiEvent) -> bool {
        false
    }

    fn key_released(&mut self, cx: &mut EventCx, event: &mut UiEvent) -> bool {
        false
    }

    /// The widget was destroyed.
    fn destroyed(&mut self, id: WidgetId) {}
}

/// Handlers of a widget without a behavior: the defaults only.
#[derive(Typed)]
#[typed(name = "PlainWidget", base = Widget)]
pub(crate) struct Plain;

impl InputAdapter for Plain {}

/// Run the handler of `adapter` matching the event kind.
pub(crate) fn dispatch(adapter: &mut dyn InputAdapter, cx: &mut EventCx, event: &mut UiEvent) -> bool {
    match event.kind {
        EventKind::MouseEntered => adapter.mouse_entered(cx, event),
        EventKind::MouseLeaved => adapter.mouse_leaved(cx, event),
        EventKind::MousePressed => adapter.mouse_pressed(cx, event),
        EventKind::MouseReleased => adapter.mouse_released(cx, event),
        EventKind::MouseMoved => adapter.mouse_moved(cx, event),
        EventKind::MouseClicked => adapter.mouse_clicked(cx, event),
        EventKind::KeyPressed => adapter.key_pressed(cx, event),
        EventKind::KeyReleased => adapter.key_released(cx, event),
    }
}
