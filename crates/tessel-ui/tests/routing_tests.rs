//! Hit-testing, event routing and control delegation.

use std::cell::RefCell;
use std::rc::Rc;

use tessel_core::geometry::Rect;
use tessel_core::math::Vec2;
use tessel_core::object::Typed;
use tessel_input::event::{KeyCode, PhysicalKey};
use tessel_input::{DeviceType, EventKind, KeyEvent, MouseButton};
use tessel_ui::{
    ControlMode, ControlTier, EventCx, InputAdapter, RootSheet, StyleTable, UiEvent, Widget, WidgetId,
    WidgetParams, WidgetState,
};

type Log = Rc<RefCell<Vec<(WidgetId, EventKind, Vec2)>>>;

#[derive(Typed)]
#[typed(base = Widget)]
struct Recorder {
    log: Log,
    handles: bool,
}

impl Recorder {
    fn record(&self, cx: &EventCx, event: &UiEvent) -> bool {
        self.log.borrow_mut().push((cx.id(), event.kind, event.mouse.relative));
        self.handles
    }
}

impl InputAdapter for Recorder {
    fn mouse_moved(&mut self, cx: &mut EventCx, event: &mut UiEvent) -> bool {
        self.record(cx, event)
    }

    fn key_pressed(&mut self, cx: &mut EventCx, event: &mut UiEvent) -> bool {
        self.record(cx, event)
    }
}

struct Fixture {
    sheet: RootSheet,
    panel: WidgetId,
    button: WidgetId,
    other: WidgetId,
    log: Log,
}

/// root 400x300
/// ├── panel   (10,10) 200x200
/// │   └── button (20,20) 50x50, absolute (30,30)
/// └── other   (250,10) 100x100
fn fixture(handles: bool) -> Fixture {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut sheet = RootSheet::new(StyleTable::new(), Vec2::new(400.0, 300.0));
    let root = sheet.root();

    let place = |sheet: &mut RootSheet, parent: WidgetId, rect: Rect| {
        let id = sheet
            .create(WidgetParams::new().parent(parent).behavior(Recorder {
                log: log.clone(),
                handles,
            }))
            .unwrap();
        sheet.frame_mut(id).unwrap().set_rect(rect);
        id
    };

    let panel = place(&mut sheet, root, Rect::from_xywh(10.0, 10.0, 200.0, 200.0));
    let button = place(&mut sheet, panel, Rect::from_xywh(20.0, 20.0, 50.0, 50.0));
    let other = place(&mut sheet, root, Rect::from_xywh(250.0, 10.0, 100.0, 100.0));

    Fixture {
        sheet,
        panel,
        button,
        other,
        log,
    }
}

fn key() -> KeyEvent {
    KeyEvent {
        key: PhysicalKey::Code(KeyCode::KeyA),
        text: None,
    }
}

#[test]
fn test_deepest_opaque_widget_is_hit() {
    let Fixture {
        sheet, panel, button, ..
    } = fixture(true);
    let root = sheet.root();

    assert_eq!(sheet.pinpoint(root, Vec2::new(40.0, 40.0)), Some(button));
    assert_eq!(sheet.pinpoint(root, Vec2::new(15.0, 15.0)), Some(panel));
    assert_eq!(sheet.pinpoint(root, Vec2::new(390.0, 290.0)), Some(root));
    assert_eq!(sheet.pinpoint(root, Vec2::new(500.0, 10.0)), None);

    let mut event = UiEvent::mouse_moved(Vec2::new(40.0, 40.0), Vec2::ZERO);
    assert_eq!(sheet.target(&mut event), button);
    assert_eq!(event.mouse.relative, Vec2::new(10.0, 10.0));
}

#[test]
fn test_later_sibling_wins_overlap() {
    let Fixture { mut sheet, panel, .. } = fixture(true);
    let root = sheet.root();
    let cover = sheet.create(WidgetParams::new().parent(root)).unwrap();
    sheet
        .frame_mut(cover)
        .unwrap()
        .set_rect(Rect::from_xywh(0.0, 0.0, 100.0, 100.0));

    assert_eq!(sheet.pinpoint(root, Vec2::new(40.0, 40.0)), Some(cover));
    sheet.hide(cover).unwrap();
    assert_ne!(sheet.pinpoint(root, Vec2::new(40.0, 40.0)), Some(cover));
    assert_eq!(sheet.pinpoint(root, Vec2::new(100.0, 150.0)), Some(panel));
}

#[test]
fn test_consumed_event_is_left_alone() {
    let Fixture {
        mut sheet, button, log, ..
    } = fixture(true);

    let mut event = UiEvent::mouse_moved(Vec2::new(40.0, 40.0), Vec2::ZERO);
    event.mouse.relative = Vec2::new(-1.0, -1.0);
    event.consume();

    assert_eq!(sheet.receive_event(button, &mut event), button);
    assert!(event.visited().is_empty());
    assert_eq!(event.mouse.relative, Vec2::new(-1.0, -1.0));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_handled_event_is_consumed_with_relative_position() {
    let Fixture {
        mut sheet, button, log, ..
    } = fixture(true);

    let mut event = UiEvent::mouse_moved(Vec2::new(40.0, 40.0), Vec2::ZERO);
    assert_eq!(sheet.route(&mut event), button);
    assert!(event.is_consumed());
    assert_eq!(event.visited(), &[button]);
    assert_eq!(
        *log.borrow(),
        vec![(button, EventKind::MouseMoved, Vec2::new(10.0, 10.0))]
    );
}

#[test]
fn test_unhandled_event_bubbles_to_root() {
    let Fixture {
        mut sheet,
        panel,
        button,
        log,
        ..
    } = fixture(false);
    let root = sheet.root();

    let mut event = UiEvent::mouse_moved(Vec2::new(40.0, 40.0), Vec2::ZERO);
    assert_eq!(sheet.route(&mut event), root);
    assert!(!event.is_consumed());
    assert_eq!(event.visited(), &[button, panel, root]);

    let relatives: Vec<Vec2> = log.borrow().iter().map(|(_, _, rel)| *rel).collect();
    assert_eq!(relatives, vec![Vec2::new(10.0, 10.0), Vec2::new(30.0, 30.0)]);
}

#[test]
fn test_default_press_sets_triggered() {
    let Fixture {
        mut sheet, button, ..
    } = fixture(false);

    let mut press = UiEvent::mouse_pressed(Vec2::new(40.0, 40.0), MouseButton::Left);
    assert_eq!(sheet.route(&mut press), button);
    assert!(press.is_consumed());
    assert!(sheet.state(button).unwrap().contains(WidgetState::TRIGGERED));

    let mut release = UiEvent::mouse_released(Vec2::new(40.0, 40.0), MouseButton::Left);
    sheet.route(&mut release);
    assert!(!sheet.state(button).unwrap().contains(WidgetState::TRIGGERED));
}

#[test]
fn test_default_hover_bubbles_focus() {
    let Fixture {
        mut sheet,
        panel,
        button,
        ..
    } = fixture(false);

    let mut enter = UiEvent::hover(EventKind::MouseEntered, Vec2::new(40.0, 40.0));
    sheet.receive_event(button, &mut enter);
    assert!(!enter.is_consumed());
    assert!(sheet.state(button).unwrap().contains(WidgetState::FOCUSED));
    assert!(sheet.state(panel).unwrap().contains(WidgetState::FOCUSED));

    let mut leave = UiEvent::hover(EventKind::MouseLeaved, Vec2::new(40.0, 40.0));
    sheet.receive_event(button, &mut leave);
    assert!(!sheet.state(button).unwrap().contains(WidgetState::FOCUSED));
}

#[test]
fn test_disabled_widget_passes_events_on() {
    let Fixture {
        mut sheet,
        panel,
        button,
        log,
        ..
    } = fixture(true);
    sheet.enable_state(button, WidgetState::DISABLED).unwrap();

    let mut event = UiEvent::mouse_moved(Vec2::new(40.0, 40.0), Vec2::ZERO);
    assert_eq!(sheet.route(&mut event), panel);
    assert_eq!(log.borrow().first().map(|(id, _, _)| *id), Some(panel));
}

#[test]
fn test_take_control_captures_device() {
    let Fixture {
        mut sheet, button, ..
    } = fixture(true);

    let tier = sheet.take_control(button, ControlMode::Control, DeviceType::Mouse).unwrap();
    assert_eq!(tier, ControlTier::Global);
    assert!(sheet.state(button).unwrap().contains(WidgetState::CONTROL));
    assert!(!sheet.state(button).unwrap().contains(WidgetState::MODAL));

    // outside the widget and on a button device falling back to the mouse
    let mut event = UiEvent::mouse_pressed(Vec2::new(300.0, 250.0), MouseButton::Right);
    assert_eq!(sheet.target(&mut event), button);
    assert_eq!(event.mouse.relative, Vec2::new(270.0, 220.0));

    sheet.yield_control(button).unwrap();
    assert!(!sheet.state(button).unwrap().contains(WidgetState::CONTROL));
    assert_eq!(sheet.control_tier(button).unwrap(), ControlTier::None);
    assert!(sheet.control_graph(button).unwrap().is_none());
    assert!(sheet.switch().is_empty());
}

#[test]
fn test_control_flag_sits_on_owner() {
    let Fixture {
        mut sheet,
        panel,
        button,
        other,
        ..
    } = fixture(true);

    sheet
        .give_control(other, button, ControlMode::Control, DeviceType::Keyboard)
        .unwrap();
    assert!(sheet.state(other).unwrap().contains(WidgetState::CONTROL));
    assert!(!sheet.state(button).unwrap().contains(WidgetState::CONTROL));
    assert_eq!(sheet.widget(button).unwrap().control_parent(), Some(other));

    let mut event = UiEvent::key(EventKind::KeyPressed, key());
    assert_eq!(sheet.route(&mut event), button);

    sheet.yield_control(other).unwrap();
    assert!(!sheet.state(other).unwrap().contains(WidgetState::CONTROL));
    assert_eq!(sheet.widget(button).unwrap().control_parent(), Some(panel));
}

#[test]
fn test_stacked_grants_yield_back() {
    let Fixture {
        mut sheet,
        panel,
        button,
        ..
    } = fixture(true);

    sheet.take_control(panel, ControlMode::Control, DeviceType::Mouse).unwrap();
    sheet.take_control(button, ControlMode::Control, DeviceType::Mouse).unwrap();
    assert!(!sheet.state(panel).unwrap().contains(WidgetState::CONTROL));
    assert!(sheet.state(button).unwrap().contains(WidgetState::CONTROL));

    sheet.yield_control(button).unwrap();
    assert!(sheet.state(panel).unwrap().contains(WidgetState::CONTROL));
    let mut event = UiEvent::mouse_moved(Vec2::new(300.0, 250.0), Vec2::ZERO);
    assert_eq!(sheet.target(&mut event), panel);
}

#[test]
fn test_modal_confines_routing() {
    let Fixture {
        mut sheet,
        panel,
        button,
        other,
        ..
    } = fixture(true);

    sheet.take_control(panel, ControlMode::Modal, DeviceType::Mouse).unwrap();
    let state = sheet.state(panel).unwrap();
    assert!(state.contains(WidgetState::CONTROL | WidgetState::MODAL));

    let mut inside = UiEvent::mouse_moved(Vec2::new(40.0, 40.0), Vec2::ZERO);
    assert_eq!(sheet.target(&mut inside), button);
    let mut outside = UiEvent::mouse_moved(Vec2::new(300.0, 50.0), Vec2::ZERO);
    assert_eq!(sheet.target(&mut outside), panel);

    // widgets inside the modal receiver may still take control
    assert_eq!(
        sheet.take_control(button, ControlMode::Control, DeviceType::Mouse).unwrap(),
        ControlTier::Global
    );

    // the inner grant does not lift the modal one below it
    assert_eq!(
        sheet.take_control(other, ControlMode::Control, DeviceType::Mouse).unwrap(),
        ControlTier::LocalChain
    );
    assert!(!sheet.state(other).unwrap().contains(WidgetState::CONTROL));
    let mut press = UiEvent::mouse_pressed(Vec2::new(40.0, 40.0), MouseButton::Left);
    assert_eq!(sheet.target(&mut press), button);
    sheet.yield_control(other).unwrap();
    sheet.yield_control(button).unwrap();

    // outsiders fall back to a local chain
    assert_eq!(
        sheet.take_control(other, ControlMode::Control, DeviceType::Mouse).unwrap(),
        ControlTier::LocalChain
    );
    assert!(!sheet.state(other).unwrap().contains(WidgetState::CONTROL));
    assert_eq!(sheet.control_graph(other).unwrap().map(|g| g.len()), Some(1));

    sheet.yield_control(panel).unwrap();
    let state = sheet.state(panel).unwrap();
    assert!(!state.intersects(WidgetState::CONTROL | WidgetState::MODAL));
}

#[test]
fn test_local_chain_redirects_routing() {
    let Fixture {
        mut sheet,
        panel,
        button,
        other,
        ..
    } = fixture(true);

    sheet.take_control(panel, ControlMode::Modal, DeviceType::Mouse).unwrap();
    let leaf = sheet.create(WidgetParams::new().parent(other)).unwrap();
    sheet
        .frame_mut(leaf)
        .unwrap()
        .set_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));

    let tier = sheet
        .give_control(other, button, ControlMode::Control, DeviceType::Mouse)
        .unwrap();
    assert_eq!(tier, ControlTier::LocalChain);

    // routing that passes through `other` is handed to `button`
    let mut event = UiEvent::mouse_moved(Vec2::new(255.0, 15.0), Vec2::ZERO);
    assert_eq!(sheet.control_event(other, &mut event), button);

    // a receiver destroyed while in a chain leaves the chain
    sheet.destroy(button).unwrap();
    assert!(sheet.control_graph(other).unwrap().is_none());
    assert_eq!(sheet.control_tier(other).unwrap(), ControlTier::None);
    let mut event = UiEvent::mouse_moved(Vec2::new(255.0, 15.0), Vec2::ZERO);
    assert_eq!(sheet.control_event(other, &mut event), leaf);
}

#[test]
fn test_control_cycles_terminate() {
    let Fixture {
        mut sheet,
        panel,
        other,
        ..
    } = fixture(false);
    let root = sheet.root();
    let third = sheet.create(WidgetParams::new().parent(root)).unwrap();

    sheet.take_control(panel, ControlMode::Modal, DeviceType::Mouse).unwrap();
    sheet
        .give_control(other, third, ControlMode::Control, DeviceType::Mouse)
        .unwrap();
    sheet
        .give_control(third, other, ControlMode::Control, DeviceType::Mouse)
        .unwrap();

    let mut event = UiEvent::mouse_moved(Vec2::new(300.0, 50.0), Vec2::ZERO);
    let target = sheet.control_event(other, &mut event);
    assert!(target == other || target == third);

    let mut event = UiEvent::mouse_moved(Vec2::new(300.0, 50.0), Vec2::ZERO);
    sheet.receive_event(other, &mut event);
    assert_eq!(event.visited(), &[other, third]);
}

#[test]
fn test_keyboard_starts_at_active_widget() {
    let Fixture {
        mut sheet,
        panel,
        button,
        log,
        ..
    } = fixture(false);
    let root = sheet.root();
    sheet.make_active(button).unwrap();

    let mut event = UiEvent::key(EventKind::KeyPressed, key());
    assert_eq!(sheet.route(&mut event), root);
    assert_eq!(event.visited(), &[button, panel, root]);
    assert_eq!(log.borrow().len(), 2);
}
