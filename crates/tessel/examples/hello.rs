//! A column of buttons; clicking one toggles it, and the last one opens a
//! modal panel that holds the mouse until it is clicked.
//!
//! Run with: cargo run --example hello

use tessel::prelude::*;

#[derive(Typed)]
#[typed(base = Widget)]
struct Button;

impl InputAdapter for Button {
    fn mouse_clicked(&mut self, cx: &mut EventCx, _event: &mut UiEvent) -> bool {
        let _ = cx.toggle_state(WidgetState::ACTIVATED);
        if let Ok(label) = cx.sheet().label(cx.id()) {
            tracing::info!("clicked {}", label);
        }
        true
    }
}

#[derive(Typed)]
#[typed(base = Widget)]
struct Dialog;

impl InputAdapter for Dialog {
    fn mouse_clicked(&mut self, cx: &mut EventCx, _event: &mut UiEvent) -> bool {
        let _ = cx.yield_control();
        let id = cx.id();
        let _ = cx.sheet_mut().hide(id);
        true
    }
}

#[derive(Typed)]
#[typed(base = Button)]
struct Opener {
    dialog: Option<WidgetId>,
}

impl InputAdapter for Opener {
    fn mouse_clicked(&mut self, cx: &mut EventCx, _event: &mut UiEvent) -> bool {
        if let Some(dialog) = self.dialog {
            let sheet = cx.sheet_mut();
            let _ = sheet.show(dialog);
            let _ = sheet.take_control(dialog, ControlMode::Modal, DeviceType::Mouse);
        }
        true
    }
}

fn styles() -> StyleTable {
    let mut styles = StyleTable::new();
    styles.register(
        Style::new("RootSheet")
            .flex_direction(tessel::ui::style::FlexDirection::Column)
            .padding(16.0)
            .ink(InkStyle::default().background(Color::hex(0x1e1e24))),
    );
    styles.register(
        Style::new("Button")
            .width(160.0)
            .height(32.0)
            .ink(InkStyle::default().background(Color::hex(0x3a3a48)))
            .with_skin(WidgetState::FOCUSED, InkStyle::default().background(Color::hex(0x4a4a5c)))
            .with_skin(WidgetState::TRIGGERED, InkStyle::default().background(Color::hex(0x2a2a34)))
            .with_skin(WidgetState::ACTIVATED, InkStyle::default().background(Color::hex(0x5566aa))),
    );
    styles.register(
        Style::new("Dialog").ink(InkStyle::default().background(Color::rgba(0.0, 0.0, 0.0, 0.6))),
    );
    styles
}

fn main() {
    ApplicationBuilder::new()
        .with_title("Tessel - hello")
        .with_size(640, 480)
        .with_styles(styles())
        .run(|sheet| {
            let root = sheet.root();
            for caption in ["First", "Second", "Third"] {
                sheet.create(WidgetParams::new().parent(root).behavior(Button).content(caption))?;
            }

            let dialog = sheet.create(
                WidgetParams::new()
                    .parent(root)
                    .frame(FrameKind::MasterLayer)
                    .behavior(Dialog),
            )?;
            sheet.hide(dialog)?;
            sheet.create(
                WidgetParams::new()
                    .parent(root)
                    .behavior(Opener { dialog: Some(dialog) })
                    .content("Open dialog"),
            )?;
            Ok(())
        })
        .unwrap();
}
