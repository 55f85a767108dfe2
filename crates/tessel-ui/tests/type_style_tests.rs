//! Runtime types of widgets and style resolution along the type chain.

use tessel_core::math::Vec2;
use tessel_core::object::{TypeObject, Typed, downcast, upcast, upcast_mut};
use tessel_ui::{Color, InkStyle, InputAdapter, RootSheet, Style, StyleTable, Widget, WidgetParams};

#[derive(Typed)]
#[typed(base = Widget)]
struct Button {
    clicks: u32,
}

impl InputAdapter for Button {}

#[derive(Typed)]
struct Toggle {
    #[base]
    button: Button,
    on: bool,
}

impl InputAdapter for Toggle {}

fn toggle() -> Toggle {
    Toggle {
        button: Button { clicks: 3 },
        on: true,
    }
}

#[test]
fn test_widget_takes_behavior_type() {
    let mut sheet = RootSheet::new(StyleTable::new(), Vec2::new(100.0, 100.0));
    let root = sheet.root();
    let id = sheet
        .create(WidgetParams::new().parent(root).behavior(toggle()))
        .unwrap();

    let widget = sheet.widget(id).unwrap();
    assert_eq!(widget.ty(), Toggle::cls());
    assert_eq!(widget.object_type().name(), "Toggle");
}

#[test]
fn test_upcast_through_widget() {
    let mut sheet = RootSheet::new(StyleTable::new(), Vec2::new(100.0, 100.0));
    let root = sheet.root();
    let id = sheet
        .create(WidgetParams::new().parent(root).behavior(toggle()))
        .unwrap();
    let widget = sheet.widget(id).unwrap();

    assert!(upcast::<Widget>(widget).is_some());
    assert_eq!(upcast::<Button>(widget).map(|b| b.clicks), Some(3));
    assert_eq!(upcast::<Toggle>(widget).map(|t| t.on), Some(true));
    assert_eq!(downcast::<Toggle>(widget).map(|t| t.button.clicks), Some(3));
    assert!(downcast::<Button>(widget).is_none());
}

#[test]
fn test_upcast_fails_across_branches() {
    let mut sheet = RootSheet::new(StyleTable::new(), Vec2::new(100.0, 100.0));
    let root = sheet.root();
    let plain = sheet.create(WidgetParams::new().parent(root)).unwrap();
    let button = sheet
        .create(WidgetParams::new().parent(root).behavior(Button { clicks: 0 }))
        .unwrap();

    assert!(upcast::<Button>(sheet.widget(plain).unwrap()).is_none());
    assert!(upcast::<Toggle>(sheet.widget(button).unwrap()).is_none());
}

#[test]
fn test_upcast_mut_reaches_behavior() {
    let mut sheet = RootSheet::new(StyleTable::new(), Vec2::new(100.0, 100.0));
    let root = sheet.root();
    let id = sheet
        .create(WidgetParams::new().parent(root).behavior(toggle()))
        .unwrap();

    let widget = sheet.widget_mut(id).unwrap();
    if let Some(button) = upcast_mut::<Button>(widget) {
        button.clicks += 1;
    }
    assert_eq!(upcast::<Button>(sheet.widget(id).unwrap()).map(|b| b.clicks), Some(4));
}

#[test]
fn test_style_falls_back_along_type_chain() {
    let mut styles = StyleTable::new();
    styles.register(Style::new("Button").ink(InkStyle::default().background(Color::BLACK)));
    let mut sheet = RootSheet::new(styles, Vec2::new(100.0, 100.0));
    let root = sheet.root();

    let id = sheet
        .create(WidgetParams::new().parent(root).behavior(toggle()))
        .unwrap();
    assert_eq!(sheet.style(id).unwrap().map(|s| s.name()), Some("Button"));
    assert_eq!(sheet.frame(id).unwrap().skin().background, Some(Color::BLACK));

    // a more derived registration wins once the style is re-resolved
    sheet.styles_mut().register(Style::new("Toggle"));
    sheet.update_style(id).unwrap();
    assert_eq!(sheet.style(id).unwrap().map(|s| s.name()), Some("Toggle"));
}

#[test]
fn test_unstyled_chain_gets_default() {
    let mut sheet = RootSheet::new(StyleTable::new(), Vec2::new(100.0, 100.0));
    let root = sheet.root();
    let id = sheet
        .create(WidgetParams::new().parent(root).behavior(toggle()))
        .unwrap();

    assert_eq!(sheet.style(id).unwrap().map(|s| s.name()), Some("Widget"));
    assert_eq!(sheet.style(root).unwrap().map(|s| s.name()), Some("Widget"));
}

#[test]
fn test_explicit_style_is_kept() {
    let mut styles = StyleTable::new();
    styles.register(Style::new("Button"));
    let special = styles.register(Style::new("Special"));
    let mut sheet = RootSheet::new(styles, Vec2::new(100.0, 100.0));
    let root = sheet.root();

    let id = sheet
        .create(
            WidgetParams::new()
                .parent(root)
                .behavior(Button { clicks: 0 })
                .style(special),
        )
        .unwrap();
    sheet.update_style(id).unwrap();
    assert_eq!(sheet.style(id).unwrap().map(|s| s.name()), Some("Special"));
}

#[test]
fn test_find_container_matches_exact_type() {
    let mut sheet = RootSheet::new(StyleTable::new(), Vec2::new(100.0, 100.0));
    let root = sheet.root();
    let outer = sheet
        .create(WidgetParams::new().parent(root).behavior(Button { clicks: 0 }))
        .unwrap();
    let inner = sheet
        .create(WidgetParams::new().parent(outer).behavior(toggle()))
        .unwrap();
    let leaf = sheet.create(WidgetParams::new().parent(inner)).unwrap();

    assert_eq!(sheet.find_container(leaf, Button::cls()), Some(outer));
    assert_eq!(sheet.find_container(leaf, Toggle::cls()), Some(inner));
    assert_eq!(sheet.find_container(leaf, RootSheet::cls()), Some(root));
}
