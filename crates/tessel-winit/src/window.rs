use std::sync::Arc;

use tessel_core::geometry::Size;
use tessel_core::math::Vec2;
pub use winit::window::Window as WinitWindow;
use winit::{error::OsError, event_loop::ActiveEventLoop};

pub struct WindowDescriptor {
    pub title: String,
    pub resizable: bool,
    /// Initial inner size in logical pixels.
    pub size: Option<Size<u32>>,
    pub visible: bool,
    pub hide_cursor: bool,
}

impl Default for WindowDescriptor {
    fn default() -> Self {
        Self {
            title: "Tessel".to_string(),
            resizable: true,
            size: Some(Size::new(1200, 800)),
            visible: true,
            hide_cursor: false,
        }
    }
}

pub struct Window {
    pub window: Arc<WinitWindow>,
}

impl Window {
    pub fn id(&self) -> winit::window::WindowId {
        self.window.id()
    }

    /// Logical (DPI-independent) inner size.
    pub fn logical_size(&self) -> Size<u32> {
        let physical_size = self.window.inner_size();
        let scale_factor = self.window.scale_factor();
        Size::new(
            (physical_size.width as f64 / scale_factor) as u32,
            (physical_size.height as f64 / scale_factor) as u32,
        )
    }

    pub fn logical_size_vec2(&self) -> Vec2 {
        self.logical_size().to_vec2()
    }

    pub fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }

    pub fn set_cursor_visible(&self, visible: bool) {
        self.window.set_cursor_visible(visible);
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    /// Present the frame: asks the platform to redraw the window.
    pub fn present(&self) {
        self.window.request_redraw();
    }

    pub(crate) fn new(
        event_loop: &ActiveEventLoop,
        descriptor: WindowDescriptor,
    ) -> Result<Self, OsError> {
        let mut attributes = WinitWindow::default_attributes()
            .with_title(descriptor.title)
            .with_resizable(descriptor.resizable)
            .with_visible(descriptor.visible);

        if let Some(size) = descriptor.size {
            attributes =
                attributes.with_inner_size(winit::dpi::LogicalSize::new(size.width, size.height));
        }

        let window = Arc::new(event_loop.create_window(attributes)?);
        if descriptor.hide_cursor {
            window.set_cursor_visible(false);
        }

        tracing::info!(
            "created window {:?} ({}x{} @ {:.2}x)",
            window.id(),
            window.inner_size().width,
            window.inner_size().height,
            window.scale_factor()
        );

        Ok(Window { window })
    }
}
