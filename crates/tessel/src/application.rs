//! High-level builder that opens a window and runs a widget sheet in it.

use std::cell::RefCell;
use std::path::PathBuf;

use tessel_core::config::Config;
use tessel_core::geometry::Size;
use tessel_input::InputTranslator;
use tessel_ui::{ImageCatalog, RootSheet, StyleTable, UiResult, UiWindow};
use tessel_winit::{
    FrameTime, WindowId,
    app::{App, AppCtx, EventLoopError, OsError, run_app_with},
    event::EventBatch,
    window::{Window, WindowDescriptor},
};

/// Builds the widgets of the sheet once the window exists.
pub type SceneBuilder = Box<dyn FnOnce(&mut RootSheet) -> UiResult<()>>;

/// Runs one window: native events are translated into widget input, and
/// each frame lays the sheet out before presenting.
pub struct UiApplication {
    window: Window,
    translator: InputTranslator,
    ui: UiWindow,
}

impl UiApplication {
    pub fn new(window: Window, ui: UiWindow) -> Self {
        let translator = InputTranslator::new(window.logical_size_vec2());
        UiApplication {
            window,
            translator,
            ui,
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn ui(&self) -> &UiWindow {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut UiWindow {
        &mut self.ui
    }
}

impl App for UiApplication {
    fn update(&mut self, _ctx: &mut AppCtx, time: &FrameTime) {
        if time.frame_count % 600 == 0 {
            tracing::trace!("frame {}: {} widgets", time.frame_count, self.ui.sheet().len());
        }
    }

    fn render(&mut self, _ctx: &mut AppCtx, window_id: WindowId, events: &mut EventBatch) -> bool {
        if window_id != self.window.id() {
            return true;
        }

        self.translator.handle_events(events, &mut self.ui);
        let running = self.ui.next_frame();
        self.window.present();
        running
    }

    fn on_exit(&mut self, _ctx: &mut AppCtx) {
        tracing::info!("closing ui window");
    }
}

/// Declarative setup of a single-window UI application.
///
/// # Example
///
/// ```ignore
/// use tessel::prelude::*;
///
/// fn main() {
///     ApplicationBuilder::new()
///         .with_title("Hello")
///         .with_size(640, 480)
///         .run(|sheet| {
///             let root = sheet.root();
///             sheet.create(WidgetParams::new().parent(root).content("Hello"))?;
///             Ok(())
///         })
///         .unwrap();
/// }
/// ```
pub struct ApplicationBuilder {
    title: String,
    size: (u32, u32),
    styles: StyleTable,
    images: Option<PathBuf>,
    config: Option<Config>,
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationBuilder {
    /// Defaults: title "Tessel Application", 1280x720, the default style
    /// table, no images and configuration from the environment.
    pub fn new() -> Self {
        Self {
            title: "Tessel Application".to_string(),
            size: (1280, 720),
            styles: StyleTable::new(),
            images: None,
            config: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Window size in logical pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_styles(mut self, styles: StyleTable) -> Self {
        self.styles = styles;
        self
    }

    /// Directory scanned for icon images.
    pub fn with_images(mut self, dir: impl Into<PathBuf>) -> Self {
        self.images = Some(dir.into());
        self
    }

    /// Use `config` instead of reading the environment.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Open the window, build the scene with `build` and run until the
    /// window closes.
    pub fn run(
        self,
        build: impl FnOnce(&mut RootSheet) -> UiResult<()> + 'static,
    ) -> Result<(), EventLoopError> {
        let config = self.config.unwrap_or_else(Config::from_env);

        // The app factory is a plain fn: hand the setup over through a
        // thread local.
        PENDING.with(|pending| {
            *pending.borrow_mut() = Some(PendingApp {
                title: self.title,
                size: self.size,
                styles: self.styles,
                images: self.images,
                build: Box::new(build),
            });
        });

        run_app_with(config, start_pending)
    }
}

struct PendingApp {
    title: String,
    size: (u32, u32),
    styles: StyleTable,
    images: Option<PathBuf>,
    build: SceneBuilder,
}

thread_local! {
    static PENDING: RefCell<Option<PendingApp>> = const { RefCell::new(None) };
}

fn start_pending(ctx: &mut AppCtx) -> Result<Box<dyn App>, OsError> {
    let pending = PENDING.with(|pending| pending.borrow_mut().take());
    let Some(pending) = pending else {
        tracing::error!("application started without a pending setup");
        ctx.exit();
        return Ok(Box::new(Exiting));
    };

    let window = ctx.create_window(WindowDescriptor {
        title: pending.title,
        size: Some(Size::new(pending.size.0, pending.size.1)),
        ..Default::default()
    })?;

    let mut ui = UiWindow::with_styles(pending.styles, window.logical_size_vec2());
    if let Some(dir) = pending.images {
        let mut catalog = ImageCatalog::new();
        match catalog.scan(&dir) {
            Ok(count) => tracing::info!("loaded {} images from {}", count, dir.display()),
            Err(err) => tracing::warn!("failed to scan images in {}: {}", dir.display(), err),
        }
        ui.sheet_mut().set_image_source(catalog);
    }

    if let Err(err) = (pending.build)(ui.sheet_mut()) {
        tracing::error!("failed to build the scene: {}", err);
    }

    Ok(Box::new(UiApplication::new(window, ui)))
}

/// Stands in when there is nothing to run; ends the loop on its first frame.
struct Exiting;

impl App for Exiting {
    fn render(&mut self, _ctx: &mut AppCtx, _window_id: WindowId, _events: &mut EventBatch) -> bool {
        false
    }
}
