use crate::widget::WidgetId;

/// Errors reported by widget tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// No widget with this id exists in the sheet.
    UnknownWidget(WidgetId),
    /// The widget has been destroyed.
    Destroyed(WidgetId),
    /// `label` was read before any caption was set.
    NoCaption(WidgetId),
    /// An icon reference named an image the image source does not know.
    MissingImage(String),
    /// The operation would make a widget its own ancestor.
    CyclicParent { child: WidgetId, parent: WidgetId },
    /// The root widget cannot be destroyed or reparented.
    RootWidget,
    /// The layout solver rejected an operation.
    Layout(String),
}

impl std::fmt::Display for UiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UiError::UnknownWidget(id) => write!(f, "widget {} not found", id),
            UiError::Destroyed(id) => write!(f, "widget {} has been destroyed", id),
            UiError::NoCaption(id) => write!(f, "widget {} has no caption", id),
            UiError::MissingImage(name) => write!(f, "image '{}' not found", name),
            UiError::CyclicParent { child, parent } => {
                write!(f, "cannot bind {} under its own descendant {}", child, parent)
            }
            UiError::RootWidget => write!(f, "operation not allowed on the root widget"),
            UiError::Layout(err) => write!(f, "layout failed: {}", err),
        }
    }
}

impl std::error::Error for UiError {}

impl From<taffy::TaffyError> for UiError {
    fn from(err: taffy::TaffyError) -> Self {
        UiError::Layout(err.to_string())
    }
}

/// Result type for widget tree operations.
pub type UiResult<T> = Result<T, UiError>;
