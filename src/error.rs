use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Layout overflow: {0}")]
    LayoutOverflow(String),

    #[error("Degenerate transform: {0}")]
    TransformDegenerate(String),

    #[error("Font error: {0}")]
    FontError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Augmentation error: {0}")]
    AugmentationError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`ReceiptError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl ReceiptError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create an invalid-configuration error.
    config => InvalidConfiguration,
    /// Create a layout overflow error.
    layout_overflow => LayoutOverflow,
    /// Create a degenerate-transform error.
    transform_degenerate => TransformDegenerate,
    /// Create a font error.
    font => FontError,
    /// Create a render error.
    render => RenderError,
    /// Create an augmentation error.
    augmentation => AugmentationError,
    /// Create an export error.
    export => ExportError,
}

impl ReceiptError {
    /// Short machine-readable kind, used in batch summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::LayoutOverflow(_) => "layout_overflow",
            Self::TransformDegenerate(_) => "transform_degenerate",
            Self::FontError(_) => "font",
            Self::RenderError(_) => "render",
            Self::AugmentationError(_) => "augmentation",
            Self::ExportError(_) => "export",
            Self::IoError(_) => "io",
        }
    }
}

impl From<serde_json::Error> for ReceiptError {
    fn from(e: serde_json::Error) -> Self {
        Self::ExportError(e.to_string())
    }
}

impl From<serde_yml::Error> for ReceiptError {
    fn from(e: serde_yml::Error) -> Self {
        Self::InvalidConfiguration(e.to_string())
    }
}

impl From<image::ImageError> for ReceiptError {
    fn from(e: image::ImageError) -> Self {
        Self::ExportError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReceiptError>;
