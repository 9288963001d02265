//! Error taxonomy for the overlay controller.
//!
//! Every variant is local and non-fatal: callers log it (or hand it back to
//! the web view) and carry on. Keys missing from the active layout are not
//! errors at all, they resolve to `None`.

/// Errors reported by the keyboard overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayError {
    /// The document has no visible keyboard layout.
    MissingActiveLayout,
    /// A switch named a layout the document does not contain.
    ///
    /// The switch has already been applied to `fallback` when this is returned.
    UnknownLayout {
        /// Layout id that was asked for
        requested: String,
        /// Layout id that was shown instead
        fallback: String,
    },
    /// The document contains no keyboard layouts at all.
    NoLayouts,
    /// The SVG has not finished loading yet.
    NotLoaded,
    /// A load was started after the document was already mounted.
    AlreadyLoaded,
    /// No document path was configured for a blocking load.
    NoDocumentPath,
    /// A mode-change request named something other than set, picker or clear.
    UnknownMode(String),
    /// An indicator name outside the known LED set.
    UnknownIndicator(String),
    /// An effect name outside the known effect set.
    UnknownEffect(String),
    /// The SVG text could not be parsed.
    Parse(String),
    /// Reading the SVG from disk failed.
    Io(String),
}

impl std::fmt::Display for OverlayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingActiveLayout => write!(f, "No active keyboard layout found"),
            Self::UnknownLayout {
                requested,
                fallback,
            } => write!(
                f,
                "Layout \"{requested}\" does not exist, using \"{fallback}\""
            ),
            Self::NoLayouts => write!(f, "Document contains no keyboard layouts"),
            Self::NotLoaded => write!(f, "Keyboard document has not finished loading"),
            Self::AlreadyLoaded => write!(f, "Keyboard document is already loaded"),
            Self::NoDocumentPath => write!(f, "No keyboard SVG path configured"),
            Self::UnknownMode(mode) => write!(f, "Unknown interaction mode \"{mode}\""),
            Self::UnknownIndicator(name) => write!(f, "Unknown indicator \"{name}\""),
            Self::UnknownEffect(name) => write!(f, "Unknown effect \"{name}\""),
            Self::Parse(message) => write!(f, "Invalid keyboard SVG: {message}"),
            Self::Io(message) => write!(f, "Failed to read keyboard SVG: {message}"),
        }
    }
}

impl std::error::Error for OverlayError {}
