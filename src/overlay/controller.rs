//! The keyboard overlay controller.
//!
//! Owns the loaded document, the layout registry, the key table and the
//! interaction mode. Event handlers receive the controller by reference.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::bridge::{HostBridge, HostCommand};
use crate::chrome::{ChromeState, PageChrome};
use crate::config::KeyboardConfig;
use crate::error::OverlayError;
use crate::overlay::indicator::{self, EffectMode, Indicator};
use crate::overlay::locator::{KeyHandle, KeyId, KeyTable};
use crate::overlay::mode::InteractionMode;
use crate::overlay::registry::LayoutRegistry;
use crate::overlay::style;
use crate::svg::SvgDocument;

/// Progress of the one-time document load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// Nothing requested yet
    Pending,
    /// Fetch in flight; interaction is not possible
    Loading,
    /// Document mounted and initialised
    Ready,
}

/// What a key click ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Key painted with the picker colour and `set-key` sent
    Painted {
        /// Colour applied
        color: String,
    },
    /// Key reset and `clear-key` sent
    Cleared,
    /// Key colour copied into the picker; mode is back to `set`
    Sampled {
        /// Colour read from the key, if it had one
        color: Option<String>,
    },
    /// No such key in the active layout, or the key is disabled
    Ignored,
}

/// Serializable view of the overlay for the command line and the web view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlaySnapshot {
    /// Container element id the diagram is mounted in
    pub container_id: String,
    /// Load progress
    pub load_state: LoadState,
    /// Layout ids in document order
    pub layouts: Vec<String>,
    /// Visible layout, if any
    pub active_layout: Option<String>,
    /// Current interaction mode
    pub mode: InteractionMode,
    /// Mode indicator text shown by the page
    pub mode_text: String,
    /// Cursor class shown by the page
    pub cursor_class: String,
    /// Picker swatch colour
    pub picker_color: String,
}

/// Controller for an interactive keyboard diagram.
///
/// # Lifecycle
///
/// 1. [`KeyboardOverlay::new`] - nothing loaded; every document operation
///    returns [`OverlayError::NotLoaded`].
/// 2. [`KeyboardOverlay::load`], or [`KeyboardOverlay::begin_load`] followed
///    by [`KeyboardOverlay::complete_load`] when the caller fetches the SVG
///    itself.
/// 3. Ready: layout switches, key clicks and indicator updates.
///
/// The load happens once; later loads are rejected.
pub struct KeyboardOverlay<B: HostBridge, C: PageChrome = ChromeState> {
    container_id: String,
    svg_path: Option<PathBuf>,
    default_layout: String,
    load_state: LoadState,
    document: Option<SvgDocument>,
    registry: LayoutRegistry,
    keys: KeyTable,
    mode: InteractionMode,
    disabled: HashSet<(String, String)>,
    bridge: B,
    chrome: C,
}

impl<B: HostBridge, C: PageChrome> KeyboardOverlay<B, C> {
    /// Creates an unloaded overlay and shows the initial `set` mode.
    pub fn new(config: &KeyboardConfig, bridge: B, mut chrome: C) -> Self {
        let mode = InteractionMode::default();
        chrome.show_mode(mode);
        Self {
            container_id: config.container_id.clone(),
            svg_path: config.svg_path.clone(),
            default_layout: config.default_layout.clone(),
            load_state: LoadState::Pending,
            document: None,
            registry: LayoutRegistry::new(),
            keys: KeyTable::default(),
            mode,
            disabled: HashSet::new(),
            bridge,
            chrome,
        }
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Reads the configured SVG from disk and mounts it.
    pub fn load(&mut self) -> Result<(), OverlayError> {
        let path = self.svg_path.clone().ok_or(OverlayError::NoDocumentPath)?;
        self.load_from(&path)
    }

    /// Reads the SVG at `path` and mounts it.
    pub fn load_from(&mut self, path: &Path) -> Result<(), OverlayError> {
        self.begin_load()?;
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                self.load_state = LoadState::Pending;
                error!(path = %path.display(), error = %e, "Failed to read keyboard SVG");
                return Err(OverlayError::Io(format!("{}: {e}", path.display())));
            }
        };
        self.svg_path = Some(path.to_path_buf());
        self.complete_load(&text)
    }

    /// Marks the load as in flight.
    pub fn begin_load(&mut self) -> Result<(), OverlayError> {
        match self.load_state {
            LoadState::Pending => {
                debug!(container = %self.container_id, "Loading keyboard SVG");
                self.load_state = LoadState::Loading;
                Ok(())
            }
            LoadState::Loading | LoadState::Ready => {
                warn!("Keyboard SVG load requested twice");
                Err(OverlayError::AlreadyLoaded)
            }
        }
    }

    /// Mounts fetched SVG text and runs the initial setup.
    ///
    /// On a parse error the overlay returns to `Pending` so the load can be
    /// attempted again.
    pub fn complete_load(&mut self, svg: &str) -> Result<(), OverlayError> {
        if self.load_state == LoadState::Ready {
            warn!("Keyboard SVG already mounted, ignoring second load");
            return Err(OverlayError::AlreadyLoaded);
        }
        let document = match SvgDocument::parse(svg) {
            Ok(document) => document,
            Err(e) => {
                self.load_state = LoadState::Pending;
                error!(error = %e, "Failed to parse keyboard SVG");
                return Err(e);
            }
        };
        self.document = Some(document);
        self.load_state = LoadState::Ready;
        self.reinitialize()?;
        info!(
            layouts = self.registry.len(),
            active = self.registry.active_id().unwrap_or("<none>"),
            "Keyboard SVG loaded"
        );
        Ok(())
    }

    /// Current load progress.
    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// True once the document is mounted.
    pub fn is_loaded(&self) -> bool {
        self.load_state == LoadState::Ready
    }

    // ------------------------------------------------------------------
    // Layouts
    // ------------------------------------------------------------------

    /// Re-scans layouts, clears every key in the active layout and resets the
    /// effect background. Running it twice changes nothing further.
    pub fn reinitialize(&mut self) -> Result<(), OverlayError> {
        let Some(document) = self.document.as_mut() else {
            return Err(not_loaded("reinitialize"));
        };
        self.registry = LayoutRegistry::scan(document);
        self.keys = KeyTable::build(document, &self.registry);
        clear_layout_keys(document, &self.keys, self.registry.active_id());
        indicator::set_effect_background(document, EffectMode::None);
        Ok(())
    }

    /// Layout ids in document order.
    pub fn available_layouts(&self) -> Vec<String> {
        self.registry.ids().into_iter().map(str::to_string).collect()
    }

    /// The visible layout.
    pub fn active_layout(&self) -> Option<&str> {
        self.registry.active_id()
    }

    /// Number of keys indexed for `layout`.
    pub fn key_count(&self, layout: &str) -> usize {
        self.keys.key_count(layout)
    }

    /// Shows layout `id` and hides every other one.
    ///
    /// An unknown id switches to the configured default layout instead (or
    /// the first layout when the default is unknown too) and returns
    /// [`OverlayError::UnknownLayout`] after the fallback is shown.
    pub fn switch_to(&mut self, id: &str) -> Result<(), OverlayError> {
        let Some(document) = self.document.as_mut() else {
            return Err(not_loaded("switch_to"));
        };
        if self.registry.is_empty() {
            error!(requested = id, "Cannot switch layout, document has no layouts");
            return Err(OverlayError::NoLayouts);
        }

        let mut failure = None;
        let target = if self.registry.contains(id) {
            id.to_string()
        } else {
            let fallback = if self.registry.contains(&self.default_layout) {
                self.default_layout.clone()
            } else {
                self.registry.groups()[0].id.clone()
            };
            error!(
                requested = id,
                fallback = %fallback,
                "Layout does not exist, using fallback"
            );
            failure = Some(OverlayError::UnknownLayout {
                requested: id.to_string(),
                fallback: fallback.clone(),
            });
            fallback
        };

        for group in self.registry.groups() {
            document.set_visible(group.node, group.id == target);
        }
        self.reinitialize()?;
        info!(layout = %target, "Switched keyboard layout");

        failure.map_or(Ok(()), Err)
    }

    // ------------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------------

    /// Finds key `(row, col)` in the active layout.
    pub fn locate(&self, row: u16, col: u16) -> Option<&KeyHandle> {
        self.keys.locate(self.registry.active_id()?, KeyId::new(row, col))
    }

    /// Finds a key by element id in the active layout.
    pub fn locate_by_id(&self, id: &str) -> Option<&KeyHandle> {
        self.keys.locate_by_id(self.registry.active_id()?, id)
    }

    /// Paints key `(row, col)`. Returns `false` if the key is not in the active layout.
    pub fn paint_key(&mut self, row: u16, col: u16, color: &str) -> Result<bool, OverlayError> {
        self.with_key(&KeyId::new(row, col).element_id(), |document, key| {
            style::paint(document, key, color);
        })
    }

    /// Resets key `(row, col)` to neutral gray.
    pub fn clear_key(&mut self, row: u16, col: u16) -> Result<bool, OverlayError> {
        self.with_key(&KeyId::new(row, col).element_id(), style::clear)
    }

    /// Reads the colour of key `(row, col)` (stroke of its first shape).
    pub fn key_color(&self, row: u16, col: u16) -> Option<String> {
        self.key_color_by_id(&KeyId::new(row, col).element_id())
    }

    /// Reads the colour of the key with element id `id`.
    pub fn key_color_by_id(&self, id: &str) -> Option<String> {
        let document = self.document.as_ref()?;
        style::read_color(document, self.locate_by_id(id)?)
    }

    /// Resets every key in the active layout to neutral gray.
    pub fn clear_all_keys(&mut self) -> Result<(), OverlayError> {
        let Some(document) = self.document.as_mut() else {
            return Err(not_loaded("clear_all_keys"));
        };
        let layout = self.registry.require_active()?;
        clear_layout_keys(document, &self.keys, Some(layout));
        Ok(())
    }

    /// Makes key `(row, col)` clickable again.
    pub fn enable_key(&mut self, row: u16, col: u16) -> Result<bool, OverlayError> {
        let id = KeyId::new(row, col).element_id();
        let found = self.with_key(&id, |document, handle| {
            if let Some(element) = document.element_mut(handle.element) {
                element.set_attribute("onclick", format!("key(this,{row},{col})"));
            }
        })?;
        if let (true, Some(layout)) = (found, self.registry.active_id()) {
            self.disabled.remove(&(layout.to_string(), id));
        }
        Ok(found)
    }

    /// Stops key `(row, col)` from reacting to clicks in the active layout.
    pub fn disable_key(&mut self, row: u16, col: u16) -> Result<bool, OverlayError> {
        let id = KeyId::new(row, col).element_id();
        let found = self.with_key(&id, |document, handle| {
            if let Some(element) = document.element_mut(handle.element) {
                element.remove_attribute("onclick");
            }
        })?;
        if let (true, Some(layout)) = (found, self.registry.active_id()) {
            self.disabled.insert((layout.to_string(), id));
        }
        Ok(found)
    }

    /// Whether key `(row, col)` reacts to clicks in the active layout.
    pub fn is_key_enabled(&self, row: u16, col: u16) -> bool {
        self.is_enabled_by_id(&KeyId::new(row, col).element_id())
    }

    fn is_enabled_by_id(&self, id: &str) -> bool {
        match self.registry.active_id() {
            Some(layout) => !self
                .disabled
                .contains(&(layout.to_string(), id.to_string())),
            None => false,
        }
    }

    fn with_key(
        &mut self,
        id: &str,
        apply: impl FnOnce(&mut SvgDocument, &KeyHandle),
    ) -> Result<bool, OverlayError> {
        let Some(document) = self.document.as_mut() else {
            return Err(not_loaded("key update"));
        };
        let handle = self
            .registry
            .active_id()
            .and_then(|layout| self.keys.locate_by_id(layout, id));
        match handle {
            Some(handle) => {
                apply(document, handle);
                Ok(true)
            }
            None => {
                debug!(key = id, "Key not present in active layout");
                Ok(false)
            }
        }
    }

    // ------------------------------------------------------------------
    // Indicators and effects
    // ------------------------------------------------------------------

    /// Shows or hides an LED. Returns `false` if the document lacks it.
    pub fn set_indicator(&mut self, indicator: Indicator, enabled: bool) -> Result<bool, OverlayError> {
        let Some(document) = self.document.as_mut() else {
            return Err(not_loaded("set_indicator"));
        };
        Ok(indicator::set_indicator(document, indicator, enabled))
    }

    /// Whether an LED is shown; `None` if not loaded or not in the document.
    pub fn indicator_state(&self, indicator: Indicator) -> Option<bool> {
        indicator::indicator_state(self.document.as_ref()?, indicator)
    }

    /// Paints the effect background for `mode`.
    pub fn set_effect_background(&mut self, mode: EffectMode) -> Result<(), OverlayError> {
        let Some(document) = self.document.as_mut() else {
            return Err(not_loaded("set_effect_background"));
        };
        indicator::set_effect_background(document, mode);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Interaction mode
    // ------------------------------------------------------------------

    /// Current interaction mode.
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Switches the interaction mode and updates the mode indicator.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        debug!(%mode, "Interaction mode changed");
        self.mode = mode;
        self.chrome.show_mode(mode);
    }

    /// Switches mode by name. Unknown names leave the mode unchanged.
    pub fn request_mode(&mut self, name: &str) -> Result<InteractionMode, OverlayError> {
        match name.parse::<InteractionMode>() {
            Ok(mode) => {
                self.set_mode(mode);
                Ok(mode)
            }
            Err(e) => {
                warn!(mode = name, "Ignoring unknown interaction mode");
                Err(e)
            }
        }
    }

    /// Handles a click on key `(row, col)` according to the current mode.
    ///
    /// Fails with [`OverlayError::MissingActiveLayout`] when no layout is
    /// shown; a click on a key the active layout lacks is ignored.
    pub fn on_key_click(&mut self, row: u16, col: u16) -> Result<ClickOutcome, OverlayError> {
        self.require_clickable("key click")?;
        let key = KeyId::new(row, col);
        self.dispatch_click(&key.element_id(), key)
    }

    /// Handles a click on the key element with id `id`.
    ///
    /// The matrix address for the host command comes from the id when it
    /// has the `key<row>-<col>` form, otherwise from the element's
    /// `key(this,row,col)` click handler.
    pub fn on_key_click_by_id(&mut self, id: &str) -> Result<ClickOutcome, OverlayError> {
        self.require_clickable("key click")?;
        let id = id.trim_start_matches('#');
        let Some(handle) = self.locate_by_id(id) else {
            debug!(id, "Click on element that is not a key ignored");
            return Ok(ClickOutcome::Ignored);
        };
        let Some(key) = handle.address else {
            debug!(id, "Click on key without a matrix address ignored");
            return Ok(ClickOutcome::Ignored);
        };
        self.dispatch_click(id, key)
    }

    fn require_clickable(&self, operation: &str) -> Result<(), OverlayError> {
        if self.document.is_none() {
            return Err(not_loaded(operation));
        }
        self.registry.require_active().map(|_| ()).inspect_err(|_| {
            warn!(operation, "No active keyboard layout");
        })
    }

    fn dispatch_click(&mut self, id: &str, key: KeyId) -> Result<ClickOutcome, OverlayError> {
        if self.locate_by_id(id).is_none() || !self.is_enabled_by_id(id) {
            debug!(key = id, "Click on missing or disabled key ignored");
            return Ok(ClickOutcome::Ignored);
        }

        let KeyId { row, col } = key;
        let outcome = match self.mode {
            InteractionMode::Set => {
                let color = self.chrome.picker_color();
                self.with_key(id, |document, handle| style::paint(document, handle, &color))?;
                self.bridge.send(HostCommand::SetKey {
                    row,
                    col,
                    color: color.clone(),
                });
                ClickOutcome::Painted { color }
            }
            InteractionMode::Clear => {
                self.with_key(id, style::clear)?;
                self.bridge.send(HostCommand::ClearKey { row, col });
                ClickOutcome::Cleared
            }
            InteractionMode::Picker => {
                let color = self.key_color_by_id(id);
                if let Some(color) = &color {
                    self.chrome.set_picker_color(color);
                }
                self.set_mode(InteractionMode::Set);
                ClickOutcome::Sampled { color }
            }
        };
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The mounted document.
    pub fn document(&self) -> Option<&SvgDocument> {
        self.document.as_ref()
    }

    /// The current diagram as SVG text.
    pub fn render_svg(&self) -> Result<String, OverlayError> {
        self.document
            .as_ref()
            .map(SvgDocument::to_svg_string)
            .ok_or(OverlayError::NotLoaded)
    }

    /// Id of the page element hosting the diagram.
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// The host bridge.
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Mutable access to the host bridge (for forwarding chrome commands).
    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    /// The page chrome.
    pub fn chrome(&self) -> &C {
        &self.chrome
    }

    /// Mutable access to the page chrome.
    pub fn chrome_mut(&mut self) -> &mut C {
        &mut self.chrome
    }
}

impl<B: HostBridge> KeyboardOverlay<B, ChromeState> {
    /// Snapshot of the overlay and its in-memory chrome.
    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            container_id: self.container_id.clone(),
            load_state: self.load_state,
            layouts: self.available_layouts(),
            active_layout: self.active_layout().map(str::to_string),
            mode: self.mode,
            mode_text: self.chrome.mode_text.clone(),
            cursor_class: self.chrome.cursor_class.clone(),
            picker_color: self.chrome.picker_color.clone(),
        }
    }
}

fn clear_layout_keys(document: &mut SvgDocument, keys: &KeyTable, layout: Option<&str>) {
    let Some(layout) = layout else {
        return;
    };
    for (_, handle) in keys.keys(layout) {
        style::clear(document, handle);
    }
}

fn not_loaded(operation: &str) -> OverlayError {
    warn!(operation, "Keyboard SVG not loaded yet, ignoring");
    OverlayError::NotLoaded
}
