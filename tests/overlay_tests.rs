//! Integration tests for the keyboard overlay controller.

use chroma_overlay::config::KeyboardConfig;
use chroma_overlay::overlay::{ClickOutcome, Indicator, InteractionMode, LoadState};
use chroma_overlay::svg::SvgDocument;
use chroma_overlay::{ChromeState, HostCommand, KeyboardOverlay, MemoryBridge, OverlayError};

mod fixtures;
use fixtures::*;

/// Loads [`KEYBOARD_SVG`] into a fresh overlay.
fn loaded_overlay() -> KeyboardOverlay<MemoryBridge> {
    overlay_for(KEYBOARD_SVG)
}

fn overlay_for(svg: &str) -> KeyboardOverlay<MemoryBridge> {
    let mut overlay = KeyboardOverlay::new(
        &KeyboardConfig::default(),
        MemoryBridge::new(),
        ChromeState::default(),
    );
    overlay.begin_load().expect("Failed to begin load");
    overlay.complete_load(svg).expect("Failed to load fixture");
    overlay
}

/// Visible layout groups, read back from the rendered SVG.
fn visible_layouts(overlay: &KeyboardOverlay<MemoryBridge>) -> Vec<String> {
    let doc = SvgDocument::parse(&overlay.render_svg().unwrap()).unwrap();
    doc.elements()
        .filter_map(|(_, element)| {
            (element.has_class("kblayout") && !element.is_hidden())
                .then(|| element.id().unwrap_or_default().to_string())
        })
        .collect()
}

/// The `onclick` handler of key `(row, col)` in the active layout.
fn onclick(overlay: &KeyboardOverlay<MemoryBridge>, row: u16, col: u16) -> Option<String> {
    let handle = overlay.locate(row, col)?;
    let element = overlay.document()?.element(handle.element)?;
    element.attribute("onclick").map(str::to_string)
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_from_disk_initialises_diagram() {
    let (_temp_dir, path) = write_keyboard_svg();
    let mut overlay = KeyboardOverlay::new(
        &KeyboardConfig::default(),
        MemoryBridge::new(),
        ChromeState::default(),
    );
    assert_eq!(overlay.load_state(), LoadState::Pending);

    overlay.load_from(&path).unwrap();

    assert_eq!(overlay.load_state(), LoadState::Ready);
    assert_eq!(overlay.available_layouts(), vec!["kb-gb", "kb-us"]);
    assert_eq!(overlay.active_layout(), Some("kb-gb"));
    // Initial setup resets every active key to neutral gray
    assert_eq!(overlay.key_color(3, 5), Some("#777777".to_string()));
    assert_eq!(overlay.key_color(0, 0), Some("#777777".to_string()));
}

#[test]
fn test_load_with_configured_path() {
    let (_temp_dir, path) = write_keyboard_svg();
    let config = KeyboardConfig {
        svg_path: Some(path),
        ..KeyboardConfig::default()
    };
    let mut overlay = KeyboardOverlay::new(&config, MemoryBridge::new(), ChromeState::default());
    overlay.load().unwrap();
    assert!(overlay.is_loaded());
}

#[test]
fn test_load_without_path_fails() {
    let mut overlay = KeyboardOverlay::new(
        &KeyboardConfig::default(),
        MemoryBridge::new(),
        ChromeState::default(),
    );
    assert_eq!(overlay.load(), Err(OverlayError::NoDocumentPath));
    assert_eq!(overlay.load_state(), LoadState::Pending);
}

#[test]
fn test_missing_file_allows_retry() {
    let (temp_dir, _path) = write_keyboard_svg();
    let mut overlay = KeyboardOverlay::new(
        &KeyboardConfig::default(),
        MemoryBridge::new(),
        ChromeState::default(),
    );
    let result = overlay.load_from(&temp_dir.path().join("missing.svg"));
    assert!(matches!(result, Err(OverlayError::Io(_))));
    assert_eq!(overlay.load_state(), LoadState::Pending);

    overlay.load_from(&temp_dir.path().join("keyboard.svg")).unwrap();
    assert!(overlay.is_loaded());
}

#[test]
fn test_second_load_is_rejected() {
    let mut overlay = loaded_overlay();
    assert_eq!(overlay.begin_load(), Err(OverlayError::AlreadyLoaded));
    assert_eq!(
        overlay.complete_load(KEYBOARD_SVG),
        Err(OverlayError::AlreadyLoaded)
    );
}

#[test]
fn test_operations_before_load_report_not_loaded() {
    let mut overlay = KeyboardOverlay::new(
        &KeyboardConfig::default(),
        MemoryBridge::new(),
        ChromeState::default(),
    );
    assert_eq!(overlay.switch_to("kb-us"), Err(OverlayError::NotLoaded));
    assert_eq!(overlay.on_key_click(0, 0), Err(OverlayError::NotLoaded));
    assert_eq!(
        overlay.set_indicator(Indicator::CapsLock, true),
        Err(OverlayError::NotLoaded)
    );
    assert_eq!(overlay.render_svg(), Err(OverlayError::NotLoaded));
    assert!(overlay.locate(0, 0).is_none());
    assert!(overlay.bridge().sent().is_empty());
}

// ============================================================================
// Layout switching
// ============================================================================

#[test]
fn test_switch_shows_exactly_one_layout() {
    let mut overlay = loaded_overlay();
    for id in ["kb-us", "kb-gb", "kb-us", "kb-de"] {
        let _ = overlay.switch_to(id);
        assert_eq!(visible_layouts(&overlay).len(), 1, "after switching to {id}");
    }
}

#[test]
fn test_switch_to_us_resets_keys() {
    let mut overlay = loaded_overlay();
    overlay.switch_to("kb-us").unwrap();

    assert_eq!(overlay.active_layout(), Some("kb-us"));
    assert_eq!(visible_layouts(&overlay), vec!["kb-us"]);
    assert!(overlay.locate(2, 4).is_some());
    assert!(overlay.locate(3, 5).is_none());
    assert_eq!(overlay.key_color(2, 4), Some("#777777".to_string()));
    assert_eq!(overlay.key_color(0, 0), Some("#777777".to_string()));
}

#[test]
fn test_switch_to_unknown_layout_falls_back() {
    let mut overlay = loaded_overlay();
    overlay.switch_to("kb-us").unwrap();

    let result = overlay.switch_to("kb-de");

    assert_eq!(
        result,
        Err(OverlayError::UnknownLayout {
            requested: "kb-de".to_string(),
            fallback: "kb-gb".to_string(),
        })
    );
    assert_eq!(overlay.active_layout(), Some("kb-gb"));
    assert_eq!(visible_layouts(&overlay), vec!["kb-gb"]);
}

#[test]
fn test_unknown_default_falls_back_to_first_layout() {
    let config = KeyboardConfig {
        default_layout: "kb-fr".to_string(),
        ..KeyboardConfig::default()
    };
    let mut overlay = KeyboardOverlay::new(&config, MemoryBridge::new(), ChromeState::default());
    overlay.begin_load().unwrap();
    overlay.complete_load(KEYBOARD_SVG).unwrap();
    overlay.switch_to("kb-us").unwrap();

    let result = overlay.switch_to("kb-de");
    assert!(matches!(
        result,
        Err(OverlayError::UnknownLayout { ref fallback, .. }) if fallback == "kb-gb"
    ));
}

#[test]
fn test_document_without_layouts() {
    let mut overlay = overlay_for(NO_LAYOUT_SVG);
    assert!(overlay.available_layouts().is_empty());
    assert_eq!(overlay.active_layout(), None);
    assert_eq!(overlay.switch_to("kb-gb"), Err(OverlayError::NoLayouts));
    assert_eq!(
        overlay.on_key_click(0, 0),
        Err(OverlayError::MissingActiveLayout)
    );
    assert_eq!(
        overlay.on_key_click_by_id("key0-0"),
        Err(OverlayError::MissingActiveLayout)
    );
    assert_eq!(overlay.clear_all_keys(), Err(OverlayError::MissingActiveLayout));
    assert!(overlay.bridge().sent().is_empty());
}

#[test]
fn test_all_layouts_hidden_has_no_active_layout() {
    let mut overlay = overlay_for(HIDDEN_LAYOUTS_SVG);
    assert_eq!(overlay.active_layout(), None);
    assert!(overlay.locate(0, 0).is_none());
    assert_eq!(
        overlay.on_key_click(0, 0),
        Err(OverlayError::MissingActiveLayout)
    );

    overlay.switch_to("kb-us").unwrap();
    assert_eq!(overlay.active_layout(), Some("kb-us"));
}

#[test]
fn test_reinitialize_is_idempotent() {
    let mut overlay = loaded_overlay();
    overlay.paint_key(0, 1, "#abcdef").unwrap();

    overlay.reinitialize().unwrap();
    let once = overlay.render_svg().unwrap();
    overlay.reinitialize().unwrap();
    let twice = overlay.render_svg().unwrap();

    assert_eq!(once, twice);
    assert_eq!(overlay.key_color(0, 1), Some("#777777".to_string()));
}

#[test]
fn test_effect_background_reset_on_load() {
    let overlay = loaded_overlay();
    let doc = SvgDocument::parse(&overlay.render_svg().unwrap()).unwrap();
    let layer = doc.element_by_id("effect-layer").unwrap();
    let rects = doc.descendants_named(layer, &["rect"]);
    assert_eq!(rects.len(), 2);
    for rect in rects {
        assert_eq!(
            doc.element(rect).unwrap().presentation("fill"),
            Some("#222222".to_string())
        );
    }
}

// ============================================================================
// Key colours
// ============================================================================

#[test]
fn test_paint_then_read_for_every_active_key() {
    let mut overlay = loaded_overlay();
    for (row, col) in [(0, 0), (0, 1), (3, 5)] {
        assert!(overlay.paint_key(row, col, "rgb(1, 2, 3)").unwrap());
        assert_eq!(overlay.key_color(row, col), Some("rgb(1, 2, 3)".to_string()));
        assert!(overlay.clear_key(row, col).unwrap());
        assert_eq!(overlay.key_color(row, col), Some("#777777".to_string()));
    }
}

#[test]
fn test_missing_key_is_not_an_error() {
    let mut overlay = loaded_overlay();
    assert_eq!(overlay.paint_key(9, 9, "#ffffff"), Ok(false));
    assert_eq!(overlay.clear_key(2, 4), Ok(false));
    assert_eq!(overlay.key_color(9, 9), None);
}

#[test]
fn test_clear_all_keys() {
    let mut overlay = loaded_overlay();
    overlay.paint_key(0, 0, "#ff0000").unwrap();
    overlay.paint_key(3, 5, "#00ff00").unwrap();
    overlay.clear_all_keys().unwrap();
    assert_eq!(overlay.key_color(0, 0), Some("#777777".to_string()));
    assert_eq!(overlay.key_color(3, 5), Some("#777777".to_string()));
}

// ============================================================================
// Key clicks
// ============================================================================

#[test]
fn test_set_click_paints_and_sends_command() {
    let mut overlay = loaded_overlay();
    overlay.chrome_mut().picker_color = "#ff0000".to_string();

    let outcome = overlay.on_key_click(3, 5).unwrap();

    assert_eq!(
        outcome,
        ClickOutcome::Painted {
            color: "#ff0000".to_string()
        }
    );
    let handle = overlay.locate(3, 5).unwrap().clone();
    let doc = overlay.document().unwrap();
    for label in &handle.labels {
        assert_eq!(
            doc.element(*label).unwrap().presentation("fill"),
            Some("#ff0000".to_string())
        );
    }
    assert_eq!(overlay.key_color(3, 5), Some("#ff0000".to_string()));
    let sent: Vec<String> = overlay.bridge().sent().iter().map(ToString::to_string).collect();
    assert_eq!(sent, vec!["set-key?3?5?#ff0000"]);
}

#[test]
fn test_picker_click_samples_without_command() {
    let mut overlay = loaded_overlay();
    overlay.paint_key(0, 1, "#00ff00").unwrap();
    overlay.chrome_mut().picker_color = "#123456".to_string();
    overlay.set_mode(InteractionMode::Picker);

    let outcome = overlay.on_key_click(0, 1).unwrap();

    assert_eq!(
        outcome,
        ClickOutcome::Sampled {
            color: Some("#00ff00".to_string())
        }
    );
    assert_eq!(overlay.chrome().picker_color, "#00ff00");
    assert_eq!(overlay.mode(), InteractionMode::Set);
    assert_eq!(
        overlay.chrome().mode_text,
        "Set - Click on a key to assign a colour here."
    );
    assert!(overlay.bridge().sent().is_empty());
}

#[test]
fn test_clear_click_sends_clear_key() {
    let mut overlay = loaded_overlay();
    overlay.paint_key(0, 0, "#ff0000").unwrap();
    overlay.request_mode("clear").unwrap();

    assert_eq!(overlay.on_key_click(0, 0), Ok(ClickOutcome::Cleared));
    assert_eq!(overlay.key_color(0, 0), Some("#777777".to_string()));
    assert_eq!(
        overlay.bridge().sent(),
        &[HostCommand::ClearKey { row: 0, col: 0 }]
    );
    // Clear mode persists across clicks
    assert_eq!(overlay.mode(), InteractionMode::Clear);
}

#[test]
fn test_click_by_element_id() {
    let mut overlay = loaded_overlay();
    let outcome = overlay.on_key_click_by_id("key0-1").unwrap();
    assert!(matches!(outcome, ClickOutcome::Painted { .. }));
    assert_eq!(overlay.on_key_click_by_id("caps-lock"), Ok(ClickOutcome::Ignored));
}

#[test]
fn test_every_locatable_key_is_clickable_by_id() {
    let mut overlay = overlay_for(WIDE_MATRIX_SVG);
    overlay.chrome_mut().picker_color = "#ff0000".to_string();

    for id in ["key0-300", "enter"] {
        assert!(overlay.locate_by_id(id).is_some(), "{id} not located");
        assert_eq!(
            overlay.on_key_click_by_id(id),
            Ok(ClickOutcome::Painted {
                color: "#ff0000".to_string()
            }),
            "{id}"
        );
        assert_eq!(overlay.key_color_by_id(id), Some("#ff0000".to_string()));
    }
    assert_eq!(
        overlay.locate(0, 300).map(|key| key.element),
        overlay.locate_by_id("key0-300").map(|key| key.element)
    );
    assert_eq!(
        overlay.bridge().sent(),
        &[
            HostCommand::SetKey {
                row: 0,
                col: 300,
                color: "#ff0000".to_string()
            },
            HostCommand::SetKey {
                row: 4,
                col: 13,
                color: "#ff0000".to_string()
            },
        ]
    );
    assert_eq!(overlay.bridge().sent()[0].to_string(), "set-key?0?300?#ff0000");

    // Located, but no matrix address to send to the host
    assert!(overlay.locate_by_id("spacer").is_some());
    assert_eq!(overlay.on_key_click_by_id("spacer"), Ok(ClickOutcome::Ignored));
    assert_eq!(overlay.bridge().sent().len(), 2);
}

#[test]
fn test_disabled_key_ignores_clicks() {
    let mut overlay = loaded_overlay();
    assert!(overlay.disable_key(0, 0).unwrap());
    assert!(!overlay.is_key_enabled(0, 0));
    assert_eq!(overlay.on_key_click(0, 0), Ok(ClickOutcome::Ignored));
    assert!(overlay.bridge().sent().is_empty());
    assert_eq!(onclick(&overlay, 0, 0), None);

    assert!(overlay.enable_key(0, 0).unwrap());
    assert!(overlay.is_key_enabled(0, 0));
    assert_eq!(onclick(&overlay, 0, 0).as_deref(), Some("key(this,0,0)"));
    assert!(matches!(
        overlay.on_key_click(0, 0),
        Ok(ClickOutcome::Painted { .. })
    ));
}

// ============================================================================
// Modes and indicators
// ============================================================================

#[test]
fn test_mode_text_follows_mode() {
    let mut overlay = loaded_overlay();
    for from in InteractionMode::ALL {
        for to in InteractionMode::ALL {
            overlay.set_mode(from);
            assert_eq!(overlay.mode(), from);
            assert_eq!(overlay.chrome().mode_text, from.indicator_text());

            overlay.set_mode(to);
            assert_eq!(overlay.mode(), to, "{from:?} -> {to:?}");
            assert_eq!(overlay.chrome().mode_text, to.indicator_text());
            assert_eq!(overlay.chrome().cursor_class, to.cursor_class());
        }
    }
    let last = overlay.mode();
    assert!(overlay.request_mode("paint").is_err());
    assert_eq!(overlay.mode(), last);
}

#[test]
fn test_indicators_toggle() {
    let mut overlay = loaded_overlay();
    assert_eq!(overlay.indicator_state(Indicator::CapsLock), Some(false));
    assert_eq!(overlay.indicator_state(Indicator::NumLock), Some(true));
    assert_eq!(overlay.indicator_state(Indicator::GameMode), None);

    assert!(overlay.set_indicator(Indicator::CapsLock, true).unwrap());
    assert!(overlay.set_indicator(Indicator::NumLock, false).unwrap());
    assert!(!overlay.set_indicator(Indicator::MacroLed, true).unwrap());

    assert_eq!(overlay.indicator_state(Indicator::CapsLock), Some(true));
    assert_eq!(overlay.indicator_state(Indicator::NumLock), Some(false));
}

#[test]
fn test_snapshot_reflects_state() {
    let mut overlay = loaded_overlay();
    overlay.set_mode(InteractionMode::Picker);
    let snapshot = overlay.snapshot();

    assert_eq!(snapshot.container_id, "keyboard-div");
    assert_eq!(snapshot.load_state, LoadState::Ready);
    assert_eq!(snapshot.layouts, vec!["kb-gb", "kb-us"]);
    assert_eq!(snapshot.active_layout.as_deref(), Some("kb-gb"));
    assert_eq!(snapshot.mode, InteractionMode::Picker);
    assert_eq!(snapshot.cursor_class, "cursor-mode-picker");

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["load_state"], "ready");
    assert_eq!(json["mode"], "picker");
}
