//! Panel updates, clearing and refresh on a headless backend.

use mosaic::prelude::*;
use mosaic::{BackendError, UpdateError};
use mosaic_harness::{HeadlessBackend, changed_region};

fn overlay(preset: LayoutPreset) -> Overlay<HeadlessBackend> {
    Overlay::new(preset, HeadlessBackend::new(), OverlayConfig::default()).unwrap()
}

#[test]
fn six_panel_rgb_update_leaves_map_placeholder() {
    let mut overlay = overlay(LayoutPreset::six_panel());
    assert_eq!(overlay.canvas().size(), (768, 768));

    overlay.update_rgb(&PanelImage::gray(512, 512, 0)).unwrap();

    let canvas = overlay.canvas();
    assert!(canvas.region_is_uniform(Rect::square(0, 0, 512), Rgb::gray(0)).unwrap());
    assert!(canvas.region_is_uniform(Rect::square(512, 0, 256), Rgb::gray(120)).unwrap());
}

#[test]
fn every_update_touches_only_its_panel() {
    for kind in PresetKind::ALL {
        let preset = kind.preset();
        for panel in preset.panels().to_vec() {
            let mut overlay = overlay(preset.clone());
            let before = overlay.canvas().clone();
            let (w, h) = panel.size();
            let image = PanelImage::filled(w, h, Rgb::new(1, 2, 3));
            let region = overlay.update(panel.modality, &image).unwrap();

            assert_eq!(region, panel.rect, "{kind}/{}", panel.modality);
            assert_eq!(changed_region(&before, overlay.canvas()), Some(panel.rect));
        }
    }
}

#[test]
fn named_update_methods_target_their_modality() {
    let mut six = overlay(LayoutPreset::six_panel());
    let small = PanelImage::gray(256, 256, 7);
    six.update_map(&small).unwrap();
    six.update_physics(&small).unwrap();
    six.update_depth(&small).unwrap();
    six.update_normal(&small).unwrap();
    six.update_sem(&small).unwrap();
    assert!(six.canvas().region_is_uniform(Rect::new(0, 512, 768, 256), Rgb::gray(7)).unwrap());
    assert!(six.canvas().region_is_uniform(Rect::new(512, 0, 256, 512), Rgb::gray(7)).unwrap());

    let mut four = overlay(LayoutPreset::four_panel());
    four.update_unfilled(&small).unwrap();
    assert_eq!(four.canvas().get(300, 300), Some(Rgb::gray(7)));
}

#[test]
fn oversized_update_fails_without_touching_neighbours() {
    let mut overlay = overlay(LayoutPreset::six_panel());
    let before = overlay.canvas().clone();

    let err = overlay.update_rgb(&PanelImage::gray(600, 600, 0)).unwrap_err();
    assert!(matches!(
        err,
        Error::Update(UpdateError::SizeMismatch {
            modality: Modality::Rgb,
            actual_width: 600,
            ..
        })
    ));
    assert_eq!(err.degradation(), DegradationAction::SkipUpdate);
    assert_eq!(overlay.canvas(), &before);
}

#[test]
fn absent_modality_is_rejected() {
    let mut overlay = overlay(LayoutPreset::two_panel());
    let err = overlay.update_map(&PanelImage::gray(256, 256, 0)).unwrap_err();
    assert!(matches!(
        err,
        Error::Update(UpdateError::UnknownModality { modality: Modality::Map, .. })
    ));
}

#[test]
fn raw_canvas_blit_is_bounds_checked() {
    let mut overlay = overlay(LayoutPreset::two_panel());
    let err = overlay
        .canvas_mut()
        .blit(&PanelImage::gray(10, 10, 0), 505, 0)
        .unwrap_err();
    assert_eq!(err.canvas_width, 512);
}

#[test]
fn clear_whitens_presents_and_is_idempotent() {
    let mut overlay = overlay(LayoutPreset::four_panel());
    overlay.clear().unwrap();
    assert!(overlay.canvas().pixels().iter().all(|&px| px == Rgb::WHITE));
    let first = overlay.backend().display.checksums()[0].clone();

    overlay.clear().unwrap();
    assert_eq!(overlay.backend().display.frame_count(), 2);
    assert_eq!(overlay.backend().display.checksums()[1], first);

    overlay.reset_placeholders();
    assert_eq!(overlay.canvas(), &LayoutPreset::four_panel().new_canvas());
}

#[test]
fn refresh_presents_current_canvas() {
    let mut overlay = overlay(LayoutPreset::two_panel());
    overlay.update_physics(&PanelImage::gray(256, 256, 9)).unwrap();
    let report = overlay.refresh().unwrap();

    assert_eq!(report.frame, 0);
    assert!(!report.recorded);
    assert_eq!(overlay.frame_count(), 1);
    assert_eq!(overlay.backend().display.last_frame(), Some(overlay.canvas()));
}

#[test]
fn disabled_recording_does_not_poll_keys() {
    let keys = mosaic_harness::ScriptedKeys::from_script("rrr");
    let mut overlay = Overlay::new(
        LayoutPreset::two_panel(),
        HeadlessBackend::new().with_keys(keys),
        OverlayConfig::default(),
    )
    .unwrap();
    for _ in 0..3 {
        let report = overlay.refresh().unwrap();
        assert_eq!(report.command, None);
    }
    assert_eq!(overlay.backend().keys.polls(), 0);
    assert!(!overlay.is_recording());
    assert!(matches!(overlay.start_recording(), Err(Error::RecordingDisabled)));
}

#[test]
fn closed_display_requests_shutdown() {
    let mut overlay = overlay(LayoutPreset::two_panel());
    overlay.backend_mut().display.close();
    let err = overlay.refresh().unwrap_err();
    assert!(matches!(err, Error::Backend(BackendError::Closed)));
    assert!(!err.is_recoverable());
}

#[test]
fn present_failure_skips_one_frame() {
    let mut overlay = overlay(LayoutPreset::two_panel());
    overlay.backend_mut().display.fail_next_present();
    let err = overlay.refresh().unwrap_err();
    assert_eq!(err.degradation(), DegradationAction::SkipFrame);
    overlay.refresh().unwrap();
    assert_eq!(overlay.backend().display.frame_count(), 1);
}

#[test]
fn from_config_uses_selected_preset() {
    let config = OverlayConfig::default().with_preset(PresetKind::Four);
    let overlay = Overlay::from_config(HeadlessBackend::new(), config).unwrap();
    assert_eq!(overlay.preset().name(), "four");
    assert_eq!(overlay.canvas().size(), (512, 512));
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = OverlayConfig::default().with_poll_timeout_ms(60_000);
    let err = Overlay::new(LayoutPreset::two_panel(), HeadlessBackend::new(), config).unwrap_err();
    assert_eq!(err.degradation(), DegradationAction::Shutdown);
}
