use hexcrawl::{
    Color, GridConfig, InvalidParameter, LabelConfig, OverlayConfig,
    OverlayRenderer, Point2, RegionConfig,
};
use validator::ValidationErrors;

#[test]
fn test_overlay_config_validation() {
    let config = OverlayConfig {
        grid: GridConfig {
            pixels_per_mile: 0.0,  // invalid
            hex_miles: f64::NAN,   // invalid
            outline: Color::BLACK, // valid
        },
        label: LabelConfig {
            enabled: true,       // valid
            color: Color::BLACK, // valid
            font_size: 0.5,      // invalid
        },
        regions: vec![],
    };

    let err = OverlayRenderer::new(config).unwrap_err();
    let validation_errors = err.downcast::<ValidationErrors>().unwrap();
    let mut error_fields = validation_errors
        .errors()
        .keys()
        .copied()
        .collect::<Vec<&str>>();
    error_fields.sort_unstable();
    assert_eq!(
        error_fields,
        vec!["grid", "label"],
        "incorrect validation errors in {:#?}",
        validation_errors
    );
}

#[test]
fn test_grid_config_validation() {
    let config = OverlayConfig {
        grid: GridConfig {
            hex_miles: f64::INFINITY, // invalid
            ..Default::default()
        },
        ..Default::default()
    };

    let err = OverlayRenderer::new(config).unwrap_err();
    let validation_errors = err.downcast::<ValidationErrors>().unwrap();
    let error_fields = validation_errors
        .errors()
        .keys()
        .copied()
        .collect::<Vec<&str>>();
    assert_eq!(error_fields, vec!["grid"]);
}

#[test]
fn test_label_config_validation() {
    for font_size in &[f64::NAN, f64::INFINITY] {
        let config = OverlayConfig {
            label: LabelConfig {
                font_size: *font_size, // invalid
                ..Default::default()
            },
            ..Default::default()
        };

        let err = OverlayRenderer::new(config).unwrap_err();
        let validation_errors = err.downcast::<ValidationErrors>().unwrap();
        let error_fields = validation_errors
            .errors()
            .keys()
            .copied()
            .collect::<Vec<&str>>();
        assert_eq!(error_fields, vec!["label"], "font size {}", font_size);
    }
}

#[test]
fn test_invalid_region() {
    let config = OverlayConfig {
        regions: vec![RegionConfig {
            points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(f64::INFINITY, 0.0),
                Point2::new(0.0, 10.0),
            ],
            selected: false,
        }],
        ..Default::default()
    };

    // Regions aren't checked until they're loaded into a mask
    OverlayRenderer::new(config.clone()).unwrap();
    let err = config.mask_book().unwrap_err();
    let invalid = err.downcast::<InvalidParameter>().unwrap();
    assert_eq!(invalid.name, "vertex");
}
