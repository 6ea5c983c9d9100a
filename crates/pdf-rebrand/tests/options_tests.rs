mod common;

use common::*;
use pdf_rebrand::*;

#[test]
fn test_default_options_valid() {
    let options = ComposeOptions::default();
    assert!(options.validate().is_ok());
    assert_eq!(options.mask_color, [1.0, 1.0, 1.0]);
    assert!(options.compress_streams);
}

#[test]
fn test_validation_color_range() {
    let options = ComposeOptions {
        text_color: [0.0, 1.5, 0.0],
        ..Default::default()
    };
    match options.validate() {
        Err(RebrandError::Config(msg)) => assert!(msg.contains("text_color")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_validation_descender_offset() {
    let options = ComposeOptions {
        descender_offset: f32::NAN,
        ..Default::default()
    };
    assert!(options.validate().is_err());
}

#[test]
fn test_request_validation() {
    let source = test_pdf_bytes(&[TestPage::new(600, 800)]);

    let req = request(vec![source.clone()], vec![PageJob::new(1, 1)], ResolvedProfile::default());
    assert!(matches!(req.validate(), Err(RebrandError::Config(_))));

    let req = request(vec![source.clone()], vec![PageJob::new(0, 0)], ResolvedProfile::default());
    assert!(matches!(req.validate(), Err(RebrandError::Config(_))));

    let mut job = PageJob::new(0, 1);
    job.authored_display_width = Some(0.0);
    let req = request(vec![source.clone()], vec![job], ResolvedProfile::default());
    assert!(matches!(req.validate(), Err(RebrandError::Config(_))));

    let req = request(vec![source], vec![PageJob::new(0, 1)], ResolvedProfile::default());
    assert!(req.validate().is_ok());
}

#[test]
fn test_rotation_normalization() {
    assert_eq!(Rotation::from_degrees(-90).unwrap(), Rotation::Deg270);
    assert_eq!(Rotation::from_degrees(450).unwrap(), Rotation::Deg90);
    assert_eq!(Rotation::from_degrees(360).unwrap(), Rotation::Deg0);
    assert!(matches!(
        Rotation::from_degrees(45),
        Err(RebrandError::UnsupportedRotation(45))
    ));
    assert!(Rotation::Deg90.swaps_axes());
    assert!(!Rotation::Deg180.swaps_axes());
}

#[test]
fn test_scale_ratio() {
    let display = DisplaySize::new(600.0, 800.0);
    let mut job = PageJob::new(0, 1);
    assert_eq!(job.scale_ratio(display), 1.0);
    job.authored_display_width = Some(400.0);
    assert_eq!(job.scale_ratio(display), 1.5);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_options_save_and_load() {
    use tempfile::NamedTempFile;

    let options = ComposeOptions {
        mask_color: [0.9, 0.9, 0.9],
        producer: Some("flyer desk".to_string()),
        labels: FieldLabels {
            fee_ratio_landlord: "貸主".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    let temp = NamedTempFile::new().unwrap();
    options.save(temp.path()).await.unwrap();

    let loaded = ComposeOptions::load(temp.path()).await.unwrap();
    assert_eq!(loaded, options);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_partial_options_use_defaults() {
    use tempfile::NamedTempFile;

    let temp = NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), r#"{ "descender_offset": 4.5 }"#).unwrap();
    let loaded = ComposeOptions::load(temp.path()).await.unwrap();
    assert_eq!(loaded.descender_offset, 4.5);
    assert_eq!(loaded.labels, FieldLabels::default());
    assert!(loaded.compress_streams);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_malformed_options_rejected() {
    use tempfile::NamedTempFile;

    let temp = NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), "{ not json").unwrap();
    assert!(matches!(
        ComposeOptions::load(temp.path()).await,
        Err(RebrandError::Config(_))
    ));
}

#[tokio::test]
async fn test_profile_images_loaded_from_disk() {
    use tempfile::NamedTempFile;

    let logo = NamedTempFile::new().unwrap();
    std::fs::write(logo.path(), test_png(255)).unwrap();
    let logo_key = logo.path().to_string_lossy().into_owned();

    let mut profile = basic_profile();
    profile.logo = Some(ImageRef::missing(logo_key.clone()));
    profile.line_qr = Some(ImageRef::missing("/nonexistent/qr.png"));
    fill_profile_images(&mut profile).await.unwrap();

    assert_eq!(
        profile.resolve_image(ImageField::Logo),
        ImageResolution::Ready {
            key: &logo_key,
            data: &test_png(255),
        }
    );
    assert_eq!(
        profile.resolve_image(ImageField::LineQr),
        ImageResolution::Missing {
            key: "/nonexistent/qr.png"
        }
    );
}

#[tokio::test]
async fn test_load_fonts_reports_missing_file() {
    assert!(matches!(
        load_fonts("/nonexistent/regular.ttf", "/nonexistent/bold.ttf").await,
        Err(RebrandError::FontEmbedFailure(_))
    ));
}
