//! End-to-end tests for the studio facade, driven through the same command
//! surface a UI would use. The measurement-only metrics backend keeps these
//! deterministic and free of pixel assets.

use std::path::Path;

use certpress::rendering::metrics::{MetricsRenderer, NOMINAL_WIDTH};
use certpress::rendering::Bitmap;
use certpress::session::{AssetStatus, Stage};
use certpress::sizing::{HeuristicMeasurer, TextMeasurer, MAX_FONT_PX, MIN_FONT_PX};
use certpress::{
    Composite, Error, Renderer, Result, Studio, StudioConfig, TemplateInfo,
};

fn test_config(dir: &Path) -> StudioConfig {
    let template = dir.join("certificate.webp");
    std::fs::write(&template, b"stub template").expect("write template stub");
    StudioConfig {
        template_path: template,
        hero_path: None,
        output_dir: dir.join("out"),
        settle_delay_ms: 0,
        debounce_ms: 0,
        ..Default::default()
    }
}

async fn metrics_studio(config: StudioConfig) -> Studio {
    let renderer = MetricsRenderer::new(config.clone()).expect("create renderer");
    Studio::with_renderer(config, renderer)
        .await
        .expect("spawn studio")
}

#[tokio::test]
async fn happy_path_generates_and_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let studio = metrics_studio(config.clone()).await;

    let state = studio.set_name("Jane   Doe").await.unwrap();
    assert_eq!(state.stage, Stage::Form);
    assert_eq!(state.font_size, MAX_FONT_PX);

    let state = studio.generate().await.unwrap();
    assert_eq!(state.stage, Stage::Certificate);
    assert_eq!(state.asset_status, AssetStatus::Ready);
    assert_eq!(state.font_size, MAX_FONT_PX);

    let outcome = studio.download().await.unwrap();
    assert_eq!(outcome.filename, "certificate-jane-doe.png");
    assert_eq!(outcome.width, NOMINAL_WIDTH * config.export_scale);
    assert!(outcome.path.exists());

    let state = studio.snapshot().await.unwrap();
    assert!(!state.is_exporting);

    studio.close().await.unwrap();
}

#[tokio::test]
async fn whitespace_only_name_never_leaves_the_form() {
    let dir = tempfile::tempdir().unwrap();
    let studio = metrics_studio(test_config(dir.path())).await;

    for input in ["", "   ", "\t \n"] {
        studio.set_name(input).await.unwrap();
        let state = studio.generate().await.unwrap();
        assert_eq!(state.stage, Stage::Form, "input {:?} left the form", input);
    }

    let err = studio.download().await.unwrap_err();
    assert!(matches!(err, Error::ExportError(_)));
}

#[tokio::test]
async fn single_char_name_exports_at_the_maximum_size() {
    let dir = tempfile::tempdir().unwrap();
    let studio = metrics_studio(test_config(dir.path())).await;

    studio.set_name("A").await.unwrap();
    let state = studio.generate().await.unwrap();
    assert_eq!(state.font_size, MAX_FONT_PX);

    let outcome = studio.download().await.unwrap();
    assert_eq!(outcome.filename, "certificate-a.png");
}

#[tokio::test]
async fn long_name_is_floored_and_still_exports() {
    let dir = tempfile::tempdir().unwrap();
    let studio = metrics_studio(test_config(dir.path())).await;

    let name: String = std::iter::repeat('W').take(60).collect();
    studio.set_name(&name).await.unwrap();
    let state = studio.generate().await.unwrap();
    assert_eq!(state.font_size, MIN_FONT_PX);

    assert!(studio.download().await.is_ok());
}

#[tokio::test]
async fn missing_template_blocks_download_until_retry_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.template_path = dir.path().join("missing.webp");
    let studio = metrics_studio(config.clone()).await;

    studio.set_name("Jane").await.unwrap();
    let state = studio.generate().await.unwrap();
    assert_eq!(state.stage, Stage::Certificate);
    assert_eq!(state.asset_status, AssetStatus::Failed);

    let err = studio.download().await.unwrap_err();
    assert!(matches!(err, Error::AssetError(_)));

    // Generating again retries the load but the asset is still missing
    let state = studio.generate().await.unwrap();
    assert_eq!(state.asset_status, AssetStatus::Failed);
    assert!(studio.download().await.is_err());

    // Once the asset exists, the full-reload retry recovers
    std::fs::write(&config.template_path, b"stub template").unwrap();
    let state = studio.retry_assets().await.unwrap();
    assert_eq!(state.asset_status, AssetStatus::Ready);
    assert!(studio.download().await.is_ok());
}

#[tokio::test]
async fn reset_returns_a_fresh_default_record() {
    let dir = tempfile::tempdir().unwrap();
    let studio = metrics_studio(test_config(dir.path())).await;

    studio.set_name("Jane Doe").await.unwrap();
    studio.generate().await.unwrap();

    let first = studio.reset().await.unwrap();
    assert_eq!(first.stage, Stage::Form);
    assert!(first.name.is_empty());
    assert_eq!(first.font_size, MAX_FONT_PX);
    assert_eq!(first.asset_status, AssetStatus::Loading);

    // Idempotent: a second reset changes nothing
    let second = studio.reset().await.unwrap();
    assert_eq!(second, first);
}

/// Backend whose rasterization always fails, for exercising the export
/// failure path.
struct FailingRenderer {
    measurer: HeuristicMeasurer,
}

impl Renderer for FailingRenderer {
    fn new(_config: StudioConfig) -> Result<Self> {
        Ok(Self {
            measurer: HeuristicMeasurer,
        })
    }

    fn load_template(&mut self) -> Result<TemplateInfo> {
        Ok(TemplateInfo {
            width: 600,
            height: 450,
        })
    }

    fn template_info(&self) -> Option<TemplateInfo> {
        Some(TemplateInfo {
            width: 600,
            height: 450,
        })
    }

    fn measurer(&self) -> &dyn TextMeasurer {
        &self.measurer
    }

    fn render(&self, _composite: &Composite) -> Result<Bitmap> {
        Err(Error::RenderError("injected rasterizer failure".to_string()))
    }
}

#[tokio::test]
async fn export_failure_clears_busy_and_allows_retry() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let renderer = FailingRenderer::new(config.clone()).unwrap();
    let studio = Studio::with_renderer(config, renderer).await.unwrap();

    studio.set_name("Jane").await.unwrap();
    studio.generate().await.unwrap();

    let err = studio.download().await.unwrap_err();
    assert!(matches!(err, Error::RenderError(_)));

    let state = studio.snapshot().await.unwrap();
    assert!(!state.is_exporting);
    assert_eq!(state.stage, Stage::Certificate);

    // A subsequent attempt is possible (and fails the same way)
    assert!(studio.download().await.is_err());
    assert!(!studio.snapshot().await.unwrap().is_exporting);
}

#[tokio::test]
async fn settle_delay_and_debounce_paths_still_complete() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.settle_delay_ms = 20;
    config.debounce_ms = 5;
    let studio = metrics_studio(config).await;

    studio.set_name("Ada Lovelace").await.unwrap();
    studio.generate().await.unwrap();
    let outcome = studio.download().await.unwrap();
    assert_eq!(outcome.filename, "certificate-ada-lovelace.png");
}
