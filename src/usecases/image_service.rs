//! Image generation: provider -> URL -> download -> persist -> convert.
//!
//! Any upstream failure yields `None`; conversion failure falls back to the
//! original file.

use crate::domain::{DomainError, GeneratedImage, ImageFormat, ImageModel, ImageRequest};
use crate::ports::{ImageConverterPort, ImageDownloaderPort, ImageProviderPort};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Base name of the image as downloaded from the provider.
pub const ORIGINAL_IMAGE_STEM: &str = "digest_illustration_original";
/// File name of the converted image.
pub const CONVERTED_IMAGE_NAME: &str = "digest_illustration.png";

pub struct ImageService {
    provider: Arc<dyn ImageProviderPort>,
    downloader: Arc<dyn ImageDownloaderPort>,
    converter: Arc<dyn ImageConverterPort>,
    work_dir: PathBuf,
}

impl ImageService {
    pub fn new(
        provider: Arc<dyn ImageProviderPort>,
        downloader: Arc<dyn ImageDownloaderPort>,
        converter: Arc<dyn ImageConverterPort>,
        work_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            provider,
            downloader,
            converter,
            work_dir: work_dir.as_ref().to_path_buf(),
        }
    }

    /// Generate an illustration for `prompt` with `model`.
    pub async fn generate(&self, prompt: &str, model: ImageModel) -> Option<GeneratedImage> {
        info!(model = %model, prompt = %prompt, "generating image");
        let request = {
            let mut rng = rand::thread_rng();
            ImageRequest::for_model(model, prompt, &mut rng)
        };
        if let Some(style) = request.style() {
            info!(style, "selected image style");
        }

        let original = match self.fetch_original(&request).await {
            Ok(image) => image,
            Err(e) => {
                error!(model = %model, error = %e, "image generation failed");
                return None;
            }
        };

        let converted = self.work_dir.join(CONVERTED_IMAGE_NAME);
        match self.converter.convert(&original.path, &converted).await {
            Ok(()) => {
                info!(path = %converted.display(), "image converted successfully");
                Some(GeneratedImage {
                    path: converted,
                    format: ImageFormat::Png,
                })
            }
            Err(e) => {
                warn!(error = %e, path = %original.path.display(), "conversion failed, using original image");
                Some(original)
            }
        }
    }

    async fn fetch_original(&self, request: &ImageRequest) -> Result<GeneratedImage, DomainError> {
        let output = self.provider.generate(request).await?;
        info!(output = %output, "image provider output");

        let url = image_url_from_output(&output).ok_or_else(|| {
            DomainError::ImageProvider(format!("unexpected output format: {}", output))
        })?;
        let bytes = self.downloader.download(&url).await?;

        let format = ImageFormat::from_url(&url);
        let path = self
            .work_dir
            .join(format!("{}.{}", ORIGINAL_IMAGE_STEM, format.extension()));
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| DomainError::Io(format!("write {}: {}", path.display(), e)))?;
        info!(path = %path.display(), bytes = bytes.len(), "image saved");

        Ok(GeneratedImage { path, format })
    }
}

/// Normalize a provider output to one URL: a string, or the first element
/// of a non-empty list of strings. Anything else is rejected.
pub fn image_url_from_output(output: &Value) -> Option<String> {
    match output {
        Value::String(url) if !url.is_empty() => Some(url.clone()),
        Value::Array(items) => items
            .first()
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(String::from),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) struct FixedProvider(pub Result<Value, String>);

    #[async_trait::async_trait]
    impl ImageProviderPort for FixedProvider {
        async fn generate(&self, _request: &ImageRequest) -> Result<Value, DomainError> {
            self.0.clone().map_err(DomainError::ImageProvider)
        }
    }

    #[derive(Default)]
    pub(crate) struct BytesDownloader {
        pub fail: bool,
        pub urls: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl ImageDownloaderPort for BytesDownloader {
        async fn download(&self, url: &str) -> Result<Vec<u8>, DomainError> {
            self.urls.lock().unwrap().push(url.to_string());
            if self.fail {
                return Err(DomainError::Download("404 Not Found".into()));
            }
            Ok(b"RIFF....WEBPVP8 ".to_vec())
        }
    }

    /// Copies input to output, or fails like a missing `convert` binary.
    pub(crate) struct CopyConverter {
        pub fail: bool,
        pub calls: AtomicUsize,
    }

    impl CopyConverter {
        pub(crate) fn new(fail: bool) -> Self {
            Self {
                fail,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl ImageConverterPort for CopyConverter {
        async fn convert(&self, input: &Path, output: &Path) -> Result<(), DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DomainError::Conversion("convert: not found".into()));
            }
            tokio::fs::copy(input, output)
                .await
                .map(|_| ())
                .map_err(|e| DomainError::Conversion(e.to_string()))
        }
    }

    fn service(
        output: Result<Value, String>,
        downloader: Arc<BytesDownloader>,
        converter: Arc<CopyConverter>,
        dir: &Path,
    ) -> ImageService {
        ImageService::new(Arc::new(FixedProvider(output)), downloader, converter, dir)
    }

    #[test]
    fn test_url_from_string_and_list_are_equivalent() {
        let single = image_url_from_output(&json!("http://x/img.webp"));
        let list = image_url_from_output(&json!(["http://x/img.webp", "http://x/other.webp"]));
        assert_eq!(single.as_deref(), Some("http://x/img.webp"));
        assert_eq!(single, list);
    }

    #[test]
    fn test_url_rejects_unexpected_shapes() {
        assert!(image_url_from_output(&json!({})).is_none());
        assert!(image_url_from_output(&Value::Null).is_none());
        assert!(image_url_from_output(&json!([])).is_none());
        assert!(image_url_from_output(&json!([42])).is_none());
        assert!(image_url_from_output(&json!("")).is_none());
        assert!(image_url_from_output(&json!([""])).is_none());
        assert!(image_url_from_output(&json!(["", "http://x/b.webp"])).is_none());
    }

    #[tokio::test]
    async fn test_list_output_converted() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Arc::new(BytesDownloader::default());
        let converter = Arc::new(CopyConverter::new(false));
        let svc = service(
            Ok(json!(["http://x/img.webp"])),
            Arc::clone(&downloader),
            Arc::clone(&converter),
            dir.path(),
        );

        let image = svc.generate("poster", ImageModel::Flux).await.unwrap();
        assert_eq!(image.path, dir.path().join(CONVERTED_IMAGE_NAME));
        assert_eq!(image.format, ImageFormat::Png);
        assert!(image.path.exists());
        assert!(dir.path().join("digest_illustration_original.webp").exists());
        assert_eq!(*downloader.urls.lock().unwrap(), vec!["http://x/img.webp"]);
    }

    #[tokio::test]
    async fn test_string_output_behaves_like_list() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Arc::new(BytesDownloader::default());
        let svc = service(
            Ok(json!("http://x/img.webp")),
            Arc::clone(&downloader),
            Arc::new(CopyConverter::new(false)),
            dir.path(),
        );

        let image = svc.generate("poster", ImageModel::RedPanda).await.unwrap();
        assert_eq!(image.path, dir.path().join(CONVERTED_IMAGE_NAME));
        assert_eq!(*downloader.urls.lock().unwrap(), vec!["http://x/img.webp"]);
    }

    #[tokio::test]
    async fn test_conversion_failure_returns_original() {
        let dir = tempfile::tempdir().unwrap();
        let converter = Arc::new(CopyConverter::new(true));
        let svc = service(
            Ok(json!("http://x/img.webp")),
            Arc::new(BytesDownloader::default()),
            Arc::clone(&converter),
            dir.path(),
        );

        let image = svc.generate("poster", ImageModel::Flux).await.unwrap();
        assert_eq!(image.path, dir.path().join("digest_illustration_original.webp"));
        assert_eq!(image.format, ImageFormat::Webp);
        assert_eq!(converter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unexpected_output_gives_none() {
        let dir = tempfile::tempdir().unwrap();
        for output in [json!({}), Value::Null] {
            let downloader = Arc::new(BytesDownloader::default());
            let converter = Arc::new(CopyConverter::new(false));
            let svc = service(
                Ok(output),
                Arc::clone(&downloader),
                Arc::clone(&converter),
                dir.path(),
            );
            assert!(svc.generate("poster", ImageModel::Flux).await.is_none());
            assert!(downloader.urls.lock().unwrap().is_empty());
            assert_eq!(converter.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_provider_error_gives_none() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(
            Err("prediction failed: NSFW".into()),
            Arc::new(BytesDownloader::default()),
            Arc::new(CopyConverter::new(false)),
            dir.path(),
        );
        assert!(svc.generate("poster", ImageModel::Flux).await.is_none());
    }

    #[tokio::test]
    async fn test_download_error_gives_none() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Arc::new(BytesDownloader {
            fail: true,
            ..Default::default()
        });
        let svc = service(
            Ok(json!("http://x/img.webp")),
            downloader,
            Arc::new(CopyConverter::new(false)),
            dir.path(),
        );
        assert!(svc.generate("poster", ImageModel::Flux).await.is_none());
        assert!(!dir.path().join("digest_illustration_original.webp").exists());
    }
}
