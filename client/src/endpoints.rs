//! Typed endpoint wrappers over [`ApiClient::execute`].

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use modaics_values::{
    BatchAnalysisResult, DeepAnalysisResult, DiscoveryQuery, DiscoveryResponse, GarmentDraft, GarmentRecord,
    ImageEmbeddingResponse, VisualSearchResponse,
};

use crate::client::{ApiClient, Endpoint, RequestBody};
use crate::error::{ApiError, ApiResult};
use crate::multipart::MultipartForm;
use crate::transport::HttpMethod;

/// Upper bound on photos accepted by the batch analysis endpoint.
pub const MAX_BATCH_PHOTOS: usize = 8;

/// One image file part.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn jpeg(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::new(filename, "image/jpeg", data)
    }
}

fn attach(form: MultipartForm, field: &str, images: &[ImageUpload]) -> MultipartForm {
    images.iter().fold(form, |form, image| {
        form.file(field, image.filename.as_str(), image.content_type.as_str(), image.data.clone())
    })
}

fn require_photos(photos: &[ImageUpload], max: usize) -> ApiResult<()> {
    if photos.is_empty() {
        return Err(ApiError::ClientError {
            message: "At least one photo is required".to_string(),
            status: 400,
        });
    }
    if photos.len() > max {
        return Err(ApiError::ClientError {
            message: format!("Maximum {} images per batch, got {}", max, photos.len()),
            status: 400,
        });
    }
    Ok(())
}

impl ApiClient {
    /// Deep analysis of one garment from one or more photos.
    pub async fn analyze_garment(
        &self,
        photos: &[ImageUpload],
        generate_story: bool,
        suggest_price: bool,
    ) -> ApiResult<DeepAnalysisResult> {
        require_photos(photos, usize::MAX)?;

        let form = MultipartForm::new()
            .text("generate_story", generate_story)
            .text("suggest_price", suggest_price);
        let form = attach(form, "photos", photos);

        debug!("Requesting deep analysis of {} photo(s)", photos.len());
        self.send(HttpMethod::Post, "analyze", RequestBody::Multipart(form))
            .await
    }

    /// Analyse several photos of the same garment, at most [`MAX_BATCH_PHOTOS`].
    ///
    /// Oversized batches are rejected before anything is sent.
    pub async fn analyze_batch(&self, photos: &[ImageUpload]) -> ApiResult<BatchAnalysisResult> {
        require_photos(photos, MAX_BATCH_PHOTOS)?;

        let form = attach(MultipartForm::new(), "photos", photos);
        self.send(HttpMethod::Post, "analyze/batch", RequestBody::Multipart(form))
            .await
    }

    /// Image-similarity search across listing sources.
    pub async fn search_by_image(
        &self,
        image: &ImageUpload,
        top_k: Option<u32>,
        sources: &[String],
    ) -> ApiResult<VisualSearchResponse> {
        let mut form = MultipartForm::new();
        if let Some(top_k) = top_k {
            form = form.text("top_k", top_k);
        }
        for source in sources {
            form = form.text("source", source);
        }
        let form = attach(form, "image", std::slice::from_ref(image));

        self.send(HttpMethod::Post, "search/visual", RequestBody::Multipart(form))
            .await
    }

    /// Server-side embedding of a single image.
    pub async fn embed_image(&self, image: &ImageUpload) -> ApiResult<ImageEmbeddingResponse> {
        let form = attach(MultipartForm::new(), "image", std::slice::from_ref(image));
        self.send(HttpMethod::Post, "embeddings/image", RequestBody::Multipart(form))
            .await
    }

    /// Create a listing: one JSON `garment` part followed by the image parts.
    pub async fn create_garment(&self, draft: &GarmentDraft, images: &[ImageUpload]) -> ApiResult<GarmentRecord> {
        let form = MultipartForm::new().json("garment", draft)?;
        let form = attach(form, "images", images);

        self.send(HttpMethod::Post, "garments", RequestBody::Multipart(form))
            .await
    }

    /// Structured discovery search.
    pub async fn discover(&self, query: &DiscoveryQuery, page: u32, page_size: u32) -> ApiResult<DiscoveryResponse> {
        let path = format!("discovery?page={}&page_size={}", page.max(1), page_size.max(1));
        self.send(HttpMethod::Post, &path, RequestBody::json(query)?)
            .await
    }

    /// Listings similar to an existing garment.
    pub async fn find_similar(&self, garment_id: Uuid, limit: u32) -> ApiResult<DiscoveryResponse> {
        let path = format!("discovery/similar/{}?limit={}", garment_id, limit.max(1));
        self.send(HttpMethod::Get, &path, RequestBody::Empty).await
    }

    /// Download an image by absolute URL, served from the cache when possible.
    ///
    /// Image hosts are public, so no bearer token is attached.
    pub async fn fetch_image(&self, url: &str) -> ApiResult<Bytes> {
        if let Some(cached) = self.image_cache().get(url) {
            debug!("Image cache hit for {}", url);
            return Ok(cached);
        }

        let bytes = self
            .execute(HttpMethod::Get, Endpoint::Absolute(url.to_string()), RequestBody::Empty, false)
            .await?;
        if bytes.is_empty() {
            return Err(ApiError::InvalidResponse(format!("empty image body from {}", url)));
        }

        self.image_cache().insert(url, bytes.clone());
        Ok(bytes)
    }
}
