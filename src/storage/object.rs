//! Object-store collaborator — uploads scan images to an S3-compatible
//! gateway bucket.
//!
//! Keys are `{COUNTRY}_{6 lowercase hex}.{ext}` so operators can eyeball the
//! bucket by market without any further index.

use base64::Engine as _;
use rand::RngCore;

use super::StorageError;

/// Country code used when the client didn't report one.
const UNKNOWN_COUNTRY: &str = "XX";

/// The hosted object store, seen as a byte sink that returns the stored key.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        key: &str,
    ) -> Result<String, StorageError>;
}

/// Decoded image payload ready for upload.
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    /// Extension/subtype sniffed from the data URL (`png`, `jpeg`, ...).
    pub image_type: String,
}

impl ImagePayload {
    pub fn content_type(&self) -> String {
        format!("image/{}", self.image_type)
    }
}

/// Decode a base64 image, stripping an optional `data:image/<type>;base64,`
/// prefix. Bare base64 defaults to `png`.
pub fn decode_data_url(image: &str) -> Result<ImagePayload, StorageError> {
    let (image_type, b64) = match image.strip_prefix("data:image/") {
        Some(rest) => {
            let (subtype, tail) = rest
                .split_once(";base64,")
                .ok_or_else(|| StorageError::InvalidPayload("malformed data URL".into()))?;
            (subtype.to_string(), tail)
        }
        None => ("png".to_string(), image),
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| StorageError::InvalidPayload(format!("base64 decode: {e}")))?;

    Ok(ImagePayload { bytes, image_type })
}

/// Build an object key: `{COUNTRY}_{6-hex}.{ext}`.
pub fn object_key(country_code: Option<&str>, ext: &str) -> String {
    let country = country_code
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNKNOWN_COUNTRY)
        .to_uppercase();

    let mut suffix = [0u8; 3];
    rand::thread_rng().fill_bytes(&mut suffix);
    let code: String = suffix.iter().map(|b| format!("{b:02x}")).collect();

    format!("{country}_{code}.{ext}")
}

/// Object store backed by an S3-compatible HTTP gateway (path-style bucket
/// addressing, bearer-token auth).
pub struct HttpObjectStore {
    endpoint: String,
    token: String,
    bucket: String,
    client: reqwest::Client,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, token: &str, bucket: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.to_string(),
            bucket: bucket.to_string(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for HttpObjectStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        key: &str,
    ) -> Result<String, StorageError> {
        if self.endpoint.is_empty() {
            return Err(StorageError::NotConfigured("STORAGE_ENDPOINT"));
        }

        let url = format!("{}/{}/{}", self.endpoint, self.bucket, key);
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    StorageError::Connection(self.endpoint.clone())
                } else {
                    StorageError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(key, "scan image uploaded");
        Ok(key.to_string())
    }
}

/// In-memory object store for tests; records every uploaded key.
#[cfg(test)]
pub struct MockObjectStore {
    pub uploads: std::sync::Mutex<Vec<String>>,
    pub fail: bool,
}

#[cfg(test)]
impl MockObjectStore {
    pub fn new() -> Self {
        Self {
            uploads: std::sync::Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            uploads: std::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl ObjectStore for MockObjectStore {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        _content_type: &str,
        key: &str,
    ) -> Result<String, StorageError> {
        if self.fail {
            return Err(StorageError::NotConfigured("mock"));
        }
        self.uploads.lock().unwrap().push(key.to_string());
        Ok(key.to_string())
    }
}
