use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart, Request},
    http::{header, Extensions, HeaderMap},
};
use std::collections::HashMap;
use thiserror::Error;

use crate::problem::{bad_request, payload_too_large, ProblemResponse};

#[derive(Debug, Error)]
pub enum FormError {
    #[error("request body exceeds the allowed size")]
    TooLarge,
    #[error("malformed multipart body: {0}")]
    Multipart(String),
}

impl From<FormError> for ProblemResponse {
    fn from(e: FormError) -> Self {
        match e {
            FormError::TooLarge => payload_too_large(e.to_string()),
            FormError::Multipart(_) => bad_request(e.to_string()),
        }
    }
}

/// File part of a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied name; never trusted as a storage path.
    pub file_name: String,
    pub bytes: Bytes,
}

/// Parsed form body: text fields plus file parts.
///
/// Accepts `application/x-www-form-urlencoded` and `multipart/form-data`.
/// Other content types produce an empty form. For repeated names the last
/// value wins.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    match headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        None => true,
        Some(ct) => ct.starts_with("application/x-www-form-urlencoded"),
    }
}

impl FormData {
    pub fn from_urlencoded(body: &[u8]) -> Self {
        let fields = url::form_urlencoded::parse(body).into_owned().collect();
        Self {
            fields,
            files: HashMap::new(),
        }
    }

    /// Parse an already buffered body. `extensions` are carried over so
    /// body-limit settings of the router also apply to multipart parsing.
    pub async fn from_bytes(
        headers: &HeaderMap,
        extensions: &Extensions,
        body: Bytes,
    ) -> Result<Self, FormError> {
        if is_multipart(headers) {
            let mut probe = Request::new(Body::from(body));
            *probe.headers_mut() = headers.clone();
            *probe.extensions_mut() = extensions.clone();
            let multipart = Multipart::from_request(probe, &())
                .await
                .map_err(|e| FormError::Multipart(e.body_text()))?;
            Self::from_multipart(multipart).await
        } else if is_urlencoded(headers) {
            Ok(Self::from_urlencoded(&body))
        } else {
            Ok(Self::default())
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, FormError> {
        let mut form = FormData::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| FormError::Multipart(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| FormError::Multipart(e.body_text()))?;

            match file_name {
                Some(file_name) => {
                    form.files.insert(
                        name,
                        UploadedFile { file_name, bytes },
                    );
                }
                None => {
                    form.fields
                        .insert(name, String::from_utf8_lossy(&bytes).into_owned());
                }
            }
        }
        Ok(form)
    }

    /// Raw value, empty when absent.
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn trimmed(&self, name: &str) -> String {
        self.text(name).trim().to_string()
    }

    /// Trimmed value, `None` when absent or blank.
    pub fn optional(&self, name: &str) -> Option<String> {
        let v = self.text(name).trim();
        (!v.is_empty()).then(|| v.to_string())
    }

    /// Checkbox sent with the browser's default value `on`.
    pub fn checked(&self, name: &str) -> bool {
        self.text(name) == "on"
    }

    /// File part with a non-empty client file name.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name).filter(|f| !f.file_name.is_empty())
    }
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(mut req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        // The CSRF guard may already have buffered and parsed the body.
        if let Some(form) = req.extensions_mut().remove::<FormData>() {
            return Ok(form);
        }
        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|_| ProblemResponse::from(FormError::TooLarge))?;
        Ok(FormData::from_bytes(&parts.headers, &parts.extensions, bytes).await?)
    }
}
