//! Requesting models from the service and preparing them for the scene.
//!
//! A request runs in two halves. [`request_model`] is the asynchronous half:
//! it fetches the template, fills in the parameters and posts the result to
//! the model service. It never touches the scene and resolves to exactly one
//! [`LoadOutcome`]. The other half, turning the response into scene objects,
//! runs on the event loop (see [`crate::context::Context::apply_outcome`]) and
//! uses [`normalize_mesh`] on every mesh it gets back.

use cgmath::{Matrix4, Vector3};
use instant::{Duration, Instant};
use thiserror::Error;

use crate::{
    data_structures::mesh::Mesh,
    resources::{Fetcher, ParsedResponse, ResponseFormat},
    template::{RequestParameters, substitute},
};

/// Content type of every request body sent to the model service.
pub const REQUEST_CONTENT_TYPE: &str = "application/xml";

/// The two kinds of model the service can return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelFormat {
    Json,
    Collada,
}

impl ModelFormat {
    pub fn response_format(&self) -> ResponseFormat {
        match self {
            ModelFormat::Json => ResponseFormat::Json,
            ModelFormat::Collada => ResponseFormat::Xml,
        }
    }

    /// Value of the `mimeType` template parameter for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ModelFormat::Json => "application/json",
            ModelFormat::Collada => "model/vnd.collada+xml",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelFormat::Json => "JSON",
            ModelFormat::Collada => "COLLADA",
        }
    }
}

/// Everything needed to run one model request.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelRequest {
    pub generation: u64,
    pub format: ModelFormat,
    pub template_url: String,
    pub parameters: RequestParameters,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not fetch request template {url}: {cause:#}")]
    Template { url: String, cause: anyhow::Error },
    #[error("Model request to {url} failed: {cause:#}")]
    Submit { url: String, cause: anyhow::Error },
}

/// Result of one model request, tagged with the request it answers.
#[derive(Debug)]
pub struct LoadOutcome {
    pub generation: u64,
    pub format: ModelFormat,
    pub result: Result<ParsedResponse, LoadError>,
    pub elapsed: Duration,
}

/// Fetch the template, substitute, and submit.
///
/// `progress` receives a status line when the request is about to be posted.
pub async fn request_model<F, P>(fetcher: &F, request: ModelRequest, mut progress: P) -> LoadOutcome
where
    F: Fetcher,
    P: FnMut(String),
{
    let started = Instant::now();
    let ModelRequest {
        generation,
        format,
        template_url,
        parameters,
    } = request;

    let result: Result<ParsedResponse, LoadError> = async {
        let template = fetcher
            .fetch_text(&template_url)
            .await
            .map_err(|cause| LoadError::Template {
                url: template_url.clone(),
                cause,
            })?;
        let body = substitute(&template, &parameters);

        progress(format!("Fetching {} model...", format.label()));
        log::debug!("Posting {} byte request to {}", body.len(), parameters.url());
        fetcher
            .submit(
                parameters.url(),
                body,
                REQUEST_CONTENT_TYPE,
                format.response_format(),
            )
            .await
            .map_err(|cause| LoadError::Submit {
                url: parameters.url().to_string(),
                cause,
            })
    }
    .await;

    LoadOutcome {
        generation,
        format,
        result,
        elapsed: started.elapsed(),
    }
}

/// Translation that moves the bounding box centre onto the origin in X and Y.
pub fn centering_translation(mesh: &Mesh) -> Matrix4<f32> {
    match mesh.bounding_box() {
        Some(bb) => {
            let center = bb.center();
            Matrix4::from_translation(Vector3::new(-center.x, -center.y, 0.0))
        }
        None => Matrix4::from_translation(Vector3::new(0.0, 0.0, 0.0)),
    }
}

/// Copy `mesh` centred on the X/Y origin into a fresh mesh ready for display.
pub fn normalize_mesh(mesh: &Mesh) -> Mesh {
    let translate = centering_translation(mesh);
    let mut translated = Mesh::new(mesh.name.clone());
    translated.boolean_add(mesh, &translate);
    translated.build_edges();
    translated.prepare();
    translated
}
