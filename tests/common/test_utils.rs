#![allow(dead_code)]

use std::{
    cell::RefCell,
    rc::Rc,
    sync::{Arc, Mutex},
};

use anyhow::anyhow;
use cgmath::Vector3;
use wps_scene_viewer::{
    console::ConsoleSink,
    context::Context,
    data_structures::{mesh::Mesh, modifier::ModelModifier, scene_graph::HeadlessScene},
    resources::{
        Fetcher, ParsedResponse, ResponseFormat,
        export::{TERRAIN_NAME, to_collada, to_json},
    },
    template::FormFields,
};

pub(crate) const TEMPLATE: &str =
    "<Get id='{identifier}' cov='{coverage}' from='{url}' as='{mimeType}'/>";

/// Four triangles over a 3x2 pixel grid, spaced 2 apart, as the JSON export writes them.
pub(crate) fn terrain_json() -> String {
    let mesh = Mesh::from_parts(
        TERRAIN_NAME,
        vec![
            Vector3::new(0.0, 0.0, 10.0),
            Vector3::new(2.0, 0.0, 11.0),
            Vector3::new(4.0, 0.0, 12.0),
            Vector3::new(0.0, 2.0, 13.0),
            Vector3::new(2.0, 2.0, 14.0),
            Vector3::new(4.0, 2.0, 15.0),
        ],
        vec![vec![0, 1, 3], vec![1, 4, 3], vec![1, 2, 4], vec![2, 5, 4]],
    );
    to_json(&mesh).expect("terrain fixture encodes")
}

/// Two geometries in one COLLADA export: a quad and a lone triangle.
pub(crate) fn two_geometry_collada() -> String {
    let quad = Mesh::from_parts(
        "quad",
        vec![
            Vector3::new(0.0, 0.0, 10.0),
            Vector3::new(2.0, 0.0, 12.0),
            Vector3::new(0.0, 2.0, 14.0),
            Vector3::new(2.0, 2.0, 16.0),
        ],
        vec![vec![0, 1, 2], vec![1, 3, 2]],
    );
    let triangle = Mesh::from_parts(
        "triangle",
        vec![
            Vector3::new(10.0, 10.0, 0.0),
            Vector3::new(14.0, 10.0, 0.0),
            Vector3::new(10.0, 16.0, 5.0),
        ],
        vec![vec![0, 1, 2]],
    );
    to_collada(&[quad, triangle]).expect("COLLADA fixture encodes")
}

/// A COLLADA export without any geometry.
pub(crate) fn empty_collada() -> String {
    to_collada(&[]).expect("empty COLLADA fixture encodes")
}

/// What a WPS answers with, still under a success status, when the process fails.
pub(crate) const EXCEPTION_REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows/1.1" version="1.1.0">
  <ows:Exception exceptionCode="NoApplicableCode">
    <ows:ExceptionText>Process returned with an exception</ows:ExceptionText>
  </ows:Exception>
</ows:ExceptionReport>"#;

/// What the mock model service saw.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Submission {
    pub url: String,
    pub body: String,
    pub content_type: String,
    pub format: ResponseFormat,
}

/// Canned network boundary.
#[derive(Clone)]
pub(crate) struct MockFetcher {
    template: Result<String, String>,
    response: Result<ParsedResponse, String>,
    pub fetched: Arc<Mutex<Vec<String>>>,
    pub submitted: Arc<Mutex<Vec<Submission>>>,
}

impl MockFetcher {
    pub fn new(template: &str, response: ParsedResponse) -> Self {
        Self {
            template: Ok(template.to_string()),
            response: Ok(response),
            fetched: Arc::default(),
            submitted: Arc::default(),
        }
    }

    pub fn json(template: &str, document: &str) -> Self {
        let value = serde_json::from_str(document).expect("test JSON must be valid");
        Self::new(template, ParsedResponse::Json(value))
    }

    pub fn collada(template: &str, document: &str) -> Self {
        Self::new(template, ParsedResponse::Xml(document.to_string()))
    }

    pub fn failing_template(reason: &str) -> Self {
        Self {
            template: Err(reason.to_string()),
            ..Self::json(TEMPLATE, &terrain_json())
        }
    }

    pub fn failing_submit(reason: &str) -> Self {
        Self {
            response: Err(reason.to_string()),
            ..Self::json(TEMPLATE, &terrain_json())
        }
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submitted.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch_text(&self, url: &str) -> anyhow::Result<String> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.template.clone().map_err(|e| anyhow!(e))
    }

    async fn submit(
        &self,
        url: &str,
        body: String,
        content_type: &str,
        format: ResponseFormat,
    ) -> anyhow::Result<ParsedResponse> {
        self.submitted.lock().unwrap().push(Submission {
            url: url.to_string(),
            body,
            content_type: content_type.to_string(),
            format,
        });
        self.response.clone().map_err(|e| anyhow!(e))
    }
}

/// Console that keeps every line for later assertions.
pub(crate) struct RecordingConsole(pub Rc<RefCell<Vec<String>>>);

impl ConsoleSink for RecordingConsole {
    fn append(&mut self, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }
}

pub(crate) fn form() -> FormFields {
    FormFields {
        url: "http://x".to_string(),
        workspace: "ws".to_string(),
        layer: "layer1".to_string(),
        coverage: "full".to_string(),
    }
}

/// A fresh viewer session and a handle on its console lines.
pub(crate) fn viewer() -> (Context<HeadlessScene>, Rc<RefCell<Vec<String>>>) {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let ctx = Context::new(
        HeadlessScene::new(),
        ModelModifier::default(),
        form(),
        "request.template",
        Box::new(RecordingConsole(lines.clone())),
    );
    (ctx, lines)
}
