// cli.rs - Command-line configuration of the viewer
use std::path::PathBuf;

use clap::Parser;

use crate::template::FormFields;

#[derive(Parser, Debug, Clone)]
#[command(name = "wps-scene-viewer")]
#[command(about = "Interactive viewer for WPS exported terrain scenes", long_about = None)]
pub struct Cli {
    /// WPS endpoint the request is posted to
    #[arg(long, default_value = "http://localhost:8080/geoserver/wps")]
    pub url: String,

    /// Workspace of the elevation layer
    #[arg(long, default_value = "sf")]
    pub workspace: String,

    /// Elevation layer name
    #[arg(long, default_value = "sfdem")]
    pub layer: String,

    /// Coverage to export
    #[arg(long, default_value = "sfdem")]
    pub coverage: String,

    /// Request template, relative to the assets directory or an http(s) URL
    #[arg(long, default_value = "request.template")]
    pub template: String,

    /// Directory relative template paths are read from
    #[arg(long, default_value = "assets")]
    pub assets: PathBuf,

    /// Append console messages to this file instead of the log
    #[arg(long)]
    pub console: Option<PathBuf>,
}

impl Cli {
    pub fn form_fields(&self) -> FormFields {
        FormFields {
            url: self.url.clone(),
            workspace: self.workspace.clone(),
            layer: self.layer.clone(),
            coverage: self.coverage.clone(),
        }
    }
}
