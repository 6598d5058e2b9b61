//! The viewer session.
//!
//! [`Context`] owns everything that used to be process-wide: the scene, the
//! render mode, the model modifier, the parameter panel and the console. All
//! of it is touched only from the event loop thread. Network work is handed
//! out as [`Out::Load`] and comes back through [`Context::apply_outcome`].

use crate::{
    console::ConsoleSink,
    data_structures::{
        modifier::ModelModifier,
        scene_graph::{SceneEngine, SceneObject},
    },
    input::{Command, KeyBindings, RenderMode, key_label},
    resources::{
        ParsedResponse,
        model::{LoadOutcome, ModelFormat, ModelRequest, normalize_mesh},
    },
    template::{FormFields, RequestParameters},
};
use winit::keyboard::KeyCode;

/// Work a command hands back to the event loop.
///
/// `Out::Load` carries a model request to run off the event loop thread.
/// `Empty` is the default when nothing needs to happen.
#[derive(Debug, Default, PartialEq)]
pub enum Out {
    Load(ModelRequest),
    #[default]
    Empty,
}

pub struct Context<E: SceneEngine> {
    pub engine: E,
    pub modifier: ModelModifier,
    pub form: FormFields,
    pub bindings: KeyBindings,
    pub template_url: String,
    render_mode: RenderMode,
    parameters_visible: bool,
    generation: u64,
    console: Box<dyn ConsoleSink>,
}

impl<E: SceneEngine> Context<E> {
    pub fn new(
        engine: E,
        modifier: ModelModifier,
        form: FormFields,
        template_url: impl Into<String>,
        console: Box<dyn ConsoleSink>,
    ) -> Self {
        Self {
            engine,
            modifier,
            form,
            bindings: KeyBindings::default(),
            template_url: template_url.into(),
            render_mode: RenderMode::default(),
            parameters_visible: false,
            generation: 0,
            console,
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn parameters_visible(&self) -> bool {
        self.parameters_visible
    }

    /// Generation of the most recently issued model request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn log(&mut self, message: &str) {
        self.console.append(message);
    }

    /// Print the key hints.
    pub fn greet(&mut self) {
        let hints: Vec<String> = self
            .bindings
            .iter()
            .map(|(key, command)| format!("Press {} to {}.", key_label(*key), command.description()))
            .collect();
        for hint in hints {
            self.log(&hint);
        }
    }

    /// Handle a released key. Unbound keys do nothing.
    pub fn on_key(&mut self, key: KeyCode) -> Out {
        match self.bindings.dispatch(key) {
            Some(command) => self.execute(command),
            None => Out::Empty,
        }
    }

    pub fn execute(&mut self, command: Command) -> Out {
        match command {
            Command::ToggleParameters => {
                self.toggle_parameters();
                Out::Empty
            }
            Command::LoadJson => self.request(ModelFormat::Json),
            Command::LoadCollada => self.request(ModelFormat::Collada),
            Command::CycleRenderMode => {
                self.cycle_render_mode();
                Out::Empty
            }
        }
    }

    fn toggle_parameters(&mut self) {
        self.parameters_visible = !self.parameters_visible;
        if self.parameters_visible {
            let form = self.form.clone();
            self.log(&format!("Service URL: {}", form.url));
            self.log(&format!("Workspace: {}", form.workspace));
            self.log(&format!("Layer: {}", form.layer));
            self.log(&format!("Coverage: {}", form.coverage));
        }
    }

    /// Snapshot the form and issue a new request generation.
    pub fn request(&mut self, format: ModelFormat) -> Out {
        let parameters: RequestParameters = self
            .form
            .collate([(RequestParameters::MIME_TYPE, format.mime_type())]);
        self.generation += 1;
        self.log(&format!("Loading {} model...", format.label()));
        Out::Load(ModelRequest {
            generation: self.generation,
            format,
            template_url: self.template_url.clone(),
            parameters,
        })
    }

    /// Advance the render mode and restyle the active model, if any.
    pub fn cycle_render_mode(&mut self) {
        self.render_mode = self.render_mode.next();
        let (wireframe, point) = self.render_mode.flags();
        let mut objects = self.engine.get_scene_objects_mut(&self.modifier.name);
        if objects.is_empty() {
            return;
        }
        for object in objects.iter_mut() {
            object.mesh.set_wireframe(wireframe);
            object.mesh.set_point_mode(point);
        }
        let message = format!("Rendering mode set to {}.", self.render_mode);
        self.log(&message);
    }

    /// Status line from an in-flight request. Dropped if the request is stale.
    pub fn on_status(&mut self, generation: u64, message: &str) {
        if generation == self.generation {
            self.log(message);
        }
    }

    /// Apply the result of a model request to the scene.
    ///
    /// Only the most recent request may touch the scene; older outcomes are
    /// dropped. Failures are logged and leave the scene as it was.
    pub fn apply_outcome(&mut self, outcome: LoadOutcome) {
        if outcome.generation != self.generation {
            log::debug!(
                "Discarding {} response for request {} (latest is {})",
                outcome.format.label(),
                outcome.generation,
                self.generation
            );
            return;
        }
        match outcome.result {
            Ok(response) => {
                if let Err(e) = self.bind_response(response) {
                    log::error!("{:#}", e);
                    self.log(&format!("Could not build a scene object: {:#}", e));
                    return;
                }
                log::info!(
                    "{} model request {} finished in {:?}",
                    outcome.format.label(),
                    outcome.generation,
                    outcome.elapsed
                );
            }
            Err(e) => {
                log::error!("{}", e);
                self.log(&e.to_string());
            }
        }
    }

    fn bind_response(&mut self, response: ParsedResponse) -> anyhow::Result<()> {
        self.log("Generating scene object from model...");
        let meshes = match &response {
            ParsedResponse::Json(document) => vec![self.engine.mesh_from_json(document)?],
            ParsedResponse::Xml(document) => self.engine.load_collada(document)?,
        };
        if meshes.is_empty() {
            log::warn!("Model response contained no scene objects");
            self.log("Model response contained no scene objects.");
            return Ok(());
        }

        let removed = self.engine.remove_scene_objects(&self.modifier.name);
        log::debug!("Removed {} previous scene object(s)", removed);
        for mesh in meshes.iter() {
            let mesh = normalize_mesh(mesh);
            if let Some(bb) = mesh.bb {
                log::debug!("Model {} spans {:?}", mesh.name, bb.size());
            }
            let mut object = SceneObject::new(mesh);
            self.modifier.apply(&mut object);
            self.engine.bind_scene_object(object);
        }
        self.render_mode = RenderMode::Textured;
        self.log("Loading complete.");
        Ok(())
    }
}
