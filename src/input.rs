//! Keyboard commands and the render mode they cycle through.

use std::fmt;

use winit::keyboard::KeyCode;

/// Everything the keyboard can ask the viewer to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    ToggleParameters,
    LoadJson,
    LoadCollada,
    CycleRenderMode,
}

impl Command {
    pub fn description(&self) -> &'static str {
        match self {
            Command::ToggleParameters => "toggle request parameters",
            Command::LoadJson => "load JSON model",
            Command::LoadCollada => "load COLLADA model",
            Command::CycleRenderMode => "cycle rendering modes",
        }
    }
}

/// Key to command table. The first binding for a key wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBindings {
    bindings: Vec<(KeyCode, Command)>,
}

impl KeyBindings {
    pub fn new(bindings: impl IntoIterator<Item = (KeyCode, Command)>) -> Self {
        Self {
            bindings: bindings.into_iter().collect(),
        }
    }

    pub fn dispatch(&self, key: KeyCode) -> Option<Command> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, command)| *command)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(KeyCode, Command)> {
        self.bindings.iter()
    }

    /// Rebind `command` to `key`, dropping its previous keys.
    pub fn rebind(&mut self, key: KeyCode, command: Command) {
        self.bindings.retain(|(k, c)| *c != command && *k != key);
        self.bindings.push((key, command));
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new([
            (KeyCode::KeyP, Command::ToggleParameters),
            (KeyCode::KeyJ, Command::LoadJson),
            (KeyCode::KeyC, Command::LoadCollada),
            (KeyCode::Space, Command::CycleRenderMode),
        ])
    }
}

/// Human readable key name for console hints.
pub fn key_label(key: KeyCode) -> String {
    match key {
        KeyCode::Space => "SPACE".to_string(),
        other => {
            let name = format!("{other:?}");
            name.strip_prefix("Key")
                .or_else(|| name.strip_prefix("Digit"))
                .unwrap_or(&name)
                .to_uppercase()
        }
    }
}

/// How the active model is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    Textured,
    Wireframe,
    Point,
}

impl RenderMode {
    pub const ALL: [RenderMode; 3] = [
        RenderMode::Textured,
        RenderMode::Wireframe,
        RenderMode::Point,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// `(wireframe, point)` flags for this mode.
    pub fn flags(self) -> (bool, bool) {
        match self {
            RenderMode::Textured => (false, false),
            RenderMode::Wireframe => (true, false),
            RenderMode::Point => (false, true),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderMode::Textured => "TEXTURED",
            RenderMode::Wireframe => "WIREFRAME",
            RenderMode::Point => "POINT",
        })
    }
}
