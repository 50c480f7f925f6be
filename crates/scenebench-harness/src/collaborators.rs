//! External collaborators: the scene editor under test and the renderer
//!
//! Both are traits so the runner can be driven by a live agent, by
//! responses recorded offline ([`ReplayEditor`]), or by the ground truth
//! itself ([`OracleEditor`]) when checking the harness.

use scenebench_generator::TestCase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{HarnessError, Result};

/// Render fidelity requested from the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderQuality {
    Preview,
    #[default]
    Verification,
    Final,
}

/// Fixed camera placements around the scene origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraAngle {
    Perspective,
    Front,
    Top,
    Side,
}

impl CameraAngle {
    pub const ALL: [Self; 4] = [Self::Perspective, Self::Front, Self::Top, Self::Side];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Perspective => "perspective",
            Self::Front => "front",
            Self::Top => "top",
            Self::Side => "side",
        }
    }
}

impl fmt::Display for CameraAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraAngle {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|angle| angle.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| HarnessError::config(format!("unknown camera angle: {s}")))
    }
}

/// Encoded image produced by a [`Renderer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Render {
    pub bytes: Vec<u8>,
    pub render_time: Duration,
}

/// Turns scene text into an encoded image (PNG, JPEG, ...)
pub trait Renderer: Send + Sync {
    fn name(&self) -> &str;

    fn render(&self, scene_text: &str, quality: RenderQuality, angle: CameraAngle)
        -> Result<Render>;
}

/// What the editor returned for one case
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorOutput {
    pub scene_text: String,
    /// Renders the editor produced itself, if any
    pub renders: BTreeMap<CameraAngle, Vec<u8>>,
}

impl EditorOutput {
    #[must_use]
    pub fn new(scene_text: impl Into<String>) -> Self {
        Self {
            scene_text: scene_text.into(),
            renders: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_render(mut self, angle: CameraAngle, bytes: Vec<u8>) -> Self {
        self.renders.insert(angle, bytes);
        self
    }
}

/// The instruction-following system under evaluation
///
/// An editor that stands for a real agent must only read `prompt` and
/// `initial_usd` from the case; the rest is ground truth.
pub trait SceneEditor: Send + Sync {
    fn name(&self) -> &str;

    fn edit(&self, case: &TestCase) -> Result<EditorOutput>;
}

/// Replays responses recorded offline
///
/// Expects `<dir>/<case_id>.usda` for the edited scene and, optionally,
/// `<dir>/<case_id>_<angle>.png` for renders made by the editor.
#[derive(Debug, Clone)]
pub struct ReplayEditor {
    dir: PathBuf,
}

impl ReplayEditor {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn scene_path(&self, case_id: &str) -> PathBuf {
        self.dir.join(format!("{case_id}.usda"))
    }

    #[must_use]
    pub fn render_path(&self, case_id: &str, angle: CameraAngle) -> PathBuf {
        self.dir.join(format!("{case_id}_{angle}.png"))
    }
}

impl SceneEditor for ReplayEditor {
    fn name(&self) -> &str {
        "replay"
    }

    fn edit(&self, case: &TestCase) -> Result<EditorOutput> {
        let path = self.scene_path(&case.id);
        let scene_text = std::fs::read_to_string(&path).map_err(|e| {
            HarnessError::editor(&case.id, format!("no response at {}: {e}", path.display()))
        })?;
        if scene_text.trim().is_empty() {
            return Err(HarnessError::editor(&case.id, "empty response"));
        }

        let mut output = EditorOutput::new(scene_text);
        for angle in CameraAngle::ALL {
            let render = self.render_path(&case.id, angle);
            if let Ok(bytes) = std::fs::read(&render) {
                output.renders.insert(angle, bytes);
            }
        }
        Ok(output)
    }
}

/// Answers every case with its ground truth
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleEditor;

impl SceneEditor for OracleEditor {
    fn name(&self) -> &str {
        "oracle"
    }

    fn edit(&self, case: &TestCase) -> Result<EditorOutput> {
        Ok(EditorOutput::new(case.target_usd.clone()))
    }
}
