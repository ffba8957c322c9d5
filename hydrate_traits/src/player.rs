use serde::Serialize;
use std::fmt;

/// Status-light behaviour under the bottle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LightMode {
    /// Steady light; bottle sits on the dock.
    Solid,
    /// Pulsing light; bottle is lifted.
    Breath,
}

impl LightMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LightMode::Solid => "solid",
            LightMode::Breath => "breath",
        }
    }
}

impl fmt::Display for LightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Playback capability for the fill animation and the dock light.
///
/// `play` receives a frame range and is expected to animate through it;
/// `set_light` switches the light immediately and must not disturb an
/// animation that is still running.
pub trait AnimationPlayer {
    fn play(
        &mut self,
        start_frame: u32,
        end_frame: u32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    fn set_light(
        &mut self,
        _mode: LightMode,
        _color: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
