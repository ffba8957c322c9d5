//! Prints animation and light instructions instead of driving a display.

use hydrate_traits::{AnimationPlayer, LightMode};
use serde_json::json;
use std::io::Write;

pub struct ConsolePlayer<W> {
    out: W,
    json: bool,
}

impl ConsolePlayer<std::io::Stdout> {
    pub fn stdout(json: bool) -> Self {
        Self::new(std::io::stdout(), json)
    }
}

impl<W: Write> ConsolePlayer<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AnimationPlayer for ConsolePlayer<W> {
    fn play(
        &mut self,
        start_frame: u32,
        end_frame: u32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.json {
            let line = json!({ "event": "play", "start": start_frame, "end": end_frame });
            writeln!(self.out, "{line}")?;
        } else {
            writeln!(self.out, "play   frames {start_frame:>3} -> {end_frame:>3}")?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn set_light(
        &mut self,
        mode: LightMode,
        color: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.json {
            let line = json!({ "event": "light", "mode": mode, "color": color });
            writeln!(self.out, "{line}")?;
        } else {
            writeln!(self.out, "light  {mode:<6} {color}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}
