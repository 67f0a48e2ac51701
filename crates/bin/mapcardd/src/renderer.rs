//! Renderer writing each view as one JSON line.

use std::io::Write;

use serde::Serialize;

use mapcard_app::ports::MapRenderer;
use mapcard_domain::map::MapView;

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Line<'a> {
    Render(&'a MapView),
    FitMap,
}

/// [`MapRenderer`] emitting JSON lines to any writer.
pub struct JsonLinesRenderer<W> {
    out: W,
}

impl JsonLinesRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn emit(&mut self, line: &Line<'_>) {
        let result = serde_json::to_writer(&mut self.out, line)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(self.out))
            .and_then(|()| self.out.flush());
        if let Err(err) = result {
            tracing::error!(error = %err, "failed to write view");
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MapRenderer for JsonLinesRenderer<W> {
    fn render(&mut self, view: &MapView) {
        self.emit(&Line::Render(view));
    }

    fn fit_map(&mut self) {
        self.emit(&Line::FitMap);
    }
}
