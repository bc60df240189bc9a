//! Scripted user sessions, replayed against a [`Page`].
//!
//! A session is a JSON document listing steps:
//!
//! ```json
//! { "steps": [
//!     { "action": "scroll", "y": 900 },
//!     { "action": "wait", "ms": 2100 },
//!     { "action": "click", "selector": ".accordion-header", "index": 1 }
//! ] }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use vista_dom::{DomError, NodeId};

use crate::page::Page;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read session script '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid session script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error("step {step}: no element matches '{selector}'")]
    NoMatch { step: usize, selector: String },
    #[error("step {step}: '{selector}' matched {count} element(s); index {index} is out of range")]
    IndexOutOfRange {
        step: usize,
        selector: String,
        index: usize,
        count: usize,
    },
}

fn default_checked() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionStep {
    Scroll {
        y: f64,
    },
    Click {
        selector: String,
        #[serde(default)]
        index: usize,
    },
    Submit {
        selector: String,
    },
    Input {
        selector: String,
        value: String,
    },
    Check {
        selector: String,
        #[serde(default = "default_checked")]
        checked: bool,
    },
    /// Pointer at `(x, y)` relative to the element's top-left corner.
    Hover {
        selector: String,
        x: f64,
        y: f64,
    },
    Leave {
        selector: String,
    },
    Focus {
        selector: String,
    },
    Blur {
        selector: String,
    },
    Resize {
        width: f64,
        height: f64,
    },
    Wait {
        ms: u64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub steps: Vec<SessionStep>,
}

impl Session {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub steps: usize,
    pub ended_at_ms: u64,
    pub mutations: usize,
}

/// Replay `session`, settling the page after every step.
pub fn run_session(page: &mut Page, session: &Session) -> Result<SessionReport, ScriptError> {
    for (step, action) in session.steps.iter().enumerate() {
        debug!(step, ?action, "session step");
        run_step(page, step, action)?;
        page.settle();
    }
    let report = SessionReport {
        steps: session.steps.len(),
        ended_at_ms: page.now(),
        mutations: page.document().journal().len(),
    };
    info!(
        steps = report.steps,
        ended_at_ms = report.ended_at_ms,
        mutations = report.mutations,
        "session finished"
    );
    Ok(report)
}

fn run_step(page: &mut Page, step: usize, action: &SessionStep) -> Result<(), ScriptError> {
    match action {
        SessionStep::Scroll { y } => {
            page.scroll(*y);
        }
        SessionStep::Click { selector, index } => {
            let node = resolve(page, step, selector, *index)?;
            page.click(node);
        }
        SessionStep::Submit { selector } => {
            let node = resolve(page, step, selector, 0)?;
            page.submit(node);
        }
        SessionStep::Input { selector, value } => {
            let node = resolve(page, step, selector, 0)?;
            page.input(node, value);
        }
        SessionStep::Check { selector, checked } => {
            let node = resolve(page, step, selector, 0)?;
            page.set_checked(node, *checked);
        }
        SessionStep::Hover { selector, x, y } => {
            let node = resolve(page, step, selector, 0)?;
            let geometry = page.layout().geometry(node).unwrap_or_default();
            let (left, top, _, _) = page.viewport().client_rect(&geometry);
            page.hover(node, left + x, top + y);
        }
        SessionStep::Leave { selector } => {
            let node = resolve(page, step, selector, 0)?;
            page.leave(node);
        }
        SessionStep::Focus { selector } => {
            let node = resolve(page, step, selector, 0)?;
            page.focus(node);
        }
        SessionStep::Blur { selector } => {
            let node = resolve(page, step, selector, 0)?;
            page.blur(node);
        }
        SessionStep::Resize { width, height } => {
            page.resize(*width, *height);
        }
        SessionStep::Wait { ms } => page.advance(*ms),
    }
    Ok(())
}

fn resolve(page: &Page, step: usize, selector: &str, index: usize) -> Result<NodeId, ScriptError> {
    let matches = page.document().select(selector)?;
    if matches.is_empty() {
        return Err(ScriptError::NoMatch {
            step,
            selector: selector.to_string(),
        });
    }
    matches
        .get(index)
        .copied()
        .ok_or_else(|| ScriptError::IndexOutOfRange {
            step,
            selector: selector.to_string(),
            index,
            count: matches.len(),
        })
}
