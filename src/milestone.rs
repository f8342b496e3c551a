//! Pipeline progress reporting.
//!
//! The pipeline announces what it finished through [`Observer`] instead of
//! printing directly, so the CLI logs and tests record.

use crate::log;
use std::path::PathBuf;

/// Something the pipeline just completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Milestone {
    /// All template directories were inlined.
    PagesAssembled { keys: Vec<String> },
    /// The bundler returned its output.
    Bundled { bundler: String, bytes: usize },
    /// Full-width punctuation was normalized.
    Sanitized { replaced: usize },
    /// One destination was written.
    Written {
        path: PathBuf,
        bytes: usize,
        fingerprint: String,
    },
}

pub trait Observer {
    fn notify(&mut self, milestone: &Milestone);
}

impl<F: FnMut(&Milestone)> Observer for F {
    fn notify(&mut self, milestone: &Milestone) {
        self(milestone)
    }
}

/// Prints milestones with `log!`.
#[derive(Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn notify(&mut self, milestone: &Milestone) {
        match milestone {
            Milestone::PagesAssembled { keys } if keys.is_empty() => {
                log!("pages"; "no templates found, every page define is empty");
            }
            Milestone::PagesAssembled { keys } => {
                log!("pages"; "assembled {} page(s): {}", keys.len(), keys.join(", "));
            }
            Milestone::Bundled { bundler, bytes } => {
                log!("bundle"; "built worker with {bundler} ({})", human_size(*bytes));
            }
            Milestone::Sanitized { replaced: 0 } => {
                log!("clean"; "no full-width punctuation found");
            }
            Milestone::Sanitized { replaced } => {
                log!("clean"; "replaced {replaced} full-width punctuation mark(s)");
            }
            Milestone::Written {
                path,
                bytes,
                fingerprint,
            } => {
                log!("write"; "{} ({}, {fingerprint})", path.display(), human_size(*bytes));
            }
        }
    }
}

/// Collects milestones in order.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct Recorder {
    pub milestones: Vec<Milestone>,
}

#[cfg(test)]
impl Observer for Recorder {
    fn notify(&mut self, milestone: &Milestone) {
        self.milestones.push(milestone.clone());
    }
}

/// Format a byte count as `B`, `KB` or `MB`.
fn human_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * 1024;
    match bytes {
        b if b >= MB => format!("{:.1}MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1}KB", b as f64 / KB as f64),
        b => format!("{b}B"),
    }
}
