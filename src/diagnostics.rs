//! Stderr reporting helpers shared by the CLI and the load pipeline.
//!
//! stdout carries command output (JSON, summaries); everything advisory goes
//! through here so pipelines stay clean.

/// Print a warning line.
pub fn warn(msg: impl AsRef<str>) {
    eprintln!("warning: {}", msg.as_ref());
}

/// Print a progress/report line.
pub fn note(msg: impl AsRef<str>) {
    eprintln!("{}", msg.as_ref());
}
