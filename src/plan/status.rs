//! The two status vocabularies.
//!
//! Batch (schedule) and interactive (progress) plans use different closed
//! label sets. They are deliberately not unified into one enum; each mode's
//! operations only ever see their own domain. What the domains share is one
//! severity scale, worst first:
//!
//!   overdue / behind (4) > at risk (3) > on track (2) > ahead (1)
//!     > complete / completed (0)

use serde::Serialize;

/// Contract shared by both status domains.
pub trait StatusDomain: Copy + Eq + std::fmt::Debug + Serialize {
    /// Every canonical label, severity order (worst first). Used to spell
    /// out the accepted set in domain errors.
    const LABELS: &'static [&'static str];

    /// Case-insensitive parse of a sheet or CLI label.
    fn parse(text: &str) -> Option<Self>;

    /// Canonical lowercase label.
    fn label(self) -> &'static str;

    /// Position on the shared severity scale; higher is worse.
    fn severity(self) -> u8;
}

/// Sheet-of-record statuses, recomputed by the batch deriver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScheduleStatus {
    #[serde(rename = "overdue")]
    Overdue,
    #[serde(rename = "at risk")]
    AtRisk,
    #[serde(rename = "on track")]
    OnTrack,
    #[serde(rename = "complete")]
    Complete,
}

impl StatusDomain for ScheduleStatus {
    const LABELS: &'static [&'static str] = &["overdue", "at risk", "on track", "complete"];

    fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "overdue" => Some(Self::Overdue),
            "at risk" => Some(Self::AtRisk),
            "on track" => Some(Self::OnTrack),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::AtRisk => "at risk",
            Self::OnTrack => "on track",
            Self::Complete => "complete",
        }
    }

    fn severity(self) -> u8 {
        match self {
            Self::Overdue => 4,
            Self::AtRisk => 3,
            Self::OnTrack => 2,
            Self::Complete => 0,
        }
    }
}

/// Interactive-mode statuses, driven by manual edits and propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressStatus {
    #[serde(rename = "behind")]
    Behind,
    #[serde(rename = "on track")]
    OnTrack,
    #[serde(rename = "ahead")]
    Ahead,
    #[serde(rename = "completed")]
    Completed,
}

impl StatusDomain for ProgressStatus {
    const LABELS: &'static [&'static str] = &["behind", "on track", "ahead", "completed"];

    fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "behind" => Some(Self::Behind),
            "on track" => Some(Self::OnTrack),
            "ahead" => Some(Self::Ahead),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Behind => "behind",
            Self::OnTrack => "on track",
            Self::Ahead => "ahead",
            Self::Completed => "completed",
        }
    }

    fn severity(self) -> u8 {
        match self {
            Self::Behind => 4,
            Self::OnTrack => 2,
            Self::Ahead => 1,
            Self::Completed => 0,
        }
    }
}
