//! # Status Presenter
//!
//! Status → label and style class for rendering.

use crate::LifecycleStatus;
use serde::Serialize;

/// How a status is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusPresentation {
    /// Human-readable label.
    pub label: &'static str,
    /// CSS class of the status tag.
    pub style_class: &'static str,
    /// Short badge next to the OS name, for statuses that need attention.
    pub indicator: Option<&'static str>,
}

/// Presentation of a status.
#[must_use]
pub fn present(status: LifecycleStatus) -> StatusPresentation {
    match status {
        LifecycleStatus::Supported => StatusPresentation {
            label: "Supported",
            style_class: "os-tag-supported",
            indicator: None,
        },
        LifecycleStatus::ExtendedSupport => StatusPresentation {
            label: "Extended Support",
            style_class: "os-tag-els",
            indicator: Some("ELS"),
        },
        LifecycleStatus::EndOfLife => StatusPresentation {
            label: "End of Life",
            style_class: "os-tag-eol",
            indicator: Some("EOL"),
        },
        LifecycleStatus::Unknown => StatusPresentation {
            label: "Unknown Status",
            style_class: "os-tag-unknown",
            indicator: None,
        },
    }
}
