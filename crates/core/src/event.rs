//! Inspection events: what observers see of each loop step.
//!
//! Two shapes share one wire type:
//! - a log line: `{"message": "..."}`
//! - a trace record: `{"label": "...", "children": [{"label": "Content", "data": "..."}]}`
//!
//! Events are transient. They are streamed to an attached observer and
//! never stored.

use serde::{Deserialize, Serialize};

/// Label of one child inside a trace record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceLabel {
    Content,
    Reasoning,
    #[serde(rename = "Tool Calls")]
    ToolCalls,
}

impl TraceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "Content",
            Self::Reasoning => "Reasoning",
            Self::ToolCalls => "Tool Calls",
        }
    }
}

/// One labeled payload of a trace record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceChild {
    pub label: TraceLabel,
    pub data: String,
}

/// A single inspection event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InspectionEvent {
    /// A structured record of one loop step.
    Trace {
        label: String,
        children: Vec<TraceChild>,
    },
    /// A plain log line.
    Log { message: String },
}

impl InspectionEvent {
    pub fn log(message: impl Into<String>) -> Self {
        Self::Log {
            message: message.into(),
        }
    }

    pub fn trace(label: impl Into<String>) -> Self {
        Self::Trace {
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Append a child to a trace record. No-op on log lines.
    pub fn with_child(mut self, label: TraceLabel, data: impl Into<String>) -> Self {
        if let Self::Trace { children, .. } = &mut self {
            children.push(TraceChild {
                label,
                data: data.into(),
            });
        }
        self
    }

    /// The headline: the log message or the trace label.
    pub fn headline(&self) -> &str {
        match self {
            Self::Trace { label, .. } => label,
            Self::Log { message } => message,
        }
    }

    pub fn children(&self) -> &[TraceChild] {
        match self {
            Self::Trace { children, .. } => children,
            Self::Log { .. } => &[],
        }
    }

    /// Render as multi-line human-readable text.
    pub fn to_text(&self) -> String {
        let mut out = self.headline().to_string();
        for child in self.children() {
            out.push_str(&format!("\n[{}] {}", child.label.as_str(), child.data));
        }
        out
    }
}
