//! Watch annotations
//!
//! A [`WatchSpec`] marks a member as watchable and carries its display
//! metadata. It is pure data; all behavior lives in the plan builder.

/// Declarative marker attached to a watchable member
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSpec {
    /// Display label (falls back to the member name when blank)
    pub label: Option<String>,
    /// Overlay section (falls back to the owning type's name when blank)
    pub group: Option<String>,
    /// Sort key within a group
    pub order: i32,
    /// Format specifier applied to the sampled value
    pub format: Option<String>,
}

impl WatchSpec {
    /// Create an annotation with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the overlay group
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the sort order
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Set the format specifier (see [`crate::format`])
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Label to display for a member named `member`
    pub(crate) fn resolved_label(&self, member: &str) -> String {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label.to_string(),
            _ => member.to_string(),
        }
    }
}
