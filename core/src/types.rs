//! Watch type definitions
//!
//! Core value and snapshot types shared by the refresh and aggregation steps.

use std::fmt;

use glam::{Vec2, Vec3};

use crate::world::ObjectRef;

/// Placeholder shown before an entry is sampled for the first time
pub const UNSAMPLED: &str = "-";

/// Value shown for an entry whose getter failed
pub const ERROR_SENTINEL: &str = "<error>";

/// Runtime value produced by a watch getter
#[derive(Debug, Clone, Default)]
pub enum WatchValue {
    /// Absent value
    #[default]
    Null,
    Text(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    F32(f32),
    F64(f64),
    Vec2(Vec2),
    Vec3(Vec3),
    /// Reference to a destructible, named world object
    Object(ObjectRef),
    /// Pre-rendered default string form of a foreign value
    Display(String),
    /// Value with no string form
    Opaque,
}

impl WatchValue {
    /// Capture the default string form of any displayable value
    pub fn display(value: &impl fmt::Display) -> Self {
        WatchValue::Display(value.to_string())
    }

    /// Whether this is the absent value
    pub fn is_null(&self) -> bool {
        matches!(self, WatchValue::Null)
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for WatchValue {
                fn from(v: $ty) -> Self {
                    WatchValue::$variant(v as $target)
                }
            }
        )*
    };
}

impl_from! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    isize => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    usize => UInt as u64,
    f32 => F32 as f32,
    f64 => F64 as f64,
}

impl From<bool> for WatchValue {
    fn from(v: bool) -> Self {
        WatchValue::Bool(v)
    }
}

impl From<String> for WatchValue {
    fn from(v: String) -> Self {
        WatchValue::Text(v)
    }
}

impl From<&str> for WatchValue {
    fn from(v: &str) -> Self {
        WatchValue::Text(v.to_string())
    }
}

impl From<Vec2> for WatchValue {
    fn from(v: Vec2) -> Self {
        WatchValue::Vec2(v)
    }
}

impl From<Vec3> for WatchValue {
    fn from(v: Vec3) -> Self {
        WatchValue::Vec3(v)
    }
}

impl From<ObjectRef> for WatchValue {
    fn from(v: ObjectRef) -> Self {
        WatchValue::Object(v)
    }
}

impl<T: Into<WatchValue>> From<Option<T>> for WatchValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(WatchValue::Null, Into::into)
    }
}

/// Cached display state for one accessor entry of a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryState {
    /// Last formatted value
    pub last_value: String,
    /// Whether the last sample failed
    pub had_error: bool,
}

impl Default for EntryState {
    fn default() -> Self {
        Self {
            last_value: UNSAMPLED.to_string(),
            had_error: false,
        }
    }
}

impl EntryState {
    /// Record a successful sample
    pub(crate) fn set_value(&mut self, value: String) {
        self.last_value = value;
        self.had_error = false;
    }

    /// Record a failed sample
    pub(crate) fn set_error(&mut self) {
        self.last_value.clear();
        self.last_value.push_str(ERROR_SENTINEL);
        self.had_error = true;
    }
}

/// One labeled line of the overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLine {
    pub label: String,
    pub value: String,
    pub had_error: bool,
}

impl OverlayLine {
    pub fn new(label: impl Into<String>, value: impl Into<String>, had_error: bool) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            had_error,
        }
    }
}

/// A named overlay section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayGroup {
    pub name: String,
    pub lines: Vec<OverlayLine>,
}

/// Grouped, deterministically ordered overlay contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlaySnapshot {
    /// Groups sorted by name (byte-wise)
    pub groups: Vec<OverlayGroup>,
}

impl OverlaySnapshot {
    /// Check if the snapshot has no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Find a group by name
    pub fn group(&self, name: &str) -> Option<&OverlayGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Total number of lines across all groups
    pub fn line_count(&self) -> usize {
        self.groups.iter().map(|g| g.lines.len()).sum()
    }
}
