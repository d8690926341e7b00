//! Target-point roles and interaction states

use serde::{Deserialize, Serialize};

/// Which of the two target markers a value refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRole {
    A,
    B,
}

impl TargetRole {
    /// Both roles, in fixed order
    pub const ALL: [TargetRole; 2] = [TargetRole::A, TargetRole::B];

    /// Array index for per-role storage
    pub fn index(self) -> usize {
        match self {
            TargetRole::A => 0,
            TargetRole::B => 1,
        }
    }

    /// Single-letter label drawn next to the marker icon
    pub fn label(self) -> &'static str {
        match self {
            TargetRole::A => "A",
            TargetRole::B => "B",
        }
    }
}

/// Interaction state of one target marker
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetState {
    /// No position placed
    #[default]
    Unset,
    /// Placed and inert
    Locked,
    /// Placed and selected for nudging or deletion
    Selected,
    /// Being moved by an active pointer drag
    Dragging,
}

impl TargetState {
    /// Whether a position exists in this state
    pub fn is_set(self) -> bool {
        !matches!(self, TargetState::Unset)
    }

    /// Whether this state holds the instance-wide selection
    pub fn is_active(self) -> bool {
        matches!(self, TargetState::Selected | TargetState::Dragging)
    }
}
