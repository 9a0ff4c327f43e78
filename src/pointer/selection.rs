//! Click detection from fingertip penetration depth
//!
//! The index tip "clicks" by pushing into the fitted sphere. Two thresholds
//! form a dead zone so depth hovering near one value cannot chatter:
//!
//! ```text
//! Released --(depth > select_depth)--> Selected
//! Selected --(depth < release_depth)--> Released
//! ```

use tracing::trace;

/// Depth (meters) the tip must penetrate to select
pub const DEFAULT_SELECT_DEPTH: f32 = 0.007;
/// Depth (meters) the tip must retract to to release
pub const DEFAULT_RELEASE_DEPTH: f32 = 0.005;

/// Selection state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Released,
    Selected,
}

/// One-frame edge produced by a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionEdge {
    Pressed,
    Released,
}

/// Hysteretic click detector
#[derive(Clone, Debug)]
pub struct SelectionStateMachine {
    select_depth: f32,
    release_depth: f32,
    state: SelectionState,
    /// Edge of the most recent update, cleared on the next one
    edge: Option<SelectionEdge>,
}

impl SelectionStateMachine {
    /// `release_depth` should be below `select_depth`; config validation
    /// enforces that before a pipeline is built.
    pub fn new(select_depth: f32, release_depth: f32) -> Self {
        Self {
            select_depth,
            release_depth,
            state: SelectionState::Released,
            edge: None,
        }
    }

    /// Feed this frame's depth. At most one transition per call.
    pub fn update(&mut self, depth: f32) -> Option<SelectionEdge> {
        self.edge = match self.state {
            SelectionState::Released if depth > self.select_depth => {
                self.state = SelectionState::Selected;
                Some(SelectionEdge::Pressed)
            }
            SelectionState::Selected if depth < self.release_depth => {
                self.state = SelectionState::Released;
                Some(SelectionEdge::Released)
            }
            _ => None,
        };
        if let Some(edge) = self.edge {
            trace!(?edge, depth, "selection edge");
        }
        self.edge
    }

    /// Drop this frame's edge without evaluating a depth
    pub fn clear_edge(&mut self) {
        self.edge = None;
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_selected(&self) -> bool {
        self.state == SelectionState::Selected
    }

    pub fn just_pressed(&self) -> bool {
        self.edge == Some(SelectionEdge::Pressed)
    }

    pub fn just_released(&self) -> bool {
        self.edge == Some(SelectionEdge::Released)
    }

    pub fn thresholds(&self) -> (f32, f32) {
        (self.select_depth, self.release_depth)
    }

    pub fn reset(&mut self) {
        self.state = SelectionState::Released;
        self.edge = None;
    }
}

impl Default for SelectionStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_SELECT_DEPTH, DEFAULT_RELEASE_DEPTH)
    }
}
