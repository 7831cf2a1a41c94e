//! Frame tree and relative-state walker
//!
//! Frames live in an arena owned by [`FrameTree`] and refer to each other by
//! [`FrameId`]. Each node stores its state relative to its parent and the
//! root-to-node path used to locate common ancestors. A single arena may hold
//! several disjoint trees; relative states are only defined within one tree.

use std::collections::HashMap;

use log::{debug, trace};
use nalgebra::Vector3;

use crate::framelib::errors::{FrameError, Result};
use crate::framelib::state::KinematicState;

/// Index of a frame within its [`FrameTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(usize);

impl FrameId {
    /// Position of the frame in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// Coordinate sense of a computed relative state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateExpression {
    /// S_wrt:this as produced by the composition algebra: position and velocity
    /// in `wrt` coordinates, rotation from `wrt` to `this`, rate in `this` coordinates
    #[default]
    InWrtFrame,
    /// Position and velocity re-expressed in `this` coordinates, rotation from
    /// `this` to `wrt`, rate in `wrt` coordinates
    InThisFrame,
}

#[derive(Debug, Clone)]
struct FrameNode {
    name: String,
    parent: Option<FrameId>,
    children: Vec<FrameId>,
    path: Vec<FrameId>,
    state: KinematicState,
}

/// Arena of reference frames linked into trees
#[derive(Debug, Clone, Default)]
pub struct FrameTree {
    nodes: Vec<FrameNode>,
    names: HashMap<String, FrameId>,
}

impl FrameTree {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no frames
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a frame with no parent, starting a new tree
    pub fn add_root(&mut self, name: &str) -> Result<FrameId> {
        self.insert(name, None, KinematicState::identity())
    }

    /// Add a frame below `parent` with the given state relative to it
    pub fn add_child(
        &mut self,
        parent: FrameId,
        name: &str,
        state: KinematicState,
    ) -> Result<FrameId> {
        self.node(parent)?;
        self.insert(name, Some(parent), state)
    }

    fn insert(
        &mut self,
        name: &str,
        parent: Option<FrameId>,
        state: KinematicState,
    ) -> Result<FrameId> {
        if self.names.contains_key(name) {
            return Err(FrameError::DuplicateName(name.to_string()));
        }

        let id = FrameId(self.nodes.len());
        let mut path = match parent {
            Some(p) => self.nodes[p.0].path.clone(),
            None => Vec::new(),
        };
        path.push(id);

        self.nodes.push(FrameNode {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            path,
            state,
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        self.names.insert(name.to_string(), id);

        debug!("Added frame '{}' (depth {})", name, self.nodes[id.0].path.len() - 1);
        Ok(id)
    }

    /// Detach a frame from its parent, making it the root of its own tree
    ///
    /// The frame's descendants stay attached to it. Its state is reset to
    /// identity since a root has nothing to be relative to.
    pub fn unlink(&mut self, id: FrameId) -> Result<()> {
        let parent = self.node(id)?.parent;
        let Some(parent) = parent else {
            return Ok(());
        };

        self.nodes[parent.0].children.retain(|&child| child != id);
        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.state.set_identity();
        node.path = vec![id];

        // Rebuild descendant paths below the new root
        let mut pending: Vec<(FrameId, FrameId)> = self.nodes[id.0]
            .children
            .iter()
            .map(|&child| (id, child))
            .collect();
        while let Some((parent, child)) = pending.pop() {
            let mut path = self.nodes[parent.0].path.clone();
            path.push(child);
            self.nodes[child.0].path = path;
            pending.extend(self.nodes[child.0].children.iter().map(|&c| (child, c)));
        }

        debug!("Unlinked frame '{}'", self.nodes[id.0].name);
        Ok(())
    }

    /// Look up a frame by name
    pub fn find(&self, name: &str) -> Option<FrameId> {
        self.names.get(name).copied()
    }

    /// Name of a frame
    pub fn name(&self, id: FrameId) -> Result<&str> {
        Ok(&self.node(id)?.name)
    }

    /// Parent of a frame, `None` for a root
    pub fn parent(&self, id: FrameId) -> Result<Option<FrameId>> {
        Ok(self.node(id)?.parent)
    }

    /// Immediate children of a frame
    pub fn children(&self, id: FrameId) -> Result<&[FrameId]> {
        Ok(&self.node(id)?.children)
    }

    /// Root-to-frame path, inclusive at both ends
    pub fn path(&self, id: FrameId) -> Result<&[FrameId]> {
        Ok(&self.node(id)?.path)
    }

    /// State of a frame relative to its parent
    pub fn state(&self, id: FrameId) -> Result<&KinematicState> {
        Ok(&self.node(id)?.state)
    }

    /// Mutable state of a frame relative to its parent
    pub fn state_mut(&mut self, id: FrameId) -> Result<&mut KinematicState> {
        self.nodes
            .get_mut(id.0)
            .map(|node| &mut node.state)
            .ok_or(FrameError::UnknownFrame(id.0))
    }

    fn node(&self, id: FrameId) -> Result<&FrameNode> {
        self.nodes.get(id.0).ok_or(FrameError::UnknownFrame(id.0))
    }

    fn invalid_node(&self, subject: FrameId, target: FrameId, reason: &str) -> FrameError {
        FrameError::InvalidNode {
            subject: self.nodes[subject.0].name.clone(),
            target: self.nodes[target.0].name.clone(),
            reason: reason.to_string(),
        }
    }

    /// Depth of the deepest frame shared by the root paths of `a` and `b`
    ///
    /// Returns `None` when the frames belong to different trees.
    pub fn find_last_common_index(&self, a: FrameId, b: FrameId) -> Result<Option<usize>> {
        let path_a = self.path(a)?;
        let path_b = self.path(b)?;
        Ok(path_a
            .iter()
            .zip(path_b)
            .take_while(|(x, y)| x == y)
            .count()
            .checked_sub(1))
    }

    /// Whether `pred` lies on the path from the root to `id` (a frame is its own predecessor)
    pub fn is_predecessor(&self, pred: FrameId, id: FrameId) -> Result<bool> {
        let depth = self.path(pred)?.len() - 1;
        Ok(self.path(id)?.get(depth) == Some(&pred))
    }

    /// State of `this` relative to one of its predecessors, S_pred:this
    ///
    /// # Errors
    ///
    /// [`FrameError::InvalidNode`] if `pred` is not a predecessor of `this`.
    pub fn compute_state_wrt_pred(&self, this: FrameId, pred: FrameId) -> Result<KinematicState> {
        if !self.is_predecessor(pred, this)? {
            return Err(self.invalid_node(this, pred, "target is not a predecessor"));
        }

        let path = self.path(this)?;
        let pred_depth = self.path(pred)?.len() - 1;
        Ok(self.accumulate_up(path, pred_depth))
    }

    /// S_path[depth]:path[last] by walking up the path with `incr_left`
    fn accumulate_up(&self, path: &[FrameId], depth: usize) -> KinematicState {
        let last = path.len() - 1;
        if last == depth {
            return KinematicState::identity();
        }

        let mut state = self.nodes[path[last].0].state;
        for &link in path[depth + 1..last].iter().rev() {
            trace!("incr_left over '{}'", self.nodes[link.0].name);
            state.incr_left(&self.nodes[link.0].state);
        }
        state
    }

    /// State of `this` relative to one of its descendants, S_wrt:this
    ///
    /// Walks up from `wrt` to `this` and negates the result.
    ///
    /// # Errors
    ///
    /// [`FrameError::InvalidNode`] if `this` is not a predecessor of `wrt`.
    pub fn compute_pred_rel_state(&self, this: FrameId, wrt: FrameId) -> Result<KinematicState> {
        if !self.is_predecessor(this, wrt)? {
            return Err(self.invalid_node(this, wrt, "subject is not a predecessor of the target"));
        }
        let down = self.compute_state_wrt_pred(wrt, this)?;
        Ok(down.negated())
    }

    /// State of `this` relative to `wrt`, S_wrt:this
    ///
    /// # Errors
    ///
    /// [`FrameError::InvalidNode`] if the frames are in different trees.
    pub fn compute_relative_state(&self, this: FrameId, wrt: FrameId) -> Result<KinematicState> {
        let common = self
            .find_last_common_index(this, wrt)?
            .ok_or_else(|| self.invalid_node(this, wrt, "frames are not in the same tree"))?;

        let path_this = self.path(this)?;
        let path_wrt = self.path(wrt)?;
        let this_depth = path_this.len() - 1;
        let wrt_depth = path_wrt.len() - 1;

        if this == wrt {
            return Ok(KinematicState::identity());
        }
        if common == wrt_depth {
            trace!(
                "'{}' is a predecessor of '{}'",
                self.nodes[wrt.0].name,
                self.nodes[this.0].name
            );
            return Ok(self.accumulate_up(path_this, wrt_depth));
        }
        if common == this_depth {
            trace!(
                "'{}' is a predecessor of '{}'",
                self.nodes[this.0].name,
                self.nodes[wrt.0].name
            );
            return Ok(self.accumulate_up(path_wrt, this_depth).negated());
        }

        // Up to the common ancestor, then back down to wrt
        let mut state = self.accumulate_up(path_this, common);
        for &link in &path_wrt[common + 1..] {
            trace!("decr_left over '{}'", self.nodes[link.0].name);
            state.decr_left(&self.nodes[link.0].state);
        }
        Ok(state)
    }

    /// Relative state with a selectable coordinate sense
    pub fn compute_relative_state_as(
        &self,
        this: FrameId,
        wrt: FrameId,
        expression: StateExpression,
    ) -> Result<KinematicState> {
        let mut state = self.compute_relative_state(this, wrt)?;
        if expression == StateExpression::InThisFrame {
            state.reverse_sense();
        }
        Ok(state)
    }

    /// Position of `this` relative to `wrt`, in `wrt` coordinates
    ///
    /// Skips everything but the position chain of the full state walk.
    ///
    /// # Errors
    ///
    /// [`FrameError::InvalidNode`] if the frames are in different trees.
    pub fn compute_position_from(&self, this: FrameId, wrt: FrameId) -> Result<Vector3<f64>> {
        let common = self
            .find_last_common_index(this, wrt)?
            .ok_or_else(|| self.invalid_node(this, wrt, "frames are not in the same tree"))?;

        let path_this = self.path(this)?;
        let path_wrt = self.path(wrt)?;

        let mut position = Vector3::zeros();
        for &link in path_this[common + 1..].iter().rev() {
            let state = &self.nodes[link.0].state;
            if !state.rot.is_identity() {
                position = state.rot.t_parent_this().transpose() * position;
            }
            position += state.trans.position;
        }

        for &link in &path_wrt[common + 1..] {
            let state = &self.nodes[link.0].state;
            position -= state.trans.position;
            if !state.rot.is_identity() {
                position = state.rot.t_parent_this() * position;
            }
        }

        Ok(position)
    }
}
