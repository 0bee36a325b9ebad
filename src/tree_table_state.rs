use crate::gesture::Gesture;
use crate::sequence::Sequence;

/// Keeps the state of what is currently selected and how far the [`TreeTable`](crate::TreeTable) is scrolled.
///
/// The [`Sequence`] itself is not part of the state.
/// Methods which need to know the rows get the current sequence passed in.
/// Key handlers that want to collapse or expand return a [`Gesture`] which the caller applies with [`Sequence::apply`].
///
/// # Example
///
/// ```
/// # use tree_table::TreeTableState;
/// type Identifier = usize;
///
/// let mut state = TreeTableState::<Identifier>::default();
/// ```
#[derive(Debug, Clone)]
pub struct TreeTableState<Identifier> {
    pub(super) offset: usize,
    pub(super) selected: Option<Identifier>,
    pub(super) ensure_selected_in_view_on_next_render: bool,
}

impl<Identifier> Default for TreeTableState<Identifier> {
    fn default() -> Self {
        Self {
            offset: 0,
            selected: None,
            ensure_selected_in_view_on_next_render: false,
        }
    }
}

impl<Identifier> TreeTableState<Identifier>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug,
{
    #[must_use]
    pub const fn get_offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub const fn selected(&self) -> Option<&Identifier> {
        self.selected.as_ref()
    }

    /// Selects the given identifier.
    ///
    /// Returns `true` when the selection changed.
    ///
    /// Clear the selection by passing `None`:
    ///
    /// ```rust
    /// # use tree_table::TreeTableState;
    /// # let mut state = TreeTableState::<usize>::default();
    /// state.select(None);
    /// ```
    pub fn select(&mut self, identifier: Option<Identifier>) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        let changed = self.selected != identifier;
        self.selected = identifier;
        changed
    }

    /// Select the first node.
    ///
    /// Returns `true` when the selection changed.
    pub fn select_first<Fields>(&mut self, sequence: &Sequence<Identifier, Fields>) -> bool {
        let identifier = sequence.get(0).map(|node| node.id.clone());
        self.select(identifier)
    }

    /// Select the last visible node.
    ///
    /// Returns `true` when the selection changed.
    pub fn select_last<Fields>(&mut self, sequence: &Sequence<Identifier, Fields>) -> bool {
        let identifier = sequence.visible().last().map(|(_, node)| node.id.clone());
        self.select(identifier)
    }

    /// Select the node visible on the given index.
    ///
    /// Returns `true` when the selection changed.
    ///
    /// This can be useful for mouse clicks.
    pub fn select_visible_index<Fields>(
        &mut self,
        sequence: &Sequence<Identifier, Fields>,
        new_index: usize,
    ) -> bool {
        let visible = sequence.visible().collect::<Vec<_>>();
        let new_index = new_index.min(visible.len().saturating_sub(1));
        let identifier = visible.get(new_index).map(|(_, node)| node.id.clone());
        self.select(identifier)
    }

    /// Move the current selection with the direction/amount by the given function.
    ///
    /// Returns `true` when the selection changed.
    ///
    /// # Example
    ///
    /// ```
    /// # use tree_table::{Sequence, TreeTableState};
    /// # let sequence = Sequence::<usize, ()>::default();
    /// # let mut state = TreeTableState::<usize>::default();
    /// // Move the selection one down
    /// state.select_visible_relative(&sequence, |current| {
    ///     current.map_or(0, |current| current.saturating_add(1))
    /// });
    /// ```
    ///
    /// For more examples take a look into the source code of [`key_up`](Self::key_up) or [`key_down`](Self::key_down).
    /// They are implemented with this method.
    pub fn select_visible_relative<Fields, F>(
        &mut self,
        sequence: &Sequence<Identifier, Fields>,
        change_function: F,
    ) -> bool
    where
        F: FnOnce(Option<usize>) -> usize,
    {
        let visible = sequence.visible().collect::<Vec<_>>();
        let current_index = visible
            .iter()
            .position(|(_, node)| Some(&node.id) == self.selected.as_ref());
        let new_index = change_function(current_index).min(visible.len().saturating_sub(1));
        let identifier = visible.get(new_index).map(|(_, node)| node.id.clone());
        self.select(identifier)
    }

    /// When the selected node got hidden by collapsing one of its ancestors select the closest visible ancestor.
    ///
    /// Returns `true` when the selection changed.
    pub fn select_visible_ancestor<Fields>(&mut self, sequence: &Sequence<Identifier, Fields>) -> bool {
        let Some(selected) = &self.selected else {
            return false;
        };
        let Ok(node) = sequence.node(selected) else {
            return self.select(None);
        };
        if !node.hidden {
            return false;
        }
        let ancestor = sequence
            .ancestors(selected)
            .ok()
            .and_then(|ancestors| ancestors.into_iter().find(|ancestor| !ancestor.hidden))
            .map(|ancestor| ancestor.id.clone());
        self.select(ancestor)
    }

    /// Ensure the selected node is visible on next render
    pub fn scroll_selected_into_view(&mut self) {
        self.ensure_selected_in_view_on_next_render = true;
    }

    /// Scroll the specified amount of lines up
    ///
    /// Returns `true` when the scroll position changed.
    /// Returns `false` when the scrolling has reached the top.
    pub fn scroll_up(&mut self, lines: usize) -> bool {
        let before = self.offset;
        self.offset = self.offset.saturating_sub(lines);
        before != self.offset
    }

    /// Scroll the specified amount of lines down
    ///
    /// In contrast to [`scroll_up()`](Self::scroll_up) this can not return whether the view position changed or not as the actual change is determined on render.
    /// Always returns `true`.
    pub fn scroll_down(&mut self, lines: usize) -> bool {
        self.offset = self.offset.saturating_add(lines);
        true
    }

    /// Handles the up arrow key.
    /// Moves up to the previous visible node.
    ///
    /// Returns `true` when the selection changed.
    pub fn key_up<Fields>(&mut self, sequence: &Sequence<Identifier, Fields>) -> bool {
        self.select_visible_relative(sequence, |current| {
            current.map_or(usize::MAX, |current| current.saturating_sub(1))
        })
    }

    /// Handles the down arrow key.
    /// Moves down to the next visible node.
    ///
    /// Returns `true` when the selection changed.
    pub fn key_down<Fields>(&mut self, sequence: &Sequence<Identifier, Fields>) -> bool {
        self.select_visible_relative(sequence, |current| {
            current.map_or(0, |current| current.saturating_add(1))
        })
    }

    /// Handles the left arrow key.
    ///
    /// Returns a collapse [`Gesture`] when the selected node is expanded and has children.
    /// Otherwise its parent gets selected.
    pub fn key_left<Fields>(
        &mut self,
        sequence: &Sequence<Identifier, Fields>,
    ) -> Option<Gesture<Identifier>> {
        self.ensure_selected_in_view_on_next_render = true;
        let selected = self.selected.clone()?;
        let index = sequence.index_of(&selected).ok()?;
        let node = &sequence.nodes[index];
        if !node.collapsed && sequence.has_children_at(index) {
            return Some(Gesture::Collapse(selected));
        }
        let parent = sequence
            .ancestors(&selected)
            .ok()
            .and_then(|ancestors| ancestors.first().map(|parent| parent.id.clone()));
        if parent.is_some() {
            self.select(parent);
        }
        None
    }

    /// Handles the right arrow key.
    ///
    /// Returns an expand [`Gesture`] when the selected node is collapsed and has children.
    pub fn key_right<Fields>(
        &mut self,
        sequence: &Sequence<Identifier, Fields>,
    ) -> Option<Gesture<Identifier>> {
        self.ensure_selected_in_view_on_next_render = true;
        let selected = self.selected.clone()?;
        let index = sequence.index_of(&selected).ok()?;
        (sequence.nodes[index].collapsed && sequence.has_children_at(index))
            .then_some(Gesture::Expand(selected))
    }

    /// Returns the [`Gesture`] toggling the selected node.
    ///
    /// `None` when nothing is selected or the selected node has no children.
    pub fn toggle_selected<Fields>(
        &mut self,
        sequence: &Sequence<Identifier, Fields>,
    ) -> Option<Gesture<Identifier>> {
        self.ensure_selected_in_view_on_next_render = true;
        let selected = self.selected.clone()?;
        let index = sequence.index_of(&selected).ok()?;
        if !sequence.has_children_at(index) {
            return None;
        }
        if sequence.nodes[index].collapsed {
            Some(Gesture::Expand(selected))
        } else {
            Some(Gesture::Collapse(selected))
        }
    }
}

#[test]
fn key_down_and_up_walk_visible_nodes() {
    let sequence = Sequence::example().collapse(&"d").unwrap();
    let mut state = TreeTableState::default();
    assert!(state.key_down(&sequence));
    assert_eq!(state.selected(), Some(&"a"));

    for _ in 0..3 {
        state.key_down(&sequence);
    }
    assert_eq!(state.selected(), Some(&"d"));
    state.key_down(&sequence);
    assert_eq!(state.selected(), Some(&"g"));

    state.key_up(&sequence);
    assert_eq!(state.selected(), Some(&"d"));
}

#[test]
fn select_last_is_last_visible() {
    let sequence = Sequence::example();
    let mut state = TreeTableState::default();
    assert!(state.select_last(&sequence));
    assert_eq!(state.selected(), Some(&"h"));
    assert!(!state.select_last(&sequence));
    assert!(state.select_first(&sequence));
    assert_eq!(state.selected(), Some(&"a"));
}

#[test]
fn select_visible_index_clamps() {
    let sequence = Sequence::example().collapse(&"b").unwrap();
    let mut state = TreeTableState::default();
    state.select_visible_index(&sequence, 1);
    assert_eq!(state.selected(), Some(&"b"));
    state.select_visible_index(&sequence, 100);
    assert_eq!(state.selected(), Some(&"h"));
}

#[test]
fn key_left_collapses_then_selects_parent() {
    let sequence = Sequence::example();
    let mut state = TreeTableState::default();
    state.select(Some("d"));

    let gesture = state.key_left(&sequence);
    assert_eq!(gesture, Some(Gesture::Collapse("d")));

    let sequence = sequence.apply(&gesture.unwrap()).unwrap().sequence;
    assert_eq!(state.key_left(&sequence), None);
    assert_eq!(state.selected(), Some(&"b"));
}

#[test]
fn key_right_expands_collapsed() {
    let sequence = Sequence::example().collapse(&"b").unwrap();
    let mut state = TreeTableState::default();
    state.select(Some("b"));
    assert_eq!(state.key_right(&sequence), Some(Gesture::Expand("b")));

    state.select(Some("a"));
    assert_eq!(state.key_right(&sequence), None);
}

#[test]
fn toggle_selected_leaf_is_nothing() {
    let sequence = Sequence::example();
    let mut state = TreeTableState::default();
    assert_eq!(state.toggle_selected(&sequence), None);
    state.select(Some("c"));
    assert_eq!(state.toggle_selected(&sequence), None);
    state.select(Some("b"));
    assert_eq!(
        state.toggle_selected(&sequence),
        Some(Gesture::Collapse("b"))
    );
}

#[test]
fn hidden_selection_moves_to_visible_ancestor() {
    let mut state = TreeTableState::default();
    state.select(Some("e"));
    let sequence = Sequence::example().collapse(&"b").unwrap();
    assert!(state.select_visible_ancestor(&sequence));
    assert_eq!(state.selected(), Some(&"b"));
    assert!(!state.select_visible_ancestor(&sequence));
}

#[test]
fn scroll() {
    let mut state = TreeTableState::<&str>::default();
    assert!(!state.scroll_up(1));
    assert!(state.scroll_down(3));
    assert!(state.scroll_up(1));
    assert_eq!(state.get_offset(), 2);
}
