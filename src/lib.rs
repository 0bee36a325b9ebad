#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]

/*!
Tree tables on top of a flat [`Sequence`] of [`Node`]s which reference their parent by identifier.

The [`Sequence`] is always linearized: depth first, every node directly followed by its descendants, with derived `depth` and `hidden`.
It is never changed in place, every operation returns the next [`Sequence`]:

- [`collapse`](Sequence::collapse) / [`expand`](Sequence::expand) hide and reveal descendants,
- [`move_node`](Sequence::move_node) reorders by flat position and derives the new parent from the neighbors,
- [`combine`](Sequence::combine) nests one node below another.

Gestures of the presentation layer are translated by [`Gesture`] and applied with [`Sequence::apply`].
Structural changes are persisted with sparse [`OrderKeys`] through a [`Persistence`].

The [`TreeTable`] widget renders the visible nodes with [`ratatui`].
The user interaction state (like the current selection) is stored in the [`TreeTableState`].
*/

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, StatefulWidget, Widget};
use unicode_width::UnicodeWidthStr;

mod config;
mod error;
#[cfg(feature = "json")]
pub mod feed;
mod gesture;
mod linearize;
mod node;
mod order_key;
mod query;
mod reorder;
mod sequence;
mod tree_table_state;
mod unique_identifiers;
mod visibility;

pub use crate::config::{Column, SortOrder, TableConfig};
pub use crate::error::{Error, Result};
pub use crate::gesture::{Applied, DragResult, Gesture};
pub use crate::linearize::sort;
pub use crate::node::{Node, RowFields};
pub use crate::order_key::{OrderKeys, OrderRecord, Persisted, Persistence};
pub use crate::reorder::Reparent;
pub use crate::sequence::Sequence;
pub use crate::tree_table_state::TreeTableState;

/// A `TreeTable` which can be rendered.
///
/// Shows the visible nodes of a [`Sequence`] as rows and one column per [`Column`].
/// The first column is indented by the depth of the node and shows whether the node is collapsed.
/// Cells are read from the node fields via [`RowFields`].
///
/// # Example
///
/// ```
/// # use std::collections::BTreeMap;
/// # use tree_table::{Column, Node, Sequence, TreeTable, TreeTableState};
/// # use ratatui::backend::TestBackend;
/// # use ratatui::Terminal;
/// # use ratatui::widgets::Block;
/// # let mut terminal = Terminal::new(TestBackend::new(32, 32)).unwrap();
/// let mut fields = BTreeMap::new();
/// fields.insert("title".to_owned(), "Leaf".to_owned());
/// let sequence = Sequence::new(vec![Node::root("l", fields)]).expect("valid tree");
/// let columns = Column::parse_list("title:Title");
/// let mut state = TreeTableState::default();
///
/// terminal.draw(|frame| {
///     let area = frame.size();
///
///     let widget = TreeTable::new(&sequence, &columns)
///         .block(Block::bordered().title("Tree Table"));
///
///     frame.render_stateful_widget(widget, area, &mut state);
/// })?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct TreeTable<'a, Identifier, Fields> {
    sequence: &'a Sequence<Identifier, Fields>,
    columns: &'a [Column],

    block: Option<Block<'a>>,
    /// Style used as a base style for the widget
    style: Style,

    /// Style of the header row with the column titles
    header_style: Style,
    show_header: bool,
    /// Space between two columns
    column_spacing: u16,

    /// Style used to render selected row
    highlight_style: Style,
    /// Symbol in front of the selected row (Shift all rows to the right)
    highlight_symbol: &'a str,

    /// Symbol displayed in front of a collapsed node (As in the children are currently hidden)
    node_collapsed_symbol: &'a str,
    /// Symbol displayed in front of an expanded node. (As in the children are currently visible)
    node_expanded_symbol: &'a str,
    /// Symbol displayed in front of a node without children.
    node_no_children_symbol: &'a str,
}

impl<'a, Identifier, Fields> TreeTable<'a, Identifier, Fields>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug,
    Fields: RowFields,
{
    /// Create a new `TreeTable`.
    #[must_use]
    pub const fn new(sequence: &'a Sequence<Identifier, Fields>, columns: &'a [Column]) -> Self {
        Self {
            sequence,
            columns,
            block: None,
            style: Style::new(),
            header_style: Style::new(),
            show_header: true,
            column_spacing: 1,
            highlight_style: Style::new(),
            highlight_symbol: "",
            node_collapsed_symbol: "\u{25b6} ", // Arrow to right
            node_expanded_symbol: "\u{25bc} ",  // Arrow down
            node_no_children_symbol: "  ",
        }
    }

    #[allow(clippy::missing_const_for_fn)]
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    #[must_use]
    pub const fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub const fn header_style(mut self, style: Style) -> Self {
        self.header_style = style;
        self
    }

    /// Whether to render the column titles in the first line. Enabled by default.
    #[must_use]
    pub const fn show_header(mut self, show: bool) -> Self {
        self.show_header = show;
        self
    }

    #[must_use]
    pub const fn column_spacing(mut self, spacing: u16) -> Self {
        self.column_spacing = spacing;
        self
    }

    #[must_use]
    pub const fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }

    #[must_use]
    pub const fn highlight_symbol(mut self, highlight_symbol: &'a str) -> Self {
        self.highlight_symbol = highlight_symbol;
        self
    }

    #[must_use]
    pub const fn node_collapsed_symbol(mut self, symbol: &'a str) -> Self {
        self.node_collapsed_symbol = symbol;
        self
    }

    #[must_use]
    pub const fn node_expanded_symbol(mut self, symbol: &'a str) -> Self {
        self.node_expanded_symbol = symbol;
        self
    }

    #[must_use]
    pub const fn node_no_children_symbol(mut self, symbol: &'a str) -> Self {
        self.node_no_children_symbol = symbol;
        self
    }
}

/// Horizontal offset and width of every column.
///
/// The width is split evenly, the last column gets the remainder.
fn column_layout(total: u16, columns: usize, spacing: u16) -> Vec<(u16, u16)> {
    let count = u16::try_from(columns.max(1)).unwrap_or(u16::MAX);
    let available = total.saturating_sub(spacing.saturating_mul(count - 1));
    let base = available / count;
    let remainder = available % count;

    let mut x: u16 = 0;
    let mut layout = Vec::with_capacity(count as usize);
    for column in 0..count {
        let width = if column + 1 == count {
            base + remainder
        } else {
            base
        };
        layout.push((x, width));
        x = x.saturating_add(width).saturating_add(spacing);
    }
    layout
}

#[test]
fn column_layout_splits_evenly() {
    assert_eq!(column_layout(20, 2, 1), [(0, 9), (10, 10)]);
    assert_eq!(column_layout(10, 3, 0), [(0, 3), (3, 3), (6, 4)]);
    assert_eq!(column_layout(7, 0, 1), [(0, 7)]);
}

impl<'a, Identifier, Fields> StatefulWidget for TreeTable<'a, Identifier, Fields>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug,
    Fields: RowFields,
{
    type State = TreeTableState<Identifier>;

    #[allow(clippy::too_many_lines, clippy::cast_possible_truncation)]
    fn render(self, full_area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        buf.set_style(full_area, self.style);

        // Get the inner area inside a possible block, otherwise use the full area
        let area = self.block.map_or(full_area, |block| {
            let inner_area = block.inner(full_area);
            block.render(full_area, buf);
            inner_area
        });

        if area.width < 1 || area.height < 1 {
            return;
        }

        let has_selection = state.selected.is_some();
        let blank_symbol = " ".repeat(self.highlight_symbol.width());
        let prefix_width = if has_selection {
            blank_symbol.len() as u16
        } else {
            0
        };
        let layout = column_layout(
            area.width.saturating_sub(prefix_width),
            self.columns.len(),
            self.column_spacing,
        );
        let content_x = area.x + prefix_width.min(area.width);
        let max_x = area.x + area.width;

        let mut rows_area = area;
        if self.show_header && !self.columns.is_empty() {
            let header_area = Rect { height: 1, ..area };
            buf.set_style(header_area, self.style.patch(self.header_style));
            for (column, &(offset, width)) in self.columns.iter().zip(&layout) {
                let x = content_x.saturating_add(offset);
                if x >= max_x {
                    break;
                }
                buf.set_stringn(
                    x,
                    area.y,
                    &column.title,
                    width as usize,
                    self.style.patch(self.header_style),
                );
            }
            rows_area.y += 1;
            rows_area.height -= 1;
        }

        let visible = self.sequence.visible().collect::<Vec<_>>();
        if visible.is_empty() || rows_area.height < 1 {
            return;
        }
        let available_height = rows_area.height as usize;

        let ensure_index_in_view =
            if state.ensure_selected_in_view_on_next_render && state.selected.is_some() {
                visible
                    .iter()
                    .position(|(_, node)| Some(node.id()) == state.selected.as_ref())
            } else {
                None
            };

        // Ensure last line is still visible
        let mut start = state.offset.min(visible.len().saturating_sub(1));

        if let Some(ensure_index_in_view) = ensure_index_in_view {
            start = start.min(ensure_index_in_view);
        }

        let mut end = start.saturating_add(available_height).min(visible.len());

        if let Some(ensure_index_in_view) = ensure_index_in_view {
            if ensure_index_in_view >= end {
                end = ensure_index_in_view + 1;
                start = end.saturating_sub(available_height);
            }
        }

        state.offset = start;
        state.ensure_selected_in_view_on_next_render = false;

        for (row, &(index, node)) in visible[start..end].iter().enumerate() {
            let y = rows_area.y + row as u16;
            let row_area = Rect {
                y,
                height: 1,
                ..rows_area
            };
            buf.set_style(row_area, self.style);

            let is_selected = state.selected.as_ref() == Some(node.id());
            if has_selection {
                let symbol = if is_selected {
                    self.highlight_symbol
                } else {
                    &blank_symbol
                };
                buf.set_stringn(area.x, y, symbol, area.width as usize, self.style);
            }

            for (column_index, &(offset, width)) in layout.iter().enumerate() {
                let x = content_x.saturating_add(offset);
                if x >= max_x {
                    break;
                }
                let max_x = x.saturating_add(width).min(max_x);

                let mut text_x = x;
                if column_index == 0 {
                    let indent_width = node.depth() * 2;
                    let (after_indent_x, _) = buf.set_stringn(
                        text_x,
                        y,
                        " ".repeat(indent_width),
                        max_x.saturating_sub(text_x) as usize,
                        self.style,
                    );
                    let symbol = if !self.sequence.has_children_at(index) {
                        self.node_no_children_symbol
                    } else if node.is_collapsed() {
                        self.node_collapsed_symbol
                    } else {
                        self.node_expanded_symbol
                    };
                    let (after_symbol_x, _) = buf.set_stringn(
                        after_indent_x,
                        y,
                        symbol,
                        max_x.saturating_sub(after_indent_x) as usize,
                        self.style,
                    );
                    text_x = after_symbol_x;
                }

                let cell = self
                    .columns
                    .get(column_index)
                    .and_then(|column| node.fields().cell(&column.name));
                if let Some(cell) = cell {
                    buf.set_stringn(
                        text_x,
                        y,
                        cell,
                        max_x.saturating_sub(text_x) as usize,
                        self.style,
                    );
                }
            }

            if is_selected {
                buf.set_style(row_area, self.highlight_style);
            }
        }
    }
}

impl<'a, Identifier, Fields> Widget for TreeTable<'a, Identifier, Fields>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug,
    Fields: RowFields,
{
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut state = TreeTableState::default();
        StatefulWidget::render(self, area, buf, &mut state);
    }
}

#[cfg(test)]
mod render_tests {
    use std::collections::BTreeMap;

    use super::*;

    fn row(
        id: &'static str,
        parent: Option<&'static str>,
        title: &str,
        n: &str,
    ) -> Node<&'static str, BTreeMap<String, String>> {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_owned(), title.to_owned());
        fields.insert("n".to_owned(), n.to_owned());
        Node::new(id, parent, fields)
    }

    fn example() -> Sequence<&'static str, BTreeMap<String, String>> {
        Sequence::new(vec![
            row("a", None, "Alpha", "1"),
            row("b", Some("a"), "Bravo", "2"),
            row("c", None, "Charlie", "3"),
        ])
        .unwrap()
    }

    fn lines(buffer: &Buffer) -> Vec<String> {
        let area = buffer.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buffer.get(x, y).symbol())
                    .collect()
            })
            .collect()
    }

    fn render(
        sequence: &Sequence<&'static str, BTreeMap<String, String>>,
        state: &mut TreeTableState<&'static str>,
        height: u16,
    ) -> Vec<String> {
        let columns = Column::parse_list("title:Title,n:N");
        let area = Rect::new(0, 0, 20, height);
        let mut buffer = Buffer::empty(area);
        let widget = TreeTable::new(sequence, &columns).highlight_symbol(">> ");
        StatefulWidget::render(widget, area, &mut buffer, state);
        lines(&buffer)
    }

    #[test]
    fn renders_header_and_indented_rows() {
        let mut state = TreeTableState::default();
        let actual = render(&example(), &mut state, 5);
        assert_eq!(
            actual,
            [
                "Title     N         ",
                "\u{25bc} Alpha   1         ",
                "    Bravo 2         ",
                "  Charlie 3         ",
                "                    ",
            ]
        );
    }

    #[test]
    fn collapsed_rows_are_not_rendered() {
        let sequence = example().collapse(&"a").unwrap();
        let mut state = TreeTableState::default();
        let actual = render(&sequence, &mut state, 4);
        assert_eq!(
            actual,
            [
                "Title     N         ",
                "\u{25b6} Alpha   1         ",
                "  Charlie 3         ",
                "                    ",
            ]
        );
    }

    #[test]
    fn selection_gets_highlight_symbol() {
        let mut state = TreeTableState::default();
        state.select(Some("b"));
        let actual = render(&example(), &mut state, 4);
        assert!(actual[0].starts_with("   Title"));
        assert!(actual[1].starts_with("   \u{25bc} Alpha"));
        // the first column is 8 cells wide after the highlight symbol
        assert!(actual[2].starts_with(">>     Brav "));
        assert!(actual[3].starts_with("     Charli "));
    }

    #[test]
    fn selection_is_scrolled_into_view() {
        let mut state = TreeTableState::default();
        state.select(Some("c"));
        let actual = render(&example(), &mut state, 2);
        assert_eq!(state.get_offset(), 2);
        assert!(actual[1].starts_with(">>   Charli"));
    }
}
