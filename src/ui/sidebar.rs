use crate::board::Board;
use std::fmt::Write;

/// Numbered board list with the active board marked.
pub fn render_sidebar(boards: &[Board], active: Option<&str>) -> String {
    let mut out = String::from("Boards\n");
    if boards.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }
    for (idx, board) in boards.iter().enumerate() {
        let marker = if Some(board.id.as_str()) == active { '>' } else { ' ' };
        let _ = writeln!(out, "{} {}. {}", marker, idx + 1, board.name);
    }
    out
}
