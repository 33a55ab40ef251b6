//! Plain-text board diagram for the terminal.

use shakmaty::fen::Fen;
use shakmaty::{File, Rank, Square};

use snap_core::{BoardView, Orientation};

/// Draw the board from the viewer's side. Returns `None` if the position
/// does not parse.
pub fn ascii_board(view: &BoardView) -> Option<String> {
    let fen: Fen = view.position.parse().ok()?;
    let board = &fen.as_setup().board;

    let ranks: Vec<u32> = match view.orientation {
        Orientation::White => (0..8).rev().collect(),
        Orientation::Black => (0..8).collect(),
    };
    let files: Vec<u32> = match view.orientation {
        Orientation::White => (0..8).collect(),
        Orientation::Black => (0..8).rev().collect(),
    };

    let mut out = String::new();
    for &rank in &ranks {
        out.push_str(&format!("{} ", rank + 1));
        for &file in &files {
            let sq = Square::from_coords(File::new(file), Rank::new(rank));
            let c = board.piece_at(sq).map(|p| p.char()).unwrap_or('.');
            out.push(' ');
            out.push(c);
        }
        out.push('\n');
    }
    out.push_str("  ");
    for &file in &files {
        out.push(' ');
        out.push((b'a' + file as u8) as char);
    }
    out.push('\n');
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(orientation: Orientation) -> BoardView {
        BoardView {
            position: "4k3/8/8/8/8/8/8/R3K3 w Q - 0 1".into(),
            orientation,
            view_only: true,
        }
    }

    #[test]
    fn test_white_orientation() {
        let text = ascii_board(&view(Orientation::White)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8  . . . . k . . .");
        assert_eq!(lines[7], "1  R . . . K . . .");
        assert_eq!(lines[8], "   a b c d e f g h");
    }

    #[test]
    fn test_black_orientation() {
        let text = ascii_board(&view(Orientation::Black)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "1  . . . K . . . R");
        assert_eq!(lines[7], "8  . . . k . . . .");
        assert_eq!(lines[8], "   h g f e d c b a");
    }

    #[test]
    fn test_unparsable_position() {
        let bad = BoardView {
            position: "garbage".into(),
            orientation: Orientation::White,
            view_only: true,
        };
        assert!(ascii_board(&bad).is_none());
    }
}
