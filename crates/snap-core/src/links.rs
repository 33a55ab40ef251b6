//! Links out to external analysis boards.

use serde::Serialize;

const EDITOR_URL: &str = "https://lichess.org/editor/{position}";
const ANALYSIS_URL: &str = "https://www.chess.com/analysis?fen={position}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundLinks {
    /// Position embedded in the path.
    pub editor: String,
    /// Position passed as a query parameter.
    pub analysis: String,
}

impl OutboundLinks {
    pub fn for_position(position: &str) -> Self {
        let encoded = encode_spaces(position);
        Self {
            editor: EDITOR_URL.replace("{position}", &encoded),
            analysis: ANALYSIS_URL.replace("{position}", &encoded),
        }
    }
}

/// Only spaces are escaped; slashes stay literal.
pub fn encode_spaces(position: &str) -> String {
    position.replace(' ', "%20")
}
