//! Position strings coming back from the analysis service.
//!
//! The service sometimes returns only the piece placement. We append
//! [`DEFAULT_STATE_SUFFIX`] in that case and then run the result through
//! shakmaty before anything is displayed.

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, PositionError};

use crate::error::InvalidPosition;

/// White to move, full castling rights, no en passant, zeroed clock.
///
/// This is an approximation: a photo carries no move history, so these
/// fields are guesses and may be wrong for the position on the board.
pub const DEFAULT_STATE_SUFFIX: &str = " w KQkq - 0 1";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionPolicy {
    /// Also require a legal game position (kings present, side not to move
    /// not in check, ...). Castling rights are not checked since the
    /// default suffix grants all four.
    pub require_legal: bool,
}

/// Append the default state fields when only a board layout was returned.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.contains(' ') {
        trimmed.to_string()
    } else {
        format!("{trimmed}{DEFAULT_STATE_SUFFIX}")
    }
}

/// Structural check of a full position string, plus legality when the
/// policy asks for it.
pub fn validate_position(fen: &str, policy: PositionPolicy) -> Result<Fen, InvalidPosition> {
    let invalid = |reason: String| InvalidPosition {
        position: fen.to_string(),
        reason,
    };

    if fen.split(' ').count() != 6 {
        return Err(invalid(format!(
            "expected 6 fields, found {}",
            fen.split(' ').count()
        )));
    }

    let parsed: Fen = fen.parse().map_err(|e| invalid(format!("{e}")))?;

    if policy.require_legal {
        parsed
            .clone()
            .into_position::<Chess>(CastlingMode::Standard)
            .or_else(PositionError::ignore_invalid_castling_rights)
            .map_err(|e| invalid(format!("{e}")))?;
    }

    Ok(parsed)
}

/// Normalize then validate. Returns the string that should be displayed.
pub fn normalize_and_validate(raw: &str, policy: PositionPolicy) -> Result<String, InvalidPosition> {
    let normalized = normalize(raw);
    validate_position(&normalized, policy)?;
    Ok(normalized)
}
