//! Textual grid format.
//!
//! ```text
//! Input:
//!   rows columns
//!   rows lines of `columns` whitespace separated 0/1 tokens
//!
//! Output:
//!   rows lines of `columns` tab separated 0/1 tokens
//! ```
//!
//! Line breaks in the input are not significant; only the token count is.

use std::io::{self, Read, Write};

use crate::compute::{Grid, GridError, GridShape, LIVE};

/// Malformed textual grid.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Missing grid header (expected `rows columns`)")]
    MissingHeader,
    #[error("Invalid grid dimension `{0}`: expected a positive integer")]
    InvalidDimension(String),
    #[error("Expected {expected} cell tokens for a {rows}x{columns} grid, found {actual}")]
    TokenCount {
        rows: usize,
        columns: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid cell token `{token}` at row {row}, column {column}: expected 0 or 1")]
    InvalidCell {
        row: usize,
        column: usize,
        token: String,
    },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn parse_dimension(token: Option<&str>) -> Result<usize, FormatError> {
    let token = token.ok_or(FormatError::MissingHeader)?;
    match token.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(FormatError::InvalidDimension(token.to_string())),
    }
}

/// Decode a grid from its textual form.
pub fn decode(text: &str) -> Result<Grid, FormatError> {
    let mut tokens = text.split_whitespace();
    let rows = parse_dimension(tokens.next())?;
    let columns = parse_dimension(tokens.next())?;
    let expected = rows
        .checked_mul(columns)
        .ok_or_else(|| FormatError::InvalidDimension(format!("{rows}x{columns}")))?;

    let body: Vec<&str> = tokens.collect();
    if body.len() != expected {
        return Err(FormatError::TokenCount {
            rows,
            columns,
            expected,
            actual: body.len(),
        });
    }

    let mut cells = Vec::with_capacity(expected);
    for (i, token) in body.iter().enumerate() {
        let cell = match *token {
            "0" => 0,
            "1" => LIVE,
            _ => {
                return Err(FormatError::InvalidCell {
                    row: i / columns,
                    column: i % columns,
                    token: token.to_string(),
                });
            }
        };
        cells.push(cell);
    }

    // Length and cell states were checked above
    Ok(Grid::from_cells(GridShape::new(rows, columns), cells)?)
}

/// Read a whole stream and decode it.
pub fn decode_from<R: Read>(r: &mut R) -> Result<Grid, FormatError> {
    let mut text = String::new();
    r.read_to_string(&mut text)?;
    decode(&text)
}

/// Encode a grid as tab separated rows, one per line.
pub fn encode(grid: &Grid) -> String {
    let mut out = String::with_capacity(grid.shape().cell_count() * 2);
    for r in 0..grid.rows() {
        for (c, &cell) in grid.row(r).iter().enumerate() {
            if c > 0 {
                out.push('\t');
            }
            out.push(if cell == LIVE { '1' } else { '0' });
        }
        out.push('\n');
    }
    out
}

/// Encode a grid preceded by its `rows columns` header, the form accepted by
/// [`decode`].
pub fn encode_with_header(grid: &Grid) -> String {
    format!("{} {}\n{}", grid.rows(), grid.columns(), encode(grid))
}

/// Encode a grid into a stream.
pub fn encode_to<W: Write>(grid: &Grid, w: &mut W) -> io::Result<()> {
    w.write_all(encode(grid).as_bytes())?;
    w.flush()
}
