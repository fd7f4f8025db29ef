//! Parser for Prodigy XY exports
//!
//! Turns the token stream into an [`XyDocument`]: the global header followed
//! by the data blocks (header lines plus numeric rows).

use log::debug;
use xps_ast::{DataBlock, Header, SourceMap, Span, Spanned, XpsError, XyDocument};
use xps_lexer::{Lexer, SpannedToken, Token};

// Header line processing
pub mod header_utils;

/// Decimal places kept for every parsed value
pub const DEFAULT_PRECISION: u32 = 3;

/// Empty comment lines that terminate the global header
const GLOBAL_HEADER_TERMINATORS: usize = 2;

/// One physical line of the input
#[derive(Debug, Clone)]
enum Line {
    Comment { text: String, span: Span },
    Values { cells: Vec<SpannedToken>, span: Span },
    Blank { span: Span },
}

impl Line {
    const fn span(&self) -> Span {
        match self {
            Self::Comment { span, .. } | Self::Values { span, .. } | Self::Blank { span } => *span,
        }
    }
}

pub struct Parser {
    source_map: SourceMap,
    filename: String,
    tokens: Vec<SpannedToken>,
    precision: u32,
}

impl Parser {
    /// Create a new parser for the given input
    ///
    /// # Errors
    ///
    /// Returns `XpsError` if there are lexical errors in the input
    pub fn new(input: &str) -> Result<Self, XpsError> {
        Self::new_with_filename(input, "<input>")
    }

    /// Create a new parser for the given input with a filename
    ///
    /// # Errors
    ///
    /// Returns `XpsError` if there are lexical errors in the input
    pub fn new_with_filename(input: &str, filename: &str) -> Result<Self, XpsError> {
        let source_map = SourceMap::new(input);

        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize();

        for token in &tokens {
            if token.token == Token::Error {
                return Err(XpsError::syntax(
                    format!("Unexpected text in data row: {}", token.text),
                    token.span,
                    &source_map,
                    filename,
                ));
            }
        }

        Ok(Self {
            source_map,
            filename: filename.to_string(),
            tokens,
            precision: DEFAULT_PRECISION,
        })
    }

    /// Set the number of decimal places values are rounded to
    #[must_use]
    pub const fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Parse the input into a document
    ///
    /// # Errors
    ///
    /// Returns `XpsError` if a value cannot be read as a number
    pub fn parse(&self) -> Result<XyDocument, XpsError> {
        let lines = self.lines();
        let (global_header, mut idx) = Self::global_header(&lines);

        let mut blocks = Vec::new();
        while idx < lines.len() {
            let start = idx;
            let mut block = DataBlock::default();

            while let Some(Line::Comment { text, .. }) = lines.get(idx) {
                if let Some((key, value)) = header_utils::split_header_line(text) {
                    block.header.insert(key, value);
                }
                idx += 1;
            }

            while let Some(line) = lines.get(idx) {
                match line {
                    Line::Values { cells, .. } => block.rows.push(self.parse_row(cells)?),
                    Line::Blank { .. } => {}
                    Line::Comment { .. } => break,
                }
                idx += 1;
            }

            let span = lines[start].span().merge(lines[idx - 1].span());
            if block.is_empty() {
                continue;
            }
            debug!(
                "block at line {}: {} header entries, {} rows",
                self.source_map.position(span.start).line,
                block.header.len(),
                block.rows.len()
            );
            blocks.push(Spanned::new(block, span));
        }

        debug!(
            "parsed {}: {} global header entries, {} blocks",
            self.filename,
            global_header.len(),
            blocks.len()
        );

        Ok(XyDocument {
            global_header,
            blocks,
        })
    }

    /// Read the file header, returning it with the index of the first line after it
    fn global_header(lines: &[Line]) -> (Header, usize) {
        let mut header = Header::new();
        let mut empty_lines = 0;
        let mut idx = 0;

        while empty_lines < GLOBAL_HEADER_TERMINATORS && idx < lines.len() {
            match &lines[idx] {
                Line::Comment { text, .. } => {
                    if header_utils::is_empty_comment(text) {
                        empty_lines += 1;
                    } else if let Some((key, value)) = header_utils::split_header_line(text) {
                        header.insert(key, value);
                    }
                }
                Line::Blank { .. } => empty_lines += 1,
                // Data without the usual terminator: the header is over.
                Line::Values { .. } => break,
            }
            idx += 1;
        }

        (header, idx)
    }

    fn parse_row(&self, cells: &[SpannedToken]) -> Result<Vec<f64>, XpsError> {
        cells
            .iter()
            .map(|cell| {
                cell.text
                    .parse::<f64>()
                    .map(|value| header_utils::round_to(value, self.precision))
                    .map_err(|err| {
                        XpsError::syntax(
                            format!("Invalid number {}: {err}", cell.text),
                            cell.span,
                            &self.source_map,
                            &self.filename,
                        )
                    })
            })
            .collect()
    }

    /// Group tokens into physical lines
    fn lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut cells: Vec<SpannedToken> = Vec::new();
        let mut comment: Option<(String, Span)> = None;
        let mut line_start = 0;

        for token in &self.tokens {
            match token.token {
                Token::Number => cells.push(token.clone()),
                Token::Comment => {
                    if cells.is_empty() {
                        comment = Some((token.text.clone(), token.span));
                    } else {
                        debug!("ignoring trailing comment: {}", token.text);
                    }
                }
                Token::Newline | Token::Eof => {
                    let is_eof = token.token == Token::Eof;
                    let span = Span::new(line_start, token.span.start);
                    if !cells.is_empty() {
                        lines.push(Line::Values {
                            cells: std::mem::take(&mut cells),
                            span,
                        });
                    } else if let Some((text, span)) = comment.take() {
                        lines.push(Line::Comment { text, span });
                    } else if !is_eof {
                        lines.push(Line::Blank { span });
                    }
                    comment = None;
                    line_start = token.span.end;
                }
                Token::Whitespace | Token::ByteOrderMark | Token::Error => {}
            }
        }

        lines
    }

    /// Get access to the source map for error reporting
    #[must_use]
    pub const fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    /// Get access to the filename
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }
}
