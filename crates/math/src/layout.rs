//! Math Layout - Build plain-text boxes from the token tree
//!
//! A box is a stack of rows, bottom row first, each holding text fragments
//! at horizontal offsets. Boxes are built bottom-up and folded left to
//! right with [`LayoutBox::combine`], which aligns baselines and pads the
//! shorter operand with blank rows.

use crate::error::{MathError, MathResult};
use crate::model::{BracketKind, ScriptGroup, Token};
use crate::tables::{Constructor, SymbolTables};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use text_engine::FontMetrics;

// =============================================================================
// Layout Types
// =============================================================================

/// How a box lines up against the box it is appended to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// First row level with the top of the preceding box
    Top,
    /// Sits entirely below the preceding baseline
    Bottom,
    /// Baselines coincide
    #[default]
    Inline,
}

/// A piece of text at a horizontal offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub offset: f32,
    pub text: String,
}

/// One line of a box. Fragments are kept in insertion order and sorted at
/// render time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub fragments: Vec<Fragment>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fragment(offset: f32, text: impl Into<String>) -> Self {
        let mut row = Self::new();
        row.push(offset, text);
        row
    }

    pub fn push(&mut self, offset: f32, text: impl Into<String>) {
        self.fragments.push(Fragment {
            offset,
            text: text.into(),
        });
    }

    /// Move every fragment right by `dx`
    pub fn shift(&mut self, dx: f32) {
        for fragment in &mut self.fragments {
            fragment.offset += dx;
        }
    }

    pub fn append(&mut self, other: Row) {
        self.fragments.extend(other.fragments);
    }
}

/// A laid out rectangle of text rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    pub width: f32,
    /// Rows, bottom first
    pub rows: Vec<Row>,
    /// Index of the row other boxes align against (0 = bottom)
    pub baseline: usize,
    pub alignment: Alignment,
}

impl LayoutBox {
    pub fn new(width: f32, rows: Vec<Row>, baseline: usize, alignment: Alignment) -> Self {
        debug_assert!(baseline < rows.len().max(1));
        Self {
            width,
            rows,
            baseline,
            alignment,
        }
    }

    /// Zero-width box with a single blank row
    pub fn empty() -> Self {
        Self::new(0.0, vec![Row::new()], 0, Alignment::Inline)
    }

    /// Single-row box holding `text`
    pub fn text(text: &str, metrics: &dyn FontMetrics) -> Self {
        Self::new(
            metrics.width(text),
            vec![Row::with_fragment(0.0, text)],
            0,
            Alignment::Inline,
        )
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Move every row right by `dx`
    pub fn shift(&mut self, dx: f32) {
        for row in &mut self.rows {
            row.shift(dx);
        }
    }

    /// Rows `self` must move up (positive) or `anchor` must move up
    /// (negative) so the two line up according to `self.alignment`
    fn alignment_delta(&self, anchor: &LayoutBox) -> isize {
        let baseline = self.baseline as isize;
        match self.alignment {
            Alignment::Bottom => -1 - baseline,
            Alignment::Inline => anchor.baseline as isize - baseline,
            Alignment::Top => anchor.height() as isize - baseline,
        }
    }

    /// Grow to `height` rows, inserting `below` blank rows under the content
    fn pad(&mut self, height: usize, below: usize) {
        if self.height() == height && below == 0 {
            return;
        }
        let above = height - self.height() - below;
        let mut rows = Vec::with_capacity(height);
        rows.extend(std::iter::repeat_with(Row::new).take(below));
        rows.append(&mut self.rows);
        rows.extend(std::iter::repeat_with(Row::new).take(above));
        self.rows = rows;
    }

    /// Append `other` to the right of `self`, consuming both
    pub fn combine(mut self, mut other: LayoutBox) -> LayoutBox {
        let delta = other.alignment_delta(&self);
        let lift_self = (-delta).max(0) as usize;
        let lift_other = delta.max(0) as usize;

        let height = (self.height() + lift_self).max(other.height() + lift_other);
        self.pad(height, lift_self);
        other.pad(height, lift_other);
        self.baseline += lift_self;

        let offset = self.width;
        let other_width = other.width;
        for (row, mut appended) in self.rows.iter_mut().zip(other.rows) {
            appended.shift(offset);
            row.append(appended);
        }
        self.width += other_width;
        self
    }
}

// =============================================================================
// Flexible bracket glyphs
// =============================================================================

/// Glyphs used to draw one side of a bracket at any height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexChars {
    pub single: char,
    pub double_top: char,
    pub double_bottom: char,
    pub top: char,
    pub top_mid: char,
    pub mid: char,
    pub bottom_mid: char,
    pub bottom: char,
    pub filler: char,
}

impl FlexChars {
    const fn uniform(single: char, filler: char) -> Self {
        Self {
            single,
            double_top: filler,
            double_bottom: filler,
            top: filler,
            top_mid: filler,
            mid: filler,
            bottom_mid: filler,
            bottom: filler,
            filler,
        }
    }

    pub const ROUND_LEFT: FlexChars = FlexChars {
        single: '(',
        double_top: '⎛',
        double_bottom: '⎝',
        top: '⎛',
        top_mid: '⎜',
        mid: '⎜',
        bottom_mid: '⎜',
        bottom: '⎝',
        filler: '⎜',
    };
    pub const ROUND_RIGHT: FlexChars = FlexChars {
        single: ')',
        double_top: '⎞',
        double_bottom: '⎠',
        top: '⎞',
        top_mid: '⎟',
        mid: '⎟',
        bottom_mid: '⎟',
        bottom: '⎠',
        filler: '⎟',
    };
    pub const SQUARE_LEFT: FlexChars = FlexChars {
        single: '[',
        double_top: '⎡',
        double_bottom: '⎣',
        top: '⎡',
        top_mid: '⎢',
        mid: '⎢',
        bottom_mid: '⎢',
        bottom: '⎣',
        filler: '⎢',
    };
    pub const SQUARE_RIGHT: FlexChars = FlexChars {
        single: ']',
        double_top: '⎤',
        double_bottom: '⎦',
        top: '⎤',
        top_mid: '⎥',
        mid: '⎥',
        bottom_mid: '⎥',
        bottom: '⎦',
        filler: '⎥',
    };
    pub const CURLY_LEFT: FlexChars = FlexChars {
        single: '{',
        double_top: '⎰',
        double_bottom: '⎱',
        top: '⎧',
        top_mid: '⎭',
        mid: '⎨',
        bottom_mid: '⎫',
        bottom: '⎩',
        filler: '⎪',
    };
    pub const CURLY_RIGHT: FlexChars = FlexChars {
        single: '}',
        double_top: '⎱',
        double_bottom: '⎰',
        top: '⎫',
        top_mid: '⎩',
        mid: '⎬',
        bottom_mid: '⎧',
        bottom: '⎭',
        filler: '⎪',
    };
    pub const BAR: FlexChars = FlexChars::uniform('|', '│');

    /// Left and right glyph sets for a bracket family
    pub fn for_kind(kind: BracketKind) -> (FlexChars, FlexChars) {
        match kind {
            BracketKind::Round => (Self::ROUND_LEFT, Self::ROUND_RIGHT),
            BracketKind::Square => (Self::SQUARE_LEFT, Self::SQUARE_RIGHT),
            BracketKind::Curly => (Self::CURLY_LEFT, Self::CURLY_RIGHT),
            BracketKind::Bar => (Self::BAR, Self::BAR),
        }
    }

    /// One glyph per row for a box `height` rows tall, bottom row first
    pub fn glyphs(&self, height: usize) -> Vec<char> {
        let mut glyphs = Vec::with_capacity(height);
        match height {
            0 => {}
            1 => glyphs.push(self.single),
            2 => glyphs.extend([self.double_bottom, self.double_top]),
            odd if odd % 2 == 1 => {
                let fill = (odd - 3) / 2;
                glyphs.push(self.bottom);
                glyphs.extend(std::iter::repeat(self.filler).take(fill));
                glyphs.push(self.mid);
                glyphs.extend(std::iter::repeat(self.filler).take(fill));
                glyphs.push(self.top);
            }
            even => {
                let fill = (even - 4) / 2;
                glyphs.push(self.bottom);
                glyphs.extend(std::iter::repeat(self.filler).take(fill));
                glyphs.extend([self.bottom_mid, self.top_mid]);
                glyphs.extend(std::iter::repeat(self.filler).take(fill));
                glyphs.push(self.top);
            }
        }
        glyphs
    }
}

// =============================================================================
// Build Context
// =============================================================================

/// Sibling state threaded through one container's build pass
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    metrics: &'a dyn FontMetrics,
    tables: &'a SymbolTables,
    /// Baseline of the most recently built sibling
    pub baseline: usize,
    /// Height of the most recently built sibling
    pub height: usize,
}

impl<'a> BuildContext<'a> {
    pub fn new(metrics: &'a dyn FontMetrics, tables: &'a SymbolTables) -> Self {
        Self {
            metrics,
            tables,
            baseline: 0,
            height: 1,
        }
    }

    /// Fresh context for descending into a child
    pub fn fork(&self) -> Self {
        Self::new(self.metrics, self.tables)
    }

    /// Record the box just built so the next sibling aligns against it
    pub fn absorb(&mut self, built: &LayoutBox) {
        self.baseline = built.baseline;
        self.height = built.height();
    }

    pub fn metrics(&self) -> &'a dyn FontMetrics {
        self.metrics
    }

    pub fn tables(&self) -> &'a SymbolTables {
        self.tables
    }
}

// =============================================================================
// Layout Engine
// =============================================================================

/// Entry point turning a token tree into a single box
pub struct LayoutEngine<'a> {
    metrics: &'a dyn FontMetrics,
    tables: &'a SymbolTables,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(metrics: &'a dyn FontMetrics, tables: &'a SymbolTables) -> Self {
        Self { metrics, tables }
    }

    /// Layout a token tree
    pub fn layout(&self, token: &Token) -> MathResult<LayoutBox> {
        let built = token.to_box(&BuildContext::new(self.metrics, self.tables))?;
        tracing::trace!(
            width = built.width,
            height = built.height(),
            baseline = built.baseline,
            "Laid out expression"
        );
        Ok(built)
    }
}

impl Token {
    /// Realize this token as a box
    pub fn to_box(&self, ctx: &BuildContext<'_>) -> MathResult<LayoutBox> {
        match self {
            Token::Literal(literal) => Ok(LayoutBox::text(&literal.text, ctx.metrics())),
            Token::Group(children) => build_sequence(children, ctx),
            Token::Bracket(group) => build_flexible(&group.children, group.kind, ctx),
            Token::Script(group) => build_script_group(group, ctx),
            Token::Function(function) => {
                match (&function.constructor, function.groups.as_slice()) {
                    (
                        Constructor::Fraction {
                            simple_divider,
                            complex_divider,
                            overfill,
                        },
                        [top, bottom],
                    ) => build_fraction(
                        top,
                        bottom,
                        FractionStyle {
                            simple_divider,
                            complex_divider,
                            overfill: *overfill,
                        },
                        ctx,
                    ),
                    (Constructor::FlexibleBracket { bracket }, [content]) => {
                        build_flexible(std::slice::from_ref(content), *bracket, ctx)
                    }
                    (constructor, groups) => Err(MathError::Build(format!(
                        "function '{}' expects {} groups, found {}",
                        function.name,
                        constructor.arity(),
                        groups.len()
                    ))),
                }
            }
        }
    }
}

/// Fold children left to right, each aligned against everything before it
fn build_sequence(children: &[Token], ctx: &BuildContext<'_>) -> MathResult<LayoutBox> {
    let mut local = ctx.fork();
    let mut children = children.iter();
    let Some(first) = children.next() else {
        return Ok(LayoutBox::empty());
    };

    let mut built = first.to_box(&local)?;
    local.absorb(&built);
    for child in children {
        let next = child.to_box(&local)?;
        built = built.combine(next);
        local.absorb(&built);
    }
    Ok(built)
}

struct FractionStyle<'s> {
    simple_divider: &'s str,
    complex_divider: &'s str,
    overfill: usize,
}

fn build_fraction(
    top: &Token,
    bottom: &Token,
    style: FractionStyle<'_>,
    ctx: &BuildContext<'_>,
) -> MathResult<LayoutBox> {
    let metrics = ctx.metrics();
    let tables = ctx.tables();

    if let (Some(numerator), Some(denominator)) = (
        simplify(top, &tables.superscripts),
        simplify(bottom, &tables.subscripts),
    ) {
        let line = format!("{numerator}{}{denominator}", style.simple_divider);
        return Ok(LayoutBox::text(&line, metrics));
    }

    let mut numerator = top.to_box(&ctx.fork())?;
    let mut denominator = bottom.to_box(&ctx.fork())?;

    let glyph_width = metrics.width(style.complex_divider);
    let widest = numerator.width.max(denominator.width);
    let glyphs = if glyph_width > 0.0 {
        (widest / glyph_width).ceil() as usize
    } else {
        0
    };
    let divider = style.complex_divider.repeat(glyphs + style.overfill);
    let width = metrics.width(&divider);

    numerator.shift((width - numerator.width) / 2.0);
    denominator.shift((width - denominator.width) / 2.0);

    let baseline = denominator.height();
    let mut rows = denominator.rows;
    rows.push(Row::with_fragment(0.0, divider));
    rows.append(&mut numerator.rows);

    tracing::trace!(width, height = rows.len(), "Built stacked fraction");
    Ok(LayoutBox::new(width, rows, baseline, Alignment::Inline))
}

fn build_flexible(
    children: &[Token],
    kind: BracketKind,
    ctx: &BuildContext<'_>,
) -> MathResult<LayoutBox> {
    let LayoutBox {
        width,
        rows,
        baseline,
        alignment,
    } = build_sequence(children, &ctx.fork())?;
    let metrics = ctx.metrics();

    let (left, right) = FlexChars::for_kind(kind);
    let left_glyphs = left.glyphs(rows.len());
    let right_glyphs = right.glyphs(rows.len());
    let left_width = widest_glyph(&left_glyphs, metrics);
    let right_width = widest_glyph(&right_glyphs, metrics);
    let right_offset = width + left_width;

    let rows = rows
        .into_iter()
        .zip(left_glyphs.iter().zip(&right_glyphs))
        .map(|(mut row, (left, right))| {
            row.shift(left_width);
            let mut framed = Row::with_fragment(0.0, left.to_string());
            framed.append(row);
            framed.push(right_offset, right.to_string());
            framed
        })
        .collect();

    Ok(LayoutBox::new(
        width + left_width + right_width,
        rows,
        baseline,
        alignment,
    ))
}

fn widest_glyph(glyphs: &[char], metrics: &dyn FontMetrics) -> f32 {
    glyphs
        .iter()
        .map(|glyph| metrics.width(&glyph.to_string()))
        .fold(0.0, f32::max)
}

/// Base followed by its scripts; the scripts see the base's height
fn build_script_group(group: &ScriptGroup, ctx: &BuildContext<'_>) -> MathResult<LayoutBox> {
    let mut local = ctx.fork();
    let base = build_sequence(&group.base, &local)?;
    local.absorb(&base);
    let scripts = build_scripts(&group.subscript, &group.superscript, &local)?;
    Ok(base.combine(scripts))
}

fn build_scripts(
    subscript: &[Token],
    superscript: &[Token],
    ctx: &BuildContext<'_>,
) -> MathResult<LayoutBox> {
    let metrics = ctx.metrics();
    let tables = ctx.tables();
    let simple_sub = simplify_all(subscript, &tables.subscripts);
    let simple_sup = simplify_all(superscript, &tables.superscripts);

    if let (Some(sub), Some(sup), 1) = (&simple_sub, &simple_sup, ctx.height) {
        let sub_width = metrics.width(sub);
        let mut row = Row::with_fragment(0.0, sub.as_str());
        row.push(sub_width, sup.as_str());
        return Ok(LayoutBox::new(
            sub_width + metrics.width(sup),
            vec![row],
            0,
            Alignment::Inline,
        ));
    }

    let sub_box = match &simple_sub {
        Some(text) => LayoutBox::text(text, metrics),
        None => build_sequence(subscript, &ctx.fork())?,
    };
    let sup_box = match &simple_sup {
        Some(text) => LayoutBox::text(text, metrics),
        None => build_sequence(superscript, &ctx.fork())?,
    };
    let width = sub_box.width.max(sup_box.width);

    let mut rows = sub_box.rows;
    if simple_sub.is_none() {
        rows.push(Row::new());
    }
    let sub_rows = rows.len();

    let gap = if simple_sup.is_some() {
        ctx.height.saturating_sub(2)
    } else {
        ctx.height.saturating_sub(1)
    };
    rows.extend(std::iter::repeat_with(Row::new).take(gap));
    rows.extend(sup_box.rows);

    let baseline = ctx.baseline + sub_rows - 1;
    Ok(LayoutBox::new(width, rows, baseline, Alignment::Inline))
}

/// Precomposed form of a script operand, if every character has one
fn simplify(token: &Token, table: &HashMap<char, String>) -> Option<String> {
    match token {
        Token::Literal(literal) => literal
            .text
            .chars()
            .map(|ch| table.get(&ch).map(String::as_str))
            .collect(),
        Token::Group(children) => simplify_all(children, table),
        _ => None,
    }
}

fn simplify_all(tokens: &[Token], table: &HashMap<char, String>) -> Option<String> {
    tokens.iter().map(|token| simplify(token, table)).collect()
}
