//! Symbol and function tables consumed read-only by the tokenizer and layout
//!
//! The builtin tables cover the common cases; a JSON file can extend them
//! (see [`SymbolTables::from_json`]). Tables are loaded once and then only
//! ever borrowed.

use crate::error::{MathError, MathResult};
use crate::model::BracketKind;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

// =============================================================================
// Function constructors
// =============================================================================

/// Layout constructor selected by a parametrized function, with its arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "constructor", rename_all = "kebab-case")]
pub enum Constructor {
    /// Numerator over denominator
    Fraction {
        /// Placed between precomposed operands on a single line
        simple_divider: String,
        /// Repeated to draw the bar of a stacked fraction
        complex_divider: String,
        /// Extra divider glyphs beyond the widest operand
        #[serde(default)]
        overfill: usize,
    },
    /// Single argument wrapped in flexible brackets
    FlexibleBracket { bracket: BracketKind },
}

impl Constructor {
    /// Number of argument groups the constructor consumes
    pub fn arity(&self) -> usize {
        match self {
            Constructor::Fraction { .. } => 2,
            Constructor::FlexibleBracket { .. } => 1,
        }
    }

    pub fn fraction() -> Self {
        Constructor::Fraction {
            simple_divider: "\u{2044}".to_string(),
            complex_divider: "\u{2014}".to_string(),
            overfill: 1,
        }
    }
}

/// Entry of the parametrized-function table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    #[serde(flatten)]
    pub constructor: Constructor,
    /// Number of following groups the function fetches
    pub groups: usize,
}

impl FunctionSpec {
    pub fn new(constructor: Constructor) -> Self {
        let groups = constructor.arity();
        Self {
            constructor,
            groups,
        }
    }
}

// =============================================================================
// Spacing classes
// =============================================================================

/// Character classes driving implicit spacing between siblings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpacingClasses {
    /// Characters that sit flush against each other
    pub never_spaced: HashSet<char>,
    /// Relations such as `=` after which a unary sign binds tightly
    pub equality: HashSet<char>,
    /// Signs that may act as unary prefixes
    pub unary: HashSet<char>,
}

impl SpacingClasses {
    pub fn is_never_spaced(&self, ch: char) -> bool {
        self.never_spaced.contains(&ch)
    }

    pub fn is_equality(&self, ch: char) -> bool {
        self.equality.contains(&ch)
    }

    pub fn is_unary(&self, ch: char) -> bool {
        self.unary.contains(&ch)
    }

    pub fn builtin() -> Self {
        let mut never_spaced: HashSet<char> = ('a'..='z')
            .chain('A'..='Z')
            .chain('0'..='9')
            .chain('α'..='ω')
            .chain('Α'..='Ω')
            .collect();
        never_spaced.extend(".,!'′∞∂∇ℝℕℤℚℂ".chars());

        Self {
            never_spaced,
            equality: "=<>≤≥≠≈≡→⇒⇔←∈∉⊂⊃⊆⊇∝:".chars().collect(),
            unary: "-+±∓−¬".chars().collect(),
        }
    }
}

// =============================================================================
// Tables
// =============================================================================

/// Every lookup table the tokenizer and layout engine consult
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTables {
    /// `\name` to glyph
    pub escapes: HashMap<String, String>,
    /// Character to precomposed subscript form
    pub subscripts: HashMap<char, String>,
    /// Character to precomposed superscript form
    pub superscripts: HashMap<char, String>,
    pub spacing: SpacingClasses,
    /// Function name to input-text to output-text substitutions
    pub simple_functions: HashMap<String, HashMap<String, String>>,
    /// Function name to layout constructor
    pub functions: HashMap<String, FunctionSpec>,
}

impl Default for SymbolTables {
    fn default() -> Self {
        Self::builtin()
    }
}

/// On-disk shape of a table file; every section is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TableFile {
    escapes: HashMap<String, String>,
    subscripts: HashMap<String, String>,
    superscripts: HashMap<String, String>,
    spacing: Option<SpacingFile>,
    simple_functions: HashMap<String, HashMap<String, String>>,
    functions: HashMap<String, FunctionSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpacingFile {
    never_spaced: String,
    equality: String,
    unary: String,
}

impl TableFile {
    /// Replacement text lands inside one row, so it may not break lines
    fn check_single_line(&self) -> MathResult<()> {
        let values = self
            .escapes
            .iter()
            .map(|(key, value)| ("escapes", key, value))
            .chain(self.subscripts.iter().map(|(k, v)| ("subscripts", k, v)))
            .chain(self.superscripts.iter().map(|(k, v)| ("superscripts", k, v)))
            .chain(self.simple_functions.iter().flat_map(|(name, entries)| {
                entries.iter().map(move |(k, v)| (name.as_str(), k, v))
            }));
        let dividers = self
            .functions
            .iter()
            .flat_map(|(name, spec)| match &spec.constructor {
                Constructor::Fraction {
                    simple_divider,
                    complex_divider,
                    ..
                } => vec![(name, simple_divider), (name, complex_divider)],
                Constructor::FlexibleBracket { .. } => Vec::new(),
            })
            .map(|(name, value)| ("functions", name, value));

        for (table, key, value) in values.chain(dividers) {
            if value.contains(['\n', '\r']) {
                return Err(MathError::Config(format!(
                    "{table} entry {key:?} must not contain a line break"
                )));
            }
        }
        Ok(())
    }
}

impl SymbolTables {
    /// Tables shipped with the crate
    pub fn builtin() -> Self {
        Self {
            escapes: pairs(ESCAPES),
            subscripts: char_pairs(SUBSCRIPTS),
            superscripts: char_pairs(SUPERSCRIPTS),
            spacing: SpacingClasses::builtin(),
            simple_functions: SIMPLE_FUNCTIONS
                .iter()
                .map(|(name, entries)| (name.to_string(), pairs(entries)))
                .collect(),
            functions: HashMap::from([
                ("frac".to_string(), FunctionSpec::new(Constructor::fraction())),
                (
                    "abs".to_string(),
                    FunctionSpec::new(Constructor::FlexibleBracket {
                        bracket: BracketKind::Bar,
                    }),
                ),
            ]),
        }
    }

    /// Builtin tables extended (and where keys collide, overridden) by a JSON document
    pub fn from_json(json: &str) -> MathResult<Self> {
        let file: TableFile = serde_json::from_str(json)?;
        let mut tables = Self::builtin();
        tables.extend(file)?;
        Ok(tables)
    }

    /// Load a JSON table file on top of the builtin tables
    pub fn load(path: impl AsRef<Path>) -> MathResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let tables = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            escapes = tables.escapes.len(),
            functions = tables.functions.len(),
            "Loaded symbol tables"
        );
        Ok(tables)
    }

    fn extend(&mut self, file: TableFile) -> MathResult<()> {
        file.check_single_line()?;
        self.escapes.extend(file.escapes);
        self.subscripts.extend(script_entries(file.subscripts, "subscripts")?);
        self.superscripts
            .extend(script_entries(file.superscripts, "superscripts")?);

        if let Some(spacing) = file.spacing {
            self.spacing = SpacingClasses {
                never_spaced: spacing.never_spaced.chars().collect(),
                equality: spacing.equality.chars().collect(),
                unary: spacing.unary.chars().collect(),
            };
        }

        for (name, entries) in file.simple_functions {
            self.simple_functions.entry(name).or_default().extend(entries);
        }

        for (name, spec) in file.functions {
            if spec.groups != spec.constructor.arity() {
                return Err(MathError::Config(format!(
                    "function '{}' declares {} groups but its constructor takes {}",
                    name,
                    spec.groups,
                    spec.constructor.arity()
                )));
            }
            self.functions.insert(name, spec);
        }
        Ok(())
    }

    /// Fraction constructor used by the `/` shortcut
    pub fn fraction_constructor(&self) -> Constructor {
        match self.functions.get("frac") {
            Some(FunctionSpec {
                constructor: constructor @ Constructor::Fraction { .. },
                ..
            }) => constructor.clone(),
            _ => Constructor::fraction(),
        }
    }
}

fn pairs(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

fn char_pairs(entries: &[(char, &str)]) -> HashMap<char, String> {
    entries.iter().map(|(from, to)| (*from, to.to_string())).collect()
}

fn script_entries(
    entries: HashMap<String, String>,
    table: &str,
) -> MathResult<HashMap<char, String>> {
    entries
        .into_iter()
        .map(|(key, value)| {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Ok((ch, value)),
                _ => Err(MathError::Config(format!(
                    "{table} key {key:?} must be a single character"
                ))),
            }
        })
        .collect()
}

// =============================================================================
// Builtin data
// =============================================================================

const ESCAPES: &[(&str, &str)] = &[
    // Greek
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("varepsilon", "ε"),
    ("zeta", "ζ"),
    ("eta", "η"),
    ("theta", "θ"),
    ("vartheta", "ϑ"),
    ("iota", "ι"),
    ("kappa", "κ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("nu", "ν"),
    ("xi", "ξ"),
    ("pi", "π"),
    ("rho", "ρ"),
    ("sigma", "σ"),
    ("tau", "τ"),
    ("upsilon", "υ"),
    ("phi", "φ"),
    ("varphi", "ϕ"),
    ("chi", "χ"),
    ("psi", "ψ"),
    ("omega", "ω"),
    ("Gamma", "Γ"),
    ("Delta", "Δ"),
    ("Theta", "Θ"),
    ("Lambda", "Λ"),
    ("Xi", "Ξ"),
    ("Pi", "Π"),
    ("Sigma", "Σ"),
    ("Phi", "Φ"),
    ("Psi", "Ψ"),
    ("Omega", "Ω"),
    // Operators and relations
    ("pm", "±"),
    ("mp", "∓"),
    ("times", "×"),
    ("div", "÷"),
    ("cdot", "⋅"),
    ("ast", "∗"),
    ("leq", "≤"),
    ("le", "≤"),
    ("geq", "≥"),
    ("ge", "≥"),
    ("neq", "≠"),
    ("ne", "≠"),
    ("approx", "≈"),
    ("equiv", "≡"),
    ("sim", "∼"),
    ("propto", "∝"),
    ("in", "∈"),
    ("notin", "∉"),
    ("subset", "⊂"),
    ("supset", "⊃"),
    ("subseteq", "⊆"),
    ("supseteq", "⊇"),
    ("cup", "∪"),
    ("cap", "∩"),
    ("wedge", "∧"),
    ("vee", "∨"),
    ("neg", "¬"),
    ("forall", "∀"),
    ("exists", "∃"),
    ("to", "→"),
    ("rightarrow", "→"),
    ("leftarrow", "←"),
    ("Rightarrow", "⇒"),
    ("Leftarrow", "⇐"),
    ("Leftrightarrow", "⇔"),
    ("mapsto", "↦"),
    // Large operators and misc
    ("sum", "∑"),
    ("prod", "∏"),
    ("int", "∫"),
    ("oint", "∮"),
    ("sqrt", "√"),
    ("infty", "∞"),
    ("partial", "∂"),
    ("nabla", "∇"),
    ("emptyset", "∅"),
    ("angle", "∠"),
    ("perp", "⊥"),
    ("degree", "°"),
    ("cdots", "⋯"),
    ("ldots", "…"),
    ("prime", "′"),
    // Escaped punctuation
    ("{", "{"),
    ("}", "}"),
    ("_", "_"),
    ("^", "^"),
    ("/", "/"),
    ("|", "‖"),
    ("%", "%"),
    ("$", "$"),
];

const SUBSCRIPTS: &[(char, &str)] = &[
    ('0', "₀"),
    ('1', "₁"),
    ('2', "₂"),
    ('3', "₃"),
    ('4', "₄"),
    ('5', "₅"),
    ('6', "₆"),
    ('7', "₇"),
    ('8', "₈"),
    ('9', "₉"),
    ('+', "₊"),
    ('-', "₋"),
    ('−', "₋"),
    ('=', "₌"),
    ('(', "₍"),
    (')', "₎"),
    ('a', "ₐ"),
    ('e', "ₑ"),
    ('h', "ₕ"),
    ('i', "ᵢ"),
    ('j', "ⱼ"),
    ('k', "ₖ"),
    ('l', "ₗ"),
    ('m', "ₘ"),
    ('n', "ₙ"),
    ('o', "ₒ"),
    ('p', "ₚ"),
    ('r', "ᵣ"),
    ('s', "ₛ"),
    ('t', "ₜ"),
    ('u', "ᵤ"),
    ('v', "ᵥ"),
    ('x', "ₓ"),
    ('β', "ᵦ"),
    ('γ', "ᵧ"),
    ('ρ', "ᵨ"),
    ('φ', "ᵩ"),
    ('χ', "ᵪ"),
];

const SUPERSCRIPTS: &[(char, &str)] = &[
    ('0', "⁰"),
    ('1', "¹"),
    ('2', "²"),
    ('3', "³"),
    ('4', "⁴"),
    ('5', "⁵"),
    ('6', "⁶"),
    ('7', "⁷"),
    ('8', "⁸"),
    ('9', "⁹"),
    ('+', "⁺"),
    ('-', "⁻"),
    ('−', "⁻"),
    ('=', "⁼"),
    ('(', "⁽"),
    (')', "⁾"),
    ('a', "ᵃ"),
    ('b', "ᵇ"),
    ('c', "ᶜ"),
    ('d', "ᵈ"),
    ('e', "ᵉ"),
    ('f', "ᶠ"),
    ('g', "ᵍ"),
    ('h', "ʰ"),
    ('i', "ⁱ"),
    ('j', "ʲ"),
    ('k', "ᵏ"),
    ('l', "ˡ"),
    ('m', "ᵐ"),
    ('n', "ⁿ"),
    ('o', "ᵒ"),
    ('p', "ᵖ"),
    ('r', "ʳ"),
    ('s', "ˢ"),
    ('t', "ᵗ"),
    ('u', "ᵘ"),
    ('v', "ᵛ"),
    ('w', "ʷ"),
    ('x', "ˣ"),
    ('y', "ʸ"),
    ('z', "ᶻ"),
    ('A', "ᴬ"),
    ('B', "ᴮ"),
    ('D', "ᴰ"),
    ('E', "ᴱ"),
    ('G', "ᴳ"),
    ('H', "ᴴ"),
    ('I', "ᴵ"),
    ('J', "ᴶ"),
    ('K', "ᴷ"),
    ('L', "ᴸ"),
    ('M', "ᴹ"),
    ('N', "ᴺ"),
    ('O', "ᴼ"),
    ('P', "ᴾ"),
    ('R', "ᴿ"),
    ('T', "ᵀ"),
    ('U', "ᵁ"),
    ('V', "ⱽ"),
    ('W', "ᵂ"),
    ('α', "ᵅ"),
    ('β', "ᵝ"),
    ('γ', "ᵞ"),
    ('δ', "ᵟ"),
    ('θ', "ᶿ"),
    ('φ', "ᵠ"),
    ('χ', "ᵡ"),
];

const SIMPLE_FUNCTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "mathbb",
        &[
            ("C", "ℂ"),
            ("H", "ℍ"),
            ("N", "ℕ"),
            ("P", "ℙ"),
            ("Q", "ℚ"),
            ("R", "ℝ"),
            ("Z", "ℤ"),
        ],
    ),
    (
        "mathcal",
        &[
            ("B", "ℬ"),
            ("E", "ℰ"),
            ("F", "ℱ"),
            ("H", "ℋ"),
            ("L", "ℒ"),
            ("M", "ℳ"),
            ("R", "ℛ"),
        ],
    ),
    (
        "vec",
        &[
            ("a", "a\u{20D7}"),
            ("b", "b\u{20D7}"),
            ("u", "u\u{20D7}"),
            ("v", "v\u{20D7}"),
            ("x", "x\u{20D7}"),
            ("F", "F\u{20D7}"),
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables() {
        let tables = SymbolTables::builtin();
        assert_eq!(tables.escapes["alpha"], "α");
        assert_eq!(tables.subscripts[&'1'], "₁");
        assert_eq!(tables.superscripts[&'2'], "²");
        assert_eq!(tables.simple_functions["mathbb"]["R"], "ℝ");
        assert_eq!(tables.functions["frac"].groups, 2);
        assert!(tables.spacing.is_never_spaced('x'));
        assert!(tables.spacing.is_equality('='));
        assert!(tables.spacing.is_unary('-'));
        assert!(!tables.spacing.is_never_spaced('+'));
    }

    #[test]
    fn test_tables_extend_builtin() {
        let json = r#"{
            "escapes": {"hbar": "ħ"},
            "superscripts": {"q": "𐞥"},
            "simple_functions": {"mathbb": {"K": "𝕂"}},
            "functions": {
                "over": {"constructor": "fraction", "groups": 2,
                         "simple_divider": "/", "complex_divider": "-", "overfill": 2},
                "norm": {"constructor": "flexible-bracket", "groups": 1, "bracket": "square"}
            }
        }"#;
        let tables = SymbolTables::from_json(json).unwrap();

        assert_eq!(tables.escapes["hbar"], "ħ");
        assert_eq!(tables.escapes["alpha"], "α");
        assert_eq!(tables.superscripts[&'q'], "𐞥");
        assert_eq!(tables.simple_functions["mathbb"]["K"], "𝕂");
        assert_eq!(tables.simple_functions["mathbb"]["R"], "ℝ");
        assert_eq!(
            tables.functions["over"].constructor,
            Constructor::Fraction {
                simple_divider: "/".into(),
                complex_divider: "-".into(),
                overfill: 2,
            }
        );
        assert_eq!(
            tables.functions["norm"].constructor,
            Constructor::FlexibleBracket {
                bracket: BracketKind::Square
            }
        );
    }

    #[test]
    fn test_spacing_section_replaces_classes() {
        let json = r#"{"spacing": {"never_spaced": "ab", "equality": "=", "unary": "-"}}"#;
        let tables = SymbolTables::from_json(json).unwrap();
        assert!(tables.spacing.is_never_spaced('a'));
        assert!(!tables.spacing.is_never_spaced('x'));
    }

    #[test]
    fn test_rejects_multi_char_script_keys() {
        let err = SymbolTables::from_json(r#"{"subscripts": {"ab": "x"}}"#).unwrap_err();
        assert!(matches!(err, MathError::Config(_)));
    }

    #[test]
    fn test_rejects_line_breaks_in_replacements() {
        let err = SymbolTables::from_json(r#"{"escapes": {"two": "a\nb"}}"#).unwrap_err();
        assert!(matches!(err, MathError::Config(_)));

        let json = r#"{"simple_functions": {"mathbb": {"X": "x\r"}}}"#;
        assert!(matches!(
            SymbolTables::from_json(json),
            Err(MathError::Config(_))
        ));

        let json = r#"{"functions": {"over": {"constructor": "fraction", "groups": 2,
                       "simple_divider": "/", "complex_divider": "-\n-"}}}"#;
        assert!(matches!(
            SymbolTables::from_json(json),
            Err(MathError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_group_count() {
        let json = r#"{"functions": {"frac3": {"constructor": "fraction", "groups": 3,
                       "simple_divider": "/", "complex_divider": "-"}}}"#;
        let err = SymbolTables::from_json(json).unwrap_err();
        assert!(matches!(err, MathError::Config(_)));
    }

    #[test]
    fn test_fraction_constructor_follows_table() {
        let mut tables = SymbolTables::builtin();
        assert_eq!(tables.fraction_constructor(), Constructor::fraction());

        tables.functions.remove("frac");
        assert_eq!(tables.fraction_constructor(), Constructor::fraction());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        std::fs::write(&path, r#"{"escapes": {"ell": "ℓ"}}"#).unwrap();

        let tables = SymbolTables::load(&path).unwrap();
        assert_eq!(tables.escapes["ell"], "ℓ");
        assert!(matches!(
            SymbolTables::load(dir.path().join("missing.json")),
            Err(MathError::Io(_))
        ));
    }
}
