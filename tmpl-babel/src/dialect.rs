//! Jinja → Django template dialect conversion
//!
//!     Templates are developed and previewed standalone with the Jinja engine (see
//!     [`crate::render`]) and then moved back into a Django project. The two dialects are
//!     close enough that a handful of lexical rewrites cover what our templates use:
//!
//!     | Jinja                 | Django                |
//!     |-----------------------|-----------------------|
//!     | `\|default("value")`  | `\|default:"value"`   |
//!     | `loop.index0`         | `forloop.counter0`    |
//!     | `loop.index`          | `forloop.counter`     |
//!     | `loop.first`          | `forloop.first`       |
//!
//!     This is not a grammar translation. The text is never parsed; every rule is a
//!     pattern substitution over the whole input, applied in the order of [`RULES`].
//!     Anything not listed above (other filters, `loop.last`, `{% set %}`, ...) is left
//!     untouched and needs manual review.
//!
//! Rule order
//!
//!     `loop.index` is a prefix of `loop.index0`, so the loop rules are listed from most
//!     to least specific and matched as whole tokens: an identifier character on either
//!     side of a candidate disqualifies it. This also makes the conversion idempotent,
//!     since `forloop.first` does not contain a standalone `loop.first`.
//!
//! Quoting
//!
//!     The default filter argument must open and close with the same quote character.
//!     Mismatched or unterminated literals do not match and are passed through as-is.
//!     Patterns inside string literals or comments are still rewritten.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A single rewrite performed by [`convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// `|default("v")` → `|default:"v"` (either quote character)
    DefaultFilter,
    /// `loop.index0` → `forloop.counter0`
    LoopIndex0,
    /// `loop.index` → `forloop.counter`
    LoopIndex,
    /// `loop.first` → `forloop.first`
    LoopFirst,
}

/// All rules, in application order.
pub const RULES: [Rule; 4] = [
    Rule::DefaultFilter,
    Rule::LoopIndex0,
    Rule::LoopIndex,
    Rule::LoopFirst,
];

/// Loop identifier renames, most specific first. The alternation built from this table
/// is leftmost-first, so an entry must come before any entry that is a prefix of it.
const LOOP_RENAMES: [(Rule, &str, &str); 3] = [
    (Rule::LoopIndex0, "loop.index0", "forloop.counter0"),
    (Rule::LoopIndex, "loop.index", "forloop.counter"),
    (Rule::LoopFirst, "loop.first", "forloop.first"),
];

static DEFAULT_FILTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\|default\((?P<literal>".*?"|'.*?')\)"#)
        .expect("valid regex for the default filter")
});

static LOOP_VARIABLE: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = LOOP_RENAMES
        .iter()
        .map(|(_, source, _)| regex::escape(source))
        .collect();
    Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
        .expect("valid regex for loop variables")
});

impl Rule {
    /// Short identifier used in reports and listings.
    pub fn name(self) -> &'static str {
        match self {
            Rule::DefaultFilter => "default-filter",
            Rule::LoopIndex0 => "loop-index0",
            Rule::LoopIndex => "loop-index",
            Rule::LoopFirst => "loop-first",
        }
    }

    /// Source dialect spelling, for display.
    pub fn source(self) -> &'static str {
        match self {
            Rule::DefaultFilter => "|default('value')",
            Rule::LoopIndex0 => "loop.index0",
            Rule::LoopIndex => "loop.index",
            Rule::LoopFirst => "loop.first",
        }
    }

    /// Target dialect spelling, for display.
    pub fn target(self) -> &'static str {
        match self {
            Rule::DefaultFilter => "|default:'value'",
            Rule::LoopIndex0 => "forloop.counter0",
            Rule::LoopIndex => "forloop.counter",
            Rule::LoopFirst => "forloop.first",
        }
    }

    fn slot(self) -> usize {
        match self {
            Rule::DefaultFilter => 0,
            Rule::LoopIndex0 => 1,
            Rule::LoopIndex => 2,
            Rule::LoopFirst => 3,
        }
    }
}

/// Number of replacements each rule made during a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    counts: [usize; RULES.len()],
}

impl ConversionReport {
    pub fn count(&self, rule: Rule) -> usize {
        self.counts[rule.slot()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Per-rule counts in application order, including rules that never fired.
    pub fn iter(&self) -> impl Iterator<Item = (Rule, usize)> + '_ {
        RULES.iter().map(move |rule| (*rule, self.count(*rule)))
    }

    fn record(&mut self, rule: Rule) {
        self.counts[rule.slot()] += 1;
    }
}

/// Convert Jinja template text to Django template syntax.
///
/// Total and pure: every input yields an output, which is identical to the input when
/// no rule matches.
pub fn convert(text: &str) -> String {
    convert_with_report(text).0
}

/// Same as [`convert`], also returning how many times each rule fired.
pub fn convert_with_report(text: &str) -> (String, ConversionReport) {
    let mut report = ConversionReport::default();

    let filtered = DEFAULT_FILTER.replace_all(text, |caps: &Captures| {
        report.record(Rule::DefaultFilter);
        format!("|default:{}", &caps["literal"])
    });

    let converted = LOOP_VARIABLE.replace_all(&filtered, |caps: &Captures| {
        let matched = &caps[0];
        match LOOP_RENAMES.iter().find(|(_, source, _)| *source == matched) {
            Some((rule, _, target)) => {
                report.record(*rule);
                (*target).to_string()
            }
            None => matched.to_string(),
        }
    });

    (converted.into_owned(), report)
}
