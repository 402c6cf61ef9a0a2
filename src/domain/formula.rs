//! Breeding formula parsing: raw catalog lines into validated records.
//!
//! A formula line reads `parent1+parent2=child`. Both operators are treated
//! as whitespace, so `a + b = c`, `a b c` and `+a+b=c` all yield the same
//! three tokens. Lines that do not reduce to exactly three tokens are skipped
//! (lenient mode) or rejected (strict mode).

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::domain::error::DomainError;

/// Operator joining the two parents.
pub const COMBINE_OPERATOR: char = '+';
/// Operator introducing the child.
pub const RESULT_OPERATOR: char = '=';

/// A validated `(parent, parent, child)` triple.
///
/// The parent pair is unordered: `A+B=C` and `B+A=C` describe the same recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedingRecord {
    pub parents: [String; 2],
    pub child: String,
}

impl BreedingRecord {
    pub fn new(
        first_parent: impl Into<String>,
        second_parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self {
            parents: [first_parent.into(), second_parent.into()],
            child: child.into(),
        }
    }

    /// Parent pair in canonical order, usable as an unordered key.
    pub fn parent_key(&self) -> (&str, &str) {
        let [a, b] = &self.parents;
        if a <= b {
            (a.as_str(), b.as_str())
        } else {
            (b.as_str(), a.as_str())
        }
    }

    pub fn same_parents(&self, other: &BreedingRecord) -> bool {
        self.parent_key() == other.parent_key()
    }

    pub fn is_self_breeding(&self) -> bool {
        self.parents[0] == self.parents[1]
    }
}

/// Renders the record in catalog file syntax.
impl fmt::Display for BreedingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.parents[0], COMBINE_OPERATOR, self.parents[1], RESULT_OPERATOR, self.child
        )
    }
}

/// Every distinct entity name seen on a well-formed line, in first-appearance order.
///
/// Filled before duplicate filtering, so names only introduced by a collapsed
/// duplicate line are still registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameRegistry {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` unless already known. Returns its position.
    pub fn register(&mut self, name: &str) -> usize {
        if let Some(&pos) = self.positions.get(name) {
            return pos;
        }
        let pos = self.names.len();
        self.names.push(name.to_string());
        self.positions.insert(name.to_string(), pos);
        pos
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// A non-blank line that did not reduce to three tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,
    pub content: String,
}

/// A line dropped because an earlier line already states the same recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedDuplicate {
    /// 1-based line number of the dropped line
    pub line: usize,
    /// 1-based line number of the surviving line
    pub duplicate_of: usize,
}

/// Everything the parser dropped without failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub skipped: Vec<SkippedLine>,
    pub collapsed: Vec<CollapsedDuplicate>,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.collapsed.is_empty()
    }
}

/// Result of parsing a whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCatalog {
    /// Surviving records in first-seen order
    pub records: Vec<BreedingRecord>,
    pub names: NameRegistry,
    pub report: ParseReport,
}

/// Turns catalog lines into records, a name registry and a parse report.
#[derive(Debug, Clone)]
pub struct FormulaParser {
    delimiter: Regex,
    strict: bool,
}

impl Default for FormulaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaParser {
    pub fn new() -> Self {
        Self {
            delimiter: Regex::new(r"[+=\s]+").unwrap(),
            strict: false,
        }
    }

    /// In strict mode a malformed line aborts the parse instead of being skipped.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Splits a line into `(parent, parent, child)` if it has exactly three tokens.
    pub fn tokenize<'a>(&self, line: &'a str) -> Option<[&'a str; 3]> {
        let mut tokens = self
            .delimiter
            .split(line.trim())
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let triple = [tokens.next()?, tokens.next()?, tokens.next()?];
        if tokens.next().is_some() {
            return None;
        }
        Some(triple)
    }

    pub fn parse_str(&self, content: &str) -> Result<ParsedCatalog, DomainError> {
        self.parse(content.lines())
    }

    /// Parses catalog lines.
    ///
    /// Fails with [`DomainError::ConflictingParentage`] if two records share an
    /// unordered parent pair but name different children. No partial result is
    /// returned in that case.
    #[instrument(level = "debug", skip_all, fields(strict = self.strict))]
    pub fn parse<'a, I>(&self, lines: I) -> Result<ParsedCatalog, DomainError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names = NameRegistry::new();
        let mut report = ParseReport::default();
        // (record, 1-based line number)
        let mut parsed: Vec<(BreedingRecord, usize)> = Vec::new();

        for (idx, raw) in lines.into_iter().enumerate() {
            let line_no = idx + 1;
            if raw.trim().is_empty() {
                continue;
            }
            let Some([p1, p2, child]) = self.tokenize(raw) else {
                if self.strict {
                    return Err(DomainError::MalformedLine {
                        line: line_no,
                        content: raw.to_string(),
                    });
                }
                warn!("skipping malformed line {}: {:?}", line_no, raw);
                report.skipped.push(SkippedLine {
                    line: line_no,
                    content: raw.to_string(),
                });
                continue;
            };
            names.register(p1);
            names.register(p2);
            names.register(child);
            parsed.push((BreedingRecord::new(p1, p2, child), line_no));
        }

        let removed = Self::find_duplicates(&parsed, &mut report)?;
        let records: Vec<BreedingRecord> = parsed
            .into_iter()
            .zip(removed)
            .filter(|(_, dropped)| !dropped)
            .map(|((record, _), _)| record)
            .collect();

        debug!(
            "parsed {} records, {} names, {} skipped, {} collapsed",
            records.len(),
            names.len(),
            report.skipped.len(),
            report.collapsed.len()
        );
        Ok(ParsedCatalog {
            records,
            names,
            report,
        })
    }

    /// Marks later duplicates for removal; a differing child for a known pair is fatal.
    fn find_duplicates(
        parsed: &[(BreedingRecord, usize)],
        report: &mut ParseReport,
    ) -> Result<Vec<bool>, DomainError> {
        let mut first_seen: HashMap<(&str, &str), usize> = HashMap::new();
        let mut removed = vec![false; parsed.len()];

        for (j, (record, line)) in parsed.iter().enumerate() {
            let Some(&i) = first_seen.get(&record.parent_key()) else {
                first_seen.insert(record.parent_key(), j);
                continue;
            };
            let (survivor, survivor_line) = &parsed[i];
            if survivor.child != record.child {
                return Err(DomainError::ConflictingParentage {
                    first_parent: survivor.parents[0].clone(),
                    second_parent: survivor.parents[1].clone(),
                    existing: survivor.child.clone(),
                    existing_line: *survivor_line,
                    conflicting: record.child.clone(),
                    line: *line,
                });
            }
            warn!(
                "line {} duplicates line {}: {}",
                line, survivor_line, record
            );
            report.collapsed.push(CollapsedDuplicate {
                line: *line,
                duplicate_of: *survivor_line,
            });
            removed[j] = true;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(content: &str) -> Result<ParsedCatalog, DomainError> {
        FormulaParser::new().parse_str(content)
    }

    #[rstest]
    #[case("A+B=C")]
    #[case("  A + B = C  ")]
    #[case("A B C")]
    #[case("+A+B==C")]
    #[case("A\t+\tB\t=\tC")]
    fn given_three_tokens_when_tokenizing_then_returns_triple(#[case] line: &str) {
        let parser = FormulaParser::new();
        assert_eq!(parser.tokenize(line), Some(["A", "B", "C"]));
    }

    #[rstest]
    #[case("A+B")]
    #[case("A+B=C=D")]
    #[case("=")]
    #[case("A")]
    fn given_wrong_token_count_when_tokenizing_then_none(#[case] line: &str) {
        let parser = FormulaParser::new();
        assert_eq!(parser.tokenize(line), None);
    }

    #[test]
    fn given_malformed_and_blank_lines_when_parsing_then_skips_them() {
        let catalog = parse("A+B=C\n\nnonsense\n  \nC+D=E\n").unwrap();

        assert_eq!(
            catalog.records,
            vec![
                BreedingRecord::new("A", "B", "C"),
                BreedingRecord::new("C", "D", "E"),
            ]
        );
        assert_eq!(
            catalog.report.skipped,
            vec![SkippedLine {
                line: 3,
                content: "nonsense".to_string()
            }]
        );
    }

    #[test]
    fn given_strict_mode_when_line_malformed_then_errors() {
        let parser = FormulaParser::new().with_strict(true);

        let result = parser.parse_str("A+B=C\n\nA+B\n");

        assert_eq!(
            result,
            Err(DomainError::MalformedLine {
                line: 3,
                content: "A+B".to_string()
            })
        );
    }

    #[test]
    fn given_names_when_parsing_then_registry_keeps_first_appearance_order() {
        let catalog = parse("B+A=C\nC+A=D\nD+D=E\n").unwrap();

        assert_eq!(catalog.names.names(), &["B", "A", "C", "D", "E"]);
        assert_eq!(catalog.names.position("D"), Some(3));
    }

    #[rstest]
    #[case("A+B=C\nA+B=C\n")]
    #[case("A+B=C\nB+A=C\n")]
    fn given_duplicate_recipe_when_parsing_then_collapses_to_one(#[case] content: &str) {
        let catalog = parse(content).unwrap();

        assert_eq!(catalog.records.len(), 1);
        assert_eq!(
            catalog.report.collapsed,
            vec![CollapsedDuplicate {
                line: 2,
                duplicate_of: 1
            }]
        );
    }

    #[rstest]
    #[case("A+B=C\nB+A=D\n")]
    #[case("B+A=D\nA+B=C\n")]
    #[case("A+B=C\nX+Y=Z\nA+B=C\nA+B=D\n")]
    fn given_conflicting_children_when_parsing_then_errors(#[case] content: &str) {
        let result = parse(content);

        assert!(matches!(
            result,
            Err(DomainError::ConflictingParentage { .. })
        ));
    }

    #[test]
    fn given_conflict_when_parsing_then_error_names_both_lines() {
        let err = parse("A+B=C\nX+Y=Z\nB+A=D\n").unwrap_err();

        match err {
            DomainError::ConflictingParentage {
                existing,
                existing_line,
                conflicting,
                line,
                ..
            } => {
                assert_eq!(existing, "C");
                assert_eq!(existing_line, 1);
                assert_eq!(conflicting, "D");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn given_name_only_on_duplicate_line_when_parsing_then_registry_still_has_it() {
        // The registry is built per line before duplicates are dropped.
        let catalog = parse("A+B=C\nB+A=C\n").unwrap();

        assert_eq!(catalog.names.len(), 3);
        assert!(catalog.names.contains("C"));
    }

    #[test]
    fn given_same_file_when_parsing_twice_then_results_are_identical() {
        let content = "A+B=C\nB+A=C\nbad line here now\nC+D=E\n";

        assert_eq!(parse(content).unwrap(), parse(content).unwrap());
    }

    #[test]
    fn given_record_when_displayed_then_uses_catalog_syntax() {
        let record = BreedingRecord::new("Lamball", "Cattiva", "Mau");
        assert_eq!(record.to_string(), "Lamball+Cattiva=Mau");
    }

    #[test]
    fn given_swapped_parents_when_comparing_then_same_parents() {
        let a = BreedingRecord::new("A", "B", "C");
        let b = BreedingRecord::new("B", "A", "X");
        assert!(a.same_parents(&b));
        assert!(!a.is_self_breeding());
        assert!(BreedingRecord::new("A", "A", "C").is_self_breeding());
    }
}
