//! Conditional-compilation filtering.
//!
//! Strips code guarded by false `#if`/`#ifdef` branches before any other
//! stage runs. Only flag symbols are supported: `#ifdef X`, `#ifndef X`,
//! and `#if`/`#elif` over a bare identifier or its `!`-negation. Compound
//! preprocessor expressions are not evaluated and count as false.
//!
//! Lines inside an inactive branch are replaced with empty lines, never
//! removed, so line-number-sensitive diagnostics downstream stay accurate.
//! Unbalanced directives (stray `#endif`, `#elif` without `#if`) are
//! tolerated silently; this is a scanner, not a preprocessor.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Matches a conditional directive line, capturing the keyword and rest.
static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#\s*(if|ifdef|ifndef|elif|else|endif)\b(.*)$").expect("invalid directive regex")
});

/// Matches the only `#if`/`#elif` condition shape we evaluate: an optional
/// `!` followed by a single identifier.
static FLAG_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(!)?\s*([A-Za-z_]\w*)\s*$").expect("invalid flag regex"));

/// How a conditional frame was opened. `#elif` only re-evaluates frames
/// opened by `#if`, matching the original extractor's behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    If,
    Ifdef,
    Ifndef,
}

/// One nested conditional.
#[derive(Debug)]
struct Frame {
    /// Whether the current branch of this frame is active.
    active: bool,
    /// Whether any earlier branch in this chain already fired.
    seen_true: bool,
    kind: FrameKind,
}

/// Evaluate a `#if`/`#elif` condition against the defines set.
///
/// Anything other than `IDENT` or `!IDENT` evaluates to false.
fn eval_flag(expr: &str, defines: &BTreeSet<String>) -> bool {
    let Some(caps) = FLAG_EXPR.captures(expr) else {
        return false;
    };
    let defined = defines.contains(&caps[2]);
    if caps.get(1).is_some() { !defined } else { defined }
}

/// Apply conditional-compilation filtering to `source`.
///
/// Returns text of the same line count where every line inside an inactive
/// branch (and every directive line) has been blanked.
#[must_use]
pub fn apply_defines(source: &str, defines: &BTreeSet<String>) -> String {
    let mut stack: Vec<Frame> = Vec::new();
    let mut out: Vec<&str> = Vec::new();

    for line in source.lines() {
        if let Some(caps) = DIRECTIVE.captures(line) {
            let rest = caps.get(2).map_or("", |m| m.as_str()).trim();
            let enclosing_active = stack.iter().all(|f| f.active);
            match &caps[1] {
                "ifdef" => {
                    let cond = defines.contains(rest);
                    stack.push(Frame {
                        active: enclosing_active && cond,
                        seen_true: cond,
                        kind: FrameKind::Ifdef,
                    });
                }
                "ifndef" => {
                    let cond = !defines.contains(rest);
                    stack.push(Frame {
                        active: enclosing_active && cond,
                        seen_true: cond,
                        kind: FrameKind::Ifndef,
                    });
                }
                "if" => {
                    let cond = eval_flag(rest, defines);
                    stack.push(Frame {
                        active: enclosing_active && cond,
                        seen_true: cond,
                        kind: FrameKind::If,
                    });
                }
                "elif" => {
                    // Activity of everything outside the frame being rewritten.
                    let outer_active = stack[..stack.len().saturating_sub(1)]
                        .iter()
                        .all(|f| f.active);
                    // `#elif` after `#ifdef`/`#ifndef` is ignored.
                    if let Some(top) = stack.last_mut().filter(|f| f.kind == FrameKind::If) {
                        if top.seen_true {
                            top.active = false;
                        } else {
                            let cond = eval_flag(rest, defines);
                            top.active = outer_active && cond;
                            top.seen_true = cond;
                        }
                    }
                }
                "else" => {
                    let outer_active = stack[..stack.len().saturating_sub(1)]
                        .iter()
                        .all(|f| f.active);
                    if let Some(top) = stack.last_mut() {
                        top.active = outer_active && !top.seen_true;
                        top.seen_true = top.seen_true || top.active;
                    }
                }
                "endif" => {
                    stack.pop();
                }
                _ => unreachable!("directive regex limits alternatives"),
            }
            out.push("");
            continue;
        }

        if stack.iter().all(|f| f.active) {
            out.push(line);
        } else {
            out.push("");
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn defines(syms: &[&str]) -> BTreeSet<String> {
        syms.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_ifdef_keeps_active_branch() {
        let src = "#ifdef FOO\nint a;\n#else\nint b;\n#endif\nint c;";
        let with = apply_defines(src, &defines(&["FOO"]));
        let without = apply_defines(src, &defines(&[]));
        assert_eq!(with, "\nint a;\n\n\n\nint c;");
        assert_eq!(without, "\n\n\nint b;\n\nint c;");
    }

    #[test]
    fn test_line_count_is_preserved() {
        let src = "#ifdef FOO\nint a;\n#endif\nint c;";
        let out = apply_defines(src, &defines(&[]));
        assert_eq!(out.lines().count(), src.lines().count());
    }

    #[test]
    fn test_ifndef() {
        let src = "#ifndef FOO\nint a;\n#endif";
        assert_eq!(apply_defines(src, &defines(&[])), "\nint a;\n");
        assert_eq!(apply_defines(src, &defines(&["FOO"])), "\n\n");
    }

    #[test]
    fn test_if_bare_identifier_and_negation() {
        let src = "#if !FOO\nint a;\n#endif";
        assert_eq!(apply_defines(src, &defines(&[])), "\nint a;\n");
        assert_eq!(apply_defines(src, &defines(&["FOO"])), "\n\n");
    }

    #[test]
    fn test_compound_expression_is_false() {
        let src = "#if FOO && BAR\nint a;\n#endif";
        assert_eq!(apply_defines(src, &defines(&["FOO", "BAR"])), "\n\n");
    }

    #[test]
    fn test_elif_chain_fires_once() {
        let src = "#if A\nint a;\n#elif B\nint b;\n#elif C\nint c;\n#endif";
        assert_eq!(apply_defines(src, &defines(&["B", "C"])), "\n\n\nint b;\n\n\n");
    }

    #[test]
    fn test_elif_ignored_on_ifdef_frame() {
        // The original extractor only re-evaluates #elif on #if frames.
        let src = "#ifdef A\nint a;\n#elif B\nint b;\n#endif";
        assert_eq!(apply_defines(src, &defines(&["B"])), "\n\n\n\n");
    }

    #[test]
    fn test_nested_inactive_outer_wins() {
        let src = "#ifdef A\n#ifdef B\nint ab;\n#endif\n#endif";
        assert_eq!(apply_defines(src, &defines(&["B"])), "\n\n\n\n");
    }

    #[test]
    fn test_stray_directives_tolerated() {
        let src = "#endif\n#else\nint a;\n#elif FOO\nint b;";
        // Stray #else with no frame leaves following lines active.
        assert_eq!(apply_defines(src, &defines(&[])), "\n\nint a;\n\nint b;");
    }
}
