//! Error code coverage tests: every defined code (E100–E500) has at least one
//! test here asserting the full pipeline emits it.

use ochain_types::{Diagnostics, ErrorCode, Severity};

fn check(source: &str) -> Diagnostics {
    ochain_checker::type_check(source, "test.och")
}

fn assert_error(source: &str, expected_code: ErrorCode) {
    let errors = check(source);
    let has_code = errors.errors.iter().any(|e| e.code == expected_code);
    assert!(
        has_code,
        "expected error code {:?}, got: {:?}",
        expected_code,
        errors
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
    );
}

const S: &str = "struct S {\n  var x: Int = 0\n  let y: Int = 0\n  mutating func bump() {}\n}\n";

fn with_s(source: &str) -> String {
    format!("{S}{source}")
}

// ══════════════════════════════════════════════════════════════════════════════
// E100–E102: syntax
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn e100_unexpected_token() {
    assert_error("var x: Int = = 1\n", ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn e101_unclosed_delimiter() {
    // Unterminated string literal, reported by the lexer
    assert_error("_ = \"open\n", ErrorCode::UNCLOSED_DELIMITER);
    // Struct body missing its `}`, reported by the parser
    assert_error("struct U {\n  var a: Int = 0\n", ErrorCode::UNCLOSED_DELIMITER);
}

#[test]
fn e102_invalid_literal() {
    assert_error("_ = 99999999999999999999\n", ErrorCode::INVALID_LITERAL);
    assert_error("_ = \"bad \\q escape\"\n", ErrorCode::INVALID_LITERAL);
}

// ══════════════════════════════════════════════════════════════════════════════
// E200–E202: declarations
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn e200_unknown_type() {
    assert_error("var g: Nowhere = nil\n", ErrorCode::UNKNOWN_TYPE);
}

#[test]
fn e201_duplicate_declaration() {
    assert_error(&with_s("struct S {\n}\n"), ErrorCode::DUPLICATE_DECLARATION);
}

#[test]
fn e202_unknown_identifier() {
    assert_error("nobody?.x = 1\n", ErrorCode::UNKNOWN_IDENTIFIER);
}

// ══════════════════════════════════════════════════════════════════════════════
// E300–E305: types
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn e300_type_mismatch() {
    assert_error(&with_s("var s: S? = S()\n"), ErrorCode::TYPE_MISMATCH);
}

#[test]
fn e301_wrong_arg_count() {
    assert_error(&with_s("_ = S(1, 2)\n"), ErrorCode::WRONG_ARG_COUNT);
}

#[test]
fn e302_unknown_member() {
    assert_error(&with_s("var s: S? = nil\n_ = s?.z\n"), ErrorCode::UNKNOWN_MEMBER);
}

#[test]
fn e303_not_optional_chain() {
    assert_error(&with_s("var s = S()\n_ = s?.x\n"), ErrorCode::NOT_OPTIONAL_CHAIN);
}

#[test]
fn e304_operator_not_applicable() {
    assert_error(&with_s("var s: S? = nil\n++s?.x\n"), ErrorCode::OPERATOR_NOT_APPLICABLE);
}

#[test]
fn e305_unwrapped_optional_required() {
    assert_error(
        &with_s("var s: S? = nil\n_ = s?.x - 1\n"),
        ErrorCode::UNWRAPPED_OPTIONAL_REQUIRED,
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// E400–E402: mutability
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn e400_not_assignable() {
    assert_error(&with_s("S() = S()\n"), ErrorCode::NOT_ASSIGNABLE);
}

#[test]
fn e401_cannot_assign_immutable() {
    assert_error(&with_s("var s: S? = nil\ns?.y = 1\n"), ErrorCode::CANNOT_ASSIGN_IMMUTABLE);
}

#[test]
fn e402_mutating_on_immutable_receiver() {
    assert_error(
        &with_s("let s: S? = nil\ns?.bump()\n"),
        ErrorCode::MUTATING_ON_IMMUTABLE_RECEIVER,
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// E500: usage (warning)
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn e500_unused_result() {
    let diags = check(&with_s("var s: S? = nil\ns?.x\n"));
    assert!(!diags.has_errors());
    let warning = diags
        .warnings
        .iter()
        .find(|w| w.code == ErrorCode::UNUSED_RESULT)
        .expect("unused result warning");
    assert_eq!(warning.severity, Severity::Warning);
}
