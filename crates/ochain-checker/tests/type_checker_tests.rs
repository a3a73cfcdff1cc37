//! Type-checker integration tests.
//!
//! Each test parses + checks a source program via `ochain_checker::type_check`
//! (or `check_source` when options matter) and asserts on the presence (or
//! absence) of specific error codes.

use ochain_checker::{check_source, CheckOptions};
use ochain_types::{Diagnostics, ErrorCode};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// The declarations every chain test runs against.
const PRELUDE: &str = r#"
struct S {
  var x: Int = 0
  let y: Int = 0

  mutating func mutateS() {}
  func doubled() -> Int {}

  init() {}
}

struct T {
  var mutS: S? = nil
  let immS: S? = nil

  mutating func mutateT() {}

  init() {}
}

var mutT: T?
let immT: T? = nil
"#;

fn promoted() -> CheckOptions {
    CheckOptions {
        optional_promotion: true,
        ..CheckOptions::default()
    }
}

fn check_with(source: &str, options: &CheckOptions) -> Diagnostics {
    check_source(&format!("{PRELUDE}{source}"), "test.och", options).diagnostics
}

fn check(source: &str) -> Diagnostics {
    check_with(source, &promoted())
}

fn describe(errors: &Diagnostics) -> String {
    errors
        .errors
        .iter()
        .map(|e| format!("  [{}] {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("\n")
}

fn assert_ok(source: &str) {
    let errors = check(source);
    assert!(
        !errors.has_errors(),
        "expected no errors for `{source}`, got {}:\n{}",
        errors.total_errors,
        describe(&errors)
    );
}

fn assert_error(source: &str, expected_code: ErrorCode) {
    let errors = check(source);
    assert_eq!(
        errors.error_codes(),
        vec![expected_code],
        "for `{source}`:\n{}",
        describe(&errors)
    );
}

fn assert_error_with(source: &str, options: &CheckOptions, expected_code: ErrorCode) {
    let errors = check_with(source, options);
    assert_eq!(
        errors.error_codes(),
        vec![expected_code],
        "for `{source}`:\n{}",
        describe(&errors)
    );
}

fn first_message(source: &str) -> String {
    check(source)
        .errors
        .first()
        .map(|e| e.message.clone())
        .unwrap_or_default()
}

// ══════════════════════════════════════════════════════════════════════════════
// Declarations
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn prelude_is_clean() {
    assert_ok("");
}

#[test]
fn duplicate_struct() {
    assert_error("struct S {\n}\n", ErrorCode::DUPLICATE_DECLARATION);
}

#[test]
fn duplicate_member() {
    assert_error(
        "struct U {\n  var a: Int = 0\n  let a: Int = 1\n}\n",
        ErrorCode::DUPLICATE_DECLARATION,
    );
}

#[test]
fn duplicate_global() {
    assert_error("var mutT: Int = 0\n", ErrorCode::DUPLICATE_DECLARATION);
}

#[test]
fn unknown_type_in_annotation() {
    assert_error("var g: Missing? = nil\n", ErrorCode::UNKNOWN_TYPE);
}

#[test]
fn field_default_must_match() {
    assert_error(
        "struct U {\n  var a: Int = \"no\"\n}\n",
        ErrorCode::TYPE_MISMATCH,
    );
}

#[test]
fn unannotated_global_takes_initializer_type() {
    assert_ok("var n = 1\nn += 2\n");
    assert_error("var n = S()\nn = T()\n", ErrorCode::TYPE_MISMATCH);
}

#[test]
fn nil_needs_optional_context() {
    assert_error("var n: Int = nil\n", ErrorCode::TYPE_MISMATCH);
}

#[test]
fn struct_without_init_has_implicit_one() {
    assert_ok("struct U {\n  var a: Int = 0\n}\nvar u = U()\nu.a = 3\n");
}

#[test]
fn constructor_arity() {
    assert_error("_ = S(1)\n", ErrorCode::WRONG_ARG_COUNT);
}

#[test]
fn constructor_of_unknown_type() {
    assert_error("_ = Nope()\n", ErrorCode::UNKNOWN_TYPE);
}

#[test]
fn constructor_of_builtin() {
    assert_error("_ = Int()\n", ErrorCode::UNKNOWN_MEMBER);
}

// ══════════════════════════════════════════════════════════════════════════════
// Mutating calls through chains
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn mutating_call_through_mutable_optional() {
    assert_ok("mutT?.mutateT()\n");
    assert_ok("mutT?.mutS?.mutateS()\n");
}

#[test]
fn mutating_call_through_immutable_root() {
    assert_error("immT?.mutateT()\n", ErrorCode::MUTATING_ON_IMMUTABLE_RECEIVER);
}

#[test]
fn mutating_call_through_let_member() {
    assert_error(
        "mutT?.immS?.mutateS()\n",
        ErrorCode::MUTATING_ON_IMMUTABLE_RECEIVER,
    );
}

#[test]
fn non_mutating_call_through_let_member() {
    assert_ok("_ = mutT?.immS?.doubled()\n");
    assert_ok("_ = immT?.immS?.doubled()\n");
}

// ══════════════════════════════════════════════════════════════════════════════
// Increment and decrement
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn postfix_increment_through_chain() {
    assert_ok("mutT?.mutS?.x++\n");
    assert_ok("mutT?.mutS?.x--\n");
}

#[test]
fn postfix_increment_of_let_member() {
    assert_error("mutT?.mutS?.y++\n", ErrorCode::CANNOT_ASSIGN_IMMUTABLE);
}

#[test]
fn prefix_increment_does_not_chain() {
    assert_error("++mutT?.mutS?.x\n", ErrorCode::OPERATOR_NOT_APPLICABLE);
    assert_error("++mutT?.mutS?.y\n", ErrorCode::OPERATOR_NOT_APPLICABLE);
}

#[test]
fn prefix_error_names_the_read_type() {
    assert!(first_message("++mutT?.mutS?.x\n").contains("'Int??'"));
    assert!(first_message("--mutT?.mutS?.y\n").contains("'--'"));
}

#[test]
fn prefix_increment_on_plain_location() {
    assert_ok("var n: Int = 0\n++n\n");
    assert_error("let n: Int = 0\n++n\n", ErrorCode::CANNOT_ASSIGN_IMMUTABLE);
}

// ══════════════════════════════════════════════════════════════════════════════
// Assignment through chains
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn assign_through_trailing_unwrap() {
    assert_ok("mutT? = T()\n");
    assert_ok("mutT?.mutS? = S()\n");
}

#[test]
fn assign_optional_member() {
    assert_ok("mutT?.mutS = S()\n");
    assert_ok("mutT?.mutS = nil\n");
}

#[test]
fn assign_optional_member_without_promotion() {
    assert_error_with(
        "mutT?.mutS = S()\n",
        &CheckOptions::default(),
        ErrorCode::TYPE_MISMATCH,
    );
}

#[test]
fn compound_assignment_through_chain() {
    assert_ok("mutT?.mutS?.x += 0\n");
    assert_ok("mutT?.mutS?.x -= 3\n");
}

#[test]
fn compound_assignment_of_let_member() {
    assert_error("mutT?.mutS?.y -= 0\n", ErrorCode::CANNOT_ASSIGN_IMMUTABLE);
}

#[test]
fn assignment_through_let_member() {
    assert_error("mutT?.immS = S()\n", ErrorCode::CANNOT_ASSIGN_IMMUTABLE);
    assert_error("mutT?.immS? = S()\n", ErrorCode::CANNOT_ASSIGN_IMMUTABLE);
    assert_error("mutT?.immS?.x += 0\n", ErrorCode::CANNOT_ASSIGN_IMMUTABLE);
    assert_error("mutT?.immS?.y -= 0\n", ErrorCode::CANNOT_ASSIGN_IMMUTABLE);
}

#[test]
fn assignment_through_immutable_root() {
    assert_error("immT?.mutS?.x = 1\n", ErrorCode::CANNOT_ASSIGN_IMMUTABLE);
}

#[test]
fn assignment_to_a_value() {
    assert_error("1 = 2\n", ErrorCode::NOT_ASSIGNABLE);
    assert_error("mutT?.mutS?.doubled() = 2\n", ErrorCode::NOT_ASSIGNABLE);
}

#[test]
fn assignment_value_type() {
    assert_error("mutT?.mutS?.x = \"one\"\n", ErrorCode::TYPE_MISMATCH);
}

#[test]
fn compound_on_optional_target_is_not_lifted() {
    assert_error("mutT?.mutS += S()\n", ErrorCode::OPERATOR_NOT_APPLICABLE);
}

// ══════════════════════════════════════════════════════════════════════════════
// Reads
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn binary_on_optional_read() {
    assert_error("_ = mutT?.mutS?.x + 0\n", ErrorCode::UNWRAPPED_OPTIONAL_REQUIRED);
}

#[test]
fn binary_message_names_nested_type() {
    assert!(first_message("_ = mutT?.mutS?.x + 0\n").contains("'Int??'"));
}

#[test]
fn binary_on_plain_values() {
    assert_ok("var n: Int = 1\n_ = n + 2 - n\n");
    assert_ok("_ = \"a\" + \"b\"\n");
    assert_error("_ = \"a\" - \"b\"\n", ErrorCode::OPERATOR_NOT_APPLICABLE);
    assert_error("_ = 1 + \"b\"\n", ErrorCode::TYPE_MISMATCH);
}

#[test]
fn discarded_read() {
    assert_ok("_ = mutT?.mutS?.x\n");
    assert_ok("_ = immT?.immS?.y\n");
}

#[test]
fn unwrap_of_non_optional() {
    assert_error("var s: S = S()\ns?.x = 1\n", ErrorCode::NOT_OPTIONAL_CHAIN);
}

#[test]
fn plain_member_on_optional() {
    assert_error("_ = mutT.mutS\n", ErrorCode::UNWRAPPED_OPTIONAL_REQUIRED);
}

#[test]
fn unknown_member() {
    assert_error("_ = mutT?.nothing\n", ErrorCode::UNKNOWN_MEMBER);
    assert_error("mutT?.nothing()\n", ErrorCode::UNKNOWN_MEMBER);
}

#[test]
fn unknown_identifier_does_not_cascade() {
    assert_error("ghost?.mutS?.x = 1\n", ErrorCode::UNKNOWN_IDENTIFIER);
    assert_error("_ = ghost + 1\n", ErrorCode::UNKNOWN_IDENTIFIER);
}

#[test]
fn unused_result_is_a_warning() {
    let errors = check("mutT?.mutS?.x\n");
    assert!(!errors.has_errors(), "{}", describe(&errors));
    assert_eq!(errors.warnings.len(), 1);
    assert_eq!(errors.warnings[0].code, ErrorCode::UNUSED_RESULT);
    assert!(errors.warnings[0].suggestion.is_some());
}

#[test]
fn calls_and_increments_are_not_unused() {
    let errors = check("mutT?.mutateT()\n_ = mutT?.mutS?.doubled()\nmutT?.mutS?.x++\n");
    assert!(errors.warnings.is_empty());
}

// ══════════════════════════════════════════════════════════════════════════════
// Subscripts and arguments
// ══════════════════════════════════════════════════════════════════════════════

const GRID: &str = r#"
struct Grid {
  var cells: Int = 0
  subscript(row: Int) -> Int { get set }
  func scaled(by: Int, offset: Int) -> Int {}
}

struct View {
  subscript(row: Int) -> Int { get }
}

var grid: Grid? = nil
var view: View? = nil
"#;

fn grid(source: &str) -> Diagnostics {
    check(&format!("{GRID}{source}"))
}

#[test]
fn settable_subscript_through_chain() {
    let errors = grid("grid?[0] = 1\ngrid?[1] += 2\n_ = grid?[2]\n");
    assert!(!errors.has_errors(), "{}", describe(&errors));
}

#[test]
fn get_only_subscript_is_immutable() {
    let errors = grid("view?[0] = 1\n");
    assert_eq!(errors.error_codes(), vec![ErrorCode::CANNOT_ASSIGN_IMMUTABLE]);
}

#[test]
fn subscript_index_type() {
    let errors = grid("_ = grid?[\"a\"]\n");
    assert_eq!(errors.error_codes(), vec![ErrorCode::TYPE_MISMATCH]);
}

#[test]
fn subscript_on_aggregate_without_one() {
    let errors = grid("_ = mutT?[0]\n");
    assert_eq!(errors.error_codes(), vec![ErrorCode::UNKNOWN_MEMBER]);
}

#[test]
fn method_arguments() {
    assert!(!grid("_ = grid?.scaled(by: 2, offset: 1)\n").has_errors());
    assert_eq!(
        grid("_ = grid?.scaled(by: 2)\n").error_codes(),
        vec![ErrorCode::WRONG_ARG_COUNT]
    );
    assert_eq!(
        grid("_ = grid?.scaled(by: 2, offset: \"x\")\n").error_codes(),
        vec![ErrorCode::TYPE_MISMATCH]
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Limits
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn long_prefix_run_is_a_syntax_error() {
    let source = format!("{}mutT?.mutS?.x\n", "++".repeat(20_000));
    assert_error(&source, ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn deep_optional_annotation_is_a_syntax_error() {
    let source = format!("var deep: Int{} = nil\n", "?".repeat(20_000));
    assert_error(&source, ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn optional_annotation_at_the_limit_checks() {
    assert_ok(&format!("var deep: Int{} = nil\n", "?".repeat(64)));
    assert_error(
        &format!("var deep: Int{} = nil\n", "?".repeat(65)),
        ErrorCode::UNEXPECTED_TOKEN,
    );
}

#[test]
fn long_chain_is_a_syntax_error() {
    let source = format!("_ = mutT{}\nmutT?.mutS?.x += 0\n", "?.mutS".repeat(20_000));
    assert_error(&source, ErrorCode::UNEXPECTED_TOKEN);
}
