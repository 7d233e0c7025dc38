//! Formatter tests

use asfmt_host::{
    check_formatted, check_formatted_with_config, format_source, format_source_with_config,
    FormatConfig, FormatError,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn fmt(source: &str) -> String {
    match format_source(source) {
        Ok(s) => s,
        Err(e) => panic!("Format error: {}", e),
    }
}

fn fmt_with(source: &str, config: &FormatConfig) -> String {
    match format_source_with_config(source, config) {
        Ok(s) => s,
        Err(e) => panic!("Format error: {}", e),
    }
}

// === Basic Statement Formatting ===

#[rstest]
#[case("let x=5", "let x = 5;\n")]
#[case("var x = 10;", "var x = 10;\n")]
#[case("const x:i32=42;", "const x: i32 = 42;\n")]
#[case("let a = 1, b: i32 = 2;", "let a = 1, b: i32 = 2;\n")]
#[case("let ready!: bool;", "let ready!: bool;\n")]
#[case("foo(1,2,3)", "foo(1, 2, 3);\n")]
#[case("x+=1", "x += 1;\n")]
#[case("x >>>= 2;", "x >>>= 2;\n")]
#[case("let a = - -b;", "let a = - -b;\n")]
#[case("let a = !ok;", "let a = !ok;\n")]
#[case("let t = typeof v;", "let t = typeof v;\n")]
#[case("let c = new Foo;", "let c = new Foo();\n")]
#[case("let m = new Map<string, i32>();", "let m = new Map<string, i32>();\n")]
#[case("let v = a ? b : c;", "let v = a ? b : c;\n")]
#[case("let v = (a + b) * c;", "let v = (a + b) * c;\n")]
#[case("let n = x as i64;", "let n = x as i64;\n")]
#[case("let n = <i64>x;", "let n = <i64>x;\n")]
#[case("let v = obj!.field[0];", "let v = obj!.field[0];\n")]
#[case("let arr = [1,2,3];", "let arr = [1, 2, 3];\n")]
#[case("let o = {a:1,b};", "let o = { a: 1, b };\n")]
#[case("let e = {};", "let e = {};\n")]
#[case("let f = (x: i32): i32 => x * 2;", "let f = (x: i32): i32 => x * 2;\n")]
#[case("let g = x => x;", "let g = x => x;\n")]
#[case("let r = load<i32>(ptr);", "let r = load<i32>(ptr);\n")]
#[case("let big = a >= b && c >> 1 > d;", "let big = a >= b && c >> 1 > d;\n")]
fn test_statement(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(fmt(source), expected);
}

// === Strings ===

#[rstest]
#[case("let s = 'hi';", "let s = \"hi\";\n")]
#[case("let s = 'say \"hi\"';", "let s = 'say \"hi\"';\n")]
#[case("let s = 'it\\'s';", "let s = \"it's\";\n")]
fn test_string_quotes(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(fmt(source), expected);
}

#[test]
fn test_single_quote_config() {
    let config = FormatConfig::default().with_single_quote(true);
    assert_eq!(fmt_with("let s = \"hi\";", &config), "let s = 'hi';\n");
}

#[test]
fn test_template_literal_untouched() {
    assert_eq!(fmt("let s = `a ${b}`;"), "let s = `a ${b}`;\n");
}

// === Declarations ===

#[test]
fn test_function() {
    assert_eq!(
        fmt("function add(a:i32,b:i32):i32{return a+b}"),
        "function add(a: i32, b: i32): i32 {\n  return a + b;\n}\n"
    );
}

#[test]
fn test_empty_function() {
    assert_eq!(fmt("function f(): void {   }"), "function f(): void {}\n");
}

#[test]
fn test_declare_function() {
    assert_eq!(
        fmt("declare function log(msg: string): void"),
        "declare function log(msg: string): void;\n"
    );
}

#[test]
fn test_export_modifiers() {
    assert_eq!(
        fmt("export function f(): void {}\nexport const x = 1;"),
        "export function f(): void {}\nexport const x = 1;\n"
    );
}

#[test]
fn test_class() {
    let source = "class A{x:i32=0;constructor(){}get y():i32{return 1}}";
    insta::assert_snapshot!(fmt(source), @r"
class A {
  x: i32 = 0;
  constructor() {}
  get y(): i32 {
    return 1;
  }
}
");
}

#[test]
fn test_class_heritage_and_modifiers() {
    let source = "abstract class Base<T> extends Parent<T> implements A, B {\nprivate static readonly MAX: i32 = 10;\nconstructor(public x: i32) {}\n}";
    insta::assert_snapshot!(fmt(source), @r"
abstract class Base<T> extends Parent<T> implements A, B {
  private static readonly MAX: i32 = 10;
  constructor(public x: i32) {}
}
");
}

#[test]
fn test_interface() {
    assert_eq!(
        fmt("interface I{a:i32;b(x:i32):void}"),
        "interface I {\n  a: i32;\n  b(x: i32): void;\n}\n"
    );
}

#[test]
fn test_namespace() {
    assert_eq!(
        fmt("namespace a.b{export function f():void{}}"),
        "namespace a.b {\n  export function f(): void {}\n}\n"
    );
}

#[test]
fn test_enum_trailing_comma() {
    assert_eq!(
        fmt("enum Color{Red,Green=2}"),
        "enum Color {\n  Red,\n  Green = 2,\n}\n"
    );
}

#[test]
fn test_enum_without_trailing_comma() {
    let config = FormatConfig::default().with_trailing_commas(false);
    assert_eq!(
        fmt_with("const enum Color{Red,Green=2,}", &config),
        "const enum Color {\n  Red,\n  Green = 2\n}\n"
    );
}

#[test]
fn test_type_alias() {
    assert_eq!(fmt("type T=i32|null"), "type T = i32 | null;\n");
}

#[rstest]
#[case("import {a,b as c} from './m'", "import { a, b as c } from \"./m\";\n")]
#[case("import d, * as ns from \"m\";", "import d, * as ns from \"m\";\n")]
#[case("import './side-effect';", "import \"./side-effect\";\n")]
#[case("export {a}", "export { a };\n")]
#[case("export * from 'm'", "export * from \"m\";\n")]
#[case("export * as util from './util';", "export * as util from \"./util\";\n")]
#[case("export default 42;", "export default 42;\n")]
fn test_module_syntax(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(fmt(source), expected);
}

// === Control Flow ===

#[test]
fn test_if_else_blocks() {
    assert_eq!(
        fmt("if(a){b()}else{c()}"),
        "if (a) {\n  b();\n} else {\n  c();\n}\n"
    );
}

#[test]
fn test_if_else_inline() {
    assert_eq!(fmt("if (a) b(); else c();"), "if (a) b();\nelse c();\n");
}

#[test]
fn test_else_if_chain() {
    assert_eq!(
        fmt("if (a) {} else if (b) {} else {}"),
        "if (a) {} else if (b) {} else {}\n"
    );
}

#[test]
fn test_loops() {
    assert_eq!(
        fmt("for(let i=0;i<10;i++){}"),
        "for (let i = 0; i < 10; i++) {}\n"
    );
    assert_eq!(fmt("for (;;) {}"), "for (;;) {}\n");
    assert_eq!(
        fmt("for (const item of items) sum += item;"),
        "for (const item of items) sum += item;\n"
    );
    assert_eq!(
        fmt("do{x++}while(x<5)"),
        "do {\n  x++;\n} while (x < 5);\n"
    );
    assert_eq!(fmt("while (true) {}"), "while (true) {}\n");
}

#[test]
fn test_jumps_and_throw() {
    assert_eq!(
        fmt("while (true) { if (done) break; continue; }"),
        "while (true) {\n  if (done) break;\n  continue;\n}\n"
    );
    assert_eq!(fmt("throw new Error('x')"), "throw new Error(\"x\");\n");
}

#[test]
fn test_empty_statements_dropped() {
    assert_eq!(fmt(";;let x = 1;;"), "let x = 1;\n");
}

// === Whitespace ===

#[test]
fn test_blank_lines_collapsed_to_one() {
    assert_eq!(
        fmt("let a = 1;\n\n\n\nlet b = 2;"),
        "let a = 1;\n\nlet b = 2;\n"
    );
}

#[test]
fn test_adjacent_lines_stay_adjacent() {
    assert_eq!(fmt("let a = 1;\nlet b = 2;"), "let a = 1;\nlet b = 2;\n");
}

#[test]
fn test_empty_input() {
    assert_eq!(fmt(""), "");
    assert_eq!(fmt("\n\n  \n"), "");
}

#[test]
fn test_tabs() {
    let config = FormatConfig::default().with_use_tabs(true);
    assert_eq!(
        fmt_with("function f(): void { g(); }", &config),
        "function f(): void {\n\tg();\n}\n"
    );
}

#[test]
fn test_indent_size() {
    let config = FormatConfig::default().with_indent_size(4);
    assert_eq!(
        fmt_with("function f(): void { g(); }", &config),
        "function f(): void {\n    g();\n}\n"
    );
}

// === Line Breaking ===

#[test]
fn test_long_params_break() {
    let config = FormatConfig::default().with_max_width(30);
    insta::assert_snapshot!(
        fmt_with("function f(alpha: i32, beta: i32, gamma: i32): void {}", &config),
        @r"
function f(
  alpha: i32,
  beta: i32,
  gamma: i32,
): void {}
"
    );
}

#[test]
fn test_rest_param_has_no_trailing_comma() {
    let config = FormatConfig::default().with_max_width(30);
    assert_eq!(
        fmt_with("function f(first: i32, ...others: i32[]): void {}", &config),
        "function f(\n  first: i32,\n  ...others: i32[]\n): void {}\n"
    );
}

#[test]
fn test_long_call_args_break() {
    let config = FormatConfig::default()
        .with_max_width(24)
        .with_trailing_commas(false);
    assert_eq!(
        fmt_with("compute(alpha, beta, gamma);", &config),
        "compute(\n  alpha,\n  beta,\n  gamma\n);\n"
    );
}

#[test]
fn test_single_long_argument_does_not_break() {
    let config = FormatConfig::default().with_max_width(20);
    assert_eq!(
        fmt_with("call(someVeryLongArgumentName);", &config),
        "call(someVeryLongArgumentName);\n"
    );
}

// === Errors ===

#[test]
fn test_syntax_error() {
    let err = format_source("let = ;").unwrap_err();
    assert!(matches!(err, FormatError::Syntax(_)));
}

#[test]
fn test_decorator_is_syntax_error() {
    let err = format_source("@inline\nfunction f(): void {}").unwrap_err();
    match err {
        FormatError::Syntax(diags) => assert_eq!(diags[0].code, "AS1010"),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn test_invalid_config() {
    let config = FormatConfig::default().with_max_width(5);
    assert!(matches!(
        format_source_with_config("let x = 1;", &config),
        Err(FormatError::InvalidConfig(_))
    ));
}

// === Check Mode / Idempotency ===

#[test]
fn test_check_formatted() {
    assert!(check_formatted("let x = 1;\n"));
    assert!(!check_formatted("let x=1"));
    assert!(!check_formatted("let = ;"));
    let config = FormatConfig::default().with_single_quote(true);
    assert!(check_formatted_with_config("let s = 'a';\n", &config));
}

#[rstest]
#[case("function add(a:i32,b:i32):i32{return a+b}")]
#[case("class A{x:i32=0;constructor(){}get y():i32{return 1}}")]
#[case("if (a) b(); else c();")]
#[case("namespace a.b{export function f():void{}}")]
#[case("enum Color{Red,Green=2}")]
#[case("let a = 1;\n\n\nlet b = [1, 2];")]
#[case("function f(alphabet: i32, betamax: i32, gammaray: i32, deltaforce: i32): void {}")]
#[case("do { x++; } while (x < 5)")]
fn test_idempotent(#[case] source: &str) {
    let first = fmt(source);
    let second = fmt(&first);
    assert_eq!(first, second);
}
