use super::cst::SyntaxKind;
use super::{Module, Stmt, parse};
use indoc::indoc;

fn parse_ok(source: &str) -> super::SyntaxNode {
    let result = parse(source).expect("parser should not hit a fatal error on valid input");
    assert!(
        !result.diagnostics.has_errors(),
        "unexpected diagnostics: {:?}",
        result.diagnostics
    );
    result.root
}

#[test]
fn round_trips_source_text_exactly() {
    let source = indoc! {r#"
        function add(a, b) {
            return a + b;
        }
    "#};
    let root = parse_ok(source);
    assert_eq!(root.text().to_string(), source);
}

#[test]
fn parses_var_decl_with_multiple_declarators() {
    let root = parse_ok("let a = 1, b = 2;\n");
    let module = Module::cast(root).unwrap();
    let mut stmts = module.stmts();
    match stmts.next().unwrap() {
        Stmt::VarDecl(decl) => assert_eq!(decl.declarators().count(), 2),
        other => panic!("expected VarDecl, got {other:?}"),
    }
}

#[test]
fn parses_comehere_with_block() {
    let source = indoc! {r#"
        function run() {
            COMEHERE: with ("reached end", total = 1) {
                return total;
            }
        }
    "#};
    let root = parse_ok(source);
    let comehere = root
        .descendants()
        .find(|n| n.kind() == SyntaxKind::ComeHereWith);
    assert!(comehere.is_some(), "expected a ComeHereWith node");
}

#[test]
fn parses_capture_identifiers_distinct_from_plain_identifiers() {
    let root = parse_ok("$$result = compute();\n");
    let has_capture = root
        .descendants_with_tokens()
        .any(|e| e.kind() == SyntaxKind::CaptureIdent);
    assert!(has_capture, "expected a CaptureIdent token");
}

#[test]
fn parses_arrow_function_single_param() {
    let root = parse_ok("const double = x => x * 2;\n");
    let has_arrow = root.descendants().any(|n| n.kind() == SyntaxKind::ArrowFunction);
    assert!(has_arrow);
}

#[test]
fn distinguishes_for_in_for_of_and_counted_for() {
    let source = indoc! {r#"
        for (let i = 0; i < 10; i++) {}
        for (let k in obj) {}
        for (let v of list) {}
    "#};
    let root = parse_ok(source);
    let kinds: Vec<_> = root
        .children()
        .map(|n| n.kind())
        .filter(|k| {
            matches!(
                k,
                SyntaxKind::ForStmt | SyntaxKind::ForInStmt | SyntaxKind::ForOfStmt
            )
        })
        .collect();
    assert_eq!(
        kinds,
        vec![SyntaxKind::ForStmt, SyntaxKind::ForInStmt, SyntaxKind::ForOfStmt]
    );
}

#[test]
fn parses_try_catch_finally() {
    let source = indoc! {r#"
        try {
            risky();
        } catch (err) {
            handle(err);
        } finally {
            cleanup();
        }
    "#};
    let root = parse_ok(source);
    let try_stmt = root.children().find(|n| n.kind() == SyntaxKind::TryStmt);
    assert!(try_stmt.is_some());
    assert_eq!(root.text().to_string(), source);
}

#[test]
fn parses_class_with_methods_and_fields() {
    let source = indoc! {r#"
        class Counter {
            count = 0;
            increment() {
                this.count++;
            }
        }
    "#};
    let root = parse_ok(source);
    assert_eq!(root.text().to_string(), source);
    let class = root.children().find(|n| n.kind() == SyntaxKind::ClassDecl).unwrap();
    let body = class.children().find(|n| n.kind() == SyntaxKind::ClassBody).unwrap();
    let member_kinds: Vec<_> = body.children().map(|n| n.kind()).collect();
    assert_eq!(member_kinds, vec![SyntaxKind::FieldDef, SyntaxKind::MethodDef]);
}

#[test]
fn recovers_from_malformed_statement() {
    let result = parse("let = ;\nlet ok = 1;\n").expect("lexable input should still parse");
    assert!(result.diagnostics.has_errors());
    let module = Module::cast(result.root).unwrap();
    assert!(module.stmts().count() >= 1);
}
