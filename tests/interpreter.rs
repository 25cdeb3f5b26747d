mod common;

use common::{errors_of, global, output_of, run, SharedBuffer};
use rox::error::LoxError;
use rox::value::Value;
use rox::Lox;

fn runtime_message(source: &str) -> String {
    let errors = errors_of(source);
    assert_eq!(errors.len(), 1, "expected one error, got {:?}", errors);

    match &errors[0] {
        LoxError::Runtime { message, .. } => message.clone(),
        other => panic!("expected runtime error, got {:?}", other),
    }
}

#[test]
fn expression_statement_prints_nothing() {
    assert!(output_of("1 + 2;").is_empty());
    assert_eq!(output_of("print 1 + 2;"), vec!["3"]);
}

#[test]
fn number_and_value_formatting() {
    assert_eq!(
        output_of("print 7 / 2; print 10 / 2; print -0.5; print nil; print true; print \"s\";"),
        vec!["3.5", "5", "-0.5", "nil", "true", "s"]
    );
}

#[test]
fn string_concatenation_and_equality() {
    assert_eq!(
        output_of("print \"foo\" + \"bar\"; print \"a\" == \"a\"; print 1 == \"1\"; print nil == nil; print nil == false;"),
        vec!["foobar", "true", "false", "true", "false"]
    );
}

#[test]
fn truthiness() {
    assert_eq!(
        output_of("print !nil; print !0; print !\"\"; print !false;"),
        vec!["true", "false", "false", "true"]
    );
}

#[test]
fn logical_operators_return_operands() {
    assert_eq!(
        output_of("print nil or 1; print 0 or 2; print nil and 1; print 1 and 2;"),
        vec!["1", "0", "nil", "2"]
    );
}

#[test]
fn logical_operators_short_circuit() {
    assert_eq!(
        output_of("var hit = false; fun touch() { hit = true; return true; } false and touch(); true or touch(); print hit;"),
        vec!["false"]
    );
}

#[test]
fn block_shadowing_and_mutation() {
    let (lox, _, result) = run(
        "var a = 1; var b = 2; var c = 3; { var a = 10; b = a; c = a / 2; }",
    );
    assert!(result.is_ok());

    assert_eq!(global(&lox, "a"), Value::Number(1.0));
    assert_eq!(global(&lox, "b"), Value::Number(10.0));
    assert_eq!(global(&lox, "c"), Value::Number(5.0));
}

#[test]
fn uninitialized_variable_is_nil() {
    assert_eq!(output_of("var x; print x;"), vec!["nil"]);
}

#[test]
fn control_flow() {
    assert_eq!(
        output_of("if (1 < 2) print \"yes\"; else print \"no\"; var i = 0; while (i < 3) { print i; i = i + 1; }"),
        vec!["yes", "0", "1", "2"]
    );

    assert_eq!(
        output_of("var sum = 0; for (var i = 1; i <= 4; i = i + 1) sum = sum + i; print sum;"),
        vec!["10"]
    );
}

#[test]
fn break_leaves_the_innermost_loop() {
    let (lox, _, result) = run(
        "var a = 0; for (; a < 10; a = a + 1) { if (a == 5) break; }",
    );
    assert!(result.is_ok());
    assert_eq!(global(&lox, "a"), Value::Number(5.0));

    assert_eq!(
        output_of("for (var i = 0; i < 2; i = i + 1) { var j = 0; while (true) { if (j == 2) break; j = j + 1; } print i + j; }"),
        vec!["2", "3"]
    );
}

#[test]
fn functions_and_recursion() {
    assert_eq!(
        output_of("fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(10);"),
        vec!["55"]
    );

    assert_eq!(
        output_of("fun f() {} print f(); print f; print clock;"),
        vec!["nil", "<fn f>", "<native fn clock>"]
    );
}

#[test]
fn return_unwinds_through_loops() {
    assert_eq!(
        output_of("fun first() { while (true) { for (;;) { return 1; } } } print first();"),
        vec!["1"]
    );
}

#[test]
fn closures_capture_their_environment() {
    assert_eq!(
        output_of(
            "fun makeCounter() { var i = 0; fun count() { i = i + 1; return i; } return count; }
             var c = makeCounter(); c(); print c();
             var d = makeCounter(); print d();"
        ),
        vec!["2", "1"]
    );
}

#[test]
fn closures_observe_later_mutation() {
    assert_eq!(
        output_of("var x = 1; fun show() { print x; } x = 2; show();"),
        vec!["2"]
    );
}

#[test]
fn static_scope_is_fixed_at_declaration() {
    assert_eq!(
        output_of(
            "var a = \"global\";
             {
               fun showA() { print a; }
               showA();
               var a = \"block\";
               showA();
             }"
        ),
        vec!["global", "global"]
    );
}

#[test]
fn clock_returns_seconds() {
    let (lox, _, result) = run("var t = clock();");
    assert!(result.is_ok());

    match global(&lox, "t") {
        Value::Number(seconds) => assert!(seconds > 1_000_000_000.0),
        other => panic!("expected number, got {}", other),
    }
}

#[test]
fn classes_fields_and_methods() {
    assert_eq!(
        output_of(
            "class Point {
               init(x, y) { this.x = x; this.y = y; }
               sum() { return this.x + this.y; }
             }
             var p = Point(1, 2);
             print p.sum();
             p.x = 10;
             print p.sum();
             print Point;
             print p;"
        ),
        vec!["3", "12", "Point", "Point instance"]
    );
}

#[test]
fn bound_methods_remember_their_instance() {
    assert_eq!(
        output_of(
            "class Box { init(v) { this.v = v; } get() { return this.v; } }
             var m = Box(7).get;
             print m();"
        ),
        vec!["7"]
    );
}

#[test]
fn initializer_returns_this() {
    assert_eq!(
        output_of(
            "class A { init() { this.n = 1; return; } }
             var a = A();
             print a.init() == a;
             print a.n;"
        ),
        vec!["true", "1"]
    );
}

#[test]
fn fields_shadow_methods() {
    assert_eq!(
        output_of("class A { m() { return 1; } } var a = A(); a.m = 2; print a.m;"),
        vec!["2"]
    );
}

#[test]
fn runtime_type_errors() {
    assert_eq!(runtime_message("-\"a\";"), "Operand must be a number.");
    assert_eq!(runtime_message("1 < \"a\";"), "Operands must be numbers.");
    assert_eq!(
        runtime_message("1 + \"a\";"),
        "Operands must be two numbers or two strings."
    );
    assert_eq!(runtime_message("1 / 0;"), "Division by zero.");
}

#[test]
fn runtime_call_errors() {
    assert_eq!(
        runtime_message("\"not a fn\"();"),
        "Can only call functions and classes."
    );
    assert_eq!(
        runtime_message("fun f(a, b) {} f(1);"),
        "Expected 2 arguments but got 1."
    );
    assert_eq!(
        runtime_message("class A { init(x) {} } A();"),
        "Expected 1 arguments but got 0."
    );
}

#[test]
fn runtime_property_errors() {
    assert_eq!(runtime_message("var n = 1; n.x;"), "Only instances have properties.");
    assert_eq!(runtime_message("var n = 1; n.x = 2;"), "Only instances have fields.");
    assert_eq!(
        runtime_message("class A {} A().missing;"),
        "Undefined property 'missing'."
    );
}

#[test]
fn undefined_variables() {
    assert_eq!(runtime_message("print nope;"), "Undefined variable 'nope'.");
    assert_eq!(runtime_message("nope = 1;"), "Undefined variable 'nope'.");
}

#[test]
fn runtime_error_stops_execution_but_keeps_earlier_output() {
    let (_, out, result) = run("print 1;\nprint -nil;\nprint 2;");

    let errors = result.unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].to_string(), "Operand must be a number.\n[line 2]");
    assert_eq!(out.lines(), vec!["1"]);
}

#[test]
fn static_errors_prevent_execution() {
    let (_, out, result) = run("print 1; { var a = a; }");

    let errors = result.unwrap_err();
    assert!(matches!(errors[0], LoxError::Resolve { .. }));
    assert!(out.lines().is_empty());

    let (_, out, result) = run("print 1; print ;");
    assert!(matches!(result.unwrap_err()[0], LoxError::Parse { .. }));
    assert!(out.lines().is_empty());
}

#[test]
fn session_state_persists_between_runs() {
    let out = SharedBuffer::default();
    let mut lox = Lox::with_output(out.clone());

    lox.run("var count = 0; fun bump() { count = count + 1; }").unwrap();
    lox.run("bump(); bump();").unwrap();
    lox.run("{ var local = count; print local; }").unwrap();

    assert!(lox.run("print missing;").is_err());
    lox.run("print count;").unwrap();

    assert_eq!(out.lines(), vec!["2", "2"]);
}

#[test]
fn inner_declaration_shadows_without_touching_outer() {
    let (lox, _, result) = run("var a = 1; var b = 2; var c = 0; { var a = 3; c = a + b; }");
    assert!(result.is_ok());

    assert_eq!(global(&lox, "a"), Value::Number(1.0));
    assert_eq!(global(&lox, "b"), Value::Number(2.0));
    assert_eq!(global(&lox, "c"), Value::Number(5.0));
}

#[test]
fn or_initializer_keeps_the_value() {
    let (lox, _, result) = run("var a = nil or 1;");
    assert!(result.is_ok());
    assert_eq!(global(&lox, "a"), Value::Number(1.0));
}

#[test]
fn break_skips_the_pending_increment() {
    let (lox, _, result) = run(
        "var seen; for (var a = 0; a < 10; a = a + 1) { seen = a; if (a == 5) break; }",
    );
    assert!(result.is_ok());
    assert_eq!(global(&lox, "seen"), Value::Number(5.0));
}

#[test]
fn stage_functions_compose() {
    let (tokens, scan_errors) = rox::scan("1 + 2;");
    let (statements, parse_errors) = rox::parse(&tokens);
    let (locals, resolve_errors) = rox::resolve(&statements);

    assert!(scan_errors.is_empty() && parse_errors.is_empty() && resolve_errors.is_empty());
    assert!(rox::interpret(&statements, locals).is_ok());
}

#[test]
fn runaway_recursion_is_a_runtime_error() {
    assert_eq!(
        runtime_message("fun f(n) { return f(n + 1); } f(0);"),
        "Stack overflow."
    );

    let errors = errors_of("fun f(n) {\n  return f(n + 1);\n}\nf(0);");
    assert!(errors[0].is_runtime());
    assert_eq!(errors[0].line(), Some(2));
}

#[test]
fn recursion_below_the_limit_still_works() {
    let depth = rox::interpreter::MAX_CALL_DEPTH - 1;
    let source = format!(
        "fun down(n) {{ if (n == 0) return 0; return 1 + down(n - 1); }} print down({});",
        depth - 1
    );

    assert_eq!(output_of(&source), vec![(depth - 1).to_string()]);
}

#[test]
fn session_survives_stack_overflow() {
    let out = SharedBuffer::default();
    let mut lox = Lox::with_output(out.clone());

    lox.run("var x = 1; fun forever() { return forever(); }").unwrap();

    let errors = lox.run("forever();").unwrap_err();
    assert!(errors[0].to_string().starts_with("Stack overflow."));

    lox.run("fun twice(n) { if (n == 0) return x; return twice(n - 1) + x; } print twice(3);")
        .unwrap();
    lox.run("{ var y = x + 1; print y; }").unwrap();

    assert_eq!(out.lines(), vec!["4", "2"]);
}

#[test]
fn clock_never_runs_backwards() {
    assert_eq!(
        output_of("var a = clock(); var i = 0; while (i < 100) i = i + 1; var b = clock(); print b >= a;"),
        vec!["true"]
    );
}

#[test]
fn closures_from_earlier_runs_keep_their_bindings() {
    let out = SharedBuffer::default();
    let mut lox = Lox::with_output(out.clone());

    lox.run("fun make() { var n = 0; fun inc() { n = n + 1; return n; } return inc; } var c = make();")
        .unwrap();
    lox.run("c();").unwrap();
    lox.run("{ var unrelated = 10; print c() + unrelated; }").unwrap();

    assert_eq!(out.lines(), vec!["12"]);
}
