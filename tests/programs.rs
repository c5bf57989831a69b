//! End-to-end programs through the public `interpret` entry point.

use indoc::indoc;
use itmoscript::interpret;

fn run(source: &str) -> (bool, String) {
    let mut sink = Vec::new();
    let ok = interpret(source, &mut sink);
    (ok, String::from_utf8(sink).expect("output is UTF-8"))
}

fn run_ok(source: &str) -> String {
    let (ok, output) = run(source);
    assert!(ok, "program failed: {output}");
    output
}

#[test]
fn computes_the_maximum_of_a_list() {
    let source = "max = function(arr) if len(arr) == 0 then return nil end if; \
                  m = arr[0]; for i in arr; if i > m then m = i end if; end for; \
                  return m end function; print(max([10,-1,0,2,2025,239]))";
    assert_eq!(run_ok(source), "2025");
}

#[test]
fn while_loop_with_continue_and_break_prints_one_and_three() {
    let source = "i = 0; while i < 5; i = i + 1; if i == 2 then continue end if; \
                  if i == 4 then break end if; print(i); end while";
    assert_eq!(run_ok(source), "13");
}

#[test]
fn pop_prints_element_then_remaining_list() {
    assert_eq!(run_ok("l = [1,2,3]; print(pop(l)); print(l)"), "3[1, 2]");
}

#[test]
fn split_prints_quoted_display_form() {
    assert_eq!(run_ok("print(split(\"a,b,c\", \",\"))"), "[\"a\", \"b\", \"c\"]");
}

#[test]
fn sums_odd_numbers_from_a_list() {
    let source = "sum = 0; for i in [1,2,3,4,5]; if i % 2 == 0 then continue end if; \
                  sum = sum + i; end for; print(sum)";
    assert_eq!(run_ok(source), "9");
}

#[test]
fn arity_mismatch_fails_without_printing() {
    let source = "f = function(x) return 1 end function; f(1,2); print(239)";
    let (ok, output) = run(source);
    assert!(!ok);
    assert!(!output.contains("239"), "output was: {output}");
    assert!(
        output.starts_with("Runtime error (specific): "),
        "output was: {output}"
    );
    assert!(
        output.contains("Wrong number of arguments"),
        "output was: {output}"
    );
}

#[test]
fn output_before_a_failure_still_appears() {
    let (ok, output) = run("print(1); print(missing)");
    assert!(!ok);
    assert!(output.starts_with('1'), "output was: {output}");
    assert!(
        output.contains("Undefined variable 'missing'"),
        "output was: {output}"
    );
}

#[test]
fn lex_and_parse_errors_carry_the_diagnostic_prefix() {
    let (ok, output) = run("x = 1 ? 2");
    assert!(!ok);
    assert!(
        output.starts_with("Runtime error (specific): Unexpected character '?'"),
        "output was: {output}"
    );

    let (ok, output) = run("if x then\nend");
    assert!(!ok);
    assert!(
        output.starts_with("Runtime error (specific): "),
        "output was: {output}"
    );
}

#[test]
fn fizzbuzz_style_program_runs_to_completion() {
    let source = indoc! {"
        out = []
        for i in range(1, 16)
            if i % 15 == 0 then
                push(out, \"fizzbuzz\")
            else if i % 3 == 0 then
                push(out, \"fizz\")
            else if i % 5 == 0 then
                push(out, \"buzz\")
            else
                push(out, to_string(i))
            end if
        end for
        print(join(out, \" \"))
    "};
    assert_eq!(
        run_ok(source),
        "1 2 fizz 4 buzz fizz 7 8 fizz buzz 11 fizz 13 14 fizzbuzz"
    );
}

#[test]
fn recursive_functions_terminate() {
    let source = indoc! {"
        fib = function(n)
            if n < 2 then return n end if
            return fib(n - 1) + fib(n - 2)
        end function
        print(fib(12))
    "};
    assert_eq!(run_ok(source), "144");
}

#[test]
fn string_processing_pipeline() {
    let source = indoc! {"
        line = \"The quick  Brown fox\"
        words = split(replace(line, \"  \", \" \"), \" \")
        shouted = []
        for w in words
            push(shouted, upper(w))
        end for
        println(join(shouted, \"_\"))
        print(len(words))
    "};
    assert_eq!(run_ok(source), "THE_QUICK_BROWN_FOX\n4");
}

#[test]
fn sort_then_slice_selects_extremes() {
    let source = indoc! {"
        scores = [70, 95, 12, 88, 41]
        sort(scores)
        print(scores[0:2])
        print(scores[-2:])
    "};
    assert_eq!(run_ok(source), "[12, 41][88, 95]");
}

// Cross-type rejection matrix for the arithmetic operators: every pair
// from {Number, String, List, Function, Nil} must be rejected unless
// the combination is part of the language.
#[test]
fn cross_type_arithmetic_is_rejected() {
    const OPERANDS: [(&str, &str); 5] = [
        ("n", "1"),
        ("s", "\"s\""),
        ("l", "[1]"),
        ("f", "function() return 0 end function"),
        ("z", "nil"),
    ];
    // (operator, accepted left/right kind pairs)
    let table: [(&str, &[(&str, &str)]); 4] = [
        ("+", &[("n", "n"), ("s", "s"), ("l", "l")]),
        ("-", &[("n", "n"), ("s", "s")]),
        ("*", &[("n", "n"), ("s", "n"), ("n", "s"), ("l", "n"), ("n", "l")]),
        ("/", &[("n", "n")]),
    ];

    for (op, accepted) in table {
        for (left_kind, left) in OPERANDS {
            for (right_kind, right) in OPERANDS {
                let source = format!("a = {left}\nb = {right}\nprint(a {op} b)");
                let (ok, output) = run(&source);
                let expected = accepted.contains(&(left_kind, right_kind));
                assert_eq!(
                    ok, expected,
                    "{left_kind} {op} {right_kind} => ok={ok}, output: {output}"
                );
                if !expected {
                    assert!(
                        output.contains("Runtime error (specific): "),
                        "{left_kind} {op} {right_kind} output: {output}"
                    );
                }
            }
        }
    }
}
