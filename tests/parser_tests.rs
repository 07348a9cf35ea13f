//! End-to-end parser tests: expression in, canonical serialization (or
//! diagnostic) out.

use exprtree::parser::{parse, parse_with_typenames, ParseError};
use pretty_assertions::assert_eq;

fn canon(expr: &str) -> String {
    match parse(expr) {
        Ok(tree) => tree.canonical_string(),
        Err(err) => panic!("failed to parse {expr:?}: {err}"),
    }
}

fn diagnostic(expr: &str) -> String {
    match parse(expr) {
        Ok(tree) => panic!(
            "failed to fail parsing {expr:?}: {}",
            tree.canonical_string()
        ),
        Err(err) => err.to_string(),
    }
}

#[test]
fn test_parse_shapes() {
    let specs: &[(&str, &str)] = &[
        ("a", "a"),
        ("(a)", "a"),
        ("a+b", "(a+b)"),
        ("a*b", "(a*b)"),
        // Precedence and associativity.
        ("a*b+c", "((a*b)+c)"),
        ("a+b*c", "(a+(b*c))"),
        ("a*b*c", "((a*b)*c)"),
        ("a,b,c", "((a,b),c)"),
        ("a=b=c", "(a=(b=c))"),
        ("a?b:c?d:e", "(a?(b:(c?(d:e))))"),
        // Typecasts.
        ("(float)5", "((float)5)"),
        ("*(int *)p += 5", "(*(((int *)p))+=5)"),
        ("*(int *)p += -5", "(*(((int *)p))+=-(5))"),
        // Unary chains and calls.
        ("*&a", "*(&(a))"),
        ("*f(b)", "*(f(b))"),
        ("f()", "f()"),
        ("*a(-*b,c,(d))", "*(a(-(*(b)),c,d))"),
        // sizeof with and without parentheses.
        ("a+sizeof(unsigned int*)", "(a+sizeof(unsigned int *))"),
        ("a+sizeof b", "(a+sizeof(b))"),
        ("t[(int)b]", "t[((int)b)]"),
        // Member access folds left.
        ("t.a.b", "((t.a).b)"),
        ("t->a.b->c", "(((t->a).b)->c)"),
        ("*a+5", "(*(a)+5)"),
        ("*t.a", "*((t.a))"),
        ("(*t).a", "(*(t).a)"),
        // Increment and decrement, both fixities.
        ("++ a", "++(a)"),
        ("-- a", "--(a)"),
        ("a++", "(a++)"),
        ("a--", "(a--)"),
        ("--- a", "--(-(a))"),
        ("~a", "~(a)"),
        // Numeric literal dialects survive verbatim.
        ("p = 0x17.fp1", "(p=0x17.fp1)"),
        ("p = .1", "(p=.1)"),
    ];
    for (input, expected) in specs {
        assert_eq!(canon(input), *expected, "input: {input:?}");
    }
}

#[test]
fn test_parse_failures() {
    let specs: &[(&str, &str)] = &[
        ("\u{1}", "Bogus token '\u{1}'"),
        ("(mumble\u{1}", "Bogus token '\u{1}'"),
        (")", "Unexpected )"),
        ("(a", "Missing ) parsing parenthesized expression"),
        ("(unsigned int *", "Missing ) in (assumed) typecast"),
        ("--(unsigned int *", "Missing ) in (assumed) typecast"),
        ("sizeof(int", "Missing ) in sizeof"),
        ("(unsigned int *)a)", "Unexpected ) at end of input"),
        ("a[", "Missing ] at end of input"),
        ("a[5", "Missing ]"),
        ("a[5,", "Unexpected eof"),
        ("f(", "Missing ) while parsing function call"),
        ("f(,", "Unexpected ,"),
        ("((", "Unexpected eof"),
        ("a.*", "Expected identifier before * token"),
        ("-&a.*", "Expected identifier before * token"),
        ("(int)\u{1}", "Bogus token '\u{1}'"),
        ("a?b:c?d", "Missing : in ?: ternary op (found eof)"),
        ("a?b:c?d*", "Unexpected eof"),
        ("a=*", "Unexpected eof"),
        ("a 1", "Unexpected literal"),
        ("(foo)a", "Unexpected literal"),
        ("b)", "Unexpected ) at end of input"),
        ("baz((foo)a)", "Unexpected literal while parsing function call"),
        ("", "Empty expression"),
        ("   /* nothing here */  ", "Empty expression"),
    ];
    for (input, expected) in specs {
        assert_eq!(diagnostic(input), *expected, "input: {input:?}");
    }
}

#[test]
fn test_custom_typenames_enable_casts() {
    // Without the hint, (charmander) is a parenthesized expression and the
    // trailing identifier is trailing garbage.
    assert_eq!(
        parse("(charmander)a"),
        Err(ParseError::Unexpected("literal"))
    );

    let tree = parse_with_typenames("(charmander)a", &["foo", "charmander"])
        .expect("typecast with hint");
    assert_eq!(tree.canonical_string(), "((charmander)a)");
}

#[test]
fn test_sizeof_parenthesized_text_is_not_parsed() {
    // Inside sizeof(...), tokens are captured as text, never as a subtree.
    assert_eq!(canon("sizeof(a*b)"), "sizeof(a * b)");
    assert_eq!(canon("sizeof(struct foo *)"), "sizeof(struct foo *)");
}

#[test]
fn test_comments_and_whitespace_are_invisible() {
    assert_eq!(canon("a/* + c */+\tb"), "(a+b)");
    assert_eq!(canon("\x0b a \n + b "), "(a+b)");
}

#[test]
fn test_nesting_depth_is_bounded() {
    let deep = format!("{}a{}", "(".repeat(300), ")".repeat(300));
    assert_eq!(parse(&deep), Err(ParseError::TooDeeplyNested));

    // Right-recursive levels are bounded the same way.
    let assigns = "a=".repeat(300) + "a";
    assert_eq!(parse(&assigns), Err(ParseError::TooDeeplyNested));
    let ternaries = "a?".repeat(300) + "a" + &":a".repeat(300);
    assert_eq!(parse(&ternaries), Err(ParseError::TooDeeplyNested));

    let ok = format!("{}a{}", "(".repeat(100), ")".repeat(100));
    assert_eq!(canon(&ok), "a");
    let ok_assigns = "a=".repeat(100) + "a";
    assert!(parse(&ok_assigns).is_ok());
}

#[test]
fn test_canonical_form_is_a_fixed_point() {
    // Re-parsing a canonical string reproduces it exactly.
    for input in ["a,b,c", "*(int *)p += 5", "f(a, b)[i].x++"] {
        let first = canon(input);
        assert_eq!(canon(&first), first, "input: {input:?}");
    }
}
