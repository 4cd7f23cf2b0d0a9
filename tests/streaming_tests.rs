//! Incremental parsing: the suspended state machine must produce the same
//! value no matter where the input is cut, and must suspend (not fail) on
//! exhausted-but-open input.

use recon::{parse, Input, Outcome, Parser, Value};

/// Feeds `chunks` through suspended parser states, then closes the source.
fn parse_chunked(chunks: &[&str]) -> Result<Value, recon::ParseError> {
    let mut state = Parser::document();
    for chunk in chunks {
        state = match state.run(Input::text(chunk)) {
            Outcome::Cont(next, remaining) => {
                assert!(
                    remaining.is_empty(),
                    "suspended parser left input unconsumed"
                );
                next
            }
            Outcome::Done(_, _) => panic!("parser finished before the source closed"),
            Outcome::Fail(error, _) => return Err(error),
        };
    }
    match state.run(Input::done()) {
        Outcome::Done(parsed, _) => Ok(parsed.into_value()),
        Outcome::Fail(error, _) => Err(error),
        Outcome::Cont(_, _) => unreachable!("parser suspended on terminal input"),
    }
}

/// Splits `text` at every char boundary and checks both halves feed through
/// to the same result as one-shot parsing.
fn assert_chunking_invariant(text: &str) {
    let expected = parse(text);
    for split in 0..=text.len() {
        if !text.is_char_boundary(split) {
            continue;
        }
        let chunked = parse_chunked(&[&text[..split], &text[split..]]);
        assert_eq!(chunked, expected, "split at byte {split} of {text:?}");
    }
}

#[test]
fn test_every_split_point_matches_one_shot() {
    for text in [
        "{a: 1, b: 2}",
        "@event(onClick),@command()",
        "[Hello, @em[world]!]",
        "\"some \\n text\"",
        "%ABCDabcd12+/",
        "%AA==",
        "-42.5e-1",
        "  1, 2\n3 \n4; 5  ",
        "@hello(name: \"world\") { {1,2} }",
        "[A: @good@answer.]",
        "602000000000000000000000",
    ] {
        assert_chunking_invariant(text);
    }
}

#[test]
fn test_every_split_point_matches_one_shot_for_errors() {
    for text in ["{1 2}", "%AA=A", "1.0e+", "[test{}", "\"test\\"] {
        let expected = parse(text);
        assert!(expected.is_err());
        for split in 0..=text.len() {
            if !text.is_char_boundary(split) {
                continue;
            }
            let chunked = parse_chunked(&[&text[..split], &text[split..]]);
            assert_eq!(chunked, expected, "split at byte {split} of {text:?}");
        }
    }
}

#[test]
fn test_data_padding_split_keeps_grammar() {
    // Resuming inside `==` padding must still reject digits and accept the
    // closing `=`.
    assert!(parse_chunked(&["%AA=", "A"]).is_err());
    assert_eq!(parse_chunked(&["%AA=", "="]), parse("%AA=="));
    assert_eq!(parse_chunked(&["%AA", "=", "="]), parse("%AA=="));
}

#[test]
fn test_one_scalar_at_a_time() {
    let text = "@chat(room: \"lobby\") [Hi, @em[all]!]";
    let chunks: Vec<String> = text.chars().map(String::from).collect();
    let chunk_refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
    assert_eq!(parse_chunked(&chunk_refs), parse(text));
}

#[test]
fn test_exhausted_open_input_suspends() {
    // Each prefix is incomplete; with the source still open the parser must
    // suspend rather than fail or finish.
    for text in ["{a: ", "@event(", "[markup ", "\"str", "%AA", "12.", "-"] {
        match Parser::document().run(Input::text(text)) {
            Outcome::Cont(_, remaining) => assert!(remaining.is_empty()),
            outcome => panic!("expected suspension for {text:?}, got {outcome:?}"),
        }
    }
}

#[test]
fn test_suspension_then_close_resolves_pending_token() {
    // A number at end of input only completes once the source closes.
    let state = match Parser::document().run(Input::text("42")) {
        Outcome::Cont(next, _) => next,
        outcome => panic!("unexpected {outcome:?}"),
    };
    match state.run(Input::done()) {
        Outcome::Done(parsed, _) => assert_eq!(parsed.into_value(), Value::Number(42.0)),
        outcome => panic!("unexpected {outcome:?}"),
    }
}

#[test]
fn test_empty_chunks_are_harmless() {
    let mut state = Parser::document();
    for chunk in ["", "{a:", "", " 1}", ""] {
        state = match state.run(Input::text(chunk)) {
            Outcome::Cont(next, _) => next,
            outcome => panic!("unexpected {outcome:?}"),
        };
    }
    match state.run(Input::done()) {
        Outcome::Done(parsed, _) => {
            assert_eq!(parsed.into_value().get("a"), &Value::Number(1.0));
        }
        outcome => panic!("unexpected {outcome:?}"),
    }
}

#[test]
fn test_failure_is_terminal_and_reported_once() {
    let outcome = Parser::document().run(Input::text("{1 2}"));
    match outcome {
        Outcome::Fail(error, remaining) => {
            assert_eq!(
                error,
                recon::ParseError::Expected {
                    expected: "'}', ',', ';', or newline",
                    found: '2',
                }
            );
            assert_eq!(remaining.head(), Some('2'));
        }
        outcome => panic!("unexpected {outcome:?}"),
    }
}

#[test]
fn test_independent_parsers_share_nothing() {
    // Two interleaved streams, each with its own state.
    let mut a = Parser::document();
    let mut b = Parser::document();
    for (chunk_a, chunk_b) in [("{x:", "[one"), (" 1}", " two]")] {
        a = match a.run(Input::text(chunk_a)) {
            Outcome::Cont(next, _) => next,
            outcome => panic!("unexpected {outcome:?}"),
        };
        b = match b.run(Input::text(chunk_b)) {
            Outcome::Cont(next, _) => next,
            outcome => panic!("unexpected {outcome:?}"),
        };
    }
    let value_a = match a.run(Input::done()) {
        Outcome::Done(parsed, _) => parsed.into_value(),
        outcome => panic!("unexpected {outcome:?}"),
    };
    let value_b = match b.run(Input::done()) {
        Outcome::Done(parsed, _) => parsed.into_value(),
        outcome => panic!("unexpected {outcome:?}"),
    };
    assert_eq!(value_a, parse("{x: 1}").unwrap());
    assert_eq!(value_b, parse("[one two]").unwrap());
}
