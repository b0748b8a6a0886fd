use textree::{parse_tex, write_tex, SyntaxTable};

// Helper: serialize(parse(text)) must reproduce text exactly
fn assert_roundtrip(input: &str) {
    let syntax = SyntaxTable::builtin();
    let conversion = parse_tex(input, syntax);
    assert_eq!(
        conversion.failure, None,
        "unexpected diagnostic for: {:?}",
        input
    );
    let output = write_tex(&conversion.root, syntax);
    assert_eq!(output, input, "round-trip mismatch for: {:?}", input);
}

// Helper: parse(serialize(parse(text))) is structurally parse(text)
fn assert_idempotent(input: &str) {
    let syntax = SyntaxTable::builtin();
    let first = parse_tex(input, syntax)
        .into_result()
        .unwrap_or_else(|e| panic!("Failed to parse: {}\n{}", input, e));
    let serialized = write_tex(&first, syntax);
    let second = parse_tex(&serialized, syntax)
        .into_result()
        .unwrap_or_else(|e| panic!("Failed to re-parse: {}\n{}", serialized, e));
    assert_eq!(first, second, "re-parse diverged for: {:?}", input);
}

// Helper for the preserved serializer quirks: assert the exact observed
// output rather than a round-trip
fn assert_serializes_to(input: &str, expected: &str) {
    let syntax = SyntaxTable::builtin();
    let conversion = parse_tex(input, syntax);
    assert_eq!(conversion.failure, None);
    assert_eq!(write_tex(&conversion.root, syntax), expected);
}

// =============================================================================
// Round-trip literal cases
// =============================================================================

#[test]
fn prose_with_paragraph_break() {
    assert_roundtrip("Hello world.\n\nA new paragraph follows here.\n");
}

#[test]
fn whitespace_runs() {
    assert_roundtrip("   word  ");
    assert_roundtrip(" \t \n ");
}

#[test]
fn emph_with_brace_argument() {
    assert_roundtrip(r"\emph{hi}");
}

#[test]
fn frac_with_two_arguments() {
    assert_roundtrip(r"\frac{a}{b}");
}

#[test]
fn verb_with_pipe_delimiters() {
    assert_roundtrip(r"\verb|code|");
}

#[test]
fn comment_line() {
    assert_roundtrip("%a comment\n");
}

#[test]
fn shortcut_sequences() {
    assert_roundtrip("a\"=b");
    assert_roundtrip("em---dash");
    assert_roundtrip("x~y");
    assert_roundtrip("hy\\-phen");
}

#[test]
fn escaped_punctuation() {
    assert_roundtrip(r"100\% \{braces\} \$5");
}

#[test]
fn anonymous_groups() {
    assert_roundtrip("{a b}");
    assert_roundtrip("{a {b} c}");
}

#[test]
fn optional_and_required_arguments() {
    assert_roundtrip(r"\documentclass[a4]{article}");
    assert_roundtrip(r"\usepackage{amsmath}");
}

#[test]
fn unknown_command_passthrough() {
    assert_roundtrip(r"\foobar{x}");
}

#[test]
fn left_right_delimiters_use_inline_arguments() {
    // \left( captures ( as an inline argument with no space to skip
    assert_roundtrip(r"\left( x \right)");
}

#[test]
fn environment_with_body() {
    assert_roundtrip("\\begin{figure}[h]\na caption\n\\end{figure}");
}

#[test]
fn environment_with_required_argument() {
    assert_roundtrip(r"\begin{tabular}{cc}x\end{tabular}");
}

#[test]
fn verbatim_environment_body_is_untouched() {
    assert_roundtrip("\\begin{verbatim}raw $stuff$ \\here\n\\end{verbatim}");
}

#[test]
fn nested_markup() {
    assert_roundtrip(r"\emph{a {b} \emph{c}} d");
}

#[test]
fn a_small_document() {
    assert_roundtrip(concat!(
        "\\documentclass[a4]{article}\n",
        "% preamble ends here\n",
        "\\begin{figure}[h]\n",
        "An em---dash and a \\emph{stressed} word.\n",
        "\\end{figure}\n",
        "\n",
        "Closing prose.\n"
    ));
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn reparsing_serialized_output_is_stable() {
    assert_idempotent("Hello world.\n\nMore.\n");
    assert_idempotent(r"\emph{hi}");
    assert_idempotent(r"\frac{a}{b}");
    assert_idempotent("%note\n");
    assert_idempotent("a~b---c\"=d");
    assert_idempotent(r"\begin{figure}x\end{figure}");
    assert_idempotent(r"\verb|code|");
}

// =============================================================================
// Preserved quirks (regression coverage, not round-trips)
// =============================================================================

#[test]
fn math_delimiters_are_emitted_only_on_close() {
    // The opening $ is never serialized and ^/_ emit nothing
    assert_serializes_to("$x^2_i$", "x2i$");
    assert_serializes_to("$x$", "x$");
    assert_serializes_to("$$y$$", "y$$");
}

#[test]
fn scripts_lose_their_marker_on_serialization() {
    assert_serializes_to("x^2", "x2");
    assert_serializes_to("x_{ij}", "x{ij}");
}

#[test]
fn inline_argument_space_moves_after_the_argument() {
    assert_serializes_to(r"\emph x", "\\emphx ");
    assert_serializes_to(r"\verb |x|", "\\verb| x|");
}

#[test]
fn explicit_par_serializes_as_a_blank_line() {
    assert_serializes_to(r"\par", "\n\n");
}

#[test]
fn midline_comment_reorders_pending_text() {
    assert_serializes_to("ab%c\nd", "%c\nabd");
}

#[test]
fn mismatched_environment_closes_under_the_begin_name() {
    assert_serializes_to(
        r"\begin{figure}x\end{wrong}",
        r"\begin{figure}x\end{figure}",
    );
}
