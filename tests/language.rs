use std::fs;

use tusk::evaluate_with;
use walkdir::WalkDir;

fn run(source: &str) -> (String, String) {
    let mut out = Vec::new();
    let mut diag = Vec::new();
    let status = evaluate_with(source, &mut out, &mut diag);
    assert_eq!(status, 0, "evaluation exit status is always 0");
    (String::from_utf8(out).unwrap(), String::from_utf8(diag).unwrap())
}

fn assert_stdout(source: &str, expected: &str) {
    let (out, diag) = run(source);
    assert!(diag.is_empty(), "unexpected diagnostics:\n{diag}\nfor:\n{source}");
    assert_eq!(out, expected, "for:\n{source}");
}

fn assert_diagnosed(source: &str, needle: &str) {
    let (_, diag) = run(source);
    assert!(diag.contains(needle),
            "expected a diagnostic containing {needle:?}, got:\n{diag}\nfor:\n{source}");
}

#[test]
fn fixture_scripts_run_clean() {
    let mut count = 0;

    for entry in WalkDir::new("tests/scripts").into_iter()
                                              .filter_map(Result::ok)
                                              .filter(|e| {
                                                  e.path()
                                                   .extension()
                                                   .is_some_and(|ext| ext == "tusk")
                                              })
    {
        let path = entry.path();
        let source =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        count += 1;
        let (_, diag) = run(&source);
        assert!(diag.is_empty(),
                "script {path:?} produced diagnostics:\n{diag}");
    }

    assert!(count > 0, "No fixture scripts found in tests/scripts");
}

#[test]
fn exponentiation_is_right_associative() {
    assert_stdout("int a = 2 ** 3 ** 2\necho a", "512\n");
}

#[test]
fn string_length_counts_codepoints() {
    assert_stdout("string s = \"héllo\"\necho len(s)", "5\n");
}

#[test]
fn negative_range_slices_from_the_end() {
    assert_stdout("int[] a = 1,2,3,4,5\necho a[-2..-1]", "[4, 5]\n");
}

#[test]
fn composition_runs_left_to_right() {
    assert_stdout("def doubler(x:int) -> int :: x * 2 end\n\
                   def addFive(x:int) -> int :: x + 5 end\n\
                   echo (doubler $ addFive)(10)",
                  "25\n");
}

#[test]
fn conditional_chain_takes_first_truthy_arm() {
    assert_stdout("int x = 7\necho x < 0 ? \"neg\" ?? x == 0 ? \"zero\" : \"pos\"",
                  "pos\n");
    assert_stdout("int x = 0\necho x < 0 ? \"neg\" ?? x == 0 ? \"zero\" : \"pos\"",
                  "zero\n");
    assert_stdout("int x = -4\necho x < 0 ? \"neg\" ?? x == 0 ? \"zero\" : \"pos\"",
                  "neg\n");
}

#[test]
fn conditional_chain_spans_lines() {
    assert_stdout("int x = 7\n\
                   echo x < 0 ? \"neg\"\n\
                   ?? x == 0 ? \"zero\"\n\
                   : \"pos\"",
                  "pos\n");
}

#[test]
fn incomplete_chain_is_legal_as_statement() {
    assert_stdout("def report(v:int) -> zero :: echo v end\n\
                   int x = 5\n\
                   x > 0 ? report(x)",
                  "5\n");
}

#[test]
fn incomplete_chain_is_diagnosed_in_value_position() {
    assert_diagnosed("echo 1 ? 2", "fallback");
}

#[test]
fn dynamic_array_push() {
    assert_stdout("dynamic int[] a = 1,2,3\narray_push(a, 4)\necho a", "[1, 2, 3, 4]\n");
}

#[test]
fn array_pop_returns_and_removes_the_last_element() {
    assert_stdout("dynamic int[] a = 1,2,3\necho array_pop(a)\necho a", "3\n[1, 2]\n");
}

#[test]
fn array_push_requires_a_dynamic_array() {
    assert_diagnosed("int[] a = 1,2\narray_push(a, 3)", "not dynamic");
}

#[test]
fn array_builtins_on_values() {
    assert_stdout("int[] a = 4,5,6\necho array_length(a)\necho array_first(a)\necho array_last(a)",
                  "3\n4\n6\n");
}

#[test]
fn elvis_short_circuits_on_truthiness() {
    assert_stdout("echo 0 ?: \"fallback\"", "fallback\n");
    assert_stdout("echo 5 ?: 99", "5\n");
    assert_stdout("echo \"\" ?: \"empty\"", "empty\n");
}

#[test]
fn filter_keeps_matching_elements_in_order() {
    assert_stdout("int[] a = 1,2,3,4,5,6\necho a => x % 2 == 0", "[2, 4, 6]\n");
    assert_stdout("int[] a = 1,2,3\necho a => x > 10", "[]\n");
}

#[test]
fn equality_compares_string_renderings() {
    assert_stdout("echo 1 == \"1\"", "1\n");
    assert_stdout("echo 1.5 != \"1.5\"", "0\n");
}

#[test]
fn integer_arithmetic_stays_integer() {
    assert_stdout("echo 7 / 2", "3\n");
    assert_stdout("echo 7 % 3", "1\n");
    assert_stdout("echo 2 + 3 * 4", "14\n");
}

#[test]
fn mixed_arithmetic_promotes_to_double() {
    assert_stdout("echo 1 + 0.5", "1.5\n");
    assert_stdout("echo 5 / 2.0", "2.5\n");
}

#[test]
fn division_by_zero_is_fail_soft() {
    let (out, diag) = run("echo 1 / 0 + 5");
    assert_eq!(out, "5\n");
    assert!(diag.contains("Division by zero"), "got: {diag}");
}

#[test]
fn modulo_requires_integers() {
    assert_diagnosed("echo 1.5 % 2", "modulo");
}

#[test]
fn bitwise_operators_work_on_integers() {
    assert_stdout("echo 6 & 3", "2\n");
    assert_stdout("echo 6 | 3", "7\n");
    assert_stdout("echo 6 ^ 3", "5\n");
    assert_stdout("echo 1 << 4", "16\n");
    assert_stdout("echo 16 >> 2", "4\n");
    assert_stdout("echo ~0", "-1\n");
}

#[test]
fn unary_operators() {
    assert_stdout("echo -3 ** 2", "9\n");
    assert_stdout("echo !0", "1\n");
    assert_stdout("echo !\"text\"", "0\n");
}

#[test]
fn string_indexing_is_by_codepoint() {
    assert_stdout("string s = \"héllo\"\necho s[1]", "é\n");
    assert_stdout("string s = \"héllo\"\necho s[-1]", "o\n");
    assert_stdout("string s = \"héllo\"\necho s[1..3]", "éll\n");
}

#[test]
fn open_ended_ranges() {
    assert_stdout("int[] a = 1,2,3\necho a[1..]", "[2, 3]\n");
    assert_stdout("int[] a = 1,2,3\necho a[..1]", "[1, 2]\n");
    assert_stdout("int[] a = 1,2,3\necho a[..]", "[1, 2, 3]\n");
}

#[test]
fn invalid_ranges_are_rejected_not_clamped() {
    assert_diagnosed("int[] a = 1,2,3\necho a[1..9]", "Invalid range");
    assert_diagnosed("int[] a = 1,2,3\necho a[2..1]", "Invalid range");
}

#[test]
fn out_of_bounds_index_is_diagnosed() {
    assert_diagnosed("int[] a = 1,2,3\necho a[5]", "out of bounds");
    assert_diagnosed("int[] a = 1,2,3\necho a[-4]", "out of bounds");
}

#[test]
fn slice_shorthand_concatenates_with_own_slice() {
    assert_stdout("string s = \"abc\"\necho s $[0..1]", "abcab\n");
    assert_stdout("int[] a = 1,2,3\necho a $[..0]", "[1, 2, 3, 1]\n");
}

#[test]
fn concat_of_ints_demands_explicit_conversion() {
    assert_diagnosed("echo 1 $ 2", "str(");
    assert_stdout("echo str(12) $ str(34)", "1234\n");
}

#[test]
fn array_concat_copies_cells() {
    assert_stdout("dynamic int[] a = 1,2\n\
                   dynamic int[] b = 3,4\n\
                   dynamic int[] c = a $ b\n\
                   c[0] = 99\n\
                   echo a\n\
                   echo c",
                  "[1, 2]\n[99, 2, 3, 4]\n");
}

#[test]
fn slices_are_independent_copies() {
    assert_stdout("dynamic int[] a = 1,2,3\n\
                   dynamic int[] b = a[0..1]\n\
                   b[0] = 99\n\
                   echo a\n\
                   echo b",
                  "[1, 2, 3]\n[99, 2]\n");
}

#[test]
fn fixed_variables_cannot_be_reassigned() {
    let (out, diag) = run("fixed int x = 5\nx = 9\necho x");
    assert_eq!(out, "5\n");
    assert!(diag.contains("fixed"), "got: {diag}");
}

#[test]
fn function_variables_get_a_dedicated_reassignment_message() {
    assert_diagnosed("<(int)> f = def(v:int) -> int v\nf = 3", "function");
}

#[test]
fn non_dynamic_arrays_cannot_be_mutated() {
    assert_diagnosed("int[] a = 1,2\na[0] = 9", "not dynamic");
    assert_diagnosed("int a[3]\na[0] = 9", "not dynamic");
}

#[test]
fn static_arrays_start_zeroed() {
    assert_stdout("int a[3]\necho a", "[0, 0, 0]\n");
}

#[test]
fn assignment_requires_an_existing_binding() {
    assert_diagnosed("y = 3", "undefined variable");
}

#[test]
fn element_assignment_goes_through_shared_cells() {
    assert_stdout("dynamic int[] a = 1,2,3\na[1] = 20\na[-1] = 30\necho a", "[1, 20, 30]\n");
}

#[test]
fn scalar_captures_are_isolated_snapshots() {
    assert_stdout("int y = 10\n\
                   <(int)> addY = def(v:int) -> int v + y\n\
                   y = 99\n\
                   echo addY(5)",
                  "15\n");
}

#[test]
fn array_captures_alias_their_cells() {
    assert_stdout("dynamic int[] a = 1,2,3\n\
                   <(int)> getFirst = def(v:int) -> int a[0] + v\n\
                   a[0] = 10\n\
                   echo getFirst(1)",
                  "11\n");
}

#[test]
fn nested_functions_live_on_the_enclosing_scope() {
    assert_stdout("def outer(a:int) -> int ::\n\
                   def inner(b:int) -> int ::\n\
                   b * 2\n\
                   end\n\
                   inner(a) + 1\n\
                   end\n\
                   echo outer(5)",
                  "11\n");
}

#[test]
fn recursion_through_the_global_function_table() {
    assert_stdout("def fact(n:int) -> int ::\n\
                   if n <= 1 :: 1 else :: n * fact(n - 1)\n\
                   end\n\
                   echo fact(5)",
                  "120\n");
}

#[test]
fn zero_return_type_discards_the_body_value() {
    assert_stdout("def show(v:int) -> zero :: v + 1 end\necho show(7)", "0\n");
}

#[test]
fn arity_mismatch_is_diagnosed() {
    assert_diagnosed("def add(a:int, b:int) -> int :: a + b end\necho add(1)", "argument");
}

#[test]
fn unknown_function_is_diagnosed() {
    assert_diagnosed("echo missing(1)", "Unknown function");
}

#[test]
fn if_expression_inline_and_multiline() {
    assert_stdout("echo if 2 < 3 :: \"yes\" else :: \"no\"", "yes\n");
    assert_stdout("int x = 5\n\
                   echo if x > 3 ::\n\
                   \"big\"\n\
                   else ::\n\
                   \"small\"\n\
                   end",
                  "big\n");
    assert_stdout("int x = 0\necho if x > 0 :: \"pos\" elif x == 0 :: \"zero\" else :: \"neg\"",
                  "zero\n");
}

#[test]
fn if_without_matching_branch_yields_zero() {
    assert_stdout("echo if 0 :: \"then\"", "0\n");
}

#[test]
fn while_loop_accumulates() {
    assert_stdout("int i = 0\n\
                   int total = 0\n\
                   while (i < 5) ::\n\
                   total = total + i\n\
                   i = i + 1\n\
                   end\n\
                   echo total",
                  "10\n");
}

#[test]
fn loop_result_clause_returns_the_named_variable() {
    assert_stdout("def count(n:int) -> int ::\n\
                   int i = 0\n\
                   while (i < n) -> i :: i = i + 1 end\n\
                   end\n\
                   echo count(4)",
                  "4\n");
}

#[test]
fn for_in_iterator_persists_after_the_loop() {
    assert_stdout("int[] a = 1,2,3\n\
                   int sum = 0\n\
                   for v in a :: sum = sum + v end\n\
                   echo sum\n\
                   echo v",
                  "6\n3\n");
}

#[test]
fn for_in_requires_an_array() {
    assert_diagnosed("for v in 5 :: echo v end", "for-in requires an array");
}

#[test]
fn range_builtin_is_half_open() {
    assert_stdout("echo range(5)", "[0, 1, 2, 3, 4]\n");
    assert_stdout("echo range(2, 8, 2)", "[2, 4, 6]\n");
    assert_stdout("echo range(5, 0, -2)", "[5, 3, 1]\n");
}

#[test]
fn range_builtin_rejects_zero_step() {
    assert_diagnosed("echo range(0, 5, 0)", "step");
}

#[test]
fn conversions_and_type_of() {
    assert_stdout("echo toInt(\"42\") + 1", "43\n");
    assert_stdout("echo toInt(3.9)", "3\n");
    assert_stdout("echo toDouble(2) / 4", "0.5\n");
    assert_stdout("echo typeOf(1)\necho typeOf(1.5)\necho typeOf(\"x\")\necho typeOf(range(1))",
                  "int\ndouble\nstring\narray\n");
    assert_stdout("<(int)> id = def(v:int) -> int v\necho typeOf(id)", "func\n");
}

#[test]
fn function_values_print_opaquely() {
    assert_stdout("<(int)> id = def(v:int) -> int v\necho id", "<function>\n");
}

#[test]
fn echo_without_argument_prints_a_newline() {
    assert_stdout("echo", "\n");
    assert_stdout("echo 1\necho\necho 2", "1\n\n2\n");
}

#[test]
fn comments_are_skipped() {
    assert_stdout("# leading comment\necho 1 # trailing\n#[ multi\nline ]#\necho 2", "1\n2\n");
}

#[test]
fn unterminated_string_keeps_partial_content() {
    let (out, diag) = run("echo \"abc");
    assert_eq!(out, "abc\n");
    assert!(diag.contains("Unterminated string"), "got: {diag}");
}

#[test]
fn trailing_decimal_point_is_a_malformed_double() {
    let (out, diag) = run("echo 3.");
    assert_eq!(out, "3\n");
    assert!(diag.contains("Malformed number"), "got: {diag}");
}

#[test]
fn unknown_escape_keeps_the_character() {
    let (out, diag) = run("echo \"a\\qb\"");
    assert_eq!(out, "aqb\n");
    assert!(diag.contains("escape"), "got: {diag}");
}

#[test]
fn line_continuation_after_operators() {
    assert_stdout("echo 1 +\n2", "3\n");
    assert_stdout("int x = 10 *\n3\necho x", "30\n");
}

#[test]
fn array_initializers_splice_arrays() {
    assert_stdout("int[] a = 1,2\nint[] b = a, 3\necho b", "[1, 2, 3]\n");
}

#[test]
fn empty_array_initializer() {
    assert_stdout("dynamic int[] a =\necho a", "[]\n");
}

#[test]
fn logical_operators_produce_bits() {
    assert_stdout("echo 1 and 2", "1\n");
    assert_stdout("echo 0 or \"\"", "0\n");
    assert_stdout("echo not 0", "1\n");
}

#[test]
fn chained_calls_and_indexes() {
    assert_stdout("def makeAdder(n:int) -> <(int)> ::\n\
                   def(v:int) -> int v + n\n\
                   end\n\
                   echo makeAdder(10)(5)",
                  "15\n");
}

#[test]
fn composition_of_three_functions() {
    assert_stdout("def inc(x:int) -> int :: x + 1 end\n\
                   def dbl(x:int) -> int :: x * 2 end\n\
                   def neg(x:int) -> int :: 0 - x end\n\
                   echo (inc $ dbl $ neg)(3)",
                  "-8\n");
}
