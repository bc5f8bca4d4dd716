//! Core language tests: literals, operators, variables and control flow

use super::harness::*;

// ============================================================================
// Literals and operators
// ============================================================================

#[test]
fn test_arithmetic_precedence() {
    expect_output("System.print(1 + 2 * 3)", "7\n");
    expect_output("System.print((1 + 2) * 3)", "9\n");
    expect_output("System.print(10 / 4)", "2.5\n");
    expect_output("System.print(7 % 3)", "1\n");
    expect_output("System.print(-7 % 3)", "-1\n");
}

#[test]
fn test_number_formatting() {
    expect_output("System.print(1 / 3)", "0.33333333333333\n");
    expect_output("System.print(0.1 + 0.2)", "0.3\n");
    expect_output("System.print(0x10)", "16\n");
    expect_output("System.print(1e3)", "1000\n");
    expect_output("System.print(1 / 0)", "infinity\n");
}

#[test]
fn test_comparison_and_equality() {
    expect_output("System.print(1 < 2)", "true\n");
    expect_output("System.print(2 <= 1)", "false\n");
    expect_output("System.print(\"a\" == \"a\")", "true\n");
    expect_output("System.print(1 != null)", "true\n");
    expect_output("System.print(null == null)", "true\n");
}

#[test]
fn test_logical_operators_short_circuit() {
    expect_output("System.print(null || \"fallback\")", "fallback\n");
    expect_output("System.print(false && undefinedName)", "false\n");
    expect_output("System.print(1 && 2)", "2\n");
    expect_output("System.print(!null)", "true\n");
    expect_output("System.print(!0)", "false\n");
}

#[test]
fn test_conditional_operator() {
    expect_output("System.print(1 < 2 ? \"yes\" : \"no\")", "yes\n");
    expect_output("System.print(null ? \"yes\" : \"no\")", "no\n");
}

#[test]
fn test_string_concatenation() {
    expect_output("System.print(\"fin\" + \"ch\")", "finch\n");
    expect_output("System.print(\"tab\\tand\\nline\")", "tab\tand\nline\n");
}

// ============================================================================
// Variables and control flow
// ============================================================================

#[test]
fn test_variables_and_assignment() {
    expect_output(
        "var a = 1
var b
b = a + 1
a = b * 10
System.print(a)
System.print(b)",
        "20\n2\n",
    );
}

#[test]
fn test_block_scopes_shadow() {
    expect_output(
        "var x = \"outer\"
{
  var x = \"inner\"
  System.print(x)
}
System.print(x)",
        "inner\nouter\n",
    );
}

#[test]
fn test_if_else_chain() {
    expect_output(
        "var n = 5
if (n < 3) {
  System.print(\"small\")
} else if (n < 10) {
  System.print(\"medium\")
} else {
  System.print(\"large\")
}",
        "medium\n",
    );
}

#[test]
fn test_while_with_break_and_continue() {
    expect_output(
        "var i = 0
var sum = 0
while (true) {
  i = i + 1
  if (i > 10) break
  if (i % 2 == 0) continue
  sum = sum + i
}
System.print(sum)",
        "25\n",
    );
}

#[test]
fn test_for_over_ranges() {
    expect_output(
        "var out = []
for (i in 1..3) out.add(i)
for (i in 0...2) out.add(i)
for (i in 3..1) out.add(i)
System.print(out)",
        "[1, 2, 3, 0, 1, 3, 2, 1]\n",
    );
}

#[test]
fn test_for_over_list_and_string() {
    expect_output(
        "for (word in [\"a\", \"b\"]) System.write(word)
for (c in \"xyz\") System.write(c)
System.print()",
        "abxyz\n",
    );
}

#[test]
fn test_for_over_list_snapshot() {
    expect_output(
        "var list = [1, 2]
for (n in list) list.add(n)
System.print(list.count)",
        "4\n",
    );
}

// ============================================================================
// Core library
// ============================================================================

#[test]
fn test_list_methods() {
    expect_output(
        "var l = [1, 2, 3]
l.add(4)
l[1] = 9
System.print(l)
System.print(l.count)
System.print(l[-1])
System.print(l.removeAt(0))
l.insert(0, 7)
System.print(l.join(\"-\"))
System.print(l.contains(9))
System.print(l.indexOf(5))",
        "[1, 9, 3, 4]\n4\n4\n1\n7-9-3-4\ntrue\n-1\n",
    );
}

#[test]
fn test_string_methods() {
    expect_output(
        "var s = \"hello world\"
System.print(s.count)
System.print(s[4])
System.print(s.contains(\"wor\"))
System.print(s.indexOf(\"o\"))
System.print(s.split(\" \").count)
System.print(s.replace(\"world\", \"finch\"))
System.print(\"  pad  \".trim())",
        "11\no\ntrue\n4\n2\nhello finch\npad\n",
    );
}

#[test]
fn test_num_methods() {
    expect_output(
        "System.print(3.7.floor)
System.print(-2.abs)
System.print(2.pow(10))
System.print(16.sqrt)
System.print(5.clamp(0, 3))
System.print(Num.fromString(\"42\") + 1)
System.print(Num.fromString(\"nope\"))",
        "3\n-2\n1024\n4\n3\n43\nnull\n",
    );
}

#[test]
fn test_range_methods() {
    expect_output(
        "var r = 1..4
System.print(r.from)
System.print(r.to)
System.print(r.isInclusive)
System.print((0...3).toList)",
        "1\n4\ntrue\n[0, 1, 2]\n",
    );
}

#[test]
fn test_type_and_is() {
    expect_output(
        "System.print(1.type)
System.print(\"s\".type)
System.print(1 is Num)
System.print(1 is Object)
System.print(\"s\" is Num)
System.print([] is List)",
        "Num\nString\ntrue\ntrue\nfalse\ntrue\n",
    );
}
