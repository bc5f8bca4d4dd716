//! Class tests: constructors, fields, accessors, statics and inheritance

use super::harness::*;

#[test]
fn test_constructor_fields_and_getters() {
    expect_output(
        "class Point {
  construct new(x, y) {
    _x = x
    _y = y
  }
  x { _x }
  y { _y }
  sum() { _x + _y }
}
var p = Point.new(3, 4)
System.print(p.x)
System.print(p.sum())",
        "3\n7\n",
    );
}

#[test]
fn test_setters() {
    expect_output(
        "class Box {
  construct new() {}
  value { _value }
  value=(v) { _value = v }
}
var b = Box.new()
System.print(b.value)
b.value = 12
System.print(b.value)",
        "null\n12\n",
    );
}

#[test]
fn test_implicit_this_calls() {
    expect_output(
        "class Greeter {
  construct new(name) { _name = name }
  name { _name }
  greeting(prefix) { prefix + name }
  greet() { greeting(\"hi \") }
}
System.print(Greeter.new(\"finch\").greet())",
        "hi finch\n",
    );
}

#[test]
fn test_static_methods_and_fields() {
    expect_output(
        "class Counter {
  static next() {
    if (__count == null) __count = 0
    __count = __count + 1
    return __count
  }
}
Counter.next()
Counter.next()
System.print(Counter.next())",
        "3\n",
    );
}

#[test]
fn test_static_implicit_this_is_class() {
    expect_output(
        "class Config {
  static name { \"finch\" }
  static describe() { \"app: \" + name }
}
System.print(Config.describe())",
        "app: finch\n",
    );
}

#[test]
fn test_inheritance_and_super() {
    expect_output(
        "class Animal {
  construct new(name) { _name = name }
  name { _name }
  speak() { name + \" makes a sound\" }
}
class Dog is Animal {
  construct new(name) { super(name) }
  speak() { super.speak() + \" (woof)\" }
}
var d = Dog.new(\"rex\")
System.print(d.speak())
System.print(d is Animal)
System.print(d is Dog)
System.print(Dog.supertype)",
        "rex makes a sound (woof)\ntrue\ntrue\nAnimal\n",
    );
}

#[test]
fn test_inherited_static_methods() {
    expect_output(
        "class Base {
  static kind { \"base\" }
}
class Derived is Base {}
System.print(Derived.kind)",
        "base\n",
    );
}

#[test]
fn test_constructors_are_not_inherited() {
    expect_error_message(
        "class Base {
  construct make() {}
}
class Derived is Base {}
Derived.make()",
        "Derived metaclass does not implement 'make()'.",
    );
}

#[test]
fn test_to_string_override_used_by_print() {
    expect_output(
        "class Money {
  construct new(cents) { _cents = cents }
  toString { \"$\" + (_cents / 100).toString }
}
System.print(Money.new(250))
System.print([Money.new(100)])",
        "$2.5\n[$1]\n",
    );
}

#[test]
fn test_default_instance_printing() {
    expect_output(
        "class Plain {
  construct new() {}
}
System.print(Plain.new())
System.print(Plain)",
        "instance of Plain\nPlain\n",
    );
}

#[test]
fn test_iterator_protocol() {
    expect_output(
        "class Countdown {
  construct new(from) { _from = from }
  iterate(i) {
    if (i == null) return _from
    if (i <= 1) return false
    return i - 1
  }
  iteratorValue(i) { i }
}
for (n in Countdown.new(3)) System.write(n)
System.print()",
        "321\n",
    );
}

#[test]
fn test_early_return_from_loop_in_method() {
    expect_output(
        "class Finder {
  static first(list, target) {
    for (i in 0...list.count) {
      if (list[i] == target) return i
    }
    return -1
  }
}
System.print(Finder.first([4, 5, 6], 5))
System.print(Finder.first([4, 5, 6], 9))",
        "1\n-1\n",
    );
}

#[test]
fn test_instances_are_compared_by_identity() {
    expect_output(
        "class Token {
  construct new() {}
}
var a = Token.new()
var b = Token.new()
System.print(a == a)
System.print(a == b)",
        "true\nfalse\n",
    );
}
