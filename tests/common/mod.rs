#![allow(dead_code)]

use std::str::FromStr;
use strata::{AxisKind, Expression, NodeTest, NodeTypeTest, Step};
use strata_xpath::Decimal;
use strata_xpath::ast::BinaryOperator;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Expression shorthands
// ============================================================================

pub fn step(axis: AxisKind, test: NodeTest) -> Step {
    Step::new(axis, test)
}

pub fn child(test: NodeTest) -> Step {
    step(AxisKind::Child, test)
}

pub fn attribute(test: NodeTest) -> Step {
    step(AxisKind::Attribute, test)
}

pub fn name(local: &str) -> NodeTest {
    NodeTest::name(local)
}

pub fn p(local: &str) -> NodeTest {
    NodeTest::prefixed("p", local)
}

pub fn node() -> NodeTest {
    NodeTest::node()
}

pub fn text() -> NodeTest {
    NodeTest::text()
}

pub fn element() -> NodeTest {
    NodeTest::NodeType(NodeTypeTest::Element)
}

/// `.` inside a path.
pub fn dot() -> Step {
    step(AxisKind::SelfAxis, node())
}

/// `//` inside a path.
pub fn slash_slash() -> Step {
    Step::descendant_or_self_node()
}

pub fn rel(steps: Vec<Step>) -> Expression {
    Expression::relative(steps)
}

pub fn abs(steps: Vec<Step>) -> Expression {
    Expression::absolute(steps)
}

pub fn num(text: &str) -> Expression {
    Expression::Number(Decimal::from_str(text).expect("test literal is a decimal"))
}

pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Expression {
    Expression::binary(left, op, right)
}

pub fn eq(left: Expression, right: Expression) -> Expression {
    binary(left, BinaryOperator::Equals, right)
}

// ============================================================================
// Scenarios over the reference document
// ============================================================================

/// A query over `create_test_document()` with its expected keys.
pub struct Scenario {
    pub query: &'static str,
    pub expression: Expression,
    pub start: u64,
    pub expected: Vec<u64>,
}

fn scenario(query: &'static str, expression: Expression, start: u64, expected: &[u64]) -> Scenario {
    Scenario {
        query,
        expression,
        start,
        expected: expected.to_vec(),
    }
}

/// Path, predicate and sequence scenarios. Context node 0 unless stated.
pub fn scenarios() -> Vec<Scenario> {
    let p_a = || child(p("a"));
    let b = || child(name("b"));
    let c = || child(name("c"));
    vec![
        scenario("/text:p/b", abs(vec![child(NodeTest::prefixed("text", "p")), b()]), 0, &[]),
        scenario("/p:a/b", abs(vec![p_a(), b()]), 0, &[5, 9]),
        scenario("/p:a/b/c", abs(vec![p_a(), b(), c()]), 0, &[7, 11]),
        scenario("/p:a", abs(vec![p_a()]), 0, &[1]),
        scenario("child::p:a/child::b/child::c", rel(vec![p_a(), b(), c()]), 0, &[7, 11]),
        scenario(
            "/p:a[@i]",
            abs(vec![p_a().with_predicate(rel(vec![attribute(name("i"))]))]),
            0,
            &[1],
        ),
        scenario("/p:a/@i", abs(vec![p_a(), attribute(name("i"))]), 0, &[3]),
        scenario(
            "/p:a/@i/@*",
            abs(vec![p_a(), attribute(name("i")), attribute(NodeTest::Wildcard)]),
            0,
            &[],
        ),
        scenario(
            "p:a/b[@p:x]",
            rel(vec![p_a(), b().with_predicate(rel(vec![attribute(p("x"))]))]),
            0,
            &[9],
        ),
        scenario(
            "p:a[text()]",
            rel(vec![p_a().with_predicate(rel(vec![child(text())]))]),
            0,
            &[1],
        ),
        scenario(
            "p:a[element()]",
            rel(vec![p_a().with_predicate(rel(vec![child(element())]))]),
            0,
            &[1],
        ),
        scenario(
            "p:a[node()/text()]",
            rel(vec![p_a().with_predicate(rel(vec![child(node()), child(text())]))]),
            0,
            &[1],
        ),
        scenario(
            "p:a[./node()/node()/node()]",
            rel(vec![p_a().with_predicate(rel(vec![
                dot(),
                child(node()),
                child(node()),
                child(node()),
            ]))]),
            0,
            &[],
        ),
        scenario(
            "p:a[//element()]",
            rel(vec![p_a().with_predicate(abs(vec![slash_slash(), child(element())]))]),
            0,
            &[1],
        ),
        scenario(
            "p:a[/text()]",
            rel(vec![p_a().with_predicate(abs(vec![child(text())]))]),
            0,
            &[],
        ),
        scenario(
            "p:a[16<65]",
            rel(vec![p_a().with_predicate(binary(num("16"), BinaryOperator::LessThan, num("65")))]),
            0,
            &[1],
        ),
        scenario(
            "p:a[13.0>=4]",
            rel(vec![p_a().with_predicate(binary(
                num("13.0"),
                BinaryOperator::GreaterThanOrEqual,
                num("4"),
            ))]),
            0,
            &[1],
        ),
        scenario(
            "p:a[3=4]",
            rel(vec![p_a().with_predicate(eq(num("3"), num("4")))]),
            0,
            &[],
        ),
        scenario(
            "p:a[3.2 = 3.22]",
            rel(vec![p_a().with_predicate(eq(num("3.2"), num("3.22")))]),
            0,
            &[],
        ),
        scenario(
            "p:a[(3.2 + 0.02) = 3.22]",
            rel(vec![p_a().with_predicate(eq(
                binary(num("3.2"), BinaryOperator::Plus, num("0.02")),
                num("3.22"),
            ))]),
            0,
            &[1],
        ),
        scenario(
            "p:a[@i = \"j\"]",
            rel(vec![p_a().with_predicate(eq(
                rel(vec![attribute(name("i"))]),
                Expression::literal("j"),
            ))]),
            0,
            &[1],
        ),
        scenario(
            "p:a[@i=\"k\"]",
            rel(vec![p_a().with_predicate(eq(
                rel(vec![attribute(name("i"))]),
                Expression::literal("k"),
            ))]),
            0,
            &[],
        ),
        scenario(
            "descendant-or-self::node()[@p:x = \"y\"]",
            rel(vec![step(AxisKind::DescendantOrSelf, node()).with_predicate(eq(
                rel(vec![attribute(p("x"))]),
                Expression::literal("y"),
            ))]),
            0,
            &[9],
        ),
        scenario(
            "p:a/b[@p:x=\"y\"]",
            rel(vec![p_a(), b().with_predicate(eq(
                rel(vec![attribute(p("x"))]),
                Expression::literal("y"),
            ))]),
            0,
            &[9],
        ),
        scenario("/p:a/node()", abs(vec![p_a(), child(node())]), 0, &[4, 5, 8, 9, 13]),
        scenario("p:a/text()", rel(vec![p_a(), child(text())]), 0, &[4, 8, 13]),
        scenario("/p:a/b/text()", abs(vec![p_a(), b(), child(text())]), 0, &[6, 12]),
        scenario("p:a/b/node()", rel(vec![p_a(), b(), child(node())]), 0, &[6, 7, 11, 12]),
        scenario("/p:a//b", abs(vec![p_a(), slash_slash(), b()]), 0, &[5, 9]),
        scenario("//p:a", abs(vec![slash_slash(), p_a()]), 0, &[1]),
        scenario(
            "descendant-or-self::p:a",
            rel(vec![step(AxisKind::DescendantOrSelf, p("a"))]),
            0,
            &[1],
        ),
        scenario(
            "/p:a/descendant-or-self::b",
            abs(vec![p_a(), step(AxisKind::DescendantOrSelf, name("b"))]),
            0,
            &[5, 9],
        ),
        scenario(
            "p:a/descendant::b",
            rel(vec![p_a(), step(AxisKind::Descendant, name("b"))]),
            0,
            &[5, 9],
        ),
        scenario(
            "p:a/descendant::p:a",
            rel(vec![p_a(), step(AxisKind::Descendant, p("a"))]),
            0,
            &[],
        ),
        scenario("ancestor::p:a", rel(vec![step(AxisKind::Ancestor, p("a"))]), 11, &[1]),
        scenario("ancestor::p:a", rel(vec![step(AxisKind::Ancestor, p("a"))]), 13, &[1]),
        scenario("ancestor::node()", rel(vec![step(AxisKind::Ancestor, node())]), 11, &[9, 1]),
        scenario(
            "ancestor-or-self::node()",
            rel(vec![step(AxisKind::AncestorOrSelf, node())]),
            11,
            &[11, 9, 1],
        ),
        scenario("parent::p:a", rel(vec![step(AxisKind::Parent, p("a"))]), 9, &[1]),
        scenario("parent::b", rel(vec![step(AxisKind::Parent, name("b"))]), 11, &[9]),
        scenario("parent::node()", rel(vec![step(AxisKind::Parent, node())]), 11, &[9]),
        scenario("parent::node()", rel(vec![step(AxisKind::Parent, node())]), 13, &[1]),
        scenario("parent::node()", rel(vec![step(AxisKind::Parent, node())]), 1, &[0]),
        scenario("self::p:a", rel(vec![step(AxisKind::SelfAxis, p("a"))]), 1, &[1]),
        scenario("self::b", rel(vec![step(AxisKind::SelfAxis, name("b"))]), 9, &[9]),
        scenario("./node()", rel(vec![dot(), child(node())]), 11, &[]),
        scenario("self::node()", rel(vec![dot()]), 11, &[11]),
        scenario("./b/node()", rel(vec![dot(), b(), child(node())]), 1, &[6, 7, 11, 12]),
        scenario("b", rel(vec![b()]), 1, &[5, 9]),
        scenario("b/c", rel(vec![b(), c()]), 1, &[7, 11]),
        scenario("b/text()", rel(vec![b(), child(text())]), 1, &[6, 12]),
        scenario("/p:a/b/c", abs(vec![p_a(), b(), c()]), 1, &[7, 11]),
        scenario(
            "child::node()/parent::node()",
            rel(vec![child(node()), step(AxisKind::Parent, node())]),
            1,
            &[1],
        ),
        scenario("child::*", rel(vec![child(NodeTest::Wildcard)]), 1, &[5, 9]),
        scenario("child::text()", rel(vec![child(text())]), 1, &[4, 8, 13]),
        scenario("attribute::i", rel(vec![attribute(name("i"))]), 1, &[3]),
        scenario("attribute::*", rel(vec![attribute(NodeTest::Wildcard)]), 1, &[3]),
        scenario("self::blau", rel(vec![step(AxisKind::SelfAxis, name("blau"))]), 1, &[]),
        scenario("/", abs(vec![]), 1, &[0]),
        scenario(
            "child::b[attribute::p:x = \"y\"]",
            rel(vec![b().with_predicate(eq(
                rel(vec![attribute(p("x"))]),
                Expression::literal("y"),
            ))]),
            1,
            &[9],
        ),
        scenario(
            "child::b[child::c]",
            rel(vec![b().with_predicate(rel(vec![c()]))]),
            1,
            &[5, 9],
        ),
        scenario(
            "child::*[text() or c]",
            rel(vec![child(NodeTest::Wildcard).with_predicate(binary(
                rel(vec![child(text())]),
                BinaryOperator::Or,
                rel(vec![c()]),
            ))]),
            1,
            &[5, 9],
        ),
        scenario(
            "child::*[text() or c], /node(), //c",
            Expression::sequence(vec![
                rel(vec![child(NodeTest::Wildcard).with_predicate(binary(
                    rel(vec![child(text())]),
                    BinaryOperator::Or,
                    rel(vec![c()]),
                ))]),
                abs(vec![child(node())]),
                abs(vec![slash_slash(), c()]),
            ]),
            1,
            &[5, 9, 1, 7, 11],
        ),
        scenario(
            "b, b, b",
            Expression::sequence(vec![rel(vec![b()]), rel(vec![b()]), rel(vec![b()])]),
            1,
            &[5, 9, 5, 9, 5, 9],
        ),
        scenario(
            "b/c, ., //c",
            Expression::sequence(vec![
                rel(vec![b(), c()]),
                Expression::ContextItem,
                abs(vec![slash_slash(), c()]),
            ]),
            1,
            &[7, 11, 1, 7, 11],
        ),
        scenario(
            "b/text(), //text(), descendant-or-self::element()",
            Expression::sequence(vec![
                rel(vec![b(), child(text())]),
                abs(vec![slash_slash(), child(text())]),
                rel(vec![step(AxisKind::DescendantOrSelf, element())]),
            ]),
            1,
            &[6, 12, 4, 8, 13, 6, 12, 1, 5, 7, 9, 11],
        ),
        scenario(
            "/p:a/b/c, ., .., .//text()",
            Expression::sequence(vec![
                abs(vec![p_a(), b(), c()]),
                Expression::ContextItem,
                rel(vec![step(AxisKind::Parent, node())]),
                rel(vec![dot(), slash_slash(), child(text())]),
            ]),
            5,
            &[7, 11, 5, 1, 6],
        ),
    ]
}
