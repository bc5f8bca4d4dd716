//! Expression parsing
//!
//! Precedence, lowest first: assignment, `?:`, `||`, `&&`, `==` `!=`,
//! `is`, comparison, range, `+` `-`, `*` `/` `%`, unary, call/subscript.

use std::rc::Rc;

use super::ast::*;
use super::token::Token;
use super::{ParseError, Parser};

/// Parse an expression.
pub fn parse_expression(parser: &mut Parser) -> Result<Expr, ParseError> {
    parser.nested(parse_assignment)
}

fn parse_assignment(parser: &mut Parser) -> Result<Expr, ParseError> {
    let target = parse_conditional(parser)?;
    if !parser.check(&Token::Equal) {
        return Ok(target);
    }
    let line = parser.line();
    parser.advance();
    parser.skip_newlines();
    let value = Box::new(parser.nested(parse_assignment)?);

    match target {
        Expr::Name { .. } | Expr::Field { .. } | Expr::StaticField { .. } | Expr::Subscript { .. } => {
            Ok(Expr::Assign {
                target: Box::new(target),
                value,
                line,
            })
        }
        Expr::Call {
            receiver: Some(_),
            args: None,
            ..
        } => Ok(Expr::Assign {
            target: Box::new(target),
            value,
            line,
        }),
        _ => Err(ParseError {
            message: "Invalid assignment target.".to_string(),
            line,
            location: "'='".to_string(),
        }),
    }
}

fn parse_conditional(parser: &mut Parser) -> Result<Expr, ParseError> {
    let cond = parse_or(parser)?;
    if !parser.matches(&Token::Question) {
        return Ok(cond);
    }
    parser.skip_newlines();
    let then_value = parser.nested(parse_conditional)?;
    parser.skip_newlines();
    parser.expect(&Token::Colon, "Expect ':' after then branch of conditional operator.")?;
    parser.skip_newlines();
    let else_value = parser.nested(parse_conditional)?;
    Ok(Expr::Conditional {
        cond: Box::new(cond),
        then_value: Box::new(then_value),
        else_value: Box::new(else_value),
    })
}

fn parse_or(parser: &mut Parser) -> Result<Expr, ParseError> {
    let mut left = parse_and(parser)?;
    while parser.matches(&Token::PipePipe) {
        parser.skip_newlines();
        let right = parse_and(parser)?;
        left = Expr::Logical {
            op: LogicalOp::Or,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_and(parser: &mut Parser) -> Result<Expr, ParseError> {
    let mut left = parse_equality(parser)?;
    while parser.matches(&Token::AmpAmp) {
        parser.skip_newlines();
        let right = parse_equality(parser)?;
        left = Expr::Logical {
            op: LogicalOp::And,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_equality(parser: &mut Parser) -> Result<Expr, ParseError> {
    let mut left = parse_is(parser)?;
    loop {
        let op = match parser.current() {
            Token::EqualEqual => BinaryOp::Equal,
            Token::BangEqual => BinaryOp::NotEqual,
            _ => return Ok(left),
        };
        left = binary_rhs(parser, op, left, parse_is)?;
    }
}

fn parse_is(parser: &mut Parser) -> Result<Expr, ParseError> {
    let mut value = parse_comparison(parser)?;
    while parser.check(&Token::Is) {
        let line = parser.line();
        parser.advance();
        parser.skip_newlines();
        let class = parse_comparison(parser)?;
        value = Expr::Is {
            value: Box::new(value),
            class: Box::new(class),
            line,
        };
    }
    Ok(value)
}

fn parse_comparison(parser: &mut Parser) -> Result<Expr, ParseError> {
    let mut left = parse_range(parser)?;
    loop {
        let op = match parser.current() {
            Token::Less => BinaryOp::Less,
            Token::LessEqual => BinaryOp::LessEqual,
            Token::Greater => BinaryOp::Greater,
            Token::GreaterEqual => BinaryOp::GreaterEqual,
            _ => return Ok(left),
        };
        left = binary_rhs(parser, op, left, parse_range)?;
    }
}

fn parse_range(parser: &mut Parser) -> Result<Expr, ParseError> {
    let left = parse_term(parser)?;
    let op = match parser.current() {
        Token::DotDot => BinaryOp::RangeInclusive,
        Token::DotDotDot => BinaryOp::RangeExclusive,
        _ => return Ok(left),
    };
    binary_rhs(parser, op, left, parse_term)
}

fn parse_term(parser: &mut Parser) -> Result<Expr, ParseError> {
    let mut left = parse_factor(parser)?;
    loop {
        let op = match parser.current() {
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Sub,
            _ => return Ok(left),
        };
        left = binary_rhs(parser, op, left, parse_factor)?;
    }
}

fn parse_factor(parser: &mut Parser) -> Result<Expr, ParseError> {
    let mut left = parse_unary(parser)?;
    loop {
        let op = match parser.current() {
            Token::Star => BinaryOp::Mul,
            Token::Slash => BinaryOp::Div,
            Token::Percent => BinaryOp::Mod,
            _ => return Ok(left),
        };
        left = binary_rhs(parser, op, left, parse_unary)?;
    }
}

/// Consume the operator token, then parse the right operand with `operand`.
fn binary_rhs(
    parser: &mut Parser,
    op: BinaryOp,
    left: Expr,
    operand: fn(&mut Parser) -> Result<Expr, ParseError>,
) -> Result<Expr, ParseError> {
    let line = parser.line();
    parser.advance();
    parser.skip_newlines();
    let right = operand(parser)?;
    Ok(Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        line,
    })
}

fn parse_unary(parser: &mut Parser) -> Result<Expr, ParseError> {
    let op = match parser.current() {
        Token::Minus => UnaryOp::Negate,
        Token::Bang => UnaryOp::Not,
        _ => return parse_postfix(parser),
    };
    let line = parser.line();
    parser.advance();
    let operand = parser.nested(parse_unary)?;
    Ok(Expr::Unary {
        op,
        operand: Box::new(operand),
        line,
    })
}

fn parse_postfix(parser: &mut Parser) -> Result<Expr, ParseError> {
    let mut expr = parse_primary(parser)?;
    loop {
        let continues_on_next_line =
            parser.check(&Token::Newline) && matches!(parser.peek_past_newlines(), Token::Dot);
        if parser.check(&Token::Dot) || continues_on_next_line {
            parser.skip_newlines();
            let line = parser.line();
            parser.advance();
            let name = parser.expect_name("Expect method name after '.'.")?;
            let args = parse_call_args(parser)?;
            expr = Expr::Call {
                receiver: Some(Box::new(expr)),
                name,
                args,
                line,
            };
        } else if parser.check(&Token::LeftBracket) {
            let line = parser.line();
            parser.advance();
            let args = parse_list_items(parser, &Token::RightBracket, "Expect ']' after subscript.")?;
            if args.is_empty() {
                return Err(parser.error("Expect at least one subscript argument."));
            }
            expr = Expr::Subscript {
                receiver: Box::new(expr),
                args,
                line,
            };
        } else {
            return Ok(expr);
        }
    }
}

/// Arguments of a call if a `(` follows on the same line; `None` for a getter.
fn parse_call_args(parser: &mut Parser) -> Result<Option<Vec<Expr>>, ParseError> {
    if !parser.matches(&Token::LeftParen) {
        return Ok(None);
    }
    parse_list_items(parser, &Token::RightParen, "Expect ')' after arguments.").map(Some)
}

/// Comma separated expressions up to `close`; the opening token is already
/// consumed. Newlines are allowed between items and a trailing comma is
/// accepted.
fn parse_list_items(parser: &mut Parser, close: &Token, message: &str) -> Result<Vec<Expr>, ParseError> {
    let mut items = Vec::new();
    parser.skip_newlines();
    while !parser.check(close) {
        items.push(parse_expression(parser)?);
        parser.skip_newlines();
        if !parser.matches(&Token::Comma) {
            break;
        }
        parser.skip_newlines();
    }
    parser.expect(close, message)?;
    Ok(items)
}

fn parse_primary(parser: &mut Parser) -> Result<Expr, ParseError> {
    let line = parser.line();
    match parser.current().clone() {
        Token::Number(n) => {
            parser.advance();
            Ok(Expr::Num(n))
        }
        Token::Str(s) => {
            parser.advance();
            Ok(Expr::Str(Rc::from(s)))
        }
        Token::True => {
            parser.advance();
            Ok(Expr::Bool(true))
        }
        Token::False => {
            parser.advance();
            Ok(Expr::Bool(false))
        }
        Token::Null => {
            parser.advance();
            Ok(Expr::Null)
        }
        Token::This => {
            parser.advance();
            Ok(Expr::This(line))
        }
        Token::Field(name) => {
            parser.advance();
            if name.starts_with("__") {
                Ok(Expr::StaticField { name, line })
            } else {
                Ok(Expr::Field { name, line })
            }
        }
        Token::Name(name) => {
            parser.advance();
            if parser.check(&Token::LeftParen) {
                let args = parse_call_args(parser)?;
                Ok(Expr::Call {
                    receiver: None,
                    name,
                    args,
                    line,
                })
            } else {
                Ok(Expr::Name { name, line })
            }
        }
        Token::LeftParen => {
            parser.advance();
            parser.skip_newlines();
            let expr = parse_expression(parser)?;
            parser.skip_newlines();
            parser.expect(&Token::RightParen, "Expect ')' after expression.")?;
            Ok(expr)
        }
        Token::LeftBracket => {
            parser.advance();
            let items = parse_list_items(parser, &Token::RightBracket, "Expect ']' after list elements.")?;
            Ok(Expr::List(items))
        }
        Token::Super => {
            parser.advance();
            let name = if parser.matches(&Token::Dot) {
                Some(parser.expect_name("Expect method name after 'super.'.")?)
            } else {
                None
            };
            let args = parse_call_args(parser)?;
            Ok(Expr::Super { name, args, line })
        }
        _ => Err(parser.error("Expect expression.")),
    }
}
