//! Statement and class declaration parsing

use std::rc::Rc;

use super::ast::*;
use super::expr::parse_expression;
use super::token::Token;
use super::{ParseError, Parser};

/// Parse a whole module.
pub fn parse_module(parser: &mut Parser) -> Result<Module, ParseError> {
    let mut statements = Vec::new();
    parser.skip_newlines();
    while !parser.is_at_end() {
        if parser.check(&Token::RightBrace) {
            return Err(parser.error("Unexpected '}'."));
        }
        statements.push(parse_definition(parser)?);
        parser.expect_line_end()?;
    }
    Ok(Module { statements })
}

/// Top-level item: class, import, variable or statement.
fn parse_definition(parser: &mut Parser) -> Result<Stmt, ParseError> {
    match parser.current() {
        Token::Class => {
            parser.advance();
            parse_class(parser, false)
        }
        Token::Foreign => {
            parser.advance();
            parser.expect(&Token::Class, "Expect 'class' after 'foreign'.")?;
            parse_class(parser, true)
        }
        Token::Import => parse_import(parser),
        Token::Var => parse_var(parser),
        _ => parse_statement(parser),
    }
}

fn parse_import(parser: &mut Parser) -> Result<Stmt, ParseError> {
    let line = parser.line();
    parser.advance();
    let module = match parser.advance() {
        Token::Str(name) => name,
        _ => return Err(parser.error("Expect a string after 'import'.")),
    };
    let mut names = Vec::new();
    if parser.matches(&Token::For) {
        loop {
            parser.skip_newlines();
            let name = parser.expect_name("Expect variable name.")?;
            let local = if matches!(parser.current(), Token::Name(word) if word == "as") {
                parser.advance();
                parser.expect_name("Expect a name after 'as'.")?
            } else {
                name.clone()
            };
            names.push(ImportName { name, local });
            if !parser.matches(&Token::Comma) {
                break;
            }
        }
    }
    Ok(Stmt::Import {
        module,
        names,
        line,
    })
}

fn parse_var(parser: &mut Parser) -> Result<Stmt, ParseError> {
    let line = parser.line();
    parser.advance();
    let name = parser.expect_name("Expect variable name.")?;
    let init = if parser.matches(&Token::Equal) {
        parser.skip_newlines();
        Some(parse_expression(parser)?)
    } else {
        None
    };
    Ok(Stmt::Var { name, init, line })
}

// ============================================================================
// Statements
// ============================================================================

/// Parse a statement.
pub fn parse_statement(parser: &mut Parser) -> Result<Stmt, ParseError> {
    parser.nested(parse_statement_inner)
}

fn parse_statement_inner(parser: &mut Parser) -> Result<Stmt, ParseError> {
    let line = parser.line();
    match parser.current() {
        Token::If => {
            parser.advance();
            let cond = parse_condition(parser, "if")?;
            parser.skip_newlines();
            let then_branch = Box::new(parse_statement(parser)?);
            let else_branch = if matches!(parser.peek_past_newlines(), Token::Else) {
                parser.skip_newlines();
                parser.advance();
                parser.skip_newlines();
                Some(Box::new(parse_statement(parser)?))
            } else {
                None
            };
            Ok(Stmt::If {
                cond,
                then_branch,
                else_branch,
            })
        }
        Token::While => {
            parser.advance();
            let cond = parse_condition(parser, "while")?;
            parser.skip_newlines();
            let body = Box::new(parse_statement(parser)?);
            Ok(Stmt::While { cond, body })
        }
        Token::For => {
            parser.advance();
            parser.expect(&Token::LeftParen, "Expect '(' after 'for'.")?;
            let var = parser.expect_name("Expect for loop variable name.")?;
            parser.expect(&Token::In, "Expect 'in' after loop variable.")?;
            parser.skip_newlines();
            let sequence = parse_expression(parser)?;
            parser.skip_newlines();
            parser.expect(&Token::RightParen, "Expect ')' after loop expression.")?;
            parser.skip_newlines();
            let body = Box::new(parse_statement(parser)?);
            Ok(Stmt::For {
                var,
                sequence,
                body,
                line,
            })
        }
        Token::Return => {
            parser.advance();
            let value = match parser.current() {
                Token::Newline | Token::RightBrace | Token::Eof => None,
                _ => Some(parse_expression(parser)?),
            };
            Ok(Stmt::Return { value, line })
        }
        Token::Break => {
            parser.advance();
            Ok(Stmt::Break(line))
        }
        Token::Continue => {
            parser.advance();
            Ok(Stmt::Continue(line))
        }
        Token::LeftBrace => {
            parser.advance();
            Ok(Stmt::Block(parse_block(parser)?))
        }
        _ => Ok(Stmt::Expr(parse_expression(parser)?)),
    }
}

fn parse_condition(parser: &mut Parser, keyword: &str) -> Result<Expr, ParseError> {
    parser.expect(&Token::LeftParen, &format!("Expect '(' after '{}'.", keyword))?;
    parser.skip_newlines();
    let cond = parse_expression(parser)?;
    parser.skip_newlines();
    parser.expect(&Token::RightParen, "Expect ')' after condition.")?;
    Ok(cond)
}

/// Statements up to the closing brace. The opening brace is consumed.
fn parse_block(parser: &mut Parser) -> Result<Vec<Stmt>, ParseError> {
    let mut statements = Vec::new();
    parser.skip_newlines();
    while !parser.check(&Token::RightBrace) {
        if parser.is_at_end() {
            return Err(parser.error("Expect '}' after block."));
        }
        statements.push(parse_block_item(parser)?);
        parser.expect_line_end()?;
    }
    parser.advance();
    Ok(statements)
}

fn parse_block_item(parser: &mut Parser) -> Result<Stmt, ParseError> {
    match parser.current() {
        Token::Var => parse_var(parser),
        Token::Class | Token::Foreign => {
            Err(parser.error("Classes can only be declared at the top level."))
        }
        Token::Import => Err(parser.error("Imports can only appear at the top level.")),
        _ => parse_statement(parser),
    }
}

// ============================================================================
// Classes
// ============================================================================

fn parse_class(parser: &mut Parser, is_foreign: bool) -> Result<Stmt, ParseError> {
    let line = parser.line();
    let name = parser.expect_name("Expect class name.")?;
    let superclass = if parser.matches(&Token::Is) {
        Some(parser.expect_name("Expect superclass name after 'is'.")?)
    } else {
        None
    };
    parser.expect(&Token::LeftBrace, "Expect '{' after class declaration.")?;
    parser.skip_newlines();

    let mut methods = Vec::new();
    while !parser.check(&Token::RightBrace) {
        if parser.is_at_end() {
            return Err(parser.error("Expect '}' after class body."));
        }
        methods.push(Rc::new(parse_member(parser)?));
        parser.expect_line_end()?;
    }
    parser.advance();

    Ok(Stmt::Class(Rc::new(ClassDecl {
        name,
        superclass,
        is_foreign,
        methods,
        line,
    })))
}

fn parse_member(parser: &mut Parser) -> Result<MethodDecl, ParseError> {
    let line = parser.line();
    let mut is_foreign = false;
    let mut is_static = false;
    loop {
        if parser.matches(&Token::Foreign) {
            is_foreign = true;
        } else if parser.matches(&Token::Static) {
            is_static = true;
        } else {
            break;
        }
    }

    let (name, kind, params) = if parser.matches(&Token::Construct) {
        if is_static || is_foreign {
            return Err(parser.error("Constructors cannot be static or foreign."));
        }
        let name = parser.expect_name("Expect constructor name after 'construct'.")?;
        if !parser.check(&Token::LeftParen) {
            return Err(parser.error("A constructor cannot be a getter."));
        }
        let params = parse_params(parser)?;
        (name, MethodKind::Constructor, params)
    } else {
        let name = parser.expect_name("Expect method definition.")?;
        if parser.matches(&Token::Equal) {
            parser.expect(&Token::LeftParen, "Expect '(' after '=' in setter.")?;
            let param = parser.expect_name("Expect setter parameter name.")?;
            parser.expect(&Token::RightParen, "Expect ')' after setter parameter.")?;
            (name, MethodKind::Setter, vec![param])
        } else if parser.check(&Token::LeftParen) {
            let params = parse_params(parser)?;
            (name, MethodKind::Method, params)
        } else {
            (name, MethodKind::Getter, Vec::new())
        }
    };

    let body = if is_foreign {
        Vec::new()
    } else {
        parser.expect(&Token::LeftBrace, "Expect '{' to begin method body.")?;
        parse_method_body(parser)?
    };

    Ok(MethodDecl {
        name,
        kind,
        is_static,
        is_foreign,
        params,
        body,
        line,
    })
}

fn parse_params(parser: &mut Parser) -> Result<Vec<String>, ParseError> {
    parser.expect(&Token::LeftParen, "Expect '(' before parameters.")?;
    parser.skip_newlines();
    let mut params = Vec::new();
    if !parser.check(&Token::RightParen) {
        loop {
            params.push(parser.expect_name("Expect parameter name.")?);
            parser.skip_newlines();
            if !parser.matches(&Token::Comma) {
                break;
            }
            parser.skip_newlines();
        }
    }
    parser.expect(&Token::RightParen, "Expect ')' after parameters.")?;
    Ok(params)
}

/// Method body after the opening brace.
///
/// A body written on the same line as its braces and consisting of a single
/// expression returns that expression's value.
fn parse_method_body(parser: &mut Parser) -> Result<Vec<Stmt>, ParseError> {
    match parser.current() {
        Token::Newline
        | Token::RightBrace
        | Token::Return
        | Token::If
        | Token::While
        | Token::For
        | Token::Var
        | Token::Break
        | Token::Continue
        | Token::LeftBrace => parse_block(parser),
        _ => {
            let line = parser.line();
            let value = parse_expression(parser)?;
            if parser.matches(&Token::RightBrace) {
                return Ok(vec![Stmt::Return {
                    value: Some(value),
                    line,
                }]);
            }
            parser.expect_line_end()?;
            let mut body = vec![Stmt::Expr(value)];
            body.extend(parse_block(parser)?);
            Ok(body)
        }
    }
}
