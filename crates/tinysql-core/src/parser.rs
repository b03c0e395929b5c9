//! Recursive-descent parser (spec §4.2) producing a [`Query`] AST. Errors
//! are reported with the offending token and never silently recovered from.

use crate::ast::{BinOp, Expr, From, Join, OrderSpec, Query, Selector};
use crate::error::{Error, ParseError};
use crate::lexer::Tokenizer;
use crate::token::TokenKind;
use crate::value::Value;

const AGGREGATES: &[&str] = &["count", "min"];

fn is_aggregate(name: &str) -> bool {
    AGGREGATES.iter().any(|a| name.eq_ignore_ascii_case(a))
}

/// Parses a SQL string into a [`Query`] AST. A non-`end` token left over
/// after a full query production is a parse error: the parser never
/// silently recovers (spec §4.2).
pub fn parse(sql: &str) -> Result<Query, Error> {
    let mut tr = Tokenizer::new(sql);
    let q = parse_inner(&mut tr)?;
    let trailing = tr.peek()?;
    if trailing.kind != TokenKind::End {
        return Err(ParseError::UnexpectedToken { got: trailing }.into());
    }
    Ok(q)
}

fn expect_keyword(tr: &mut Tokenizer, word: &str) -> Result<(), Error> {
    if tr.eat_keyword(word)? {
        Ok(())
    } else {
        let got = tr.peek()?;
        Err(ParseError::Expected {
            expected: word.to_string(),
            got,
        }
        .into())
    }
}

fn expect_identifier(tr: &mut Tokenizer) -> Result<String, Error> {
    let t = tr.next()?;
    if t.kind != TokenKind::Identifier {
        return Err(ParseError::ExpectedIdentifier { got: t }.into());
    }
    Ok(t.text)
}

fn read_from_source(tr: &mut Tokenizer) -> Result<From, Error> {
    if tr.eat(TokenKind::Operator, "(")? {
        let sub = parse_inner(tr)?;
        if !tr.eat(TokenKind::Operator, ")")? {
            let got = tr.peek()?;
            return Err(ParseError::Expected {
                expected: ")".into(),
                got,
            }
            .into());
        }
        return Ok(From::Subquery(Box::new(sub)));
    }
    Ok(From::Table(expect_identifier(tr)?))
}

/// Parses a full `query` production without requiring a trailing `end`
/// token, for use as a subquery nested inside parentheses.
fn parse_inner(tr: &mut Tokenizer) -> Result<Query, Error> {
    let mut q = Query::default();
    expect_keyword(tr, "SELECT")?;
    loop {
        q.selectors.push(read_selector(tr)?);
        if !tr.eat(TokenKind::Operator, ",")? {
            break;
        }
    }
    if tr.eat_keyword("FROM")? {
        q.from = read_from_source(tr)?;
        q.joins = read_joins(tr)?;
    }
    if tr.eat_keyword("WHERE")? {
        q.filter = Some(read_expression(tr)?);
    }
    if tr.eat_keyword("GROUP")? {
        expect_keyword(tr, "BY")?;
        loop {
            q.group_by.push(read_expression(tr)?);
            if !tr.eat(TokenKind::Operator, ",")? {
                break;
            }
        }
    }
    if tr.eat_keyword("ORDER")? {
        expect_keyword(tr, "BY")?;
        loop {
            q.order_by.push(read_order(tr)?);
            if !tr.eat(TokenKind::Operator, ",")? {
                break;
            }
        }
    }
    if tr.eat_keyword("LIMIT")? {
        let n = tr.next()?;
        if n.kind != TokenKind::Number {
            return Err(ParseError::ExpectedLimitNumber { got: n }.into());
        }
        let val: i64 = n
            .text
            .parse()
            .map_err(|_| ParseError::InvalidInteger { text: n.text.clone() })?;
        if val < 0 {
            return Err(ParseError::InvalidInteger { text: n.text }.into());
        }
        q.limit = Some(val as u64);
    }
    Ok(q)
}

fn read_joins(tr: &mut Tokenizer) -> Result<Vec<Join>, Error> {
    let mut joins = vec![];
    while tr.eat_keyword("JOIN")? {
        let table = expect_identifier(tr)?;
        expect_keyword(tr, "ON")?;
        let condition = read_expression(tr)?;
        joins.push(Join { table, condition });
    }
    Ok(joins)
}

fn read_order(tr: &mut Tokenizer) -> Result<OrderSpec, Error> {
    let expr = read_expression(tr)?;
    let desc = if tr.eat_keyword("DESC")? {
        true
    } else {
        tr.eat_keyword("ASC")?;
        false
    };
    Ok(OrderSpec { expr, desc })
}

fn read_selector(tr: &mut Tokenizer) -> Result<Selector, Error> {
    if tr.eat(TokenKind::Operator, "*")? {
        return Ok(Selector {
            expr: Expr::Star,
            alias: None,
        });
    }
    let expr = read_expression(tr)?;
    if tr.eat_keyword("AS")? {
        let alias = expect_identifier(tr)?;
        return Ok(Selector {
            expr,
            alias: Some(alias),
        });
    }
    Ok(Selector { expr, alias: None })
}

fn read_expression(tr: &mut Tokenizer) -> Result<Expr, Error> {
    let mut e = read_expr1(tr)?;
    while tr.eat_keyword("OR")? {
        let rhs = read_expr1(tr)?;
        e = Expr::or(e, rhs);
    }
    Ok(e)
}

fn read_expr1(tr: &mut Tokenizer) -> Result<Expr, Error> {
    let e = read_expr0(tr)?;
    let op = if tr.eat(TokenKind::Operator, "=")? {
        Some(BinOp::Eq)
    } else if tr.eat(TokenKind::Operator, "<")? {
        Some(BinOp::Lt)
    } else if tr.eat(TokenKind::Operator, ">")? {
        Some(BinOp::Gt)
    } else {
        None
    };
    match op {
        Some(op) => {
            let rhs = read_expr0(tr)?;
            Ok(Expr::binary(op, e, rhs))
        }
        None => Ok(e),
    }
}

fn read_scalar(tr: &mut Tokenizer) -> Result<Option<Expr>, Error> {
    let t = tr.peek()?;
    if t.kind == TokenKind::String {
        tr.next()?;
        return Ok(Some(Expr::Value(Value::String(t.text))));
    }
    if t.kind == TokenKind::Number {
        tr.next()?;
        let n: i64 = t
            .text
            .parse()
            .map_err(|_| ParseError::InvalidInteger { text: t.text.clone() })?;
        return Ok(Some(Expr::Value(Value::Int(n))));
    }
    Ok(None)
}

fn read_expr0(tr: &mut Tokenizer) -> Result<Expr, Error> {
    if let Some(scalar) = read_scalar(tr)? {
        return Ok(scalar);
    }
    if tr.eat_keyword("TRUE")? {
        return Ok(Expr::Value(Value::Bool(true)));
    }
    if tr.eat_keyword("FALSE")? {
        return Ok(Expr::Value(Value::Bool(false)));
    }
    if tr.eat_keyword("ARRAY")? {
        if !tr.eat(TokenKind::Operator, "[")? {
            let got = tr.peek()?;
            return Err(ParseError::Expected {
                expected: "[".into(),
                got,
            }
            .into());
        }
        let mut items = vec![];
        while let Some(item) = read_scalar(tr)? {
            let Expr::Value(v) = item else { unreachable!() };
            items.push(v);
            if !tr.eat(TokenKind::Operator, ",")? {
                break;
            }
        }
        if !tr.eat(TokenKind::Operator, "]")? {
            let got = tr.peek()?;
            return Err(ParseError::Expected {
                expected: "]".into(),
                got,
            }
            .into());
        }
        return Ok(Expr::Value(Value::Array(items)));
    }

    let name1 = expect_identifier(tr)?;

    let next = tr.peek()?;
    if next.is_operator("(") && is_aggregate(&name1) {
        tr.next()?;
        let mut args = vec![];
        if tr.eat(TokenKind::Operator, "*")? {
            args.push(Expr::Star);
            if !tr.eat(TokenKind::Operator, ")")? {
                let got = tr.peek()?;
                return Err(ParseError::Expected {
                    expected: format!(") after {name1}(*"),
                    got,
                }
                .into());
            }
        } else {
            loop {
                args.push(read_expression(tr)?);
                if !tr.eat(TokenKind::Operator, ",")? {
                    break;
                }
            }
            if !tr.eat(TokenKind::Operator, ")")? {
                let got = tr.peek()?;
                return Err(ParseError::Expected {
                    expected: ")".into(),
                    got,
                }
                .into());
            }
        }
        return Ok(Expr::Aggregate { name: name1, args });
    }

    if next.is_operator("(") {
        tr.next()?;
        if name1.eq_ignore_ascii_case("cast") {
            let inner = read_expression(tr)?;
            expect_keyword(tr, "AS")?;
            let type_tok = tr.next()?;
            let type_name = type_tok.text.clone();
            if !tr.eat(TokenKind::Operator, ")")? {
                let got = tr.peek()?;
                return Err(ParseError::Expected {
                    expected: ")".into(),
                    got,
                }
                .into());
            }
            return Ok(Expr::Cast {
                expr: Box::new(inner),
                type_name,
            });
        }
        let mut args = vec![];
        loop {
            args.push(read_expression(tr)?);
            if !tr.eat(TokenKind::Operator, ",")? {
                break;
            }
        }
        if !tr.eat(TokenKind::Operator, ")")? {
            let got = tr.peek()?;
            return Err(ParseError::Expected {
                expected: ")".into(),
                got,
            }
            .into());
        }
        return Ok(Expr::Function { name: name1, args });
    }

    if tr.eat(TokenKind::Operator, ".")? {
        let name2 = expect_identifier(tr)?;
        return Ok(Expr::ColumnRef {
            table: name1,
            column: name2,
        });
    }

    Ok(Expr::bare_column(name1))
}
