use std::iter::Peekable;

use crate::error::{Error, Result};
use crate::sql::parser::ast::{CompareOp, Filter, Predicate, Projection, Statement};
use crate::sql::parser::lexer::{Keyword, Lexer, Token};

pub mod ast;
pub mod lexer;

const SELECT_USAGE: &str = "SELECT <column, ... | *> FROM <table> [WHERE <condition>]";
const UPDATE_USAGE: &str = "UPDATE <table> SET <column> = '<value>' [WHERE <condition>]";
const DELETE_USAGE: &str = "DELETE FROM <table> WHERE <condition>";

/// Query parser - converts tokens into an AST statement
pub struct Parser<'a> {
    input: &'a str,
    lexer: Peekable<Lexer<'a>>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given query text
    pub fn new(input: &'a str) -> Self {
        Parser { input, lexer: Lexer::new(input).peekable() }
    }

    /// Parses the input query into an AST
    pub fn parse(&mut self) -> Result<Statement> {
        // A query whose first token does not lex cannot start with a supported keyword
        let first = self.peek().map_err(|_| {
            let head = self.input.split_whitespace().next().unwrap_or_default();
            Error::UnsupportedOperation(head.to_string())
        })?;
        match first {
            Some(Token::Keyword(Keyword::Select)) => {
                self.parse_select().map_err(|e| e.into_syntax("SELECT", SELECT_USAGE))
            }
            Some(Token::Keyword(Keyword::Update)) => {
                self.parse_update().map_err(|e| e.into_syntax("UPDATE", UPDATE_USAGE))
            }
            Some(Token::Keyword(Keyword::Delete)) => {
                self.parse_delete().map_err(|e| e.into_syntax("DELETE", DELETE_USAGE))
            }
            Some(t) => Err(Error::UnsupportedOperation(t.to_string())),
            None => Err(Error::EmptyInput("query".to_string())),
        }
    }

    /// Parses SELECT statement
    fn parse_select(&mut self) -> Result<Statement> {
        self.next_expect(Token::Keyword(Keyword::Select))?;

        let columns = if self.next_if_token(Token::Asterisk).is_some() {
            Projection::All
        } else {
            let mut cols = Vec::new();
            loop {
                cols.push(self.next_ident()?);
                if self.next_if_token(Token::Comma).is_none() {
                    break;
                }
            }
            Projection::Columns(cols)
        };

        self.next_expect(Token::Keyword(Keyword::From))?;
        let table_ref = self.next_table_ref()?;
        let filter = self.parse_where_clause()?;
        self.expect_end()?;
        Ok(Statement::Select { columns, table_ref, filter })
    }

    /// Parses UPDATE statement
    fn parse_update(&mut self) -> Result<Statement> {
        self.next_expect(Token::Keyword(Keyword::Update))?;
        let table_ref = self.next_table_ref()?;
        self.next_expect(Token::Keyword(Keyword::Set))?;

        let column = self.next_ident()?;
        self.next_expect(Token::Equal)?;
        let value = self.parse_literal()?;
        if self.next_if_token(Token::Comma).is_some() {
            return Err(Error::Parse(
                "[Parser] only one SET assignment is supported".to_string(),
            ));
        }

        let filter = self.parse_where_clause()?;
        self.expect_end()?;
        Ok(Statement::Update { table_ref, column, value, filter })
    }

    /// Parses DELETE statement, FROM is optional
    fn parse_delete(&mut self) -> Result<Statement> {
        self.next_expect(Token::Keyword(Keyword::Delete))?;
        self.next_if_token(Token::Keyword(Keyword::From));
        let table_ref = self.next_table_ref()?;
        let filter = self.parse_where_clause()?;
        self.expect_end()?;
        Ok(Statement::Delete { table_ref, filter })
    }

    /// Parses a literal value: quoted string, or a bare (possibly negative) number
    fn parse_literal(&mut self) -> Result<String> {
        match self.next()? {
            Token::String(s) => Ok(s),
            Token::Number(n) => Ok(n),
            Token::Minus => match self.next()? {
                Token::Number(n) => Ok(format!("-{}", n)),
                token => Err(Error::Parse(format!("[Parser] Expected number after -, got {}", token))),
            },
            token => Err(Error::Parse(format!(
                "[Parser] Expected a quoted value, got {}",
                token
            ))),
        }
    }

    /// Collects everything after WHERE and parses it as a predicate.
    ///
    /// A clause that fits no predicate shape is kept as `Filter::Invalid` so
    /// the statement can still run and report it.
    fn parse_where_clause(&mut self) -> Result<Option<Filter>> {
        if self.next_if_token(Token::Keyword(Keyword::Where)).is_none() {
            return Ok(None);
        }

        let mut tokens = Vec::new();
        let mut lex_error = None;
        for token in self.lexer.by_ref() {
            match token {
                Ok(Token::Semicolon) => break,
                Ok(token) => tokens.push(token),
                Err(err) => {
                    lex_error.get_or_insert(err);
                }
            }
        }

        let clause = render_clause(&tokens);
        if let Some(err) = lex_error {
            return Ok(Some(Filter::Invalid { clause, reason: err.to_string() }));
        }
        parse_predicate(&tokens, clause).map(Some)
    }

    /// Peeks at the next token
    fn peek(&mut self) -> Result<Option<Token>> {
        self.lexer.peek().cloned().transpose()
    }

    /// Consumes and returns the next token
    fn next(&mut self) -> Result<Token> {
        self.lexer
            .next()
            .unwrap_or_else(|| Err(Error::Parse("[Parser] Unexpected end of input".to_string())))
    }

    /// Expects and consumes an identifier
    fn next_ident(&mut self) -> Result<String> {
        match self.next()? {
            Token::Ident(ident) => Ok(ident),
            token => Err(Error::Parse(format!(
                "[Parser] Expected column name, got {}",
                token
            ))),
        }
    }

    /// Expects and consumes the table placeholder name
    fn next_table_ref(&mut self) -> Result<String> {
        match self.next()? {
            Token::Ident(ident) | Token::String(ident) => Ok(ident),
            token => Err(Error::Parse(format!(
                "[Parser] Expected table name, got {}",
                token
            ))),
        }
    }

    /// Expects a specific token, returns error if different
    fn next_expect(&mut self, expect: Token) -> Result<()> {
        let token = self.next()?;
        if token != expect {
            return Err(Error::Parse(format!(
                "[Parser] Expected token {}, got {}",
                expect, token
            )));
        }
        Ok(())
    }

    /// Allows one trailing semicolon, then nothing else
    fn expect_end(&mut self) -> Result<()> {
        self.next_if_token(Token::Semicolon);
        match self.peek()? {
            Some(token) => Err(Error::Parse(format!("[Parser] Unexpected token {}", token))),
            None => Ok(()),
        }
    }

    /// Consumes next token if it satisfies the predicate
    fn next_if<F: Fn(&Token) -> bool>(&mut self, predicate: F) -> Option<Token> {
        self.peek().unwrap_or(None).filter(|t| predicate(t))?;
        self.next().ok()
    }

    /// Consumes next token if it matches the given token
    fn next_if_token(&mut self, token: Token) -> Option<Token> {
        self.next_if(|t| t == &token)
    }
}

/// Matches the clause tokens against LIKE, IN and comparison, in that order.
///
/// Only an IN list without quoted values is a hard error.
fn parse_predicate(tokens: &[Token], clause: String) -> Result<Filter> {
    fn invalid(clause: String, reason: &str) -> Result<Filter> {
        Ok(Filter::Invalid { clause, reason: reason.to_string() })
    }

    let predicate = match tokens {
        [] => return invalid(clause, "missing condition"),
        [Token::Ident(column), Token::Keyword(Keyword::Like), Token::String(pattern)] => {
            Predicate::Like { column: column.clone(), pattern: pattern.clone() }
        }
        [Token::Ident(column), Token::Keyword(Keyword::In), Token::OpenParen, list @ .., Token::CloseParen] => {
            let values = list
                .iter()
                .filter_map(|t| match t {
                    Token::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect::<Vec<_>>();
            if values.is_empty() {
                return Err(Error::EmptyInList(clause));
            }
            Predicate::In { column: column.clone(), values }
        }
        [Token::Ident(column), op @ (Token::Equal | Token::Operator(_)), value @ ..] => {
            let value = match value {
                [Token::String(v)] | [Token::Number(v)] => v.clone(),
                [Token::Minus, Token::Number(v)] => format!("-{}", v),
                _ => return invalid(clause, "expected a single quoted value after the operator"),
            };
            Predicate::Comparison {
                column: column.clone(),
                op: CompareOp::from_str(&op.to_string()),
                value,
            }
        }
        [Token::Ident(_), Token::Keyword(Keyword::Like), ..] => {
            return invalid(clause, "LIKE expects a single quoted pattern");
        }
        [Token::Ident(_), Token::Keyword(Keyword::In), ..] => {
            return invalid(clause, "IN expects a parenthesised list of quoted values");
        }
        [Token::Ident(_), ..] => {
            return invalid(clause, "expected LIKE, IN or a comparison operator after the column");
        }
        _ => return invalid(clause, "a condition must start with a column name"),
    };
    Ok(Filter::Predicate(predicate))
}

/// Renders clause tokens back into readable text for diagnostics
fn render_clause(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        let glued = matches!(token, Token::Comma | Token::CloseParen)
            || matches!(prev, Some(Token::OpenParen) | Some(Token::Minus) | None);
        if !glued {
            out.push(' ');
        }
        out.push_str(&token.to_string());
        prev = Some(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::error::{Error, Result};
    use crate::sql::parser::ast::{CompareOp, Filter, Predicate, Projection, Statement};

    #[test]
    fn test_parser_select() -> Result<()> {
        let stmt = Parser::new("select * from data;").parse()?;
        assert_eq!(
            stmt,
            Statement::Select {
                columns: Projection::All,
                table_ref: "data".to_string(),
                filter: None,
            }
        );

        let stmt = Parser::new("SELECT Name, Age FROM data WHERE Name LIKE 'A%'").parse()?;
        assert_eq!(
            stmt,
            Statement::Select {
                columns: Projection::Columns(vec!["Name".to_string(), "Age".to_string()]),
                table_ref: "data".to_string(),
                filter: Some(Filter::Predicate(Predicate::Like {
                    column: "Name".to_string(),
                    pattern: "A%".to_string(),
                })),
            }
        );

        let stmt = Parser::new("select * from tbl limit 5").parse();
        assert!(matches!(
            stmt,
            Err(Error::InvalidStatementSyntax { statement: "SELECT", .. })
        ));
        Ok(())
    }

    #[test]
    fn test_parser_update() -> Result<()> {
        let stmt = Parser::new("UPDATE data SET Age = '18' WHERE Age < '18';").parse()?;
        assert_eq!(
            stmt,
            Statement::Update {
                table_ref: "data".to_string(),
                column: "Age".to_string(),
                value: "18".to_string(),
                filter: Some(Filter::Predicate(Predicate::Comparison {
                    column: "Age".to_string(),
                    op: CompareOp::LessThan,
                    value: "18".to_string(),
                })),
            }
        );

        let stmt = Parser::new("update data set Score = -1.5").parse()?;
        assert!(matches!(stmt, Statement::Update { ref value, filter: None, .. } if value == "-1.5"));

        for sql in [
            "UPDATE data Age = '18'",
            "UPDATE data SET Age = '18', Name = 'x'",
            "UPDATE data SET Age =",
            "UPDATE data SET Age = Name",
        ] {
            assert!(
                matches!(
                    Parser::new(sql).parse(),
                    Err(Error::InvalidStatementSyntax { statement: "UPDATE", .. })
                ),
                "{}",
                sql
            );
        }
        Ok(())
    }

    #[test]
    fn test_parser_delete() -> Result<()> {
        let stmt = Parser::new("DELETE FROM data WHERE Age IN ('30', '40')").parse()?;
        assert_eq!(
            stmt,
            Statement::Delete {
                table_ref: "data".to_string(),
                filter: Some(Filter::Predicate(Predicate::In {
                    column: "Age".to_string(),
                    values: vec!["30".to_string(), "40".to_string()],
                })),
            }
        );

        let stmt = Parser::new("delete data").parse()?;
        assert_eq!(
            stmt,
            Statement::Delete { table_ref: "data".to_string(), filter: None }
        );
        Ok(())
    }

    #[test]
    fn test_parser_where_shapes() -> Result<()> {
        let filter = |sql: &str| -> Result<Option<Filter>> {
            Ok(match Parser::new(sql).parse()? {
                Statement::Select { filter, .. } => filter,
                _ => None,
            })
        };

        assert_eq!(
            filter("SELECT * FROM t WHERE Age <> 3")?,
            Some(Filter::Predicate(Predicate::Comparison {
                column: "Age".to_string(),
                op: CompareOp::NotEqual,
                value: "3".to_string(),
            }))
        );
        assert_eq!(
            filter("SELECT * FROM t WHERE Age => '3'")?,
            Some(Filter::Predicate(Predicate::Comparison {
                column: "Age".to_string(),
                op: CompareOp::Unknown("=>".to_string()),
                value: "3".to_string(),
            }))
        );

        for sql in [
            "SELECT * FROM t WHERE",
            "SELECT * FROM t WHERE Name LIKE 5",
            "SELECT * FROM t WHERE Name = 'a' AND Age = '3'",
            "SELECT * FROM t WHERE 'a' = Name",
            "SELECT * FROM t WHERE Name ~ 'a'",
        ] {
            assert!(matches!(filter(sql)?, Some(Filter::Invalid { .. })), "{}", sql);
        }
        Ok(())
    }

    #[test]
    fn test_parser_in_list() -> Result<()> {
        let stmt = Parser::new("SELECT * FROM t WHERE Color IN ('Red','Blue')").parse()?;
        assert!(matches!(
            stmt,
            Statement::Select { filter: Some(Filter::Predicate(Predicate::In { ref values, .. })), .. }
                if values.len() == 2
        ));

        let err = Parser::new("SELECT * FROM t WHERE Color IN (Red)").parse();
        assert!(matches!(err, Err(Error::EmptyInList(_))));
        let err = Parser::new("SELECT * FROM t WHERE Color IN ()").parse();
        assert!(matches!(err, Err(Error::EmptyInList(_))));
        Ok(())
    }

    #[test]
    fn test_parser_invalid_clause_text() -> Result<()> {
        match Parser::new("SELECT * FROM t WHERE Color IN ('Red', 'Blue') OR 1").parse()? {
            Statement::Select { filter: Some(Filter::Invalid { clause, .. }), .. } => {
                assert_eq!(clause, "Color IN ('Red', 'Blue') OR 1");
            }
            stmt => panic!("unexpected statement {:?}", stmt),
        }
        Ok(())
    }

    #[test]
    fn test_parser_unsupported() {
        assert!(matches!(
            Parser::new("INSERT INTO t VALUES (1)").parse(),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(matches!(Parser::new("   ").parse(), Err(Error::EmptyInput(_))));
        assert_eq!(
            Parser::new("~SELECT * FROM t").parse(),
            Err(Error::UnsupportedOperation("~SELECT".to_string()))
        );
    }
}
