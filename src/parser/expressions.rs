//! Expression grammar
//!
//! Recursive descent over the precedence ladder, low to high: comma,
//! assignment, ternary, the table-driven binary levels, unary, then
//! postfix/primary. Every binary level folds left while the lookahead token
//! belongs to the level's operator set; end of input and closing delimiters
//! stop the fold and are pushed back for the enclosing level.
//!
//! Typecasts are disambiguated heuristically: on `(` at unary level, one
//! more token is peeked, and if it is a known type-name first word the
//! parenthesized text is captured verbatim as the cast's type name. There is
//! no real type system behind this.

use crate::parser::ast::{ExprNode, NodeId, PostfixOp, UnaryOp};
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::parse::{ParseError, Parser};

/// Binary precedence levels, lowest binding first. Ternary sits above the
/// comma/assignment levels, which have their own parse functions.
const BINOP_LEVELS: &[&[TokenKind]] = &[
    &[TokenKind::DoubleBar],
    &[TokenKind::DoubleAmpersand],
    &[TokenKind::Bar],
    &[TokenKind::Caret],
    &[TokenKind::Ampersand],
    &[TokenKind::IsEqual, TokenKind::BangEqual],
    &[TokenKind::Lt, TokenKind::Gt, TokenKind::Lte, TokenKind::Gte],
    &[TokenKind::LeftShift, TokenKind::RightShift],
    &[TokenKind::Plus, TokenKind::Minus],
    &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
];

fn is_assign_op(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Assign
            | TokenKind::PercentEqual
            | TokenKind::CaretEqual
            | TokenKind::AmpersandEqual
            | TokenKind::BarEqual
            | TokenKind::StarEqual
            | TokenKind::MinusEqual
            | TokenKind::PlusEqual
            | TokenKind::SlashEqual
            | TokenKind::LeftShiftEqual
            | TokenKind::RightShiftEqual
    )
}

/// Prefix-operator reading of an otherwise ambiguous token, if it has one.
fn prefix_op(kind: TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Ampersand => Some(UnaryOp::AddressOf),
        TokenKind::Star => Some(UnaryOp::Dereference),
        TokenKind::Minus => Some(UnaryOp::Negate),
        TokenKind::Plus => Some(UnaryOp::Plus),
        TokenKind::Bang => Some(UnaryOp::Not),
        TokenKind::Tilde => Some(UnaryOp::BitNot),
        TokenKind::DoublePlus => Some(UnaryOp::PreIncrement),
        TokenKind::DoubleMinus => Some(UnaryOp::PreDecrement),
        _ => None,
    }
}

impl Parser {
    /// Comma level: `a, b, c` folds left into nested comma nodes.
    pub(crate) fn parse_comma(&mut self) -> Result<NodeId, ParseError> {
        let mut node = self.parse_assignment()?;
        loop {
            let tok = self.next_checked()?;
            match tok.kind {
                TokenKind::EndOfExpression
                | TokenKind::CloseParen
                | TokenKind::CloseBracket => {
                    self.push_back(tok);
                    return Ok(node);
                }
                TokenKind::Comma => {
                    let right = self.parse_assignment()?;
                    node = self.add(ExprNode::Binary {
                        op: TokenKind::Comma,
                        left: node,
                        right,
                    });
                }
                kind => return Err(ParseError::Unexpected(kind.name())),
            }
        }
    }

    /// Assignment level, right-associative; covers `=` and the compound
    /// forms.
    pub(crate) fn parse_assignment(&mut self) -> Result<NodeId, ParseError> {
        let node = self.parse_ternary()?;

        let tok = self.next_checked()?;
        if !is_assign_op(tok.kind) {
            self.push_back(tok);
            return Ok(node);
        }

        let right = self.descend(Self::parse_assignment)?;
        Ok(self.add(ExprNode::Binary {
            op: tok.kind,
            left: node,
            right,
        }))
    }

    /// Ternary `?:`, right-associative. Represented as a `?` node whose
    /// right side is a `:` pair node, so `a?b:c` becomes `(a?(b:c))`.
    fn parse_ternary(&mut self) -> Result<NodeId, ParseError> {
        let condition = self.parse_binary(0)?;

        let tok = self.next_checked()?;
        if tok.kind != TokenKind::Question {
            self.push_back(tok);
            return Ok(condition);
        }

        let mid = self.descend(Self::parse_ternary)?;

        let tok = self.next_checked()?;
        if tok.kind != TokenKind::Colon {
            return Err(ParseError::MissingColon(tok.kind.name()));
        }
        let right = self.descend(Self::parse_ternary)?;

        let pair = self.add(ExprNode::Binary {
            op: TokenKind::Colon,
            left: mid,
            right,
        });
        Ok(self.add(ExprNode::Binary {
            op: TokenKind::Question,
            left: condition,
            right: pair,
        }))
    }

    /// One table-driven binary level; all of them parse the same way and
    /// only the operator set differs.
    fn parse_binary(&mut self, level: usize) -> Result<NodeId, ParseError> {
        if level == BINOP_LEVELS.len() {
            return self.parse_unary();
        }
        let mut node = self.parse_binary(level + 1)?;
        loop {
            let tok = self.next_checked()?;
            if !BINOP_LEVELS[level].contains(&tok.kind) {
                self.push_back(tok);
                return Ok(node);
            }
            let op = tok.kind;
            let right = self.parse_binary(level + 1)?;
            node = self.add(ExprNode::Binary {
                op,
                left: node,
                right,
            });
        }
    }

    /// Unary level: `& * + - ! ~ ++ -- sizeof (typecast)`, right-associative
    /// and recursive.
    fn parse_unary(&mut self) -> Result<NodeId, ParseError> {
        self.descend(Self::parse_unary_inner)
    }

    fn parse_unary_inner(&mut self) -> Result<NodeId, ParseError> {
        let tok = self.next_checked()?;
        match tok.kind {
            TokenKind::Sizeof => {
                let next = self.next_checked()?;
                match next.kind {
                    TokenKind::OpenParen => {
                        let first = self.next_checked()?;
                        let type_name = self
                            .parse_parenthesized_typename(first)?
                            .ok_or(ParseError::MissingSizeofParen)?;
                        Ok(self.add(ExprNode::Sizeof(type_name)))
                    }
                    TokenKind::EndOfExpression => {
                        Err(ParseError::Unexpected(TokenKind::EndOfExpression.name()))
                    }
                    // Without parentheses, sizeof captures only the single
                    // next token's text; it does not parse an expression.
                    _ => {
                        let text = next.text_or_name().to_string();
                        Ok(self.add(ExprNode::Sizeof(text)))
                    }
                }
            }
            TokenKind::OpenParen => {
                let next = self.next_checked()?;
                if self.is_typename_first_word(&next) {
                    let type_name = self
                        .parse_parenthesized_typename(next)?
                        .ok_or(ParseError::MissingCastParen)?;
                    let operand = self.parse_unary()?;
                    Ok(self.add(ExprNode::Cast { type_name, operand }))
                } else {
                    // Not a cast after all: return both peeked tokens and
                    // parse an ordinary parenthesized expression.
                    self.push_back(next);
                    self.push_back(tok);
                    self.parse_primary()
                }
            }
            kind => {
                if let Some(op) = prefix_op(kind) {
                    let operand = self.parse_unary()?;
                    Ok(self.add(ExprNode::Unary { op, operand }))
                } else {
                    self.push_back(tok);
                    self.parse_primary()
                }
            }
        }
    }

    /// Consume tokens up to the matching `)` and join their spellings with
    /// single spaces into a raw type-name string. `None` means the input
    /// ended before the `)`.
    fn parse_parenthesized_typename(
        &mut self,
        first: Token,
    ) -> Result<Option<String>, ParseError> {
        let mut tok = first;
        let mut words: Vec<String> = Vec::new();
        loop {
            match tok.kind {
                TokenKind::CloseParen => return Ok(Some(words.join(" "))),
                TokenKind::EndOfExpression => return Ok(None),
                _ => {
                    words.push(tok.text_or_name().to_string());
                    tok = self.next_checked()?;
                }
            }
        }
    }

    /// Primary expression followed by any chain of postfix forms:
    /// `[expr]`, `(args)`, `.id`, `->id`, `++`, `--`.
    pub(crate) fn parse_primary(&mut self) -> Result<NodeId, ParseError> {
        let tok = self.next_checked()?;
        let mut node = match tok.kind {
            TokenKind::OpenParen => {
                let inner = self.parse_comma()?;
                let close = self.next_checked()?;
                if close.kind != TokenKind::CloseParen {
                    return Err(ParseError::MissingCloseParen);
                }
                inner
            }
            TokenKind::LiteralOrId => {
                let text = tok.text.unwrap_or_default();
                self.add(ExprNode::Leaf(text))
            }
            kind => return Err(ParseError::Unexpected(kind.name())),
        };

        loop {
            let tok = self.next_checked()?;
            match tok.kind {
                TokenKind::OpenBracket => {
                    let peeked = self.next_token();
                    if peeked.kind == TokenKind::EndOfExpression {
                        return Err(ParseError::MissingBracketAtEnd);
                    }
                    self.push_back(peeked);

                    let index = self.parse_comma()?;
                    let close = self.next_checked()?;
                    if close.kind != TokenKind::CloseBracket {
                        return Err(ParseError::MissingBracket);
                    }
                    node = self.add(ExprNode::Subscript { base: node, index });
                }
                TokenKind::OpenParen => {
                    let args = self.parse_call_arguments()?;
                    node = self.add(ExprNode::Call { callee: node, args });
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    let member = self.next_checked()?;
                    if member.kind != TokenKind::LiteralOrId {
                        return Err(ParseError::ExpectedIdentifier(member.kind.name()));
                    }
                    let right = self.add(ExprNode::Leaf(member.text.unwrap_or_default()));
                    node = self.add(ExprNode::Binary {
                        op: tok.kind,
                        left: node,
                        right,
                    });
                }
                TokenKind::DoublePlus => {
                    node = self.add(ExprNode::Postfix {
                        op: PostfixOp::Increment,
                        operand: node,
                    });
                }
                TokenKind::DoubleMinus => {
                    node = self.add(ExprNode::Postfix {
                        op: PostfixOp::Decrement,
                        operand: node,
                    });
                }
                _ => {
                    // Not part of a primary expression.
                    self.push_back(tok);
                    return Ok(node);
                }
            }
        }
    }

    /// Call arguments parse at assignment level, so an unparenthesized comma
    /// separates arguments rather than building a comma node. `f()` is
    /// legal.
    fn parse_call_arguments(&mut self) -> Result<Vec<NodeId>, ParseError> {
        let mut args = Vec::new();
        loop {
            let tok = self.next_checked()?;
            match tok.kind {
                TokenKind::CloseParen => return Ok(args),
                TokenKind::EndOfExpression => return Err(ParseError::MissingCallParen),
                TokenKind::OpenParen => {
                    self.push_back(tok);
                    args.push(self.parse_primary()?);
                }
                _ => {
                    self.push_back(tok);
                    args.push(self.parse_assignment()?);
                }
            }

            let tok = self.next_checked()?;
            match tok.kind {
                TokenKind::Comma => {}
                TokenKind::CloseParen => return Ok(args),
                kind => return Err(ParseError::UnexpectedInCall(kind.name())),
            }
        }
    }
}
