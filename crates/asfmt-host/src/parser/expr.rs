//! Expression parsing (precedence climbing)

use crate::ast::*;
use crate::parser::Parser;
use crate::token::TokenKind;

impl Parser {
    /// Parse an expression
    pub(super) fn parse_expression(&mut self) -> Result<Expr, ()> {
        self.parse_assignment()
    }

    /// Parse an assignment, arrow function or conditional expression
    pub(super) fn parse_assignment(&mut self) -> Result<Expr, ()> {
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }

        let target = self.parse_conditional()?;

        if let Some((op, width)) = self.peek_assign_op() {
            for _ in 0..width {
                self.advance();
            }
            let value = self.parse_assignment()?;
            return Ok(Expr::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            });
        }

        Ok(target)
    }

    fn parse_conditional(&mut self) -> Result<Expr, ()> {
        let cond = self.parse_binary(0)?;
        if !self.match_token(TokenKind::Question) {
            return Ok(cond);
        }
        let then_expr = self.parse_assignment()?;
        self.consume(TokenKind::Colon, "Expected ':' in conditional expression")?;
        let else_expr = self.parse_assignment()?;
        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    /// Parse binary operators binding tighter than `min_precedence`
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ()> {
        let mut left = self.parse_unary()?;

        loop {
            // `x as T` binds like a relational operator
            if self.check_word("as") && !self.peek().newline_before && min_precedence < 8 {
                self.advance();
                let ty = self.parse_type()?;
                left = Expr::As {
                    expr: Box::new(left),
                    ty,
                };
                continue;
            }

            let Some((op, width)) = self.peek_binary_op() else {
                break;
            };
            let precedence = op.precedence();
            if precedence <= min_precedence {
                break;
            }
            for _ in 0..width {
                self.advance();
            }
            // `**` is right-associative
            let next_min = if op == BinaryOp::Pow {
                precedence - 1
            } else {
                precedence
            };
            let right = self.parse_binary(next_min)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Binary operator at the current token and how many tokens it spans
    fn peek_binary_op(&self) -> Option<(BinaryOp, usize)> {
        let op = match self.peek().kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::StarStar => BinaryOp::Pow,
            TokenKind::EqualEqual => BinaryOp::Eq,
            TokenKind::BangEqual => BinaryOp::Ne,
            TokenKind::EqualEqualEqual => BinaryOp::StrictEq,
            TokenKind::BangEqualEqual => BinaryOp::StrictNe,
            TokenKind::Less => BinaryOp::Lt,
            TokenKind::LessEqual => BinaryOp::Le,
            TokenKind::LessLess => BinaryOp::Shl,
            TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::PipePipe => BinaryOp::Or,
            TokenKind::QuestionQuestion => BinaryOp::Nullish,
            TokenKind::Ampersand => BinaryOp::BitAnd,
            TokenKind::Pipe => BinaryOp::BitOr,
            TokenKind::Caret => BinaryOp::BitXor,
            TokenKind::Instanceof => BinaryOp::Instanceof,
            TokenKind::Greater => {
                return match self.greater_run() {
                    (1, false) => Some((BinaryOp::Gt, 1)),
                    (1, true) => Some((BinaryOp::Ge, 2)),
                    (2, false) => Some((BinaryOp::Shr, 2)),
                    (3, false) => Some((BinaryOp::UShr, 3)),
                    _ => None,
                };
            }
            _ => return None,
        };
        Some((op, 1))
    }

    /// Assignment operator at the current token and how many tokens it spans
    fn peek_assign_op(&self) -> Option<(AssignOp, usize)> {
        let op = match self.peek().kind {
            TokenKind::Equal => AssignOp::Assign,
            TokenKind::PlusEqual => AssignOp::Add,
            TokenKind::MinusEqual => AssignOp::Sub,
            TokenKind::StarEqual => AssignOp::Mul,
            TokenKind::SlashEqual => AssignOp::Div,
            TokenKind::PercentEqual => AssignOp::Mod,
            TokenKind::StarStarEqual => AssignOp::Pow,
            TokenKind::AmpersandEqual => AssignOp::BitAnd,
            TokenKind::PipeEqual => AssignOp::BitOr,
            TokenKind::CaretEqual => AssignOp::BitXor,
            TokenKind::LessLessEqual => AssignOp::Shl,
            TokenKind::Greater => {
                return match self.greater_run() {
                    (2, true) => Some((AssignOp::Shr, 3)),
                    (3, true) => Some((AssignOp::UShr, 4)),
                    _ => None,
                };
            }
            _ => return None,
        };
        Some((op, 1))
    }

    /// Count adjacent `>` tokens and whether an adjacent `=` follows them
    fn greater_run(&self) -> (usize, bool) {
        let mut count = 1;
        while count < 3
            && self.peek_at(count).kind == TokenKind::Greater
            && self.next_is_adjacent(count)
        {
            count += 1;
        }
        let eq = self.peek_at(count).kind == TokenKind::Equal && self.next_is_adjacent(count);
        (count, eq)
    }

    fn parse_unary(&mut self) -> Result<Expr, ()> {
        let op = match self.peek().kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::PlusPlus => Some(UnaryOp::PreIncrement),
            TokenKind::MinusMinus => Some(UnaryOp::PreDecrement),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        // Prefix type assertion: `<T>expr`
        if self.check(TokenKind::Less) {
            self.advance();
            let ty = self.parse_type()?;
            self.consume(TokenKind::Greater, "Expected '>' after type assertion")?;
            let expr = self.parse_unary()?;
            return Ok(Expr::TypeAssertion {
                ty,
                expr: Box::new(expr),
            });
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ()> {
        let mut expr = self.parse_call_member()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::PlusPlus if !self.peek().newline_before => PostfixOp::Increment,
                TokenKind::MinusMinus if !self.peek().newline_before => PostfixOp::Decrement,
                _ => break,
            };
            self.advance();
            expr = Expr::Postfix {
                op,
                operand: Box::new(expr),
            };
        }
        Ok(expr)
    }

    /// Primary expression followed by calls, member access, indexing and `!`
    fn parse_call_member(&mut self) -> Result<Expr, ()> {
        let mut expr = if self.check(TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };

        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.consume_property_name("a property name")?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                    };
                }
                TokenKind::LeftBracket if !self.peek().newline_before => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.consume(TokenKind::RightBracket, "Expected ']' after index")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                TokenKind::LeftParen if !self.peek().newline_before => {
                    let args = self.parse_args()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        type_args: Vec::new(),
                        args,
                    };
                }
                TokenKind::Bang if !self.peek().newline_before => {
                    self.advance();
                    expr = Expr::NonNull(Box::new(expr));
                }
                TokenKind::Less => match self.try_parse_call_type_args() {
                    Some(type_args) => {
                        let args = self.parse_args()?;
                        expr = Expr::Call {
                            callee: Box::new(expr),
                            type_args,
                            args,
                        };
                    }
                    None => break,
                },
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Speculatively read `<T, ...>` directly followed by `(`
    fn try_parse_call_type_args(&mut self) -> Option<Vec<TypeRef>> {
        let checkpoint = self.checkpoint();
        match self.parse_type_args() {
            Ok(args) if self.check(TokenKind::LeftParen) => Some(args),
            _ => {
                self.restore(checkpoint);
                None
            }
        }
    }

    /// `new Callee<T>(args)`; the argument list is optional
    fn parse_new(&mut self) -> Result<Expr, ()> {
        self.consume(TokenKind::New, "Expected 'new'")?;
        let mut callee = self.parse_primary()?;
        while self.match_token(TokenKind::Dot) {
            let property = self.consume_property_name("a property name")?;
            callee = Expr::Member {
                object: Box::new(callee),
                property,
            };
        }
        let type_args = if self.check(TokenKind::Less) {
            self.parse_type_args()?
        } else {
            Vec::new()
        };
        let args = if self.check(TokenKind::LeftParen) {
            Some(self.parse_args()?)
        } else {
            None
        };
        Ok(Expr::New {
            callee: Box::new(callee),
            type_args,
            args,
        })
    }

    /// Parse `(a, ...b)` call arguments
    fn parse_args(&mut self) -> Result<Vec<Expr>, ()> {
        self.consume(TokenKind::LeftParen, "Expected '('")?;
        let mut args = Vec::new();
        while !self.check(TokenKind::RightParen) {
            args.push(self.parse_element()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightParen, "Expected ')' after arguments")?;
        Ok(args)
    }

    /// Argument or array element, possibly spread
    fn parse_element(&mut self) -> Result<Expr, ()> {
        if self.match_token(TokenKind::Ellipsis) {
            return Ok(Expr::Spread(Box::new(self.parse_assignment()?)));
        }
        self.parse_assignment()
    }

    fn parse_primary(&mut self) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::Number => Ok(Expr::Literal(Literal::Number(self.advance().lexeme.clone()))),
            TokenKind::String => Ok(Expr::Literal(Literal::String(self.advance().lexeme.clone()))),
            TokenKind::Template => Ok(Expr::Literal(Literal::Template(
                self.advance().lexeme.clone(),
            ))),
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(false)))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }
            TokenKind::This => {
                self.advance();
                Ok(Expr::This)
            }
            TokenKind::Super => {
                self.advance();
                Ok(Expr::Super)
            }
            TokenKind::Identifier => Ok(Expr::Identifier(self.consume_identifier("an identifier")?)),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.consume(TokenKind::RightParen, "Expected ')' after expression")?;
                Ok(Expr::Group(Box::new(inner)))
            }
            TokenKind::LeftBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(TokenKind::RightBracket) {
                    elements.push(self.parse_element()?);
                    if !self.match_token(TokenKind::Comma) {
                        break;
                    }
                }
                self.consume(TokenKind::RightBracket, "Expected ']' after array elements")?;
                Ok(Expr::Array(elements))
            }
            TokenKind::LeftBrace => self.parse_object(),
            _ => {
                self.error("Expected expression");
                Err(())
            }
        }
    }

    fn parse_object(&mut self) -> Result<Expr, ()> {
        self.consume(TokenKind::LeftBrace, "Expected '{'")?;
        let mut properties = Vec::new();

        while !self.check(TokenKind::RightBrace) {
            if self.match_token(TokenKind::Ellipsis) {
                properties.push(Property::Spread(self.parse_assignment()?));
            } else {
                let token = self.peek();
                let is_key = matches!(
                    token.kind,
                    TokenKind::Identifier | TokenKind::String | TokenKind::Number
                ) || token.kind.is_keyword();
                if !is_key {
                    self.error("Expected a property name");
                    return Err(());
                }
                let key_kind = token.kind;
                let key = self.advance().lexeme.clone();
                let value = if self.match_token(TokenKind::Colon) {
                    Some(self.parse_assignment()?)
                } else if key_kind == TokenKind::Identifier {
                    None
                } else {
                    self.error("Expected ':' after property name");
                    return Err(());
                };
                properties.push(Property::KeyValue { key, value });
            }
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        self.consume(TokenKind::RightBrace, "Expected '}' after object literal")?;
        Ok(Expr::Object(properties))
    }

    /// Parse an arrow function if one starts here
    fn try_parse_arrow(&mut self) -> Result<Option<Expr>, ()> {
        // `x => ...`
        if self.check(TokenKind::Identifier)
            && self.peek_at(1).kind == TokenKind::FatArrow
            && !self.peek_at(1).newline_before
        {
            let name = self.consume_identifier("a parameter name")?;
            self.advance(); // =>
            let body = self.parse_arrow_body()?;
            return Ok(Some(Expr::Arrow(Box::new(ArrowFunction {
                params: vec![Param {
                    modifiers: Vec::new(),
                    rest: false,
                    name,
                    optional: false,
                    type_ann: None,
                    default: None,
                }],
                bare_param: true,
                return_type: None,
                body,
            }))));
        }

        if !self.check(TokenKind::LeftParen) {
            return Ok(None);
        }

        // `(params): T => ...`, decided by backtracking
        let checkpoint = self.checkpoint();
        let head = self.parse_params().and_then(|params| {
            let return_type = if self.match_token(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            if self.check(TokenKind::FatArrow) && !self.peek().newline_before {
                Ok((params, return_type))
            } else {
                Err(())
            }
        });

        let Ok((params, return_type)) = head else {
            self.restore(checkpoint);
            return Ok(None);
        };

        self.advance(); // =>
        let body = self.parse_arrow_body()?;
        Ok(Some(Expr::Arrow(Box::new(ArrowFunction {
            params,
            bare_param: false,
            return_type,
            body,
        }))))
    }

    fn parse_arrow_body(&mut self) -> Result<ArrowBody, ()> {
        if self.check(TokenKind::LeftBrace) {
            Ok(ArrowBody::Block(self.parse_block()?))
        } else {
            Ok(ArrowBody::Expr(self.parse_assignment()?))
        }
    }
}
