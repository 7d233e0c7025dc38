//! Type annotation parsing

use crate::ast::*;
use crate::parser::Parser;
use crate::token::TokenKind;

impl Parser {
    /// Parse a type: unions of intersections of array/primary types
    pub(super) fn parse_type(&mut self) -> Result<TypeRef, ()> {
        // Leading `|` is allowed and dropped
        self.match_token(TokenKind::Pipe);
        let first = self.parse_intersection_type()?;
        if !self.check(TokenKind::Pipe) {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.match_token(TokenKind::Pipe) {
            members.push(self.parse_intersection_type()?);
        }
        Ok(TypeRef::Union(members))
    }

    fn parse_intersection_type(&mut self) -> Result<TypeRef, ()> {
        let first = self.parse_array_type()?;
        if !self.check(TokenKind::Ampersand) {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.match_token(TokenKind::Ampersand) {
            members.push(self.parse_array_type()?);
        }
        Ok(TypeRef::Intersection(members))
    }

    fn parse_array_type(&mut self) -> Result<TypeRef, ()> {
        let mut ty = self.parse_primary_type()?;
        while self.check(TokenKind::LeftBracket)
            && !self.peek().newline_before
            && self.peek_at(1).kind == TokenKind::RightBracket
        {
            self.advance();
            self.advance();
            ty = TypeRef::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> Result<TypeRef, ()> {
        match self.peek().kind {
            TokenKind::LeftParen => {
                let checkpoint = self.checkpoint();
                if let Ok(ty) = self.parse_function_type() {
                    return Ok(ty);
                }
                self.restore(checkpoint);
                self.advance();
                let inner = self.parse_type()?;
                self.consume(TokenKind::RightParen, "Expected ')' after type")?;
                Ok(TypeRef::Paren(Box::new(inner)))
            }
            TokenKind::String | TokenKind::Number => {
                Ok(TypeRef::Literal(self.advance().lexeme.clone()))
            }
            TokenKind::Minus if self.peek_at(1).kind == TokenKind::Number => {
                self.advance();
                let number = self.advance().lexeme.clone();
                Ok(TypeRef::Literal(format!("-{}", number)))
            }
            TokenKind::Identifier
            | TokenKind::Void
            | TokenKind::Null
            | TokenKind::This
            | TokenKind::True
            | TokenKind::False => {
                let mut name = self.advance().lexeme.clone();
                while self.check(TokenKind::Dot) {
                    self.advance();
                    let part = self.consume_identifier("a type name")?;
                    name.push('.');
                    name.push_str(&part.name);
                }
                let args = if self.check(TokenKind::Less) {
                    self.parse_type_args()?
                } else {
                    Vec::new()
                };
                Ok(TypeRef::Named { name, args })
            }
            _ => {
                self.error("Expected a type");
                Err(())
            }
        }
    }

    /// `(a: T, b: U) => R`
    fn parse_function_type(&mut self) -> Result<TypeRef, ()> {
        let params = self.parse_params()?;
        self.consume(TokenKind::FatArrow, "Expected '=>' in function type")?;
        let ret = self.parse_type()?;
        Ok(TypeRef::Function {
            params,
            ret: Box::new(ret),
        })
    }

    /// Parse `<T, U>` type arguments
    pub(super) fn parse_type_args(&mut self) -> Result<Vec<TypeRef>, ()> {
        self.consume(TokenKind::Less, "Expected '<'")?;
        let mut args = Vec::new();
        while !self.check(TokenKind::Greater) {
            args.push(self.parse_type()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::Greater, "Expected '>' to close type arguments")?;
        Ok(args)
    }

    /// Parse optional `<T extends U = V, ...>` type parameters
    pub(super) fn parse_type_params(&mut self) -> Result<Vec<TypeParam>, ()> {
        if !self.match_token(TokenKind::Less) {
            return Ok(Vec::new());
        }
        let mut params = Vec::new();
        while !self.check(TokenKind::Greater) {
            let name = self.consume_identifier("a type parameter name")?;
            let constraint = if self.match_token(TokenKind::Extends) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let default = if self.match_token(TokenKind::Equal) {
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(TypeParam {
                name,
                constraint,
                default,
            });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::Greater, "Expected '>' to close type parameters")?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn parse_type(source: &str) -> TypeRef {
        let (tokens, _) = Lexer::new(source).tokenize();
        let mut parser = Parser::new(tokens, source);
        let ty = parser.parse_type().expect("type should parse");
        assert!(parser.is_at_end(), "trailing input in {}", source);
        ty
    }

    fn named(name: &str, args: Vec<TypeRef>) -> TypeRef {
        TypeRef::Named {
            name: name.to_string(),
            args,
        }
    }

    #[test]
    fn test_nested_generics_close_with_separate_greater_tokens() {
        assert_eq!(
            parse_type("Map<string, Array<i32>>"),
            named(
                "Map",
                vec![named("string", vec![]), named("Array", vec![named("i32", vec![])])]
            )
        );
    }

    #[test]
    fn test_union_of_arrays() {
        assert_eq!(
            parse_type("i32[] | null"),
            TypeRef::Union(vec![
                TypeRef::Array(Box::new(named("i32", vec![]))),
                named("null", vec![]),
            ])
        );
    }

    #[test]
    fn test_function_type_and_parens() {
        assert!(matches!(parse_type("(a: i32) => void"), TypeRef::Function { .. }));
        assert!(matches!(parse_type("(i32 | null)[]"), TypeRef::Array(_)));
    }
}
