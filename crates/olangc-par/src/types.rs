//! Type representation and type syntax.
//!
//! The parser only ever produces [`Type::Unknown`] (possibly wrapped in
//! pointers): it has nothing but a name. The resolver rewrites those
//! nodes in place into [`Type::Primitive`]; after resolution no Unknown
//! remains anywhere codegen looks.

use olangc_util::Symbol;

use crate::parser::{Parser, SyntaxError};
use olangc_lex::TokenKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    /// A named type the parser could not interpret yet.
    Unknown { name: Symbol },
    Primitive { kind: PrimKind },
    /// A pointer; always 8 bytes.
    Ptr { pointee: Box<Type> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimKind {
    U8,
    U16,
    U32,
    U64,
}

impl PrimKind {
    pub fn size_in_bytes(self) -> usize {
        match self {
            PrimKind::U8 => 1,
            PrimKind::U16 => 2,
            PrimKind::U32 => 4,
            PrimKind::U64 => 8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrimKind::U8 => "u8",
            PrimKind::U16 => "u16",
            PrimKind::U32 => "u32",
            PrimKind::U64 => "u64",
        }
    }

    /// Primitive lookup by type name.
    pub fn from_name(name: &str) -> Option<PrimKind> {
        match name {
            "u8" => Some(PrimKind::U8),
            "u16" => Some(PrimKind::U16),
            "u32" => Some(PrimKind::U32),
            "u64" => Some(PrimKind::U64),
            _ => None,
        }
    }
}

impl Type {
    /// Size of a value of this type. Only meaningful after resolution.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            Type::Unknown { name } => {
                unreachable!("unresolved type '{name}' reached size computation")
            }
            Type::Primitive { kind } => kind.size_in_bytes(),
            Type::Ptr { .. } => 8,
        }
    }

    pub fn is_resolved(&self) -> bool {
        match self {
            Type::Unknown { .. } => false,
            Type::Primitive { .. } => true,
            Type::Ptr { pointee } => pointee.is_resolved(),
        }
    }
}

/// Source-syntax rendering (`u32`, `u8*`, ...).
impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Unknown { name } => f.write_str(name.as_str()),
            Type::Primitive { kind } => f.write_str(kind.as_str()),
            Type::Ptr { pointee } => write!(f, "{pointee}*"),
        }
    }
}

impl<'src> Parser<'src> {
    /// type := ID { '*' }
    pub(crate) fn parse_type(&mut self) -> Result<Type, SyntaxError> {
        let token = self.expect(TokenKind::Identifier)?;
        let mut ty = Type::Unknown {
            name: Symbol::intern(token.text),
        };
        while self.lexer.peek().kind == TokenKind::Star {
            self.lexer.next_token();
            ty = Type::Ptr {
                pointee: Box::new(ty),
            };
        }
        Ok(ty)
    }
}
