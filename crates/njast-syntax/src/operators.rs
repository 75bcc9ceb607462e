//! Operator vocabularies recognised by the tokenizer.

use std::fmt;

use serde::Serialize;

macro_rules! operator_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn from_text(text: &str) -> Option<Self> {
                match text {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

operator_enum!(
    /// Simple and compound assignment operators.
    AssignOp {
        Assign => "=",
        AddAssign => "+=",
        SubAssign => "-=",
        MulAssign => "*=",
        DivAssign => "/=",
        AndAssign => "&=",
        OrAssign => "|=",
        XorAssign => "^=",
        RemAssign => "%=",
        ShlAssign => "<<=",
        ShrAssign => ">>=",
        UShrAssign => ">>>=",
    }
);

operator_enum!(
    /// Binary operators. All share a single precedence level.
    InfixOp {
        OrOr => "||",
        AndAnd => "&&",
        Or => "|",
        Xor => "^",
        And => "&",
        Eq => "==",
        Ne => "!=",
        Lt => "<",
        Gt => ">",
        Le => "<=",
        Ge => ">=",
        Shl => "<<",
        Shr => ">>",
        UShr => ">>>",
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Rem => "%",
    }
);

operator_enum!(
    PrefixOp {
        Increment => "++",
        Decrement => "--",
        Not => "!",
        BitNot => "~",
        Plus => "+",
        Minus => "-",
    }
);

operator_enum!(
    PostfixOp {
        Increment => "++",
        Decrement => "--",
    }
);

impl InfixOp {
    /// Operators whose result is always `boolean`.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            InfixOp::OrOr
                | InfixOp::AndAnd
                | InfixOp::Eq
                | InfixOp::Ne
                | InfixOp::Lt
                | InfixOp::Gt
                | InfixOp::Le
                | InfixOp::Ge
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trips() {
        for op in AssignOp::ALL {
            assert_eq!(AssignOp::from_text(op.as_str()), Some(*op));
        }
        for op in InfixOp::ALL {
            assert_eq!(InfixOp::from_text(op.as_str()), Some(*op));
        }
        assert_eq!(PrefixOp::from_text("+="), None);
    }
}
