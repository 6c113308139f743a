//! Token and node type identifiers for Lua 5.2
//!
//! Every token the lexer produces and every structural node the parser
//! builds carries a [`TypeId`]. The printer turns identifiers back into
//! display names through the [`TypeNames`] trait, so it can be driven by
//! the Lua table below or by any synthetic table in tests.

use std::collections::HashMap;
use std::fmt;

/// Numeric type identifier of a token or AST node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u16);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lookup from type identifier to display name
pub trait TypeNames {
    fn name_of(&self, id: TypeId) -> Option<&str>;
}

impl<'a> TypeNames for [&'a str] {
    fn name_of(&self, id: TypeId) -> Option<&str> {
        self.get(usize::from(id.0)).copied()
    }
}

impl<S: AsRef<str>> TypeNames for HashMap<TypeId, S> {
    fn name_of(&self, id: TypeId) -> Option<&str> {
        self.get(&id).map(AsRef::as_ref)
    }
}

impl<T: TypeNames + ?Sized> TypeNames for &T {
    fn name_of(&self, id: TypeId) -> Option<&str> {
        (**self).name_of(id)
    }
}

/// Defines the identifier constants and the name table in one place so
/// the two cannot drift apart.
macro_rules! type_ids {
    ($($id:ident = $num:literal => $name:literal,)*) => {
        $(pub const $id: TypeId = TypeId($num);)*

        /// Display names, indexed by `TypeId`
        pub static TYPE_NAMES: &[&str] = &[$($name),*];

        #[cfg(test)]
        static DECLARED: &[(TypeId, &str)] = &[$(($id, $name)),*];
    };
}

type_ids! {
    EOF = 0 => "EOF",

    // ============ Structural nodes ============
    CHUNK = 1 => "CHUNK",
    BLOCK = 2 => "BLOCK",
    ASSIGNMENT = 3 => "ASSIGNMENT",
    LOCAL_ASSIGNMENT = 4 => "LOCAL_ASSIGNMENT",
    VAR_LIST = 5 => "VAR_LIST",
    EXPR_LIST = 6 => "EXPR_LIST",
    NAME_LIST = 7 => "NAME_LIST",
    PARAM_LIST = 8 => "PARAM_LIST",
    FUNCTION = 9 => "FUNCTION",
    FUNCTION_DECL = 10 => "FUNCTION_DECL",
    LOCAL_FUNCTION = 11 => "LOCAL_FUNCTION",
    FUNC_NAME = 12 => "FUNC_NAME",
    CALL = 13 => "CALL",
    METHOD_CALL = 14 => "METHOD_CALL",
    ARGS = 15 => "ARGS",
    INDEX = 16 => "INDEX",
    TABLE = 17 => "TABLE",
    FIELD = 18 => "FIELD",
    CONDITION = 19 => "CONDITION",
    LABEL = 20 => "LABEL",
    UNARY_MINUS = 21 => "UNARY_MINUS",
    PAREN_EXPR = 22 => "PAREN_EXPR",
    FOR_NUM = 23 => "FOR_NUM",
    FOR_IN = 24 => "FOR_IN",
    DO_BLOCK = 25 => "DO_BLOCK",

    // ============ Keywords ============
    AND = 26 => "And",
    BREAK = 27 => "Break",
    DO = 28 => "Do",
    ELSE = 29 => "Else",
    ELSEIF = 30 => "Elseif",
    END = 31 => "End",
    FALSE = 32 => "False",
    FOR = 33 => "For",
    FUNCTION_KW = 34 => "Function",
    GOTO = 35 => "Goto",
    IF = 36 => "If",
    IN = 37 => "In",
    LOCAL = 38 => "Local",
    NIL = 39 => "Nil",
    NOT = 40 => "Not",
    OR = 41 => "Or",
    REPEAT = 42 => "Repeat",
    RETURN = 43 => "Return",
    THEN = 44 => "Then",
    TRUE = 45 => "True",
    UNTIL = 46 => "Until",
    WHILE = 47 => "While",

    // ============ Literals ============
    NAME = 48 => "Name",
    NUMBER = 49 => "Number",
    STRING = 50 => "String",

    // ============ Operators ============
    ADD = 51 => "Add",
    SUB = 52 => "Sub",
    MUL = 53 => "Mul",
    DIV = 54 => "Div",
    MOD = 55 => "Mod",
    POW = 56 => "Pow",
    LENGTH = 57 => "Length",
    EQ = 58 => "Eq",
    NOT_EQ = 59 => "NotEq",
    LT_EQ = 60 => "LtEq",
    GT_EQ = 61 => "GtEq",
    LT = 62 => "Lt",
    GT = 63 => "Gt",
    ASSIGN = 64 => "Assign",
    CONCAT = 65 => "DotDot",
    ELLIPSIS = 66 => "Ellipsis",

    // ============ Delimiters ============
    OPAREN = 67 => "OParen",
    CPAREN = 68 => "CParen",
    OBRACE = 69 => "OBrace",
    CBRACE = 70 => "CBrace",
    OBRACK = 71 => "OBrack",
    CBRACK = 72 => "CBrack",
    DOUBLE_COLON = 73 => "DoubleColon",
    SEMI_COL = 74 => "SemiCol",
    COL = 75 => "Col",
    COMMA = 76 => "Comma",
    DOT = 77 => "Dot",
}

/// The process-wide Lua 5.2 name table
#[derive(Debug, Clone, Copy, Default)]
pub struct LuaTypeNames;

impl TypeNames for LuaTypeNames {
    fn name_of(&self, id: TypeId) -> Option<&str> {
        display_name(id)
    }
}

/// Display name of a Lua type identifier
pub fn display_name(id: TypeId) -> Option<&'static str> {
    TYPE_NAMES.get(usize::from(id.0)).copied()
}

/// Try to convert a name to a reserved word
pub fn keyword_from_str(s: &str) -> Option<TypeId> {
    let id = match s {
        "and" => AND,
        "break" => BREAK,
        "do" => DO,
        "else" => ELSE,
        "elseif" => ELSEIF,
        "end" => END,
        "false" => FALSE,
        "for" => FOR,
        "function" => FUNCTION_KW,
        "goto" => GOTO,
        "if" => IF,
        "in" => IN,
        "local" => LOCAL,
        "nil" => NIL,
        "not" => NOT,
        "or" => OR,
        "repeat" => REPEAT,
        "return" => RETURN,
        "then" => THEN,
        "true" => TRUE,
        "until" => UNTIL,
        "while" => WHILE,
        _ => return None,
    };
    Some(id)
}

/// Left and right priority of a binary operator.
/// Returns None if not a binary operator
pub fn binary_priority(id: TypeId) -> Option<(u8, u8)> {
    let priority = match id {
        OR => (1, 1),
        AND => (2, 2),
        LT | GT | LT_EQ | GT_EQ | NOT_EQ | EQ => (3, 3),
        // right associative
        CONCAT => (5, 4),
        ADD | SUB => (6, 6),
        MUL | DIV | MOD => (7, 7),
        // right associative, binds tighter than unary operators
        POW => (10, 9),
        _ => return None,
    };
    Some(priority)
}

/// Priority of the operand of a unary operator
pub const UNARY_PRIORITY: u8 = 8;

/// Check if a token can start a unary expression
pub fn is_unary_operator(id: TypeId) -> bool {
    matches!(id, NOT | SUB | LENGTH)
}

/// Tokens that close a block
pub fn is_block_follow(id: TypeId) -> bool {
    matches!(id, ELSE | ELSEIF | END | UNTIL | EOF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_aligned_with_constants() {
        assert_eq!(DECLARED.len(), TYPE_NAMES.len());
        for (index, (id, name)) in DECLARED.iter().enumerate() {
            assert_eq!(usize::from(id.0), index, "{name} is out of order");
            assert_eq!(LuaTypeNames.name_of(*id), Some(*name));
        }
    }

    #[test]
    fn test_unknown_id_has_no_name() {
        let unknown = TypeId(TYPE_NAMES.len() as u16);
        assert_eq!(LuaTypeNames.name_of(unknown), None);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(keyword_from_str("while"), Some(WHILE));
        assert_eq!(keyword_from_str("function"), Some(FUNCTION_KW));
        assert_eq!(keyword_from_str("While"), None);
        assert_eq!(keyword_from_str("continue"), None);
    }

    #[test]
    fn test_priorities() {
        let (pow_left, pow_right) = binary_priority(POW).unwrap();
        assert!(pow_left > pow_right);
        assert!(pow_right > UNARY_PRIORITY);
        let (mul, _) = binary_priority(MUL).unwrap();
        let (add, _) = binary_priority(ADD).unwrap();
        assert!(mul > add);
        assert_eq!(binary_priority(ASSIGN), None);
    }

    #[test]
    fn test_synthetic_tables() {
        let slice: &[&str] = &["Chunk", "A"];
        assert_eq!(slice.name_of(TypeId(1)), Some("A"));
        assert_eq!(slice.name_of(TypeId(2)), None);

        let mut map = HashMap::new();
        map.insert(TypeId(7), String::from("Seven"));
        assert_eq!(map.name_of(TypeId(7)), Some("Seven"));
        assert_eq!((&map).name_of(TypeId(8)), None);
    }
}
