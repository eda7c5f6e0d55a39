use std::fmt;

// Actorの引数の値
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Int(i64),
    Bool(bool),
}

impl Variant {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    // 自身と同じ型として文字列を解析
    pub fn parse_as(&self, value: &str) -> Result<Variant, String> {
        Ok(match self {
            Self::Int(_) => Self::Int(value.parse::<i64>().map_err(|e| e.to_string())?),
            Self::Bool(_) => Self::Bool(value.parse::<bool>().map_err(|e| e.to_string())?),
        })
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: String,
    pub value: Variant,
}

impl Arg {
    pub fn int(name: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            value: Variant::Int(value),
        }
    }

    pub fn bool(name: &str, value: bool) -> Self {
        Self {
            name: name.to_string(),
            value: Variant::Bool(value),
        }
    }
}

#[test]
fn test_variant_parse() {
    assert_eq!(Variant::Int(0).parse_as("42"), Ok(Variant::Int(42)));
    assert!(Variant::Int(0).parse_as("x").is_err());
    assert_eq!(Variant::Bool(false).parse_as("true"), Ok(Variant::Bool(true)));
    assert_eq!(Arg::bool("win", true).value.as_bool(), Some(true));
    assert_eq!(Arg::int("seed", 3).value.as_bool(), None);
}
