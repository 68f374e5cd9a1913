use serde::Deserialize;
use serde::Serialize;
use serde::de::Error as DeError;
use serde::ser::Error as SerError;
use std::fmt;

/// The id of a JSON-RPC request.
///
/// Encodes as a JSON integer when numeric, else a JSON string. A third,
/// "unset" form exists only on the Rust side (`RequestId::Unset`) so a
/// session can stamp a fresh id onto a request the caller left unset; it is
/// never observed on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestId {
    Integer(i64),
    String(String),
    Unset,
}

impl RequestId {
    pub fn is_unset(&self) -> bool {
        matches!(self, RequestId::Unset)
    }
}

impl Serialize for RequestId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            RequestId::Integer(i) => serializer.serialize_i64(*i),
            RequestId::String(s) => serializer.serialize_str(s),
            RequestId::Unset => Err(S::Error::custom(
                "RequestId::Unset must be stamped with a fresh id before being sent",
            )),
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Integer(i) => write!(f, "{i}"),
            RequestId::String(s) => write!(f, "{s}"),
            RequestId::Unset => write!(f, "<unset>"),
        }
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(RequestId::Integer)
                .ok_or_else(|| DeError::custom("request id number must be an integer")),
            serde_json::Value::String(s) => Ok(RequestId::String(s)),
            other => Err(DeError::custom(format!(
                "request id must be an integer or string, got {other}"
            ))),
        }
    }
}

impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        RequestId::Integer(value)
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        RequestId::String(value)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        RequestId::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn integer_round_trips() {
        let id = RequestId::Integer(0);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "0");
        assert_eq!(serde_json::from_str::<RequestId>(&json).unwrap(), id);
    }

    #[test]
    fn empty_string_round_trips_and_differs_from_zero() {
        let id = RequestId::String(String::new());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"\"");
        assert_eq!(serde_json::from_str::<RequestId>(&json).unwrap(), id);
        assert_ne!(RequestId::Integer(0), RequestId::String(String::new()));
    }

    #[test]
    fn rejects_other_json_shapes() {
        assert!(serde_json::from_str::<RequestId>("null").is_err());
        assert!(serde_json::from_str::<RequestId>("true").is_err());
        assert!(serde_json::from_str::<RequestId>("1.5").is_err());
    }
}
