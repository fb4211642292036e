use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Ordered list of object keys leading to a value, written `expo.version`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldPath(keys.into_iter().map(Into::into).collect())
    }

    pub fn keys(&self) -> &[String] {
        &self.0
    }

    /// Walks the path from `root` and returns the string it ends on.
    ///
    /// `None` when a key is missing, an intermediate value is not an object,
    /// or the final value is not a string.
    pub fn lookup_str<'a>(&self, root: &'a Value) -> Option<&'a str> {
        let mut cur = root;
        for key in &self.0 {
            cur = cur.as_object()?.get(key)?;
        }
        cur.as_str()
    }
}

impl FromStr for FieldPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keys: Vec<String> = s.split('.').map(str::to_string).collect();
        if keys.iter().any(|k| k.is_empty()) {
            return Err(format!("invalid field path '{}'", s));
        }
        Ok(FieldPath(keys))
    }
}

impl TryFrom<String> for FieldPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}
