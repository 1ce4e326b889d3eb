//! Member signatures.
//!
//! A signature names a member and describes its parameter and return tags.
//! Signatures are parsed from text such as `"info::(sib)(sib)"` and render
//! back to the same canonical text through `Display`.

pub mod cache;
pub mod parser;

pub use cache::SignatureCache;
pub use parser::parse;

use crate::error::Error;
use crate::tag::TypeTag;
use crate::tuple::Tuple;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One parameter: its tag and an optional human-readable name.
///
/// Names are metadata only; they never take part in matching.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    pub name: Option<String>,
    pub tag: TypeTag,
}

impl Param {
    pub fn unnamed(tag: TypeTag) -> Self {
        Self { name: None, tag }
    }

    pub fn named(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: Some(name.into()),
            tag,
        }
    }
}

/// Parsed signature of a method or signal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    name: String,
    params: Vec<Param>,
    returns: Vec<TypeTag>,
}

impl Signature {
    pub fn new(name: impl Into<String>, params: Vec<TypeTag>, returns: Vec<TypeTag>) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().map(Param::unnamed).collect(),
            returns,
        }
    }

    /// Parse signature text. See [`parser`] for the grammar.
    pub fn parse(text: &str) -> crate::Result<Self> {
        parser::parse(text)
    }

    /// Split signature text into its `(return, name, params)` parts without
    /// interpreting the type codes.
    ///
    /// ```rust
    /// use corelib::Signature;
    ///
    /// assert_eq!(Signature::split("add::i(iii)"), Some(("i", "add", "(iii)")));
    /// assert_eq!(Signature::split("fire::(i)"), Some(("", "fire", "(i)")));
    /// ```
    pub fn split(text: &str) -> Option<(&str, &str, &str)> {
        let (name, rest) = text.split_once("::")?;
        let mut depth = 0usize;
        let mut open = None;
        for (i, c) in rest.char_indices().rev() {
            match c {
                ')' => depth += 1,
                '(' => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        open = Some(i);
                        break;
                    }
                }
                _ if depth == 0 => return None,
                _ => {}
            }
        }
        let open = open?;
        Some((&rest[..open], name, &rest[open..]))
    }

    /// Text of the signature a call with `args` would need, e.g. `add::(s)`.
    pub fn for_call(name: &str, args: &Tuple) -> String {
        format!("{}::{}", name, args.signature())
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn param_tags(&self) -> Vec<TypeTag> {
        self.params.iter().map(|p| p.tag.clone()).collect()
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn returns(&self) -> &[TypeTag] {
        &self.returns
    }

    /// Returns folded into one tag: `Void`, the single tag, or a `Tuple`.
    pub fn return_tag(&self) -> TypeTag {
        match self.returns.as_slice() {
            [] => TypeTag::Void,
            [single] => single.clone(),
            many => TypeTag::Tuple(many.to_vec()),
        }
    }

    /// Attach parameter names, in order. Extra names are ignored.
    pub fn with_param_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (param, name) in self.params.iter_mut().zip(names) {
            param.name = Some(name.into());
        }
        self
    }

    /// Same name, parameter tags and return tags; parameter names ignored.
    pub fn same_shape(&self, other: &Signature) -> bool {
        self.same_params(other) && self.returns == other.returns
    }

    /// Same name and parameter tags, whatever the returns.
    pub fn same_params(&self, other: &Signature) -> bool {
        self.name == other.name
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.tag == b.tag)
    }

    /// Whether a tuple can be passed as this signature's arguments: equal
    /// arity, and each parameter assignable from the slot's declared tag.
    pub fn accepts(&self, args: &Tuple) -> bool {
        self.params.len() == args.arity()
            && self
                .params
                .iter()
                .zip(args.tags())
                .all(|(param, tag)| param.tag.is_assignable_from(tag))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(self.name.len() + 8);
        out.push_str(&self.name);
        out.push_str("::");
        match self.returns.as_slice() {
            [] => {}
            [single] if !matches!(single, TypeTag::Tuple(_)) => single.write_code(&mut out),
            many => {
                out.push('(');
                for tag in many {
                    tag.write_code(&mut out);
                }
                out.push(')');
            }
        }
        out.push('(');
        for param in &self.params {
            param.tag.write_code(&mut out);
        }
        out.push(')');
        f.write_str(&out)
    }
}

impl FromStr for Signature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_round_trip() {
        for text in ["info::(sib)(sib)", "add::i(iii)", "answer::s()", "fire::(i)", "pair::((si))([l])"] {
            let sig = Signature::parse(text).unwrap();
            assert_eq!(sig.to_string(), text);
            assert_eq!(Signature::parse(&sig.to_string()).unwrap(), sig);
        }
    }

    #[test]
    fn test_return_tag() {
        assert_eq!(Signature::parse("fire::(i)").unwrap().return_tag(), TypeTag::Void);
        assert_eq!(Signature::parse("add::i(iii)").unwrap().return_tag(), TypeTag::Int32);
        assert_eq!(
            Signature::parse("info::(sib)(sib)").unwrap().return_tag(),
            TypeTag::Tuple(vec![TypeTag::String, TypeTag::Int32, TypeTag::Bool])
        );
    }

    #[test]
    fn test_param_names_ignored_by_shape() {
        let plain = Signature::parse("reply::s(s)").unwrap();
        let named = plain.clone().with_param_names(["message"]);
        assert_ne!(plain, named);
        assert!(plain.same_shape(&named));
        assert_eq!(named.params()[0].name.as_deref(), Some("message"));
    }

    #[test]
    fn test_return_only_difference() {
        let int = Signature::parse("pick::i(s)").unwrap();
        let text = Signature::parse("pick::s(s)").unwrap();
        assert!(int.same_params(&text));
        assert!(!int.same_shape(&text));
        assert!(!int.same_params(&Signature::parse("pick::i(i)").unwrap()));
    }

    #[test]
    fn test_accepts() {
        let sig = Signature::parse("add::i(iii)").unwrap();
        assert!(sig.accepts(&crate::tuple![1i32, 2i32, 3i32]));
        assert!(!sig.accepts(&crate::tuple![1i32, 2i32]));
        assert!(!sig.accepts(&crate::tuple![1i32, 2i32, 3i64]));
        // declared tags decide, not whether slots are filled
        assert!(sig.accepts(&Tuple::new(vec![TypeTag::Int32; 3])));
    }

    #[test]
    fn test_split() {
        assert_eq!(Signature::split("info::(sib)(sib)"), Some(("(sib)", "info", "(sib)")));
        assert_eq!(Signature::split("add::i"), None);
        assert_eq!(Signature::split("add"), None);
    }

    #[test]
    fn test_for_call() {
        assert_eq!(Signature::for_call("add", &crate::tuple!["x"]), "add::(s)");
    }
}
