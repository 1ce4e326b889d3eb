//! Fixed-arity, per-slot type-checked value container.
//!
//! # Invariants
//!
//! - Arity and declared tags never change after construction
//! - Every access is bounds-checked before any type check
//! - A stored value is always assignable to its slot's declared tag
//!
//! Reads are checked against the type the caller asks for, writes against
//! the slot's declared tag. The two failures are reported as different
//! error kinds ([`Error::TypeMismatch`] vs [`Error::ArgumentTypeMismatch`]).
//!
//! # Example
//!
//! ```rust
//! use corelib::{Tuple, TypeTag};
//!
//! let mut tuple = Tuple::new(vec![TypeTag::String, TypeTag::Int32, TypeTag::Bool]);
//! tuple.set(0, "42").unwrap();
//! tuple.set(1, 42i32).unwrap();
//! tuple.set(2, true).unwrap();
//!
//! assert_eq!(tuple.get::<String>(0).unwrap(), "42");
//! assert!(tuple.set(1, 42i64).is_err());
//! ```

use crate::error::{Error, Result};
use crate::tag::TypeTag;
use crate::value::{FromValue, IntoValue, Value};
use std::fmt;

/// Heterogeneous tuple whose slots carry runtime type tags.
///
/// Owns its values and nothing else, so it can be moved freely between
/// threads.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuple {
    tags: Vec<TypeTag>,
    slots: Vec<Option<Value>>,
}

impl Tuple {
    /// Tuple with the given declared tags and every slot unset.
    pub fn new(tags: Vec<TypeTag>) -> Self {
        let slots = vec![None; tags.len()];
        Self { tags, slots }
    }

    /// Tuple with declared tags and initial values.
    ///
    /// Values fill slots from the left; trailing slots without a value stay
    /// unset. Every value is validated before the tuple exists, so a failure
    /// never exposes a partially initialized tuple.
    pub fn new_with_values(tags: Vec<TypeTag>, values: Vec<Value>) -> Result<Self> {
        let arity = tags.len();
        if values.len() > arity {
            return Err(Error::OutOfRange {
                index: arity,
                arity,
            });
        }

        for (index, (declared, value)) in tags.iter().zip(&values).enumerate() {
            let offered = value.tag();
            if !declared.is_assignable_from(&offered) {
                return Err(Error::ArgumentTypeMismatch {
                    index,
                    declared: declared.clone(),
                    offered,
                });
            }
        }

        let mut slots: Vec<Option<Value>> = values.into_iter().map(Some).collect();
        slots.resize(arity, None);
        Ok(Self { tags, slots })
    }

    /// Tuple whose declared tags are the tags of `values`.
    pub fn from_values(values: Vec<Value>) -> Self {
        let tags = values.iter().map(Value::tag).collect();
        let slots = values.into_iter().map(Some).collect();
        Self { tags, slots }
    }

    /// Number of slots.
    #[inline]
    pub fn arity(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Declared tags, one per slot.
    #[inline]
    pub fn tags(&self) -> &[TypeTag] {
        &self.tags
    }

    /// Declared tag of one slot.
    pub fn tag(&self, index: usize) -> Result<&TypeTag> {
        self.check_index(index)?;
        Ok(&self.tags[index])
    }

    pub fn is_set(&self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        Ok(self.slots[index].is_some())
    }

    /// True when every slot holds a value.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Read slot `index` as `T`.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfRange`] if `index >= arity`
    /// - [`Error::NotSet`] if the slot holds no value
    /// - [`Error::TypeMismatch`] if the stored value is not a `T`
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T> {
        let value = self.get_value(index)?;
        T::from_value(value).ok_or_else(|| Error::TypeMismatch {
            index,
            requested: T::type_tag(),
            found: value.tag(),
        })
    }

    /// Borrow the dynamic value in slot `index`.
    pub fn get_value(&self, index: usize) -> Result<&Value> {
        self.check_index(index)?;
        self.slots[index]
            .as_ref()
            .ok_or(Error::NotSet { index })
    }

    /// Store `value` in slot `index`.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfRange`] if `index >= arity`
    /// - [`Error::ArgumentTypeMismatch`] if `T`'s tag is not assignable to
    ///   the slot's declared tag; the slot keeps its previous value
    pub fn set<T: IntoValue>(&mut self, index: usize, value: T) -> Result<()> {
        self.check_index(index)?;
        self.check_assignable(index, T::type_tag())?;
        self.slots[index] = Some(value.into_value());
        Ok(())
    }

    /// Store an already dynamic value in slot `index`.
    pub fn set_value(&mut self, index: usize, value: Value) -> Result<()> {
        self.check_index(index)?;
        self.check_assignable(index, value.tag())?;
        self.slots[index] = Some(value);
        Ok(())
    }

    /// Slot contents in order, `None` for unset slots.
    pub fn values(&self) -> impl Iterator<Item = Option<&Value>> {
        self.slots.iter().map(Option::as_ref)
    }

    pub fn into_values(self) -> Vec<Option<Value>> {
        self.slots
    }

    /// Signature code of the declared tags, e.g. `(sib)`.
    pub fn signature(&self) -> String {
        TypeTag::Tuple(self.tags.clone()).code()
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.tags.len() {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                index,
                arity: self.tags.len(),
            })
        }
    }

    fn check_assignable(&self, index: usize, offered: TypeTag) -> Result<()> {
        let declared = &self.tags[index];
        if declared.is_assignable_from(&offered) {
            Ok(())
        } else {
            Err(Error::ArgumentTypeMismatch {
                index,
                declared: declared.clone(),
                offered,
            })
        }
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match slot {
                Some(value) => write!(f, "{}", value)?,
                None => f.write_str("<unset>")?,
            }
        }
        f.write_str(")")
    }
}

/// Build a [`Tuple`] whose declared tags follow the values' own types.
///
/// ```rust
/// use corelib::{tuple, TypeTag};
///
/// let args = tuple!["42", 42i32, true];
/// assert_eq!(args.tags(), &[TypeTag::String, TypeTag::Int32, TypeTag::Bool]);
/// ```
#[macro_export]
macro_rules! tuple {
    () => {
        $crate::Tuple::new(::std::vec::Vec::new())
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Tuple::from_values(::std::vec![$($crate::IntoValue::into_value($value)),+])
    };
}
