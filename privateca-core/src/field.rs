//! Field - Per-field comparison and canonicalization contract
//!
//! Every value that appears in a resource tree implements [`Field`]: scalars
//! through [`impl_field_by_value!`], lists and nested objects through their
//! own implementations.

use std::collections::BTreeMap;
use std::fmt;

use crate::differ::{DiffInfo, Differ, FieldPath};

pub trait Field: Clone + fmt::Debug {
    /// Whether the value is equivalent to "unset" on the wire
    fn is_zero(&self) -> bool;

    /// Human-readable rendering used in field diffs
    fn render(&self) -> String {
        format!("{self:?}")
    }

    /// Compare `self` (desired) against `actual`, recording differences at `path`
    fn compare(&self, actual: &Self, info: DiffInfo, path: &FieldPath, differ: &mut Differ);

    /// Normalize `self` (desired) against the observed value
    fn canonicalize_desired(&self, initial: &Self) -> Self {
        let _ = initial;
        self.clone()
    }

    /// Normalize `self` (freshly read) against the desired value
    fn canonicalize_new(&self, desired: &Self) -> Self {
        if self.is_zero() && desired.is_zero() {
            desired.clone()
        } else {
            self.clone()
        }
    }
}

/// Implement [`Field`] for types compared by plain equality.
///
/// The zero value is the type's `Default`.
#[macro_export]
macro_rules! impl_field_by_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::field::Field for $ty {
                fn is_zero(&self) -> bool {
                    *self == <$ty as ::std::default::Default>::default()
                }

                fn compare(
                    &self,
                    actual: &Self,
                    info: $crate::differ::DiffInfo,
                    path: &$crate::differ::FieldPath,
                    differ: &mut $crate::differ::Differ,
                ) {
                    if self != actual {
                        differ.push(
                            path,
                            Some($crate::field::Field::render(self)),
                            Some($crate::field::Field::render(actual)),
                            info,
                        );
                    }
                }
            }
        )+
    };
}

impl_field_by_value!(String, bool, i32, i64, BTreeMap<String, String>);

impl<T: Field> Field for Vec<T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn compare(&self, actual: &Self, info: DiffInfo, path: &FieldPath, differ: &mut Differ) {
        if self.len() != actual.len() {
            differ.push(path, Some(self.render()), Some(actual.render()), info);
            return;
        }
        for (i, (d, a)) in self.iter().zip(actual).enumerate() {
            d.compare(a, info, &path.index(i), differ);
        }
    }

    fn canonicalize_desired(&self, initial: &Self) -> Self {
        if self.len() != initial.len() {
            return self.clone();
        }
        self.iter()
            .zip(initial)
            .map(|(d, i)| d.canonicalize_desired(i))
            .collect()
    }

    fn canonicalize_new(&self, desired: &Self) -> Self {
        if self.is_empty() && desired.is_empty() {
            return desired.clone();
        }
        if self.len() != desired.len() {
            return self.clone();
        }
        self.iter()
            .zip(desired)
            .map(|(n, d)| n.canonicalize_new(d))
            .collect()
    }
}

/// Canonicalize an optional desired field against the observed one.
///
/// Unset (or empty, when the observed value is empty too) desired fields
/// inherit the observed value.
pub fn canonical_desired<T: Field>(desired: &Option<T>, initial: &Option<T>) -> Option<T> {
    match (desired, initial) {
        (None, _) => initial.clone(),
        (Some(d), i) if d.is_zero() && i.as_ref().is_none_or(|i| i.is_zero()) => i.clone(),
        (Some(d), Some(i)) => Some(d.canonicalize_desired(i)),
        (Some(d), None) => Some(d.clone()),
    }
}

/// Canonicalize an optional freshly read field against the desired one.
///
/// When both sides are empty the desired representation is kept.
pub fn canonical_new<T: Field>(new: &Option<T>, desired: &Option<T>) -> Option<T> {
    match (new, desired) {
        (Some(n), Some(d)) => Some(n.canonicalize_new(d)),
        (None, Some(d)) if d.is_zero() => desired.clone(),
        _ => new.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_zero_values() {
        assert!(String::new().is_zero());
        assert!(false.is_zero());
        assert!(0i32.is_zero());
        assert!(!"x".to_string().is_zero());
        assert!(Vec::<String>::new().is_zero());
    }

    #[test]
    fn unset_desired_inherits_initial() {
        let initial = Some("observed".to_string());
        assert_eq!(canonical_desired(&None, &initial), initial);
    }

    #[test]
    fn empty_desired_inherits_empty_initial() {
        assert_eq!(canonical_desired(&Some(String::new()), &None), None);
        assert_eq!(
            canonical_desired(&Some(String::new()), &Some("x".to_string())),
            Some(String::new())
        );
    }

    #[test]
    fn set_desired_is_kept() {
        assert_eq!(
            canonical_desired(&Some("mine".to_string()), &Some("theirs".to_string())),
            Some("mine".to_string())
        );
    }

    #[test]
    fn new_keeps_desired_representation_when_both_empty() {
        assert_eq!(
            canonical_new::<Vec<String>>(&None, &Some(vec![])),
            Some(vec![])
        );
        assert_eq!(canonical_new(&None, &Some("x".to_string())), None);
        assert_eq!(
            canonical_new(&Some("server".to_string()), &None),
            Some("server".to_string())
        );
    }
}
