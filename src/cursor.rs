//! Write-back navigation cursors.
//!
//! A [`Cursor`] is a bound accessor: it remembers the container it was
//! navigated out of and the key or index it came from, so assigning through
//! it writes back into that slot. This makes "modify through a reference
//! obtained by navigation" behave like in-place mutation without the caller
//! re-inserting the value.
//!
//! Scope: this is a narrow feature for direct objects. Assignment installs a
//! fresh object into the recorded slot: a deep copy of a direct value, so
//! the caller's object is never aliased into a second container, or the
//! target itself for an indirect value. Handles obtained from the slot
//! *before* the assignment keep the old object; mixing cursor write-back
//! with plain container mutation on the same object is not a supported
//! aliasing pattern.

use crate::error::{Error, Result};
use crate::object::{Object, TypeCode};

/// Navigation handle bound to its parent container.
#[derive(Debug, Clone)]
pub struct Cursor {
    object: Object,
    link: Option<Link>,
}

#[derive(Debug, Clone)]
enum Link {
    Index { parent: Object, index: usize },
    Key { parent: Object, key: String },
}

impl Cursor {
    pub(crate) fn root(object: Object) -> Self {
        Cursor { object, link: None }
    }

    /// The object this cursor currently points at.
    pub fn get(&self) -> Object {
        self.object.clone()
    }

    /// Generalized element count, as [`Object::size`].
    pub fn size(&self) -> usize {
        self.object.size()
    }

    /// Descend to element `index` under the generalized view. On an array
    /// the child records its slot for write-back; on any other kind index 0
    /// is an identity view that keeps this cursor's own slot.
    pub fn at(&self, index: usize) -> Cursor {
        let child = self.object.at(index);
        let link = if self.object.type_code() == TypeCode::Array {
            Some(Link::Index {
                parent: self.object.clone(),
                index,
            })
        } else if index == 0 {
            self.link.clone()
        } else {
            None
        };
        Cursor { object: child, link }
    }

    /// Descend to dictionary key `key`. Fails fast on non-dictionaries. An
    /// absent key yields a null cursor whose assignment inserts the key.
    pub fn at_key(&self, key: &str) -> Result<Cursor> {
        let child = self.object.get_key(key)?;
        Ok(Cursor {
            object: child,
            link: Some(Link::Key {
                parent: self.object.clone(),
                key: key.to_string(),
            }),
        })
    }

    /// Assign `value` through this cursor.
    ///
    /// The written object is the indirect target itself when `value` is
    /// indirect, otherwise a copy of `value` that duplicates its direct
    /// subgraph (indirect edges inside stay shared) so no direct object ends
    /// up reachable from two containers. The copy replaces the recorded
    /// parent slot and the cursor rebinds to it; an unbound root cursor
    /// assigns in place instead.
    pub fn set(&mut self, value: &Object) -> Result<()> {
        let new_obj = if value.is_indirect() {
            value.clone()
        } else {
            value.copy(false)?
        };
        match &self.link {
            None => {
                self.object.assign(&new_obj);
                return Ok(());
            }
            Some(Link::Index { parent, index }) => {
                if !parent.set_item(*index, &new_obj)? {
                    return Err(Error::OutOfBounds {
                        index: *index,
                        len: parent.size(),
                    });
                }
            }
            Some(Link::Key { parent, key }) => {
                parent.replace_key(key, &new_obj)?;
            }
        }
        self.object = new_obj;
        Ok(())
    }

    /// Serialized form of the current object.
    pub fn unparse(&self) -> Result<String> {
        self.object.unparse()
    }

    /// Iterate child cursors under the generalized view.
    pub fn iter(&self) -> impl Iterator<Item = Cursor> + '_ {
        (0..self.size()).map(move |i| self.at(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_assignment_is_in_place() {
        let obj = Object::integer(1);
        let alias = obj.clone();
        let mut cursor = obj.cursor();
        cursor.set(&Object::name("N")).unwrap();
        assert_eq!(alias.as_name(), Some("N".to_string()));
    }

    #[test]
    fn test_array_write_back() {
        let arr = Object::array(vec![Object::integer(1), Object::integer(2)]);
        arr.cursor().at(1).set(&Object::integer(9)).unwrap();
        assert_eq!(arr.unparse().unwrap(), "[ 1 9 ]");
    }

    #[test]
    fn test_array_write_back_out_of_bounds() {
        let arr = Object::array(vec![Object::integer(1)]);
        let err = arr.cursor().at(5).set(&Object::integer(9)).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { index: 5, len: 1 }));
    }

    #[test]
    fn test_absent_key_assignment_inserts() {
        let dict = Object::dictionary(vec![("A", Object::integer(1))]);
        let mut slot = dict.cursor().at_key("B").unwrap();
        assert!(slot.get().is_null());
        slot.set(&Object::integer(2)).unwrap();
        assert_eq!(dict.unparse().unwrap(), "<< /A 1 /B 2 >>");
    }

    #[test]
    fn test_at_key_on_non_dictionary_fails_fast() {
        let arr = Object::array(vec![]);
        assert!(arr.cursor().at_key("A").is_err());
    }

    #[test]
    fn test_assignment_copies_direct_values() {
        let kids = Object::array(vec![
            Object::dictionary(vec![("Media", Object::array(vec![Object::integer(0)]))]),
            Object::integer(1),
        ]);
        let root = kids.cursor();
        let first = root.at(0);
        root.at(1).set(&first.get()).unwrap();
        // mutate the copy; the original stays intact
        root.at(1)
            .at_key("Media")
            .unwrap()
            .at(0)
            .set(&Object::integer(7))
            .unwrap();
        assert_eq!(kids.at(0).unparse().unwrap(), "<< /Media [ 0 ] >>");
        assert_eq!(kids.at(1).unparse().unwrap(), "<< /Media [ 7 ] >>");
    }

    #[test]
    fn test_null_assignment_removes_key() {
        let dict = Object::dictionary(vec![("A", Object::integer(1))]);
        dict.cursor().at_key("A").unwrap().set(&Object::null()).unwrap();
        assert_eq!(dict.unparse().unwrap(), "<< >>");
        assert!(!dict.has_key("A").unwrap());
    }
}
