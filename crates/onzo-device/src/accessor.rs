use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::registers::{Register, RegisterMap};

/// A named accessor bound to one register entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    Get(&'static Register),
    Set(&'static Register),
}

impl Accessor {
    pub fn register(&self) -> &'static Register {
        match self {
            Accessor::Get(register) | Accessor::Set(register) => register,
        }
    }
}

/// `get_<field>` / `set_<field>` lookup, built once per device.
#[derive(Debug, Clone)]
pub struct AccessorTable {
    entries: HashMap<String, Accessor>,
}

impl AccessorTable {
    pub fn build(map: RegisterMap) -> Self {
        let mut entries = HashMap::with_capacity(map.len() * 2);
        for register in map.iter() {
            entries.insert(format!("get_{}", register.name), Accessor::Get(register));
            entries.insert(format!("set_{}", register.name), Accessor::Set(register));
        }
        Self { entries }
    }

    pub fn resolve(&self, name: &str) -> Result<Accessor> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownAccessor {
                accessor: name.to_string(),
            })
    }

    /// Accessor names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{CLAMP, DISPLAY};

    #[test]
    fn every_field_gets_a_getter_and_setter() {
        let table = AccessorTable::build(CLAMP);
        assert_eq!(table.len(), CLAMP.len() * 2);

        let get = table.resolve("get_EAR").unwrap();
        assert_eq!(get, Accessor::Get(CLAMP.lookup("EAR").unwrap()));
        assert_eq!(get.register().addresses, &[16, 17]);
        assert!(matches!(table.resolve("set_power"), Ok(Accessor::Set(r)) if r.name == "power"));
    }

    #[test]
    fn names_with_dashes_resolve() {
        let table = AccessorTable::build(DISPLAY);
        assert!(table.resolve("set_temp-offset").is_ok());
    }

    #[test]
    fn unknown_names_fail() {
        let table = AccessorTable::build(DISPLAY);
        for name in ["get_power", "power", "EAC", "fetch_EAC", "get_"] {
            let err = table.resolve(name).unwrap_err();
            assert!(
                matches!(&err, Error::UnknownAccessor { accessor } if accessor == name),
                "{name}"
            );
        }
    }
}
