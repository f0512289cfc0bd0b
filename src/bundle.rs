use std::collections::BTreeMap;
use std::fmt;

use crate::dimensioned::DimensionedArray;
use crate::scalar::{Complex32, Complex64, Element, Gaussian16, Gaussian32, StorageKind};

macro_rules! bundle {
    ($($variant:ident => $field:ident: $ty:ty;)*) => {
        /// A loaded array whose scalar type is only known at runtime.
        #[derive(Debug, Clone, PartialEq)]
        pub enum LoadedArray {
            $($variant(DimensionedArray<$ty>),)*
        }

        impl LoadedArray {
            pub fn storage(&self) -> StorageKind {
                match self {
                    $(LoadedArray::$variant(_) => StorageKind::$variant,)*
                }
            }

            pub fn name(&self) -> &str {
                match self {
                    $(LoadedArray::$variant(a) => a.name(),)*
                }
            }

            pub fn dims(&self) -> &[usize] {
                match self {
                    $(LoadedArray::$variant(a) => a.dims(),)*
                }
            }

            pub fn metadata(&self) -> &BTreeMap<String, String> {
                match self {
                    $(LoadedArray::$variant(a) => a.metadata(),)*
                }
            }
        }

        /// Everything loaded from one file, grouped by host scalar type.
        ///
        /// Lists only grow: [`DataBundle::merge`] appends, it never replaces.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct DataBundle {
            /// Dataset level key/value metadata.
            pub chars: BTreeMap<String, String>,
            $(pub $field: Vec<DimensionedArray<$ty>>,)*
        }

        impl DataBundle {
            /// Appends every list of `other` to the matching list of `self`.
            /// Metadata keys present in both take the value from `other`.
            pub fn merge(&mut self, other: DataBundle) {
                let DataBundle { chars, $(mut $field,)* } = other;
                self.chars.extend(chars);
                $(self.$field.append(&mut $field);)*
            }

            pub fn push_loaded(&mut self, array: LoadedArray) {
                match array {
                    $(LoadedArray::$variant(a) => self.$field.push(a),)*
                }
            }

            /// Number of arrays held for `kind`.
            pub fn count(&self, kind: StorageKind) -> usize {
                match kind {
                    $(StorageKind::$variant => self.$field.len(),)*
                }
            }

            /// All arrays, type-erased, in storage kind order.
            pub fn arrays(&self) -> Vec<LoadedArray> {
                let mut out = Vec::with_capacity(self.len());
                $(out.extend(self.$field.iter().cloned().map(LoadedArray::$variant));)*
                out
            }
        }
    };
}

bundle! {
    UInt8 => uint8s: u8;
    Int8 => int8s: i8;
    UInt16 => uint16s: u16;
    Int16 => int16s: i16;
    UInt32 => uint32s: u32;
    Int32 => int32s: i32;
    UInt64 => uint64s: u64;
    Int64 => int64s: i64;
    Float32 => floats: f32;
    Float64 => doubles: f64;
    Complex32 => cfloats: Complex32;
    Complex64 => cdoubles: Complex64;
    Gaussian16 => gints16: Gaussian16;
    Gaussian32 => gints32: Gaussian32;
}

impl DataBundle {
    pub fn push<T: Element>(&mut self, array: DimensionedArray<T>) {
        self.push_loaded(T::into_loaded(array));
    }

    /// Total number of arrays across all scalar types.
    pub fn len(&self) -> usize {
        StorageKind::ALL.iter().map(|&k| self.count(k)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.chars.is_empty()
    }

    /// Storage kinds that hold at least one array.
    pub fn loaded_kinds(&self) -> Vec<StorageKind> {
        StorageKind::ALL
            .iter()
            .copied()
            .filter(|&k| self.count(k) > 0)
            .collect()
    }
}

impl fmt::Display for DataBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds = self.loaded_kinds();
        if kinds.is_empty() {
            write!(f, "no datasets were loaded")?;
        }
        for (i, kind) in kinds.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} {} dataset(s) were loaded", self.count(*kind), kind)?;
        }
        if !self.chars.is_empty() {
            write!(f, "\n{} metadata entries were loaded", self.chars.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array<T: Copy>(name: &str, value: T) -> DimensionedArray<T> {
        DimensionedArray::from_column_major(name, &[2], vec![value, value]).unwrap()
    }

    #[test]
    fn test_new_bundle_is_empty() {
        let bundle = DataBundle::default();
        assert!(bundle.is_empty());
        assert!(bundle.loaded_kinds().is_empty());
        assert_eq!(bundle.to_string(), "no datasets were loaded");
    }

    #[test]
    fn test_push_routes_by_type() {
        let mut bundle = DataBundle::default();
        bundle.push(array("a", 1u8));
        bundle.push(array("b", 2.0f64));
        bundle.push(array("c", Complex32::new(1.0, -1.0)));

        assert_eq!(bundle.uint8s.len(), 1);
        assert_eq!(bundle.doubles.len(), 1);
        assert_eq!(bundle.cfloats.len(), 1);
        assert_eq!(bundle.len(), 3);
        assert_eq!(
            bundle.loaded_kinds(),
            vec![
                StorageKind::UInt8,
                StorageKind::Float64,
                StorageKind::Complex32
            ]
        );
    }

    #[test]
    fn test_merge_concatenates_in_order() {
        let mut results = DataBundle::default();
        results.push(array("first", 1u16));
        results.chars.insert("AREA_OR_POINT".into(), "Area".into());
        results.chars.insert("kept".into(), "yes".into());

        let mut incoming = DataBundle::default();
        incoming.push(array("second", 2u16));
        incoming.push(array("third", 3u16));
        incoming.push(array("gauss", Gaussian32::new(1, 2)));
        incoming.chars.insert("AREA_OR_POINT".into(), "Point".into());

        results.merge(incoming);

        let names: Vec<&str> = results.uint16s.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        assert_eq!(results.gints32.len(), 1);
        assert_eq!(results.chars["AREA_OR_POINT"], "Point");
        assert_eq!(results.chars["kept"], "yes");
    }

    #[test]
    fn test_merge_into_empty_takes_everything() {
        let mut incoming = DataBundle::default();
        incoming.push(array("x", -5i32));

        let mut results = DataBundle::default();
        results.merge(incoming.clone());
        assert_eq!(results, incoming);
    }

    #[test]
    fn test_arrays_are_type_erased() {
        let mut bundle = DataBundle::default();
        bundle.push(array("f", 0.5f32));
        bundle.push(array("i", 7i64));

        let arrays = bundle.arrays();
        assert_eq!(arrays.len(), 2);
        assert_eq!(arrays[0].storage(), StorageKind::Int64);
        assert_eq!(arrays[1].storage(), StorageKind::Float32);
        assert_eq!(arrays[1].name(), "f");
        assert_eq!(arrays[1].dims(), &[2]);
    }

    #[test]
    fn test_display_lists_loaded_kinds() {
        let mut bundle = DataBundle::default();
        bundle.push(array("a", 1u8));
        bundle.push(array("b", 1u8));
        bundle.chars.insert("k".into(), "v".into());

        assert_eq!(
            bundle.to_string(),
            "2 ubyte dataset(s) were loaded\n1 metadata entries were loaded"
        );
    }
}
