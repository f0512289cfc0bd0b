use std::fmt;

use num_complex::Complex;

use crate::bundle::LoadedArray;
use crate::config::ComplexIntPolicy;
use crate::dimensioned::DimensionedArray;
use crate::error::LoadError;

pub type Complex32 = Complex<f32>;
pub type Complex64 = Complex<f64>;
/// Gaussian integer with 16 bit parts.
pub type Gaussian16 = Complex<i16>;
/// Gaussian integer with 32 bit parts.
pub type Gaussian32 = Complex<i32>;

/// Numeric cell types a source can report for a band or an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
    CInt16,
    CInt32,
    CFloat32,
    CFloat64,
}

impl ScalarKind {
    /// The name GDAL uses for this type (`GDALGetDataTypeName`).
    pub fn gdal_name(&self) -> &'static str {
        match self {
            ScalarKind::UInt8 => "Byte",
            ScalarKind::Int8 => "Int8",
            ScalarKind::UInt16 => "UInt16",
            ScalarKind::Int16 => "Int16",
            ScalarKind::UInt32 => "UInt32",
            ScalarKind::Int32 => "Int32",
            ScalarKind::UInt64 => "UInt64",
            ScalarKind::Int64 => "Int64",
            ScalarKind::Float32 => "Float32",
            ScalarKind::Float64 => "Float64",
            ScalarKind::CInt16 => "CInt16",
            ScalarKind::CInt32 => "CInt32",
            ScalarKind::CFloat32 => "CFloat32",
            ScalarKind::CFloat64 => "CFloat64",
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(
            self,
            ScalarKind::CInt16 | ScalarKind::CInt32 | ScalarKind::CFloat32 | ScalarKind::CFloat64
        )
    }

    /// Host representation for cells of this kind.
    ///
    /// The complex integer kinds have no exact floating counterpart; under
    /// [`ComplexIntPolicy::Widen`] they are widened to the next complex
    /// float type, otherwise they are kept as Gaussian integers.
    pub fn storage(&self, policy: ComplexIntPolicy) -> StorageKind {
        match self {
            ScalarKind::UInt8 => StorageKind::UInt8,
            ScalarKind::Int8 => StorageKind::Int8,
            ScalarKind::UInt16 => StorageKind::UInt16,
            ScalarKind::Int16 => StorageKind::Int16,
            ScalarKind::UInt32 => StorageKind::UInt32,
            ScalarKind::Int32 => StorageKind::Int32,
            ScalarKind::UInt64 => StorageKind::UInt64,
            ScalarKind::Int64 => StorageKind::Int64,
            ScalarKind::Float32 => StorageKind::Float32,
            ScalarKind::Float64 => StorageKind::Float64,
            ScalarKind::CFloat32 => StorageKind::Complex32,
            ScalarKind::CFloat64 => StorageKind::Complex64,
            ScalarKind::CInt16 => match policy {
                ComplexIntPolicy::Widen => StorageKind::Complex32,
                ComplexIntPolicy::Gaussian => StorageKind::Gaussian16,
            },
            ScalarKind::CInt32 => match policy {
                ComplexIntPolicy::Widen => StorageKind::Complex64,
                ComplexIntPolicy::Gaussian => StorageKind::Gaussian32,
            },
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.gdal_name())
    }
}

macro_rules! storage_kinds {
    ($($variant:ident => $ty:ty, $label:literal;)*) => {
        /// Host scalar representations. Each one owns a list in a
        /// [`DataBundle`](crate::bundle::DataBundle).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StorageKind {
            $($variant,)*
        }

        impl StorageKind {
            pub const ALL: &'static [StorageKind] = &[$(StorageKind::$variant,)*];

            pub fn label(&self) -> &'static str {
                match self {
                    $(StorageKind::$variant => $label,)*
                }
            }
        }

        /// A raw cell buffer tagged with its host representation.
        #[derive(Debug, Clone, PartialEq)]
        pub enum SampleBuffer {
            $($variant(Vec<$ty>),)*
        }

        impl SampleBuffer {
            pub fn storage(&self) -> StorageKind {
                match self {
                    $(SampleBuffer::$variant(_) => StorageKind::$variant,)*
                }
            }

            pub fn len(&self) -> usize {
                match self {
                    $(SampleBuffer::$variant(v) => v.len(),)*
                }
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Picks the cells at `indices`, in that order.
            pub fn gather(&self, indices: &[usize]) -> SampleBuffer {
                match self {
                    $(SampleBuffer::$variant(v) => {
                        SampleBuffer::$variant(indices.iter().map(|&i| v[i]).collect())
                    })*
                }
            }
        }

        $(
            impl Element for $ty {
                const STORAGE: StorageKind = StorageKind::$variant;

                fn from_buffer(buffer: SampleBuffer) -> Result<Vec<Self>, LoadError> {
                    match buffer {
                        SampleBuffer::$variant(values) => Ok(values),
                        other => Err(LoadError::BufferMismatch {
                            expected: StorageKind::$variant,
                            found: other.storage(),
                        }),
                    }
                }

                fn into_loaded(array: DimensionedArray<Self>) -> LoadedArray {
                    LoadedArray::$variant(array)
                }
            }
        )*
    };
}

storage_kinds! {
    UInt8 => u8, "ubyte";
    Int8 => i8, "byte";
    UInt16 => u16, "ushort";
    Int16 => i16, "short";
    UInt32 => u32, "uint";
    Int32 => i32, "int";
    UInt64 => u64, "ulong";
    Int64 => i64, "long";
    Float32 => f32, "float";
    Float64 => f64, "double";
    Complex32 => Complex32, "complex float";
    Complex64 => Complex64, "complex double";
    Gaussian16 => Gaussian16, "gaussian int16";
    Gaussian32 => Gaussian32, "gaussian int32";
}

/// Runs `$body` with `$t` bound to the host type of `$storage`.
macro_rules! with_storage {
    ($storage:expr, $t:ident => $body:expr) => {
        match $storage {
            $crate::scalar::StorageKind::UInt8 => {
                type $t = u8;
                $body
            }
            $crate::scalar::StorageKind::Int8 => {
                type $t = i8;
                $body
            }
            $crate::scalar::StorageKind::UInt16 => {
                type $t = u16;
                $body
            }
            $crate::scalar::StorageKind::Int16 => {
                type $t = i16;
                $body
            }
            $crate::scalar::StorageKind::UInt32 => {
                type $t = u32;
                $body
            }
            $crate::scalar::StorageKind::Int32 => {
                type $t = i32;
                $body
            }
            $crate::scalar::StorageKind::UInt64 => {
                type $t = u64;
                $body
            }
            $crate::scalar::StorageKind::Int64 => {
                type $t = i64;
                $body
            }
            $crate::scalar::StorageKind::Float32 => {
                type $t = f32;
                $body
            }
            $crate::scalar::StorageKind::Float64 => {
                type $t = f64;
                $body
            }
            $crate::scalar::StorageKind::Complex32 => {
                type $t = $crate::scalar::Complex32;
                $body
            }
            $crate::scalar::StorageKind::Complex64 => {
                type $t = $crate::scalar::Complex64;
                $body
            }
            $crate::scalar::StorageKind::Gaussian16 => {
                type $t = $crate::scalar::Gaussian16;
                $body
            }
            $crate::scalar::StorageKind::Gaussian32 => {
                type $t = $crate::scalar::Gaussian32;
                $body
            }
        }
    };
}
pub(crate) use with_storage;

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A host scalar type that a loader can fill.
pub trait Element: Copy + Default + fmt::Debug + 'static {
    const STORAGE: StorageKind;

    /// Unwraps a buffer of the matching representation.
    fn from_buffer(buffer: SampleBuffer) -> Result<Vec<Self>, LoadError>;

    fn into_loaded(array: DimensionedArray<Self>) -> LoadedArray;
}

impl SampleBuffer {
    /// Converts to `target`, allowing only the complex integer widenings.
    pub fn convert(self, target: StorageKind) -> Result<SampleBuffer, LoadError> {
        let from = self.storage();
        match (self, target) {
            (buffer, target) if buffer.storage() == target => Ok(buffer),
            (SampleBuffer::Gaussian16(values), StorageKind::Complex32) => Ok(
                SampleBuffer::Complex32(
                    values
                        .into_iter()
                        .map(|v| Complex32::new(v.re as f32, v.im as f32))
                        .collect(),
                ),
            ),
            (SampleBuffer::Gaussian32(values), StorageKind::Complex64) => Ok(
                SampleBuffer::Complex64(
                    values
                        .into_iter()
                        .map(|v| Complex64::new(v.re as f64, v.im as f64))
                        .collect(),
                ),
            ),
            (_, to) => Err(LoadError::UnsupportedConversion { from, to }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complex_integers_widen_by_default() {
        let policy = ComplexIntPolicy::default();
        assert_eq!(ScalarKind::CInt16.storage(policy), StorageKind::Complex32);
        assert_eq!(ScalarKind::CInt32.storage(policy), StorageKind::Complex64);
    }

    #[test]
    fn test_complex_integers_kept_as_gaussian() {
        let policy = ComplexIntPolicy::Gaussian;
        assert_eq!(ScalarKind::CInt16.storage(policy), StorageKind::Gaussian16);
        assert_eq!(ScalarKind::CInt32.storage(policy), StorageKind::Gaussian32);
        // Policy only touches complex integers
        assert_eq!(ScalarKind::CFloat32.storage(policy), StorageKind::Complex32);
        assert_eq!(ScalarKind::UInt8.storage(policy), StorageKind::UInt8);
    }

    #[test]
    fn test_gdal_names() {
        assert_eq!(ScalarKind::UInt8.gdal_name(), "Byte");
        assert_eq!(ScalarKind::CFloat64.to_string(), "CFloat64");
        assert!(ScalarKind::CInt16.is_complex());
        assert!(!ScalarKind::Float64.is_complex());
    }

    #[test]
    fn test_from_buffer_rejects_other_storage() {
        let buffer = SampleBuffer::UInt16(vec![1, 2, 3]);
        let err = u8::from_buffer(buffer).unwrap_err();
        assert!(matches!(
            err,
            LoadError::BufferMismatch {
                expected: StorageKind::UInt8,
                found: StorageKind::UInt16
            }
        ));
    }

    #[test]
    fn test_gather_keeps_order() {
        let buffer = SampleBuffer::Float32(vec![0.5, 1.5, 2.5, 3.5]);
        assert_eq!(
            buffer.gather(&[3, 0, 2]),
            SampleBuffer::Float32(vec![3.5, 0.5, 2.5])
        );
    }

    #[test]
    fn test_convert_widens_gaussian() {
        let buffer = SampleBuffer::Gaussian16(vec![Gaussian16::new(-3, 7)]);
        let widened = buffer.convert(StorageKind::Complex32).unwrap();
        assert_eq!(
            widened,
            SampleBuffer::Complex32(vec![Complex32::new(-3.0, 7.0)])
        );

        let err = SampleBuffer::Float64(vec![1.0])
            .convert(StorageKind::Float32)
            .unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedConversion { .. }));
    }
}
