use crate::types::ScalarOrigin;

/// Language primitives; resolution stops here.
pub const PRIMITIVE_SCALARS: &[&str] = &[
    "String", "bool", "char", "f32", "f64", "i128", "i16", "i32", "i64", "i8", "isize", "str",
    "u128", "u16", "u32", "u64", "u8", "usize",
];

/// External types treated as leaves rather than decomposed.
pub const FOREIGN_SCALARS: &[&str] = &["DateTime", "Decimal", "NaiveDate", "NaiveDateTime", "Uuid"];

/// Origin of a bare (path-free, generic-free) scalar name, if it is one.
#[must_use]
pub fn scalar_origin(name: &str) -> Option<ScalarOrigin> {
    if PRIMITIVE_SCALARS.contains(&name) {
        Some(ScalarOrigin::Primitive)
    } else if FOREIGN_SCALARS.contains(&name) {
        Some(ScalarOrigin::Foreign)
    } else {
        None
    }
}
