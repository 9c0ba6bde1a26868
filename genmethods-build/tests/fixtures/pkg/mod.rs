//! Sample package: two structs plus declarations that must not get a method.
#![allow(dead_code, non_camel_case_types, non_upper_case_globals)]

mod method_gen;

pub struct StructA {
    pub x: i64,
}

pub struct structB {}

// Constant, not a type.
const a: i32 = 100;

// Static, not a type.
static b: i32 = 200;

// Alias of a scalar.
type c = i32;

// Anonymous tuple value, not a named type.
static d: (i32,) = (0,);

/// Calls the generated methods.
pub fn print_types() {
    StructA { x: 0 }.print_type();
    structB {}.print_type();
}
