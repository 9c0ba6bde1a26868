use std::fmt::Display;

mod method_gen;
mod units;

pub struct Labeled<T: Display> {
    pub label: T,
}

pub struct Pair<'a, A, B>
where
    A: Clone,
{
    pub left: &'a A,
    pub right: B,
}

pub enum Shape {
    Circle,
}

pub type Meters = units::Length;
