//! Extensions shipped with the engine. None are installed automatically;
//! hosts register what they want.

pub mod class;
