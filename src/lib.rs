pub mod body;
pub mod contact;
pub mod math;
pub mod shape;
pub mod time_accumulator;
pub mod world;
