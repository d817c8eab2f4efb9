pub mod object;
pub mod primitive;
