pub mod pieces;
pub mod table;
