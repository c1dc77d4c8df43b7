pub mod outcome;
pub mod state;
pub mod turn;

#[cfg(test)]
mod proptests;
