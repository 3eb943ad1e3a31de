pub mod bank;
pub mod candidate;
pub mod process;
pub mod product;
pub mod skill;
