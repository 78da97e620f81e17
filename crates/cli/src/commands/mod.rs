pub mod run;
pub mod seed;
