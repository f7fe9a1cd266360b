pub mod check;
pub mod format;
pub mod instances;
pub mod run;
