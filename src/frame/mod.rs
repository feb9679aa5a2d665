// Tabular interchange types
pub mod dataframe;
pub mod value;

pub use dataframe::DataFrame;
pub use value::Value;
