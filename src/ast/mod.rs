//! Input vocabulary shared by the filter compilers and the cursor builder.

pub mod filter;
pub mod operators;
pub mod order;
pub mod types;
pub mod values;

pub use filter::*;
pub use operators::*;
pub use order::*;
pub use types::*;
pub use values::*;
