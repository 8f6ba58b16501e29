mod model;

pub use model::{File, FileMeta, NewFile};
