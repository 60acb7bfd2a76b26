mod collocations;
mod extract;
mod stem;
mod tag;
mod util;

pub use collocations::Collocations;
pub use extract::Extract;
pub use stem::Stem;
pub use tag::Tag;
