/*!
Helpers for assembling generated source text.
*/

pub use self::writer::SourceWriter;

mod writer;
