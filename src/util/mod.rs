/*!
Types and routines shared by the parser, the compiler and the runtime.
*/

pub mod anchors;
pub mod culture;

pub(crate) mod escape;
