//! Thin CLI wrappers over `cssmod-core`: `cssmodc` (compiler) and
//! `cssmodl` (linker).

pub mod scss;
