pub mod launcher;

pub use launcher::{Execvp, ImageReplacer, Launcher};
