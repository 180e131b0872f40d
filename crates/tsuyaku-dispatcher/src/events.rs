mod screenshot;
mod text;

pub use screenshot::translate_region;
pub use text::translate_text;
