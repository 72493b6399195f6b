//! State Module - Runtime state systems behind the page animations
//!
//! - **Cycler** - Typewriter phrase cycling (type, hold, delete, advance)
//! - **Blink** - Cursor blink on its own clock
//! - **Reveal** - One-shot "scrolled into view" flag
//! - **Sections** - Active nav section, scrolled flag, scroll progress
//! - **Pointer** - Cursor follower position and hover state
//! - **Disclosure** - Single-open accordion, popup menus with outside-click close

mod blink;
mod cycler;
mod disclosure;
mod pointer;
mod reveal;
mod sections;

pub use blink::*;
pub use cycler::*;
pub use disclosure::*;
pub use pointer::*;
pub use reveal::*;
pub use sections::*;
