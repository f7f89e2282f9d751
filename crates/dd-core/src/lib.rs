pub mod builder;
pub mod config;
pub mod error;
pub mod format;
pub mod layout;
pub mod raw;
pub mod simplify;
pub mod style;

pub use builder::{
    DesignMetadata, GlobalVars, SimplifiedDesign, build, build_from_str, build_from_value,
};
pub use config::{DigestConfig, IdStrategy};
pub use error::{DigestError, Result};
pub use format::{OutputFormat, render};
pub use layout::{Layout, build_layout, has_layout_properties};
pub use raw::{RawNode, RawResponse};
pub use simplify::{ComponentProperty, SimplifiedNode, Simplifier, simplify_node};
pub use style::{StyleCategory, StyleTable};
