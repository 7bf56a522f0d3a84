//! Logging and debugging facilities for Charter.
//!
//! Charter uses the `tracing` crate for instrumentation. Every subsystem logs
//! under one of the [`targets`] so applications can filter them:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("charter::policy=debug,charter_core=warn")
//!     .init();
//! ```
//!
//! [`WidgetTreeDebug`] renders the registry's containment tree, which is the
//! quickest way to see where a detached or orphaned widget ended up.

use std::fmt::Write as FmtWrite;

use crate::object::{ObjectId, ObjectRegistry, ObjectResult};

/// Log targets used across the workspace.
pub mod targets {
    pub const CORE: &str = "charter_core";
    pub const SIGNAL: &str = "charter_core::signal";
    pub const OBJECT: &str = "charter_core::object";
    pub const WIDGET: &str = "charter::widget";
    pub const BUTTON: &str = "charter::widget::button";
    pub const RADIO_GROUP: &str = "charter::widget::radio_group";
    pub const DRAG_DROP: &str = "charter::widget::drag_drop";
    pub const POLICY: &str = "charter::policy";
    pub const GOVERNMENT: &str = "charter::policy::government";
    pub const MENU: &str = "charter::menu";
    pub const CONFIG: &str = "charter::config";
}

/// Visual style for tree output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// `|` and `+--` connectors.
    Ascii,
    /// Box-drawing connectors.
    #[default]
    Unicode,
    /// Indentation only.
    Compact,
}

/// Options for [`WidgetTreeDebug`].
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    pub show_ids: bool,
    pub show_types: bool,
    /// Annotate hidden and disabled nodes.
    pub show_state: bool,
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_types: true,
            show_state: true,
            max_depth: None,
        }
    }
}

/// Formats the containment tree of an [`ObjectRegistry`].
#[derive(Debug, Clone, Default)]
pub struct WidgetTreeDebug {
    options: TreeFormatOptions,
}

impl WidgetTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format `root` and its descendants.
    pub fn format_subtree(
        &self,
        registry: &ObjectRegistry,
        root: ObjectId,
    ) -> ObjectResult<String> {
        let mut output = String::new();
        self.format_into(registry, root, 0, &mut Vec::new(), &mut output)?;
        Ok(output)
    }

    fn format_into(
        &self,
        registry: &ObjectRegistry,
        id: ObjectId,
        depth: usize,
        // For each ancestor level, whether that ancestor was the last child.
        last_flags: &mut Vec<bool>,
        output: &mut String,
    ) -> ObjectResult<()> {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        output.push_str(&self.prefix(last_flags));

        let name = registry.object_name(id)?;
        output.push_str(if name.is_empty() { "(unnamed)" } else { name });

        if self.options.show_ids {
            let _ = write!(output, " [{id:?}]");
        }
        if self.options.show_types {
            let type_name = registry.type_name(id)?;
            let short = type_name.rsplit("::").next().unwrap_or(type_name);
            let _ = write!(output, " ({short})");
        }
        if self.options.show_state {
            if !registry.is_visible(id)? {
                output.push_str(" hidden");
            }
            if !registry.is_enabled(id)? {
                output.push_str(" disabled");
            }
        }
        output.push('\n');

        let children = registry.children(id)?;
        let count = children.len();
        for (i, &child) in children.iter().enumerate() {
            last_flags.push(i + 1 == count);
            self.format_into(registry, child, depth + 1, last_flags, output)?;
            last_flags.pop();
        }
        Ok(())
    }

    fn prefix(&self, last_flags: &[bool]) -> String {
        let Some((&is_last, parents)) = last_flags.split_last() else {
            return String::new();
        };

        let (branch, tee, corner, blank) = match self.options.style {
            TreeStyle::Ascii => ("|  ", "+-- ", "`-- ", "   "),
            TreeStyle::Unicode => (
                "\u{2502}  ",
                "\u{251c}\u{2500}\u{2500} ",
                "\u{2514}\u{2500}\u{2500} ",
                "   ",
            ),
            TreeStyle::Compact => ("  ", "- ", "- ", "  "),
        };

        let mut prefix = String::new();
        for &parent_last in parents {
            prefix.push_str(if parent_last { blank } else { branch });
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix
    }
}
