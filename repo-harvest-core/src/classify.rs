//! # classify: extension/filename taxonomy
//!
//! Maps a file name to the [`Category`] used downstream to route documents to
//! language-specific processing. The tables are fixed at build time and shared
//! process-wide; classification is a pure function with no I/O.
//!
//! Resolution order:
//! 1. the lower-cased extension (including its leading dot) in [`EXTENSIONS`];
//! 2. the lower-cased stem in [`FILENAMES`] (convention files such as `Makefile`);
//! 3. for files with no extension at all, the catch-all [`Category::Text`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic label assigned to an eligible file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Viva,
    VerilogVHDL,
    VerilogAnalog,
    #[serde(rename = "CPP")]
    Cpp,
    Python,
    Config,
    Makefile,
    Perl,
    Tcl,
    Spec,
    Yaml,
    Spice,
    #[serde(rename = "text")]
    Text,
}

impl Category {
    /// The label written to the `category` field of a record.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Viva => "Viva",
            Category::VerilogVHDL => "VerilogVHDL",
            Category::VerilogAnalog => "VerilogAnalog",
            Category::Cpp => "CPP",
            Category::Python => "Python",
            Category::Config => "Config",
            Category::Makefile => "Makefile",
            Category::Perl => "Perl",
            Category::Tcl => "Tcl",
            Category::Spec => "Spec",
            Category::Yaml => "Yaml",
            Category::Spice => "Spice",
            Category::Text => "text",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extensions (lower-case, dot included) recognised by the classifier.
pub const EXTENSIONS: &[(&str, Category)] = &[
    (".vx", Category::Viva),
    (".vxh", Category::Viva),
    (".v", Category::VerilogVHDL),
    (".vh", Category::VerilogVHDL),
    (".vhdl", Category::VerilogVHDL),
    (".va", Category::VerilogAnalog),
    (".c", Category::Cpp),
    (".cpp", Category::Cpp),
    (".h", Category::Cpp),
    (".hpp", Category::Cpp),
    (".py", Category::Python),
    (".config", Category::Config),
    (".mk", Category::Makefile),
    (".pm", Category::Perl),
    (".pl", Category::Perl),
    (".tcl", Category::Tcl),
    (".spec", Category::Spec),
    (".yaml", Category::Yaml),
    (".yml", Category::Yaml),
    (".sp", Category::Spice),
    (".cir", Category::Spice),
    (".cmd", Category::Spice),
    (".spf", Category::Spice),
    (".spice", Category::Spice),
    (".txt", Category::Text),
    (".json", Category::Text),
    (".xml", Category::Text),
    (".html", Category::Text),
    (".pdf", Category::Text),
    (".md", Category::Text),
];

/// Bare file names (lower-case) recognised regardless of extension.
pub const FILENAMES: &[(&str, Category)] = &[
    ("makefile", Category::Makefile),
    ("makeppfile", Category::Makefile),
];

/// Category for files that carry no extension and no recognised name.
pub const NO_EXTENSION: Category = Category::Text;

/// Split a lower-cased file name into `(stem, extension)`.
///
/// The extension keeps its leading dot. Leading dots belong to the stem, so
/// `.bashrc` has no extension.
pub fn split_name(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(idx) => name.split_at(leading + idx),
        None => (name, ""),
    }
}

fn lookup(table: &[(&str, Category)], key: &str) -> Option<Category> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, category)| *category)
}

/// Resolve the category of `file_name`, or `None` when it is unsupported.
pub fn classify(file_name: &str) -> Option<Category> {
    let lowered = file_name.to_lowercase();
    let (stem, ext) = split_name(&lowered);

    if !ext.is_empty() {
        return lookup(EXTENSIONS, ext).or_else(|| lookup(FILENAMES, stem));
    }
    Some(lookup(FILENAMES, stem).unwrap_or(NO_EXTENSION))
}

/// Lower-cased extension of `file_name` as reported in records (`""` if none).
pub fn extension_of(file_name: &str) -> String {
    let lowered = file_name.to_lowercase();
    split_name(&lowered).1.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_name_keeps_leading_dot_in_stem() {
        assert_eq!(split_name(".bashrc"), (".bashrc", ""));
        assert_eq!(split_name("main.rs"), ("main", ".rs"));
        assert_eq!(split_name("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_name("makefile"), ("makefile", ""));
    }

    #[test]
    fn tables_have_unique_keys() {
        for table in [EXTENSIONS, FILENAMES] {
            let mut keys: Vec<_> = table.iter().map(|(k, _)| *k).collect();
            keys.sort_unstable();
            let before = keys.len();
            keys.dedup();
            assert_eq!(before, keys.len());
        }
    }
}
