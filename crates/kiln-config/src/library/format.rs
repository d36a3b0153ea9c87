use serde::{Deserialize, Serialize};

/// Output format of a library bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryFormat {
    /// ES module bundle
    Es,
    /// CommonJS bundle
    Cjs,
    /// Universal module definition (AMD, CommonJS or a browser global)
    Umd,
    /// Self-executing script assigning a browser global
    Iife,
}

impl LibraryFormat {
    /// Formats emitted when the configuration does not list any.
    pub fn defaults(has_library_name: bool) -> Vec<LibraryFormat> {
        if has_library_name {
            vec![LibraryFormat::Es, LibraryFormat::Umd]
        } else {
            vec![LibraryFormat::Es]
        }
    }

    /// Whether the format has no module system of its own and therefore
    /// exposes the library through a global and reads externals from globals.
    pub fn needs_global_name(self) -> bool {
        matches!(self, LibraryFormat::Umd | LibraryFormat::Iife)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LibraryFormat::Es => "es",
            LibraryFormat::Cjs => "cjs",
            LibraryFormat::Umd => "umd",
            LibraryFormat::Iife => "iife",
        }
    }

    /// Bundle file name for this format.
    ///
    /// ```
    /// use kiln_config::{LibraryFormat, PackageType};
    ///
    /// let umd = LibraryFormat::Umd.file_name("xrd-shared-ui", PackageType::CommonJs);
    /// assert_eq!(umd, "xrd-shared-ui.umd.js");
    /// let es = LibraryFormat::Es.file_name("xrd-shared-ui", PackageType::CommonJs);
    /// assert_eq!(es, "xrd-shared-ui.mjs");
    /// ```
    pub fn file_name(self, base: &str, package_type: PackageType) -> String {
        let module = package_type == PackageType::Module;
        match self {
            LibraryFormat::Es if module => format!("{base}.js"),
            LibraryFormat::Es => format!("{base}.mjs"),
            LibraryFormat::Cjs if module => format!("{base}.cjs"),
            LibraryFormat::Cjs => format!("{base}.js"),
            LibraryFormat::Umd | LibraryFormat::Iife if module => {
                format!("{base}.{}.cjs", self.as_str())
            }
            LibraryFormat::Umd | LibraryFormat::Iife => format!("{base}.{}.js", self.as_str()),
        }
    }
}

impl std::fmt::Display for LibraryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LibraryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "es" | "esm" => Ok(LibraryFormat::Es),
            "cjs" | "commonjs" => Ok(LibraryFormat::Cjs),
            "umd" => Ok(LibraryFormat::Umd),
            "iife" => Ok(LibraryFormat::Iife),
            other => Err(format!("unknown library format: {other}")),
        }
    }
}

/// Module kind of the package the library is published in (`type` in package.json)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    #[default]
    #[serde(alias = "cjs")]
    CommonJs,
    Module,
}
