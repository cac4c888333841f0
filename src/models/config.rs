use serde::{Deserialize, Serialize};

/// Default TypeScript version requested from the engine host.
pub const DEFAULT_TS_VERSION: &str = "latest";

/// Default typescript-eslint version requested from the engine host.
pub const DEFAULT_TSE_VERSION: &str = "latest";

/// Starter snippet shown in the primary editor on first visit.
pub const DEFAULT_CODE: &str = "const x: Array<string> = ['a', 'b'];\n";

/// Starter lint configuration document.
pub const DEFAULT_ESLINTRC: &str = r#"{
  "rules": {
    "@typescript-eslint/no-unused-vars": "error"
  }
}
"#;

/// Starter compiler configuration document.
pub const DEFAULT_TSCONFIG: &str = r#"{
  "compilerOptions": {
    "strictNullChecks": true
  }
}
"#;

/// File type of the primary source document.
///
/// The token form (`as_token`) is what appears in URL fragments and file
/// extensions; unknown tokens fall back to plain TypeScript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    Ts,
    Tsx,
    #[serde(rename = "d.ts")]
    Dts,
    Js,
    Jsx,
}

impl FileType {
    /// Parse a file-type token, falling back to `Ts` for anything unknown.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "tsx" => Self::Tsx,
            "d.ts" => Self::Dts,
            "js" => Self::Js,
            "jsx" => Self::Jsx,
            _ => Self::Ts,
        }
    }

    /// Token form used in URLs and as the primary file extension.
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Ts => "ts",
            Self::Tsx => "tsx",
            Self::Dts => "d.ts",
            Self::Js => "js",
            Self::Jsx => "jsx",
        }
    }
}

/// ECMAScript source kind passed to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Module,
    Script,
}

impl SourceType {
    /// Parse a source-type token. Anything other than `script` is a module.
    pub fn parse(raw: &str) -> Self {
        if raw == "script" {
            Self::Script
        } else {
            Self::Module
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Script => "script",
        }
    }
}

/// Which tree the detail pane shows, or `Off` for the lint-message list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AstView {
    #[default]
    Off,
    Es,
    Ts,
    Scope,
    Types,
}

impl AstView {
    /// Parse a view token. Empty input means `Off`; any unrecognized
    /// non-empty token historically meant the ESTree view.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "" => Self::Off,
            "es" => Self::Es,
            "ts" => Self::Ts,
            "scope" => Self::Scope,
            "types" => Self::Types,
            _ => Self::Es,
        }
    }

    /// Token form, or `None` when the view is off (off is never written
    /// to URLs or storage as a token).
    pub fn as_token(self) -> Option<&'static str> {
        match self {
            Self::Off => None,
            Self::Es => Some("es"),
            Self::Ts => Some("ts"),
            Self::Scope => Some("scope"),
            Self::Types => Some("types"),
        }
    }
}

/// The canonical playground configuration.
///
/// This is the single in-memory representation of everything a shared link
/// captures: tool versions, the editor documents, parse settings, and the
/// active detail view. Compressed URL and storage forms are derived from it
/// by [`crate::codec`] and [`crate::storage`]; they are never the working
/// representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigModel {
    /// TypeScript version under analysis.
    pub ts: String,

    /// typescript-eslint version under analysis.
    pub tse: String,

    /// Primary source document.
    pub code: String,

    /// Secondary (scratch) source document.
    pub code2: String,

    /// File type of the primary document.
    pub file_type: FileType,

    /// Parse mode for the source documents.
    pub source_type: SourceType,

    /// Lint configuration document (serialized JSON text).
    pub eslintrc: String,

    /// Compiler configuration document (serialized JSON text).
    pub tsconfig: String,

    /// Active detail view.
    #[serde(rename = "showAST")]
    pub show_ast: AstView,
}

impl Default for ConfigModel {
    fn default() -> Self {
        Self {
            ts: DEFAULT_TS_VERSION.to_string(),
            tse: DEFAULT_TSE_VERSION.to_string(),
            code: DEFAULT_CODE.to_string(),
            code2: String::new(),
            file_type: FileType::default(),
            source_type: SourceType::default(),
            eslintrc: DEFAULT_ESLINTRC.to_string(),
            tsconfig: DEFAULT_TSCONFIG.to_string(),
            show_ast: AstView::default(),
        }
    }
}

/// A partial configuration: every field optional, absent fields meaning
/// "keep the current value".
///
/// Patches come from three places: decoded URL fragments, validated stored
/// state, and UI mutations. All three merge into the full model the same
/// way, which is what makes the defaults ← storage ← URL layering a plain
/// fold over patches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    pub ts: Option<String>,
    pub tse: Option<String>,
    pub code: Option<String>,
    pub code2: Option<String>,
    pub file_type: Option<FileType>,
    pub source_type: Option<SourceType>,
    pub eslintrc: Option<String>,
    pub tsconfig: Option<String>,
    pub show_ast: Option<AstView>,
}

impl ConfigPatch {
    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.ts.is_none()
            && self.tse.is_none()
            && self.code.is_none()
            && self.code2.is_none()
            && self.file_type.is_none()
            && self.source_type.is_none()
            && self.eslintrc.is_none()
            && self.tsconfig.is_none()
            && self.show_ast.is_none()
    }

    /// True when the patch carries either tool version.
    ///
    /// A tool-version change requires reinitializing the analysis engine,
    /// so the state store turns it into a full reload instead of an
    /// in-place history replacement.
    pub fn touches_tool_version(&self) -> bool {
        self.ts.is_some() || self.tse.is_some()
    }

    /// Produce a full configuration by overlaying this patch on `base`.
    pub fn merged_into(&self, base: &ConfigModel) -> ConfigModel {
        let mut merged = base.clone();
        if let Some(ts) = &self.ts {
            merged.ts = ts.clone();
        }
        if let Some(tse) = &self.tse {
            merged.tse = tse.clone();
        }
        if let Some(code) = &self.code {
            merged.code = code.clone();
        }
        if let Some(code2) = &self.code2 {
            merged.code2 = code2.clone();
        }
        if let Some(file_type) = self.file_type {
            merged.file_type = file_type;
        }
        if let Some(source_type) = self.source_type {
            merged.source_type = source_type;
        }
        if let Some(eslintrc) = &self.eslintrc {
            merged.eslintrc = eslintrc.clone();
        }
        if let Some(tsconfig) = &self.tsconfig {
            merged.tsconfig = tsconfig.clone();
        }
        if let Some(show_ast) = self.show_ast {
            merged.show_ast = show_ast;
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ConfigModel::default();
        assert_eq!(config.ts, "latest");
        assert_eq!(config.tse, "latest");
        assert_eq!(config.file_type, FileType::Ts);
        assert_eq!(config.source_type, SourceType::Module);
        assert_eq!(config.show_ast, AstView::Off);
        assert!(config.code2.is_empty());
        assert!(config.eslintrc.contains("rules"));
        assert!(config.tsconfig.contains("compilerOptions"));
    }

    #[test]
    fn test_file_type_tokens() {
        assert_eq!(FileType::parse("d.ts"), FileType::Dts);
        assert_eq!(FileType::Dts.as_token(), "d.ts");
        assert_eq!(FileType::parse("tsx"), FileType::Tsx);
        // Unknown tokens fall back to plain TypeScript
        assert_eq!(FileType::parse("coffee"), FileType::Ts);
        assert_eq!(FileType::parse(""), FileType::Ts);
    }

    #[test]
    fn test_source_type_tokens() {
        assert_eq!(SourceType::parse("script"), SourceType::Script);
        assert_eq!(SourceType::parse("module"), SourceType::Module);
        assert_eq!(SourceType::parse("anything"), SourceType::Module);
    }

    #[test]
    fn test_ast_view_tokens() {
        assert_eq!(AstView::parse(""), AstView::Off);
        assert_eq!(AstView::parse("scope"), AstView::Scope);
        // Historical behavior: unknown non-empty tokens mean the ESTree view
        assert_eq!(AstView::parse("banana"), AstView::Es);
        assert_eq!(AstView::Off.as_token(), None);
        assert_eq!(AstView::Types.as_token(), Some("types"));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ConfigPatch::default().is_empty());
        let patch = ConfigPatch {
            code: Some("let a;".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_merge_overlays_only_present_fields() {
        let base = ConfigModel::default();
        let patch = ConfigPatch {
            ts: Some("5.3.2".to_string()),
            show_ast: Some(AstView::Es),
            ..Default::default()
        };

        let merged = patch.merged_into(&base);
        assert_eq!(merged.ts, "5.3.2");
        assert_eq!(merged.show_ast, AstView::Es);
        // Untouched fields keep the base values
        assert_eq!(merged.tse, base.tse);
        assert_eq!(merged.code, base.code);
        assert_eq!(merged.file_type, base.file_type);
    }

    #[test]
    fn test_patch_tool_version_detection() {
        assert!(!ConfigPatch::default().touches_tool_version());
        let patch = ConfigPatch {
            tse: Some("8.0.0".to_string()),
            ..Default::default()
        };
        assert!(patch.touches_tool_version());
        let patch = ConfigPatch {
            code: Some(String::new()),
            ..Default::default()
        };
        assert!(!patch.touches_tool_version());
    }

    #[test]
    fn test_config_serializes_with_wire_names() {
        let config = ConfigModel::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"fileType\""));
        assert!(json.contains("\"sourceType\""));
        assert!(json.contains("\"showAST\""));
    }
}
