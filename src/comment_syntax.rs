//! # Comment Syntax Module
//!
//! This module maps language identifiers and file extensions to the comment
//! delimiters used when rendering a header.
//!
//! The module includes:
//! - [`CommentToken`] describing the single-line token and optional block
//!   delimiters of one language
//! - [`CommentSyntaxTable`] resolving a language id or extension to a
//!   [`CommentToken`], honouring user overrides
//!
//! ## Example
//!
//! ```rust
//! use fileheader::comment_syntax::CommentSyntaxTable;
//!
//! let table = CommentSyntaxTable::builtin();
//! assert_eq!(table.resolve("python"), table.resolve(".py"));
//! assert_eq!(table.resolve("python").line_token(), "#");
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use tracing::trace;

use crate::config::HeaderConfig;

/// Single-line token used when a language has none of its own.
pub const DEFAULT_LINE_TOKEN: &str = "//";

/// Block comment delimiters (e.g. `/*` and `*/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockComment {
  /// The string that opens a block comment
  pub start: String,
  /// The string that closes a block comment
  pub end: String,
}

/// Comment delimiters for one language.
///
/// At least one of `single` and `multi` is present for any token produced by
/// [`CommentSyntaxTable::resolve`]; renderers treat a token with neither as the
/// default `//` + `/* */` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentToken {
  /// The single-line comment token (e.g. `//` or `#`)
  pub single: Option<String>,
  /// The block comment delimiters, if the language has them
  pub multi: Option<BlockComment>,
}

impl CommentToken {
  /// A token with only a single-line form.
  pub fn line(token: &str) -> Self {
    Self {
      single: Some(token.to_string()),
      multi: None,
    }
  }

  /// A token with only block delimiters.
  pub fn block(start: &str, end: &str) -> Self {
    Self {
      single: None,
      multi: Some(BlockComment {
        start: start.to_string(),
        end: end.to_string(),
      }),
    }
  }

  /// A token with both a single-line form and block delimiters.
  pub fn both(token: &str, start: &str, end: &str) -> Self {
    Self {
      single: Some(token.to_string()),
      ..Self::block(start, end)
    }
  }

  /// The `//` + `/* */` token used for anything unknown.
  pub fn fallback() -> Self {
    Self::both(DEFAULT_LINE_TOKEN, "/*", "*/")
  }

  /// The token prefixed to every header line: the single-line form, or `//`.
  pub fn line_token(&self) -> &str {
    self.single.as_deref().unwrap_or(DEFAULT_LINE_TOKEN)
  }
}

/// Built-in comment syntax, keyed by lowercase extension with leading dot.
#[derive(Clone, Copy)]
enum Syntax {
  Line(&'static str),
  Block(&'static str, &'static str),
  Both(&'static str, &'static str, &'static str),
}

impl Syntax {
  fn to_token(self) -> CommentToken {
    match self {
      Syntax::Line(token) => CommentToken::line(token),
      Syntax::Block(start, end) => CommentToken::block(start, end),
      Syntax::Both(token, start, end) => CommentToken::both(token, start, end),
    }
  }
}

const C_STYLE: Syntax = Syntax::Both("//", "/*", "*/");
const XML_STYLE: Syntax = Syntax::Block("<!--", "-->");

const BUILTIN_SYNTAX: &[(&str, Syntax)] = &[
  // C-style languages
  (".c", C_STYLE),
  (".cpp", C_STYLE),
  (".cc", C_STYLE),
  (".h", C_STYLE),
  (".hpp", C_STYLE),
  (".cs", C_STYLE),
  (".java", C_STYLE),
  (".js", C_STYLE),
  (".jsx", C_STYLE),
  (".ts", C_STYLE),
  (".tsx", C_STYLE),
  (".go", C_STYLE),
  (".rs", C_STYLE),
  (".swift", C_STYLE),
  (".kt", C_STYLE),
  (".scala", C_STYLE),
  (".dart", C_STYLE),
  (".php", C_STYLE),
  (".v", C_STYLE),
  (".sv", C_STYLE),
  // Scripting languages
  (".py", Syntax::Both("#", "\"\"\"", "\"\"\"")),
  (".rb", Syntax::Both("#", "=begin", "=end")),
  (".pl", Syntax::Both("#", "=pod", "=cut")),
  (".sh", Syntax::Line("#")),
  (".bash", Syntax::Line("#")),
  (".zsh", Syntax::Line("#")),
  (".fish", Syntax::Line("#")),
  (".ps1", Syntax::Both("#", "<#", "#>")),
  (".r", Syntax::Line("#")),
  (".tcl", Syntax::Line("#")),
  (".upf", Syntax::Line("#")),
  // Web technologies
  (".html", XML_STYLE),
  (".htm", XML_STYLE),
  (".xml", XML_STYLE),
  (".xhtml", XML_STYLE),
  (".svg", XML_STYLE),
  (".css", Syntax::Block("/*", "*/")),
  (".scss", C_STYLE),
  (".sass", Syntax::Line("//")),
  (".less", C_STYLE),
  (".stylus", C_STYLE),
  // Functional languages
  (".hs", Syntax::Both("--", "{-", "-}")),
  (".elm", Syntax::Both("--", "{-", "-}")),
  (".ml", Syntax::Block("(*", "*)")),
  (".fs", Syntax::Both("//", "(*", "*)")),
  (".clj", Syntax::Line(";")),
  (".lisp", Syntax::Line(";")),
  (".scm", Syntax::Line(";")),
  // SQL
  (".sql", Syntax::Both("--", "/*", "*/")),
  (".pgsql", Syntax::Both("--", "/*", "*/")),
  (".mysql", Syntax::Both("--", "/*", "*/")),
  // Markup and data
  (".md", XML_STYLE),
  (".markdown", XML_STYLE),
  (".tex", Syntax::Line("%")),
  (".latex", Syntax::Line("%")),
  (".yml", Syntax::Line("#")),
  (".yaml", Syntax::Line("#")),
  (".toml", Syntax::Line("#")),
  (".ini", Syntax::Line(";")),
  (".conf", Syntax::Line("#")),
  (".cfg", Syntax::Line("#")),
  // Assembly
  (".asm", Syntax::Line(";")),
  (".s", Syntax::Line("#")),
  // Others
  (".vim", Syntax::Line("\"")),
  (".lua", Syntax::Both("--", "--[[", "]]")),
  (".m", Syntax::Line("%")),
  (".jl", Syntax::Both("#", "#=", "=#")),
  (".ex", Syntax::Line("#")),
  (".exs", Syntax::Line("#")),
  (".erl", Syntax::Line("%")),
  (".hrl", Syntax::Line("%")),
];

/// Language id to file extensions; the first extension is the canonical one.
const BUILTIN_LANGUAGES: &[(&str, &[&str])] = &[
  ("typescript", &[".ts", ".tsx"]),
  ("javascript", &[".js", ".jsx", ".mjs", ".cjs"]),
  ("typescriptreact", &[".tsx"]),
  ("javascriptreact", &[".jsx"]),
  ("python", &[".py", ".pyw", ".pyi"]),
  ("java", &[".java"]),
  ("c", &[".c", ".h"]),
  ("cpp", &[".cpp", ".cc", ".cxx", ".c++", ".hpp", ".hh", ".hxx", ".h++"]),
  ("csharp", &[".cs"]),
  ("go", &[".go"]),
  ("rust", &[".rs"]),
  ("swift", &[".swift"]),
  ("kotlin", &[".kt", ".kts"]),
  ("scala", &[".scala", ".sc"]),
  ("ruby", &[".rb", ".rbw"]),
  ("perl", &[".pl", ".pm", ".t"]),
  ("shell", &[".sh"]),
  ("shellscript", &[".sh", ".bash", ".zsh", ".fish"]),
  ("bash", &[".bash", ".sh"]),
  ("powershell", &[".ps1", ".psm1", ".psd1"]),
  ("r", &[".r"]),
  ("html", &[".html", ".htm", ".xhtml"]),
  ("xml", &[".xml", ".xsd", ".xsl", ".xslt"]),
  ("css", &[".css"]),
  ("scss", &[".scss"]),
  ("sass", &[".sass"]),
  ("less", &[".less"]),
  ("stylus", &[".styl"]),
  ("haskell", &[".hs", ".lhs"]),
  ("ocaml", &[".ml", ".mli"]),
  ("fsharp", &[".fs", ".fsi", ".fsx"]),
  ("clojure", &[".clj", ".cljs", ".cljc"]),
  ("lisp", &[".lisp", ".lsp"]),
  ("sql", &[".sql", ".pgsql", ".mysql"]),
  ("markdown", &[".md", ".markdown", ".mdown", ".mkd"]),
  ("tex", &[".tex", ".latex"]),
  ("yaml", &[".yml", ".yaml"]),
  ("toml", &[".toml"]),
  ("ini", &[".ini", ".cfg", ".conf"]),
  ("vim", &[".vim", ".vimrc"]),
  ("lua", &[".lua"]),
  ("matlab", &[".m"]),
  ("julia", &[".jl"]),
  ("dart", &[".dart"]),
  ("php", &[".php", ".phtml", ".php3", ".php4", ".php5"]),
  ("elixir", &[".ex", ".exs"]),
  ("erlang", &[".erl", ".hrl"]),
  ("assembly", &[".asm", ".s"]),
  ("verilog", &[".v"]),
  ("systemverilog", &[".sv"]),
  ("tcl", &[".tcl"]),
  ("upf", &[".upf"]),
  ("makefile", &["Makefile", "makefile", ".mk"]),
  ("dockerfile", &["Dockerfile", ".dockerfile"]),
  ("json", &[".json", ".jsonc"]),
  ("jsonc", &[".jsonc"]),
  ("properties", &[".properties"]),
  ("gitignore", &[".gitignore"]),
  ("ignore", &[".ignore", ".eslintignore", ".prettierignore"]),
];

static SYNTAX_BY_EXTENSION: LazyLock<HashMap<&'static str, Syntax>> =
  LazyLock::new(|| BUILTIN_SYNTAX.iter().copied().collect());

static EXTENSIONS_BY_LANGUAGE: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
  LazyLock::new(|| BUILTIN_LANGUAGES.iter().copied().collect());

/// Resolves language ids and extensions to [`CommentToken`]s.
///
/// Lookups are pure functions of the override maps held by the table, the
/// built-in tables, and the input. Build a fresh table whenever the user's
/// configuration changes; the built-in data is shared and never copied.
#[derive(Debug, Clone, Default)]
pub struct CommentSyntaxTable {
  /// User comment tokens keyed by the raw language id, as supplied.
  token_overrides: HashMap<String, String>,
  /// User extension lists keyed by language id; merged over the built-ins.
  extension_overrides: HashMap<String, Vec<String>>,
}

impl CommentSyntaxTable {
  /// A table without user overrides.
  pub fn builtin() -> Self {
    Self::default()
  }

  /// A table with explicit override maps.
  pub const fn with_overrides(
    token_overrides: HashMap<String, String>,
    extension_overrides: HashMap<String, Vec<String>>,
  ) -> Self {
    Self {
      token_overrides,
      extension_overrides,
    }
  }

  /// A table carrying the overrides from a configuration snapshot.
  pub fn from_config(config: &HeaderConfig) -> Self {
    Self::with_overrides(config.comment_token_map.clone(), config.language_extensions.clone())
  }

  /// Resolve a language id (`rust`) or extension (`.rs`) to its comment token.
  ///
  /// Resolution order:
  /// 1. The user override map, keyed by the language id exactly as supplied
  /// 2. The user override map again with a leading dot dropped, so `.py`
  ///    picks up an override written as `py`
  /// 3. The built-in table, keyed by the normalized extension
  /// 4. [`CommentToken::fallback`]
  ///
  /// Never fails; unknown input resolves to the fallback token.
  pub fn resolve(&self, language_or_extension: &str) -> CommentToken {
    let undotted = language_or_extension.strip_prefix('.');
    let override_entry = self
      .token_overrides
      .get_key_value(language_or_extension)
      .or_else(|| undotted.and_then(|key| self.token_overrides.get_key_value(key)));
    if let Some((key, token)) = override_entry {
      trace!(key = key.as_str(), token = token.as_str(), "using user comment token");
      return CommentToken::line(token);
    }

    let extension = self.normalize(language_or_extension);
    SYNTAX_BY_EXTENSION
      .get(extension.as_str())
      .map(|syntax| syntax.to_token())
      .unwrap_or_else(CommentToken::fallback)
  }

  /// Map the input onto the extension key used for the built-in table.
  fn normalize(&self, language_or_extension: &str) -> String {
    if language_or_extension.starts_with('.') {
      return language_or_extension.to_lowercase();
    }

    let language = language_or_extension.to_lowercase();
    if let Some(first) = self.language_extensions(&language).into_iter().next() {
      return first;
    }

    // An undotted extension such as `py` resolves like `.py`.
    let dotted = format!(".{language}");
    if SYNTAX_BY_EXTENSION.contains_key(dotted.as_str()) {
      return dotted;
    }

    ".txt".to_string()
  }

  /// Whether the built-in table knows the extension (dot optional).
  pub fn is_extension_supported(&self, extension: &str) -> bool {
    let normalized = extension.to_lowercase();
    let key = if normalized.starts_with('.') {
      normalized
    } else {
      format!(".{normalized}")
    };
    SYNTAX_BY_EXTENSION.contains_key(key.as_str())
  }

  /// All extensions in the built-in table, sorted.
  pub fn supported_extensions(&self) -> Vec<String> {
    let mut extensions: Vec<String> = BUILTIN_SYNTAX.iter().map(|(ext, _)| (*ext).to_string()).collect();
    extensions.sort();
    extensions
  }

  /// Every language id known to either the built-ins or the user, sorted.
  pub fn supported_language_ids(&self) -> Vec<String> {
    let ids: BTreeSet<String> = BUILTIN_LANGUAGES
      .iter()
      .map(|(id, _)| (*id).to_string())
      .chain(self.extension_overrides.keys().cloned())
      .collect();
    ids.into_iter().collect()
  }

  /// Extensions for a language id. A non-empty user list replaces the
  /// built-in list for that id only; other ids keep their built-ins.
  pub fn language_extensions(&self, language_id: &str) -> Vec<String> {
    if let Some(user) = self.extension_overrides.get(language_id)
      && !user.is_empty()
    {
      return user.clone();
    }

    EXTENSIONS_BY_LANGUAGE
      .get(language_id)
      .map(|exts| exts.iter().map(|ext| (*ext).to_string()).collect())
      .unwrap_or_default()
  }
}
