use std::path::Path;

/// Best-effort syntax hint derived from a file name.
/// 依檔名推斷的語法提示。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageHint {
    pub id: &'static str,
    pub display_name: &'static str,
}

const fn hint(id: &'static str, display_name: &'static str) -> LanguageHint {
    LanguageHint { id, display_name }
}

// Exact file names take precedence over extensions.
const FILE_NAMES: &[(&str, LanguageHint)] = &[
    ("Makefile", hint("makefile", "Makefile")),
    ("GNUmakefile", hint("makefile", "Makefile")),
    ("Dockerfile", hint("dockerfile", "Dockerfile")),
    ("CMakeLists.txt", hint("cmake", "CMake")),
    ("meson.build", hint("meson", "Meson")),
    ("Cargo.lock", hint("toml", "TOML")),
];

const EXTENSIONS: &[(&str, LanguageHint)] = &[
    ("rs", hint("rust", "Rust")),
    ("py", hint("python", "Python")),
    ("pyi", hint("python", "Python")),
    ("js", hint("js", "JavaScript")),
    ("mjs", hint("js", "JavaScript")),
    ("ts", hint("typescript", "TypeScript")),
    ("c", hint("c", "C")),
    ("h", hint("chdr", "C/ObjC Header")),
    ("cc", hint("cpp", "C++")),
    ("cpp", hint("cpp", "C++")),
    ("cxx", hint("cpp", "C++")),
    ("hpp", hint("cpphdr", "C++ Header")),
    ("go", hint("go", "Go")),
    ("java", hint("java", "Java")),
    ("json", hint("json", "JSON")),
    ("toml", hint("toml", "TOML")),
    ("yaml", hint("yaml", "YAML")),
    ("yml", hint("yaml", "YAML")),
    ("md", hint("markdown", "Markdown")),
    ("markdown", hint("markdown", "Markdown")),
    ("html", hint("html", "HTML")),
    ("htm", hint("html", "HTML")),
    ("css", hint("css", "CSS")),
    ("xml", hint("xml", "XML")),
    ("ui", hint("xml", "XML")),
    ("sh", hint("sh", "sh")),
    ("bash", hint("sh", "sh")),
    ("sql", hint("sql", "SQL")),
    ("vala", hint("vala", "Vala")),
    ("ini", hint("ini", ".ini")),
    ("desktop", hint("desktop", ".desktop")),
];

/// Infers a language from `path`'s file name, then its extension (case-insensitive).
/// Returns `None` when nothing matches.
/// 先比對完整檔名，再比對副檔名；找不到時回傳 `None`。
pub fn detect_language(path: &Path) -> Option<LanguageHint> {
    let name = path.file_name()?.to_str()?;
    if let Some((_, hint)) = FILE_NAMES.iter().find(|(candidate, _)| *candidate == name) {
        return Some(*hint);
    }
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(candidate, _)| *candidate == extension)
        .map(|(_, hint)| *hint)
}
