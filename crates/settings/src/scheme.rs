use thiserror::Error;

/// Identifier used when the preference is missing or names an unknown scheme.
pub const DEFAULT_SCHEME: &str = "Adwaita-dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Parses `#rrggbb` or `#rrggbbaa`.
    /// 解析 `#rrggbb` 或 `#rrggbbaa` 格式的顏色。
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        let digits = input
            .strip_prefix('#')
            .ok_or(ColorParseError::MissingHashPrefix)?;
        if digits.len() != 6 && digits.len() != 8 {
            return Err(ColorParseError::InvalidLength);
        }
        if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidHex);
        }
        let channel = |index: usize| {
            u8::from_str_radix(&digits[index..index + 2], 16)
                .map_err(|_| ColorParseError::InvalidHex)
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if digits.len() == 8 { channel(6)? } else { 0xFF },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("missing leading '#'")]
    MissingHashPrefix,
    #[error("expected 6 or 8 hexadecimal digits")]
    InvalidLength,
    #[error("contains non-hexadecimal digits")]
    InvalidHex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    Dark,
    Light,
}

/// Colours of the editing surface for one scheme.
/// 編輯區域使用的配色。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemePalette {
    pub background: Color,
    pub text: Color,
    pub current_line: Color,
    pub line_numbers: Color,
    pub selection: Color,
    pub accent: Color,
}

/// A named highlighting theme selectable from the preferences window.
/// 可於偏好設定中選擇的語法配色方案。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleScheme {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: SchemeKind,
    pub palette: SchemePalette,
}

struct SchemeSource {
    id: &'static str,
    name: &'static str,
    kind: SchemeKind,
    // background, text, current line, line numbers, selection, accent
    colors: [&'static str; 6],
}

const BUILTIN: &[SchemeSource] = &[
    SchemeSource {
        id: "Adwaita",
        name: "Adwaita",
        kind: SchemeKind::Light,
        colors: ["#ffffff", "#000000", "#f6f5f4", "#9a9996", "#c0d8f4", "#1c71d8"],
    },
    SchemeSource {
        id: "Adwaita-dark",
        name: "Adwaita Dark",
        kind: SchemeKind::Dark,
        colors: ["#1e1e1e", "#ffffff", "#2a2a2a", "#77767b", "#1a5fb4", "#62a0ea"],
    },
    SchemeSource {
        id: "classic",
        name: "Classic",
        kind: SchemeKind::Light,
        colors: ["#ffffff", "#000000", "#eeeeec", "#888a85", "#c6e2ff", "#a52a2a"],
    },
    SchemeSource {
        id: "cobalt",
        name: "Cobalt",
        kind: SchemeKind::Dark,
        colors: ["#002240", "#ffffff", "#00366b", "#0088ff", "#0d3a58", "#ff9d00"],
    },
    SchemeSource {
        id: "kate",
        name: "Kate",
        kind: SchemeKind::Light,
        colors: ["#ffffff", "#1f1c1b", "#f8f7f6", "#a0a0a0", "#94caef", "#0057ae"],
    },
    SchemeSource {
        id: "oblivion",
        name: "Oblivion",
        kind: SchemeKind::Dark,
        colors: ["#2e3436", "#d3d7cf", "#555753", "#babdb6", "#204a87", "#8ae234"],
    },
    SchemeSource {
        id: "solarized-light",
        name: "Solarized Light",
        kind: SchemeKind::Light,
        colors: ["#fdf6e3", "#586e75", "#eee8d5", "#93a1a1", "#eee8d5", "#268bd2"],
    },
    SchemeSource {
        id: "solarized-dark",
        name: "Solarized Dark",
        kind: SchemeKind::Dark,
        colors: ["#002b36", "#839496", "#073642", "#586e75", "#073642", "#268bd2"],
    },
    SchemeSource {
        id: "tango",
        name: "Tango",
        kind: SchemeKind::Light,
        colors: ["#ffffff", "#2e3436", "#eeeeec", "#babdb6", "#729fcf", "#3465a4"],
    },
];

/// The set of schemes the editor can apply.
/// 編輯器可套用的配色方案集合。
#[derive(Debug, Clone)]
pub struct SchemeCatalog {
    schemes: Vec<StyleScheme>,
}

impl SchemeCatalog {
    pub fn builtin() -> Result<Self, ColorParseError> {
        let mut schemes = Vec::with_capacity(BUILTIN.len());
        for source in BUILTIN {
            let [background, text, current_line, line_numbers, selection, accent] = source.colors;
            schemes.push(StyleScheme {
                id: source.id,
                name: source.name,
                kind: source.kind,
                palette: SchemePalette {
                    background: Color::from_hex(background)?,
                    text: Color::from_hex(text)?,
                    current_line: Color::from_hex(current_line)?,
                    line_numbers: Color::from_hex(line_numbers)?,
                    selection: Color::from_hex(selection)?,
                    accent: Color::from_hex(accent)?,
                },
            });
        }
        Ok(Self { schemes })
    }

    pub fn get(&self, id: &str) -> Option<&StyleScheme> {
        self.schemes.iter().find(|scheme| scheme.id == id)
    }

    /// Looks `id` up, falling back to [`DEFAULT_SCHEME`] and then to the first entry.
    /// 找不到指定方案時改用預設方案。
    pub fn resolve(&self, id: &str) -> &StyleScheme {
        self.get(id)
            .or_else(|| self.get(DEFAULT_SCHEME))
            .unwrap_or(&self.schemes[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleScheme> {
        self.schemes.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.schemes.iter().map(|scheme| scheme.id)
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_optional_alpha() {
        assert_eq!(
            Color::from_hex("#1a5fb4").unwrap(),
            Color {
                r: 0x1a,
                g: 0x5f,
                b: 0xb4,
                a: 0xff
            }
        );
        assert_eq!(Color::from_hex("#00000080").unwrap().a, 0x80);
        assert_eq!(
            Color::from_hex("1a5fb4"),
            Err(ColorParseError::MissingHashPrefix)
        );
        assert_eq!(Color::from_hex("#abc"), Err(ColorParseError::InvalidLength));
        assert_eq!(Color::from_hex("#zzzzzz"), Err(ColorParseError::InvalidHex));
    }

    #[test]
    fn builtin_catalog_resolves_unknown_ids_to_default() {
        let catalog = SchemeCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.resolve("cobalt").id, "cobalt");
        assert_eq!(catalog.resolve("does-not-exist").id, DEFAULT_SCHEME);
        assert_eq!(catalog.resolve("Adwaita").kind, SchemeKind::Light);
    }
}
