use std::path::Path;

pub const APP_TITLE: &str = "Codepad";

/// Window title: the open folder's name in title case, or the application name.
/// 視窗標題：目前資料夾名稱（首字大寫），否則為程式名稱。
pub fn window_title(root: Option<&Path>) -> String {
    root.and_then(|path| path.file_name())
        .map(|name| title_case(&name.to_string_lossy()))
        .unwrap_or_else(|| APP_TITLE.to_string())
}

/// Uppercases the first letter of every run of letters and lowercases the rest.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn folder_names_are_title_cased() {
        assert_eq!(title_case("my-project_x"), "My-Project_X");
        assert_eq!(title_case("HELLO world"), "Hello World");
        assert_eq!(title_case("2nd try"), "2Nd Try");
        let root = PathBuf::from("/home/user/rust notes");
        assert_eq!(window_title(Some(&root)), "Rust Notes");
    }

    #[test]
    fn falls_back_to_app_title() {
        assert_eq!(window_title(None), APP_TITLE);
        assert_eq!(window_title(Some(Path::new("/"))), APP_TITLE);
    }
}
