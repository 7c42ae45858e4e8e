//! Help overlay content loaded from `help-strings/*.txt` at compile time.

macro_rules! include_help {
    ($name:literal) => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/src/help-strings/",
            $name,
            ".txt"
        ))
    };
}

pub fn main_view() -> &'static str {
    include_help!("main_view")
}

pub fn form() -> &'static str {
    include_help!("form")
}

pub fn import() -> &'static str {
    include_help!("import")
}

pub fn chart_export() -> &'static str {
    include_help!("chart_export")
}
