use std::fmt;

/// Dependency-injection seam for chart colours.
///
/// Implement this trait to provide other palettes. The built-in themes are
/// [`DefaultTheme`] and [`DarkTheme`]; [`theme_by_name`] picks one.
pub trait ChartTheme: Send + Sync {
    fn name(&self) -> &'static str;
    fn background(&self) -> &'static str;
    fn foreground(&self) -> &'static str;
    /// Gridlines and axis text.
    fn muted(&self) -> &'static str;
    fn pr_color(&self) -> &'static str;
    fn issue_color(&self) -> &'static str;
    /// Cycled through for per-repository stacks.
    fn series_colors(&self) -> &'static [&'static str];
}

pub struct DefaultTheme;

impl ChartTheme for DefaultTheme {
    fn name(&self) -> &'static str        { "default" }
    fn background(&self) -> &'static str  { "#ffffff" }
    fn foreground(&self) -> &'static str  { "#1f2328" }
    fn muted(&self) -> &'static str       { "#8c959f" }
    fn pr_color(&self) -> &'static str    { "#4e79a7" }
    fn issue_color(&self) -> &'static str { "#f28e2b" }
    fn series_colors(&self) -> &'static [&'static str] {
        &["#4e79a7", "#f28e2b", "#59a14f", "#e15759", "#76b7b2", "#edc948", "#b07aa1"]
    }
}

pub struct DarkTheme;

impl ChartTheme for DarkTheme {
    fn name(&self) -> &'static str        { "dark" }
    fn background(&self) -> &'static str  { "#161b22" }
    fn foreground(&self) -> &'static str  { "#e6edf3" }
    fn muted(&self) -> &'static str       { "#6e7681" }
    fn pr_color(&self) -> &'static str    { "#79c0ff" }
    fn issue_color(&self) -> &'static str { "#e3b341" }
    fn series_colors(&self) -> &'static [&'static str] {
        &["#79c0ff", "#e3b341", "#7ee787", "#f85149", "#39c5cf", "#d2a8ff", "#ffa657"]
    }
}

/// Look up a built-in theme; `None` for unknown names.
pub fn theme_by_name(name: &str) -> Option<&'static dyn ChartTheme> {
    match name {
        "default" => Some(&DefaultTheme),
        "dark"    => Some(&DarkTheme),
        _ => None,
    }
}

pub const THEME_NAMES: &[&str] = &["default", "dark"];

// ---------------------------------------------------------------------------
// Grade
// ---------------------------------------------------------------------------

/// Letter grade derived from a total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Grade {
    pub fn from_total(total: u64) -> Self {
        match total {
            90.. => Grade::A,
            80.. => Grade::B,
            70.. => Grade::C,
            60.. => Grade::D,
            50.. => Grade::E,
            _    => Grade::F,
        }
    }

    /// Terminal colour name accepted by the `colored` crate.
    pub fn terminal_color(self) -> &'static str {
        match self {
            Grade::A => "green",
            Grade::B => "cyan",
            Grade::C => "blue",
            Grade::D => "yellow",
            Grade::E => "magenta",
            Grade::F => "red",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
