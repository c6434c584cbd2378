use ratatui::style::Color;

use crate::chart::ChartOptions;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub status_ok: Color,
    pub status_err: Color,
    pub statusbar_bg: Color,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub accent: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub selection_bg: Color,
    pub memory_line: Color,
    pub cpu_line: Color,
}

impl Theme {
    pub fn from_config(theme_name: &str) -> Self {
        match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            "mono" | "monochrome" => Self::mono(),
            _ => Self::dark(),
        }
    }

    pub fn next(&self) -> Self {
        match self.name {
            "dark" => Self::light(),
            "light" => Self::mono(),
            _ => Self::dark(),
        }
    }

    /// Chart colors for a plot of `width` x `height` cells.
    pub fn chart_options(&self, width: u16, height: u16) -> ChartOptions {
        ChartOptions {
            width,
            height,
            foreground: self.text_primary,
            memory_color: self.memory_line,
            cpu_color: self.cpu_line,
        }
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            header_accent_bg: Color::Green,
            header_accent_fg: Color::Black,
            status_ok: Color::Green,
            status_err: Color::Red,
            statusbar_bg: Color::Rgb(30, 30, 46),
            overlay_border: Color::Rgb(108, 112, 134),
            text_primary: Color::Rgb(205, 214, 244),
            text_secondary: Color::Rgb(147, 153, 178),
            accent: Color::Rgb(203, 166, 247),
            pill_key_bg: Color::Rgb(137, 180, 250),
            pill_key_fg: Color::Rgb(17, 17, 27),
            pill_desc_fg: Color::Rgb(186, 194, 222),
            surface_bg: Color::Rgb(24, 24, 37),
            selection_bg: Color::Rgb(69, 71, 90),
            memory_line: Color::Rgb(137, 220, 235),
            cpu_line: Color::Rgb(249, 226, 175),
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            header_accent_bg: Color::Rgb(64, 160, 43),
            header_accent_fg: Color::White,
            status_ok: Color::Rgb(64, 160, 43),
            status_err: Color::Rgb(210, 15, 57),
            statusbar_bg: Color::Rgb(230, 233, 239),
            overlay_border: Color::Rgb(140, 143, 161),
            text_primary: Color::Rgb(76, 79, 105),
            text_secondary: Color::Rgb(108, 111, 133),
            accent: Color::Rgb(136, 57, 239),
            pill_key_bg: Color::Rgb(30, 102, 245),
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Rgb(92, 95, 119),
            surface_bg: Color::Rgb(239, 241, 245),
            selection_bg: Color::Rgb(204, 208, 218),
            memory_line: Color::Rgb(4, 165, 229),
            cpu_line: Color::Rgb(223, 142, 29),
        }
    }

    pub fn mono() -> Self {
        Theme {
            name: "mono",
            header_accent_bg: Color::White,
            header_accent_fg: Color::Black,
            status_ok: Color::White,
            status_err: Color::White,
            statusbar_bg: Color::Reset,
            overlay_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::White,
            pill_key_bg: Color::White,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::Gray,
            surface_bg: Color::Reset,
            selection_bg: Color::DarkGray,
            memory_line: Color::White,
            cpu_line: Color::Gray,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
