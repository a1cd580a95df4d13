use catppuccin::PALETTE;
use ratatui::style::Color;
use tracing::warn;

/// Convert a catppuccin color to a ratatui color.
const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

const fn hex(rgb: u32) -> Color {
    Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Application theme.
///
/// Slots are named after the Catppuccin palette so every flavor maps onto
/// them one to one. The `podium()` theme fills the same slots with the
/// portfolio's own plum, rose, tan and cream palette.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub name: &'static str,

    // Base colors
    pub base: Color,
    pub mantle: Color,
    pub crust: Color,

    // Surface colors
    pub surface0: Color,
    pub surface1: Color,
    pub surface2: Color,

    // Overlay colors
    pub overlay0: Color,
    pub overlay1: Color,

    // Text colors
    pub text: Color,
    pub subtext0: Color,
    pub subtext1: Color,

    // Accent colors
    pub pink: Color,
    pub mauve: Color,
    pub red: Color,
    pub peach: Color,
    pub yellow: Color,
    pub green: Color,
    pub blue: Color,
    pub lavender: Color,
}

impl Theme {
    /// Create a theme from a Catppuccin flavor.
    const fn from_catppuccin(name: &'static str, flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            name,
            base: catppuccin_to_color(&c.base),
            mantle: catppuccin_to_color(&c.mantle),
            crust: catppuccin_to_color(&c.crust),
            surface0: catppuccin_to_color(&c.surface0),
            surface1: catppuccin_to_color(&c.surface1),
            surface2: catppuccin_to_color(&c.surface2),
            overlay0: catppuccin_to_color(&c.overlay0),
            overlay1: catppuccin_to_color(&c.overlay1),
            text: catppuccin_to_color(&c.text),
            subtext0: catppuccin_to_color(&c.subtext0),
            subtext1: catppuccin_to_color(&c.subtext1),
            pink: catppuccin_to_color(&c.pink),
            mauve: catppuccin_to_color(&c.mauve),
            red: catppuccin_to_color(&c.red),
            peach: catppuccin_to_color(&c.peach),
            yellow: catppuccin_to_color(&c.yellow),
            green: catppuccin_to_color(&c.green),
            blue: catppuccin_to_color(&c.blue),
            lavender: catppuccin_to_color(&c.lavender),
        }
    }

    /// The portfolio palette (light).
    #[must_use]
    pub const fn podium() -> Self {
        Self {
            name: "Podium",
            base: hex(0x00ff_fbf2),
            mantle: hex(0x00f6_efe2),
            crust: hex(0x00ec_e3d3),
            surface0: hex(0x00f3_e9da),
            surface1: hex(0x00e2_d3bf),
            surface2: hex(0x00c4_a287),
            overlay0: hex(0x009c_8c86),
            overlay1: hex(0x007a_6f78),
            text: hex(0x004b_4453),
            subtext0: hex(0x006a_6070),
            subtext1: hex(0x005a_5060),
            pink: hex(0x00ab_4e68),
            mauve: hex(0x007e_1946),
            red: hex(0x00c0_392b),
            peach: hex(0x00b5_651d),
            yellow: hex(0x00c9_9a2e),
            green: hex(0x004f_7f52),
            blue: hex(0x003d_6a8a),
            lavender: hex(0x00ab_4e68),
        }
    }

    /// Catppuccin Mocha theme (dark).
    #[must_use]
    pub fn catppuccin_mocha() -> Self {
        Self::from_catppuccin("Catppuccin Mocha", &PALETTE.mocha)
    }

    /// Catppuccin Latte theme (light).
    #[must_use]
    pub fn catppuccin_latte() -> Self {
        Self::from_catppuccin("Catppuccin Latte", &PALETTE.latte)
    }

    /// Catppuccin Frappé theme (dark).
    #[must_use]
    pub fn catppuccin_frappe() -> Self {
        Self::from_catppuccin("Catppuccin Frappé", &PALETTE.frappe)
    }

    /// Catppuccin Macchiato theme (dark).
    #[must_use]
    pub fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin("Catppuccin Macchiato", &PALETTE.macchiato)
    }

    // Base colors
    #[must_use]
    pub const fn base(&self) -> Color {
        self.base
    }

    #[must_use]
    pub const fn crust(&self) -> Color {
        self.crust
    }

    // Surface colors
    #[must_use]
    pub const fn surface0(&self) -> Color {
        self.surface0
    }

    #[must_use]
    pub const fn surface1(&self) -> Color {
        self.surface1
    }

    #[must_use]
    pub const fn surface2(&self) -> Color {
        self.surface2
    }

    // Overlay colors
    #[must_use]
    pub const fn overlay0(&self) -> Color {
        self.overlay0
    }

    #[must_use]
    pub const fn overlay1(&self) -> Color {
        self.overlay1
    }

    // Text colors
    #[must_use]
    pub const fn text(&self) -> Color {
        self.text
    }

    #[must_use]
    pub const fn subtext0(&self) -> Color {
        self.subtext0
    }

    #[must_use]
    pub const fn subtext1(&self) -> Color {
        self.subtext1
    }

    // Accent colors
    #[must_use]
    pub const fn pink(&self) -> Color {
        self.pink
    }

    #[must_use]
    pub const fn mauve(&self) -> Color {
        self.mauve
    }

    #[must_use]
    pub const fn red(&self) -> Color {
        self.red
    }

    #[must_use]
    pub const fn peach(&self) -> Color {
        self.peach
    }

    #[must_use]
    pub const fn yellow(&self) -> Color {
        self.yellow
    }

    #[must_use]
    pub const fn green(&self) -> Color {
        self.green
    }

    #[must_use]
    pub const fn blue(&self) -> Color {
        self.blue
    }

    #[must_use]
    pub const fn lavender(&self) -> Color {
        self.lavender
    }

    // Semantic colors
    #[must_use]
    pub const fn selection_bg(&self) -> Color {
        self.surface1
    }

    /// Fill used where a project image cannot be shown.
    #[must_use]
    pub const fn banner_fallback(&self) -> Color {
        self.pink
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::podium()
    }
}

/// All built-in themes, in selector order.
#[must_use]
pub fn available_themes() -> Vec<Theme> {
    vec![
        Theme::podium(),
        Theme::catppuccin_latte(),
        Theme::catppuccin_frappe(),
        Theme::catppuccin_macchiato(),
        Theme::catppuccin_mocha(),
    ]
}

/// Look up a theme by its display name, falling back to the default.
#[must_use]
pub fn theme_from_name(name: &str) -> Theme {
    available_themes()
        .into_iter()
        .find(|theme| theme.name.eq_ignore_ascii_case(name))
        .unwrap_or_else(|| {
            warn!(theme = %name, "Unknown theme, using default");
            Theme::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_lookup_is_case_insensitive() {
        assert_eq!(theme_from_name("catppuccin mocha").name, "Catppuccin Mocha");
        assert_eq!(theme_from_name("PODIUM").name, "Podium");
    }

    #[test]
    fn test_unknown_theme_falls_back_to_default() {
        assert_eq!(theme_from_name("Solarized").name, "Podium");
    }

    #[test]
    fn test_podium_palette_matches_site_colors() {
        let theme = Theme::podium();
        assert_eq!(theme.mauve(), Color::Rgb(0x7e, 0x19, 0x46));
        assert_eq!(theme.base(), Color::Rgb(0xff, 0xfb, 0xf2));
        assert_eq!(theme.text(), Color::Rgb(0x4b, 0x44, 0x53));
    }
}
