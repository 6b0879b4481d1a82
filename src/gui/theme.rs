use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::{Srgb, Srgba};

pub struct ThemeColors {
    pub toggle: Srgba<f64>,
    pub toggle_open: Srgba<f64>,
    pub slot: Srgba<f64>,
    pub glyph: Srgba<f64>,
    pub backdrop: Srgba<f64>,
    pub card: Srgba<f64>,
    pub card_fg: Srgba<f64>,
    pub accent: Srgba<f64>,
    pub hud_fg: Srgba<f64>,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            toggle: Srgba::new(0.08, 0.09, 0.13, 0.85),
            toggle_open: Srgba::new(0.0, 0.6, 0.6, 0.9),
            slot: Srgba::new(0.08, 0.09, 0.13, 0.72),
            glyph: Srgba::new(1.0, 1.0, 1.0, 1.0),
            backdrop: Srgba::new(0.0, 0.0, 0.0, 0.45),
            card: Srgba::new(0.1, 0.11, 0.15, 0.95),
            card_fg: Srgba::new(0.95, 0.95, 0.95, 1.0),
            accent: Srgba::new(0.0, 1.0, 0.97, 0.9),
            hud_fg: Srgba::new(1.0, 1.0, 1.0, 0.9),
        }
    }
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        let fallback = Self::default();
        Self {
            toggle: Self::lookup_color(context, "theme_bg_color", fallback.toggle, Some(0.85)),
            toggle_open: Self::lookup_color(
                context,
                "theme_selected_bg_color",
                fallback.toggle_open,
                Some(0.9),
            ),
            slot: Self::lookup_color(context, "theme_bg_color", fallback.slot, Some(0.72)),
            glyph: Self::lookup_color(context, "theme_fg_color", fallback.glyph, None),
            card: Self::lookup_color(context, "theme_base_color", fallback.card, Some(0.95)),
            card_fg: Self::lookup_color(context, "theme_text_color", fallback.card_fg, None),
            ..fallback
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}

fn channel(s: &str) -> Option<f64> {
    let s = s.trim();
    match s.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok().map(|v| v / 100.0),
        None => s.parse::<f64>().ok().map(|v| v / 255.0),
    }
}

pub fn parse_color(value: &str) -> Option<Srgba<f64>> {
    let value = value.trim();

    if value.starts_with('#') {
        let rgb: Srgb<u8> = value.parse().ok()?;
        let rgb: Srgb<f64> = rgb.into_format();
        return Some(Srgba::new(rgb.red, rgb.green, rgb.blue, 1.0));
    }

    let (args, has_alpha) = if let Some(rest) = value.strip_prefix("rgba(") {
        (rest.strip_suffix(')')?, true)
    } else if let Some(rest) = value.strip_prefix("rgb(") {
        (rest.strip_suffix(')')?, false)
    } else {
        return None;
    };

    let parts: Vec<&str> = args.split(',').collect();
    match (parts.as_slice(), has_alpha) {
        ([r, g, b], false) => Some(Srgba::new(channel(r)?, channel(g)?, channel(b)?, 1.0)),
        ([r, g, b, a], true) => {
            let alpha = a.trim().parse::<f64>().ok()?.clamp(0.0, 1.0);
            Some(Srgba::new(channel(r)?, channel(g)?, channel(b)?, alpha))
        }
        _ => None,
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.vista-window {
    background-color: #10131a;
}
.vista-drawing-area {
    background: none;
    background-color: transparent;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
