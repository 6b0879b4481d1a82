use crate::gui::theme::ThemeColors;
use crate::hud::Hud;
use cairo::Context;

const HUD_FONT_SIZE: f64 = 18.0;
const HUD_MARGIN: f64 = 20.0;

pub fn draw(cr: &Context, hud: &Hud, colors: &ThemeColors, scale: f64) -> Result<(), cairo::Error> {
    let (r, g, b, a) = colors.hud_fg.into_components();
    cr.set_source_rgba(r, g, b, a);
    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
    cr.set_font_size(HUD_FONT_SIZE * scale);

    let line_height = HUD_FONT_SIZE * scale * 1.5;
    for (i, line) in hud.lines().iter().enumerate() {
        cr.move_to(HUD_MARGIN * scale, HUD_MARGIN * scale + line_height * (i as f64 + 1.0));
        cr.show_text(line)?;
    }
    Ok(())
}
