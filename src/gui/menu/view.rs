use super::component::CircularMenu;
use super::model::{Layout, Point, Rect, SlotGeometry};
use super::MODAL_CLOSE_CLASS;
use crate::anim::{TweenProp, transform_value};
use crate::dom::Element;
use crate::gui::theme::{self, ThemeColors};
use cairo::Context;
use palette::Srgba;
use std::f64::consts::PI;

const FONT: &str = "Sans";

fn set_color(cr: &Context, color: Srgba<f64>, alpha: f64) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a * alpha);
}

fn circle(cr: &Context, center: Point, radius: f64) {
    cr.new_path();
    cr.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
}

fn rounded_rect(cr: &Context, rect: &Rect, radius: f64) {
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);
    cr.new_sub_path();
    cr.arc(x + w - r, y + r, r, -PI / 2.0, 0.0);
    cr.arc(x + w - r, y + h - r, r, 0.0, PI / 2.0);
    cr.arc(x + r, y + h - r, r, PI / 2.0, PI);
    cr.arc(x + r, y + r, r, PI, 3.0 * PI / 2.0);
    cr.close_path();
}

fn centered_text(cr: &Context, center: Point, text: &str, size: f64) -> Result<(), cairo::Error> {
    cr.select_font_face(FONT, cairo::FontSlant::Normal, cairo::FontWeight::Bold);
    cr.set_font_size(size);
    let ext = cr.text_extents(text)?;
    cr.move_to(
        center.x - ext.width() / 2.0 - ext.x_bearing(),
        center.y - ext.height() / 2.0 - ext.y_bearing(),
    );
    cr.show_text(text)
}

struct SlotRenderer<'a> {
    button: &'a Element,
    geometry: &'a SlotGeometry,
    offset_y: f64,
    alpha: f64,
}

impl SlotRenderer<'_> {
    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let scale = self
            .button
            .style("transform")
            .and_then(|t| transform_value(&t, "scale"))
            .unwrap_or(1.0);
        let fill = self
            .button
            .style("background")
            .and_then(|bg| theme::parse_color(&bg))
            .unwrap_or(colors.slot);

        let center = Point::new(self.geometry.center.x, self.geometry.center.y + self.offset_y);
        let radius = self.geometry.radius * scale;

        set_color(cr, fill, self.alpha);
        circle(cr, center, radius);
        cr.fill()?;

        if self.button.has_class(super::HOVER_CLASS) {
            set_color(cr, colors.accent, self.alpha);
            cr.set_line_width(2.0);
            circle(cr, center, radius);
            cr.stroke()?;
        }

        set_color(cr, colors.glyph, self.alpha);
        centered_text(cr, center, &self.button.text_content(), radius * 0.8)
    }
}

fn draw_toggle(
    cr: &Context,
    menu: &CircularMenu,
    layout: &Layout,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let color = if menu.is_open() {
        colors.toggle_open
    } else {
        colors.toggle
    };
    set_color(cr, color, 1.0);
    circle(cr, layout.anchor, layout.toggle_radius);
    cr.fill()?;

    set_color(cr, colors.glyph, 1.0);
    centered_text(
        cr,
        layout.anchor,
        &menu.toggle_button().text_content(),
        layout.toggle_radius * 0.9,
    )
}

fn draw_panel(
    cr: &Context,
    menu: &CircularMenu,
    layout: &Layout,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let panel = menu.panel();
    let alpha = TweenProp::Opacity.read(panel).clamp(0.0, 1.0);
    let offset_y = TweenProp::TranslateY.read(panel) * layout.scale_factor;

    for (button, geometry) in menu.action_buttons().iter().zip(&layout.slots) {
        SlotRenderer {
            button,
            geometry,
            offset_y,
            alpha,
        }
        .draw(cr, colors)?;
    }
    Ok(())
}

fn draw_modal(
    cr: &Context,
    modal: &Element,
    layout: &Layout,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let s = layout.scale_factor;

    set_color(cr, colors.backdrop, 1.0);
    cr.rectangle(layout.area.x, layout.area.y, layout.area.width, layout.area.height);
    cr.fill()?;

    set_color(cr, colors.card, 1.0);
    rounded_rect(cr, &layout.modal, 12.0 * s);
    cr.fill()?;

    let pad = 20.0 * s;
    let mut baseline = layout.modal.y + pad;
    set_color(cr, colors.card_fg, 1.0);

    for child in modal.children() {
        let (size, weight) = match child.tag().as_str() {
            "h2" => (22.0 * s, cairo::FontWeight::Bold),
            "p" => (15.0 * s, cairo::FontWeight::Normal),
            _ => continue,
        };
        baseline += size * 1.4;
        cr.select_font_face(FONT, cairo::FontSlant::Normal, weight);
        cr.set_font_size(size);
        cr.move_to(layout.modal.x + pad, baseline);
        cr.show_text(&child.text_content())?;
    }

    if let Some(close) = modal
        .children()
        .into_iter()
        .find(|c| c.has_class(MODAL_CLOSE_CLASS))
    {
        set_color(cr, colors.accent, 1.0);
        rounded_rect(cr, &layout.modal_close, 6.0 * s);
        cr.fill()?;
        set_color(cr, colors.card, 1.0);
        centered_text(
            cr,
            layout.modal_close.center(),
            &close.text_content(),
            14.0 * s,
        )?;
    }
    Ok(())
}

pub fn draw(
    cr: &Context,
    menu: &CircularMenu,
    layout: &Layout,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    if menu.is_destroyed() {
        return Ok(());
    }

    if menu.is_panel_visible() {
        draw_panel(cr, menu, layout, colors)?;
    }
    draw_toggle(cr, menu, layout, colors)?;

    if let Some(modal) = menu.modal() {
        draw_modal(cr, &modal, layout, colors)?;
    }
    Ok(())
}
