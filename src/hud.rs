use crate::config::HudSettings;
use crate::dom::Element;

pub const POINTS_ID: &str = "hud-points";
pub const TIMER_ID: &str = "hud-timer";

pub fn format_timer(seconds: u64) -> String {
    format!("⏱ {seconds}s")
}

pub fn format_points(points: u32, label: &str) -> String {
    format!("🎯 {points} {label}")
}

#[derive(Debug, Clone)]
pub struct Hud {
    points: Element,
    timer: Element,
    points_label: String,
}

impl Hud {
    pub fn mount(container: &Element, settings: &HudSettings) -> Self {
        let points = Self::adopt_or_create(container, POINTS_ID, "hud-points", || {
            format_points(0, &settings.points_label)
        });
        let timer = Self::adopt_or_create(container, TIMER_ID, "game-timer", || format_timer(0));

        Self {
            points,
            timer,
            points_label: settings.points_label.clone(),
        }
    }

    fn adopt_or_create(
        container: &Element,
        id: &str,
        class: &str,
        initial: impl FnOnce() -> String,
    ) -> Element {
        if let Some(existing) = container
            .descendants()
            .into_iter()
            .find(|el| el.id().as_deref() == Some(id))
        {
            return existing;
        }

        let el = Element::create("div")
            .with_id(id)
            .with_class(class)
            .with_attr("role", "status")
            .with_text(initial());
        container.append_child(&el);
        el
    }

    pub fn set_points(&self, points: u32) {
        self.points
            .set_text_content(format_points(points, &self.points_label));
    }

    pub fn set_timer(&self, seconds: u64) {
        self.timer.set_text_content(format_timer(seconds));
    }

    pub fn set_points_label(&mut self, label: &str) {
        self.points_label = label.to_string();
    }

    pub fn points_element(&self) -> &Element {
        &self.points
    }

    pub fn timer_element(&self) -> &Element {
        &self.timer
    }

    pub fn lines(&self) -> [String; 2] {
        [self.points.text_content(), self.timer.text_content()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_creates_nodes() {
        let container = Element::create("div");
        let hud = Hud::mount(&container, &HudSettings::default());

        let timer = container.query_selector("#hud-timer").unwrap().unwrap();
        assert!(timer.has_class("game-timer"));
        assert_eq!(timer.text_content(), "⏱ 0s");
        assert_eq!(hud.lines()[0], "🎯 0 points");
    }

    #[test]
    fn test_mount_adopts_existing_nodes() {
        let container = Element::create("div");
        let existing = Element::create("div")
            .with_id(TIMER_ID)
            .with_class("game-timer")
            .with_text("⏱ 42s");
        container.append_child(&existing);

        let hud = Hud::mount(&container, &HudSettings::default());
        assert_eq!(hud.timer_element(), &existing);
        assert_eq!(container.query_selector_all("#hud-timer").unwrap().len(), 1);
    }

    #[test]
    fn test_timer_format() {
        let container = Element::create("div");
        let hud = Hud::mount(&container, &HudSettings::default());

        for (seconds, expected) in [(5, "⏱ 5s"), (30, "⏱ 30s"), (0, "⏱ 0s"), (120, "⏱ 120s")] {
            hud.set_timer(seconds);
            assert_eq!(hud.timer_element().text_content(), expected);
        }
    }

    #[test]
    fn test_points_label() {
        let container = Element::create("div");
        let hud = Hud::mount(
            &container,
            &HudSettings {
                points_label: "puntos".into(),
            },
        );

        hud.set_points(250);
        assert_eq!(hud.points_element().text_content(), "🎯 250 puntos");
    }
}
