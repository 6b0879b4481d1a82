use crate::dom::{Element, EventKind};

#[derive(Debug, Default)]
pub struct PointerTracker {
    hovered: Option<Element>,
}

impl PointerTracker {
    pub fn hovered(&self) -> Option<&Element> {
        self.hovered.as_ref()
    }

    pub fn update(&mut self, target: Option<Element>) -> bool {
        if self.hovered == target {
            return false;
        }
        if let Some(old) = self.hovered.take() {
            old.dispatch(EventKind::PointerLeave);
        }
        if let Some(new) = &target {
            new.dispatch(EventKind::PointerEnter);
        }
        self.hovered = target;
        true
    }

    pub fn click(&self) -> bool {
        self.hovered
            .as_ref()
            .is_some_and(|el| el.dispatch(EventKind::Click) > 0)
    }

    pub fn reset(&mut self) -> bool {
        self.update(None)
    }
}
